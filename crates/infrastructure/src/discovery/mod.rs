mod subnet_scanner;

pub use subnet_scanner::SubnetScanner;
