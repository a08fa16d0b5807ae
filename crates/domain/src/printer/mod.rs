mod connection_status;
mod parameters;
mod printer_state;
pub mod status_byte;

pub use connection_status::ConnectionStatus;
pub use parameters::{ConnectionParameters, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PRINTER_PORT};
pub use printer_state::PrinterState;
pub use status_byte::{BUSY_BIT, STATUS_QUERY, classify_status};
