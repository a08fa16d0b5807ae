//! Real-time status query (DLE EOT 1) and the bit we read back.
//!
//! Only bit 3 of the first response byte is interpreted. Any other pattern
//! counts as "not busy", which is taken to mean the job is done. This is a
//! coarse reading of the device's status byte, not a status protocol.

use super::PrinterState;

/// DLE EOT 1: ask the device to transmit its printer status byte.
pub const STATUS_QUERY: [u8; 3] = [0x10, 0x04, 0x01];

/// Set while the device is still busy printing.
pub const BUSY_BIT: u8 = 0x08;

/// Classify one inbound message. Empty input yields nothing to publish.
pub fn classify_status(message: &[u8]) -> Option<PrinterState> {
    let status = *message.first()?;
    if status & BUSY_BIT != 0 {
        Some(PrinterState::Printing)
    } else {
        Some(PrinterState::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_query_bytes() {
        assert_eq!(STATUS_QUERY, [0x10, 0x04, 0x01]);
    }

    #[test]
    fn test_busy_bit_means_printing() {
        assert_eq!(classify_status(&[0x08]), Some(PrinterState::Printing));
        assert_eq!(classify_status(&[0x1A]), Some(PrinterState::Printing));
    }

    #[test]
    fn test_clear_busy_bit_means_finished() {
        assert_eq!(classify_status(&[0x00]), Some(PrinterState::Finished));
        assert_eq!(classify_status(&[0x12]), Some(PrinterState::Finished));
    }

    #[test]
    fn test_only_first_byte_is_read() {
        assert_eq!(classify_status(&[0x00, 0x08]), Some(PrinterState::Finished));
    }

    #[test]
    fn test_empty_message_publishes_nothing() {
        assert_eq!(classify_status(&[]), None);
    }

    // Error bits (0x20 paper-out, 0x40 error on common devices) are not
    // decoded; they currently read as "finished".
    #[test]
    fn test_error_bits_are_not_decoded() {
        assert_eq!(classify_status(&[0x60]), Some(PrinterState::Finished));
    }
}
