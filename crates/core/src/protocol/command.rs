//! Status characteristic commands and the acknowledgment payload

/// Payload notified on the Ack characteristic once per Start
pub const ACK_PAYLOAD: &[u8] = b"ACK";

/// Commands accepted on the Status characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    /// Parse a Status write
    ///
    /// Only the exact ASCII strings `"Start"` and `"Stop"` are commands;
    /// anything else (including trailing bytes) is ignored by the node.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"Start" => Some(Command::Start),
            b"Stop" => Some(Command::Stop),
            _ => None,
        }
    }

    /// Bytes the host writes for this command
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Command::Start => b"Start",
            Command::Stop => b"Stop",
        }
    }
}

/// True when an Ack notification carries the acknowledgment
pub fn is_ack(bytes: &[u8]) -> bool {
    bytes == ACK_PAYLOAD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exact_commands() {
        assert_eq!(Command::parse(b"Start"), Some(Command::Start));
        assert_eq!(Command::parse(b"Stop"), Some(Command::Stop));
        assert_eq!(Command::parse(Command::Start.as_bytes()), Some(Command::Start));
    }

    #[test]
    fn rejects_other_payloads() {
        for payload in [&b""[..], b"start", b"Start\0", b"STOP", b"Go"] {
            assert_eq!(Command::parse(payload), None);
        }
    }

    #[test]
    fn ack_detection() {
        assert!(is_ack(b"ACK"));
        assert!(!is_ack(b"ACK\n"));
        assert!(!is_ack(b""));
    }
}
