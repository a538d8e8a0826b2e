//! Binary frame codec.
//!
//! Every WebSocket message in either direction is one frame:
//! - 1 byte: opcode
//! - remaining bytes: payload, interpreted per opcode
//!
//! There is no length prefix; WebSocket framing already delivers whole messages.

use crate::error::ProtocolError;

/// Opcodes shared by the client and the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Board configuration as JSON (server -> client)
    Configure = 0,
    /// Move request `[x, y]` (client -> server) or applied move (server -> client)
    Update = 1,
    /// Whole board as raw cells (server -> client)
    LoadBoard = 2,
    /// Session handshake as JSON (both directions)
    Session = 3,
    /// Turn passed, empty payload (both directions)
    Pass = 4,
    /// Game over, empty payload (server -> client)
    Fin = 5
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Opcode::Configure),
            1 => Some(Opcode::Update),
            2 => Some(Opcode::LoadBoard),
            3 => Some(Opcode::Session),
            4 => Some(Opcode::Pass),
            5 => Some(Opcode::Fin),
            _ => None
        }
    }

    pub fn as_byte(&self) -> u8 {
        *self as u8
    }
}

/// Prepends the opcode to the payload.
pub fn encode(opcode: Opcode, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + payload.len());
    bytes.push(opcode.as_byte());
    bytes.extend_from_slice(payload);
    bytes
}

/// Splits a complete message into opcode and payload.
///
/// The caller must hand over the whole message; partial buffers are never valid.
pub fn decode(raw: &[u8]) -> Result<(Opcode, &[u8]), ProtocolError> {
    let (&first, payload) = raw.split_first()
        .ok_or(ProtocolError::MalformedFrame("empty frame"))?;
    let opcode = Opcode::from_byte(first).ok_or(ProtocolError::UnknownOpcode(first))?;
    Ok((opcode, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_byte() {
        assert_eq!(Opcode::from_byte(0), Some(Opcode::Configure));
        assert_eq!(Opcode::from_byte(1), Some(Opcode::Update));
        assert_eq!(Opcode::from_byte(2), Some(Opcode::LoadBoard));
        assert_eq!(Opcode::from_byte(3), Some(Opcode::Session));
        assert_eq!(Opcode::from_byte(4), Some(Opcode::Pass));
        assert_eq!(Opcode::from_byte(5), Some(Opcode::Fin));
        assert_eq!(Opcode::from_byte(6), None);
        assert_eq!(Opcode::from_byte(0xFF), None);
    }

    #[test]
    fn test_encode_prepends_opcode() {
        assert_eq!(encode(Opcode::Update, &[3, 4]), vec![1, 3, 4]);
        assert_eq!(encode(Opcode::Pass, &[]), vec![4]);
    }

    #[test]
    fn test_decode_splits_payload() {
        let (opcode, payload) = decode(&[2, 0, 1, 2]).unwrap();
        assert_eq!(opcode, Opcode::LoadBoard);
        assert_eq!(payload, &[0, 1, 2]);
    }

    #[test]
    fn test_decode_opcode_only() {
        let (opcode, payload) = decode(&[5]).unwrap();
        assert_eq!(opcode, Opcode::Fin);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_empty_is_malformed() {
        assert!(matches!(decode(&[]), Err(ProtocolError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert!(matches!(decode(&[0x42, 1]), Err(ProtocolError::UnknownOpcode(0x42))));
    }
}
