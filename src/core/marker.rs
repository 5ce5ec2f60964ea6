//! Wire markers and length classes.
//!
//! Reserved byte values sit at the top of the byte space. Which ones matter
//! depends on the slot being read:
//!
//! ```text
//! tag slot:      0x00 (empty tag) | token code | 0xF5 idx | 0xFA <string>
//! length prefix: n (small) | 0xFD u16 | 0xFE u32
//! attr value:    <string> | 0xFC <length> bytes
//! content slot:  0xF8 child.. | 0xF7 | 0xFC <length> bytes | 0xF9 | <string>
//! ```

use crate::error::{constants, CodecError, Result};

/// Tag slot: reserved token code for the empty tag
pub const EMPTY_TAG: u8 = 0x00;
/// Tag slot: escape into the double-byte token table
pub const DOUBLE_BYTE: u8 = 0xF5;
/// Content slot: children present but empty
pub const LIST_EMPTY: u8 = 0xF7;
/// Opens an encoded node
pub const LIST_START: u8 = 0xF8;
/// Closes an encoded node
pub const LIST_END: u8 = 0xF9;
/// Tag slot: a non-token tag string follows
pub const LITERAL: u8 = 0xFA;
/// Opaque bytes follow
pub const BINARY: u8 = 0xFC;
/// Two-byte big-endian length follows
pub const MEDIUM: u8 = 0xFD;
/// Four-byte big-endian length follows
pub const LARGE: u8 = 0xFE;

/// Number of single-byte token codes; every code stays below the escape byte.
pub const MAX_SINGLE_BYTE_TOKENS: usize = DOUBLE_BYTE as usize;

/// Number of double-byte token codes addressable by the index byte.
pub const MAX_DOUBLE_BYTE_TOKENS: usize = 256;

/// Values that can never be a one-byte length, because some slot reads a
/// length where the same byte is also a marker.
const RESERVED_LENGTH_BYTES: [u8; 6] = [LIST_EMPTY, LIST_START, LIST_END, BINARY, MEDIUM, LARGE];

/// Whether `byte` is one of the reserved length-slot markers
#[inline]
pub fn is_reserved(byte: u8) -> bool {
    RESERVED_LENGTH_BYTES.contains(&byte)
}

/// Width class of a length prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// One byte holding the length itself
    Small,
    /// `MEDIUM` + u16
    Medium,
    /// `LARGE` + u32
    Large,
}

impl LengthClass {
    /// Pick the class for a length. The same length always yields the same
    /// class, which keeps encodings reproducible.
    pub fn for_len(len: usize) -> Result<Self> {
        if len < 256 && !is_reserved(len as u8) {
            Ok(LengthClass::Small)
        } else if len <= u16::MAX as usize {
            Ok(LengthClass::Medium)
        } else if len <= u32::MAX as usize {
            Ok(LengthClass::Large)
        } else {
            Err(CodecError::Encoding(format!(
                "{}: {len} bytes",
                constants::ERR_VALUE_TOO_LONG
            )))
        }
    }

    /// Bytes taken by the prefix itself
    pub fn prefix_len(self) -> usize {
        match self {
            LengthClass::Small => 1,
            LengthClass::Medium => 3,
            LengthClass::Large => 5,
        }
    }
}

/// What the content slot of a node holds, decided from its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMarker {
    Children,
    EmptyChildren,
    Binary,
    Absent,
    Text,
}

impl ContentMarker {
    /// Classify a peeked content byte.
    pub fn from_u8(byte: u8) -> ContentMarker {
        match byte {
            LIST_START => ContentMarker::Children,
            LIST_EMPTY => ContentMarker::EmptyChildren,
            BINARY => ContentMarker::Binary,
            LIST_END => ContentMarker::Absent,
            _ => ContentMarker::Text,
        }
    }
}

impl From<u8> for ContentMarker {
    fn from(val: u8) -> ContentMarker {
        ContentMarker::from_u8(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_distinct() {
        let markers = [
            EMPTY_TAG,
            DOUBLE_BYTE,
            LIST_EMPTY,
            LIST_START,
            LIST_END,
            LITERAL,
            BINARY,
            MEDIUM,
            LARGE,
        ];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_length_class_boundaries() {
        assert_eq!(LengthClass::for_len(0).unwrap(), LengthClass::Small);
        assert_eq!(LengthClass::for_len(255).unwrap(), LengthClass::Small);
        assert_eq!(LengthClass::for_len(256).unwrap(), LengthClass::Medium);
        assert_eq!(LengthClass::for_len(65535).unwrap(), LengthClass::Medium);
        assert_eq!(LengthClass::for_len(65536).unwrap(), LengthClass::Large);
    }

    #[test]
    fn test_reserved_lengths_promoted() {
        for byte in RESERVED_LENGTH_BYTES {
            assert_eq!(
                LengthClass::for_len(byte as usize).unwrap(),
                LengthClass::Medium
            );
        }
        assert_eq!(LengthClass::for_len(0xF6).unwrap(), LengthClass::Small);
        assert_eq!(LengthClass::for_len(0xFA).unwrap(), LengthClass::Small);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_length_rejected() {
        let err = LengthClass::for_len(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
    }

    #[test]
    fn test_content_marker_classification() {
        assert_eq!(ContentMarker::from(LIST_START), ContentMarker::Children);
        assert_eq!(ContentMarker::from(LIST_EMPTY), ContentMarker::EmptyChildren);
        assert_eq!(ContentMarker::from(BINARY), ContentMarker::Binary);
        assert_eq!(ContentMarker::from(LIST_END), ContentMarker::Absent);
        assert_eq!(ContentMarker::from(3), ContentMarker::Text);
        assert_eq!(ContentMarker::from(MEDIUM), ContentMarker::Text);
    }
}
