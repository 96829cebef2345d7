//! The `record` module defines [`Record`] and [`RecordType`], the structured form of a
//! single Intel HEX line, and the positional parse that produces them.
//!
//! Parsing here is structural only. The declared checksum byte is decoded and carried
//! in the record; comparing it against the computed checksum is the interpreter's job,
//! where a mismatch is a diagnostic rather than a parse failure.

use crate::error::Hex2BinErrorKind;

mod ranges {
    use std::ops::Range;
    pub const RECORD_LEN_RANGE: Range<usize> = 1..3;
    pub const RECORD_ADDR_RANGE: Range<usize> = 3..7;
    pub const RECORD_TYPE_RANGE: Range<usize> = 7..9;
}
mod sizes {
    pub const BYTE_CHAR_LEN: usize = 2;
    pub const SMALLEST_RECORD: usize = (1 + 2 + 1 + 1) * 2; // len + addr + rtype + checksum
    pub const LARGEST_RECORD: usize = SMALLEST_RECORD + 255 * 2;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
    /// Type code outside 0x00..=0x05. Carried through so the interpreter can
    /// report it; never a parse failure.
    Unknown(u8),
}

impl RecordType {
    pub(crate) const fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Data,
            0x01 => Self::EndOfFile,
            0x02 => Self::ExtendedSegmentAddress,
            0x03 => Self::StartSegmentAddress,
            0x04 => Self::ExtendedLinearAddress,
            0x05 => Self::StartLinearAddress,
            other => Self::Unknown(other),
        }
    }

    pub(crate) const fn code(self) -> u8 {
        match self {
            Self::Data => 0x00,
            Self::EndOfFile => 0x01,
            Self::ExtendedSegmentAddress => 0x02,
            Self::StartSegmentAddress => 0x03,
            Self::ExtendedLinearAddress => 0x04,
            Self::StartLinearAddress => 0x05,
            Self::Unknown(other) => other,
        }
    }
}

/// Decode one byte from a pair of hex digits.
pub(crate) fn decode_byte(s: &str) -> Result<u8, Hex2BinErrorKind> {
    u8::from_str_radix(s, 16).map_err(|_| Hex2BinErrorKind::ContainsInvalidCharacters)
}

/// Decode a 16-bit word from four hex digits (big-endian: high byte first).
pub(crate) fn decode_word(s: &str) -> Result<u16, Hex2BinErrorKind> {
    u16::from_str_radix(s, 16).map_err(|_| Hex2BinErrorKind::ContainsInvalidCharacters)
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Record {
    pub(crate) length: u8,
    pub(crate) address: u16,
    pub(crate) rtype: RecordType,
    pub(crate) data: Vec<u8>,
    pub(crate) checksum: u8,
}

impl Record {
    /// Checksum over the record as parsed: two's complement of the 8-bit sum
    /// of length, address bytes, type code and every payload byte.
    pub(crate) fn computed_checksum(&self) -> u8 {
        let mut sum = self
            .length
            .wrapping_add((self.address >> 8) as u8)
            .wrapping_add((self.address & 0xFF) as u8)
            .wrapping_add(self.rtype.code());
        for b in &self.data {
            sum = sum.wrapping_add(*b);
        }
        (!sum).wrapping_add(1) // two's complement
    }

    /// Parse the record string into Record.
    ///
    pub(crate) fn parse(line: &str) -> Result<Self, Hex2BinErrorKind> {
        // Check for start code
        if !line.starts_with(':') {
            return Err(Hex2BinErrorKind::MissingStartCode);
        }

        let hexdigit_part = &line[1..];
        let hexdigit_part_len = hexdigit_part.len();

        // Validate all characters are hexadecimal
        if !hexdigit_part.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(Hex2BinErrorKind::ContainsInvalidCharacters);
        }

        // Validate record's size
        if hexdigit_part_len < sizes::SMALLEST_RECORD {
            return Err(Hex2BinErrorKind::RecordTooShort);
        } else if hexdigit_part_len > sizes::LARGEST_RECORD {
            return Err(Hex2BinErrorKind::RecordTooLong);
        } else if (hexdigit_part_len % 2) != 0 {
            return Err(Hex2BinErrorKind::RecordNotEvenLength);
        }

        // Get record length
        let length = decode_byte(&line[ranges::RECORD_LEN_RANGE])?;

        // The line must hold exactly `length` payload pairs plus the checksum pair
        let data_end = ranges::RECORD_TYPE_RANGE.end + sizes::BYTE_CHAR_LEN * length as usize;
        let record_end = sizes::BYTE_CHAR_LEN + data_end; // last byte is checksum
        if record_end != line.len() {
            return Err(Hex2BinErrorKind::RecordInvalidPayloadLength);
        }

        // Get record address and type
        let address = decode_word(&line[ranges::RECORD_ADDR_RANGE])?;
        let rtype = RecordType::from_code(decode_byte(&line[ranges::RECORD_TYPE_RANGE])?);

        // Sanity check the length against the record type, so that the
        // interpreter can read fixed-width payload fields without bounds checks
        match rtype {
            RecordType::EndOfFile => {
                if length != 0 {
                    return Err(Hex2BinErrorKind::RecordLengthInvalidForType(
                        rtype,
                        0,
                        length as usize,
                    ));
                }
            }
            RecordType::ExtendedSegmentAddress | RecordType::ExtendedLinearAddress => {
                if length != 2 {
                    return Err(Hex2BinErrorKind::RecordLengthInvalidForType(
                        rtype,
                        2,
                        length as usize,
                    ));
                }
            }
            RecordType::StartSegmentAddress | RecordType::StartLinearAddress => {
                if length != 4 {
                    return Err(Hex2BinErrorKind::RecordLengthInvalidForType(
                        rtype,
                        4,
                        length as usize,
                    ));
                }
            }
            RecordType::Data | RecordType::Unknown(_) => {}
        }

        // Get record data payload
        let mut data = vec![0u8; length as usize];
        hex::decode_to_slice(&line[ranges::RECORD_TYPE_RANGE.end..data_end], &mut data)
            .map_err(|_| Hex2BinErrorKind::ContainsInvalidCharacters)?;

        // Get declared checksum
        let checksum = decode_byte(&line[data_end..record_end])?;

        Ok(Self {
            length,
            address,
            rtype,
            data,
            checksum,
        })
    }
}
