//! The `error` module defines the [`Hex2BinError`] enum that describes the failures that
//! abort a conversion pass, and [`Hex2BinErrorKind`], the reasons a single record line
//! fails to decode. A fatal error carries the 1-based line number at which the pass
//! stopped, where one applies. Checksum mismatches are deliberately absent here: they
//! are diagnostics collected in the conversion summary, not errors.

use crate::record::RecordType;
use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Hex2BinError {
    /// A record line failed structural decoding
    ParseRecordError(Hex2BinErrorKind, usize),
    /// The line source failed while reading
    ReadError(io::Error, usize),
    /// The image sink failed while writing
    WriteError(io::Error),
}

impl fmt::Display for Hex2BinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseRecordError(base_err, line) => {
                write!(
                    f,
                    "Error encountered during record parsing at line #{line} of the hex file:\n{base_err}",
                )
            }
            Self::ReadError(io_err, line) => {
                write!(
                    f,
                    "Error encountered while reading line #{line} of the hex file:\n{io_err}",
                )
            }
            Self::WriteError(io_err) => {
                write!(
                    f,
                    "Error encountered while writing to the output image:\n{io_err}",
                )
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Hex2BinErrorKind {
    /// Record does not begin with a ':'
    MissingStartCode,
    /// Record contains non-hexadecimal characters
    ContainsInvalidCharacters,
    /// Record is shorter than the smallest valid
    RecordTooShort,
    /// Record is longer than the largest valid
    RecordTooLong,
    /// Record length is odd
    RecordNotEvenLength,
    /// Payload length differs from the declared byte count
    RecordInvalidPayloadLength,
    /// Record's payload length does not match the record type
    RecordLengthInvalidForType(RecordType, usize, usize),
}

impl fmt::Display for Hex2BinErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStartCode => {
                write!(f, "Missing start code ':'")
            }
            Self::ContainsInvalidCharacters => {
                write!(f, "Record contains invalid character(s)")
            }
            Self::RecordTooShort => {
                write!(f, "Record too short")
            }
            Self::RecordTooLong => {
                write!(f, "Record too long")
            }
            Self::RecordNotEvenLength => {
                write!(f, "Record with uneven length")
            }
            Self::RecordInvalidPayloadLength => {
                write!(f, "Payload (data bytes) size differs from record's length")
            }
            Self::RecordLengthInvalidForType(rtype, expected, actual) => {
                write!(
                    f,
                    "For record type {rtype:?} expected data length is {expected} bytes, found {actual}"
                )
            }
        }
    }
}

impl Error for Hex2BinError {}
impl Error for Hex2BinErrorKind {}
