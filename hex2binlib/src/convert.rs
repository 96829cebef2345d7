//! The `convert` module provides [`Converter`], the record interpreter that drives a
//! full hex-to-binary pass: lines are decoded into records, addressing state is
//! threaded across them, data bytes land in an [`ImageSink`], and everything observed
//! along the way is collected into a [`ConversionSummary`].

use crate::error::Hex2BinError;
use crate::image::{FileImage, ImageSink};
use crate::record::{Record, RecordType};
use crate::report::Reporter;
use std::collections::BTreeSet;
use std::error::Error;
use std::io::{self, BufRead};
use std::path::Path;

/// Addressing state accumulated across the records of one pass.
///
/// `segment` follows extended segment address records (field << 4), `linear`
/// follows extended linear address records (field << 16). Each persists until
/// the next record of its type replaces it.
#[derive(Debug, Default, Clone, Copy)]
struct BaseAddress {
    segment: u32,
    linear: u32,
}

impl BaseAddress {
    /// Absolute image address for one payload byte. Widened to u64: the base
    /// maxima plus a 16-bit record address and a payload offset cannot overflow.
    fn absolute(self, address: u16, offset: u64) -> u64 {
        u64::from(self.segment) + u64::from(self.linear) + u64::from(address) + offset
    }
}

/// One checksum discrepancy, in the order encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// 1-based line number of the record
    pub line: usize,
    /// Checksum computed over the decoded record
    pub expected: u8,
    /// Checksum byte declared on the line
    pub actual: u8,
}

/// Everything a conversion pass observed, returned on success.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Distinct record types seen, in code order
    pub record_types: BTreeSet<RecordType>,
    /// Checksum discrepancies, in the order encountered. Never fatal.
    pub checksum_mismatches: Vec<ChecksumMismatch>,
    /// Entry point from a start linear address record, if any
    pub start_execution: Option<u32>,
    /// CS:IP register pair from a start segment address record, if any
    pub start_segment: Option<(u16, u16)>,
    /// Data bytes written to the image sink
    pub bytes_written: usize,
    /// Lines consumed from the source, blank lines included
    pub lines_read: usize,
}

/// Drives hex-to-binary conversion passes.
///
/// The single option is the linear offset adjustment: when enabled, extended
/// linear address records shift subsequent data writes by their field value
/// << 16; when disabled (the default) those records are decoded and
/// checksummed but leave addressing alone.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    /// Whether extended linear address records update the linear base
    linear_offset: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Creates a converter with the linear offset adjustment disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            linear_offset: false,
        }
    }

    /// Enables or disables the linear offset adjustment for subsequent passes.
    pub const fn set_linear_offset(&mut self, enabled: bool) {
        self.linear_offset = enabled;
    }

    /// Runs one conversion pass: pulls lines from `lines`, decodes each into a
    /// record, applies its effect to `image`, and hands per-line notes to
    /// `reporter` as they occur.
    ///
    /// The pass stops at the first record with a zero byte count (the
    /// well-formed case being an end-of-file record), when the source runs
    /// out, or on a fatal error. Checksum mismatches are collected in the
    /// summary and reported, never returned as errors; the offending record's
    /// effect stands.
    ///
    /// # Errors
    /// - [`Hex2BinError::ParseRecordError`] if a line fails structural decoding
    /// - [`Hex2BinError::ReadError`] if the line source fails
    /// - [`Hex2BinError::WriteError`] if the image sink fails
    ///
    /// Writes made before a fatal error stay in the sink; the caller must
    /// treat the image as partial.
    pub fn convert(
        &self,
        lines: impl IntoIterator<Item = io::Result<String>>,
        image: &mut impl ImageSink,
        reporter: &mut impl Reporter,
    ) -> Result<ConversionSummary, Hex2BinError> {
        let mut summary = ConversionSummary::default();
        let mut base = BaseAddress::default();

        // Iterate over lines of records
        for (idx, line) in lines.into_iter().enumerate() {
            let number = idx + 1;
            summary.lines_read = number;

            let line = line.map_err(|err| Hex2BinError::ReadError(err, number))?;
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if line.is_empty() {
                continue;
            }

            let record = Record::parse(line)
                .map_err(|err| Hex2BinError::ParseRecordError(err, number))?;

            summary.record_types.insert(record.rtype);

            // Apply the record's effect
            match record.rtype {
                RecordType::Data => {
                    for (i, byte) in record.data.iter().enumerate() {
                        image
                            .write_byte(base.absolute(record.address, i as u64), *byte)
                            .map_err(Hex2BinError::WriteError)?;
                    }
                    summary.bytes_written += record.data.len();
                }
                RecordType::EndOfFile => {}
                RecordType::ExtendedSegmentAddress => {
                    base.segment =
                        u32::from(u16::from_be_bytes([record.data[0], record.data[1]])) << 4;
                }
                RecordType::StartSegmentAddress => {
                    let cs = u16::from_be_bytes([record.data[0], record.data[1]]);
                    let ip = u16::from_be_bytes([record.data[2], record.data[3]]);
                    summary.start_segment = Some((cs, ip));
                }
                RecordType::ExtendedLinearAddress => {
                    if self.linear_offset {
                        base.linear =
                            u32::from(u16::from_be_bytes([record.data[0], record.data[1]])) << 16;
                    }
                    // Noted even when the base did not move
                    reporter.base_address_changed(number, base.linear);
                }
                RecordType::StartLinearAddress => {
                    summary.start_execution = Some(u32::from_be_bytes([
                        record.data[0],
                        record.data[1],
                        record.data[2],
                        record.data[3],
                    ]));
                }
                RecordType::Unknown(code) => {
                    reporter.unknown_record_type(number, code);
                }
            }

            // Verify the checksum once the record has taken effect
            let expected = record.computed_checksum();
            if expected != record.checksum {
                summary.checksum_mismatches.push(ChecksumMismatch {
                    line: number,
                    expected,
                    actual: record.checksum,
                });
                reporter.checksum_mismatch(number, expected, record.checksum);
            }

            // A zero byte count ends the stream; an end-of-file record is the
            // well-formed case (its length is validated to be zero)
            if record.length == 0 {
                break;
            }
        }

        image.flush().map_err(Hex2BinError::WriteError)?;
        reporter.summary(&summary);
        Ok(summary)
    }

    /// Convenience wrapper over [`Converter::convert`] for in-memory content.
    ///
    /// # Errors
    /// Same failure modes as [`Converter::convert`], except that read errors
    /// cannot occur.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::{Converter, NullReporter, SparseImage};
    ///
    /// let content = ":020000021000EC\n:04001000AABBCCDDDE\n:00000001FF";
    /// let mut image = SparseImage::new();
    /// let summary = Converter::new()
    ///     .convert_str(content, &mut image, &mut NullReporter)
    ///     .unwrap();
    ///
    /// assert_eq!(summary.bytes_written, 4);
    /// assert_eq!(image.get_byte(0x10010), Some(0xAA));
    /// ```
    pub fn convert_str(
        &self,
        content: &str,
        image: &mut impl ImageSink,
        reporter: &mut impl Reporter,
    ) -> Result<ConversionSummary, Hex2BinError> {
        self.convert(content.lines().map(|l| Ok(l.to_owned())), image, reporter)
    }

    /// Converts the hex file at `hex_path` into a raw binary at `bin_path`,
    /// writing through a [`FileImage`]: bytes land at their absolute
    /// addresses, untouched regions stay zero.
    ///
    /// # Errors
    /// Returns an error if the input cannot be opened, the output cannot be
    /// created, or the conversion itself fails.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::{Converter, NullReporter};
    ///
    /// let converter = Converter::new();
    /// let summary = converter
    ///     .convert_file(
    ///         "tests/fixtures/fw_valid_1.hex",
    ///         "build/ex2/fw.bin",
    ///         &mut NullReporter,
    ///     )
    ///     .unwrap();
    ///
    /// assert!(summary.checksum_mismatches.is_empty());
    /// assert_eq!(summary.bytes_written, 40);
    /// ```
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        hex_path: P,
        bin_path: Q,
        reporter: &mut impl Reporter,
    ) -> Result<ConversionSummary, Box<dyn Error>> {
        let file = std::fs::File::open(hex_path)?;
        let reader = io::BufReader::new(file);
        let mut image = FileImage::create(bin_path)?;
        Ok(self.convert(reader.lines(), &mut image, reporter)?)
    }
}
