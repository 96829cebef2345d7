//! The `report` module defines the [`Reporter`] trait through which a conversion pass
//! surfaces per-line notes (base address changes, unknown record types, checksum
//! mismatches) as they occur, plus the final summary.
//!
//! Reporting is infallible by contract: a reporter that cannot deliver a note must
//! swallow the failure, since reporting never affects conversion correctness.

use crate::convert::ConversionSummary;

/// Receives informational notes during a conversion pass and the summary after
/// it. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait Reporter {
    /// An extended linear address record was interpreted. `base` is the
    /// linear base in effect after the record; it only moves when the linear
    /// offset adjustment is enabled.
    fn base_address_changed(&mut self, line: usize, base: u32) {}

    /// A record with a type code outside 0x00..=0x05 was interpreted.
    fn unknown_record_type(&mut self, line: usize, code: u8) {}

    /// A record's computed checksum differs from the declared checksum byte.
    fn checksum_mismatch(&mut self, line: usize, expected: u8, actual: u8) {}

    /// The pass finished; `summary` is what the conversion call returns.
    fn summary(&mut self, summary: &ConversionSummary) {}
}

/// Prints every note and the summary to stdout, line by line as they occur.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn base_address_changed(&mut self, line: usize, base: u32) {
        println!("Line {line}: base address changed to 0x{base:08X}");
    }

    fn unknown_record_type(&mut self, line: usize, code: u8) {
        println!("Line {line}: unknown record type 0x{code:02X}");
    }

    fn checksum_mismatch(&mut self, line: usize, expected: u8, actual: u8) {
        println!(
            "Checksum mismatch on line {line}: expected 0x{expected:02X}, found 0x{actual:02X}"
        );
    }

    fn summary(&mut self, summary: &ConversionSummary) {
        if let Some(addr) = summary.start_execution {
            println!("Start execution at 0x{addr:08X}");
        }
        let types: Vec<String> = summary
            .record_types
            .iter()
            .map(|rtype| format!("{rtype:?}"))
            .collect();
        println!("Record types seen: [{}]", types.join(", "));
    }
}

/// Discards every note. For programmatic use where only the returned summary
/// matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}
