//! # `hex2binlib`
//!
//! `hex2binlib` is a Rust library for converting Intel HEX files into flat binary images.
//!
//! The library provides:
//! - Record-by-record conversion of Intel HEX content (via [`Converter`]).
//! - Image sinks for the reconstructed binary: in-memory [`SparseImage`] and
//!   direct-to-disk [`FileImage`], extensible through the [`ImageSink`] trait.
//! - Diagnostics through the [`Reporter`] seam and a returned [`ConversionSummary`].
//! - Error handling with [`Hex2BinError`].
//!
//! ## Example
//!
//! ```
//! use hex2binlib::{Converter, NullReporter, SparseImage};
//!
//! let content = ":0100100042AD\n:00000001FF";
//! let mut image = SparseImage::new();
//! let summary = Converter::new()
//!     .convert_str(content, &mut image, &mut NullReporter)
//!     .unwrap();
//!
//! assert_eq!(image.get_byte(0x10), Some(0x42));
//! assert_eq!(summary.bytes_written, 1);
//! ```

mod convert;
mod error;
mod image;
mod record;
mod report;

// Public APIs
pub use convert::{ChecksumMismatch, ConversionSummary, Converter};
pub use error::{Hex2BinError, Hex2BinErrorKind};
pub use image::{FileImage, ImageSink, SparseImage};
pub use record::RecordType;
pub use report::{ConsoleReporter, NullReporter, Reporter};
