//! The `image` module defines the [`ImageSink`] trait, the output seam of a conversion
//! pass, together with its two implementations: [`SparseImage`], an in-memory sparse
//! buffer backed by a `BTreeMap`, and [`FileImage`], a file opened for random-access
//! single-byte writes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Random-access byte sink filled by a conversion pass.
///
/// Writes arrive in the stream order of the hex records, which is not
/// necessarily address order. `flush` is invoked once after a successful pass.
pub trait ImageSink {
    /// Write one byte at the given absolute address.
    ///
    /// # Errors
    /// Returns an error if the sink cannot store the byte.
    fn write_byte(&mut self, address: u64, byte: u8) -> io::Result<()>;

    /// Persist any buffered state. Called once after a successful pass.
    ///
    /// # Errors
    /// Returns an error if buffered data cannot be written out.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory sparse image. Addresses without data take no space, and the
/// buffer can be inspected, iterated, or flattened to a binary file.
#[derive(Debug, Clone)]
pub struct SparseImage {
    /// Data buffer of the reconstructed image
    buffer: BTreeMap<u64, u8>,
}

impl Default for SparseImage {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SparseImage {
    type Item = (&'a u64, &'a u8);
    type IntoIter = std::collections::btree_map::Iter<'a, u64, u8>;
    fn into_iter(self) -> Self::IntoIter {
        self.buffer.iter()
    }
}

impl SparseImage {
    /// Creates an empty `SparseImage`.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::SparseImage;
    ///
    /// let image = SparseImage::new();
    /// assert!(image.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: BTreeMap::new(),
        }
    }

    /// Get byte from the image at the provided address.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::{ImageSink, SparseImage};
    ///
    /// let mut image = SparseImage::new();
    /// image.write_byte(0x1000, 0xFA).unwrap();
    ///
    /// assert_eq!(image.get_byte(0x1000), Some(0xFA));
    /// assert_eq!(image.get_byte(0x1001), None);
    /// ```
    #[must_use]
    pub fn get_byte(&self, address: u64) -> Option<u8> {
        self.buffer.get(&address).copied()
    }

    /// Get the smallest address present in the image.
    #[must_use]
    pub fn get_min_addr(&self) -> Option<u64> {
        self.buffer.first_key_value().map(|(key, _)| *key)
    }

    /// Get the highest address present in the image.
    #[must_use]
    pub fn get_max_addr(&self) -> Option<u64> {
        self.buffer.last_key_value().map(|(key, _)| *key)
    }

    /// Number of data bytes held (gaps excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a copy of the data buffer as a `BTreeMap` of (address, byte) pairs.
    #[must_use]
    pub fn to_btree_map(&self) -> BTreeMap<u64, u8> {
        self.buffer.clone()
    }

    /// Get an iterator over (address, byte) pairs, in address order.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::{ImageSink, SparseImage};
    ///
    /// let mut image = SparseImage::new();
    /// image.write_byte(0x02, 0xBB).unwrap();
    /// image.write_byte(0x01, 0xAA).unwrap();
    ///
    /// let (first_addr, first_byte) = image.iter().next().unwrap();
    /// assert_eq!((*first_addr, *first_byte), (0x01, 0xAA));
    /// ```
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, u64, u8> {
        self.into_iter()
    }

    /// Flatten the image into a binary file at the specified path, starting
    /// from the lowest occupied address. Address gaps are filled with the
    /// provided `gap_fill` byte (usually 0x00 or 0xFF).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    ///
    /// # Examples
    /// ```
    /// use hex2binlib::{ImageSink, SparseImage};
    ///
    /// let mut image = SparseImage::new();
    /// image.write_byte(0x1000, 0x01).unwrap();
    /// image.write_byte(0x1004, 0x02).unwrap();
    /// image.write_bin("build/ex1/fw.bin", 0xFF).unwrap();
    ///
    /// // Flattened from the lowest address: 2 data bytes + 3 filled gap bytes
    /// assert_eq!(std::fs::metadata("build/ex1/fw.bin").unwrap().len(), 5);
    /// ```
    pub fn write_bin<P: AsRef<Path>>(&self, filepath: P, gap_fill: u8) -> io::Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = filepath.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(filepath)?;

        // Wrap in BufWriter for efficient byte-by-byte writing
        let mut writer = std::io::BufWriter::new(file);

        let start = self.get_min_addr().unwrap_or(0);
        let mut current_addr = start;

        for (addr, byte) in &self.buffer {
            // Fill gaps
            while current_addr < *addr {
                writer.write_all(&[gap_fill])?;
                current_addr += 1;
            }

            // Write actual byte
            writer.write_all(&[*byte])?;
            current_addr += 1;
        }

        writer.flush()?;
        Ok(())
    }
}

impl ImageSink for SparseImage {
    fn write_byte(&mut self, address: u64, byte: u8) -> io::Result<()> {
        // Later records may rewrite an address; the last write wins
        self.buffer.insert(address, byte);
        Ok(())
    }
}

/// Image sink backed by a file opened for random-access writes. Bytes land at
/// their absolute addresses as file offsets; regions never written read back
/// as zeros in the freshly created file.
#[derive(Debug)]
pub struct FileImage {
    file: File,
    /// File offset after the last write, to skip redundant seeks
    position: u64,
}

impl FileImage {
    /// Creates (or truncates) the file at `filepath`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(filepath: P) -> io::Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = filepath.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(filepath)?;

        Ok(Self { file, position: 0 })
    }
}

impl ImageSink for FileImage {
    fn write_byte(&mut self, address: u64, byte: u8) -> io::Result<()> {
        if self.position != address {
            self.file.seek(SeekFrom::Start(address))?;
        }
        self.file.write_all(&[byte])?;
        self.position = address + 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
