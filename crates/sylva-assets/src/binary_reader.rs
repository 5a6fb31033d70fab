//! Sequential typed reads over a byte stream.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use bytemuck::Pod;

/// Errors that can occur while reading binary data.
#[derive(Debug, thiserror::Error)]
pub enum BinaryReadError {
    /// The stream ended before the requested number of bytes was available.
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes")]
    UnexpectedEof {
        /// Read position when the read was attempted.
        offset: u64,
        /// Number of bytes requested.
        needed: usize,
    },
    /// Any other I/O failure from the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads plain-old-data values from a byte stream, tracking the read position.
///
/// [`BinaryReader::read`] reinterprets raw bytes in host byte order. File
/// formats that must be portable use the explicit `*_le` helpers instead.
pub struct BinaryReader<R> {
    inner: R,
    pos: u64,
}

impl BinaryReader<BufReader<File>> {
    /// Opens a file for buffered binary reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BinaryReadError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> BinaryReader<R> {
    /// Wraps an arbitrary reader.
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Fills `block` completely or fails without advancing the position.
    pub fn read_bytes(&mut self, block: &mut [u8]) -> Result<(), BinaryReadError> {
        match self.inner.read_exact(block) {
            Ok(()) => {
                self.pos += block.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(BinaryReadError::UnexpectedEof {
                offset: self.pos,
                needed: block.len(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads one `T` by copying `size_of::<T>()` bytes into it.
    pub fn read<T: Pod>(&mut self) -> Result<T, BinaryReadError> {
        let mut value = T::zeroed();
        self.read_bytes(bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16, BinaryReadError> {
        Ok(u16::from_le_bytes(self.read::<[u8; 2]>()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, BinaryReadError> {
        Ok(u32::from_le_bytes(self.read::<[u8; 4]>()?))
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32_le(&mut self) -> Result<f32, BinaryReadError> {
        Ok(f32::from_le_bytes(self.read::<[u8; 4]>()?))
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
