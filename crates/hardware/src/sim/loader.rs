//! NOFF Executable Loading.
//!
//! This module reads user programs in the NOFF object format. It performs:
//! 1. **Binary loading:** Reads an image from disk into a byte buffer.
//! 2. **Header parsing:** Decodes the magic number and the three segment descriptors.
//! 3. **Validation:** Rejects images with a bad magic number or segments that run
//!    past the end of the file.
//!
//! Every header field is a little-endian 32-bit word:
//!
//! * `0x00`: magic (`0x00badfad`)
//! * `0x04`: code segment (virtual address, file offset, size)
//! * `0x10`: initialized data segment
//! * `0x1c`: uninitialized data segment (zero-filled, never read from the file)

use std::fs;
use std::path::Path;

use crate::common::SimError;
use crate::common::constants::NOFF_MAGIC;

/// Size in bytes of an encoded NOFF header.
pub const NOFF_HEADER_SIZE: usize = 40;

/// One segment descriptor from the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// Location of the segment in the virtual address space.
    pub virtual_addr: u32,
    /// Offset of the segment's bytes inside the image.
    pub in_file_addr: u32,
    /// Segment size in bytes.
    pub size: u32,
}

impl Segment {
    /// Returns the segment's bytes from `image`.
    ///
    /// # Errors
    ///
    /// [`SimError::Truncated`] if the segment extends past the end of the image.
    pub fn bytes<'a>(&self, image: &'a [u8]) -> Result<&'a [u8], SimError> {
        let start = self.in_file_addr as usize;
        let end = start.saturating_add(self.size as usize);
        image.get(start..end).ok_or(SimError::Truncated {
            needed: end,
            found: image.len(),
        })
    }
}

/// Decoded NOFF header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoffHeader {
    /// Executable code.
    pub code: Segment,
    /// Initialized data.
    pub init_data: Segment,
    /// Uninitialized data, zeroed before use.
    pub uninit_data: Segment,
}

impl NoffHeader {
    /// Parses the header at the start of `image`.
    ///
    /// # Errors
    ///
    /// * [`SimError::Truncated`] if the image is shorter than a header.
    /// * [`SimError::BadMagic`] if the first word is not the NOFF magic number.
    pub fn parse(image: &[u8]) -> Result<Self, SimError> {
        if image.len() < NOFF_HEADER_SIZE {
            return Err(SimError::Truncated {
                needed: NOFF_HEADER_SIZE,
                found: image.len(),
            });
        }

        let word = |i: usize| {
            let at = i * 4;
            u32::from_le_bytes([image[at], image[at + 1], image[at + 2], image[at + 3]])
        };
        let segment = |first: usize| Segment {
            virtual_addr: word(first),
            in_file_addr: word(first + 1),
            size: word(first + 2),
        };

        let magic = word(0);
        if magic != NOFF_MAGIC {
            return Err(SimError::BadMagic { found: magic });
        }

        Ok(Self {
            code: segment(1),
            init_data: segment(4),
            uninit_data: segment(7),
        })
    }

    /// Bytes occupied by the three segments.
    ///
    /// # Errors
    ///
    /// [`SimError::ImageTooLarge`] if the sizes do not fit in 32 bits.
    pub fn image_size(&self) -> Result<u32, SimError> {
        self.code
            .size
            .checked_add(self.init_data.size)
            .and_then(|n| n.checked_add(self.uninit_data.size))
            .ok_or(SimError::ImageTooLarge {
                what: "segment sizes",
            })
    }

    /// Encodes the header, for building images in memory.
    pub fn to_bytes(&self) -> [u8; NOFF_HEADER_SIZE] {
        let words = [
            NOFF_MAGIC,
            self.code.virtual_addr,
            self.code.in_file_addr,
            self.code.size,
            self.init_data.virtual_addr,
            self.init_data.in_file_addr,
            self.init_data.size,
            self.uninit_data.virtual_addr,
            self.uninit_data.in_file_addr,
            self.uninit_data.size,
        ];
        let mut out = [0u8; NOFF_HEADER_SIZE];
        for (chunk, w) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        out
    }
}

/// Loads a binary file from disk into a byte vector.
///
/// # Arguments
///
/// * `path` - Path to the binary file.
///
/// # Returns
///
/// The raw bytes of the file, or [`SimError::Io`] naming the path.
pub fn load_binary(path: &Path) -> Result<Vec<u8>, SimError> {
    fs::read(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds a NOFF image whose code segment holds `words` at virtual address 0.
///
/// Handy for running hand-assembled programs without a cross compiler.
pub fn image_from_words(words: &[u32]) -> Vec<u8> {
    let code_size = (words.len() * 4) as u32;
    let header = NoffHeader {
        code: Segment {
            virtual_addr: 0,
            in_file_addr: NOFF_HEADER_SIZE as u32,
            size: code_size,
        },
        ..NoffHeader::default()
    };
    let mut image = header.to_bytes().to_vec();
    image.extend(words.iter().flat_map(|w| w.to_le_bytes()));
    image
}
