//! Program Image Loading.
//!
//! A program image is a flat file of 64-bit instruction words, little-endian,
//! to be placed at IRAM address 0. This module performs:
//! 1. **File loading:** Reads the image from disk.
//! 2. **Word decoding:** Splits the bytes into instruction words, rejecting partial words.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::common::SimResult;
use crate::common::constants::IRAM_WORDS;

/// Decodes a byte image into instruction words.
///
/// # Arguments
///
/// * `bytes` - Little-endian image; its length must be a multiple of 8.
///
/// # Returns
///
/// The instruction words, or an `InvalidData` I/O error if the image has a
/// trailing partial word or does not fit in IRAM.
pub fn words_from_bytes(bytes: &[u8]) -> SimResult<Vec<u64>> {
    if bytes.len() % 8 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("program image length {} is not a multiple of 8", bytes.len()),
        )
        .into());
    }
    let words: Vec<u64> = bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect();
    if words.len() > IRAM_WORDS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("program of {} words does not fit in {IRAM_WORDS} words of iram", words.len()),
        )
        .into());
    }
    Ok(words)
}

/// Reads a program image from disk.
pub fn load_program(path: impl AsRef<Path>) -> SimResult<Vec<u64>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let words = words_from_bytes(&bytes)?;
    debug!(path = %path.display(), words = words.len(), "program loaded");
    Ok(words)
}
