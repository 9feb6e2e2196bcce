//! Zlib compression for pack-file entity payloads.
//!
//! The pack-file format (§4.4/§6 of the engine's spec) stores each entity's
//! YAML as `base64(zlib(yaml(entity)))`. This crate owns the zlib half of
//! that pipeline; `nt-objects` owns the base64/YAML framing around it.

mod error;

pub use error::CompressionError;

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::io::Read;

/// Compression effort, mapped onto zlib's 0-9 level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Level 1. Favors throughput during a large `add`.
    Fast,
    /// Level 6, zlib's own default and this engine's default.
    #[default]
    Default,
    /// Level 9. Used for `gc --aggressive` repacking.
    Best,
}

impl CompressionLevel {
    fn to_flate2(self) -> Compression {
        match self {
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::new(6),
            CompressionLevel::Best => Compression::best(),
        }
    }
}

/// Compress `data` with zlib at the given level.
///
/// Empty input compresses to empty output; this keeps empty flashcard
/// backs and empty note bodies from growing a zlib header for nothing.
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut encoder = ZlibEncoder::new(data, level.to_flate2());
    let mut out = Vec::new();
    encoder
        .read_to_end(&mut out)
        .map_err(|e| CompressionError::Compress(e.to_string()))?;
    Ok(out)
}

/// Decompress zlib-compressed `data`.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CompressionError::Decompress(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"Note: Example\nbody text that repeats repeats repeats";
        let compressed = compress(data, CompressionLevel::Default).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_roundtrips_to_empty() {
        assert!(compress(b"", CompressionLevel::Default).unwrap().is_empty());
        assert!(decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn best_is_no_larger_than_fast_for_repetitive_data() {
        let data = b"abcabcabcabcabcabcabcabcabcabcabcabcabcabc".repeat(50);
        let fast = compress(&data, CompressionLevel::Fast).unwrap();
        let best = compress(&data, CompressionLevel::Best).unwrap();
        assert!(best.len() <= fast.len() + 16);
    }

    proptest::proptest! {
        #[test]
        fn roundtrip_is_lossless(data: Vec<u8>) {
            let compressed = compress(&data, CompressionLevel::Default).unwrap();
            let decompressed = decompress(&compressed).unwrap();
            proptest::prop_assert_eq!(decompressed, data);
        }
    }
}
