//! Decoder configuration.

use crate::BLOCK_SIZE_UNIT;

/// Limits and legacy switches for a decompression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest block-size digit (1-9) accepted from a stream header.
    /// Bounds the per-block memory the session allocates.
    pub max_level: u8,
    /// Whether blocks flagged as randomized are decoded.
    /// Only encoders from before 0.9.5 ever set the flag.
    pub allow_randomized: bool,
}

impl DecoderConfig {
    /// Accept everything the format allows.
    pub const DEFAULT: Self = Self {
        max_level: 9,
        allow_randomized: true,
    };

    /// Reject the legacy randomized block path.
    pub const STRICT_MODERN: Self = Self {
        max_level: 9,
        allow_randomized: false,
    };

    /// Create a configuration with the given block-size cap.
    ///
    /// Values outside 1-9 are clamped.
    pub fn new(max_level: u8) -> Self {
        Self {
            max_level: max_level.clamp(1, 9),
            ..Self::DEFAULT
        }
    }

    /// Builder-style toggle for randomized blocks.
    pub fn with_randomized(mut self, allow: bool) -> Self {
        self.allow_randomized = allow;
        self
    }

    /// Largest pre-BWT block length this configuration admits.
    pub fn max_block_size(&self) -> usize {
        self.max_level as usize * BLOCK_SIZE_UNIT
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
