// Host-supplied configuration for encoder/decoder contexts.
//
// Mirrors the options table in the wire-format interface: `keyint_min`,
// `me_range`, `width`, `height`. Validation happens once at construction so
// the hot encode/decode paths never need to re-check these invariants.

use crate::error::{Result, RmvError};

pub const ME_RANGE_DEFAULT: i32 = 4;
pub const ME_RANGE_MAX: i32 = 127;

#[derive(Clone, Debug)]
pub struct EncoderConfig {
  pub width: usize,
  pub height: usize,
  pub keyint_min: u32,
  pub me_range: i32,
}

impl EncoderConfig {
  pub fn new(width: usize, height: usize, keyint_min: u32) -> Result<Self> {
    Self::with_me_range(width, height, keyint_min, ME_RANGE_DEFAULT)
  }

  pub fn with_me_range(width: usize, height: usize, keyint_min: u32, me_range: i32) -> Result<Self> {
    if width == 0 || height == 0 {
      return Err(RmvError::unsupported("width and height must both be non-zero"));
    }
    if keyint_min == 0 {
      return Err(RmvError::unsupported("keyint_min must be at least 1"));
    }
    Ok(Self {
      width,
      height,
      keyint_min,
      me_range: me_range.clamp(1, ME_RANGE_MAX),
    })
  }
}

#[derive(Clone, Debug)]
pub struct DecoderConfig {
  pub width: usize,
  pub height: usize,
}

impl DecoderConfig {
  pub fn new(width: usize, height: usize) -> Result<Self> {
    if width == 0 || height == 0 {
      return Err(RmvError::unsupported("width and height must both be non-zero"));
    }
    Ok(Self { width, height })
  }
}
