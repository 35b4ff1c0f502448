use thiserror::Error;

/// Errors the decoder can report. All errors are reported at frame
/// granularity; the context that produced one remains usable for the
/// next frame, but the caller should generally force a keyframe after
/// seeing one.
#[derive(Error, Debug)]
pub enum RmvError {
  #[error("truncated bitstream: needed {needed} more byte(s) at offset {offset}")]
  Truncated { needed: usize, offset: usize },

  #[error("corrupt frame: {reason}")]
  CorruptFrame { reason: String },

  #[error("unsupported stream: {reason}")]
  Unsupported { reason: String },

  #[error("failed to allocate plane buffers")]
  AllocationFailure,

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl RmvError {
  pub fn corrupt<S: Into<String>>(reason: S) -> Self {
    RmvError::CorruptFrame { reason: reason.into() }
  }

  pub fn unsupported<S: Into<String>>(reason: S) -> Self {
    RmvError::Unsupported { reason: reason.into() }
  }
}

pub type Result<T> = std::result::Result<T, RmvError>;
