pub mod bitstream;
pub mod config;
pub mod container;
pub mod error;
pub mod frame;
pub mod inter;
pub mod intra;
pub mod ivf;
pub mod motion;
pub mod rawio;
pub mod util;

pub use config::{DecoderConfig, EncoderConfig};
pub use container::{Decoder, Encoder, HostPlane};
pub use error::{Result, RmvError};
pub use frame::Frame;
