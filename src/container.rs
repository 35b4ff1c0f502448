// Frame container: the 6-byte frame header, frame-type dispatch, the
// keyframe scheduler, and the BGR24<->GBR boundary with the host.
//
// Grounded on libavcodec/rmvenc.c::encode_frame (keyframe counter,
// interleave-then-encode-then-update-previous ordering) and
// libavcodec/rmv.c::decode_frame / copy_frame_internal (header validation,
// frame-type dispatch, and the previous-plane refresh resolved in
// SPEC_FULL.md's design notes).

use crate::bitstream::{BitstreamReader, BitstreamWriter};
use crate::config::{DecoderConfig, EncoderConfig};
use crate::error::{Result, RmvError};
use crate::frame::{Frame, BLOCK_SIZE};
use crate::inter::{decode_inter_plane, encode_inter_plane, BlockDecision};
use crate::intra::{decode_intra_plane, encode_intra_plane, INTRA_PRED_UP_RLE};
use crate::motion::estimate_block;

const FRAME_MAGIC: &[u8; 3] = b"RMV";
const FRAME_TYPE_INTRA: u8 = 1;
const FRAME_TYPE_INTER: u8 = 2;
const PIX_TYPE_GBRP: u8 = 1;

/// A destination plane the host wants decoded pixels written into, using
/// the host's own row stride (which need not match our internal one).
pub struct HostPlane<'a> {
  pub data: &'a mut [u8],
  pub stride: usize,
}

pub struct Encoder {
  config: EncoderConfig,
  current: Frame,
  previous: Frame,
  frame_cnt: u32,
}

impl Encoder {
  pub fn new(config: EncoderConfig) -> Self {
    let current = Frame::new(config.width, config.height);
    let previous = Frame::new(config.width, config.height);
    Self { config, current, previous, frame_cnt: 0 }
  }

  /// Encode one frame from host-supplied interleaved BGR24 pixels (`stride`
  /// bytes per row, B at offset 0, G at offset 1, R at offset 2). Returns
  /// the encoded packet and whether it was a keyframe.
  pub fn encode_frame(&mut self, bgr24: &[u8], stride: usize) -> (Box<[u8]>, bool) {
    deinterleave_bgr24(&mut self.current, bgr24, stride);

    let keyframe = self.frame_cnt == 0;
    self.frame_cnt += 1;
    if self.frame_cnt >= self.config.keyint_min {
      self.frame_cnt = 0;
    }

    let worst_case = 6 + 3 * 4 * self.current.g().stride * self.current.g().full_height;
    let mut w = BitstreamWriter::with_capacity(worst_case);
    w.write_bytes(FRAME_MAGIC);
    w.write_u8(if keyframe { FRAME_TYPE_INTRA } else { FRAME_TYPE_INTER });
    w.write_u8(PIX_TYPE_GBRP);
    w.write_u8(BLOCK_SIZE as u8);

    for i in 0..3 {
      if keyframe {
        encode_intra_plane(&mut w, self.current.plane(i), INTRA_PRED_UP_RLE);
      } else {
        let decisions = self.estimate_plane(i);
        encode_inter_plane(&mut w, &decisions);
      }
    }

    // previous is refreshed from the host-supplied source, not from any
    // reconstruction -- ERROR_DIRECT residuals are exact mod 256, so the two
    // never diverge, but this mirrors rmvenc.c's interleave_frame_bgr24 call
    // against the original host frame rather than against re-decoded data.
    self.previous.copy_from(&self.current);

    (w.finalize(), keyframe)
  }

  fn estimate_plane(&self, plane_idx: usize) -> Vec<BlockDecision> {
    let cur = self.current.plane(plane_idx);
    let prev = self.previous.plane(plane_idx);
    let bw = cur.blocks_wide();
    let bh = cur.blocks_high();
    let mut decisions = Vec::with_capacity(bw * bh);
    for by in 0..bh {
      for bx in 0..bw {
        decisions.push(estimate_block(cur, prev, bx, by, self.config.me_range));
      }
    }

    let (mut perfect, mut zero, mut error) = (0u32, 0u32, 0u32);
    for d in &decisions {
      match d.flags {
        crate::inter::BLOCK_PERFECT => perfect += 1,
        crate::inter::BLOCK_ZERO => zero += 1,
        crate::inter::BLOCK_ERROR_DIRECT => error += 1,
        _ => {}
      }
    }
    log::debug!("plane {plane_idx}: perfect={perfect}, zero={zero}, error={error}, blocks={}", decisions.len());

    decisions
  }
}

pub struct Decoder {
  config: DecoderConfig,
  previous: Frame,
}

impl Decoder {
  pub fn new(config: DecoderConfig) -> Self {
    let previous = Frame::new(config.width, config.height);
    Self { config, previous }
  }

  /// Decode one packet, writing the resulting GBR planes into `dst` (in
  /// G, B, R order) at the host's own strides.
  pub fn decode_frame(&mut self, packet: &[u8], dst: &mut [HostPlane; 3]) -> Result<()> {
    if packet.len() < 6 {
      let err = RmvError::corrupt("packet shorter than the 6-byte frame header");
      log::error!("{err}");
      return Err(err);
    }

    let mut r = BitstreamReader::new(packet);
    let magic = r.read_bytes(3)?;
    if magic != FRAME_MAGIC {
      let err = RmvError::corrupt("missing RMV frame magic");
      log::error!("{err}");
      return Err(err);
    }
    let frame_type = r.read_u8()?;
    let pix_type = r.read_u8()?;
    let block_size = r.read_u8()?;

    if pix_type != PIX_TYPE_GBRP {
      let err = RmvError::unsupported(format!("unsupported pixel format {pix_type}"));
      log::error!("{err}");
      return Err(err);
    }
    if block_size as usize != BLOCK_SIZE {
      let err = RmvError::unsupported(format!("unsupported block size {block_size}"));
      log::error!("{err}");
      return Err(err);
    }

    log::debug!("decoding frame_type={frame_type} ({} x {})", self.config.width, self.config.height);

    let mut decoded = Frame::new(self.config.width, self.config.height);

    match frame_type {
      FRAME_TYPE_INTRA => {
        for i in 0..3 {
          decode_intra_plane(&mut r, decoded.plane_mut(i))?;
        }
      }
      FRAME_TYPE_INTER => {
        for i in 0..3 {
          decode_inter_plane(&mut r, decoded.plane_mut(i), self.previous.plane(i))?;
        }
      }
      other => {
        let err = RmvError::corrupt(format!("unknown frame type {other}"));
        log::error!("{err}");
        return Err(err);
      }
    }

    for i in 0..3 {
      copy_plane_to_host(decoded.plane(i), &mut dst[i]);
    }

    self.previous.copy_from(&decoded);
    Ok(())
  }
}

fn deinterleave_bgr24(frame: &mut Frame, bgr24: &[u8], stride: usize) {
  let width = frame.g().width;
  let height = frame.g().height;
  for y in 0..height {
    let row = &bgr24[y * stride..y * stride + width * 3];
    for x in 0..width {
      let px = &row[x * 3..x * 3 + 3];
      frame.b_mut().set_pixel(x, y, px[0]);
      frame.g_mut().set_pixel(x, y, px[1]);
      frame.r_mut().set_pixel(x, y, px[2]);
    }
  }
}

fn copy_plane_to_host(plane: &crate::frame::Plane, dst: &mut HostPlane) {
  let width = plane.width;
  for y in 0..plane.height {
    let src = &plane.row(y)[..width];
    dst.data[y * dst.stride..y * dst.stride + width].copy_from_slice(src);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bgr24_frame(width: usize, height: usize, f: impl Fn(usize, usize) -> (u8, u8, u8)) -> Vec<u8> {
    let mut buf = vec![0u8; width * height * 3];
    for y in 0..height {
      for x in 0..width {
        let (b, g, r) = f(x, y);
        let off = (y * width + x) * 3;
        buf[off] = b;
        buf[off + 1] = g;
        buf[off + 2] = r;
      }
    }
    buf
  }

  fn decode_into(decoder: &mut Decoder, packet: &[u8], width: usize, height: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut g = vec![0u8; width * height];
    let mut b = vec![0u8; width * height];
    let mut r = vec![0u8; width * height];
    {
      let mut dst = [
        HostPlane { data: &mut g, stride: width },
        HostPlane { data: &mut b, stride: width },
        HostPlane { data: &mut r, stride: width },
      ];
      decoder.decode_frame(packet, &mut dst).unwrap();
    }
    (g, b, r)
  }

  #[test]
  fn first_frame_is_always_a_keyframe() {
    let config = EncoderConfig::new(16, 16, 10).unwrap();
    let mut enc = Encoder::new(config);
    let frame = bgr24_frame(16, 16, |_, _| (0, 0, 0));
    let (packet, keyframe) = enc.encode_frame(&frame, 16 * 3);
    assert!(keyframe);
    assert_eq!(&packet[0..3], b"RMV");
    assert_eq!(packet[3], FRAME_TYPE_INTRA);
  }

  #[test]
  fn keyframe_counter_resets_after_keyint() {
    let config = EncoderConfig::new(16, 16, 3).unwrap();
    let mut enc = Encoder::new(config);
    let frame = bgr24_frame(16, 16, |x, y| (x as u8, y as u8, 0));
    let flags: Vec<bool> = (0..6).map(|_| enc.encode_frame(&frame, 16 * 3).1).collect();
    assert_eq!(flags, vec![true, false, false, true, false, false]);
  }

  #[test]
  fn round_trips_identical_frame_sequence_via_perfect_blocks() {
    let config = EncoderConfig::new(32, 32, 10).unwrap();
    let mut enc = Encoder::new(config);
    let dconfig = DecoderConfig::new(32, 32).unwrap();
    let mut dec = Decoder::new(dconfig);

    let frame = bgr24_frame(32, 32, |x, y| (((x * 5) % 256) as u8, ((y * 7) % 256) as u8, ((x + y) % 256) as u8));

    let (p0, kf0) = enc.encode_frame(&frame, 32 * 3);
    assert!(kf0);
    let (g0, b0, r0) = decode_into(&mut dec, &p0, 32, 32);

    let (p1, kf1) = enc.encode_frame(&frame, 32 * 3);
    assert!(!kf1);
    let (g1, b1, r1) = decode_into(&mut dec, &p1, 32, 32);

    assert_eq!(g0, g1);
    assert_eq!(b0, b1);
    assert_eq!(r0, r1);
  }

  #[test]
  fn rejects_packet_shorter_than_header() {
    let dconfig = DecoderConfig::new(16, 16).unwrap();
    let mut dec = Decoder::new(dconfig);
    let mut g = vec![0u8; 256];
    let mut b = vec![0u8; 256];
    let mut r = vec![0u8; 256];
    let mut dst = [
      HostPlane { data: &mut g, stride: 16 },
      HostPlane { data: &mut b, stride: 16 },
      HostPlane { data: &mut r, stride: 16 },
    ];
    assert!(dec.decode_frame(&[1, 2, 3], &mut dst).is_err());
  }

  #[test]
  fn rejects_missing_magic() {
    let dconfig = DecoderConfig::new(16, 16).unwrap();
    let mut dec = Decoder::new(dconfig);
    let mut g = vec![0u8; 256];
    let mut b = vec![0u8; 256];
    let mut r = vec![0u8; 256];
    let mut dst = [
      HostPlane { data: &mut g, stride: 16 },
      HostPlane { data: &mut b, stride: 16 },
      HostPlane { data: &mut r, stride: 16 },
    ];
    let bogus = [b'X', b'M', b'V', FRAME_TYPE_INTRA, PIX_TYPE_GBRP, 16];
    let err = dec.decode_frame(&bogus, &mut dst).unwrap_err();
    assert!(matches!(err, RmvError::CorruptFrame { .. }));
  }
}
