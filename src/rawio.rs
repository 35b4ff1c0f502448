// Minimal framed raw-pixel container for the CLI tool.
//
// Not Y4M: RMV's host interface is interleaved BGR24 in, planar GBR out
// (spec.md §4.6/§6), and Y4M's header vocabulary is built for YUV -- there
// is no honest way to label a G/B/R plane triple with it. This format
// keeps the same shape as tinyavif's y4m.rs (an ASCII header line with
// `W`/`H` parameters, then a magic-prefixed marker before each frame's raw
// bytes), but is layout-agnostic: it just frames `width * height * 3`-byte
// blobs. Whether those bytes are interleaved BGR24 (encoder input) or three
// concatenated G/B/R planes (decoder output) is up to the caller --
// `rmv-tool` is the one that knows which.

use std::io::prelude::*;

use byteorder::{ReadBytesExt, WriteBytesExt};

const FILE_MAGIC: &str = "RMVRAW1 ";
const FRAME_MAGIC: &str = "FRAME";

pub struct RawFrameReader<R> {
  inner: R,
  pub width: usize,
  pub height: usize,
}

pub struct RawFrameWriter<W> {
  inner: W,
}

fn read_decimal<R: Read>(r: &mut R) -> std::io::Result<usize> {
  let mut v = 0usize;
  loop {
    let byte = r.read_u8()?;
    match byte {
      b'0'..=b'9' => v = 10 * v + (byte - b'0') as usize,
      _ => return Ok(v),
    }
  }
}

impl<R: Read> RawFrameReader<R> {
  pub fn new(mut inner: R) -> std::io::Result<Self> {
    let mut magic = [0u8; 8];
    inner.read_exact(&mut magic)?;
    if magic != FILE_MAGIC.as_bytes() {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "not an RMVRAW1 stream"));
    }

    if inner.read_u8()? != b'W' {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected W<width> header field"));
    }
    let width = read_decimal(&mut inner)?;

    if inner.read_u8()? != b'H' {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected H<height> header field"));
    }
    let height = read_decimal(&mut inner)?;
    // read_decimal already consumed the terminating newline

    if width == 0 || height == 0 {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "zero width/height in header"));
    }

    Ok(Self { inner, width, height })
  }

  /// Returns `Ok(None)` at clean end of stream, `Err` on a short/corrupt frame.
  pub fn read_frame(&mut self) -> std::io::Result<Option<Vec<u8>>> {
    let mut marker = [0u8; 5];
    match self.inner.read_exact(&mut marker) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
      Err(e) => return Err(e),
    }
    if marker != FRAME_MAGIC.as_bytes() {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected FRAME marker"));
    }
    if self.inner.read_u8()? != b'\n' {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected newline after FRAME"));
    }

    let mut buf = vec![0u8; self.width * self.height * 3];
    self.inner.read_exact(&mut buf)?;
    Ok(Some(buf))
  }
}

impl<W: Write> RawFrameWriter<W> {
  pub fn new(mut inner: W, width: usize, height: usize) -> std::io::Result<Self> {
    inner.write_all(FILE_MAGIC.as_bytes())?;
    write!(inner, "W{width} H{height}\n")?;
    Ok(Self { inner })
  }

  pub fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
    self.inner.write_all(FRAME_MAGIC.as_bytes())?;
    self.inner.write_u8(b'\n')?;
    self.inner.write_all(frame)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn round_trips_header_and_frames() {
    let mut buf = Vec::new();
    {
      let mut w = RawFrameWriter::new(&mut buf, 4, 2).unwrap();
      w.write_frame(&[1u8; 4 * 2 * 3]).unwrap();
      w.write_frame(&[2u8; 4 * 2 * 3]).unwrap();
    }

    let mut r = RawFrameReader::new(Cursor::new(buf)).unwrap();
    assert_eq!((r.width, r.height), (4, 2));
    let f0 = r.read_frame().unwrap().unwrap();
    assert_eq!(f0, vec![1u8; 24]);
    let f1 = r.read_frame().unwrap().unwrap();
    assert_eq!(f1, vec![2u8; 24]);
    assert!(r.read_frame().unwrap().is_none());
  }

  #[test]
  fn rejects_bad_magic() {
    let buf = b"NOTRMVRA W4 H4\n".to_vec();
    assert!(RawFrameReader::new(Cursor::new(buf)).is_err());
  }
}
