// Minimal length-prefixed framing for a sequence of encoded RMV packets.
//
// Named after the similarly-minimal "IVF" container used elsewhere in the
// ecosystem to carry a raw codec bitstream: a tiny fixed header followed by
// `u32 length, payload` pairs, nothing else. This is just enough framing
// for `rmv-tool` to write a whole encoded sequence to one file and read it
// back, the same role `tinyavif`'s ISOBMFF/AVIF packaging plays for a
// single AV1 frame.

use std::io::prelude::*;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const FILE_MAGIC: &[u8; 4] = b"RIVF";

pub struct IvfWriter<W> {
  inner: W,
}

pub struct IvfReader<R> {
  inner: R,
}

impl<W: Write> IvfWriter<W> {
  pub fn new(mut inner: W, width: u32, height: u32) -> std::io::Result<Self> {
    inner.write_all(FILE_MAGIC)?;
    inner.write_u32::<LittleEndian>(width)?;
    inner.write_u32::<LittleEndian>(height)?;
    Ok(Self { inner })
  }

  pub fn write_packet(&mut self, packet: &[u8]) -> std::io::Result<()> {
    self.inner.write_u32::<LittleEndian>(packet.len() as u32)?;
    self.inner.write_all(packet)
  }
}

impl<R: Read> IvfReader<R> {
  pub fn new(mut inner: R) -> std::io::Result<(Self, u32, u32)> {
    let mut magic = [0u8; 4];
    inner.read_exact(&mut magic)?;
    if &magic != FILE_MAGIC {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "not an RIVF stream"));
    }
    let width = inner.read_u32::<LittleEndian>()?;
    let height = inner.read_u32::<LittleEndian>()?;
    Ok((Self { inner }, width, height))
  }

  /// Returns `Ok(None)` at clean end of stream.
  pub fn read_packet(&mut self) -> std::io::Result<Option<Vec<u8>>> {
    let len = match self.inner.read_u32::<LittleEndian>() {
      Ok(len) => len,
      Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
      Err(e) => return Err(e),
    };
    let mut packet = vec![0u8; len as usize];
    self.inner.read_exact(&mut packet)?;
    Ok(Some(packet))
  }
}
