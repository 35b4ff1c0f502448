// CLI front-end over the `rmv` library: encodes a raw framed BGR24 stream
// to an RMV/IVF packet stream, or decodes one back to raw framed GBR
// planes. Mirrors the role tinyavif's `main.rs` plays for its toy AV1
// encoder, but driven by `clap` subcommands instead of hardcoded constants.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rmv::container::HostPlane;
use rmv::ivf::{IvfReader, IvfWriter};
use rmv::rawio::{RawFrameReader, RawFrameWriter};
use rmv::{Decoder, DecoderConfig, Encoder, EncoderConfig};

#[derive(Parser)]
#[command(name = "rmv-tool", about = "Encode/decode Retro Motion Video streams")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Encode a raw framed BGR24 stream into an RMV packet stream
  Encode {
    input: String,
    output: String,
    #[arg(long, default_value_t = 10)]
    keyint: u32,
    #[arg(long, default_value_t = 4)]
    me_range: i32,
  },
  /// Decode an RMV packet stream into a raw framed GBR planar stream
  Decode { input: String, output: String },
}

fn run_encode(input: &str, output: &str, keyint: u32, me_range: i32) -> rmv::Result<()> {
  let in_file = File::open(input)?;
  let mut reader = RawFrameReader::new(BufReader::new(in_file))?;

  let out_file = File::create(output)?;
  let mut writer = IvfWriter::new(BufWriter::new(out_file), reader.width as u32, reader.height as u32)?;

  let config = EncoderConfig::with_me_range(reader.width, reader.height, keyint, me_range)?;
  let mut encoder = Encoder::new(config);

  let stride = reader.width * 3;
  let mut frame_no = 0u64;
  while let Some(frame) = reader.read_frame()? {
    let (packet, keyframe) = encoder.encode_frame(&frame, stride);
    log::debug!("encoded frame {frame_no}: {} bytes, keyframe={keyframe}", packet.len());
    writer.write_packet(&packet)?;
    frame_no += 1;
  }

  log::info!("encoded {frame_no} frame(s)");
  Ok(())
}

fn run_decode(input: &str, output: &str) -> rmv::Result<()> {
  let in_file = File::open(input)?;
  let (mut reader, width, height) = IvfReader::new(BufReader::new(in_file))?;
  let (width, height) = (width as usize, height as usize);

  let out_file = File::create(output)?;
  let mut writer = RawFrameWriter::new(BufWriter::new(out_file), width, height)?;

  let config = DecoderConfig::new(width, height)?;
  let mut decoder = Decoder::new(config);

  let plane_bytes = width * height;
  let mut frame_no = 0u64;
  while let Some(packet) = reader.read_packet()? {
    let mut g = vec![0u8; plane_bytes];
    let mut b = vec![0u8; plane_bytes];
    let mut r = vec![0u8; plane_bytes];
    {
      let mut dst = [
        HostPlane { data: &mut g, stride: width },
        HostPlane { data: &mut b, stride: width },
        HostPlane { data: &mut r, stride: width },
      ];
      if let Err(e) = decoder.decode_frame(&packet, &mut dst) {
        log::error!("failed to decode frame {frame_no}: {e}");
        return Err(e);
      }
    }

    let mut out = Vec::with_capacity(plane_bytes * 3);
    out.extend_from_slice(&g);
    out.extend_from_slice(&b);
    out.extend_from_slice(&r);
    writer.write_frame(&out)?;
    frame_no += 1;
  }

  log::info!("decoded {frame_no} frame(s)");
  Ok(())
}

fn main() -> ExitCode {
  env_logger::init();
  let cli = Cli::parse();

  let result = match cli.command {
    Command::Encode { input, output, keyint, me_range } => run_encode(&input, &output, keyint, me_range),
    Command::Decode { input, output } => run_decode(&input, &output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      log::error!("{e}");
      ExitCode::FAILURE
    }
  }
}
