//! pilates - convert and transform PNG files from the command line

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pilates::{
  png::{self, EncodeOptions, FilterStrategy, FilterType, IHDR},
  Image, Transform, Zlib,
};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "pilates")]
#[command(author, version, about = "PNG conversion and pixel transforms")]
#[command(long_about = "
Decodes a PNG, runs colour model changes and transforms on it, and writes a new PNG.

Examples:
  pilates info photo.png
  pilates convert photo.png gray.png --grayscale
  pilates convert photo.png small.png --resize 64x48 --filter adaptive
  pilates convert photo.png art.png --sort --reverse --invert
")]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Log what the codec is doing to stderr (repeat for more)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// List the chunks and header of a PNG file
  #[command(visible_alias = "i")]
  Info(InfoArgs),

  /// Decode, change, and re-encode a PNG file
  #[command(visible_alias = "c")]
  Convert(ConvertArgs),
}

#[derive(Args)]
struct InfoArgs {
  /// Input PNG
  input: PathBuf,
}

#[derive(Args)]
struct ConvertArgs {
  /// Input PNG
  input: PathBuf,

  /// Output PNG
  output: PathBuf,

  /// Convert RGB(A) to greyscale
  #[arg(long, conflicts_with = "truecolour")]
  grayscale: bool,

  /// Convert greyscale to RGB(A)
  #[arg(long)]
  truecolour: bool,

  /// Add an opaque alpha channel
  #[arg(long, conflicts_with = "remove_alpha")]
  add_alpha: bool,

  /// Drop the alpha channel
  #[arg(long)]
  remove_alpha: bool,

  /// Rescale samples to this bit depth
  #[arg(long, value_name = "BITS")]
  depth: Option<u8>,

  /// Bilinear resize, eg: 640x480
  #[arg(long, value_name = "WxH", value_parser = parse_size)]
  resize: Option<(u32, u32)>,

  /// Sort the pixels of each row from dark to light
  #[arg(long)]
  sort: bool,

  /// Sort from light to dark instead
  #[arg(long, requires = "sort")]
  reverse: bool,

  /// Invert the colour channels
  #[arg(long)]
  invert: bool,

  /// Scanline filter for the output
  #[arg(long, value_enum, default_value_t = FilterArg::None)]
  filter: FilterArg,

  /// zlib level, 0 to 10
  #[arg(long, default_value_t = 6)]
  level: u8,

  /// Split the compressed data into IDAT chunks of at most this many bytes
  #[arg(long, value_name = "BYTES")]
  idat_len: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
  None,
  Sub,
  Up,
  Average,
  Paeth,
  /// pick the best filter for each line
  Adaptive,
}
impl From<FilterArg> for FilterStrategy {
  fn from(f: FilterArg) -> Self {
    match f {
      FilterArg::None => FilterStrategy::Fixed(FilterType::None),
      FilterArg::Sub => FilterStrategy::Fixed(FilterType::Sub),
      FilterArg::Up => FilterStrategy::Fixed(FilterType::Up),
      FilterArg::Average => FilterStrategy::Fixed(FilterType::Average),
      FilterArg::Paeth => FilterStrategy::Fixed(FilterType::Paeth),
      FilterArg::Adaptive => FilterStrategy::MinSumAbs,
    }
  }
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
  let Some((w, h)) = s.split_once(['x', 'X']) else {
    bail!("expected WIDTHxHEIGHT, got {s:?}");
  };
  Ok((w.trim().parse().context("bad width")?, h.trim().parse().context("bad height")?))
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let level = match cli.verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  };
  // also forwards the library's `log` records
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init()
    .map_err(|e| anyhow!("setting up logging: {e}"))?;

  match cli.command {
    Commands::Info(args) => info(args),
    Commands::Convert(args) => convert(args),
  }
}

fn info(args: InfoArgs) -> Result<()> {
  let bytes =
    std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
  let chunks = png::parse_chunks(&bytes).context("parsing the chunk stream")?;
  for chunk in &chunks {
    let (kind, len, crc) = (chunk.chunk_type(), chunk.data().len(), chunk.declared_crc());
    println!("{kind:?}: {len} bytes, crc {crc:#010x}");
  }
  if let Some(first) = chunks.first() {
    let header = IHDR::try_from(first.data())?;
    println!(
      "{}x{} {:?}, {} bits per sample",
      header.width, header.height, header.color_type, header.bit_depth
    );
  }
  Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
  let mut image =
    Image::from_file(&args.input).with_context(|| format!("decoding {}", args.input.display()))?;

  if args.grayscale {
    image = image.to_grayscale()?;
  }
  if args.truecolour {
    image = image.to_truecolour()?;
  }
  if args.add_alpha {
    image = image.add_alpha()?;
  }
  if args.remove_alpha {
    image = image.remove_alpha()?;
  }
  if let Some(depth) = args.depth {
    image = image.set_bit_depth(depth)?;
  }
  if let Some((width, height)) = args.resize {
    image = image.apply_transform(Transform::Resize { width, height })?;
  }
  if args.sort {
    image = image.apply_transform(Transform::Sort { reverse: args.reverse })?;
  }
  if args.invert {
    image = image.apply_transform(Transform::Invert)?;
  }

  let options = EncodeOptions { filter: args.filter.into(), max_idat_len: args.idat_len };
  let bytes = png::encode_with(&image, &Zlib::new(args.level)?, &options)?;
  std::fs::write(&args.output, bytes)
    .with_context(|| format!("writing {}", args.output.display()))?;
  Ok(())
}
