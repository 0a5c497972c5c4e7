use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Mosaiq: approximate an image with geometric primitives.
///
/// Searches for the shape whose addition best matches the target, commits
/// it, and repeats. Emits raster composites, SVG transcripts, and animated
/// GIFs of the build-up.
#[derive(Parser, Debug)]
#[command(
  name = "mosaiq",
  about = "Approximate an image with geometric primitives",
  long_about = "Repeatedly search for the primitive shape whose addition most\n\
                reduces the error against the target image, then emit the\n\
                composite as PNG/JPEG, the transcript as SVG, or the build-up\n\
                as an animated GIF.\n\n\
                Example:\n  \
                mosaiq -i photo.jpg -o out.png -o out.svg -n 200 -m 1"
)]
pub struct CliArgs {
  /// Input image (PNG or JPEG).
  #[arg(short, long, required_unless_present = "repl")]
  pub input: Option<PathBuf>,

  /// Output path(s): .png, .jpg, .svg or .gif.
  /// A literal `%d` in a path saves numbered intermediate frames.
  #[arg(short, long = "output", value_name = "FILE")]
  pub outputs: Vec<PathBuf>,

  /// Number of shapes to commit.
  #[arg(short = 'n', long, default_value_t = 100)]
  pub count: u32,

  /// Shape mode: 0=any 1=triangle 2=rect 3=ellipse 4=circle
  /// 5=rotatedrect 6=beziers 7=rotatedellipse 8=polygon.
  #[arg(short, long, default_value_t = 1)]
  pub mode: u32,

  /// Shape alpha 1-255, or 0 to let the search optimize alpha per shape.
  #[arg(short, long, default_value_t = 128)]
  pub alpha: u8,

  /// Extra local optimization passes per committed shape.
  #[arg(long, default_value_t = 0)]
  pub repeat: u32,

  /// Downscale the input so its larger dimension is at most this (0 disables).
  #[arg(short, long, default_value_t = 256)]
  pub resize: u32,

  /// Size of the larger dimension of the emitted outputs.
  #[arg(short, long, default_value_t = 1024)]
  pub size: u32,

  /// Worker count (0 = one per logical CPU).
  #[arg(short = 'j', long, default_value_t = 0)]
  pub workers: usize,

  /// Background color as a hex string (default: mean color of the input).
  #[arg(long, value_name = "RRGGBB")]
  pub bg: Option<String>,

  /// With `%d` outputs, save every Nth frame.
  #[arg(long, default_value_t = 1)]
  pub nth: u32,

  /// Base RNG seed (default: derived from the clock).
  #[arg(long)]
  pub seed: Option<u64>,

  /// Increase log verbosity (-v shows per-shape progress, -vv the climbs).
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,

  /// Read line-oriented commands from stdin instead of running a batch.
  #[arg(long)]
  pub repl: bool,

  /// In REPL mode, exit non-zero after this many seconds without input
  /// (0 disables the watchdog).
  #[arg(long, default_value_t = 0, value_name = "SECONDS")]
  pub idle_timeout: u64,
}
