mod args;
mod io;
mod logger;
mod repl;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use mosaiq::prelude::{Color, Engine, ShapeKind};

use crate::args::CliArgs;

fn main() -> ExitCode {
  let cli = CliArgs::parse();
  logger::init(cli.verbose);
  let result = if cli.repl { repl::run(&cli) } else { run_batch(&cli) };
  match result {
    Ok(code) => code,
    Err(err) => {
      log::error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run_batch(p_cli: &CliArgs) -> Result<ExitCode> {
  let input = p_cli.input.as_ref().context("--input is required")?;
  if p_cli.outputs.is_empty() {
    bail!("at least one --output is required");
  }
  let kind = ShapeKind::from_index(p_cli.mode).context("--mode must be in 0..=8")?;

  let target = io::load_image(input, p_cli.resize)?;
  let (width, height) = target.dimensions();
  let background = match p_cli.bg.as_deref() {
    Some(hex) => Color::from_hex_string(hex),
    None => target.average_color(),
  };
  let workers = repl::effective_workers(p_cli.workers);
  let seed = p_cli.seed.unwrap_or_else(repl::clock_seed);
  info!("target {width}x{height}, background {background}, {workers} workers, seed {seed}");

  let mut engine = Engine::new(target, background, p_cli.size, workers, seed)?;
  let start = Instant::now();
  for frame in 1..=p_cli.count {
    let evaluations = engine.step(kind, p_cli.alpha, p_cli.repeat);
    info!(
      "{}: t={:.3} score={:.6} n={}",
      frame,
      start.elapsed().as_secs_f64(),
      engine.score(),
      evaluations
    );
    save_outputs(p_cli, &engine, frame)?;
  }
  Ok(ExitCode::SUCCESS)
}

/// Saves outputs for the current frame: every path on the final frame, and
/// `%d` paths on every Nth frame along the way.
fn save_outputs(p_cli: &CliArgs, p_engine: &Engine, p_frame: u32) -> Result<()> {
  let last = p_frame == p_cli.count;
  for output in &p_cli.outputs {
    let path = output.to_string_lossy();
    let numbered = path.contains("%d");
    let due = last || (numbered && p_cli.nth > 0 && p_frame % p_cli.nth == 0);
    if !due {
      continue;
    }
    let path = path.replace("%d", &format!("{p_frame:04}"));
    io::save(&path, p_engine)?;
    info!("wrote {path}");
  }
  Ok(())
}
