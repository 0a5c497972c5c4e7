//! Line-oriented control channel: configuration commands followed by
//! `step`/`run`/`save`. Responses are a single `ok` or `err ...` line per
//! command, so the channel is easy to drive from another process. An
//! optional watchdog exits non-zero when stdin stays idle too long.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use log::info;
use mosaiq::prelude::{Color, Engine, ShapeKind};

use crate::args::CliArgs;
use crate::io;

/// REPL state: the pending configuration plus the lazily built engine.
/// Any configuration change that affects the canvas drops the engine; it is
/// rebuilt from the current settings on the next `step`, `run`, or `save`.
struct Session {
  shape: ShapeKind,
  alpha: u8,
  repeat: u32,
  workers: usize,
  size: u32,
  resize: u32,
  background: Option<Color>,
  seed: u64,
  image_path: Option<PathBuf>,
  engine: Option<Engine>,
}

impl Session {
  fn from_args(p_args: &CliArgs) -> Session {
    Session {
      shape: ShapeKind::from_index(p_args.mode).unwrap_or(ShapeKind::Triangle),
      alpha: p_args.alpha,
      repeat: p_args.repeat,
      workers: effective_workers(p_args.workers),
      size: p_args.size,
      resize: p_args.resize,
      background: p_args.bg.as_deref().map(Color::from_hex_string),
      seed: p_args.seed.unwrap_or_else(clock_seed),
      image_path: p_args.input.clone(),
      engine: None,
    }
  }

  fn handle(&mut self, p_line: &str) -> Result<()> {
    let mut parts = p_line.split_whitespace();
    let Some(command) = parts.next() else {
      return Ok(());
    };
    let rest: Vec<&str> = parts.collect();
    match command {
      "image" => {
        let path = rest.first().context("usage: image <path>")?;
        self.image_path = Some(PathBuf::from(path));
        self.engine = None;
      }
      "shape" => {
        let name = rest.first().context("usage: shape <kind>")?;
        self.shape = ShapeKind::from_name(name)
          .or_else(|| name.parse().ok().and_then(ShapeKind::from_index))
          .ok_or_else(|| anyhow!("unknown shape kind: {name}"))?;
      }
      "alpha" => self.alpha = parse(&rest, "alpha <0-255>")?,
      "repeat" => self.repeat = parse(&rest, "repeat <count>")?,
      "workers" => {
        let requested: usize = parse(&rest, "workers <count>")?;
        self.workers = effective_workers(requested);
        self.engine = None;
      }
      "background" => {
        let hex = rest.first().context("usage: background <hex>")?;
        self.background = Some(Color::from_hex_string(hex));
        self.engine = None;
      }
      "size" => {
        self.size = parse(&rest, "size <pixels>")?;
        self.engine = None;
      }
      "resize" => {
        self.resize = parse(&rest, "resize <pixels>")?;
        self.engine = None;
      }
      "step" => {
        let (shape, alpha, repeat) = (self.shape, self.alpha, self.repeat);
        let engine = self.ensure_engine()?;
        engine.step(shape, alpha, repeat);
        info!("score={:.6} shapes={}", engine.score(), engine.placements().len());
      }
      "run" => {
        let count: u32 = parse(&rest, "run <count>")?;
        let (shape, alpha, repeat) = (self.shape, self.alpha, self.repeat);
        let engine = self.ensure_engine()?;
        for _ in 0..count {
          engine.step(shape, alpha, repeat);
        }
        info!("score={:.6} shapes={}", engine.score(), engine.placements().len());
      }
      "save" => {
        let path = rest.first().context("usage: save <path>")?.to_string();
        let engine = self.ensure_engine()?;
        io::save(&path, engine)?;
      }
      "clear" => {
        if let Some(engine) = self.engine.as_mut() {
          engine.clear();
        }
      }
      other => bail!("unknown command: {other}"),
    }
    Ok(())
  }

  /// Builds the engine from the current settings if needed.
  fn ensure_engine(&mut self) -> Result<&mut Engine> {
    if self.engine.is_none() {
      let path = self.image_path.clone().context("no image loaded; use: image <path>")?;
      let target = io::load_image(&path, self.resize)?;
      let background = self.background.unwrap_or_else(|| target.average_color());
      let engine = Engine::new(target, background, self.size, self.workers, self.seed)?;
      self.engine = Some(engine);
    }
    Ok(self.engine.as_mut().expect("engine just built"))
  }
}

fn parse<T: std::str::FromStr>(p_rest: &[&str], p_usage: &str) -> Result<T> {
  p_rest
    .first()
    .and_then(|v| v.parse().ok())
    .with_context(|| format!("usage: {p_usage}"))
}

/// Resolves a requested worker count, mapping 0 to the logical CPU count.
pub fn effective_workers(p_requested: usize) -> usize {
  if p_requested == 0 {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
  } else {
    p_requested
  }
}

/// A clock-derived base seed for runs that did not pin one.
pub fn clock_seed() -> u64 {
  use std::time::{SystemTime, UNIX_EPOCH};
  SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(1)
}

/// Runs the REPL until stdin closes. Returns exit code 2 when the idle
/// watchdog fires.
pub fn run(p_args: &CliArgs) -> Result<ExitCode> {
  let (tx, rx) = mpsc::channel::<String>();
  thread::spawn(move || {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
      match line {
        Ok(text) => {
          if tx.send(text).is_err() {
            break;
          }
        }
        Err(_) => break,
      }
    }
  });

  let mut session = Session::from_args(p_args);
  loop {
    let line = if p_args.idle_timeout > 0 {
      match rx.recv_timeout(Duration::from_secs(p_args.idle_timeout)) {
        Ok(text) => text,
        Err(RecvTimeoutError::Timeout) => {
          eprintln!("err input idle for {}s, exiting", p_args.idle_timeout);
          return Ok(ExitCode::from(2));
        }
        Err(RecvTimeoutError::Disconnected) => break,
      }
    } else {
      match rx.recv() {
        Ok(text) => text,
        Err(_) => break,
      }
    };
    if line.trim().is_empty() {
      continue;
    }
    match session.handle(&line) {
      Ok(()) => println!("ok"),
      Err(err) => println!("err {err:#}"),
    }
  }
  info!("stdin closed, exiting");
  Ok(ExitCode::SUCCESS)
}
