//! The engine owns the immutable target, the evolving composite, and the
//! transcript of committed shapes. Each step fans a hill-climb search out
//! across the workers, picks the best candidate, and commits it.

use std::sync::Arc;

use log::debug;
use mosaiq_core::RasterContext;
use primitives::{Color, Image};
use rayon::prelude::*;
use shapes::{Shape, ShapeKind};

use crate::blend;
use crate::error::EngineError;
use crate::optimize::{self, Optimizable};
use crate::score;
use crate::state::State;
use crate::worker::{Candidate, Worker};

/// Random candidates sampled before each hill climb.
const RANDOM_TRIES: u32 = 1000;
/// Consecutive rejected mutations that end a hill climb.
const MAX_AGE: u32 = 100;
/// Hill climbs distributed across the workers per step.
const CLIMBS: u32 = 16;

#[derive(Clone, Debug)]
/// One committed transcript entry: the shape, the color it was blended
/// with, and the composite's score after the commit.
pub struct Placement {
  pub shape: Shape,
  pub color: Color,
  pub score: f64,
}

/// The search-and-composition engine.
pub struct Engine {
  width: u32,
  height: u32,
  target: Arc<Image>,
  current: Image,
  buffer: Image,
  raster: RasterContext,
  score: f64,
  background: Color,
  scale: f64,
  scaled_width: u32,
  scaled_height: u32,
  workers: Vec<Worker>,
  placements: Vec<Placement>,
}

impl Engine {
  /// Creates an engine for the given target.
  /// - `p_target`: The decoded target raster.
  /// - `p_background`: The uniform color the composite starts from.
  /// - `p_out_size`: The display size; the larger target dimension maps to it.
  /// - `p_workers`: Number of parallel search workers.
  /// - `p_seed`: Base RNG seed; worker `i` is seeded with `p_seed + i`.
  pub fn new(
    p_target: Image, p_background: Color, p_out_size: u32, p_workers: usize, p_seed: u64,
  ) -> Result<Engine, EngineError> {
    let (width, height) = p_target.dimensions();
    if width < 1 || height < 1 {
      return Err(EngineError::invalid_input("canvas dimensions must be at least 1x1"));
    }
    if p_workers < 1 {
      return Err(EngineError::invalid_input("worker count must be at least 1"));
    }
    if p_out_size < 1 {
      return Err(EngineError::invalid_input("output size must be at least 1"));
    }
    let scale = p_out_size as f64 / width.max(height) as f64;
    let scaled_width = (width as f64 * scale).round() as u32;
    let scaled_height = (height as f64 * scale).round() as u32;
    let target = Arc::new(p_target);
    let current = Image::uniform(width, height, p_background);
    let score = score::difference_full(&target, &current);
    let workers = (0..p_workers)
      .map(|i| Worker::new(Arc::clone(&target), i, p_seed.wrapping_add(i as u64)))
      .collect();
    Ok(Engine {
      width,
      height,
      buffer: current.clone(),
      raster: RasterContext::new(width as i32, height as i32),
      current,
      target,
      score,
      background: p_background,
      scale,
      scaled_width,
      scaled_height,
      workers,
      placements: Vec::new(),
    })
  }

  /// Runs one search-and-commit step and returns the number of candidate
  /// evaluations performed.
  /// - `p_kind`: The shape family to sample.
  /// - `p_alpha`: Blend alpha; `0` lets the search mutate alpha.
  /// - `p_repeat`: Extra local climbs committed from the winning shape.
  pub fn step(&mut self, p_kind: ShapeKind, p_alpha: u8, p_repeat: u32) -> usize {
    let mut state = self.search(p_kind, p_alpha);
    self.add_shape(state.shape.clone(), state.alpha);

    for _ in 0..p_repeat {
      let worker = &mut self.workers[state.worker];
      worker.init(self.score);
      state.score = None;
      let mut candidate = Candidate {
        worker,
        current: &self.current,
        state,
      };
      let before = candidate.energy();
      let climbed = optimize::hill_climb(&mut candidate, MAX_AGE);
      let after = climbed.energy();
      state = climbed;
      if after == before {
        break;
      }
      self.add_shape(state.shape.clone(), state.alpha);
    }

    let counter: usize = self.workers.iter().map(|w| w.counter()).sum();
    debug!("step evaluated {counter} candidates, score {:.6}", self.score);
    counter
  }

  /// Fans the candidate search out across the workers and returns the best
  /// state. Results are reduced in worker order with a strict comparison, so
  /// the choice is deterministic for a fixed worker count.
  fn search(&mut self, p_kind: ShapeKind, p_alpha: u8) -> State {
    let climbs_per_worker = CLIMBS.div_ceil(self.workers.len() as u32);
    let score = self.score;
    for worker in self.workers.iter_mut() {
      worker.init(score);
    }
    let current = &self.current;
    let results: Vec<State> = self
      .workers
      .par_iter_mut()
      .map(|worker| worker.best_hill_climb(p_kind, p_alpha, RANDOM_TRIES, MAX_AGE, climbs_per_worker, current))
      .collect();
    results
      .into_iter()
      .reduce(|best, state| if state.energy() < best.energy() { state } else { best })
      .expect("engine always has at least one worker")
  }

  /// Commits a shape: rasterize it against the live composite, solve for
  /// its color, blend, and append to the transcript. A shape with no
  /// coverage leaves the composite untouched and is recorded with the
  /// unchanged score.
  pub fn add_shape(&mut self, p_shape: Shape, p_alpha: u8) {
    let spans = p_shape.rasterize(&mut self.raster);
    let color = score::compute_color(&self.target, &self.current, spans, p_alpha);
    blend::copy_spans(&mut self.buffer, &self.current, spans);
    blend::draw_spans(&mut self.current, &color, spans);
    let score = score::difference_partial(&self.target, &self.buffer, &self.current, self.score, spans);
    self.score = score;
    self.placements.push(Placement {
      shape: p_shape,
      color,
      score,
    });
  }

  /// Resets the composite to the background and clears the transcript.
  pub fn clear(&mut self) {
    self.current.fill(self.background);
    self.score = score::difference_full(&self.target, &self.current);
    self.placements.clear();
  }

  /// Returns the composite raster at image resolution.
  pub fn current(&self) -> &Image {
    &self.current
  }
  /// Returns the current RMSE against the target.
  pub fn score(&self) -> f64 {
    self.score
  }
  /// Returns the committed transcript.
  pub fn placements(&self) -> &[Placement] {
    &self.placements
  }
  /// Returns the target dimensions.
  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }
  /// Returns the display dimensions.
  pub fn scaled_dimensions(&self) -> (u32, u32) {
    (self.scaled_width, self.scaled_height)
  }

  /// Rebuilds the composite from the transcript at image resolution.
  /// Byte-identical to `current()`: commits and replays share the same
  /// rasterizers and blend arithmetic.
  pub fn replay(&self) -> Image {
    let mut image = Image::uniform(self.width, self.height, self.background);
    let mut ctx = RasterContext::new(self.width as i32, self.height as i32);
    for placement in &self.placements {
      let spans = placement.shape.rasterize(&mut ctx);
      blend::draw_spans(&mut image, &placement.color, spans);
    }
    image
  }

  /// Renders the transcript at display scale, back to front.
  pub fn render(&self) -> Image {
    let mut image = Image::uniform(self.scaled_width, self.scaled_height, self.background);
    let mut ctx = RasterContext::new(self.scaled_width as i32, self.scaled_height as i32);
    for placement in &self.placements {
      let shape = placement.shape.scaled(self.scale);
      let spans = shape.rasterize(&mut ctx);
      blend::draw_spans(&mut image, &placement.color, spans);
    }
    image
  }

  /// Replays the transcript at display scale, collecting a frame whenever
  /// the committed score improved by at least `p_score_delta` since the
  /// previous frame. The background-only frame is always first.
  pub fn frames(&self, p_score_delta: f64) -> Vec<Image> {
    let mut frames = Vec::new();
    let mut image = Image::uniform(self.scaled_width, self.scaled_height, self.background);
    let mut ctx = RasterContext::new(self.scaled_width as i32, self.scaled_height as i32);
    frames.push(image.clone());
    let mut previous = 10.0;
    for placement in &self.placements {
      let shape = placement.shape.scaled(self.scale);
      let spans = shape.rasterize(&mut ctx);
      blend::draw_spans(&mut image, &placement.color, spans);
      if previous - placement.score >= p_score_delta {
        previous = placement.score;
        frames.push(image.clone());
      }
    }
    frames
  }

  /// Emits the transcript as a standalone SVG document at display size.
  pub fn svg(&self) -> String {
    let mut lines = Vec::with_capacity(self.placements.len() + 5);
    lines.push(format!(
      "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}\" height=\"{}\">",
      self.scaled_width, self.scaled_height
    ));
    lines.push(format!(
      "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
      self.scaled_width,
      self.scaled_height,
      self.background.to_hex()
    ));
    lines.push(format!("<g transform=\"scale({}) translate(0.5 0.5)\">", self.scale));
    for placement in &self.placements {
      let attrs = format!(
        "fill=\"{}\" fill-opacity=\"{}\"",
        placement.color.to_hex(),
        placement.color.a as f64 / 255.0
      );
      lines.push(placement.shape.svg(&attrs));
    }
    lines.push("</g>".to_string());
    lines.push("</svg>".to_string());
    lines.join("\n")
  }
}
