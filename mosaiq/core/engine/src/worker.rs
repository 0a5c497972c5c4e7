//! Per-thread search context. A worker owns everything a candidate search
//! needs besides the composite snapshot: an independent RNG, a rasterization
//! context, and a scratch raster for staging before/after blends. The
//! snapshot of the current composite is threaded through the calls as a
//! borrow, so no worker can read it after its step has returned.

use std::sync::Arc;

use log::trace;
use mosaiq_core::RasterContext;
use primitives::Image;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shapes::{Shape, ShapeKind};

use crate::blend;
use crate::optimize::{self, Optimizable};
use crate::score;
use crate::state::State;

/// One long-lived search worker.
pub struct Worker {
  width: i32,
  height: i32,
  target: Arc<Image>,
  buffer: Image,
  raster: RasterContext,
  rng: StdRng,
  /// Reference score of the composite snapshot, rebound each step.
  score: f64,
  /// Candidate evaluations since the last `init`.
  counter: usize,
  index: usize,
}

impl Worker {
  /// Creates a worker bound to the shared target raster.
  pub fn new(p_target: Arc<Image>, p_index: usize, p_seed: u64) -> Worker {
    let (w, h) = p_target.dimensions();
    Worker {
      width: w as i32,
      height: h as i32,
      buffer: Image::new(w, h),
      raster: RasterContext::new(w as i32, h as i32),
      rng: StdRng::seed_from_u64(p_seed),
      target: p_target,
      score: 0.0,
      counter: 0,
      index: p_index,
    }
  }

  /// Rebinds the reference score for a new search batch and resets the
  /// evaluation counter.
  pub fn init(&mut self, p_score: f64) {
    self.score = p_score;
    self.counter = 0;
  }

  /// Returns the number of candidate evaluations since the last `init`.
  pub fn counter(&self) -> usize {
    self.counter
  }

  /// Evaluates the energy of blending `p_shape` at `p_alpha` into the
  /// composite snapshot: rasterize, solve for the best color, stage the
  /// blend in the scratch raster, and score the difference incrementally.
  pub fn energy(&mut self, p_shape: &Shape, p_alpha: u8, p_current: &Image) -> f64 {
    self.counter += 1;
    let spans = p_shape.rasterize(&mut self.raster);
    let color = score::compute_color(&self.target, p_current, spans, p_alpha);
    blend::copy_spans(&mut self.buffer, p_current, spans);
    blend::draw_spans(&mut self.buffer, &color, spans);
    score::difference_partial(&self.target, p_current, &self.buffer, self.score, spans)
  }

  /// Samples a random candidate of the requested kind.
  pub fn random_state(&mut self, p_kind: ShapeKind, p_alpha: u8) -> State {
    let shape = Shape::random(p_kind, self.width, self.height, &mut self.rng);
    State::new(shape, p_alpha, self.index)
  }

  /// Samples `p_tries` random candidates and returns the lowest-energy one.
  pub fn best_random_state(&mut self, p_kind: ShapeKind, p_alpha: u8, p_tries: u32, p_current: &Image) -> State {
    let mut best: Option<State> = None;
    for _ in 0..p_tries {
      let mut state = self.random_state(p_kind, p_alpha);
      let energy = self.energy(&state.shape, state.alpha, p_current);
      state.score = Some(energy);
      if best.as_ref().is_none_or(|b| energy < b.energy()) {
        best = Some(state);
      }
    }
    best.expect("at least one random candidate")
  }

  /// The full per-worker search: `p_climbs` rounds of random seeding
  /// followed by hill climbing, keeping the best result.
  pub fn best_hill_climb(
    &mut self, p_kind: ShapeKind, p_alpha: u8, p_tries: u32, p_max_age: u32, p_climbs: u32, p_current: &Image,
  ) -> State {
    let mut best: Option<State> = None;
    for _ in 0..p_climbs {
      let state = self.best_random_state(p_kind, p_alpha, p_tries.max(1), p_current);
      let before = state.energy();
      let mut candidate = Candidate {
        worker: &mut *self,
        current: p_current,
        state,
      };
      let climbed = optimize::hill_climb(&mut candidate, p_max_age);
      trace!(
        "{}x random: {:.6} -> {}x hill climb: {:.6}",
        p_tries,
        before,
        p_max_age,
        climbed.energy()
      );
      if best.as_ref().is_none_or(|b| climbed.energy() < b.energy()) {
        best = Some(climbed);
      }
    }
    best.expect("at least one climb")
  }
}

/// A worker-bound candidate, giving the optimizer an energy function and
/// reversible mutations over a `State`.
pub struct Candidate<'a> {
  pub worker: &'a mut Worker,
  pub current: &'a Image,
  pub state: State,
}

impl Optimizable for Candidate<'_> {
  type Saved = State;

  fn energy(&mut self) -> f64 {
    if self.state.score.is_none() {
      let energy = self.worker.energy(&self.state.shape, self.state.alpha, self.current);
      self.state.score = Some(energy);
    }
    self.state.energy()
  }

  fn do_move(&mut self) -> State {
    let saved = self.state.clone();
    self.state.shape.mutate(self.worker.width, self.worker.height, &mut self.worker.rng);
    if self.state.mutate_alpha {
      let delta = self.worker.rng.random_range(-10..=10);
      self.state.alpha = (self.state.alpha as i32 + delta).clamp(1, 255) as u8;
    }
    self.state.score = None;
    saved
  }

  fn undo_move(&mut self, p_saved: State) {
    self.state = p_saved;
  }

  fn save(&self) -> State {
    self.state.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use primitives::Color;
  use shapes::Rectangle;

  fn gradient_target(p_size: u32) -> Arc<Image> {
    let mut img = Image::new(p_size, p_size);
    for y in 0..p_size as i32 {
      for x in 0..p_size as i32 {
        img.set_pixel(x, y, Color::from_rgb((x * 16) as u8, (y * 16) as u8, 128));
      }
    }
    Arc::new(img)
  }

  #[test]
  fn energy_counts_evaluations() {
    let target = gradient_target(16);
    let current = Image::uniform(16, 16, Color::from_rgb(90, 90, 90));
    let base = score::difference_full(&target, &current);
    let mut worker = Worker::new(target, 0, 7);
    worker.init(base);
    let shape = Shape::Rectangle(Rectangle {
      x1: 2,
      y1: 2,
      x2: 9,
      y2: 9,
    });
    worker.energy(&shape, 128, &current);
    worker.energy(&shape, 128, &current);
    assert_eq!(worker.counter(), 2);
    worker.init(worker.score);
    assert_eq!(worker.counter(), 0);
  }

  #[test]
  fn identical_seeds_search_identically() {
    let target = gradient_target(16);
    let current = Image::uniform(16, 16, Color::from_rgb(90, 90, 90));
    let base = score::difference_full(&target, &current);
    let mut results = Vec::new();
    for _ in 0..2 {
      let mut worker = Worker::new(Arc::clone(&target), 0, 99);
      worker.init(base);
      let state = worker.best_hill_climb(ShapeKind::Triangle, 128, 20, 10, 2, &current);
      results.push((state.shape.clone(), state.energy()));
    }
    assert_eq!(results[0].0, results[1].0);
    assert_eq!(results[0].1, results[1].1);
  }

  #[test]
  fn covering_candidate_beats_the_reference_score() {
    let target = Arc::new(Image::uniform(16, 16, Color::from_rgb(200, 0, 0)));
    let current = Image::uniform(16, 16, Color::from_rgb(0, 0, 0));
    let base = score::difference_full(&target, &current);
    let mut worker = Worker::new(target, 0, 1);
    worker.init(base);
    let shape = Shape::Rectangle(Rectangle {
      x1: 0,
      y1: 0,
      x2: 15,
      y2: 15,
    });
    let energy = worker.energy(&shape, 255, &current);
    assert!(energy < base, "energy {energy} should improve on {base}");
  }
}
