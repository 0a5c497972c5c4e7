//! Local search over candidate states. The hill climb is the only strategy
//! the engine pipeline invokes; the annealing variants are kept alongside it
//! for experiments.

use rand::Rng;

/// A search position that can evaluate itself, take a reversible step, and
/// snapshot its parameters.
pub trait Optimizable {
  /// Snapshot of the mutable parameters, sufficient to restore or to report
  /// a best-seen position.
  type Saved: Clone;
  /// The energy being minimized. May be memoized by the implementation.
  fn energy(&mut self) -> f64;
  /// Mutates in place and returns the pre-move snapshot.
  fn do_move(&mut self) -> Self::Saved;
  /// Restores a snapshot taken by `do_move` or `save`.
  fn undo_move(&mut self, p_saved: Self::Saved);
  /// Snapshots the current position.
  fn save(&self) -> Self::Saved;
}

/// Hill climbing with a stagnation budget: accept a move only when it is
/// strictly better, reset the age on every acceptance, and stop once
/// `p_max_age` consecutive moves were rejected. Returns the best snapshot.
pub fn hill_climb<T: Optimizable>(p_state: &mut T, p_max_age: u32) -> T::Saved {
  let mut best_energy = p_state.energy();
  let mut best = p_state.save();
  let mut age = 0;
  while age < p_max_age {
    let undo = p_state.do_move();
    let energy = p_state.energy();
    if energy >= best_energy {
      p_state.undo_move(undo);
      age += 1;
    } else {
      best_energy = energy;
      best = p_state.save();
      age = 0;
    }
  }
  best
}

/// Estimates a starting temperature by averaging the energy change over a
/// number of random moves. Not used by the engine pipeline.
pub fn pre_anneal<T: Optimizable>(p_state: &mut T, p_iterations: u32) -> f64 {
  let mut previous = p_state.energy();
  let mut total = 0.0;
  for _ in 0..p_iterations {
    p_state.do_move();
    let energy = p_state.energy();
    total += (energy - previous).abs();
    previous = energy;
  }
  total / p_iterations as f64
}

/// Simulated annealing with an exponential temperature schedule. Not used by
/// the engine pipeline, which relies on the strict hill climb.
pub fn anneal<T: Optimizable, R: Rng>(
  p_state: &mut T, p_max_temp: f64, p_min_temp: f64, p_steps: u32, p_rng: &mut R,
) -> T::Saved {
  let factor = -(p_max_temp / p_min_temp).ln();
  let mut best_energy = p_state.energy();
  let mut best = p_state.save();
  let mut previous_energy = best_energy;
  for step in 0..p_steps {
    let pct = step as f64 / (p_steps - 1).max(1) as f64;
    let temp = p_max_temp * (factor * pct).exp();
    let undo = p_state.do_move();
    let energy = p_state.energy();
    let change = energy - previous_energy;
    if change > 0.0 && (-change / temp).exp() < p_rng.random::<f64>() {
      p_state.undo_move(undo);
    } else {
      previous_energy = energy;
      if energy < best_energy {
        best_energy = energy;
        best = p_state.save();
      }
    }
  }
  best
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  /// A mock landscape: position `i` has energy `energies[i]`; moves walk the
  /// array forward and wrap.
  struct Walk {
    energies: Vec<f64>,
    position: usize,
    moves: u32,
  }

  impl Optimizable for Walk {
    type Saved = usize;
    fn energy(&mut self) -> f64 {
      self.energies[self.position]
    }
    fn do_move(&mut self) -> usize {
      let saved = self.position;
      self.position = (self.position + 1) % self.energies.len();
      self.moves += 1;
      saved
    }
    fn undo_move(&mut self, p_saved: usize) {
      self.position = p_saved;
    }
    fn save(&self) -> usize {
      self.position
    }
  }

  #[test]
  fn constant_landscape_rejects_exactly_max_age_moves() {
    let mut walk = Walk {
      energies: vec![1.0; 8],
      position: 0,
      moves: 0,
    };
    let best = hill_climb(&mut walk, 25);
    assert_eq!(best, 0, "initial state must win on a plateau");
    assert_eq!(walk.moves, 25, "one rejected move per age unit");
  }

  #[test]
  fn strictly_better_moves_reset_the_age() {
    // The walk descends for three steps, then plateaus.
    let mut walk = Walk {
      energies: vec![4.0, 3.0, 2.0, 1.0, 1.0, 1.0],
      position: 0,
      moves: 0,
    };
    let best = hill_climb(&mut walk, 10);
    assert_eq!(best, 3, "climb should settle on the minimum");
    // Three accepted moves plus max_age rejections after the minimum.
    assert_eq!(walk.moves, 13);
  }

  #[test]
  fn ties_do_not_replace_the_incumbent() {
    let mut walk = Walk {
      energies: vec![2.0, 2.0, 2.0],
      position: 0,
      moves: 0,
    };
    let best = hill_climb(&mut walk, 5);
    assert_eq!(best, 0);
  }

  #[test]
  fn anneal_finds_the_minimum_on_a_small_landscape() {
    let mut walk = Walk {
      energies: vec![3.0, 2.5, 4.0, 1.0, 5.0],
      position: 0,
      moves: 0,
    };
    let mut rng = StdRng::seed_from_u64(33);
    let best = anneal(&mut walk, 3.0, 0.01, 2000, &mut rng);
    assert_eq!(best, 3);
  }

  #[test]
  fn pre_anneal_reports_mean_energy_change() {
    let mut walk = Walk {
      energies: vec![1.0, 2.0],
      position: 0,
      moves: 0,
    };
    let avg = pre_anneal(&mut walk, 10);
    assert!((avg - 1.0).abs() < 1e-12);
  }
}
