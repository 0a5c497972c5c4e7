use shapes::Shape;

#[derive(Clone, Debug)]
/// One candidate in the search: a shape, its blend alpha, and the lazily
/// memoized energy. Plain data; the owning worker is referenced by index so
/// the committed winner can reuse that worker's scratch.
pub struct State {
  pub shape: Shape,
  pub alpha: u8,
  /// When set, alpha is a search parameter mutated alongside the shape.
  pub mutate_alpha: bool,
  /// Cached energy; cleared by any mutation.
  pub score: Option<f64>,
  /// Index of the worker that produced this state.
  pub worker: usize,
}

impl State {
  /// Creates a state for a freshly sampled shape. A configured alpha of `0`
  /// selects alpha mutation, starting from 128.
  pub fn new(p_shape: Shape, p_alpha: u8, p_worker: usize) -> State {
    let (alpha, mutate_alpha) = if p_alpha == 0 { (128, true) } else { (p_alpha, false) };
    State {
      shape: p_shape,
      alpha,
      mutate_alpha,
      score: None,
      worker: p_worker,
    }
  }
  /// Returns the cached energy, if computed.
  pub fn energy(&self) -> f64 {
    self.score.expect("state energy queried before evaluation")
  }
}
