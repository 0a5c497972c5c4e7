use std::fmt::Display;

/// Errors surfaced by the engine. All core operations are total on valid
/// inputs, so construction-time validation is the only failure source.
#[derive(Debug)]
pub enum EngineError {
  /// A constructor argument was out of range.
  InvalidInput(String),
}

impl EngineError {
  /// Creates an invalid input error.
  pub fn invalid_input(p_msg: impl Into<String>) -> Self {
    EngineError::InvalidInput(p_msg.into())
  }
}

impl Display for EngineError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
    }
  }
}

impl std::error::Error for EngineError {}
