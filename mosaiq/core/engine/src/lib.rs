//! The search-and-composition engine: scoring kernels, span blending, the
//! hill-climb optimizer, per-thread workers, and the engine that owns the
//! target, the composite, and the shape transcript.

pub mod blend;
pub mod engine;
pub mod error;
pub mod optimize;
pub mod score;
pub mod state;
pub mod worker;

pub use self::engine::{Engine, Placement};
pub use self::error::EngineError;
pub use self::state::State;
pub use self::worker::Worker;
