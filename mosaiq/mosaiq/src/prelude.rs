//! Mosaiq prelude — a small convenience module that re-exports commonly used types.

pub use crate::engine::{Engine, EngineError, Placement};
pub use crate::primitives::{Color, Image};
pub use crate::shapes::{Shape, ShapeKind};
