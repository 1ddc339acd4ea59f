use thiserror::Error;

use crate::scene::ObjectId;

/// Recoverable failures reported by [`PhysicsWorld`](super::PhysicsWorld).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("object {0} already has a rigid body attached")]
    AlreadyAttached(ObjectId),
    #[error("object {0} has no rigid body attached")]
    UnknownObject(ObjectId),
    #[error("dynamic bodies need a positive finite mass, got {0}")]
    InvalidMass(f32),
    #[error("shape dimension `{name}` must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("{0} geometry is degenerate")]
    DegenerateGeometry(&'static str),
    #[error("face references vertex {index} but only {count} vertices exist")]
    FaceIndexOutOfRange { index: usize, count: usize },
    #[error("{0} shapes can only back static or kinematic bodies")]
    UnsupportedDynamicShape(&'static str),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
