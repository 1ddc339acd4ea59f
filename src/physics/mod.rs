//! Rigid-body binding between scene objects and the rapier dynamics engine.
//!
//! [`PhysicsWorld`] owns the simulation and a side table mapping each
//! [`ObjectId`](crate::scene::ObjectId) to the body standing in for it.
//! Collision detection, solving and integration are left to rapier; this
//! layer only builds bodies that match scene objects, steps the world and
//! moves poses in either direction.

mod config;
mod contact;
mod convert;
mod error;
mod shape;
mod world;

pub use config::PhysicsConfig;
pub use contact::{annotate_hits, ContactPoint, Hit};
pub use error::{PhysicsError, PhysicsResult};
pub use shape::{BodyDesc, BodyKind, Face, ShapeDesc, COLLISION_MARGIN};
pub use world::PhysicsWorld;
