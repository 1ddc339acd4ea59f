//! Physics and screen-space helpers for the Crystal runtime scene graph.
//!
//! [`PhysicsWorld`] binds scene objects to rapier rigid bodies, steps the
//! simulation and keeps render poses and body poses in sync.
//! [`ScreenSprite`] places 2D overlays in normalized viewport coordinates.
//! Both are independent of each other and of any renderer, so they can be
//! driven from headless tools as well as a windowed host.

pub mod app;
pub mod data_model;
pub mod physics;
pub mod scene;
pub mod sprite;
pub mod viewport;

pub use data_model::DataModel;
pub use physics::{
    BodyDesc, BodyKind, ContactPoint, Face, Hit, PhysicsConfig, PhysicsError, PhysicsResult,
    PhysicsWorld, ShapeDesc,
};
pub use scene::{BodyShape, BodySpec, BoundingBox, ObjectId, Scene, SceneObject};
pub use sprite::{Alignment, ScreenSprite, Texture};
pub use viewport::{StaticViewport, ViewportProvider, WindowViewport};
