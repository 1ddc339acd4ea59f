use glam::{BVec3, Vec3};
use rapier3d::parry::transformation::try_convex_hull;
use rapier3d::prelude::*;

use super::convert::to_point;
use super::error::{PhysicsError, PhysicsResult};

/// Collision margin applied to sphere, box, cylinder, capsule and convex hull shapes.
pub const COLLISION_MARGIN: f32 = 0.05;

/// Polygon of a triangle mesh, indexing into its vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Triangle(usize, usize, usize),
    /// Split into `(a, b, d)` and `(b, c, d)`.
    Quad(usize, usize, usize, usize),
}

impl Face {
    fn triangulate(self, out: &mut Vec<[usize; 3]>) {
        match self {
            Face::Triangle(a, b, c) => out.push([a, b, c]),
            Face::Quad(a, b, c, d) => {
                out.push([a, b, d]);
                out.push([b, c, d]);
            }
        }
    }
}

/// Geometry of a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDesc {
    Sphere { radius: f32 },
    /// Full extents along each axis.
    Box { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    Cone { radius: f32, height: f32 },
    /// The straight segment between the caps is `height / 2` long.
    Capsule { radius: f32, height: f32 },
    ConvexHull { vertices: Vec<Vec3> },
    TriangleMesh { vertices: Vec<Vec3>, faces: Vec<Face> },
}

impl ShapeDesc {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeDesc::Sphere { .. } => "sphere",
            ShapeDesc::Box { .. } => "box",
            ShapeDesc::Cylinder { .. } => "cylinder",
            ShapeDesc::Cone { .. } => "cone",
            ShapeDesc::Capsule { .. } => "capsule",
            ShapeDesc::ConvexHull { .. } => "convex hull",
            ShapeDesc::TriangleMesh { .. } => "triangle mesh",
        }
    }

    /// Triangle meshes have no volume to derive inertia from.
    pub fn supports_dynamic(&self) -> bool {
        !matches!(self, ShapeDesc::TriangleMesh { .. })
    }

    pub(crate) fn build(&self) -> PhysicsResult<SharedShape> {
        match self {
            ShapeDesc::Sphere { radius } => {
                positive("radius", *radius)?;
                Ok(SharedShape::ball(*radius))
            }
            ShapeDesc::Box { size } => {
                positive("size.x", size.x)?;
                positive("size.y", size.y)?;
                positive("size.z", size.z)?;
                let half = *size * 0.5;
                let border = COLLISION_MARGIN.min(half.min_element());
                let core = half - Vec3::splat(border);
                Ok(SharedShape::round_cuboid(core.x, core.y, core.z, border))
            }
            ShapeDesc::Cylinder { radius, height } => {
                positive("radius", *radius)?;
                positive("height", *height)?;
                let half_height = height * 0.5;
                let border = COLLISION_MARGIN.min(half_height).min(*radius);
                Ok(SharedShape::round_cylinder(
                    half_height - border,
                    radius - border,
                    border,
                ))
            }
            ShapeDesc::Cone { radius, height } => {
                positive("radius", *radius)?;
                positive("height", *height)?;
                Ok(SharedShape::cone(height * 0.5, *radius))
            }
            ShapeDesc::Capsule { radius, height } => {
                positive("radius", *radius)?;
                non_negative("height", *height)?;
                Ok(SharedShape::capsule_y(height * 0.25, *radius))
            }
            ShapeDesc::ConvexHull { vertices } => {
                if vertices.is_empty() {
                    return Err(PhysicsError::DegenerateGeometry(self.name()));
                }
                let points: Vec<Point<Real>> = vertices.iter().copied().map(to_point).collect();
                let (hull, indices) = try_convex_hull(&points)
                    .map_err(|_| PhysicsError::DegenerateGeometry(self.name()))?;
                if indices.is_empty() {
                    return Err(PhysicsError::DegenerateGeometry(self.name()));
                }
                SharedShape::round_convex_mesh(hull, &indices, COLLISION_MARGIN)
                    .ok_or(PhysicsError::DegenerateGeometry(self.name()))
            }
            ShapeDesc::TriangleMesh { vertices, faces } => {
                if vertices.is_empty() || faces.is_empty() {
                    return Err(PhysicsError::DegenerateGeometry(self.name()));
                }
                let mut triangles = Vec::with_capacity(faces.len() * 2);
                for face in faces {
                    face.triangulate(&mut triangles);
                }
                let count = vertices.len();
                let mut indices = Vec::with_capacity(triangles.len());
                for triangle in triangles {
                    if let Some(&index) = triangle.iter().find(|&&index| index >= count) {
                        return Err(PhysicsError::FaceIndexOutOfRange { index, count });
                    }
                    indices.push(triangle.map(|index| index as u32));
                }
                let has_area = indices.iter().any(|&[a, b, c]| {
                    let [a, b, c] = [a, b, c].map(|index| vertices[index as usize]);
                    (b - a).cross(c - a).length() > f32::EPSILON
                });
                if !has_area {
                    return Err(PhysicsError::DegenerateGeometry(self.name()));
                }
                let points = vertices.iter().copied().map(to_point).collect();
                Ok(SharedShape::trimesh(points, indices))
            }
        }
    }
}

fn positive(name: &'static str, value: f32) -> PhysicsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidDimension { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> PhysicsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidDimension { name, value })
    }
}

/// How a body takes part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    #[default]
    Dynamic,
    /// Never moves; effective mass is zero.
    Static,
    /// Moved by the host through `set_physics_pose`; never sleeps and
    /// ignores its mass.
    Kinematic,
}

/// Everything needed to attach one rigid body to a scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: ShapeDesc,
    pub mass: f32,
    pub kind: BodyKind,
    /// Engine default when `None`.
    pub friction: Option<f32>,
    /// Axes the body may not rotate about.
    pub rotation_locks: BVec3,
}

impl BodyDesc {
    /// A mass of exactly zero describes a static body.
    pub fn new(shape: ShapeDesc, mass: f32) -> Self {
        let kind = if mass == 0.0 {
            BodyKind::Static
        } else {
            BodyKind::Dynamic
        };
        Self {
            shape,
            mass,
            kind,
            friction: None,
            rotation_locks: BVec3::FALSE,
        }
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_rotation_locks(mut self, locks: BVec3) -> Self {
        self.rotation_locks = locks;
        self
    }

    pub(crate) fn validate(&self) -> PhysicsResult<()> {
        if self.kind != BodyKind::Dynamic {
            return Ok(());
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !self.shape.supports_dynamic() {
            return Err(PhysicsError::UnsupportedDynamicShape(self.shape.name()));
        }
        Ok(())
    }

    pub(crate) fn body_type(&self) -> RigidBodyType {
        match self.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
        }
    }

    pub(crate) fn locked_axes(&self) -> LockedAxes {
        let mut axes = LockedAxes::empty();
        if self.rotation_locks.x {
            axes |= LockedAxes::ROTATION_LOCKED_X;
        }
        if self.rotation_locks.y {
            axes |= LockedAxes::ROTATION_LOCKED_Y;
        }
        if self.rotation_locks.z {
            axes |= LockedAxes::ROTATION_LOCKED_Z;
        }
        axes
    }
}
