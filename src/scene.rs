use std::fmt;

use anyhow::{anyhow, bail, Context, Result};
use glam::{EulerRot, Mat3, Quat, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::physics::PhysicsConfig;

/// Identity of a render object, stable for the lifetime of the scene.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime representation of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub physics: PhysicsConfig,
}

impl Scene {
    /// Parses the scene XML produced by the authoring tools.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();

        for (index, node) in document
            .descendants()
            .filter(|n| n.has_tag_name("object"))
            .enumerate()
        {
            let mut object = SceneObject {
                id: ObjectId(index as u32),
                ..SceneObject::default()
            };
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "mesh".to_string());
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            let euler = parse_vec3(optional_text(&node, "rotation"), Vec3::ZERO)?;
            object.rotation = quat_from_euler_degrees(euler);
            object.size = parse_vec3(optional_text(&node, "size"), object.size)?;
            if let Some(center) = optional_text(&node, "center") {
                object.center = Some(parse_vec3(Some(center), Vec3::ZERO)?);
            }
            if parse_bool(optional_text(&node, "bounds"), false)? {
                object.bounding_box = Some(BoundingBox::from_object(&object));
            }
            if let Some(body) = node.children().find(|child| child.has_tag_name("body")) {
                object.body = Some(
                    BodySpec::from_node(&body)
                        .with_context(|| format!("invalid <body> on object {}", object.name))?,
                );
            }
            objects.push(object);
        }

        let physics = match document.descendants().find(|n| n.has_tag_name("physics")) {
            Some(node) => parse_physics_config(&node)?,
            None => PhysicsConfig::default(),
        };

        Ok(Self { objects, physics })
    }
}

/// Render object as seen by the physics binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(default)]
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_rotation")]
    pub rotation: Quat,
    /// Pivot offset between the render origin and the body origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Vec3>,
    /// Extents of the object, used to size derived bodies.
    #[serde(default = "default_size")]
    pub size: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySpec>,
    /// Objects this one touched during the last hit test, filled in by the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<ObjectId>,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            id: ObjectId::default(),
            name: String::new(),
            object_type: String::new(),
            position: Vec3::ZERO,
            rotation: default_rotation(),
            center: None,
            size: default_size(),
            bounding_box: None,
            body: None,
            hits: Vec::new(),
        }
    }
}

impl SceneObject {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            object_type: "mesh".to_string(),
            ..Self::default()
        }
    }

    /// Recomputes the bounding box helper, if the object has one.
    pub fn refresh_bounding_box(&mut self) {
        if self.bounding_box.is_some() {
            self.bounding_box = Some(BoundingBox::from_object(self));
        }
    }
}

fn default_rotation() -> Quat {
    Quat::IDENTITY
}

fn default_size() -> Vec3 {
    Vec3::ONE
}

/// World space box enclosing an object, used for debug visualisation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Axis aligned box around the rotated extents of `object`.
    pub fn from_object(object: &SceneObject) -> Self {
        let half = object.size * 0.5;
        let basis = Mat3::from_quat(object.rotation);
        let extent = basis.x_axis.abs() * half.x
            + basis.y_axis.abs() * half.y
            + basis.z_axis.abs() * half.z;
        Self {
            min: object.position - extent,
            max: object.position + extent,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Declarative physics description attached to a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub shape: BodyShape,
    pub mass: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    #[serde(default)]
    pub kinematic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyShape {
    Sphere { radius: f32 },
    Box { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    Cone { radius: f32, height: f32 },
    Capsule { radius: f32, height: f32 },
    Human { scale: f32 },
}

impl BodySpec {
    fn from_node(node: &Node<'_, '_>) -> Result<Self> {
        let kind = required_text(node, "shape")?;
        let radius = || parse_f32(optional_text(node, "radius"), 0.5);
        let height = || parse_f32(optional_text(node, "height"), 1.0);
        let shape = match kind.as_str() {
            "sphere" => BodyShape::Sphere { radius: radius()? },
            "box" => BodyShape::Box {
                size: parse_vec3(optional_text(node, "size"), Vec3::ONE)?,
            },
            "cylinder" => BodyShape::Cylinder {
                radius: radius()?,
                height: height()?,
            },
            "cone" => BodyShape::Cone {
                radius: radius()?,
                height: height()?,
            },
            "capsule" => BodyShape::Capsule {
                radius: radius()?,
                height: height()?,
            },
            "human" => BodyShape::Human {
                scale: parse_f32(optional_text(node, "scale"), 1.0)?,
            },
            other => bail!("unknown body shape `{other}`"),
        };
        let default_mass = if matches!(shape, BodyShape::Human { .. }) {
            200.0
        } else {
            1.0
        };
        let friction = optional_text(node, "friction")
            .map(|value| parse_f32(Some(value), 0.0))
            .transpose()?;
        Ok(Self {
            shape,
            mass: parse_f32(optional_text(node, "mass"), default_mass)?,
            friction,
            kinematic: parse_bool(optional_text(node, "kinematic"), false)?,
        })
    }
}

fn parse_physics_config(node: &Node<'_, '_>) -> Result<PhysicsConfig> {
    let defaults = PhysicsConfig::default();
    let max_substeps = match optional_text(node, "max_substeps") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|err| anyhow!("failed to parse <max_substeps>: {err}"))?,
        None => defaults.max_substeps,
    };
    Ok(PhysicsConfig {
        gravity: parse_vec3(optional_text(node, "gravity"), defaults.gravity)?,
        fixed_time_step: parse_f32(optional_text(node, "fixed_step"), defaults.fixed_time_step)?,
        max_substeps,
    })
}

fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        euler.x.to_radians(),
        euler.y.to_radians(),
        euler.z.to_radians(),
    )
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse bool: {other}")),
        None => Ok(default),
    }
}
