use anyhow::{Context, Result};
use log::info;

use crate::data_model::DataModel;
use crate::physics::{annotate_hits, BodyDesc, BodyKind, Hit, PhysicsWorld, ShapeDesc};
use crate::scene::{BodyShape, BodySpec, SceneObject};

/// Creates a body for every object that declares one.
///
/// Dynamic bodies are registered for pose synchronization. Returns the
/// number of bodies created.
pub fn build_bodies(world: &mut PhysicsWorld, model: &DataModel) -> Result<usize> {
    let mut created = 0;
    for object in model.all_objects() {
        let Some(spec) = object.body.as_ref() else {
            continue;
        };
        let kind = attach_body(world, &object, spec)
            .with_context(|| format!("failed to create a body for {}", object.name))?;
        if kind == BodyKind::Dynamic {
            world.register_dynamic_object(object.id);
        }
        created += 1;
    }
    info!("Created {created} rigid bodies");
    Ok(created)
}

fn attach_body(world: &mut PhysicsWorld, object: &SceneObject, spec: &BodySpec) -> Result<BodyKind> {
    let shape = match spec.shape {
        BodyShape::Human { scale } => {
            world.add_human_body(object, scale, spec.friction.unwrap_or(1.0), spec.mass)?;
            return Ok(BodyKind::Dynamic);
        }
        BodyShape::Sphere { radius } => ShapeDesc::Sphere { radius },
        BodyShape::Box { size } => ShapeDesc::Box { size },
        BodyShape::Cylinder { radius, height } => ShapeDesc::Cylinder { radius, height },
        BodyShape::Cone { radius, height } => ShapeDesc::Cone { radius, height },
        BodyShape::Capsule { radius, height } => ShapeDesc::Capsule { radius, height },
    };
    let mut desc = BodyDesc::new(shape, spec.mass);
    if spec.kinematic {
        desc = desc.with_kind(BodyKind::Kinematic);
    }
    if let Some(friction) = spec.friction {
        desc = desc.with_friction(friction);
    }
    let kind = desc.kind;
    world.add_body(object, desc)?;
    Ok(kind)
}

/// Runs `frames` update/pose-sync cycles of `dt` seconds each.
///
/// The callback receives the frame index and the hits among all bodied
/// objects when `report_hits` is set; hits are also annotated on the model.
pub fn run_simulation<F>(
    world: &mut PhysicsWorld,
    model: &DataModel,
    frames: usize,
    dt: f32,
    report_hits: bool,
    mut on_hits: F,
) where
    F: FnMut(usize, &[Hit]),
{
    let names: Vec<String> = model
        .all_objects()
        .into_iter()
        .filter(|object| world.body_handle(object.id).is_some())
        .map(|object| object.name)
        .collect();
    for frame in 0..frames {
        world.update(dt);
        world.update_dynamic_objects_model_pose(model);
        if report_hits {
            let hits = world.hit_test(model, &names, false);
            annotate_hits(model, &hits);
            on_hits(frame, &hits);
        }
    }
}

pub fn print_final_state(model: &DataModel) {
    println!("Final object states:");
    for object in model.all_objects() {
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}, {:.2})",
            object.name,
            object.position.x,
            object.position.y,
            object.position.z,
            object.rotation.x,
            object.rotation.y,
            object.rotation.z,
            object.rotation.w
        );
    }
}
