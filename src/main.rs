use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};

use crystal_physics::app::{build_bodies, print_final_state, run_simulation};
use crystal_physics::{DataModel, PhysicsWorld, Scene};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read scene {}", options.path))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;

    println!("Loaded scene with {} objects", scene.objects.len());
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }

    let model = DataModel::from_objects(scene.objects);
    let mut world = PhysicsWorld::with_config(scene.physics);
    let bodies = build_bodies(&mut world, &model)?;
    println!(
        "Created {bodies} bodies ({} dynamic)",
        world.dynamic_objects().len()
    );

    run_simulation(
        &mut world,
        &model,
        options.frames,
        options.dt,
        options.report_hits,
        |frame, hits| {
            for hit in hits {
                let a = model.name_of(hit.a).unwrap_or_else(|| hit.a.to_string());
                let b = model.name_of(hit.b).unwrap_or_else(|| hit.b.to_string());
                println!("frame {frame}: {a} <-> {b}");
            }
        },
    );
    println!("Simulated {} frame(s)", options.frames);

    print_final_state(&model);
    Ok(())
}

struct CliOptions {
    path: String,
    frames: usize,
    dt: f32,
    report_hits: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        const USAGE: &str = "Usage: crystal-physics <scene.xml> [--frames N] [--dt SECONDS] [--hits]";
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        let mut options = Self {
            path,
            frames: 60,
            dt: 1.0 / 60.0,
            report_hits: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().ok_or_else(|| anyhow!("--frames needs a value"))?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value}"))?;
                }
                "--dt" => {
                    let value = args.next().ok_or_else(|| anyhow!("--dt needs a value"))?;
                    options.dt = value
                        .parse()
                        .with_context(|| format!("invalid time step {value}"))?;
                }
                "--hits" => options.report_hits = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}
