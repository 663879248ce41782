// CLI entry point: build one timber-frame hall in an in-memory scene and
// print a summary of what was generated.
//
// Reads a `BuildingParams` JSON file, runs a full rebuild against
// `MemoryScene`, and prints per-component object counts and world bounds as
// JSON on stdout. Logs go to stderr, filtered by `RUST_LOG` (default
// `info`).
//
// Usage:
//   rebuild <PARAMS.json> [OPTIONS]
//     --config <PATH>   Proportion table JSON (default: built-in table)
//     --no-assets       Leave the asset library empty (bare lattice rings,
//                       no tiles)

use serde::Serialize;
use std::collections::BTreeMap;
use timberframe_layout::{BuildingId, BuildingParams, BuildingRegistry, ComponentKind, LayoutConfig, NullProgress};
use timberframe_scene::{Aabb, MemoryScene, Scene, Vec3};

struct Args {
    params: String,
    config: Option<String>,
    assets: bool,
}

#[derive(Serialize)]
struct ComponentSummary {
    objects: usize,
    nodes: usize,
    bounds: Option<Aabb>,
}

#[derive(Serialize)]
struct Summary {
    building: BuildingId,
    context: String,
    components: BTreeMap<&'static str, ComponentSummary>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => LayoutConfig::from_json(&read_or_exit(path)).unwrap_or_else(|e| {
            eprintln!("Invalid config {path}: {e}");
            std::process::exit(1);
        }),
        None => LayoutConfig::default(),
    };
    let params = BuildingParams::from_json(&read_or_exit(&args.params)).unwrap_or_else(|e| {
        eprintln!("Invalid parameters {}: {e}", args.params);
        std::process::exit(1);
    });

    let mut scene = MemoryScene::new();
    if args.assets {
        scene.add_asset(&config.assets.lattice_core, Vec3::new(0.1, 0.02, 0.15));
        scene.add_asset(&config.assets.flat_tile, Vec3::new(0.25, 0.3, 0.03));
        scene.add_asset(&config.assets.round_tile, Vec3::new(0.12, 0.3, 0.08));
    }

    let context = params.context();
    let mut registry = BuildingRegistry::new(config);
    let id = match registry.add_building(&mut scene, params, &mut NullProgress) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Build failed: {e}");
            std::process::exit(1);
        }
    };

    let mut components = BTreeMap::new();
    for kind in ComponentKind::ALL {
        let Some(root) = registry.component_root(id, kind) else {
            continue;
        };
        let bounds = scene.bounds_of_hierarchy(root).unwrap_or_else(|e| {
            eprintln!("Could not measure {}: {e}", kind.node_name());
            std::process::exit(1);
        });
        components.insert(
            kind.node_name(),
            ComponentSummary { objects: scene.object_count(root), nodes: scene.descendants(root).len() + 1, bounds },
        );
    }

    let summary = Summary { building: id, context, components };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize summary: {e}");
            std::process::exit(1);
        }
    }
}

fn read_or_exit(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {path}: {e}");
        std::process::exit(1);
    })
}

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut params = None;
    let mut config = None;
    let mut assets = true;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--no-assets" => assets = false,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            path => params = Some(path.to_string()),
        }
        i += 1;
    }

    let Some(params) = params else {
        print_usage();
        std::process::exit(1);
    };
    Args { params, config, assets }
}

fn print_usage() {
    println!("Usage: rebuild <PARAMS.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Proportion table JSON (default: built-in table)");
    println!("  --no-assets       Leave the asset library empty");
    println!("  --help, -h        Show this help");
}
