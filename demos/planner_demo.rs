//! Plans across a streamed scatter map while the view scrolls east, printing
//! the map, the path, and how each planner did.
//!
//! Run: cargo run --bin planner-demo -- --method both --seed 7
//! Set RUST_LOG=debug to see chunk loading and search details.

use std::time::Instant;

use log::{info, warn};
use tilepath_core::{Point, Range};
use tilepath_demos::{DemoOptions, VIEW_HEIGHT, VIEW_WIDTH, nearest_passable, render};
use tilepath_paths::{ParallelConfig, PlannerConfig, build_planner};
use tilepath_terrain::{ChunkConfig, ChunkedMap, ScatterLayers};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = match DemoOptions::from_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &DemoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut map = ChunkedMap::new(
        ScatterLayers::default(),
        ChunkConfig {
            seed: opts.seed,
            ..ChunkConfig::default()
        },
    )?;

    let mut planners = opts
        .methods()
        .into_iter()
        .map(|method| {
            build_planner(&PlannerConfig {
                method,
                parallel: ParallelConfig {
                    termination: opts.termination,
                    ..ParallelConfig::default()
                },
                ..PlannerConfig::default()
            })
        })
        .collect::<Vec<_>>();

    for step in 0..=opts.steps {
        let origin = Point::new(step as i32 * VIEW_WIDTH / 2, 0);
        let view = Range::with_size(origin, Point::new(VIEW_WIDTH, VIEW_HEIGHT));
        map.scroll_to(view);

        let corner = view.max.shift(-1, -1);
        let (Some(start), Some(goal)) = (
            nearest_passable(&map, view, view.min),
            nearest_passable(&map, view, corner),
        ) else {
            warn!("view {view} has no passable tiles");
            continue;
        };
        println!("view {view}: {start} -> {goal}");

        let mut shown = false;
        for planner in &mut planners {
            let t0 = Instant::now();
            planner.set_terrain_source(&map)?;
            let (found, cost) = {
                let r = planner.compute_path(start, goal)?;
                (r.found, r.cost)
            };
            let elapsed = t0.elapsed();
            if found {
                info!(
                    "{}: cost {:.2}, {} steps, {:?}",
                    planner.name(),
                    cost,
                    planner.path().len() - 1,
                    elapsed
                );
            } else {
                info!("{}: no path ({:?})", planner.name(), elapsed);
            }
            if !shown {
                print!("{}", render(&map, view, planner.path()));
                shown = true;
            }
        }
    }
    Ok(())
}
