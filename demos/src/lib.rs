//! Helpers shared by the command-line demos: argument parsing, endpoint
//! selection, and text rendering of a map with a path on it.

use tilepath_core::{Point, Range};
use tilepath_paths::{PlannerMethod, Termination, chebyshev};
use tilepath_terrain::{ChunkedMap, TerrainLayers};

pub const VIEW_WIDTH: i32 = 48;
pub const VIEW_HEIGHT: i32 = 20;

const USAGE: &str = "\
usage: planner-demo [--method astar|parallel|both] [--seed N] [--steps N] [--converged]";

/// Demo settings from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOptions {
    /// `None` runs every planner on the same query.
    pub method: Option<PlannerMethod>,
    pub seed: u64,
    /// How many times the view scrolls right, replanning each time.
    pub steps: usize,
    pub termination: Termination,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            method: None,
            seed: 1,
            steps: 3,
            termination: Termination::GoalDiscovered,
        }
    }
}

impl DemoOptions {
    /// Parse arguments, excluding the program name.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut opts = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--method" => {
                    let v = value(&mut args, "--method")?;
                    opts.method = if v == "both" { None } else { Some(v.parse()?) };
                }
                "--seed" => {
                    let v = value(&mut args, "--seed")?;
                    opts.seed = v.parse().map_err(|_| format!("invalid seed '{v}'"))?;
                }
                "--steps" => {
                    let v = value(&mut args, "--steps")?;
                    opts.steps = v.parse().map_err(|_| format!("invalid step count '{v}'"))?;
                }
                "--converged" => opts.termination = Termination::Converged,
                "-h" | "--help" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
            }
        }
        Ok(opts)
    }

    /// Planners to run, in order.
    pub fn methods(&self) -> Vec<PlannerMethod> {
        match self.method {
            Some(m) => vec![m],
            None => vec![PlannerMethod::AStar, PlannerMethod::Parallel],
        }
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} needs a value"))
}

/// The passable loaded tile of `view` closest to `target`, if any.
pub fn nearest_passable<L: TerrainLayers>(
    map: &ChunkedMap<L>,
    view: Range,
    target: Point,
) -> Option<Point> {
    view.iter()
        .filter(|&p| map.tile_at(p).is_some_and(|t| t.kind.is_passable()))
        .min_by_key(|&p| (chebyshev(p, target), p))
}

/// Render `view` as text, one glyph per tile, with the path drawn as `*`
/// and its endpoints as `S` and `G`.
pub fn render<L: TerrainLayers>(map: &ChunkedMap<L>, view: Range, path: &[Point]) -> String {
    let mut out = String::with_capacity(view.len() + view.height() as usize);
    for y in view.min.y..view.max.y {
        for x in view.min.x..view.max.x {
            let p = Point::new(x, y);
            let glyph = if path.first() == Some(&p) {
                'S'
            } else if path.last() == Some(&p) {
                'G'
            } else if path.contains(&p) {
                '*'
            } else {
                map.tile_at(p).map_or(' ', |t| t.kind.glyph())
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilepath_terrain::{ChunkConfig, TerrainKind, TileMap};

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parse_defaults_and_flags() {
        assert_eq!(DemoOptions::from_args(args("")), Ok(DemoOptions::default()));
        let o = DemoOptions::from_args(args("--method parallel --seed 9 --steps 0 --converged"))
            .unwrap();
        assert_eq!(o.method, Some(PlannerMethod::Parallel));
        assert_eq!(o.seed, 9);
        assert_eq!(o.steps, 0);
        assert_eq!(o.termination, Termination::Converged);
        assert_eq!(o.methods(), vec![PlannerMethod::Parallel]);
        assert_eq!(DemoOptions::default().methods().len(), 2);
    }

    #[test]
    fn parse_errors() {
        assert!(DemoOptions::from_args(args("--seed")).is_err());
        assert!(DemoOptions::from_args(args("--seed x")).is_err());
        assert!(DemoOptions::from_args(args("--method rrt")).is_err());
        assert!(DemoOptions::from_args(args("--fast")).is_err());
    }

    fn tiny_map() -> ChunkedMap<TileMap> {
        let mut layers = TileMap::filled(4, 2, TerrainKind::Grass).unwrap();
        layers.set(Point::new(0, 0), TerrainKind::Water);
        let mut map = ChunkedMap::new(layers, ChunkConfig::default()).unwrap();
        map.scroll_to(Range::sized(4, 2));
        map
    }

    #[test]
    fn renders_path_over_terrain() {
        let map = tiny_map();
        let path = [Point::new(1, 0), Point::new(2, 1), Point::new(3, 1)];
        let text = render(&map, Range::sized(4, 2), &path);
        assert_eq!(text, "~S\"\"\n\"\"*G\n");
    }

    #[test]
    fn nearest_skips_water() {
        let map = tiny_map();
        let p = nearest_passable(&map, Range::sized(4, 2), Point::ZERO);
        assert_eq!(p, Some(Point::new(1, 0)));
    }
}
