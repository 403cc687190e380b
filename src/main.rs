mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use hashbrown::HashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tread_blocks::BlockRegistry;
use tread_geom::Vec3;
use tread_runtime::{PathReady, PathStatus, PathfinderSystem, RequestId};
use tread_world::worldgen::Mode;
use tread_world::{BlockSource, GridWorld};

use crate::config::AppConfig;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Empty,
    Flat,
    Hills,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Empty => Mode::Empty,
            ModeArg::Flat => Mode::Flat,
            ModeArg::Hills => Mode::Hills,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tread", about = "Hierarchical pathfinding over a voxel world")]
struct Args {
    /// World, nav and worker settings
    #[arg(long, default_value = "config/tread.toml")]
    config: PathBuf,
    /// Block type table; the built-in set is used when omitted
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Terrain generator
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Loaded chunks along x and z
    #[arg(long)]
    chunks: Option<usize>,
    #[arg(long)]
    seed: Option<i32>,
    /// Random requests to issue when no endpoints are given
    #[arg(long, default_value_t = 16)]
    requests: usize,
    /// Start column as X,Z
    #[arg(long, value_parser = parse_column, allow_hyphen_values = true)]
    from: Option<(i32, i32)>,
    /// Target column as X,Z
    #[arg(long, value_parser = parse_column, allow_hyphen_values = true)]
    to: Option<(i32, i32)>,
    /// How long to wait for loading and for replies
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

fn parse_column(s: &str) -> Result<(i32, i32), String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z, got '{}'", s))?;
    let x = x.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let z = z.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok((x, z))
}

/// Standing position above the terrain of a column.
fn stand_on(world: &GridWorld, x: i32, z: i32) -> Vec3 {
    let top = world.terrain_height(x, z).map_or(0, |h| h + 1);
    Vec3::new(x as f32 + 0.5, top as f32, z as f32 + 0.5)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = if args.config.exists() {
        AppConfig::load(&args.config)?
    } else {
        log::warn!("config {} not found, using defaults", args.config.display());
        AppConfig::default()
    };
    if let Some(mode) = args.mode {
        cfg.world.mode = mode.into();
    }
    if let Some(n) = args.chunks {
        cfg.world.chunks_x = n;
        cfg.world.chunks_z = n;
    }
    if let Some(seed) = args.seed {
        cfg.world.seed = seed;
    }

    let reg = match &args.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::with_defaults(),
    };
    let dims = cfg.world.dims();
    let world = Arc::new(GridWorld::new(
        dims,
        Arc::new(reg),
        cfg.world.seed,
        cfg.world.gen_mode(),
    ));
    let sys = PathfinderSystem::new(
        Arc::clone(&world) as Arc<dyn BlockSource>,
        cfg.nav.clone(),
        cfg.system.clone(),
    )?;
    world.register_listener(sys.listener());

    let timeout = Duration::from_millis(args.timeout_ms);
    let (cx, cz) = (cfg.world.chunks_x as i32, cfg.world.chunks_z as i32);
    let t0 = Instant::now();
    world.load_area(0, 0, cx, cz);
    let expected = (cx.max(0) * cz.max(0)) as usize;
    while sys.snapshot().len() < expected && t0.elapsed() < timeout {
        thread::sleep(Duration::from_millis(5));
    }
    log::info!(
        "loaded {}/{} chunks in {:.2}ms",
        sys.snapshot().len(),
        expected,
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let extent_x = (cx * dims.chunk_size_x as i32).max(1);
    let extent_z = (cz * dims.chunk_size_z as i32).max(1);
    let pairs: Vec<((i32, i32), (i32, i32))> = match (args.from, args.to) {
        (Some(from), Some(to)) => vec![(from, to)],
        _ => {
            let mut rng = ChaCha8Rng::seed_from_u64(cfg.world.seed as u64);
            (0..args.requests)
                .map(|_| {
                    let from = (rng.gen_range(0..extent_x), rng.gen_range(0..extent_z));
                    let to = (rng.gen_range(0..extent_x), rng.gen_range(0..extent_z));
                    (from, to)
                })
                .collect()
        }
    };

    let t_req = Instant::now();
    let mut asked: HashMap<RequestId, ((i32, i32), (i32, i32))> = HashMap::new();
    for (i, &(from, to)) in pairs.iter().enumerate() {
        let start = stand_on(&world, from.0, from.1);
        let target = stand_on(&world, to.0, to.1);
        let id = sys.request_path(i as u64, start, &[target]);
        asked.insert(id, (from, to));
    }

    let mut replies: Vec<PathReady> = Vec::with_capacity(asked.len());
    while replies.len() < asked.len() {
        let left = timeout.saturating_sub(t_req.elapsed());
        match sys.results().recv_timeout(left) {
            Ok(r) => replies.push(r),
            Err(_) => {
                log::warn!("timed out with {} replies missing", asked.len() - replies.len());
                break;
            }
        }
    }
    replies.sort_by_key(|r| r.id);

    for r in &replies {
        let Some(&(from, to)) = asked.get(&r.id) else {
            continue;
        };
        match r.status {
            PathStatus::Found => println!(
                "#{:<3} ({},{}) -> ({},{}) found: {} steps, cost {:.2}",
                r.id,
                from.0,
                from.1,
                to.0,
                to.1,
                r.path.len(),
                r.cost.unwrap_or(0.0)
            ),
            status => println!(
                "#{:<3} ({},{}) -> ({},{}) {:?}",
                r.id, from.0, from.1, to.0, to.1, status
            ),
        }
    }
    if let [single] = replies.as_slice() {
        if single.is_found() {
            let steps: Vec<String> = single.walk_order().iter().map(|p| p.to_string()).collect();
            println!("path: {}", steps.join(" "));
        }
    }

    let stats = sys.stats();
    println!(
        "requests={} found={} not_found={} unresolved={} failed={} rebuilds={} dropped={}/{}",
        stats.requests,
        stats.found,
        stats.not_found,
        stats.unresolved,
        stats.failed,
        stats.rebuilds,
        stats.dropped_requests,
        stats.dropped_invalidations
    );
    sys.shutdown();
    Ok(())
}
