//! voxmap benchmark
//!
//! Builds a square of chunks from a seeded heightmap, then times lookups,
//! snapshots and a full edit pass, logging occupancy and probe statistics.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -p voxmap-benchmark -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::time::Instant;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxmap_core::{BlockId, ChunkPos, WorldPos};
use voxmap_map::hash::mix;
use voxmap_map::ProbeStats;
use voxmap_world::{ChunkManager, WorldConfig};

/// Benchmark parameters from the command line.
#[derive(Clone, Debug)]
struct BenchParams {
    /// Chunks per horizontal axis.
    chunks: i32,
    /// Heightmap seed.
    seed: u64,
    /// Initial mask of each chunk map.
    initial_mask: usize,
}

impl Default for BenchParams {
    fn default() -> Self {
        Self {
            chunks: 8,
            seed: 42,
            initial_mask: 0x3FF,
        }
    }
}

impl BenchParams {
    fn from_args() -> Self {
        let mut params = Self::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--chunks" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.chunks = v;
                        i += 1;
                    }
                }
                "--seed" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.seed = v;
                        i += 1;
                    }
                }
                "--initial-mask" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.initial_mask = v;
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        params
    }

    /// Number of chunks the square of `chunks` per axis loads.
    fn chunk_count(&self) -> anyhow::Result<usize> {
        usize::try_from(self.chunks)
            .ok()
            .and_then(|n| n.checked_mul(n))
            .with_context(|| format!("--chunks {} is not a usable chunk count", self.chunks))
    }

    /// World extent in voxels along each horizontal axis.
    fn extent(&self, chunk_size: i32) -> anyhow::Result<i32> {
        self.chunks
            .checked_mul(chunk_size)
            .with_context(|| format!("--chunks {} overflows the world extent", self.chunks))
    }
}

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = BenchParams::from_args();
    info!(?params, "voxmap benchmark");

    let config = WorldConfig::default()
        .with_initial_mask(params.initial_mask)
        .with_max_chunks(params.chunk_count()?);
    let chunk_size = config.chunk_size;
    let extent = params.extent(chunk_size)?;
    let world = ChunkManager::new(config).context("invalid world config")?;

    let positions: Vec<_> = (0..params.chunks)
        .flat_map(|x| (0..params.chunks).map(move |z| ChunkPos::new(x, 0, z)))
        .collect();

    let start = Instant::now();
    world
        .populate(&positions, |pos, chunk| {
            let origin = pos.origin(chunk_size);
            for x in origin.x..origin.x + chunk_size {
                for z in origin.z..origin.z + chunk_size {
                    let top = height(params.seed, x, z, chunk_size);
                    for y in 0..top {
                        chunk.set_block(WorldPos::new(x, y, z), block_at(y, top))?;
                    }
                }
            }
            Ok(())
        })
        .context("terrain generation failed")?;
    info!(
        chunks = world.len(),
        blocks = world.block_count(),
        memory_kib = world.memory_usage() / 1024,
        elapsed_ms = start.elapsed().as_millis(),
        "populated"
    );

    let stats = world_probe_stats(&world, &positions);
    info!(
        load = stats.len as f64 / stats.capacity as f64,
        max_distance = stats.max_distance,
        mean_distance = stats.mean_distance,
        "probe statistics"
    );

    let start = Instant::now();
    let mut lookups = 0u64;
    let mut solid = 0usize;
    for x in 0..extent {
        for z in 0..extent {
            for y in 0..chunk_size {
                solid += usize::from(world.get_block(WorldPos::new(x, y, z)).is_solid());
                lookups += 1;
            }
        }
    }
    info!(
        lookups,
        solid,
        elapsed_ms = start.elapsed().as_millis(),
        "lookups"
    );

    let start = Instant::now();
    let snapshots: Vec<_> = positions
        .iter()
        .filter_map(|&pos| world.snapshot(pos))
        .collect();
    info!(
        snapshots = snapshots.len(),
        elapsed_us = start.elapsed().as_micros(),
        "snapshots"
    );

    let start = Instant::now();
    let mut removed = 0;
    for &pos in &positions {
        removed += world
            .with_chunk_mut(pos, |chunk| {
                // Strip the surface layer so every chunk loses part of its blocks.
                let tops: Vec<_> = chunk
                    .blocks()
                    .filter(|&(_, block)| block == BlockId::GRASS)
                    .map(|(p, _)| p)
                    .collect();
                for &p in &tops {
                    chunk.set_block(p, BlockId::AIR)?;
                }
                Ok::<_, voxmap_core::Error>(tops.len())
            })
            .transpose()?
            .unwrap_or(0);
    }
    info!(
        removed,
        blocks = world.block_count(),
        elapsed_ms = start.elapsed().as_millis(),
        "surface stripped"
    );

    Ok(())
}

/// Column height in `1..=chunk_size` from a hashed value lattice.
fn height(seed: u64, x: i32, z: i32, chunk_size: i32) -> i32 {
    const CELL: i32 = 8;
    let (cx, fx) = (x.div_euclid(CELL), x.rem_euclid(CELL));
    let (cz, fz) = (z.div_euclid(CELL), z.rem_euclid(CELL));
    let corner = |dx: i32, dz: i32| {
        let key = seed ^ (u64::from((cx + dx) as u32) << 32) ^ u64::from((cz + dz) as u32);
        (mix(key) % chunk_size as u64) as i32
    };
    let top = corner(0, 0) * (CELL - fx) + corner(1, 0) * fx;
    let bottom = corner(0, 1) * (CELL - fx) + corner(1, 1) * fx;
    (top * (CELL - fz) + bottom * fz) / (CELL * CELL) + 1
}

fn block_at(y: i32, top: i32) -> BlockId {
    match top - y {
        1 => BlockId::GRASS,
        2..=3 => BlockId::DIRT,
        _ => BlockId::STONE,
    }
}

fn world_probe_stats(world: &ChunkManager, positions: &[ChunkPos]) -> ProbeStats {
    let mut total = ProbeStats::default();
    let mut weighted = 0.0;
    for &pos in positions {
        if let Some(stats) = world.with_chunk(pos, |chunk| chunk.map().probe_stats()) {
            total.len += stats.len;
            total.capacity += stats.capacity;
            total.max_distance = total.max_distance.max(stats.max_distance);
            weighted += stats.mean_distance * stats.len as f64;
        }
    }
    if total.len > 0 {
        total.mean_distance = weighted / total.len as f64;
    }
    total
}

fn print_help() {
    eprintln!(
        "voxmap benchmark

USAGE:
    cargo run --release -p voxmap-benchmark -- [OPTIONS]

OPTIONS:
    --chunks <N>            Chunks per horizontal axis (default: 8)
    --seed <N>              Heightmap seed (default: 42)
    --initial-mask <N>      Initial chunk map mask, 2^k - 1 (default: 1023)
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
