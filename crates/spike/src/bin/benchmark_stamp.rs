use anyhow::Context;
use clap::Parser;
use influence_core::texture;
use influence_core::{AgentId, InfluenceConfig, TacticalLayer, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Drive a crowd of random-walking agents over the influence grid and report timings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON influence config; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 500)]
    agents: usize,
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Overrides the config's grid dimension.
    #[arg(long)]
    dimension: Option<u32>,
    /// Overrides the config's default stamp radius.
    #[arg(long)]
    radius: Option<u32>,
    /// Agents despawned and respawned per tick.
    #[arg(long, default_value_t = 5)]
    churn: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn random_position(rng: &mut ChaCha12Rng, config: &InfluenceConfig) -> Vec3 {
    let origin = -config.grid.terrain_origin_offset;
    let extent = config.grid.terrain_resolution;
    Vec3::new(
        origin + rng.random::<f32>() * extent,
        0.0,
        origin + rng.random::<f32>() * extent,
    )
}

fn per_tick(elapsed: Duration, ticks: u32) -> Duration {
    elapsed / ticks.max(1)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => InfluenceConfig::from_json_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => InfluenceConfig::default(),
    };
    if let Some(dimension) = args.dimension {
        config.grid.dimension = dimension;
    }
    if let Some(radius) = args.radius {
        config.grid.default_stamp_radius = radius;
    }
    let mut layer = TacticalLayer::new(&config).context("building tactical layer")?;

    let start = Instant::now();
    layer.grid().warm_spatial_index();
    info!(
        cells = layer.grid().cell_count(),
        elapsed = ?start.elapsed(),
        "spatial index ready"
    );

    let mut rng = ChaCha12Rng::seed_from_u64(args.seed);
    let mut crowd: Vec<(AgentId, Vec3)> = Vec::with_capacity(args.agents);
    for _ in 0..args.agents {
        let id = layer.spawn(None)?;
        crowd.push((id, random_position(&mut rng, &config)));
    }

    let step = layer.grid().mapper().cell_size() as f32;
    let start = Instant::now();
    let mut corrected_total = 0usize;
    for _ in 0..args.ticks {
        for (_, pos) in &mut crowd {
            pos.x += rng.random_range(-step..=step);
            pos.z += rng.random_range(-step..=step);
        }
        if let Some(corrected) = layer.step(&crowd)? {
            corrected_total += corrected;
        }
        for _ in 0..args.churn.min(crowd.len()) {
            let slot = rng.random_range(0..crowd.len());
            layer.despawn(crowd[slot].0)?;
            crowd[slot] = (layer.spawn(None)?, random_position(&mut rng, &config));
        }
    }
    let elapsed = start.elapsed();
    let per_tick = per_tick(elapsed, args.ticks);

    let hottest = layer
        .grid()
        .intensities()
        .into_iter()
        .fold(0.0f32, f32::max);
    let start = Instant::now();
    let pixels = texture::to_rgba8(layer.grid(), hottest);
    let texture_time = start.elapsed();

    info!(
        agents = layer.agent_count(),
        ticks = args.ticks,
        ?elapsed,
        ?per_tick,
        corrected_total,
        "stamp loop finished"
    );
    println!(
        "{} agents x {} ticks on {}x{} (radius {}): {:?} total, {:?} per tick",
        args.agents,
        args.ticks,
        config.grid.dimension,
        config.grid.dimension,
        config.grid.default_stamp_radius,
        elapsed,
        per_tick
    );
    println!(
        "grid total {:.3}, hottest cell {:.3}, reconciliation corrected {} cells",
        layer.grid().total_intensity(),
        hottest,
        corrected_total
    );
    println!("rgba export: {} bytes in {:?}", pixels.len(), texture_time);
    Ok(())
}
