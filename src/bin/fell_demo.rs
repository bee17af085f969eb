//! Fell a single oak in an in-memory world and report what comes down.
//!
//! Usage:
//!   cargo run --bin fell_demo
//!   cargo run --bin fell_demo -- --face east --config timber.json --players players.json

use std::path::PathBuf;

use timber::chop::{Actor, ChopCoordinator, ChopOutcome};
use timber::config::TimberConfig;
use timber::core::logging;
use timber::core::Result;
use timber::host::{PlayerId, PlayerStore, TickScheduler};
use timber::voxel::{BlockSource, BlockTag, Face, MemoryWorld, VoxelPos};

fn parse_face(name: &str) -> Option<Face> {
    match name {
        "north" => Some(Face::North),
        "south" => Some(Face::South),
        "east" => Some(Face::East),
        "west" => Some(Face::West),
        "up" => Some(Face::Up),
        "down" => Some(Face::Down),
        _ => None,
    }
}

/// Birch-style tree: tall trunk, two canopy layers and a cap
fn plant(world: &mut MemoryWorld, base: VoxelPos) {
    let leaves = BlockTag::from_static("minecraft:oak_leaves");
    world.set(base.below(), "minecraft:grass_block");
    world.column(base, 6, "minecraft:oak_log");
    for dy in 3..=4 {
        for dx in -2..=2 {
            for dz in -2..=2 {
                let pos = base.offset(dx, dy, dz);
                if world.block_tag(pos).is_air() {
                    world.set(pos, leaves.clone());
                }
            }
        }
    }
    for dx in -1..=1 {
        for dz in -1..=1 {
            world.set(base.offset(dx, 6, dz), leaves.clone());
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let arg = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let config = match arg("--config") {
        Some(path) => TimberConfig::load(path)?,
        None => TimberConfig::default(),
    };
    let face = arg("--face").and_then(|f| parse_face(&f)).unwrap_or(Face::North);

    let runtime = tokio::runtime::Runtime::new()?;
    let players = match arg("--players") {
        Some(path) => runtime.block_on(PlayerStore::open(PathBuf::from(path), config.chopping_enabled_by_default))?,
        None => PlayerStore::new(config.chopping_enabled_by_default),
    };

    let base = VoxelPos::new(0, 64, 0);
    let mut world = MemoryWorld::new();
    plant(&mut world, base);
    log::info!("World has {} blocks", world.block_count());

    let mut coordinator = ChopCoordinator::new(config, world, TickScheduler::new(), players)?;
    let actor = Actor::new(PlayerId::random())
        .holding("minecraft:iron_axe")
        .facing(face.opposite());

    match coordinator.attempt_chop(&actor, base, face) {
        ChopOutcome::Accepted { session, instant } => {
            log::info!("Session {} accepted{}", session, if instant { " (instant)" } else { "" });
        }
        ChopOutcome::Rejected(reason) => {
            log::warn!("Chop rejected: {:?}", reason);
            return Ok(());
        }
        ChopOutcome::Failed(e) => return Err(e),
    }

    while coordinator.active_sessions() > 0 {
        coordinator.tick();
    }
    log::info!("Settled after {} ticks", coordinator.scheduler().current_tick());

    let world = coordinator.world();
    for (at, stack) in world.drops() {
        log::info!("  {} x{} at ({:.2}, {:.2}, {:.2})", stack.item, stack.count, at.x, at.y, at.z);
    }
    log::info!(
        "{} drops, {} blocks left, {} at the stump",
        world.drops().len(),
        world.block_count(),
        world.block_tag(base)
    );

    runtime.block_on(coordinator.players().save())
}
