#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Wormgrid skirmishes.
//!
//! The runner either decodes a shared arena layout or generates one from
//! the seed, then submits seeded random commands for every worm each round
//! and prints the event log the resolver produces. Rejections are part of
//! the story: a contested cell shows up as one teleport and one refusal.

mod layout_transfer;

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use layout_transfer::{ArenaSnapshot, WormSpawn};
use wormgrid_core::{
    CellKind, Command, CommandError, Event, Health, PlayerId, Point, WormId, WormProfile,
};
use wormgrid_system_rounds::RoundResolver;
use wormgrid_world::{query, Player, Worm, World};

/// Hitpoints every demo worm starts with.
const WORM_HEALTH: Health = Health::new(10);
/// Chance that a generated interior cell starts as dirt.
const DIRT_DENSITY: f64 = 0.25;
/// Chance that a worm digs instead of relocating on a given round.
const DIG_BIAS: f64 = 0.3;

/// Command-line arguments for the skirmish runner.
#[derive(Debug, Parser)]
#[command(name = "wormgrid", about = "Runs a seeded Wormgrid skirmish to completion")]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 11)]
    columns: u32,
    /// Number of grid rows.
    #[arg(long, default_value_t = 11)]
    rows: u32,
    /// Number of rounds to resolve.
    #[arg(long, default_value_t = 16)]
    rounds: u32,
    /// Seed driving arena generation and command selection.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Worms fielded by each of the two players.
    #[arg(long, default_value_t = 2)]
    worms_per_player: u32,
    /// Encoded arena snapshot to load instead of generating one.
    #[arg(long)]
    layout: Option<String>,
    /// Print the encoded arena snapshot before the match starts.
    #[arg(long)]
    print_layout: bool,
}

/// Entry point for the Wormgrid command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let snapshot = match &args.layout {
        Some(encoded) => ArenaSnapshot::decode(encoded)
            .context("could not decode the provided arena layout")?,
        None => generate_arena(&args, &mut rng)?,
    };
    if args.print_layout {
        println!("{}", snapshot.encode());
    }

    let mut world = build_world(snapshot)?;
    let mut resolver = RoundResolver::new();

    for _ in 0..args.rounds {
        let round = resolver.round();
        submit_commands(&world, &mut resolver, &mut rng);
        let mut events = Vec::new();
        resolver.resolve(&mut world, &mut events);
        report_round(round, &events);
    }

    report_standings(&world);
    Ok(())
}

/// Generates a random arena: dirt scattered through the interior and the
/// requested worms spawned on distinct open interior cells.
fn generate_arena(args: &Args, rng: &mut ChaCha8Rng) -> Result<ArenaSnapshot> {
    if args.columns < 3 || args.rows < 3 {
        bail!("the grid needs at least a 3x3 footprint to hold an interior");
    }

    let mut terrain = Vec::with_capacity(args.columns as usize * args.rows as usize);
    for y in 0..args.rows {
        for x in 0..args.columns {
            let border = x == 0 || y == 0 || x + 1 == args.columns || y + 1 == args.rows;
            if !border && rng.gen_bool(DIRT_DENSITY) {
                terrain.push(CellKind::Dirt);
            } else {
                terrain.push(CellKind::Air);
            }
        }
    }

    let mut open_cells: Vec<Point> = Vec::new();
    for y in 1..args.rows.saturating_sub(1) {
        for x in 1..args.columns.saturating_sub(1) {
            let index = (y * args.columns + x) as usize;
            if terrain[index].is_passable() {
                open_cells.push(Point::new(x, y));
            }
        }
    }

    let wanted = args.worms_per_player as usize * 2;
    if open_cells.len() < wanted {
        bail!(
            "only {} open interior cells are available for {} worms",
            open_cells.len(),
            wanted
        );
    }

    let mut spawns = Vec::with_capacity(wanted);
    for index in 0..wanted {
        let pick = rng.gen_range(0..open_cells.len());
        let position = open_cells.swap_remove(pick);
        spawns.push(WormSpawn {
            player: PlayerId::new((index % 2) as u32 + 1),
            worm: WormId::new(index as u32 + 1),
            position,
        });
    }

    Ok(ArenaSnapshot {
        columns: args.columns,
        rows: args.rows,
        terrain,
        spawns,
    })
}

/// Converts an arena snapshot into the authoritative world.
fn build_world(snapshot: ArenaSnapshot) -> Result<World> {
    let mut rosters: BTreeMap<PlayerId, Vec<Worm>> = BTreeMap::new();
    for spawn in &snapshot.spawns {
        rosters.entry(spawn.player).or_default().push(Worm::new(
            spawn.worm,
            WORM_HEALTH,
            spawn.position,
            WormProfile::COMMANDO,
        ));
    }
    let players = rosters
        .into_iter()
        .map(|(id, worms)| Player::new(id, worms))
        .collect();

    World::new(players, snapshot.columns, snapshot.rows, snapshot.terrain)
        .context("arena snapshot does not describe a playable battlefield")
}

/// Submits a seeded random command for every living worm.
fn submit_commands(world: &World, resolver: &mut RoundResolver, rng: &mut ChaCha8Rng) {
    for snapshot in query::worm_view(world).iter() {
        if snapshot.health.is_depleted() {
            continue;
        }
        let command = if rng.gen_bool(DIG_BIAS) {
            Command::dig(
                snapshot.id,
                random_target(snapshot.position, snapshot.profile.dig_range(), rng),
            )
        } else {
            Command::teleport(
                snapshot.id,
                random_target(snapshot.position, snapshot.profile.teleport_range(), rng),
            )
        };
        log::debug!(
            "round {}: worm {} submits {:?}",
            resolver.round(),
            snapshot.id.get(),
            command
        );
        resolver.submit(command);
    }
}

/// Picks a uniformly random cell from the ability's reach around the
/// origin. Picks that fall off the grid or into another worm are left to
/// command validation to refuse.
fn random_target(origin: Point, range: u32, rng: &mut ChaCha8Rng) -> Point {
    let x = rng.gen_range(origin.x().saturating_sub(range)..=origin.x().saturating_add(range));
    let y = rng.gen_range(origin.y().saturating_sub(range)..=origin.y().saturating_add(range));
    Point::new(x, y)
}

/// Prints one line per event the round produced.
fn report_round(round: u32, events: &[Event]) {
    for event in events {
        match event {
            Event::WormTeleported { worm, from, to } => println!(
                "round {round}: worm {} teleported from ({}, {}) to ({}, {})",
                worm.get(),
                from.x(),
                from.y(),
                to.x(),
                to.y()
            ),
            Event::CellDug { worm, target } => println!(
                "round {round}: worm {} dug open ({}, {})",
                worm.get(),
                target.x(),
                target.y()
            ),
            Event::WormRested { worm } => {
                println!("round {round}: worm {} rested", worm.get());
            }
            Event::CommandRejected { worm, reason } => println!(
                "round {round}: worm {} was refused: {}",
                worm.get(),
                describe_rejection(reason)
            ),
        }
    }
}

/// Renders a rejection reason for the match log.
fn describe_rejection(reason: &CommandError) -> String {
    match reason {
        CommandError::UnknownWorm(worm) => {
            format!("no worm {} on the battlefield", worm.get())
        }
        CommandError::WormDown(worm) => format!("worm {} is down", worm.get()),
        CommandError::OutOfRange { target, range, .. } => format!(
            "({}, {}) is beyond the ability range of {range}",
            target.x(),
            target.y()
        ),
        CommandError::OutOfBounds { target } => {
            format!("({}, {}) is out of play", target.x(), target.y())
        }
        CommandError::Obstructed { target } => {
            format!("({}, {}) is blocked by terrain", target.x(), target.y())
        }
        CommandError::Occupied { target } => {
            format!("({}, {}) is already occupied", target.x(), target.y())
        }
        CommandError::NothingToDig { target } => {
            format!("({}, {}) holds nothing to dig", target.x(), target.y())
        }
    }
}

/// Prints the final position and bookkeeping of every worm.
fn report_standings(world: &World) {
    println!("final standings:");
    for snapshot in query::worm_view(world).iter() {
        let moved = match snapshot.last_moved {
            Some(round) => format!("last moved on round {round}"),
            None => String::from("never moved"),
        };
        println!(
            "  player {} worm {} at ({}, {}) with {} hp, {moved}",
            snapshot.player.get(),
            snapshot.id.get(),
            snapshot.position.x(),
            snapshot.position.y(),
            snapshot.health.get(),
        );
    }
}
