#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round resolver that orders and executes one command per worm.

use std::collections::BTreeMap;

use wormgrid_core::{Command, CommandError, Event, WormId};
use wormgrid_world::{self as world, query, World};

/// Collects one command per worm per round and resolves them sequentially.
///
/// The resolver owns the round counter; the world only records the round
/// number a relocation happened on. Commands execute strictly one at a
/// time in ascending worm-id order, each validated against the world as it
/// stands at that instant, never against a round-start snapshot. A cell
/// claimed by an earlier command in the walk therefore rejects every later
/// claim in the same round.
#[derive(Debug)]
pub struct RoundResolver {
    round: u32,
    submissions: BTreeMap<WormId, Command>,
}

impl RoundResolver {
    /// Creates a resolver starting at round zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            round: 0,
            submissions: BTreeMap::new(),
        }
    }

    /// Index of the round the next call to [`RoundResolver::resolve`] will
    /// execute.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Registers a worm's command for the pending round.
    ///
    /// Resubmitting before resolution replaces the earlier command; the
    /// last submission wins.
    pub fn submit(&mut self, command: Command) {
        let _ = self.submissions.insert(command.issuer(), command);
    }

    /// Resolves the pending round against the provided world.
    ///
    /// Living worms without a submission default to a rest command. Downed
    /// worms are skipped unless explicitly commanded, in which case the
    /// rejection reason surfaces as an event. Submissions naming worms
    /// that are not on the battlefield are rejected after the walk. The
    /// round counter advances once the walk completes.
    pub fn resolve(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        let round = self.round;
        let view = query::worm_view(world);

        for snapshot in view.iter() {
            let submitted = self.submissions.remove(&snapshot.id);
            if snapshot.health.is_depleted() && submitted.is_none() {
                continue;
            }

            let command = submitted.unwrap_or(Command::rest(snapshot.id));
            if let Err(reason) = world::apply(world, command, round, out_events) {
                out_events.push(Event::CommandRejected {
                    worm: snapshot.id,
                    reason,
                });
            }
        }

        for (worm, _command) in std::mem::take(&mut self.submissions) {
            out_events.push(Event::CommandRejected {
                worm,
                reason: CommandError::UnknownWorm(worm),
            });
        }

        self.round += 1;
    }
}

impl Default for RoundResolver {
    fn default() -> Self {
        Self::new()
    }
}
