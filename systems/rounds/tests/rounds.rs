use wormgrid_core::{
    CellKind, Command, CommandError, Event, Health, PlayerId, Point, WormId, WormProfile,
};
use wormgrid_system_rounds::RoundResolver;
use wormgrid_world::{query, Player, Worm, World};

#[test]
fn missing_submissions_default_to_rest() {
    let mut world = battlefield(vec![commando(1, 2, 2)]);
    let mut resolver = RoundResolver::new();
    let mut events = Vec::new();

    resolver.resolve(&mut world, &mut events);

    assert_eq!(
        events,
        vec![Event::WormRested {
            worm: WormId::new(1),
        }]
    );
    assert_eq!(resolver.round(), 1);
}

#[test]
fn resubmission_replaces_the_earlier_command() {
    let mut world = battlefield(vec![commando(1, 2, 2)]);
    let mut resolver = RoundResolver::new();
    let mut events = Vec::new();

    resolver.submit(Command::teleport_at(WormId::new(1), 3, 3));
    resolver.submit(Command::rest(WormId::new(1)));
    resolver.resolve(&mut world, &mut events);

    assert_eq!(
        events,
        vec![Event::WormRested {
            worm: WormId::new(1),
        }]
    );
    let worm = world.worm(WormId::new(1)).expect("worm still present");
    assert_eq!(worm.position(), Point::new(2, 2));
}

#[test]
fn submissions_for_unknown_worms_are_rejected() {
    let mut world = battlefield(vec![commando(1, 2, 2)]);
    let mut resolver = RoundResolver::new();
    let mut events = Vec::new();

    resolver.submit(Command::teleport_at(WormId::new(9), 3, 3));
    resolver.resolve(&mut world, &mut events);

    assert_eq!(
        events,
        vec![
            Event::WormRested {
                worm: WormId::new(1),
            },
            Event::CommandRejected {
                worm: WormId::new(9),
                reason: CommandError::UnknownWorm(WormId::new(9)),
            },
        ]
    );
}

#[test]
fn resolution_walks_worms_in_ascending_id_order() {
    let mut world = battlefield(vec![commando(2, 1, 1), commando(1, 3, 1)]);
    let mut resolver = RoundResolver::new();
    let mut events = Vec::new();

    // Submission order must not matter: the higher id submits first but
    // the lower id still executes first.
    resolver.submit(Command::teleport_at(WormId::new(2), 2, 1));
    resolver.submit(Command::teleport_at(WormId::new(1), 2, 1));
    resolver.resolve(&mut world, &mut events);

    assert_eq!(
        events,
        vec![
            Event::WormTeleported {
                worm: WormId::new(1),
                from: Point::new(3, 1),
                to: Point::new(2, 1),
            },
            Event::CommandRejected {
                worm: WormId::new(2),
                reason: CommandError::Occupied {
                    target: Point::new(2, 1),
                },
            },
        ]
    );
}

#[test]
fn relocations_are_stamped_with_the_resolving_round() {
    let mut world = battlefield(vec![commando(1, 1, 1)]);
    let mut resolver = RoundResolver::new();

    let mut events = Vec::new();
    resolver.submit(Command::teleport_at(WormId::new(1), 2, 1));
    resolver.resolve(&mut world, &mut events);

    let worm = world.worm(WormId::new(1)).expect("worm still present");
    assert_eq!(worm.last_moved(), Some(0));

    let mut events = Vec::new();
    resolver.submit(Command::teleport_at(WormId::new(1), 2, 2));
    resolver.resolve(&mut world, &mut events);

    let worm = world.worm(WormId::new(1)).expect("worm still present");
    assert_eq!(worm.last_moved(), Some(1));
    assert_eq!(worm.previous_position(), Point::new(2, 1));
    assert_eq!(resolver.round(), 2);
}

#[test]
fn downed_worms_are_skipped_unless_commanded() {
    let downed = Worm::new(
        WormId::new(2),
        Health::new(0),
        Point::new(3, 3),
        WormProfile::COMMANDO,
    );
    let mut world = battlefield(vec![commando(1, 1, 1), downed]);
    let mut resolver = RoundResolver::new();

    let mut events = Vec::new();
    resolver.resolve(&mut world, &mut events);
    assert_eq!(
        events,
        vec![Event::WormRested {
            worm: WormId::new(1),
        }]
    );

    let mut events = Vec::new();
    resolver.submit(Command::dig_at(WormId::new(2), 3, 2));
    resolver.resolve(&mut world, &mut events);
    assert!(events.contains(&Event::CommandRejected {
        worm: WormId::new(2),
        reason: CommandError::WormDown(WormId::new(2)),
    }));
}

#[test]
fn resolved_worms_remain_seated_in_their_cells() {
    let mut world = battlefield(vec![commando(1, 1, 1), commando(2, 3, 3)]);
    let mut resolver = RoundResolver::new();
    let mut events = Vec::new();

    resolver.submit(Command::teleport_at(WormId::new(1), 2, 2));
    resolver.resolve(&mut world, &mut events);

    for snapshot in query::worm_view(&world).iter() {
        assert_eq!(
            query::occupant(&world, snapshot.position),
            Some(snapshot.id),
            "worm {} must occupy its recorded position",
            snapshot.id.get()
        );
    }
}

fn open_field(columns: u32, rows: u32) -> Vec<CellKind> {
    vec![CellKind::Air; (columns * rows) as usize]
}

fn commando(id: u32, x: u32, y: u32) -> Worm {
    Worm::new(
        WormId::new(id),
        Health::new(10),
        Point::new(x, y),
        WormProfile::COMMANDO,
    )
}

fn battlefield(worms: Vec<Worm>) -> World {
    World::new(
        vec![Player::new(PlayerId::new(1), worms)],
        5,
        5,
        open_field(5, 5),
    )
    .expect("battlefield should construct")
}
