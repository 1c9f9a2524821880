use cavefall_core::{
    CellCoord, CellFlags, Command, CreatureId, Dice, Event, Race, RaceFlags, TerrainKind,
    ALERTNESS_ALERT, ALERTNESS_MIN, ALERTNESS_VERY_ALERT,
};
use cavefall_system_illumination::{darken_area, darken_room, light_area, light_room};
use cavefall_system_projection::Projector;
use cavefall_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ROOM_TOP: u32 = 2;
const ROOM_BOTTOM: u32 = 6;
const ROOM_LEFT: u32 = 2;
const ROOM_RIGHT: u32 = 10;

// A walled room whose walls also belong to the room, inside open corridor floor.
fn walled_room() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureGrid { rows: 9, columns: 13 }, &mut events);
    world::apply(&mut world, Command::SetDepth { depth: 3 }, &mut events);
    for row in ROOM_TOP..=ROOM_BOTTOM {
        for column in ROOM_LEFT..=ROOM_RIGHT {
            let cell = CellCoord::new(row, column);
            let edge = row == ROOM_TOP
                || row == ROOM_BOTTOM
                || column == ROOM_LEFT
                || column == ROOM_RIGHT;
            if edge {
                world::apply(
                    &mut world,
                    Command::SetTerrain {
                        cell,
                        terrain: TerrainKind::Wall,
                    },
                    &mut events,
                );
            }
            world::apply(
                &mut world,
                Command::SetCellFlags {
                    cell,
                    flags: CellFlags::ROOM,
                    enabled: true,
                },
                &mut events,
            );
        }
    }
    world
}

fn in_room(cell: CellCoord) -> bool {
    (ROOM_TOP..=ROOM_BOTTOM).contains(&cell.row())
        && (ROOM_LEFT..=ROOM_RIGHT).contains(&cell.column())
}

fn every_cell(world: &World) -> Vec<CellCoord> {
    let (rows, columns) = query::dimensions(world);
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(row, column)))
        .collect()
}

fn spawn(world: &mut World, cell: CellCoord, alertness: i32, flags: RaceFlags) -> CreatureId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnCreature {
            race: Race {
                name: "wolf".to_owned(),
                glyph: 'C',
                protection: Dice::new(1, 4),
                will: 0,
                flags,
            },
            cell,
            health: 15,
            alertness,
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::CreatureSpawned { creature, .. } => Some(*creature),
            _ => None,
        })
        .expect("creature spawned")
}

fn alertness(world: &World, id: CreatureId) -> i32 {
    query::creature(world, id)
        .map(|creature| creature.alertness)
        .expect("creature alive")
}

#[test]
fn lighting_a_room_lights_its_floor_and_walls_only() {
    let mut world = walled_room();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    light_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);

    for cell in every_cell(&world) {
        let lit = query::flags(&world, cell).contains(CellFlags::LIT);
        assert_eq!(lit, in_room(cell), "unexpected light state at {cell:?}");
        assert!(!query::flags(&world, cell).contains(CellFlags::MARKED));
    }
    assert!(events.contains(&Event::ViewUpdateRequested));
}

#[test]
fn lighting_outside_any_room_changes_nothing() {
    let mut world = walled_room();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut events = Vec::new();

    light_room(&mut world, CellCoord::new(0, 0), &mut rng, &mut events);
    light_room(&mut world, CellCoord::new(40, 40), &mut rng, &mut events);

    assert!(events.is_empty());
}

#[test]
fn darkening_forgets_floor_but_not_walls() {
    let mut world = walled_room();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut events = Vec::new();
    for cell in every_cell(&world).into_iter().filter(|cell| in_room(*cell)) {
        world::apply(
            &mut world,
            Command::SetCellFlags {
                cell,
                flags: CellFlags::SEEN,
                enabled: true,
            },
            &mut events,
        );
    }
    light_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);

    darken_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);

    let floor = query::flags(&world, CellCoord::new(4, 6));
    assert!(!floor.contains(CellFlags::LIT));
    assert!(!floor.contains(CellFlags::SEEN));
    let wall = query::flags(&world, CellCoord::new(ROOM_TOP, 6));
    assert!(!wall.contains(CellFlags::LIT));
    assert!(wall.contains(CellFlags::SEEN), "walls stay remembered");
}

#[test]
fn alerting_converges_to_alert_and_never_decreases() {
    let mut world = walled_room();
    let sleeper = spawn(&mut world, CellCoord::new(3, 4), ALERTNESS_MIN, RaceFlags::MINDLESS);
    let watcher = spawn(&mut world, CellCoord::new(5, 8), ALERTNESS_VERY_ALERT, RaceFlags::SMART);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let mut previous = alertness(&world, sleeper);
    for round in 0..40 {
        let mut events = Vec::new();
        if round % 2 == 0 {
            light_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);
        } else {
            darken_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);
        }
        let current = alertness(&world, sleeper);
        assert!(current >= previous, "alertness fell from {previous} to {current}");
        assert!(current <= ALERTNESS_ALERT);
        assert_eq!(alertness(&world, watcher), ALERTNESS_VERY_ALERT);
        previous = current;
    }
    assert_eq!(previous, ALERTNESS_ALERT);
}

#[test]
fn light_area_announces_itself_and_lights_the_players_room() {
    let mut world = walled_room();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlacePlayer {
            cell: CellCoord::new(4, 5),
            health: 30,
            protection: Dice::new(0, 0),
        },
        &mut events,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();

    assert!(light_area(&Projector::new(), &mut world, Dice::new(2, 8), 2, &mut rng, &mut events));

    assert!(events.contains(&Event::Message {
        text: "You are surrounded by a white light.".to_owned()
    }));
    assert!(query::flags(&world, CellCoord::new(5, 9)).contains(CellFlags::LIT));
}

#[test]
fn darken_area_unlights_the_players_surroundings() {
    let mut world = walled_room();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlacePlayer {
            cell: CellCoord::new(4, 5),
            health: 30,
            protection: Dice::new(0, 0),
        },
        &mut events,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    light_room(&mut world, CellCoord::new(4, 5), &mut rng, &mut events);

    let mut events = Vec::new();
    assert!(darken_area(&Projector::new(), &mut world, Dice::new(1, 4), 2, &mut rng, &mut events));

    assert!(!query::flags(&world, CellCoord::new(4, 6)).contains(CellFlags::LIT));
    assert!(!query::flags(&world, CellCoord::new(3, 9)).contains(CellFlags::LIT));
}

#[test]
fn mindless_creatures_stir_at_half_strength_and_smart_ones_at_double() {
    let stirred = |flags: RaceFlags| {
        let mut world = walled_room();
        let id = spawn(&mut world, CellCoord::new(3, 4), ALERTNESS_MIN, flags);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut events = Vec::new();
        light_room(&mut world, CellCoord::new(4, 6), &mut rng, &mut events);
        alertness(&world, id)
    };

    let gain = stirred(RaceFlags::empty()) - ALERTNESS_MIN;
    assert!(gain >= 2, "2d10 rolled {gain}");
    assert_eq!(stirred(RaceFlags::MINDLESS), ALERTNESS_MIN + gain / 2);
    assert_eq!(
        stirred(RaceFlags::SMART),
        (ALERTNESS_MIN + gain * 2).min(ALERTNESS_ALERT)
    );
}
