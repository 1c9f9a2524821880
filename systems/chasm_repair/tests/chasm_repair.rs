use cavefall_core::{CellCoord, CellFlags, Command, Dice, Event, TerrainKind};
use cavefall_system_chasm_repair::{close_chasm, close_chasms};
use cavefall_world::{self as world, marking::MarkedCells, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// A 3x3 chasm block centred on (4, 4) in open floor.
fn chasm_block(with_player: bool) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureGrid { rows: 9, columns: 9 }, &mut events);
    world::apply(&mut world, Command::SetDepth { depth: 4 }, &mut events);
    for row in 3..=5 {
        for column in 3..=5 {
            world::apply(
                &mut world,
                Command::SetTerrain {
                    cell: CellCoord::new(row, column),
                    terrain: TerrainKind::Chasm,
                },
                &mut events,
            );
        }
    }
    if with_player {
        world::apply(
            &mut world,
            Command::PlacePlayer {
                cell: CellCoord::new(4, 1),
                health: 20,
                protection: Dice::new(0, 0),
            },
            &mut events,
        );
    }
    world
}

fn chasms(world: &World) -> Vec<CellCoord> {
    let (rows, columns) = query::dimensions(world);
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(row, column)))
        .filter(|cell| query::terrain(world, *cell) == Some(TerrainKind::Chasm))
        .collect()
}

#[test]
fn enclosed_chasms_refuse_any_power() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureGrid { rows: 3, columns: 3 }, &mut events);
    for cell in CellCoord::new(1, 1).neighbors() {
        world::apply(
            &mut world,
            Command::SetTerrain {
                cell,
                terrain: TerrainKind::Chasm,
            },
            &mut events,
        );
    }
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    for power in [-50, 0, 10, 100, 10_000] {
        let mut marked = MarkedCells::new();
        assert!(!close_chasm(&mut world, CellCoord::new(1, 1), power, &mut rng, &mut marked));
        assert!(marked.is_empty());
    }
    assert!(!query::flags(&world, CellCoord::new(1, 1)).contains(CellFlags::MARKED));
}

#[test]
fn a_successful_attempt_only_marks_the_cell() {
    let mut world = chasm_block(false);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut marked = MarkedCells::new();

    assert!(close_chasm(&mut world, CellCoord::new(3, 3), 1000, &mut rng, &mut marked));

    assert!(marked.contains(CellCoord::new(3, 3)));
    assert_eq!(query::terrain(&world, CellCoord::new(3, 3)), Some(TerrainKind::Chasm));
    let _ = world::marking::clear_marks(&mut world, marked);
}

#[test]
fn closing_a_block_keeps_its_enclosed_centre() {
    let mut world = chasm_block(true);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut events = Vec::new();

    assert!(close_chasms(&mut world, 1000, &mut rng, &mut events));

    assert_eq!(chasms(&world), vec![CellCoord::new(4, 4)]);
    assert!(events.contains(&Event::ViewUpdateRequested));
    let (rows, columns) = query::dimensions(&world);
    for row in 0..rows {
        for column in 0..columns {
            assert!(!query::flags(&world, CellCoord::new(row, column)).contains(CellFlags::MARKED));
        }
    }
}

#[test]
fn weak_attempts_close_nothing() {
    let mut world = chasm_block(true);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut events = Vec::new();

    assert!(!close_chasms(&mut world, -1000, &mut rng, &mut events));

    assert_eq!(chasms(&world).len(), 9);
    assert!(events.is_empty());
}

#[test]
fn unseen_chasms_stay_open() {
    let mut world = chasm_block(false);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();

    assert!(!close_chasms(&mut world, 1000, &mut rng, &mut events));
    assert_eq!(chasms(&world).len(), 9);
}
