use cavefall_core::{
    CellCoord, Command, CreatureId, Dice, Direction, EffectKind, EffectSource, Event, Race,
    RaceFlags, TerrainKind, MAX_BLAST_CELLS,
};
use cavefall_system_projection::{resolve_target, Cast, Projector};
use cavefall_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn arena(rows: u32, columns: u32, player: CellCoord) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureGrid { rows, columns }, &mut events);
    world::apply(&mut world, Command::SetDepth { depth: 5 }, &mut events);
    world::apply(
        &mut world,
        Command::PlacePlayer {
            cell: player,
            health: 50,
            protection: Dice::new(0, 0),
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, cell: CellCoord, health: i32) -> CreatureId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnCreature {
            race: Race {
                name: "goblin".to_owned(),
                glyph: 'g',
                protection: Dice::new(0, 0),
                will: 0,
                flags: RaceFlags::empty(),
            },
            cell,
            health,
            alertness: 0,
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

fn set_terrain(world: &mut World, cell: CellCoord, terrain: TerrainKind) {
    let mut events = Vec::new();
    world::apply(world, Command::SetTerrain { cell, terrain }, &mut events);
}

fn health(world: &World, id: CreatureId) -> Option<i32> {
    query::creature(world, id).map(|creature| creature.health)
}

fn drawn_cells(events: &[Event]) -> Vec<CellCoord> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::BlastDrawn { cells } => Some(cells.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

fn hurt(count: u32) -> Cast {
    Cast::new(EffectKind::Hurt, Dice::new(count, 1), 0)
}

#[test]
fn bolt_stops_at_the_first_creature() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let near = spawn(&mut world, CellCoord::new(5, 6), 20);
    let far = spawn(&mut world, CellCoord::new(5, 9), 20);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    let noticed =
        Projector::new().fire_bolt(&mut world, hurt(5), Direction::East, &mut rng, &mut events);

    assert!(noticed, "a visible creature was hit");
    assert_eq!(health(&world, near), Some(15));
    assert_eq!(health(&world, far), Some(20), "bolt passed through its first victim");
}

#[test]
fn beam_hits_every_creature_on_its_line() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let near = spawn(&mut world, CellCoord::new(5, 6), 20);
    let far = spawn(&mut world, CellCoord::new(5, 9), 20);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut events = Vec::new();

    let _ = Projector::new().fire_beam(&mut world, hurt(5), Direction::East, &mut rng, &mut events);

    assert_eq!(health(&world, near), Some(15));
    assert_eq!(health(&world, far), Some(15));
}

#[test]
fn beam_is_limited_by_walls() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    set_terrain(&mut world, CellCoord::new(5, 7), TerrainKind::Wall);
    let hidden = spawn(&mut world, CellCoord::new(5, 9), 20);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut events = Vec::new();

    let _ = Projector::new().fire_beam(&mut world, hurt(5), Direction::East, &mut rng, &mut events);

    assert_eq!(health(&world, hidden), Some(20));
    assert!(!drawn_cells(&events).contains(&CellCoord::new(5, 8)));
}

#[test]
fn unconfirmed_ball_explodes_at_the_first_creature() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let blocker = spawn(&mut world, CellCoord::new(5, 6), 40);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetTarget {
            target: Some(CellCoord::new(5, 14)),
        },
        &mut events,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let _ = Projector::new().fire_ball(
        &mut world,
        hurt(6),
        Direction::Target,
        1,
        false,
        &mut rng,
        &mut events,
    );

    assert_eq!(health(&world, blocker), Some(34));
}

#[test]
fn confirmed_ball_flies_past_creatures() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let bystander = spawn(&mut world, CellCoord::new(5, 6), 40);
    let victim = spawn(&mut world, CellCoord::new(5, 14), 40);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetTarget {
            target: Some(CellCoord::new(5, 14)),
        },
        &mut events,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let _ = Projector::new().fire_ball(
        &mut world,
        hurt(6),
        Direction::Target,
        1,
        true,
        &mut rng,
        &mut events,
    );

    assert_eq!(health(&world, bystander), Some(40));
    assert_eq!(health(&world, victim), Some(34));
}

#[test]
fn ball_damage_falls_off_with_distance() {
    let mut world = arena(21, 21, CellCoord::new(2, 2));
    let center = spawn(&mut world, CellCoord::new(10, 10), 40);
    let edge = spawn(&mut world, CellCoord::new(10, 12), 40);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut events = Vec::new();

    let _ = Projector::new().explosion(
        &mut world,
        EffectSource::Environment,
        CellCoord::new(10, 10),
        3,
        hurt(6),
        &mut rng,
        &mut events,
    );

    assert_eq!(health(&world, center), Some(34));
    assert_eq!(health(&world, edge), Some(38), "two rings out keeps 6 - 4 dice");
}

#[test]
fn zero_degree_arc_matches_a_beam() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let projector = Projector::new();

    let mut world = arena(30, 30, CellCoord::new(15, 3));
    set_terrain(&mut world, CellCoord::new(11, 20), TerrainKind::Wall);
    let mut arc_events = Vec::new();
    let _ = projector.fire_arc(
        &mut world,
        hurt(3),
        Direction::NorthEast,
        0,
        0,
        &mut rng,
        &mut arc_events,
    );

    let mut world = arena(30, 30, CellCoord::new(15, 3));
    set_terrain(&mut world, CellCoord::new(11, 20), TerrainKind::Wall);
    let mut beam_events = Vec::new();
    let _ = projector.fire_beam(
        &mut world,
        hurt(3),
        Direction::NorthEast,
        &mut rng,
        &mut beam_events,
    );

    let arc = drawn_cells(&arc_events);
    assert!(!arc.is_empty());
    assert_eq!(arc, drawn_cells(&beam_events));
}

#[test]
fn full_circle_arc_matches_an_unconfirmed_ball() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let projector = Projector::new();

    let mut world = arena(30, 30, CellCoord::new(15, 15));
    let _ = spawn(&mut world, CellCoord::new(15, 20), 100);
    let mut arc_events = Vec::new();
    let _ = projector.fire_arc(
        &mut world,
        hurt(2),
        Direction::East,
        3,
        360,
        &mut rng,
        &mut arc_events,
    );

    let mut world = arena(30, 30, CellCoord::new(15, 15));
    let _ = spawn(&mut world, CellCoord::new(15, 20), 100);
    let mut ball_events = Vec::new();
    let _ = projector.fire_ball(
        &mut world,
        hurt(2),
        Direction::East,
        3,
        false,
        &mut rng,
        &mut ball_events,
    );

    let arc = drawn_cells(&arc_events);
    assert!(arc.contains(&CellCoord::new(15, 20)), "ball stopped at the creature");
    assert_eq!(arc, drawn_cells(&ball_events));
}

#[test]
fn narrow_arc_spares_creatures_behind_the_caster() {
    let mut world = arena(30, 30, CellCoord::new(15, 15));
    let ahead = spawn(&mut world, CellCoord::new(15, 18), 40);
    let behind = spawn(&mut world, CellCoord::new(15, 12), 40);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut events = Vec::new();

    let _ = Projector::new().fire_arc(
        &mut world,
        Cast::new(EffectKind::Hurt, Dice::new(8, 1), 0),
        Direction::East,
        5,
        60,
        &mut rng,
        &mut events,
    );

    assert!(health(&world, ahead).map_or(false, |health| health < 40));
    assert_eq!(health(&world, behind), Some(40));
}

#[test]
fn visible_creatures_are_affected_and_hidden_ones_are_not() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    for row in 0..11 {
        set_terrain(&mut world, CellCoord::new(row, 10), TerrainKind::Wall);
    }
    let mut events = Vec::new();
    world::apply(&mut world, Command::RefreshView, &mut events);
    let seen = spawn(&mut world, CellCoord::new(8, 6), 30);
    let unseen = spawn(&mut world, CellCoord::new(5, 14), 30);
    let mut rng = ChaCha8Rng::seed_from_u64(10);

    let noticed =
        Projector::new().affect_visible_creatures(&mut world, hurt(4), &mut rng, &mut events);

    assert!(noticed);
    assert_eq!(health(&world, seen), Some(26));
    assert_eq!(health(&world, unseen), Some(30));
}

#[test]
fn visible_pits_are_filled() {
    let mut world = arena(11, 11, CellCoord::new(5, 5));
    let pit = CellCoord::new(5, 8);
    set_terrain(&mut world, pit, TerrainKind::PitTrap);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut events = Vec::new();

    let noticed = Projector::new().destroy_traps(&mut world, &mut rng, &mut events);

    assert!(noticed);
    assert_eq!(query::terrain(&world, pit), Some(TerrainKind::Floor));
}

#[test]
fn shatter_line_crumbles_the_first_wall() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let wall = CellCoord::new(5, 6);
    set_terrain(&mut world, wall, TerrainKind::Quartz);
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut events = Vec::new();

    let _ = Projector::new().shatter_line(&mut world, 100, Direction::East, &mut rng, &mut events);

    assert_eq!(query::terrain(&world, wall), Some(TerrainKind::Rubble));
    assert_eq!(
        query::terrain(&world, CellCoord::new(5, 7)),
        Some(TerrainKind::Floor),
        "beam stopped at the wall it hit"
    );
}

#[test]
fn explosion_hurts_the_player_once() {
    let player = CellCoord::new(5, 5);
    let mut world = arena(11, 11, player);
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let mut events = Vec::new();

    let _ = Projector::new().explosion(
        &mut world,
        EffectSource::Environment,
        player,
        2,
        hurt(4),
        &mut rng,
        &mut events,
    );

    let hits = events
        .iter()
        .filter(|event| matches!(event, Event::PlayerDamaged { .. }))
        .count();
    assert_eq!(hits, 1);
    assert_eq!(query::player(&world).map(|player| player.health), Some(46));
}

#[test]
fn player_bolts_do_not_hurt_the_player() {
    let player = CellCoord::new(5, 5);
    let mut world = arena(11, 11, player);
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let mut events = Vec::new();

    let _ = Projector::new().fire_bolt(&mut world, hurt(4), Direction::Up, &mut rng, &mut events);

    assert_eq!(query::player(&world).map(|player| player.health), Some(50));
}

#[test]
fn vertical_and_missing_targets_resolve_to_the_origin() {
    let origin = CellCoord::new(5, 5);
    let world = arena(11, 11, origin);
    assert_eq!(resolve_target(&world, origin, Direction::Up), origin);
    assert_eq!(resolve_target(&world, origin, Direction::Down), origin);
    assert_eq!(resolve_target(&world, origin, Direction::Target), origin);
}

#[test]
fn compass_aim_stays_on_the_grid_along_the_same_line() {
    let origin = CellCoord::new(5, 5);
    let world = arena(11, 40, origin);
    assert_eq!(
        resolve_target(&world, origin, Direction::East),
        CellCoord::new(5, 25)
    );
    assert_eq!(
        resolve_target(&world, origin, Direction::SouthEast),
        CellCoord::new(10, 10)
    );
}

#[test]
fn wide_arcs_keep_the_cells_beside_the_caster() {
    let mut world = arena(60, 60, CellCoord::new(30, 30));
    let ahead = spawn(&mut world, CellCoord::new(32, 30), 40);
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let mut events = Vec::new();

    let _ = Projector::new().fire_arc(
        &mut world,
        hurt(10),
        Direction::South,
        0,
        300,
        &mut rng,
        &mut events,
    );

    assert!(drawn_cells(&events).len() <= MAX_BLAST_CELLS);
    assert_eq!(health(&world, ahead), Some(34), "two rings out the arc deals 6 of 10");
}

#[test]
fn arcs_from_the_grid_edge_keep_their_heading() {
    let mut world = arena(10, 20, CellCoord::new(0, 10));
    let beside = spawn(&mut world, CellCoord::new(0, 13), 40);
    let below = spawn(&mut world, CellCoord::new(3, 10), 40);
    let mut rng = ChaCha8Rng::seed_from_u64(16);
    let mut events = Vec::new();

    let noticed = Projector::new().fire_arc(
        &mut world,
        hurt(8),
        Direction::North,
        5,
        60,
        &mut rng,
        &mut events,
    );

    assert!(!noticed);
    assert!(drawn_cells(&events).is_empty(), "nothing lies north of the top row");
    assert_eq!(health(&world, beside), Some(40));
    assert_eq!(health(&world, below), Some(40));
}

#[test]
fn wall_shattering_balls_reach_the_wall_they_hit() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let wall = CellCoord::new(5, 8);
    set_terrain(&mut world, wall, TerrainKind::Wall);
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut events = Vec::new();

    let _ = Projector::new().fire_ball(
        &mut world,
        Cast::new(EffectKind::KillWall, Dice::default(), 100),
        Direction::East,
        1,
        true,
        &mut rng,
        &mut events,
    );

    assert_eq!(query::terrain(&world, wall), Some(TerrainKind::Rubble));
}

#[test]
fn destroy_door_breaks_the_door_in_its_path() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let door = CellCoord::new(5, 6);
    set_terrain(&mut world, door, TerrainKind::ClosedDoor { lock: 0 });
    let mut rng = ChaCha8Rng::seed_from_u64(18);
    let mut events = Vec::new();

    let _ = Projector::new().destroy_door(&mut world, 100, Direction::East, &mut rng, &mut events);

    assert_eq!(query::terrain(&world, door), Some(TerrainKind::BrokenDoor));
}

#[test]
fn disarm_trap_fills_every_pit_on_its_line() {
    let mut world = arena(11, 30, CellCoord::new(5, 2));
    let near = CellCoord::new(5, 5);
    let far = CellCoord::new(5, 9);
    set_terrain(&mut world, near, TerrainKind::PitTrap);
    set_terrain(&mut world, far, TerrainKind::PitTrap);
    let mut rng = ChaCha8Rng::seed_from_u64(19);
    let mut events = Vec::new();

    let _ = Projector::new().disarm_trap(&mut world, Direction::East, &mut rng, &mut events);

    assert_eq!(query::terrain(&world, near), Some(TerrainKind::Floor));
    assert_eq!(query::terrain(&world, far), Some(TerrainKind::Floor));
}
