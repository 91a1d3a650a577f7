use bevy_ecs::system::RunSystemOnce;
use pretty_assertions::assert_eq;
use river_sweep::{
    config::{SkylineConfig, SpecialBuilding, ViewportConfig},
    events::StreamControl,
    systems::{
        skyline::{skyline_control_system, skyline_stream_system, UnitKind},
        Chunk, Landmark, SkylineStream, Viewport,
    },
};
use speculoos::prelude::*;

mod common;

fn viewport_at(center_y: f32) -> Viewport {
    let mut viewport = Viewport::new(&ViewportConfig::default());
    viewport.center_y = center_y;
    viewport
}

fn skyline_world(config: &SkylineConfig) -> bevy_ecs::world::World {
    let mut world = common::create_test_world();
    world.insert_resource(SkylineStream::new(config));
    world
}

fn run_stream(world: &mut bevy_ecs::world::World) {
    world
        .run_system_once(skyline_stream_system)
        .expect("System should run successfully");
}

#[test]
fn test_sequence_spawns_as_one_stacked_unit() {
    let config = SkylineConfig::default();
    let mut stream = SkylineStream::new(&config);
    // Camera top plus lookahead just reaches the configured start
    let viewport = viewport_at(30.0);

    let unit = stream.next_unit(&viewport).expect("a unit should be due");

    assert_eq!(unit.kind, UnitKind::Sequence);
    assert_that(&unit.bottom_y).is_equal_to(config.start_y);
    assert_that(&unit.pieces.len()).is_equal_to(config.sequence.len());
    for (i, piece) in unit.pieces.iter().enumerate() {
        let expected = config.start_y + i as f32 * config.chunk_height + config.chunk_height / 2.0;
        assert_that(&piece.center_y).is_equal_to(expected);
        assert_that(&piece.prefab).is_equal_to(&config.sequence[i]);
    }
    assert_that(&stream.next_unit_y()).is_equal_to(config.start_y + stream.sequence_height() + config.gap);
}

#[test]
fn test_nothing_spawns_beyond_lookahead() {
    let mut stream = SkylineStream::new(&SkylineConfig::default());
    let viewport = viewport_at(30.0);

    assert_that(&stream.next_unit(&viewport).is_some()).is_true();
    // The cursor is now far above the camera
    assert_that(&stream.next_unit(&viewport)).is_none();
}

#[test]
fn test_special_preempts_sequence() {
    let config = SkylineConfig::default();
    let mut stream = SkylineStream::new(&config);

    // First unit is a regular sequence: the first special's trigger is not reached yet
    let first = stream.next_unit(&viewport_at(30.0)).expect("a unit should be due");
    assert_eq!(first.kind, UnitKind::Sequence);
    let cursor = stream.next_unit_y();

    // Camera reached the trigger and the cursor is within the lookahead window
    let special = stream.next_unit(&viewport_at(cursor)).expect("a unit should be due");
    assert_eq!(
        special.kind,
        UnitKind::Special {
            name: "Merchandise Mart".into()
        }
    );
    assert_that(&special.bottom_y).is_equal_to(cursor);
    assert_that(&special.pieces.len()).is_equal_to(1);
    assert_that(&stream.next_unit_y()).is_equal_to(cursor + 45.0 + config.gap);
}

#[test]
fn test_specials_spawn_once_in_trigger_order() {
    let config = SkylineConfig {
        specials: vec![
            SpecialBuilding {
                name: "Late".into(),
                prefab: "skyline/late".into(),
                height: 30.0,
                trigger_y: 900.0,
            },
            SpecialBuilding {
                name: "Early".into(),
                prefab: "skyline/early".into(),
                height: 40.0,
                trigger_y: 200.0,
            },
            SpecialBuilding {
                name: "Middle".into(),
                prefab: "skyline/middle".into(),
                height: 50.0,
                trigger_y: 550.0,
            },
        ],
        ..SkylineConfig::default()
    };
    let mut world = skyline_world(&config);

    let mut spawned: Vec<String> = Vec::new();
    for _ in 0..1500 {
        world.resource_mut::<Viewport>().center_y += 1.0;
        run_stream(&mut world);

        let flagged: Vec<String> = world
            .resource::<SkylineStream>()
            .specials()
            .iter()
            .filter(|entry| entry.spawned)
            .map(|entry| entry.building.name.clone())
            .collect();
        for name in flagged {
            if !spawned.contains(&name) {
                spawned.push(name);
            }
        }
    }

    assert_eq!(spawned, vec!["Early".to_string(), "Middle".to_string(), "Late".to_string()]);

    // Landmarks are left behind and despawned, but never duplicated while alive
    let mut landmarks: Vec<String> = world
        .query::<&Landmark>()
        .iter(&world)
        .map(|landmark| landmark.0.clone())
        .collect();
    landmarks.dedup();
    assert_that(&landmarks.len()).is_less_than_or_equal_to(3);
}

#[test]
fn test_chunks_behind_camera_are_despawned() {
    let config = SkylineConfig::default();
    let mut world = skyline_world(&config);

    for _ in 0..800 {
        world.resource_mut::<Viewport>().center_y += 1.0;
        run_stream(&mut world);
    }

    let viewport = world.resource::<Viewport>().clone();
    for kind in [Chunk::Skyline, Chunk::Special] {
        for (_, top) in common::chunk_spans(&mut world, kind) {
            assert_that(&top).is_greater_than_or_equal_to(viewport.bottom() - config.trail_distance);
        }
    }
}

#[test]
fn test_halt_and_resume() {
    let config = SkylineConfig::default();
    let mut world = skyline_world(&config);
    // Stops just after a sequence unit has been placed in view
    for _ in 0..340 {
        world.resource_mut::<Viewport>().center_y += 1.0;
        run_stream(&mut world);
    }
    assert_that(&world.resource::<SkylineStream>().active_chunks().is_empty()).is_false();

    world.send_event(StreamControl::HaltSkyline);
    world
        .run_system_once(skyline_control_system)
        .expect("System should run successfully");
    let cursor = world.resource::<SkylineStream>().next_unit_y();
    for _ in 0..300 {
        world.resource_mut::<Viewport>().center_y += 1.0;
        run_stream(&mut world);
    }
    assert_that(&world.resource::<SkylineStream>().next_unit_y()).is_equal_to(cursor);

    world.send_event(StreamControl::ResumeSkyline);
    world
        .run_system_once(skyline_control_system)
        .expect("System should run successfully");

    let stream = world.resource::<SkylineStream>();
    assert_that(&stream.is_halted()).is_false();
    assert_that(&stream.next_unit_y()).is_equal_to(config.start_y);
    assert_that(&stream.active_chunks().is_empty()).is_true();
    assert_that(&stream.specials().iter().any(|entry| entry.spawned)).is_false();
    assert_that(&common::chunk_spans(&mut world, Chunk::Skyline)).is_empty();
}

#[test]
fn test_empty_configuration_disables_stream() {
    let config = SkylineConfig {
        sequence: vec![],
        specials: vec![],
        ..SkylineConfig::default()
    };
    let mut stream = SkylineStream::new(&config);

    assert_that(&stream.disabled).is_true();
    assert_that(&stream.next_unit(&viewport_at(1000.0))).is_none();
}
