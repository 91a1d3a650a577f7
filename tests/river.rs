use bevy_ecs::system::RunSystemOnce;
use pretty_assertions::assert_eq;
use river_sweep::{
    config::RiverConfig,
    events::StreamControl,
    systems::{
        river::{river_control_system, river_stream_system},
        Chunk, RiverStream, Viewport,
    },
};
use speculoos::prelude::*;

mod common;

fn river_world(config: &RiverConfig) -> bevy_ecs::world::World {
    let mut world = common::create_test_world();
    world.insert_resource(RiverStream::new(config));
    world
}

fn run_stream(world: &mut bevy_ecs::world::World) {
    world
        .run_system_once(river_stream_system)
        .expect("System should run successfully");
}

/// Asserts the river has no holes and reaches from the camera bottom to the lookahead line.
fn assert_covered(world: &mut bevy_ecs::world::World, lookahead: f32) {
    let viewport = world.resource::<Viewport>().clone();
    let spans = common::chunk_spans(world, Chunk::River);
    assert_that(&spans.is_empty()).is_false();

    for pair in spans.windows(2) {
        assert_that(&(pair[1].0 - pair[0].1).abs()).is_less_than(1e-3);
    }

    let (first_bottom, _) = spans[0];
    let (_, last_top) = spans[spans.len() - 1];
    assert_that(&first_bottom).is_less_than_or_equal_to(viewport.bottom());
    assert_that(&last_top).is_greater_than_or_equal_to(viewport.top() + lookahead);
}

#[test]
fn test_initial_fill_covers_viewport_and_lookahead() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);

    run_stream(&mut world);

    assert_covered(&mut world, config.lookahead);
    let stream = world.resource::<RiverStream>();
    let viewport = world.resource::<Viewport>();
    assert_that(&stream.origin_y()).is_equal_to(viewport.bottom());
}

#[test]
fn test_large_jump_is_backfilled_without_gaps() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);
    run_stream(&mut world);

    // Several chunk heights in a single frame
    world.resource_mut::<Viewport>().center_y += config.chunk_height * 7.5;
    run_stream(&mut world);

    assert_covered(&mut world, config.lookahead);
}

#[test]
fn test_coverage_holds_while_scrolling() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);

    for step in 0..200 {
        world.resource_mut::<Viewport>().center_y += 0.5 + (step % 7) as f32 * 1.3;
        run_stream(&mut world);
        assert_covered(&mut world, config.lookahead);
    }
}

#[test]
fn test_chunks_survive_until_past_trail_distance() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);
    run_stream(&mut world);

    for _ in 0..100 {
        let before = common::chunk_spans(&mut world, Chunk::River);
        world.resource_mut::<Viewport>().center_y += 3.3;
        run_stream(&mut world);

        let despawn_line = world.resource::<Viewport>().bottom() - config.trail_distance;
        let after = common::chunk_spans(&mut world, Chunk::River);

        for span in &before {
            let still_alive = after.iter().any(|other| (other.0 - span.0).abs() < 1e-3);
            if span.1 >= despawn_line {
                assert_that(&still_alive).is_true();
            } else {
                assert_that(&still_alive).is_false();
            }
        }
    }
}

#[test]
fn test_tracked_chunks_match_world() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);

    for _ in 0..50 {
        world.resource_mut::<Viewport>().center_y += 4.0;
        run_stream(&mut world);
    }

    let spans = common::chunk_spans(&mut world, Chunk::River);
    let tracked = world.resource::<RiverStream>().active_chunks().len();
    assert_eq!(spans.len(), tracked);
}

#[test]
fn test_reset_river_restarts_at_new_origin() {
    let config = RiverConfig::default();
    let mut world = river_world(&config);
    for _ in 0..20 {
        world.resource_mut::<Viewport>().center_y += 10.0;
        run_stream(&mut world);
    }

    world.resource_mut::<Viewport>().reset();
    let new_y = world.resource::<Viewport>().bottom();
    world.send_event(StreamControl::ResetRiver(new_y));
    world
        .run_system_once(river_control_system)
        .expect("System should run successfully");

    let spans = common::chunk_spans(&mut world, Chunk::River);
    assert_that(&spans[0].0).is_equal_to(new_y);
    assert_that(&world.resource::<RiverStream>().origin_y()).is_equal_to(new_y);
    assert_covered(&mut world, config.lookahead);
}

#[test]
fn test_missing_prefab_disables_stream() {
    let config = RiverConfig {
        prefabs: vec![],
        ..RiverConfig::default()
    };
    let mut world = river_world(&config);

    run_stream(&mut world);

    assert_that(&world.resource::<RiverStream>().disabled).is_true();
    assert_that(&common::chunk_spans(&mut world, Chunk::River)).is_empty();
}

#[test]
fn test_non_positive_height_disables_stream() {
    let config = RiverConfig {
        chunk_height: 0.0,
        ..RiverConfig::default()
    };
    let stream = RiverStream::new(&config);
    assert_that(&stream.disabled).is_true();
}
