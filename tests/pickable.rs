use bevy_ecs::{event::Events, system::RunSystemOnce, world::World};
use glam::Vec2;
use river_sweep::{
    config::DirectorConfig,
    events::{GameCommand, GameEvent, PickupEvent, StreamControl},
    systems::{
        pickable::{clear_items_system, click_system, hit_test, KayakInfo, PickableBundle},
        Bounds, ClickCooldown, Clock, Director, FloatingText, Phase, Pickable, Position, Renderable, ScoreLedger,
        TimeScale,
    },
};
use speculoos::prelude::*;

mod common;

fn spawn_item(world: &mut World, pickable: Pickable, at: Vec2) -> bevy_ecs::entity::Entity {
    world
        .spawn(PickableBundle {
            pickable,
            position: Position(at),
            bounds: Bounds::new(2.0, 2.0),
            sprite: Renderable {
                sprite: "test".into(),
                layer: 2,
            },
        })
        .id()
}

fn click(world: &mut World, at: Vec2) {
    world.send_event(GameEvent::Click(at));
}

fn run_clicks(world: &mut World) {
    world
        .run_system_once(click_system)
        .expect("System should run successfully");
}

fn pickable_count(world: &mut World) -> usize {
    world.query::<&Pickable>().iter(world).count()
}

fn director_after(commands: &[GameCommand]) -> Director {
    let mut director = Director::new(&DirectorConfig::default(), -10.0);
    for command in commands {
        director.handle_command(*command);
    }
    director
}

fn kayak_world(director: Director) -> (World, bevy_ecs::entity::Entity) {
    let mut world = common::create_test_world();
    world.insert_resource(ClickCooldown::new(0.0));
    world.insert_resource(director);
    let kayak = spawn_item(&mut world, Pickable::Kayak(KayakInfo::new("Give kayaks room")), Vec2::ZERO);
    (world, kayak)
}

fn popups(world: &mut World) -> Vec<(String, Vec2)> {
    world
        .query::<(&FloatingText, &Position)>()
        .iter(world)
        .map(|(popup, position)| (popup.text.clone(), position.0))
        .collect()
}

fn pickups(world: &World) -> Vec<PickupEvent> {
    world
        .resource::<Events<PickupEvent>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

#[test]
fn test_double_click_scores_once() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::ZERO);

    click(&mut world, Vec2::ZERO);
    click(&mut world, Vec2::ZERO);
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(1);
    assert_that(&pickable_count(&mut world)).is_equal_to(0);
}

#[test]
fn test_clicks_after_cooldown_both_count() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::new(-3.0, 0.0));
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::new(3.0, 0.0));

    click(&mut world, Vec2::new(-3.0, 0.0));
    run_clicks(&mut world);

    world.resource_mut::<Clock>().unscaled += 0.3;
    click(&mut world, Vec2::new(3.0, 0.0));
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(2);
}

#[test]
fn test_click_inside_cooldown_on_other_item_is_dropped() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::new(-3.0, 0.0));
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::new(3.0, 0.0));

    click(&mut world, Vec2::new(-3.0, 0.0));
    run_clicks(&mut world);
    world.resource_mut::<Clock>().unscaled += 0.1;
    click(&mut world, Vec2::new(3.0, 0.0));
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(1);
    assert_that(&pickable_count(&mut world)).is_equal_to(1);
}

#[test]
fn test_protected_item_costs_points_and_shows_popup() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Protected { deduction: 3 }, Vec2::ZERO);

    click(&mut world, Vec2::new(0.5, -0.5));
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(-3);
    let popups: Vec<String> = world
        .query::<&FloatingText>()
        .iter(&world)
        .map(|popup| popup.text.clone())
        .collect();
    assert_that(&popups).is_equal_to(vec!["-3".to_string()]);
}

#[test]
fn test_click_missing_every_item_does_nothing() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::ZERO);

    click(&mut world, Vec2::new(5.0, 5.0));
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(0);
    assert_that(&pickable_count(&mut world)).is_equal_to(1);
}

#[test]
fn test_clicks_ignored_while_paused() {
    let mut world = common::create_test_world();
    world.insert_resource(TimeScale(0.0));
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::ZERO);

    click(&mut world, Vec2::ZERO);
    run_clicks(&mut world);

    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(0);
    assert_that(&pickable_count(&mut world)).is_equal_to(1);
}

#[test]
fn test_bonus_and_shadow_report_to_director() {
    let mut world = common::create_test_world();
    world.insert_resource(ClickCooldown::new(0.0));
    spawn_item(&mut world, Pickable::Bonus, Vec2::new(-3.0, 0.0));
    spawn_item(&mut world, Pickable::TutorialShadow(common::wildlife_item()), Vec2::new(3.0, 0.0));

    click(&mut world, Vec2::new(-3.0, 0.0));
    click(&mut world, Vec2::new(3.0, 0.0));
    run_clicks(&mut world);

    assert_that(&pickups(&world)).is_equal_to(vec![
        PickupEvent::Bonus {
            at: Vec2::new(-3.0, 0.0),
        },
        PickupEvent::Shadow(common::wildlife_item()),
    ]);
    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(0);
    assert_that(&pickable_count(&mut world)).is_equal_to(0);
}

#[test]
fn test_hit_test_prefers_latest_spawn() {
    let mut world = World::default();
    let below = world.spawn((Position(Vec2::ZERO), Bounds::new(2.0, 2.0))).id();
    let above = world.spawn((Position(Vec2::new(0.5, 0.0)), Bounds::new(2.0, 2.0))).id();

    let mut query = world.query::<(bevy_ecs::entity::Entity, &Position, &Bounds)>();
    let hit = hit_test(query.iter(&world), Vec2::new(0.2, 0.0));

    assert_that(&hit).is_equal_to(Some(above));
    assert_that(&(hit != Some(below))).is_true();
}

#[test]
fn test_cooldown_window() {
    let mut cooldown = ClickCooldown::new(0.25);

    assert_that(&cooldown.try_accept(1.0)).is_true();
    assert_that(&cooldown.try_accept(1.2)).is_false();
    assert_that(&cooldown.try_accept(1.26)).is_true();
}

#[test]
fn test_clear_items_removes_items_and_popups() {
    let mut world = common::create_test_world();
    spawn_item(&mut world, Pickable::Trash { points: 1 }, Vec2::ZERO);
    spawn_item(&mut world, Pickable::Bonus, Vec2::ONE);
    world.spawn(FloatingText::bundle(
        river_sweep::systems::popup::PopupStyle::Points(1),
        Vec2::ZERO,
    ));

    world.send_event(StreamControl::ClearItems);
    world
        .run_system_once(clear_items_system)
        .expect("System should run successfully");

    assert_that(&pickable_count(&mut world)).is_equal_to(0);
    assert_that(&world.query::<&FloatingText>().iter(&world).count()).is_equal_to(0);
}

#[test]
fn test_kayak_note_shows_once_in_main_game() {
    let director = director_after(&[
        GameCommand::StartTutorial,
        GameCommand::BeginTutorial,
        GameCommand::SkipTutorial,
        GameCommand::StartRealGame,
    ]);
    assert_that(&director.phase()).is_equal_to(Phase::MainGamePlaying);
    let (mut world, kayak) = kayak_world(director);

    click(&mut world, Vec2::ZERO);
    run_clicks(&mut world);

    // The note appears above the kayak, which stays on the river
    assert_that(&popups(&mut world)).is_equal_to(vec![("Give kayaks room".to_string(), Vec2::new(0.0, 2.0))]);
    let info = world.get::<Pickable>(kayak).cloned();
    assert_that(&info).is_equal_to(Some(Pickable::Kayak(KayakInfo {
        message: "Give kayaks room".into(),
        shown: true,
    })));
    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(0);

    click(&mut world, Vec2::ZERO);
    run_clicks(&mut world);

    assert_that(&popups(&mut world).len()).is_equal_to(1);
    assert_that(&pickable_count(&mut world)).is_equal_to(1);
}

#[test]
fn test_kayak_click_ignored_outside_main_game() {
    let director = director_after(&[GameCommand::StartTutorial, GameCommand::BeginTutorial]);
    assert_that(&director.phase()).is_equal_to(Phase::TutorialPlaying);
    let (mut world, kayak) = kayak_world(director);

    click(&mut world, Vec2::ZERO);
    run_clicks(&mut world);

    assert_that(&popups(&mut world)).is_empty();
    assert_that(&world.get::<Pickable>(kayak).cloned())
        .is_equal_to(Some(Pickable::Kayak(KayakInfo::new("Give kayaks room"))));
}
