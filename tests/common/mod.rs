#![allow(dead_code)]

use bevy_ecs::{event::Events, world::World};
use river_sweep::{
    config::{GameConfig, TutorialItem},
    events::{GameCommand, GameEvent, PickupEvent, SpawnerControl, StreamControl},
    game::Game,
    systems::{Bounds, Chunk, ClickCooldown, Clock, DeltaTime, GameRng, Phase, Position, ScoreLedger, TimeScale, Viewport},
};

pub const SEED: u64 = 0x5eed;

/// The default configuration with a fixed seed.
pub fn test_config() -> GameConfig {
    GameConfig {
        seed: Some(SEED),
        ..GameConfig::default()
    }
}

pub fn create_test_game() -> Game {
    Game::new(&test_config()).expect("Game should build from the default configuration")
}

/// Sends a command and runs one zero-length tick so the director applies it.
pub fn command(game: &mut Game, command: GameCommand) {
    game.send(command);
    game.tick(0.0);
}

/// Ticks the game in fixed steps.
pub fn run_for(game: &mut Game, ticks: u32, dt: f32) {
    for _ in 0..ticks {
        game.tick(dt);
    }
}

/// Drives a fresh game from the title screen into the main game, skipping the tutorial.
pub fn start_main_game(game: &mut Game) {
    command(game, GameCommand::StartTutorial);
    command(game, GameCommand::BeginTutorial);
    command(game, GameCommand::SkipTutorial);
    command(game, GameCommand::StartRealGame);
    assert_eq!(game.phase(), Phase::MainGamePlaying);
}

/// A bare world with the resources the streaming and click systems need.
pub fn create_test_world() -> World {
    let config = test_config();
    let mut world = World::default();
    world.insert_resource(Viewport::new(&config.viewport));
    world.insert_resource(DeltaTime::new(0.0, 1.0));
    world.insert_resource(TimeScale::default());
    world.insert_resource(Clock::default());
    world.insert_resource(GameRng::new(Some(SEED)));
    world.insert_resource(ScoreLedger::default());
    world.insert_resource(ClickCooldown::new(config.director.click_cooldown));
    world.init_resource::<Events<GameEvent>>();
    world.init_resource::<Events<PickupEvent>>();
    world.init_resource::<Events<SpawnerControl>>();
    world.init_resource::<Events<StreamControl>>();
    world
}

pub fn set_delta(world: &mut World, seconds: f32) {
    world.insert_resource(DeltaTime::new(seconds, 1.0));
}

/// `(bottom, top)` of every chunk of the given kind, sorted by bottom edge.
pub fn chunk_spans(world: &mut World, kind: Chunk) -> Vec<(f32, f32)> {
    let mut spans: Vec<(f32, f32)> = world
        .query::<(&Chunk, &Position, &Bounds)>()
        .iter(world)
        .filter(|(chunk, _, _)| **chunk == kind)
        .map(|(_, position, bounds)| {
            (
                position.0.y - bounds.half_extents.y,
                position.0.y + bounds.half_extents.y,
            )
        })
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    spans
}

pub fn wildlife_item() -> TutorialItem {
    TutorialItem {
        name: "Painted Turtle".into(),
        description: "A turtle.".into(),
        shadow_sprite: "tutorial/turtle_shadow".into(),
        revealed_sprite: "tutorial/turtle".into(),
        wildlife: true,
    }
}

pub fn trash_item() -> TutorialItem {
    TutorialItem {
        name: "Plastic Bottle".into(),
        description: "A bottle.".into(),
        shadow_sprite: "tutorial/bottle_shadow".into(),
        revealed_sprite: "tutorial/bottle".into(),
        wildlife: false,
    }
}
