//! This module contains the main game logic and state.

use bevy_ecs::event::{Event, EventRegistry, Events};
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::world::World;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::events::{GameEvent, PickupEvent, SceneRequest, SpawnerControl, StreamControl};
use crate::systems::{
    audio::audio_system,
    director::{countdown_system, director_system, phase_allows},
    lifetime::time_to_live_system,
    pickable::{clear_items_system, click_system},
    popup::popup_system,
    river::{river_control_system, river_stream_system},
    skyline::{skyline_control_system, skyline_stream_system},
    spawner::{item_spawner_system, spawner_control_system},
    viewport::{auto_scroll_system, viewport_control_system},
    ActiveSystems, AudioEvent, ClickCooldown, Clock, DeltaTime, Director, GameRng, GlobalState, ItemSpawner,
    MusicState, Phase, RiverStream, ScoreLedger, SkylineStream, TimeScale, Viewport,
};

/// Ordered stages of a frame.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Clicks are resolved against live items
    Input,
    /// The director reacts to commands, pickups and time
    Director,
    /// Components apply the director's requests
    Control,
    /// Streaming and spawning, gated by the current phase
    Update,
    /// Popups, lifetimes and music
    Respond,
}

/// The headless simulation: an ECS world and the schedule that advances it.
///
/// The host feeds it [`GameEvent`]s and elapsed time; everything else happens inside the
/// schedule. Nothing here depends on a window, so the whole game can be driven from tests.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    pub fn new(config: &GameConfig) -> GameResult<Game> {
        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world, &mut schedule);

        if !ScoreLedger::install(&mut world) {
            return Err(GameError::InvalidState("score ledger already installed".into()));
        }

        let viewport = Viewport::new(&config.viewport);
        let river_reset_y = viewport.start_y() - viewport.half_height;

        world.insert_resource(GlobalState { exit: false });
        world.insert_resource(DeltaTime::default());
        world.insert_resource(TimeScale(Phase::None.time_scale()));
        world.insert_resource(Clock::default());
        world.insert_resource(GameRng::new(config.seed));
        world.insert_resource(ClickCooldown::new(config.director.click_cooldown));
        world.insert_resource(viewport);
        world.insert_resource(RiverStream::new(&config.river));
        world.insert_resource(SkylineStream::new(&config.skyline));
        world.insert_resource(ItemSpawner::new(&config.spawner));
        world.insert_resource(Director::new(&config.director, river_reset_y));
        world.insert_resource(MusicState::new(&config.audio));

        info!(seed = ?config.seed, "Game initialized");
        Ok(Game { world, schedule })
    }

    fn setup_ecs(world: &mut World, schedule: &mut Schedule) {
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<PickupEvent>(world);
        EventRegistry::register_event::<SpawnerControl>(world);
        EventRegistry::register_event::<StreamControl>(world);
        EventRegistry::register_event::<SceneRequest>(world);
        EventRegistry::register_event::<AudioEvent>(world);

        schedule
            .add_systems((
                click_system.in_set(GameplaySet::Input),
                (
                    director_system,
                    countdown_system.run_if(phase_allows(ActiveSystems::COUNTDOWN)),
                )
                    .chain()
                    .in_set(GameplaySet::Director),
                // Control systems always run so no request is lost to a gated phase
                (
                    viewport_control_system,
                    river_control_system,
                    skyline_control_system,
                    spawner_control_system,
                    clear_items_system,
                )
                    .chain()
                    .in_set(GameplaySet::Control),
                (
                    auto_scroll_system.run_if(phase_allows(ActiveSystems::SCROLL)),
                    river_stream_system.run_if(phase_allows(ActiveSystems::RIVER)),
                    skyline_stream_system.run_if(phase_allows(ActiveSystems::SKYLINE)),
                    item_spawner_system.run_if(phase_allows(ActiveSystems::SPAWNER)),
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                (time_to_live_system, popup_system, audio_system)
                    .chain()
                    .in_set(GameplaySet::Respond),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Director,
                    GameplaySet::Control,
                    GameplaySet::Update,
                    GameplaySet::Respond,
                )
                    .chain(),
            );
    }

    /// Queues an input for the next tick.
    pub fn send(&mut self, event: impl Into<GameEvent>) {
        let event = event.into();
        debug!(?event, "Input queued");
        self.world.send_event(event);
    }

    /// Advances the game by `dt` wall-clock seconds.
    ///
    /// The world sees `dt` multiplied by the current [`TimeScale`]; the director's watchdog and
    /// the music see the unscaled value.
    ///
    /// Returns true if the game should exit.
    pub fn tick(&mut self, dt: f32) -> bool {
        let scale = self.world.get_resource::<TimeScale>().map_or(1.0, |s| s.0);
        let delta = DeltaTime::new(dt, scale);
        self.world.insert_resource(delta);
        if let Some(mut clock) = self.world.get_resource_mut::<Clock>() {
            clock.unscaled += delta.unscaled as f64;
        }

        self.schedule.run(&mut self.world);

        update_events::<GameEvent>(&mut self.world);
        update_events::<PickupEvent>(&mut self.world);
        update_events::<SpawnerControl>(&mut self.world);
        update_events::<StreamControl>(&mut self.world);
        update_events::<SceneRequest>(&mut self.world);
        update_events::<AudioEvent>(&mut self.world);

        self.world.get_resource::<GlobalState>().is_some_and(|state| state.exit)
    }

    /// Takes the scene loads requested since the last call.
    pub fn take_scene_requests(&mut self) -> Vec<SceneRequest> {
        match self.world.get_resource_mut::<Events<SceneRequest>>() {
            Some(mut events) => events.drain().collect(),
            None => Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.world.get_resource::<Director>().map_or(Phase::None, |d| d.phase())
    }

    pub fn score(&self) -> i32 {
        self.world.get_resource::<ScoreLedger>().map_or(0, |s| s.current_score())
    }
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
