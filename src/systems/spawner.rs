//! Periodic spawning of pickable items ahead of the camera.
//!
//! The spawner is a small scheduler: after an initial delay it waits a random interval, makes
//! one spawn attempt, and repeats. All waits run on scaled time, so pausing the world pauses
//! the spawner. Starting a mode or stopping cancels whatever wait was pending.

use bevy_ecs::{
    entity::Entity,
    event::EventReader,
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, error, trace, warn};

use crate::config::{SpawnerConfig, TutorialItem};
use crate::constants::spawner::SHADOW_OFFSCREEN_BUFFER;
use crate::error::ConfigError;
use crate::events::SpawnerControl;
use crate::systems::{
    pickable::{KayakInfo, Pickable, PickableBundle},
    Bounds, DeltaTime, GameRng, Position, Renderable, Viewport,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnMode {
    Idle,
    /// Repeatedly spawns shadows of the focused item, one at a time.
    Tutorial(TutorialItem),
    RealGame,
}

/// The pending wait of the spawn loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnLoop {
    Stopped,
    InitialDelay { remaining: f32 },
    Waiting { remaining: f32 },
}

/// A spawn the spawner has decided on, before it is placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpawn {
    pub pickable: Pickable,
    pub sprite: String,
}

#[derive(Resource, Debug)]
pub struct ItemSpawner {
    config: SpawnerConfig,
    mode: SpawnMode,
    spawn_loop: SpawnLoop,
    active_shadow: Option<Entity>,
    since_bonus: f32,
    bonus_due: bool,
    since_penalty: f32,
    penalty_due: bool,
    since_kayak: f32,
    kayak_due: bool,
    pub disabled: bool,
}

impl ItemSpawner {
    pub fn new(config: &SpawnerConfig) -> Self {
        // Missing prefabs only matter once the main game starts
        let disabled = match config.validate() {
            Ok(()) => false,
            Err(e @ ConfigError::Missing { .. }) => {
                warn!("{e}");
                false
            }
            Err(e) => {
                error!("{e}");
                true
            }
        };

        Self {
            config: config.clone(),
            mode: SpawnMode::Idle,
            spawn_loop: SpawnLoop::Stopped,
            active_shadow: None,
            since_bonus: 0.0,
            bonus_due: false,
            since_penalty: 0.0,
            penalty_due: false,
            since_kayak: 0.0,
            kayak_due: false,
            disabled,
        }
    }

    pub fn mode(&self) -> &SpawnMode {
        &self.mode
    }

    pub fn spawn_loop(&self) -> SpawnLoop {
        self.spawn_loop
    }

    pub fn is_running(&self) -> bool {
        self.spawn_loop != SpawnLoop::Stopped
    }

    pub fn active_shadow(&self) -> Option<Entity> {
        self.active_shadow
    }

    pub fn set_active_shadow(&mut self, entity: Option<Entity>) {
        self.active_shadow = entity;
    }

    fn reset_special_timers(&mut self) {
        self.since_bonus = 0.0;
        self.bonus_due = false;
        self.since_penalty = 0.0;
        self.penalty_due = false;
        self.since_kayak = 0.0;
        self.kayak_due = false;
    }

    fn restart_loop(&mut self) {
        self.spawn_loop = SpawnLoop::InitialDelay {
            remaining: self.config.initial_delay,
        };
    }

    /// Starts tutorial mode focused on one item.
    ///
    /// Returns the shadow that was live before, which must be destroyed.
    pub fn start_tutorial_spawning(&mut self, item: TutorialItem) -> Option<Entity> {
        debug!(item = %item.name, "Starting tutorial spawning");
        let stale = self.active_shadow.take();
        self.reset_special_timers();

        if item.shadow_sprite.is_empty() {
            warn!(item = %item.name, "Tutorial item has no shadow sprite. Cannot spawn tutorial item.");
            self.mode = SpawnMode::Idle;
            self.spawn_loop = SpawnLoop::Stopped;
            return stale;
        }

        self.mode = SpawnMode::Tutorial(item);
        self.restart_loop();
        stale
    }

    /// Changes the focused tutorial item without restarting the loop.
    ///
    /// Returns the shadow of the previous item, which must be destroyed.
    pub fn set_tutorial_focus(&mut self, item: TutorialItem) -> Option<Entity> {
        debug!(item = %item.name, "Setting tutorial focus");
        let stale = self.active_shadow.take();
        if matches!(self.mode, SpawnMode::Tutorial(_)) {
            if item.shadow_sprite.is_empty() {
                warn!(item = %item.name, "Tutorial item has no shadow sprite. Spawning pauses until a valid item is set.");
            }
            self.mode = SpawnMode::Tutorial(item);
        }
        stale
    }

    /// Starts the main game's item stream.
    ///
    /// Returns a leftover tutorial shadow, which must be destroyed.
    pub fn start_real_game_spawning(&mut self) -> Option<Entity> {
        debug!("Starting real game spawning");
        let stale = self.active_shadow.take();
        self.mode = SpawnMode::RealGame;
        self.reset_special_timers();

        if self.config.trash_prefabs.is_empty() && self.config.bonus_prefab.is_none() {
            error!("ItemSpawner: no trash prefab or bonus prefab assigned. Cannot start real game spawning.");
            self.disabled = true;
            self.spawn_loop = SpawnLoop::Stopped;
            return stale;
        }

        self.restart_loop();
        stale
    }

    /// Cancels the spawn loop. Returns the live tutorial shadow, which must be destroyed.
    pub fn stop_spawning(&mut self) -> Option<Entity> {
        if self.is_running() {
            debug!("Spawn loop stopped");
        }
        self.spawn_loop = SpawnLoop::Stopped;
        if matches!(self.mode, SpawnMode::Tutorial(_)) {
            self.active_shadow.take()
        } else {
            None
        }
    }

    /// Advances the bonus, penalty and kayak interval timers.
    pub fn tick_timers(&mut self, dt: f32) {
        if self.mode != SpawnMode::RealGame || !self.is_running() {
            return;
        }

        if self.config.bonus_prefab.is_some() {
            self.since_bonus += dt;
            if self.since_bonus >= self.config.bonus_interval {
                self.bonus_due = true;
            }
        }
        if !self.config.penalty_prefabs.is_empty() {
            self.since_penalty += dt;
            if self.since_penalty >= self.config.penalty_interval {
                self.penalty_due = true;
            }
        }
        if self.config.kayak_prefab.is_some() {
            self.since_kayak += dt;
            if self.since_kayak >= self.config.kayak_interval {
                self.kayak_due = true;
            }
        }
    }

    fn random_delay<R: Rng>(&self, rng: &mut R) -> f32 {
        let (min, max) = (self.config.min_delay, self.config.max_delay);
        if min >= max {
            min
        } else {
            rng.random_range(min..max)
        }
    }

    /// Advances the spawn loop. Returns `true` when a spawn attempt is due this tick.
    ///
    /// A tick where no time passes never attempts a spawn, even with zero delays.
    pub fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) -> bool {
        if dt <= 0.0 {
            return false;
        }
        match self.spawn_loop {
            SpawnLoop::Stopped => false,
            SpawnLoop::InitialDelay { remaining } => {
                let remaining = remaining - dt;
                self.spawn_loop = if remaining <= 0.0 {
                    trace!("Initial delay complete");
                    SpawnLoop::Waiting {
                        remaining: self.random_delay(rng),
                    }
                } else {
                    SpawnLoop::InitialDelay { remaining }
                };
                false
            }
            SpawnLoop::Waiting { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.spawn_loop = SpawnLoop::Waiting {
                        remaining: self.random_delay(rng),
                    };
                    true
                } else {
                    self.spawn_loop = SpawnLoop::Waiting { remaining };
                    false
                }
            }
        }
    }

    /// Decides what to spawn for one attempt.
    ///
    /// In the main game a due penalty item wins over a due bonus item, which wins over trash.
    pub fn choose<R: Rng>(&mut self, rng: &mut R) -> Option<ItemSpawn> {
        match &self.mode {
            SpawnMode::Idle => None,
            SpawnMode::Tutorial(item) => {
                if self.active_shadow.is_some() {
                    return None;
                }
                if item.shadow_sprite.is_empty() {
                    warn!(item = %item.name, "Focused tutorial item has no shadow sprite. Cannot spawn.");
                    return None;
                }
                Some(ItemSpawn {
                    pickable: Pickable::TutorialShadow(item.clone()),
                    sprite: item.shadow_sprite.clone(),
                })
            }
            SpawnMode::RealGame => {
                let config = &self.config;
                if self.penalty_due && !config.penalty_prefabs.is_empty() {
                    let prefab = &config.penalty_prefabs[rng.random_range(0..config.penalty_prefabs.len())];
                    let spawn = ItemSpawn {
                        pickable: Pickable::Protected {
                            deduction: config.penalty_deduction,
                        },
                        sprite: prefab.clone(),
                    };
                    self.since_penalty = 0.0;
                    self.penalty_due = false;
                    return Some(spawn);
                }

                if self.bonus_due {
                    if let Some(prefab) = &config.bonus_prefab {
                        let spawn = ItemSpawn {
                            pickable: Pickable::Bonus,
                            sprite: prefab.clone(),
                        };
                        self.since_bonus = 0.0;
                        self.bonus_due = false;
                        return Some(spawn);
                    }
                }

                if config.trash_prefabs.is_empty() {
                    if config.bonus_prefab.is_none() && config.penalty_prefabs.is_empty() {
                        error!("ItemSpawner: no trash, bonus or penalty prefabs assigned.");
                    }
                    return None;
                }

                let prefab = &config.trash_prefabs[rng.random_range(0..config.trash_prefabs.len())];
                Some(ItemSpawn {
                    pickable: Pickable::Trash {
                        points: config.trash_points,
                    },
                    sprite: prefab.clone(),
                })
            }
        }
    }

    /// Takes a due kayak. Kayaks launch on their own timer, outside the spawn loop's attempts.
    pub fn take_kayak(&mut self) -> Option<ItemSpawn> {
        if !self.kayak_due {
            return None;
        }
        let prefab = self.config.kayak_prefab.clone()?;
        self.since_kayak = 0.0;
        self.kayak_due = false;
        Some(ItemSpawn {
            pickable: Pickable::Kayak(KayakInfo::new(&self.config.kayak_message)),
            sprite: prefab,
        })
    }

    /// A uniformly random point in the spawn area around `origin`.
    pub fn spawn_position<R: Rng>(&self, origin: Vec2, rng: &mut R) -> Vec2 {
        let c = &self.config;
        let x = if c.area_min_x < c.area_max_x {
            rng.random_range(c.area_min_x..c.area_max_x)
        } else {
            c.area_min_x
        };
        let y = if c.area_min_y < c.area_max_y {
            rng.random_range(c.area_min_y..c.area_max_y)
        } else {
            c.area_min_y
        };
        origin + Vec2::new(x, y)
    }

    pub fn item_size(&self) -> f32 {
        self.config.item_half_size * 2.0
    }
}

/// Runs the spawn loop and keeps the tutorial shadow bookkeeping current.
pub fn item_spawner_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    viewport: Res<Viewport>,
    mut spawner: ResMut<ItemSpawner>,
    mut rng: ResMut<GameRng>,
    items: Query<(&Position, Option<&Bounds>), With<Pickable>>,
) {
    if spawner.disabled {
        return;
    }

    spawner.tick_timers(dt.seconds);

    if let Some(shadow) = spawner.active_shadow() {
        match items.get(shadow) {
            // Clicked, or removed by someone else
            Err(_) => spawner.set_active_shadow(None),
            Ok((position, bounds)) => {
                let buffer = bounds.map_or(SHADOW_OFFSCREEN_BUFFER, |b| b.half_extents.y * 2.0);
                if position.0.y < viewport.bottom() - buffer {
                    debug!(?shadow, "Tutorial shadow went off-screen. Destroying it to allow a respawn.");
                    commands.entity(shadow).despawn();
                    spawner.set_active_shadow(None);
                }
            }
        }
    }

    if let Some(kayak) = spawner.take_kayak() {
        let at = spawner.spawn_position(viewport.center(), &mut rng.0);
        place(&mut commands, &spawner, kayak, at);
    }

    if !spawner.advance(dt.seconds, &mut rng.0) {
        return;
    }

    let Some(spawn) = spawner.choose(&mut rng.0) else {
        return;
    };

    let at = spawner.spawn_position(viewport.center(), &mut rng.0);
    let is_shadow = matches!(spawn.pickable, Pickable::TutorialShadow(_));
    let entity = place(&mut commands, &spawner, spawn, at);

    if is_shadow {
        spawner.set_active_shadow(Some(entity));
    }
}

fn place(commands: &mut Commands, spawner: &ItemSpawner, spawn: ItemSpawn, at: Vec2) -> Entity {
    let size = spawner.item_size();
    debug!(pickable = ?spawn.pickable, x = at.x, y = at.y, "Spawning item");
    commands
        .spawn(PickableBundle {
            pickable: spawn.pickable,
            position: Position(at),
            bounds: Bounds::new(size, size),
            sprite: Renderable {
                sprite: spawn.sprite,
                layer: 2,
            },
        })
        .id()
}

/// Applies mode changes requested by the director.
pub fn spawner_control_system(
    mut commands: Commands,
    mut spawner: ResMut<ItemSpawner>,
    mut controls: EventReader<SpawnerControl>,
    live: Query<(), With<Pickable>>,
) {
    for control in controls.read() {
        let stale = match control {
            SpawnerControl::StartTutorial(item) => spawner.start_tutorial_spawning(item.clone()),
            SpawnerControl::Focus(item) => spawner.set_tutorial_focus(item.clone()),
            SpawnerControl::StartRealGame => spawner.start_real_game_spawning(),
            SpawnerControl::Stop => spawner.stop_spawning(),
        };

        // A clicked shadow is already gone by the time the director reacts to it
        if let Some(entity) = stale.filter(|e| live.contains(*e)) {
            debug!(?entity, "Destroying previous tutorial shadow");
            commands.entity(entity).despawn();
        }
    }
}
