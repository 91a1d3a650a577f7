use bevy_ecs::{component::Component, resource::Resource};
use glam::Vec2;
use rand::{rngs::SmallRng, SeedableRng};

#[derive(Resource)]
pub struct GlobalState {
    pub exit: bool,
}

/// Frame timing.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DeltaTime {
    /// Seconds elapsed this frame, multiplied by the current [`TimeScale`].
    pub seconds: f32,
    /// Wall-clock seconds elapsed this frame, unaffected by pauses.
    pub unscaled: f32,
}

impl DeltaTime {
    pub fn new(unscaled: f32, scale: f32) -> Self {
        Self {
            seconds: unscaled * scale,
            unscaled,
        }
    }
}

/// World time multiplier; zero freezes every timer and scrolling system at once.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct TimeScale(pub f32);

impl Default for TimeScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TimeScale {
    pub fn is_paused(&self) -> bool {
        self.0 == 0.0
    }
}

/// Wall-clock seconds since the game was created, including paused time.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Clock {
    pub unscaled: f64,
}

/// The game's random number generator.
#[derive(Resource)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_rng(&mut rand::rng())),
        }
    }
}

/// World position of an entity's centre.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Axis-aligned extents around an entity's [`Position`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub half_extents: Vec2,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let delta = (point - center).abs();
        delta.x <= self.half_extents.x && delta.y <= self.half_extents.y
    }

    pub fn top(&self, center: Vec2) -> f32 {
        center.y + self.half_extents.y
    }
}

/// A component for entities that are drawn, with a layer for ordering.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Renderable {
    pub sprite: String,
    pub layer: u8,
}

/// Which generator owns a chunk.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chunk {
    River,
    Skyline,
    Special,
}
