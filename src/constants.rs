//! This module contains the default values for every tunable in the game.
//!
//! These are the compiled-in defaults of [`GameConfig`](crate::config::GameConfig);
//! any of them can be overridden through the environment at startup.

use std::time::Duration;

use glam::UVec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of the window, in pixels.
pub const WINDOW_SIZE: UVec2 = UVec2::new(540, 960);

/// Environment variable prefix for configuration overrides.
pub const CONFIG_ENV_PREFIX: &str = "RIVER_";

pub mod viewport {
    /// Half of the vertical extent of the camera, in world units.
    pub const ORTHOGRAPHIC_SIZE: f32 = 10.0;
    /// Width divided by height.
    pub const ASPECT: f32 = 9.0 / 16.0;
    /// World Y of the camera centre when a round begins.
    pub const START_Y: f32 = 0.0;
    /// Upward camera speed, in world units per second.
    pub const SCROLL_SPEED: f32 = 2.0;
}

pub mod river {
    pub const CHUNK_HEIGHT: f32 = 20.0;
    pub const LOOKAHEAD: f32 = 5.0;
    pub const TRAIL_DISTANCE: f32 = 10.0;
}

pub mod skyline {
    pub const CHUNK_HEIGHT: f32 = 20.0;
    pub const GAP: f32 = 100.0;
    pub const START_Y: f32 = 50.0;
    pub const TRAIL_DISTANCE: f32 = 10.0;
    pub const X: f32 = -4.0;
    pub const WIDTH: f32 = 3.0;
}

pub mod spawner {
    pub const AREA_MIN_X: f32 = -5.0;
    pub const AREA_MAX_X: f32 = 5.0;
    pub const AREA_MIN_Y: f32 = 11.0;
    pub const AREA_MAX_Y: f32 = 15.0;

    pub const MIN_DELAY: f32 = 0.5;
    pub const MAX_DELAY: f32 = 2.0;
    pub const INITIAL_DELAY: f32 = 1.0;

    pub const BONUS_INTERVAL: f32 = 10.0;
    pub const PENALTY_INTERVAL: f32 = 12.0;
    pub const PENALTY_DEDUCTION: i32 = 3;
    pub const KAYAK_INTERVAL: f32 = 25.0;
    pub const TRASH_POINTS: i32 = 1;

    /// Half extents of a spawned item's clickable area.
    pub const ITEM_HALF_SIZE: f32 = 1.0;
    /// Fallback off-screen margin for a tutorial shadow without bounds.
    pub const SHADOW_OFFSCREEN_BUFFER: f32 = 2.0;
}

pub mod director {
    pub const TUTORIAL_ITEMS_TO_COMPLETE: u32 = 5;
    pub const GAME_TIME_LIMIT: f32 = 60.0;
    pub const BONUS_TIME: f32 = 10.0;
    pub const INACTIVITY_TIMEOUT: f32 = 90.0;
    pub const CLICK_COOLDOWN: f32 = 0.25;
}

pub mod audio {
    /// Length of the game-over jingle, in seconds.
    pub const GAME_OVER_TRACK_LENGTH: f32 = 8.0;
}

pub mod popup {
    pub const LIFETIME: f32 = 1.5;
    pub const RISE_SPEED: f32 = 2.0;

    /// The kayak safety note lingers longer and sinks instead of rising.
    pub const INFO_LIFETIME: f32 = 3.0;
    pub const INFO_DRIFT_SPEED: f32 = -1.0;
    /// The note only starts fading in its final second.
    pub const INFO_FADE: f32 = 1.0;
    /// Height above the kayak at which the note appears.
    pub const INFO_OFFSET: f32 = 2.0;
}
