//! Music state.
//!
//! The game has two tracks: the primary loop and a short game-over sting. Actual playback
//! belongs to the host; this module only tracks which track should be audible, so the host
//! (and the tests) can read it from [`MusicState`].

use bevy_ecs::{
    event::{Event, EventReader},
    resource::Resource,
    system::{Res, ResMut},
};
use strum_macros::Display;
use tracing::{debug, trace};

use crate::config::AudioConfig;
use crate::systems::DeltaTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Track {
    Primary,
    GameOver,
}

/// Events for changing the music
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    PlayPrimary,
    /// Stop the primary track and play the game-over track once
    PlayGameOver,
    ToggleMute,
}

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone)]
pub struct MusicState {
    pub track: Option<Track>,
    pub muted: bool,
    /// Unscaled seconds the current track has been playing.
    pub elapsed: f32,
    game_over_length: f32,
}

impl MusicState {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            track: Some(Track::Primary),
            muted: config.start_muted,
            elapsed: 0.0,
            game_over_length: config.game_over_track_length,
        }
    }

    pub fn play(&mut self, track: Track) {
        debug!(%track, "Playing track");
        self.track = Some(track);
        self.elapsed = 0.0;
    }

    /// Advances playback, handing back to the primary track when the game-over track ends.
    pub fn advance(&mut self, dt: f32) {
        if self.track.is_none() {
            return;
        }
        self.elapsed += dt;
        if self.track == Some(Track::GameOver) && self.elapsed >= self.game_over_length {
            trace!("Game over track finished");
            self.play(Track::Primary);
        }
    }
}

/// System that processes audio events and advances playback on unscaled time
pub fn audio_system(dt: Res<DeltaTime>, mut state: ResMut<MusicState>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        match event {
            AudioEvent::PlayPrimary => {
                if state.track != Some(Track::Primary) {
                    state.play(Track::Primary);
                }
            }
            AudioEvent::PlayGameOver => state.play(Track::GameOver),
            AudioEvent::ToggleMute => {
                state.muted = !state.muted;
                debug!(muted = state.muted, "Audio mute state changed");
            }
        }
    }

    state.advance(dt.unscaled);
}
