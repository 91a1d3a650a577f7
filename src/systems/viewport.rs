//! Camera tracking.
//!
//! The camera only ever moves vertically. Every streaming component reads the [`Viewport`]
//! to decide what lies ahead of or behind the visible area.

use bevy_ecs::{
    event::EventReader,
    resource::Resource,
    system::{Res, ResMut},
};
use glam::Vec2;
use tracing::{debug, error};

use crate::config::ViewportConfig;
use crate::events::StreamControl;
use crate::systems::DeltaTime;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_y: f32,
    pub half_height: f32,
    pub half_width: f32,
    pub scroll_speed: f32,
    start_y: f32,
    /// Set when the camera configuration is unusable; streaming components stay idle.
    pub invalid: bool,
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        let invalid = match config.validate() {
            Ok(()) => false,
            Err(e) => {
                error!("Viewport: {e}");
                true
            }
        };

        Self {
            center_y: config.start_y,
            half_height: config.orthographic_size.max(0.0),
            half_width: (config.orthographic_size * config.aspect).max(0.0),
            scroll_speed: config.scroll_speed,
            start_y: config.start_y,
            invalid,
        }
    }

    pub fn top(&self) -> f32 {
        self.center_y + self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.center_y - self.half_height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(0.0, self.center_y)
    }

    pub fn start_y(&self) -> f32 {
        self.start_y
    }

    /// Moves the camera back to where a round begins.
    pub fn reset(&mut self) {
        self.center_y = self.start_y;
    }
}

/// Scrolls the camera upward at a constant speed.
pub fn auto_scroll_system(dt: Res<DeltaTime>, mut viewport: ResMut<Viewport>) {
    if viewport.invalid {
        return;
    }
    let step = viewport.scroll_speed * dt.seconds;
    viewport.center_y += step;
}

pub fn viewport_control_system(mut viewport: ResMut<Viewport>, mut controls: EventReader<StreamControl>) {
    for control in controls.read() {
        if let StreamControl::ResetViewport = control {
            debug!(start_y = viewport.start_y, "Resetting camera");
            viewport.reset();
        }
    }
}
