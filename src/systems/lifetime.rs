use bevy_ecs::{
    component::Component,
    entity::Entity,
    system::{Commands, Query, Res},
};

use crate::systems::DeltaTime;

/// Component for entities that should be automatically deleted after a number of seconds
#[derive(Component, Debug, Clone, Copy)]
pub struct TimeToLive {
    pub remaining: f32,
}

impl TimeToLive {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Opacity for something that fades out over the last `window` seconds of its life.
    pub fn fade_out(&self, window: f32) -> f32 {
        if window <= 0.0 {
            return if self.remaining > 0.0 { 1.0 } else { 0.0 };
        }
        (self.remaining / window).clamp(0.0, 1.0)
    }
}

/// System that manages entities with TimeToLive components, decrementing their remaining time
/// and despawning them when they expire
pub fn time_to_live_system(mut commands: Commands, dt: Res<DeltaTime>, mut query: Query<(Entity, &mut TimeToLive)>) {
    for (entity, mut ttl) in query.iter_mut() {
        if ttl.remaining <= dt.seconds {
            commands.entity(entity).despawn();
        } else {
            ttl.remaining -= dt.seconds;
        }
    }
}
