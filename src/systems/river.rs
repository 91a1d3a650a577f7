//! The river backdrop: an endless column of fixed-height chunks.
//!
//! Chunks are laid end to end by a running cursor that marks the bottom edge of the next
//! chunk. A chunk's [`Position`] is its centre, so its top edge is `position + height / 2`.

use bevy_ecs::{
    entity::Entity,
    event::EventReader,
    resource::Resource,
    system::{Commands, Res, ResMut},
};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, error, trace};

use crate::config::RiverConfig;
use crate::events::StreamControl;
use crate::systems::{Bounds, Chunk, GameRng, Position, Renderable, Viewport};

/// A chunk that the stream has decided to place.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPlacement {
    pub prefab: String,
    pub center_y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveChunk {
    pub entity: Entity,
    pub center_y: f32,
}

#[derive(Resource, Debug)]
pub struct RiverStream {
    prefabs: Vec<String>,
    chunk_height: f32,
    lookahead: f32,
    trail_distance: f32,
    origin_y: f32,
    next_spawn_y: f32,
    started: bool,
    active: Vec<ActiveChunk>,
    pub disabled: bool,
}

impl RiverStream {
    pub fn new(config: &RiverConfig) -> Self {
        let disabled = match config.validate() {
            Ok(()) => false,
            Err(e) => {
                error!("{e}");
                true
            }
        };

        Self {
            prefabs: config.prefabs.iter().filter(|p| !p.is_empty()).cloned().collect(),
            chunk_height: config.chunk_height,
            lookahead: config.lookahead,
            trail_distance: config.trail_distance,
            origin_y: 0.0,
            next_spawn_y: 0.0,
            started: false,
            active: Vec::new(),
            disabled,
        }
    }

    pub fn chunk_height(&self) -> f32 {
        self.chunk_height
    }

    pub fn origin_y(&self) -> f32 {
        self.origin_y
    }

    pub fn next_spawn_y(&self) -> f32 {
        self.next_spawn_y
    }

    pub fn active_chunks(&self) -> &[ActiveChunk] {
        &self.active
    }

    /// Everything below this line must already be covered.
    pub fn spawn_trigger_y(&self, viewport: &Viewport) -> f32 {
        viewport.top() + self.lookahead
    }

    /// Chunks whose top edge is below this line are destroyed.
    pub fn despawn_trigger_y(&self, viewport: &Viewport) -> f32 {
        viewport.bottom() - self.trail_distance
    }

    /// Anchors the cursor to the bottom of the viewport on the first tick.
    pub fn ensure_started(&mut self, viewport: &Viewport) {
        if !self.started {
            self.origin_y = viewport.bottom();
            self.next_spawn_y = self.origin_y;
            self.started = true;
        }
    }

    /// Returns the next chunk to place and advances the cursor, or `None` once the cursor has
    /// passed the spawn trigger. Call repeatedly until it returns `None`; a camera that jumped
    /// several chunk heights in one frame is backfilled without gaps.
    pub fn next_placement<R: Rng>(&mut self, viewport: &Viewport, rng: &mut R) -> Option<ChunkPlacement> {
        if self.disabled || self.prefabs.is_empty() || self.next_spawn_y >= self.spawn_trigger_y(viewport) {
            return None;
        }

        let prefab = if self.prefabs.len() == 1 {
            self.prefabs[0].clone()
        } else {
            self.prefabs[rng.random_range(0..self.prefabs.len())].clone()
        };

        let placement = ChunkPlacement {
            prefab,
            center_y: self.next_spawn_y + self.chunk_height / 2.0,
            height: self.chunk_height,
        };
        self.next_spawn_y += self.chunk_height;
        Some(placement)
    }

    pub fn track(&mut self, entity: Entity, center_y: f32) {
        self.active.push(ActiveChunk { entity, center_y });
    }

    /// Removes and returns every chunk whose top edge fell below the despawn line.
    pub fn take_expired(&mut self, viewport: &Viewport) -> SmallVec<[Entity; 4]> {
        let despawn_y = self.despawn_trigger_y(viewport);
        let half = self.chunk_height / 2.0;

        let mut expired = SmallVec::new();
        self.active.retain(|chunk| {
            let keep = chunk.center_y + half >= despawn_y;
            if !keep {
                expired.push(chunk.entity);
            }
            keep
        });
        expired
    }

    /// Forgets every chunk and restarts the column at `new_y`.
    ///
    /// Returns the entities that must be destroyed.
    pub fn reset(&mut self, new_y: f32) -> Vec<Entity> {
        self.origin_y = new_y;
        self.next_spawn_y = new_y;
        self.started = true;
        self.active.drain(..).map(|chunk| chunk.entity).collect()
    }
}

fn spawn_chunk(commands: &mut Commands, viewport: &Viewport, stream: &mut RiverStream, placement: ChunkPlacement) {
    trace!(prefab = %placement.prefab, y = placement.center_y, "Spawning river chunk");
    let entity = commands
        .spawn((
            Chunk::River,
            Position(Vec2::new(0.0, placement.center_y)),
            Bounds::new(viewport.half_width * 2.0, placement.height),
            Renderable {
                sprite: placement.prefab,
                layer: 0,
            },
        ))
        .id();
    stream.track(entity, placement.center_y);
}

fn fill(commands: &mut Commands, viewport: &Viewport, stream: &mut RiverStream, rng: &mut GameRng) {
    while let Some(placement) = stream.next_placement(viewport, &mut rng.0) {
        spawn_chunk(commands, viewport, stream, placement);
    }
}

/// Keeps the river covering the viewport plus the lookahead, and discards chunks left behind.
pub fn river_stream_system(
    mut commands: Commands,
    viewport: Res<Viewport>,
    mut stream: ResMut<RiverStream>,
    mut rng: ResMut<GameRng>,
) {
    if stream.disabled || viewport.invalid {
        return;
    }

    stream.ensure_started(&viewport);
    fill(&mut commands, &viewport, &mut stream, &mut rng);

    for entity in stream.take_expired(&viewport) {
        trace!(?entity, "Despawning river chunk");
        commands.entity(entity).despawn();
    }
}

/// Applies river resets requested by the director.
pub fn river_control_system(
    mut commands: Commands,
    viewport: Res<Viewport>,
    mut stream: ResMut<RiverStream>,
    mut rng: ResMut<GameRng>,
    mut controls: EventReader<StreamControl>,
) {
    for control in controls.read() {
        let StreamControl::ResetRiver(new_y) = *control else {
            continue;
        };
        if stream.disabled || viewport.invalid {
            continue;
        }

        let stale = stream.reset(new_y);
        debug!(new_y, destroyed = stale.len(), "Resetting river");
        for entity in stale {
            commands.entity(entity).despawn();
        }
        fill(&mut commands, &viewport, &mut stream, &mut rng);
    }
}
