//! The skyline along the river bank.
//!
//! Units are placed one at a time ahead of the camera. A unit is either the regular
//! sequence (every prefab stacked bottom to top) or a one-off special building whose
//! trigger the camera has reached. Special buildings always win over the regular sequence.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventReader,
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, error, info, trace, warn};

use crate::config::{SkylineConfig, SpecialBuilding};
use crate::error::ConfigError;
use crate::events::StreamControl;
use crate::systems::river::ChunkPlacement;
use crate::systems::{Bounds, Chunk, Position, Renderable, Viewport};

/// Name tag carried by special buildings.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Landmark(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct SpecialEntry {
    pub building: SpecialBuilding,
    pub spawned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    Sequence,
    Special { name: String },
}

/// One unit the stream has decided to place: a single special building or the whole sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPlacement {
    pub kind: UnitKind,
    pub bottom_y: f32,
    pub pieces: SmallVec<[ChunkPlacement; 4]>,
}

#[derive(Resource, Debug)]
pub struct SkylineStream {
    sequence: Vec<String>,
    chunk_height: f32,
    gap: f32,
    start_y: f32,
    lookahead: f32,
    trail_distance: f32,
    x: f32,
    width: f32,
    specials: Vec<SpecialEntry>,
    next_unit_y: f32,
    halted: bool,
    active: Vec<Entity>,
    pub disabled: bool,
}

impl SkylineStream {
    pub fn new(config: &SkylineConfig) -> Self {
        let disabled = match config.validate() {
            Ok(()) => false,
            Err(e @ ConfigError::Missing { .. }) => {
                warn!("{e}. Nothing will be spawned.");
                true
            }
            Err(e) => {
                error!("{e}");
                true
            }
        };

        let mut specials: Vec<SpecialEntry> = config
            .specials
            .iter()
            .cloned()
            .map(|building| SpecialEntry {
                building,
                spawned: false,
            })
            .collect();
        specials.sort_by(|a, b| a.building.trigger_y.total_cmp(&b.building.trigger_y));

        if !disabled {
            debug!(
                sequence_height = config.sequence.len() as f32 * config.chunk_height,
                specials = specials.len(),
                "Skyline configured"
            );
        }

        Self {
            sequence: config.sequence.clone(),
            chunk_height: config.chunk_height,
            gap: config.gap,
            start_y: config.start_y,
            lookahead: config.effective_lookahead(),
            trail_distance: config.trail_distance,
            x: config.x,
            width: config.width,
            specials,
            next_unit_y: config.start_y,
            halted: false,
            active: Vec::new(),
            disabled,
        }
    }

    pub fn sequence_height(&self) -> f32 {
        self.sequence.len() as f32 * self.chunk_height
    }

    pub fn next_unit_y(&self) -> f32 {
        self.next_unit_y
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn specials(&self) -> &[SpecialEntry] {
        &self.specials
    }

    pub fn active_chunks(&self) -> &[Entity] {
        &self.active
    }

    /// Chooses the unit to place this tick, if any, and advances the cursor past it.
    pub fn next_unit(&mut self, viewport: &Viewport) -> Option<UnitPlacement> {
        if self.disabled || self.halted {
            return None;
        }
        if viewport.top() + self.lookahead < self.next_unit_y {
            return None;
        }

        let bottom_y = self.next_unit_y;
        let window_top = bottom_y + self.lookahead;

        let due = self
            .specials
            .iter_mut()
            .find(|entry| !entry.spawned)
            .filter(|entry| viewport.center_y >= entry.building.trigger_y && entry.building.trigger_y <= window_top);

        if let Some(entry) = due {
            entry.spawned = true;
            let building = &entry.building;
            self.next_unit_y += building.height + self.gap;

            let mut pieces = SmallVec::new();
            pieces.push(ChunkPlacement {
                prefab: building.prefab.clone(),
                center_y: bottom_y + building.height / 2.0,
                height: building.height,
            });
            return Some(UnitPlacement {
                kind: UnitKind::Special {
                    name: building.name.clone(),
                },
                bottom_y,
                pieces,
            });
        }

        if self.sequence.is_empty() {
            return None;
        }

        let pieces = self
            .sequence
            .iter()
            .enumerate()
            .filter(|(_, prefab)| !prefab.is_empty())
            .map(|(i, prefab)| ChunkPlacement {
                prefab: prefab.clone(),
                center_y: bottom_y + i as f32 * self.chunk_height + self.chunk_height / 2.0,
                height: self.chunk_height,
            })
            .collect();
        self.next_unit_y += self.sequence_height() + self.gap;

        Some(UnitPlacement {
            kind: UnitKind::Sequence,
            bottom_y,
            pieces,
        })
    }

    /// Whether a chunk with the given top edge has fallen far enough behind the camera.
    pub fn is_expired(&self, top_y: f32, viewport: &Viewport) -> bool {
        top_y < viewport.bottom() - self.trail_distance
    }

    /// Top edge used for chunks that carry no [`Bounds`].
    pub fn estimated_top(&self, center_y: f32) -> f32 {
        center_y + self.chunk_height / 2.0
    }

    pub fn track(&mut self, entity: Entity) {
        self.active.push(entity);
    }

    pub fn untrack(&mut self, entity: Entity) {
        self.active.retain(|e| *e != entity);
    }

    pub fn halt_spawning(&mut self) {
        self.halted = true;
    }

    /// Restarts the skyline from the configured start.
    ///
    /// Returns the previously spawned entities, which must be destroyed.
    pub fn resume_spawning(&mut self) -> Vec<Entity> {
        self.halted = false;
        self.next_unit_y = self.start_y;
        for entry in &mut self.specials {
            entry.spawned = false;
        }
        std::mem::take(&mut self.active)
    }
}

/// Places at most one skyline unit per tick and discards chunks left behind.
pub fn skyline_stream_system(
    mut commands: Commands,
    viewport: Res<Viewport>,
    mut stream: ResMut<SkylineStream>,
    chunks: Query<(Entity, &Position, Option<&Bounds>), With<Chunk>>,
) {
    if stream.disabled || viewport.invalid {
        return;
    }

    if let Some(unit) = stream.next_unit(&viewport) {
        let (chunk, landmark) = match &unit.kind {
            UnitKind::Sequence => (Chunk::Skyline, None),
            UnitKind::Special { name } => {
                info!(name = %name, y = unit.bottom_y, "Spawning special building");
                (Chunk::Special, Some(Landmark(name.clone())))
            }
        };
        debug!(y = unit.bottom_y, next = stream.next_unit_y(), "Spawned skyline unit");

        for piece in unit.pieces {
            let mut entity = commands.spawn((
                chunk,
                Position(Vec2::new(stream.x, piece.center_y)),
                Bounds::new(stream.width, piece.height),
                Renderable {
                    sprite: piece.prefab,
                    layer: 1,
                },
            ));
            if let Some(landmark) = &landmark {
                entity.insert(landmark.clone());
            }
            let id = entity.id();
            stream.track(id);
        }
    }

    let expired: SmallVec<[Entity; 4]> = stream
        .active_chunks()
        .iter()
        .filter_map(|&entity| {
            let (_, position, bounds) = chunks.get(entity).ok()?;
            let top = match bounds {
                Some(bounds) => bounds.top(position.0),
                None => stream.estimated_top(position.0.y),
            };
            stream.is_expired(top, &viewport).then_some(entity)
        })
        .collect();

    for entity in expired {
        trace!(?entity, "Despawning skyline chunk");
        stream.untrack(entity);
        commands.entity(entity).despawn();
    }
}

/// Applies halt/resume requests from the director.
pub fn skyline_control_system(
    mut commands: Commands,
    mut stream: ResMut<SkylineStream>,
    mut controls: EventReader<StreamControl>,
) {
    for control in controls.read() {
        match control {
            StreamControl::HaltSkyline => {
                debug!("Halting skyline");
                stream.halt_spawning();
            }
            StreamControl::ResumeSkyline => {
                let stale = stream.resume_spawning();
                debug!(destroyed = stale.len(), "Restarting skyline");
                for entity in stale {
                    commands.entity(entity).despawn();
                }
            }
            _ => {}
        }
    }
}
