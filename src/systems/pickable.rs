//! Clickable items floating down the river.

use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use tracing::{debug, trace};

use crate::config::TutorialItem;
use crate::events::{GameEvent, PickupEvent, StreamControl};
use crate::systems::{
    director::{Director, Phase},
    popup::{FloatingText, PopupStyle},
    Bounds, Clock, Position, Renderable, ScoreLedger, TimeScale,
};

/// What a spawned item does when clicked.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum Pickable {
    /// Regular trash; clicking it scores points.
    Trash { points: i32 },
    /// Adds time to the countdown during the main game.
    Bonus,
    /// Something that belongs in the river; clicking it costs points.
    Protected { deduction: i32 },
    /// A not-yet-revealed tutorial item.
    TutorialShadow(TutorialItem),
    /// Shares the river; clicking it shows a safety note and leaves it in place.
    Kayak(KayakInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KayakInfo {
    pub message: String,
    /// Each kayak shows its note at most once.
    pub shown: bool,
}

impl KayakInfo {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            shown: false,
        }
    }
}

impl Pickable {
    /// The signed change to the score when this item is clicked.
    pub fn score_delta(&self) -> Option<i32> {
        match self {
            Pickable::Trash { points } => Some(*points),
            Pickable::Protected { deduction } => Some(-*deduction),
            Pickable::Bonus | Pickable::TutorialShadow(_) | Pickable::Kayak(_) => None,
        }
    }
}

#[derive(Bundle)]
pub struct PickableBundle {
    pub pickable: Pickable,
    pub position: Position,
    pub bounds: Bounds,
    pub sprite: Renderable,
}

/// Minimum interval between two accepted clicks, shared by every pickable item.
///
/// A single physical tap can arrive as several click events; only the first one counts.
#[derive(Resource, Debug, Clone)]
pub struct ClickCooldown {
    pub interval: f64,
    last_accepted: Option<f64>,
}

impl ClickCooldown {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval as f64,
            last_accepted: None,
        }
    }

    /// Records a click at `now` and returns whether it should be processed.
    pub fn try_accept(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_accepted {
            if now - last < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

/// Finds the topmost pickable under the given point; later spawns are drawn on top.
pub fn hit_test<'a>(items: impl Iterator<Item = (Entity, &'a Position, &'a Bounds)>, point: Vec2) -> Option<Entity> {
    items
        .filter(|(_, position, bounds)| bounds.contains(position.0, point))
        .max_by_key(|(entity, _, _)| *entity)
        .map(|(entity, _, _)| entity)
}

/// Resolves clicks against pickable items and applies their effects.
#[allow(clippy::too_many_arguments)]
pub fn click_system(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut pickups: EventWriter<PickupEvent>,
    mut cooldown: ResMut<ClickCooldown>,
    mut score: ResMut<ScoreLedger>,
    clock: Res<Clock>,
    time_scale: Res<TimeScale>,
    director: Option<Res<Director>>,
    mut items: Query<(Entity, &mut Pickable, &Position, &Bounds)>,
) {
    for event in events.read() {
        let GameEvent::Click(point) = *event else {
            continue;
        };

        // A panel covers the river while the world is paused.
        if time_scale.is_paused() {
            trace!(?point, "Click ignored while paused");
            continue;
        }

        let Some(target) = hit_test(items.iter().map(|(e, _, p, b)| (e, p, b)), point) else {
            continue;
        };

        if !cooldown.try_accept(clock.unscaled) {
            debug!(?target, "Click dropped by cooldown");
            continue;
        }

        let Ok((entity, mut pickable, position, _)) = items.get_mut(target) else {
            continue;
        };

        debug!(?entity, ?pickable, "Item clicked");
        let delta = pickable.score_delta();
        match &mut *pickable {
            Pickable::Trash { .. } | Pickable::Protected { .. } => {
                if let Some(delta) = delta {
                    score.add_score(delta);
                    commands.spawn(FloatingText::bundle(PopupStyle::Points(delta), position.0));
                }
            }
            Pickable::Bonus => {
                pickups.write(PickupEvent::Bonus { at: position.0 });
            }
            Pickable::TutorialShadow(item) => {
                pickups.write(PickupEvent::Shadow(item.clone()));
            }
            Pickable::Kayak(kayak) => {
                let in_main_game = director
                    .as_ref()
                    .is_some_and(|d| d.phase() == Phase::MainGamePlaying);
                if !in_main_game {
                    debug!(?entity, "Kayak click ignored outside the main game");
                } else if kayak.shown {
                    trace!(?entity, "Kayak note already shown");
                } else {
                    kayak.shown = true;
                    commands.spawn(FloatingText::info(&kayak.message, position.0));
                }
                continue;
            }
        }

        commands.entity(entity).despawn();
    }
}

/// Despawns every live item when the director clears the river.
pub fn clear_items_system(
    mut commands: Commands,
    mut controls: EventReader<StreamControl>,
    items: Query<Entity, With<Pickable>>,
    popups: Query<Entity, With<FloatingText>>,
) {
    let requests = controls.read().filter(|c| matches!(c, StreamControl::ClearItems)).count();
    if requests == 0 {
        return;
    }

    let mut count = 0;
    for entity in items.iter().chain(popups.iter()) {
        commands.entity(entity).despawn();
        count += 1;
    }
    debug!(count, "Cleared items");
}
