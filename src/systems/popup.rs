//! Floating feedback shown where an item was clicked.

use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    system::{Query, Res},
};
use glam::Vec2;

use crate::constants::popup::{INFO_DRIFT_SPEED, INFO_FADE, INFO_LIFETIME, INFO_OFFSET, LIFETIME, RISE_SPEED};
use crate::systems::{DeltaTime, Position, TimeToLive};

/// What a popup is announcing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupStyle {
    Points(i32),
    BonusTime(f32),
}

/// RGB colour of popup text.
pub type Rgb = (u8, u8, u8);

const BONUS_PURPLE: Rgb = (0x44, 0x00, 0x77);
const GAIN_GREEN: Rgb = (0x00, 0x80, 0x00);
const LOSS_RED: Rgb = (0xff, 0x00, 0x00);
const INFO_WHITE: Rgb = (0xff, 0xff, 0xff);

impl PopupStyle {
    pub fn text(&self) -> String {
        match *self {
            PopupStyle::Points(points) if points > 0 => format!("+{points}"),
            PopupStyle::Points(points) => points.to_string(),
            PopupStyle::BonusTime(seconds) => format!("+{} sec", seconds.round() as i32),
        }
    }

    pub fn color(&self) -> Rgb {
        match *self {
            PopupStyle::Points(points) if points > 0 => GAIN_GREEN,
            PopupStyle::Points(_) => LOSS_RED,
            PopupStyle::BonusTime(_) => BONUS_PURPLE,
        }
    }
}

/// Text that drifts and fades out.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub text: String,
    pub color: Rgb,
    /// Opacity from 0.0 to 1.0.
    pub alpha: f32,
    /// Vertical speed in world units per second; negative sinks.
    pub velocity: f32,
    /// Seconds before expiry over which the text fades.
    pub fade: f32,
}

#[derive(Bundle)]
pub struct PopupBundle {
    pub popup: FloatingText,
    pub position: Position,
    pub ttl: TimeToLive,
}

impl FloatingText {
    pub fn bundle(style: PopupStyle, at: Vec2) -> PopupBundle {
        PopupBundle {
            popup: FloatingText {
                text: style.text(),
                color: style.color(),
                alpha: 1.0,
                velocity: RISE_SPEED,
                fade: LIFETIME,
            },
            position: Position(at),
            ttl: TimeToLive::new(LIFETIME),
        }
    }

    /// A note shown above a clicked kayak.
    pub fn info(message: &str, kayak_at: Vec2) -> PopupBundle {
        PopupBundle {
            popup: FloatingText {
                text: message.to_owned(),
                color: INFO_WHITE,
                alpha: 1.0,
                velocity: INFO_DRIFT_SPEED,
                fade: INFO_FADE,
            },
            position: Position(kayak_at + Vec2::new(0.0, INFO_OFFSET)),
            ttl: TimeToLive::new(INFO_LIFETIME),
        }
    }
}

pub fn popup_system(dt: Res<DeltaTime>, mut popups: Query<(&mut FloatingText, &mut Position, &TimeToLive)>) {
    for (mut popup, mut position, ttl) in popups.iter_mut() {
        position.0.y += popup.velocity * dt.seconds;
        popup.alpha = ttl.fade_out(popup.fade);
    }
}
