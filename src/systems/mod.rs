//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod audio;
pub mod components;
pub mod director;
pub mod lifetime;
pub mod pickable;
pub mod popup;
pub mod river;
pub mod score;
pub mod skyline;
pub mod spawner;
pub mod viewport;

pub use self::audio::{AudioEvent, MusicState, Track};
pub use self::components::*;
pub use self::director::{ActiveSystems, Director, Panel, Phase};
pub use self::lifetime::TimeToLive;
pub use self::pickable::{ClickCooldown, Pickable};
pub use self::popup::FloatingText;
pub use self::river::RiverStream;
pub use self::score::ScoreLedger;
pub use self::skyline::{Landmark, SkylineStream};
pub use self::spawner::ItemSpawner;
pub use self::viewport::Viewport;
