use bevy_ecs::prelude::*;
use glam::Vec2;
use strum_macros::{Display, EnumIter};

use crate::config::TutorialItem;

/// A zero-argument UI trigger, one per button in the game's panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum GameCommand {
    /// Title screen "Start": shows the tutorial intro.
    StartTutorial,
    /// Tutorial intro "Let's go!": starts tutorial gameplay.
    BeginTutorial,
    Trash,
    Keep,
    DismissWarning,
    StartRealGame,
    PlayAgain,
    ReplayTutorial,
    SkipTutorial,
    BackToTitle,
    ToggleMute,
    Exit,
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Command(GameCommand),
    /// A click or tap, already converted to world coordinates.
    Click(Vec2),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Emitted by the click handler when a pickable item reports to the director.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum PickupEvent {
    /// A tutorial shadow was clicked; carries its descriptor.
    Shadow(TutorialItem),
    /// A bonus-time item was clicked at the given world position.
    Bonus { at: Vec2 },
}

/// Requests from the director to the item spawner.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum SpawnerControl {
    StartTutorial(TutorialItem),
    Focus(TutorialItem),
    StartRealGame,
    Stop,
}

/// Requests from the director to the streaming generators and the camera.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum StreamControl {
    /// Moves the camera back to its configured start.
    ResetViewport,
    /// Rebuilds the river starting at the given world Y.
    ResetRiver(f32),
    HaltSkyline,
    ResumeSkyline,
    /// Despawns every live pickable item and popup.
    ClearItems,
}

/// Opaque scene loads handled by the host.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneRequest {
    Title,
}
