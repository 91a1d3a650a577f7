//! Keyboard bindings for the desktop shell.
//!
//! Every panel button has a key. Enter and Space press whichever button is the main one on
//! the panel currently shown.

use std::collections::HashMap;

use sdl2::keyboard::Keycode;

use crate::events::GameCommand;
use crate::systems::Phase;

#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<Keycode, GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Tutorial decisions
        key_bindings.insert(Keycode::T, GameCommand::Trash);
        key_bindings.insert(Keycode::Left, GameCommand::Trash);
        key_bindings.insert(Keycode::K, GameCommand::Keep);
        key_bindings.insert(Keycode::Right, GameCommand::Keep);
        key_bindings.insert(Keycode::Tab, GameCommand::SkipTutorial);

        // Game over
        key_bindings.insert(Keycode::R, GameCommand::ReplayTutorial);

        // Anywhere
        key_bindings.insert(Keycode::M, GameCommand::ToggleMute);
        key_bindings.insert(Keycode::Backspace, GameCommand::BackToTitle);
        key_bindings.insert(Keycode::Escape, GameCommand::Exit);
        key_bindings.insert(Keycode::Q, GameCommand::Exit);

        Self { key_bindings }
    }
}

impl Bindings {
    /// Resolves a key press in the given phase.
    pub fn command_for(&self, key: Keycode, phase: Phase) -> Option<GameCommand> {
        match key {
            Keycode::Return | Keycode::KpEnter | Keycode::Space => primary_command(phase),
            _ => self.key_bindings.get(&key).copied(),
        }
    }
}

/// The main button of the panel shown in `phase`, if any.
pub fn primary_command(phase: Phase) -> Option<GameCommand> {
    match phase {
        Phase::None => Some(GameCommand::StartTutorial),
        Phase::ShowingTutorialIntro => Some(GameCommand::BeginTutorial),
        Phase::ShowingWildlifeWarning | Phase::ShowingKeepTrashWarning => Some(GameCommand::DismissWarning),
        Phase::ShowingReadyToStart => Some(GameCommand::StartRealGame),
        Phase::GameOver => Some(GameCommand::PlayAgain),
        // The reveal panel has two equally weighted buttons
        Phase::ShowingItemReveal | Phase::TutorialPlaying | Phase::MainGamePlaying => None,
    }
}
