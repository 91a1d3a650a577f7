use bevy_ecs::{resource::Resource, world::World};
use tracing::{debug, trace, warn};

/// The running score and its display text.
///
/// Every change goes through [`ScoreLedger::add_score`] or [`ScoreLedger::reset_score`], which
/// keep the display text in sync.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    total: i32,
    display: String,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        let mut ledger = Self {
            total: 0,
            display: String::new(),
        };
        ledger.refresh_display();
        ledger
    }
}

impl ScoreLedger {
    /// Adds a signed delta; there is no floor.
    pub fn add_score(&mut self, delta: i32) {
        self.total += delta;
        trace!(delta, total = self.total, "Score changed");
        self.refresh_display();
    }

    pub fn reset_score(&mut self) {
        self.total = 0;
        self.refresh_display();
        debug!("Score has been reset to 0");
    }

    pub fn current_score(&self) -> i32 {
        self.total
    }

    /// The text shown on the score label.
    pub fn display(&self) -> &str {
        &self.display
    }

    fn refresh_display(&mut self) {
        self.display = format!("Score: {}", self.total);
    }

    /// Installs a fresh ledger into the world. A world only ever holds one; a second install is
    /// discarded and the existing ledger is kept.
    ///
    /// Returns whether the ledger was installed.
    pub fn install(world: &mut World) -> bool {
        if world.contains_resource::<ScoreLedger>() {
            warn!("Duplicate score ledger found. Discarding this one.");
            return false;
        }
        world.insert_resource(ScoreLedger::default());
        true
    }
}
