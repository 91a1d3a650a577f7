//! The tutorial and main-game flow.
//!
//! The [`Director`] owns the current [`Phase`]. Everything else follows from it: which
//! streaming systems run, the world time scale, and which panel the host shows. The
//! director never touches other components directly; each transition produces a list of
//! [`Directive`]s that the [`Outbox`] turns into events for the owning systems.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Commands, Res, ResMut, SystemParam},
};
use bitflags::bitflags;
use glam::Vec2;
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};
use tracing::{debug, error, info, trace, warn};

use crate::config::{DirectorConfig, TutorialItem};
use crate::constants;
use crate::events::{GameCommand, GameEvent, PickupEvent, SceneRequest, SpawnerControl, StreamControl};
use crate::systems::{
    audio::AudioEvent,
    popup::{FloatingText, PopupStyle},
    DeltaTime, GlobalState, ScoreLedger, TimeScale,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Phase {
    /// The title screen.
    None,
    ShowingTutorialIntro,
    TutorialPlaying,
    /// A tutorial item was clicked; waiting for a trash/keep decision.
    ShowingItemReveal,
    /// The player trashed wildlife.
    ShowingWildlifeWarning,
    /// The player kept trash.
    ShowingKeepTrashWarning,
    ShowingReadyToStart,
    MainGamePlaying,
    GameOver,
}

bitflags! {
    /// The components allowed to tick in a phase.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ActiveSystems: u8 {
        const SCROLL = 1 << 0;
        const RIVER = 1 << 1;
        const SKYLINE = 1 << 2;
        const SPAWNER = 1 << 3;
        const COUNTDOWN = 1 << 4;
    }
}

/// The full-screen panel shown over the river.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Panel {
    Title,
    TutorialIntro,
    ItemReveal,
    WildlifeWarning,
    KeepTrashWarning,
    ReadyToStart,
    GameOver,
}

impl Phase {
    pub fn active_systems(self) -> ActiveSystems {
        let backdrop = ActiveSystems::SCROLL | ActiveSystems::RIVER | ActiveSystems::SKYLINE;
        match self {
            Phase::None | Phase::ShowingTutorialIntro | Phase::GameOver => ActiveSystems::empty(),
            // Panels during the tutorial keep everything enabled; the time scale freezes it
            Phase::TutorialPlaying
            | Phase::ShowingItemReveal
            | Phase::ShowingWildlifeWarning
            | Phase::ShowingKeepTrashWarning => backdrop | ActiveSystems::SPAWNER,
            Phase::ShowingReadyToStart => backdrop,
            Phase::MainGamePlaying => backdrop | ActiveSystems::SPAWNER | ActiveSystems::COUNTDOWN,
        }
    }

    /// World time multiplier: panels freeze the world, active play runs it.
    pub fn time_scale(self) -> f32 {
        match self {
            Phase::TutorialPlaying | Phase::MainGamePlaying => 1.0,
            _ => 0.0,
        }
    }

    pub fn panel(self) -> Option<Panel> {
        match self {
            Phase::None => Some(Panel::Title),
            Phase::ShowingTutorialIntro => Some(Panel::TutorialIntro),
            Phase::TutorialPlaying | Phase::MainGamePlaying => None,
            Phase::ShowingItemReveal => Some(Panel::ItemReveal),
            Phase::ShowingWildlifeWarning => Some(Panel::WildlifeWarning),
            Phase::ShowingKeepTrashWarning => Some(Panel::KeepTrashWarning),
            Phase::ShowingReadyToStart => Some(Panel::ReadyToStart),
            Phase::GameOver => Some(Panel::GameOver),
        }
    }

    /// Whether the inactivity watchdog counts idle time in this phase.
    pub fn is_watched(self) -> bool {
        !matches!(self, Phase::None | Phase::ShowingTutorialIntro)
    }
}

/// A side effect of a transition, addressed to the component that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Spawner(SpawnerControl),
    Stream(StreamControl),
    Audio(AudioEvent),
    Scene(SceneRequest),
    ResetScore,
    Popup(PopupStyle, Vec2),
    Exit,
}

pub type Directives = SmallVec<[Directive; 6]>;

#[derive(Resource, Debug)]
pub struct Director {
    config: DirectorConfig,
    phase: Phase,
    processed: u32,
    revealed: Option<TutorialItem>,
    time_remaining: f32,
    idle: f32,
    final_score: Option<i32>,
    /// Idle seconds before returning to the title; `None` turns the watchdog off.
    inactivity_timeout: Option<f32>,
    /// Where the river restarts after a replay: the bottom of the camera at its start.
    river_reset_y: f32,
}

impl Director {
    pub fn new(config: &DirectorConfig, river_reset_y: f32) -> Self {
        for problem in config.problems() {
            error!("{problem}");
        }

        let mut config = config.clone();
        if config.game_time_limit <= 0.0 || config.game_time_limit.is_nan() {
            error!(
                fallback = constants::director::GAME_TIME_LIMIT,
                "Director: invalid game time limit, using the default"
            );
            config.game_time_limit = constants::director::GAME_TIME_LIMIT;
        }
        if config.bonus_time < 0.0 || config.bonus_time.is_nan() {
            error!("Director: negative bonus time, bonus items will not add time");
            config.bonus_time = 0.0;
        }
        let inactivity_timeout = if config.inactivity_timeout > 0.0 {
            Some(config.inactivity_timeout)
        } else {
            error!("Director: invalid inactivity timeout, the watchdog is disabled");
            None
        };

        Self {
            time_remaining: config.game_time_limit,
            config,
            phase: Phase::None,
            processed: 0,
            revealed: None,
            idle: 0.0,
            final_score: None,
            inactivity_timeout,
            river_reset_y,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of tutorial items disposed of correctly.
    pub fn processed(&self) -> u32 {
        self.processed
    }

    pub fn items_to_complete(&self) -> u32 {
        self.config.tutorial_items_to_complete
    }

    /// The tutorial item on the reveal panel.
    pub fn revealed(&self) -> Option<&TutorialItem> {
        self.revealed.as_ref()
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn final_score(&self) -> Option<i32> {
        self.final_score
    }

    pub fn idle_time(&self) -> f32 {
        self.idle
    }

    /// The item the tutorial is currently asking the player to find.
    pub fn focus_item(&self) -> Option<&TutorialItem> {
        let items = &self.config.tutorial_items;
        if items.is_empty() {
            return None;
        }
        items.get(self.processed as usize % items.len())
    }

    fn enter(&mut self, phase: Phase) {
        info!(from = %self.phase, to = %phase, "Phase changed");
        self.phase = phase;
    }

    fn reset_world(&self) -> Directives {
        SmallVec::from_iter([
            Directive::Stream(StreamControl::ResetViewport),
            Directive::Stream(StreamControl::ResetRiver(self.river_reset_y)),
            Directive::Stream(StreamControl::ResumeSkyline),
            Directive::Stream(StreamControl::ClearItems),
            Directive::Audio(AudioEvent::PlayPrimary),
        ])
    }

    fn enter_ready_to_start(&mut self) -> Directives {
        self.enter(Phase::ShowingReadyToStart);
        self.revealed = None;
        SmallVec::from_iter([Directive::Spawner(SpawnerControl::Stop)])
    }

    fn begin_tutorial(&mut self) -> Directives {
        self.processed = 0;
        self.revealed = None;

        if self.config.tutorial_items_to_complete == 0 {
            debug!("No tutorial items to complete");
            let mut directives = self.enter_ready_to_start();
            directives.insert(0, Directive::ResetScore);
            return directives;
        }

        let Some(focus) = self.focus_item().cloned() else {
            error!("Director: no tutorial items configured. Skipping the tutorial.");
            let mut directives = self.enter_ready_to_start();
            directives.insert(0, Directive::ResetScore);
            return directives;
        };

        self.enter(Phase::TutorialPlaying);
        SmallVec::from_iter([
            Directive::ResetScore,
            Directive::Spawner(SpawnerControl::StartTutorial(focus)),
        ])
    }

    fn decide(&mut self, keep: bool) -> Directives {
        let Some(item) = self.revealed.clone() else {
            warn!("Decision made with no revealed item");
            return SmallVec::new();
        };

        if item.wildlife != keep {
            let warning = if item.wildlife {
                Phase::ShowingWildlifeWarning
            } else {
                Phase::ShowingKeepTrashWarning
            };
            debug!(item = %item.name, keep, "Wrong decision");
            self.enter(warning);
            return SmallVec::new();
        }

        self.processed += 1;
        debug!(item = %item.name, processed = self.processed, "Correct decision");

        if self.processed >= self.config.tutorial_items_to_complete {
            return self.enter_ready_to_start();
        }

        self.revealed = None;
        self.enter(Phase::TutorialPlaying);
        match self.focus_item().cloned() {
            Some(next) => SmallVec::from_iter([Directive::Spawner(SpawnerControl::Focus(next))]),
            None => SmallVec::new(),
        }
    }

    /// Returns to the title screen, from any phase.
    pub fn back_to_title(&mut self) -> Directives {
        self.enter(Phase::None);
        self.processed = 0;
        self.revealed = None;
        self.final_score = None;
        self.idle = 0.0;
        SmallVec::from_iter([
            Directive::Spawner(SpawnerControl::Stop),
            Directive::Stream(StreamControl::ClearItems),
            Directive::Audio(AudioEvent::PlayPrimary),
            Directive::Scene(SceneRequest::Title),
        ])
    }

    /// Applies a UI command. Commands that make no sense in the current phase are ignored.
    pub fn handle_command(&mut self, command: GameCommand) -> Directives {
        use GameCommand::*;

        match (command, self.phase) {
            (ToggleMute, _) => SmallVec::from_iter([Directive::Audio(AudioEvent::ToggleMute)]),
            (Exit, _) => SmallVec::from_iter([Directive::Exit]),
            (StartTutorial, Phase::None) => {
                self.enter(Phase::ShowingTutorialIntro);
                SmallVec::new()
            }
            (BeginTutorial, Phase::ShowingTutorialIntro) => self.begin_tutorial(),
            (Trash, Phase::ShowingItemReveal) => self.decide(false),
            (Keep, Phase::ShowingItemReveal) => self.decide(true),
            (DismissWarning, Phase::ShowingWildlifeWarning | Phase::ShowingKeepTrashWarning) => {
                self.enter(Phase::ShowingItemReveal);
                SmallVec::new()
            }
            (SkipTutorial, Phase::TutorialPlaying) => {
                info!(processed = self.processed, "Tutorial skipped");
                self.enter_ready_to_start()
            }
            (StartRealGame, Phase::ShowingReadyToStart) => {
                self.time_remaining = self.config.game_time_limit;
                self.final_score = None;
                self.enter(Phase::MainGamePlaying);
                SmallVec::from_iter([
                    Directive::ResetScore,
                    Directive::Spawner(SpawnerControl::StartRealGame),
                ])
            }
            (PlayAgain, Phase::GameOver) => {
                self.final_score = None;
                self.enter(Phase::ShowingReadyToStart);
                self.reset_world()
            }
            (ReplayTutorial, Phase::GameOver) => {
                self.final_score = None;
                self.processed = 0;
                self.revealed = None;
                self.enter(Phase::ShowingTutorialIntro);
                self.reset_world()
            }
            (BackToTitle, phase) if phase != Phase::None => self.back_to_title(),
            (command, phase) => {
                debug!(%command, %phase, "Command ignored in this phase");
                SmallVec::new()
            }
        }
    }

    /// A tutorial shadow was clicked: pause and reveal it.
    pub fn shadow_clicked(&mut self, item: TutorialItem) -> Directives {
        if self.phase != Phase::TutorialPlaying {
            debug!(item = %item.name, phase = %self.phase, "Shadow click ignored");
            return SmallVec::new();
        }
        info!(item = %item.name, "Revealing tutorial item");
        self.revealed = Some(item);
        self.enter(Phase::ShowingItemReveal);
        SmallVec::new()
    }

    /// A bonus item was clicked. Only the main game's countdown can be extended.
    pub fn bonus_clicked(&mut self, at: Vec2) -> Directives {
        if self.phase != Phase::MainGamePlaying {
            debug!(phase = %self.phase, "Bonus click ignored outside the main game");
            return SmallVec::new();
        }
        self.time_remaining += self.config.bonus_time;
        debug!(bonus = self.config.bonus_time, remaining = self.time_remaining, "Bonus time added");
        SmallVec::from_iter([Directive::Popup(PopupStyle::BonusTime(self.config.bonus_time), at)])
    }

    /// Advances the countdown, ending the game when it runs out.
    pub fn tick_countdown(&mut self, dt: f32, score: i32) -> Directives {
        if self.phase != Phase::MainGamePlaying {
            return SmallVec::new();
        }
        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            self.time_remaining = 0.0;
            return self.game_over(score);
        }
        SmallVec::new()
    }

    /// Ends the main game. Calling this again once the game is over does nothing.
    pub fn game_over(&mut self, score: i32) -> Directives {
        if self.phase == Phase::GameOver {
            return SmallVec::new();
        }
        info!(score, "Game over");
        self.final_score = Some(score);
        self.enter(Phase::GameOver);
        SmallVec::from_iter([
            Directive::Spawner(SpawnerControl::Stop),
            Directive::Stream(StreamControl::HaltSkyline),
            Directive::Audio(AudioEvent::PlayGameOver),
        ])
    }

    pub fn note_input(&mut self) {
        self.idle = 0.0;
    }

    /// Counts unscaled idle time, returning to the title once it exceeds the timeout.
    pub fn tick_watchdog(&mut self, unscaled_dt: f32) -> Directives {
        let Some(timeout) = self.inactivity_timeout else {
            return SmallVec::new();
        };
        if !self.phase.is_watched() {
            self.idle = 0.0;
            return SmallVec::new();
        }
        self.idle += unscaled_dt;
        if self.idle >= timeout {
            info!(idle = self.idle, "Inactivity timeout reached, returning to title");
            return self.back_to_title();
        }
        SmallVec::new()
    }
}

/// Run condition: true while the current phase lets the tagged component tick.
pub fn phase_allows(tag: ActiveSystems) -> impl FnMut(Option<Res<Director>>) -> bool + Clone {
    move |director: Option<Res<Director>>| director.is_some_and(|d| d.phase().active_systems().contains(tag))
}

/// Delivers directives to the components that own them.
#[derive(SystemParam)]
pub struct Outbox<'w, 's> {
    commands: Commands<'w, 's>,
    spawner: EventWriter<'w, SpawnerControl>,
    streams: EventWriter<'w, StreamControl>,
    audio: EventWriter<'w, AudioEvent>,
    scenes: EventWriter<'w, SceneRequest>,
    score: ResMut<'w, ScoreLedger>,
    state: ResMut<'w, GlobalState>,
    time_scale: ResMut<'w, TimeScale>,
}

impl Outbox<'_, '_> {
    pub fn score(&self) -> i32 {
        self.score.current_score()
    }

    pub fn dispatch(&mut self, directives: Directives) {
        for directive in directives {
            trace!(?directive, "Dispatching");
            match directive {
                Directive::Spawner(control) => {
                    self.spawner.write(control);
                }
                Directive::Stream(control) => {
                    self.streams.write(control);
                }
                Directive::Audio(event) => {
                    self.audio.write(event);
                }
                Directive::Scene(request) => {
                    self.scenes.write(request);
                }
                Directive::ResetScore => self.score.reset_score(),
                Directive::Popup(style, at) => {
                    self.commands.spawn(FloatingText::bundle(style, at));
                }
                Directive::Exit => self.state.exit = true,
            }
        }
    }

    /// Applies the time scale of the given phase.
    pub fn sync_time_scale(&mut self, phase: Phase) {
        let scale = phase.time_scale();
        if self.time_scale.0 != scale {
            debug!(scale, "Time scale changed");
            self.time_scale.0 = scale;
        }
    }
}

/// Feeds UI commands, pickups and elapsed time to the director.
pub fn director_system(
    dt: Res<DeltaTime>,
    mut events: EventReader<GameEvent>,
    mut pickups: EventReader<PickupEvent>,
    mut director: ResMut<Director>,
    mut outbox: Outbox,
) {
    for event in events.read() {
        director.note_input();
        if let GameEvent::Command(command) = *event {
            let directives = director.handle_command(command);
            outbox.dispatch(directives);
        }
    }

    for pickup in pickups.read() {
        let directives = match pickup {
            PickupEvent::Shadow(item) => director.shadow_clicked(item.clone()),
            PickupEvent::Bonus { at } => director.bonus_clicked(*at),
        };
        outbox.dispatch(directives);
    }

    let directives = director.tick_watchdog(dt.unscaled);
    outbox.dispatch(directives);

    let phase = director.phase();
    outbox.sync_time_scale(phase);
}

/// Runs the main game's countdown.
pub fn countdown_system(dt: Res<DeltaTime>, mut director: ResMut<Director>, mut outbox: Outbox) {
    let score = outbox.score();
    let directives = director.tick_countdown(dt.seconds, score);
    outbox.dispatch(directives);

    let phase = director.phase();
    outbox.sync_time_scale(phase);
}
