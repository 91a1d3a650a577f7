//! Startup configuration.
//!
//! Every tunable the game reads is collected in [`GameConfig`]. Values start from the
//! compiled-in defaults in [`constants`](crate::constants) and may be overridden by
//! environment variables, e.g. `RIVER_DIRECTOR__GAME_TIME_LIMIT=90`. The configuration is
//! immutable once the [`Game`](crate::game::Game) has been built.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{self, CONFIG_ENV_PREFIX};
use crate::error::ConfigError;

/// Main game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the game's random number generator; `None` seeds from the thread RNG.
    pub seed: Option<u64>,
    pub viewport: ViewportConfig,
    pub river: RiverConfig,
    pub skyline: SkylineConfig,
    pub spawner: SpawnerConfig,
    pub director: DirectorConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub orthographic_size: f32,
    pub aspect: f32,
    pub start_y: f32,
    pub scroll_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    /// Chunk prefabs; one is picked uniformly at random per spawn.
    pub prefabs: Vec<String>,
    pub chunk_height: f32,
    pub lookahead: f32,
    pub trail_distance: f32,
}

/// A one-off building placed once the camera reaches `trigger_y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialBuilding {
    pub name: String,
    pub prefab: String,
    pub height: f32,
    pub trigger_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkylineConfig {
    /// Prefabs stacked bottom to top as one sequence.
    pub sequence: Vec<String>,
    pub chunk_height: f32,
    /// Vertical distance between the end of one unit and the start of the next.
    pub gap: f32,
    /// World Y of the bottom of the first unit.
    pub start_y: f32,
    /// Distance ahead of the viewport top at which the next unit is placed; defaults to one chunk.
    pub lookahead: Option<f32>,
    pub trail_distance: f32,
    /// Horizontal placement of the column.
    pub x: f32,
    pub width: f32,
    pub specials: Vec<SpecialBuilding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub trash_prefabs: Vec<String>,
    pub bonus_prefab: Option<String>,
    pub penalty_prefabs: Vec<String>,
    /// Kayaks drift by on their own interval and carry a one-time safety note.
    pub kayak_prefab: Option<String>,
    pub kayak_message: String,

    pub trash_points: i32,
    pub bonus_interval: f32,
    pub penalty_interval: f32,
    pub penalty_deduction: i32,
    pub kayak_interval: f32,

    pub area_min_x: f32,
    pub area_max_x: f32,
    pub area_min_y: f32,
    pub area_max_y: f32,

    pub min_delay: f32,
    pub max_delay: f32,
    pub initial_delay: f32,

    pub item_half_size: f32,
}

/// Static authored data describing one tutorial item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialItem {
    pub name: String,
    pub description: String,
    pub shadow_sprite: String,
    pub revealed_sprite: String,
    /// Wildlife must be kept; everything else must be trashed.
    pub wildlife: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    pub tutorial_items: Vec<TutorialItem>,
    pub tutorial_items_to_complete: u32,
    pub game_time_limit: f32,
    pub bonus_time: f32,
    pub inactivity_timeout: f32,
    pub click_cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub game_over_track_length: f32,
    pub start_muted: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            viewport: ViewportConfig::default(),
            river: RiverConfig::default(),
            skyline: SkylineConfig::default(),
            spawner: SpawnerConfig::default(),
            director: DirectorConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            orthographic_size: constants::viewport::ORTHOGRAPHIC_SIZE,
            aspect: constants::viewport::ASPECT,
            start_y: constants::viewport::START_Y,
            scroll_speed: constants::viewport::SCROLL_SPEED,
        }
    }
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            prefabs: vec!["river/plain".into(), "river/reeds".into(), "river/bridge".into()],
            chunk_height: constants::river::CHUNK_HEIGHT,
            lookahead: constants::river::LOOKAHEAD,
            trail_distance: constants::river::TRAIL_DISTANCE,
        }
    }
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            sequence: vec![
                "skyline/base".into(),
                "skyline/middle".into(),
                "skyline/crown".into(),
            ],
            chunk_height: constants::skyline::CHUNK_HEIGHT,
            gap: constants::skyline::GAP,
            start_y: constants::skyline::START_Y,
            lookahead: None,
            trail_distance: constants::skyline::TRAIL_DISTANCE,
            x: constants::skyline::X,
            width: constants::skyline::WIDTH,
            specials: vec![
                SpecialBuilding {
                    name: "Merchandise Mart".into(),
                    prefab: "special/merchandise_mart".into(),
                    height: 45.0,
                    trigger_y: 150.0,
                },
                SpecialBuilding {
                    name: "Marina Towers".into(),
                    prefab: "special/marina_towers".into(),
                    height: 60.0,
                    trigger_y: 400.0,
                },
            ],
        }
    }
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            trash_prefabs: vec![
                "trash/bottle".into(),
                "trash/can".into(),
                "trash/bag".into(),
                "trash/cup".into(),
            ],
            bonus_prefab: Some("bonus/bike".into()),
            penalty_prefabs: vec!["good/duck".into(), "good/goose".into()],
            kayak_prefab: Some("good/kayak".into()),
            kayak_message: "Kayakers share the river with us. Give them plenty of room!".into(),
            trash_points: constants::spawner::TRASH_POINTS,
            bonus_interval: constants::spawner::BONUS_INTERVAL,
            penalty_interval: constants::spawner::PENALTY_INTERVAL,
            penalty_deduction: constants::spawner::PENALTY_DEDUCTION,
            kayak_interval: constants::spawner::KAYAK_INTERVAL,
            area_min_x: constants::spawner::AREA_MIN_X,
            area_max_x: constants::spawner::AREA_MAX_X,
            area_min_y: constants::spawner::AREA_MIN_Y,
            area_max_y: constants::spawner::AREA_MAX_Y,
            min_delay: constants::spawner::MIN_DELAY,
            max_delay: constants::spawner::MAX_DELAY,
            initial_delay: constants::spawner::INITIAL_DELAY,
            item_half_size: constants::spawner::ITEM_HALF_SIZE,
        }
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            tutorial_items: default_tutorial_items(),
            tutorial_items_to_complete: constants::director::TUTORIAL_ITEMS_TO_COMPLETE,
            game_time_limit: constants::director::GAME_TIME_LIMIT,
            bonus_time: constants::director::BONUS_TIME,
            inactivity_timeout: constants::director::INACTIVITY_TIMEOUT,
            click_cooldown: constants::director::CLICK_COOLDOWN,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            game_over_track_length: constants::audio::GAME_OVER_TRACK_LENGTH,
            start_muted: false,
        }
    }
}

fn tutorial_item(name: &str, description: &str, sprite: &str, wildlife: bool) -> TutorialItem {
    TutorialItem {
        name: name.into(),
        description: description.into(),
        shadow_sprite: format!("tutorial/{sprite}_shadow"),
        revealed_sprite: format!("tutorial/{sprite}"),
        wildlife,
    }
}

fn default_tutorial_items() -> Vec<TutorialItem> {
    vec![
        tutorial_item(
            "Plastic Bottle",
            "Single-use bottles break down into microplastics that fish mistake for food.",
            "bottle",
            false,
        ),
        tutorial_item(
            "Painted Turtle",
            "Turtles bask on floating logs along the river. Leave them be!",
            "turtle",
            true,
        ),
        tutorial_item(
            "Shopping Cart",
            "Abandoned carts snag debris and block the current.",
            "cart",
            false,
        ),
        tutorial_item(
            "Beaver",
            "Beavers have returned to the river after more than a century away.",
            "beaver",
            true,
        ),
        tutorial_item(
            "Coffee Cup",
            "Paper cups are lined with plastic and cannot be recycled in most cities.",
            "cup",
            false,
        ),
        tutorial_item(
            "Black-crowned Night Heron",
            "This heron hunts along the banks at dusk.",
            "heron",
            true,
        ),
    ]
}

fn positive(component: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { component, field, value })
    }
}

fn non_negative(component: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { component, field, value })
    }
}

fn ordered(component: &'static str, field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { component, field, min, max })
    }
}

impl GameConfig {
    /// Loads the configuration: compiled-in defaults overlaid with `RIVER_`-prefixed
    /// environment variables (nested keys separated by `__`).
    pub fn load() -> Result<Self, ConfigError> {
        let config: GameConfig = Figment::from(Serialized::defaults(GameConfig::default()))
            .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
            .extract()?;
        debug!(seed = ?config.seed, "Configuration loaded");
        Ok(config)
    }

    /// Returns every problem found in the configuration.
    ///
    /// Problems are not fatal: each component checks its own section on construction and
    /// disables itself when it cannot work.
    pub fn validate(&self) -> Vec<ConfigError> {
        [
            self.viewport.validate(),
            self.river.validate(),
            self.skyline.validate(),
            self.spawner.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .chain(self.director.problems())
        .collect()
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("Viewport", "orthographic_size", self.orthographic_size)?;
        positive("Viewport", "aspect", self.aspect)?;
        non_negative("Viewport", "scroll_speed", self.scroll_speed)
    }
}

impl RiverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefabs.iter().all(|p| p.is_empty()) {
            return Err(ConfigError::Missing {
                component: "RiverStream",
                what: "chunk prefab",
            });
        }
        positive("RiverStream", "chunk_height", self.chunk_height)?;
        non_negative("RiverStream", "lookahead", self.lookahead)?;
        non_negative("RiverStream", "trail_distance", self.trail_distance)
    }
}

impl SkylineConfig {
    /// The distance ahead of the viewport top at which units are placed.
    pub fn effective_lookahead(&self) -> f32 {
        self.lookahead.unwrap_or(self.chunk_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence.is_empty() && self.specials.is_empty() {
            return Err(ConfigError::Missing {
                component: "SkylineStream",
                what: "sequence prefab or special building",
            });
        }
        positive("SkylineStream", "chunk_height", self.chunk_height)?;
        non_negative("SkylineStream", "gap", self.gap)?;
        non_negative("SkylineStream", "lookahead", self.effective_lookahead())?;
        for special in &self.specials {
            if special.prefab.is_empty() {
                return Err(ConfigError::Missing {
                    component: "SkylineStream",
                    what: "special building prefab",
                });
            }
            positive("SkylineStream", "special height", special.height)?;
        }
        Ok(())
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trash_prefabs.is_empty() && self.bonus_prefab.is_none() {
            return Err(ConfigError::Missing {
                component: "ItemSpawner",
                what: "trash prefab or bonus prefab",
            });
        }
        ordered("ItemSpawner", "area x", self.area_min_x, self.area_max_x)?;
        ordered("ItemSpawner", "area y", self.area_min_y, self.area_max_y)?;
        ordered("ItemSpawner", "spawn delay", self.min_delay, self.max_delay)?;
        non_negative("ItemSpawner", "min_delay", self.min_delay)?;
        non_negative("ItemSpawner", "initial_delay", self.initial_delay)?;
        positive("ItemSpawner", "bonus_interval", self.bonus_interval)?;
        positive("ItemSpawner", "penalty_interval", self.penalty_interval)?;
        positive("ItemSpawner", "kayak_interval", self.kayak_interval)?;
        positive("ItemSpawner", "item_half_size", self.item_half_size)
    }
}

impl DirectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Every problem in this section. Unlike the other sections, each field is checked on its own
    /// because the director falls back per field rather than disabling itself.
    pub fn problems(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        if self.tutorial_items.is_empty() && self.tutorial_items_to_complete > 0 {
            problems.push(ConfigError::Missing {
                component: "Director",
                what: "tutorial item",
            });
        }
        problems.extend(
            [
                positive("Director", "game_time_limit", self.game_time_limit),
                non_negative("Director", "bonus_time", self.bonus_time),
                positive("Director", "inactivity_timeout", self.inactivity_timeout),
                non_negative("Director", "click_cooldown", self.click_cooldown),
            ]
            .into_iter()
            .filter_map(Result::err),
        );
        problems
    }
}
