use figment::Jail;
use pretty_assertions::assert_eq;
use river_sweep::{
    config::{DirectorConfig, GameConfig, RiverConfig, SpawnerConfig},
    error::ConfigError,
};
use speculoos::prelude::*;

#[test]
fn test_defaults_are_valid() {
    assert_that(&GameConfig::default().validate()).is_empty();
}

#[test]
fn test_problems_are_collected_per_section() {
    let config = GameConfig {
        river: RiverConfig {
            chunk_height: -1.0,
            ..RiverConfig::default()
        },
        spawner: SpawnerConfig {
            area_min_x: 5.0,
            area_max_x: -5.0,
            ..SpawnerConfig::default()
        },
        director: DirectorConfig {
            tutorial_items: vec![],
            ..DirectorConfig::default()
        },
        ..GameConfig::default()
    };

    let problems = config.validate();

    assert_eq!(problems.len(), 3);
    assert!(matches!(
        problems[0],
        ConfigError::NonPositive {
            field: "chunk_height",
            ..
        }
    ));
    assert!(matches!(problems[1], ConfigError::InvertedRange { field: "area x", .. }));
    assert!(matches!(problems[2], ConfigError::Missing { component: "Director", .. }));
}

#[test]
fn test_director_reports_every_bad_field() {
    let config = DirectorConfig {
        tutorial_items: vec![],
        game_time_limit: 0.0,
        inactivity_timeout: -1.0,
        ..DirectorConfig::default()
    };

    let problems = config.problems();

    assert_eq!(problems.len(), 3);
    assert!(matches!(problems[0], ConfigError::Missing { component: "Director", .. }));
    assert!(matches!(
        problems[1],
        ConfigError::NonPositive {
            field: "game_time_limit",
            ..
        }
    ));
    assert!(matches!(
        problems[2],
        ConfigError::NonPositive {
            field: "inactivity_timeout",
            ..
        }
    ));
    assert_that(&GameConfig { director: config, ..GameConfig::default() }.validate()).has_length(3);
}

#[test]
fn test_empty_tutorial_is_fine_when_nothing_to_complete() {
    let config = DirectorConfig {
        tutorial_items: vec![],
        tutorial_items_to_complete: 0,
        ..DirectorConfig::default()
    };

    assert_that(&config.validate().is_ok()).is_true();
}

#[test]
fn test_environment_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("RIVER_SEED", "42");
        jail.set_env("RIVER_DIRECTOR__GAME_TIME_LIMIT", "90");

        let config = GameConfig::load().map_err(|e| e.to_string())?;

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.director.game_time_limit, 90.0);
        assert_eq!(config.director.bonus_time, DirectorConfig::default().bonus_time);
        Ok(())
    });
}

#[test]
fn test_malformed_environment_fails_to_load() {
    Jail::expect_with(|jail| {
        jail.set_env("RIVER_DIRECTOR__GAME_TIME_LIMIT", "soon");

        let result = GameConfig::load();

        assert!(matches!(result, Err(ConfigError::Load(_))));
        Ok(())
    });
}
