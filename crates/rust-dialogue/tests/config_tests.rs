//! Integration tests for configuration handling.

use std::time::Duration;

use rust_dialogue::{ConfigFormat, ConfigLoader, DialogueError, EnvConfig, FlowConfig};

#[test]
fn flow_config_default() {
    let config = FlowConfig::default();
    assert!((config.speed - 5.0).abs() < f64::EPSILON);
    assert_eq!(config.delay, Duration::ZERO);
    assert!(config.delay_min_max.is_none());
    assert!(config.character_dependent_wait);
    assert!(config.first_message.is_none());
    assert!(config.auto_next);
}

#[test]
fn flow_config_builder_pattern() {
    let config = FlowConfig::new()
        .speed(8.0)
        .delay_ms(250)
        .delay_min_max(100, 400)
        .character_dependent_wait(false)
        .first_message("intro")
        .auto_next(false)
        .seed(9);

    assert!((config.effective_speed() - 8.0).abs() < f64::EPSILON);
    assert_eq!(config.delay, Duration::from_millis(250));
    assert_eq!(config.random_delay_range(), Some((100, 400)));
    assert_eq!(config.first_message.as_deref(), Some("intro"));
    assert!(!config.auto_next);
    assert_eq!(config.seed, Some(9));
}

#[test]
fn speed_is_clamped_not_capped() {
    assert!((FlowConfig::new().speed(0.2).effective_speed() - 1.0).abs() < f64::EPSILON);
    assert!((FlowConfig::new().speed(25.0).effective_speed() - 25.0).abs() < f64::EPSILON);
}

#[test]
fn unusable_ranges_are_ignored() {
    assert!(FlowConfig::new().delay_min_max(0, 10).random_delay_range().is_none());
    assert!(FlowConfig::new().delay_min_max(10, 0).random_delay_range().is_none());
    assert!(FlowConfig::new().delay_min_max(30, 10).random_delay_range().is_none());
}

#[test]
fn camel_case_json() {
    let config = FlowConfig::from_json_str(
        r#"{"speed": 7, "delay": 120, "delayMinMax": [50, 90], "characterDependentWait": false,
            "firstMessage": "start", "autoNext": false}"#,
    )
    .unwrap();

    assert_eq!(config.delay, Duration::from_millis(120));
    assert_eq!(config.delay_min_max, Some((50, 90)));
    assert!(!config.character_dependent_wait);
    assert_eq!(config.first_message.as_deref(), Some("start"));
    assert!(!config.auto_next);
}

#[test]
fn toml_fills_defaults() {
    let config = FlowConfig::from_toml_str("autoNext = false\n").unwrap();
    assert!(!config.auto_next);
    assert!(config.character_dependent_wait);
}

#[test]
fn loader_finds_files_by_name() {
    let dir = std::env::temp_dir().join(format!("rust-dialogue-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("flow.toml"), "speed = 9.0\ndelay = 40\n").unwrap();

    let loader = ConfigLoader::new().add_path(&dir);
    let config = loader.load_by_name("flow").unwrap();
    assert_eq!(config.delay, Duration::from_millis(40));

    let err = loader.load_by_name("absent").unwrap_err();
    assert!(matches!(err, DialogueError::Config { .. }));

    std::fs::write(dir.join("flow.conf"), r#"{"speed": 3}"#).unwrap();
    let config = ConfigLoader::new()
        .with_format(ConfigFormat::Json)
        .load(&dir.join("flow.conf"))
        .unwrap();
    assert!((config.speed - 3.0).abs() < f64::EPSILON);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn env_overlay() {
    let env = EnvConfig::default().with_source([
        ("DIALOGUE_SPEED", "9"),
        ("DIALOGUE_DELAY_MIN", "10"),
        ("DIALOGUE_DELAY_MAX", "20"),
        ("DIALOGUE_AUTO_NEXT", "false"),
        ("DIALOGUE_FIRST_MESSAGE", "intro"),
    ]);
    let config = env.apply(FlowConfig::default()).unwrap();

    assert_eq!(config.delay_min_max, Some((10, 20)));
    assert!(!config.auto_next);
    assert_eq!(config.first_message.as_deref(), Some("intro"));
}

#[test]
fn env_overlay_rejects_bad_values() {
    let env = EnvConfig::default().with_source([("DIALOGUE_SEED", "many")]);
    assert!(env.apply(FlowConfig::default()).is_err());

    let env = EnvConfig::default().with_source([("DIALOGUE_SPEED", "NaN")]);
    assert!(env.apply(FlowConfig::default()).is_err());
}

#[test]
fn first_question_is_accepted_as_first_message() {
    let config = FlowConfig::from_json_str(r#"{"firstQuestion": "intro"}"#).unwrap();
    assert_eq!(config.first_message.as_deref(), Some("intro"));

    let config = FlowConfig::from_toml_str("firstQuestion = \"intro\"\n").unwrap();
    assert_eq!(config.first_message.as_deref(), Some("intro"));
}
