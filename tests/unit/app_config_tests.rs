/*!
 * Tests for configuration loading and model overrides
 */

use std::fs;

use indicmt::app_config::{Config, LogLevel};
use indicmt::language_utils::Language;
use indicmt::translation::{ModelRef, PipelineResolver};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    let written: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.storage.data_dir, config.storage.data_dir);
    assert_eq!(written.log_level, LogLevel::Info);
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "storage": { "data_dir": "/srv/mt/data" },
            "models": { "overrides": { "EN-hi": "my-org/opus-mt-en-hi-finetuned" } },
            "comparison": { "enabled": false },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let mut config = Config::load_or_create(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.storage.history_path().to_str(), Some("/srv/mt/data/historical.csv"));
    assert_eq!(config.storage.evaluation_path().to_str(), Some("/tmp/out/eval_results.csv"));
    assert!(!config.comparison.enabled);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(
        config.models.overrides.get("en_hi").map(String::as_str),
        Some("my-org/opus-mt-en-hi-finetuned")
    );
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_envOverride_shouldReachResolver() {
    let mut config = Config::default();
    config.models.local_model_root = "/nonexistent/indicmt/models".into();
    config.apply_env_overrides(vec![
        ("MT_MODEL_hi_mr".to_string(), "my-org/opus-mt-hi-mr".to_string()),
        ("UNRELATED".to_string(), "value".to_string()),
    ]);
    config.validate().unwrap();

    let resolver = PipelineResolver::new(&config.models);
    let pipeline = resolver.resolve(Language::Hindi, Language::Marathi).unwrap();

    assert!(!pipeline.is_pivot());
    assert_eq!(
        pipeline.hops()[0].model,
        ModelRef::Override { location: "my-org/opus-mt-hi-mr".to_string() }
    );
}
