use anyhow::Result;
use eyedir::{AppConfig, EyedirError, LocalizerStrategy};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> Result<std::path::PathBuf> {
    let path = dir.path().join("eyedir.json");
    fs::write(&path, body)?;
    Ok(path)
}

#[test]
fn test_defaults_match_documented_constants() -> Result<()> {
    let config = AppConfig::load(None)?;

    assert_eq!(config.camera.index, 0);
    assert_eq!(config.localizer.strategy, LocalizerStrategy::Masked);
    assert_eq!(config.localizer.dark_lower, [0, 0, 0]);
    assert_eq!(config.localizer.dark_upper, [180, 255, 30]);
    assert_eq!(config.localizer.masked_block_size, 15);
    assert_eq!(config.localizer.masked_offset, 10);
    assert_eq!(config.localizer.morph_kernel_size, 5);
    assert_eq!(config.localizer.gradient_offset, -2);
    assert_eq!(config.cursor.gain, 10);
    assert!(!config.cursor.enabled);
    assert!(!config.tracking.track_pupil);
    assert_eq!(config.screen_override(), None);
    Ok(())
}

#[test]
fn test_partial_file_overrides_only_named_fields() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = write_config(
        &tmp,
        r#"{
            "cursor": { "enabled": true, "gain": 4, "screen_width": 1920, "screen_height": 1080 },
            "localizer": { "strategy": "gradient" }
        }"#,
    )?;

    let config = AppConfig::load(Some(&path))?;

    assert!(config.cursor.enabled);
    assert_eq!(config.cursor.gain, 4);
    assert_eq!(config.screen_override(), Some((1920, 1080)));
    assert_eq!(config.localizer.strategy, LocalizerStrategy::Gradient);
    assert_eq!(config.localizer.masked_block_size, 15);
    assert_eq!(config.logging.level, "info");
    Ok(())
}

#[test]
fn test_even_block_size_is_rejected() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = write_config(&tmp, r#"{ "localizer": { "masked_block_size": 14 } }"#)?;

    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, EyedirError::Config { .. }));
    assert!(err.to_string().contains("masked_block_size"));
    Ok(())
}

#[test]
fn test_inverted_dark_band_is_rejected() {
    let mut config = AppConfig::default();
    config.localizer.dark_lower = [0, 0, 40];
    assert!(config.validate().is_err());
}

#[test]
fn test_unreadable_and_malformed_files_fail() -> Result<()> {
    let tmp = TempDir::new()?;

    let missing = tmp.path().join("absent.json");
    assert!(matches!(
        AppConfig::load(Some(&missing)),
        Err(EyedirError::Config { .. })
    ));

    let broken = write_config(&tmp, "{ not json")?;
    assert!(matches!(
        AppConfig::load(Some(&broken)),
        Err(EyedirError::Json(_))
    ));
    Ok(())
}

#[test]
fn test_oversized_morph_kernel_is_rejected() {
    let mut config = AppConfig::default();
    config.localizer.morph_kernel_size = 513;
    assert!(matches!(config.validate(), Err(EyedirError::Config { .. })));

    config.localizer.morph_kernel_size = 7;
    assert!(config.validate().is_ok());
}
