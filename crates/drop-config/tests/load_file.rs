use drop_anim::Easing;
use drop_config::{ConfigError, DropConfig};
use std::io::Write;

#[test]
fn loads_file_and_applies_overrides() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[window]
title = "Dice night"
frame_rate = 30

[animation]
drop_secs = 1.5
drop_easing = "back_out"

[demo]
rounds = 2
seed = 7
"#
    )?;

    let mut config = DropConfig::load_from_file(file.path())?;
    assert_eq!(config.window.title, "Dice night");
    assert_eq!(config.window.frame_rate, 30);
    assert_eq!(config.window.width, 1024);
    assert_eq!(config.animation.drop_easing, Easing::BackOut);
    assert_eq!(config.demo.seed, Some(7));

    config.merge_with(|key| (key == "DROP_ROUNDS").then(|| "9".to_string()));
    assert_eq!(config.demo.rounds, 9);
    config.validate()?;
    Ok(())
}

#[test]
fn malformed_file_is_parse_error() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[window\nwidth = ")?;

    let err = DropConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    Ok(())
}

#[test]
fn invalid_values_are_rejected_on_load() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[window]\nwidth = 0")?;

    let err = DropConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("non-zero"));
    Ok(())
}
