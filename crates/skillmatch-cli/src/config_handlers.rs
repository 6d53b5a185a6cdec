//! Handlers for `skillmatch config {path,show,get,set,init,export}`.
//!
//! Each handler returns the text to print so the dispatcher owns stdout.

use crate::cli::ConfigAction;
use crate::config::SkillmatchConfig;
use skillmatch::{Error, Result};
use std::path::PathBuf;

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    let output = match action {
        ConfigAction::Path => config_path_report(config_path)?,
        ConfigAction::Show => SkillmatchConfig::load(config_path)?.to_toml_string()?,
        ConfigAction::Get { key } => config_get(config_path, &key)?,
        ConfigAction::Set { key, value } => config_set(config_path, &key, &value)?,
        ConfigAction::Init { file, force } => config_init(file.as_deref(), force)?,
        ConfigAction::Export { docker_env } => {
            config_export(&SkillmatchConfig::load(config_path)?, docker_env)?
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn config_path_report(config_path: Option<&str>) -> Result<String> {
    let path = SkillmatchConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    if !path.exists() {
        eprintln!("(file does not exist; run `skillmatch config init` to create it)");
    }
    Ok(path.display().to_string())
}

fn config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = SkillmatchConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a dotted key in the config file, refusing edits that would leave
/// the file unloadable.
fn config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<String> {
    let path = SkillmatchConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `skillmatch config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<SkillmatchConfig>(&toml_str)
        .map_err(|e| Error::config(format!("Invalid value for {key}: {e}")))?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    Ok(format!("Set {key} = {value} in {}", path.display()))
}

fn config_init(file: Option<&str>, force: bool) -> Result<String> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => SkillmatchConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = SkillmatchConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    Ok(format!("Config file created at {}", path.display()))
}

fn config_export(config: &SkillmatchConfig, docker_env: bool) -> Result<String> {
    let lines: Vec<String> = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("Cannot navigate into '{part}'")))?;
        current = table
            .entry(part)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config(format!("Cannot set '{last}' on a non-table value")))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value: bool, then integer, then float,
/// then string.
fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| s.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_default_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SkillmatchConfig::default().to_toml_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_config_path_explicit() {
        let out = config_path_report(Some("/explicit/config.toml")).unwrap();
        assert_eq!(out, "/explicit/config.toml");
    }

    #[test]
    fn test_config_get_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(&dir);

        let out = config_get(Some(path.to_str().unwrap()), "index.default_limit").unwrap();
        assert_eq!(out, "10");
        let out = config_get(Some(path.to_str().unwrap()), "embedding.provider").unwrap();
        assert_eq!(out, "hash");
    }

    #[test]
    fn test_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(&dir);

        let err = config_get(Some(path.to_str().unwrap()), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_config_set_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(&dir);

        config_set(Some(path.to_str().unwrap()), "index.default_limit", "5").unwrap();
        config_set(Some(path.to_str().unwrap()), "catalog.source_path", "/data/c.csv").unwrap();

        let config = SkillmatchConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.index.default_limit, 5);
        assert_eq!(config.catalog.source_path, "/data/c.csv");
    }

    #[test]
    fn test_config_set_rejects_wrong_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default_config(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let err = config_set(Some(path.to_str().unwrap()), "index.default_limit", "many")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_config_set_missing_file() {
        let err = config_set(Some("/nonexistent/config.toml"), "index.path", "x").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_config_init_creates_and_protects_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("skillmatch").join("config.toml");
        let file = path.to_str().unwrap();

        config_init(Some(file), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[catalog]"));
        assert!(content.contains("[embedding]"));

        let err = config_init(Some(file), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(config_init(Some(file), true).is_ok());
    }

    #[test]
    fn test_config_export_formats() {
        let config = SkillmatchConfig::default();
        let plain = config_export(&config, false).unwrap();
        assert!(plain.lines().any(|l| l == "SKILLMATCH_INDEX_PATH=course_index"));

        let docker = config_export(&config, true).unwrap();
        assert!(docker.lines().all(|l| l.starts_with("--env SKILLMATCH_")));
    }

    #[test]
    fn test_nested_value_helpers() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut val, "embedding.provider", toml::Value::String("http".into()))
            .unwrap();
        assert_eq!(
            get_nested_value(&val, "embedding.provider"),
            Some(&toml::Value::String("http".into()))
        );
        assert!(get_nested_value(&val, "embedding.model").is_none());
        assert!(set_nested_value(&mut val, "", toml::Value::Integer(1)).is_err());
        assert!(
            set_nested_value(&mut val, "embedding.provider.x", toml::Value::Integer(1)).is_err()
        );
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("0.5"), toml::Value::Float(0.5));
        assert_eq!(parse_value("hash"), toml::Value::String("hash".to_string()));
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::String("x".into())), "x");
        assert_eq!(format_toml_value(&toml::Value::Integer(42)), "42");
        assert_eq!(format_toml_value(&toml::Value::Boolean(false)), "false");
    }
}
