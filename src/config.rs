//! User configuration (`config.toml`).
//!
//! ```toml
//! [keys]
//! toggle-find = "C-f"
//! find-next = "F3 Enter"
//!
//! [log]
//! filter = "gridseek_core=debug"
//! ```
//!
//! Problems are reported as warnings; a broken config never stops startup.

use directories::ProjectDirs;
use gridseek_core::Keybindings;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const MAX_KEY_ENTRIES: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    keys: Option<HashMap<String, String>>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    filter: Option<String>,
}

#[derive(Debug, Default)]
pub struct Config {
    pub keys: Keybindings,
    pub log_filter: Option<String>,
}

/// Load the config from `explicit`, or the user config dir when `None`.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = Config::default();

    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (config, warnings);
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (config, warnings);
    }

    let Some(file) = read_config_file(&path, &mut warnings) else {
        return (config, warnings);
    };

    if let Some(keys) = file.keys.as_ref() {
        if keys.len() > MAX_KEY_ENTRIES {
            warnings.push(format!(
                "Too many [keys] entries: {} (max {})",
                keys.len(),
                MAX_KEY_ENTRIES
            ));
        } else {
            let (bindings, key_warnings) = Keybindings::from_map(keys);
            config.keys = bindings;
            warnings.extend(key_warnings);
        }
    }
    config.log_filter = file
        .log
        .and_then(|log| log.filter)
        .map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty());

    (config, warnings)
}

fn read_config_file(path: &Path, warnings: &mut Vec<String>) -> Option<ConfigFile> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridseek")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
