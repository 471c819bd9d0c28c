//! Configuration module - deployment jobs and per-type settings

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::info;

use crate::cache_control::CacheControlDirective;

/// Errors raised while loading or merging configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path} was not a valid YAML file: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("merged configuration is not a valid deployment config: {0}")]
    Shape(String),
}

/// One unit of work mapping a source directory to a destination
/// prefix under the job's match patterns
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    pub name: Option<String>,
    /// Source directory; defaults to the build root
    pub src: Option<PathBuf>,
    /// Destination key prefix; defaults to empty
    pub dest: Option<String>,
    /// Newline-separated glob patterns, `!`-prefixed to exclude
    #[serde(rename = "match")]
    pub match_patterns: Option<String>,
}

/// Per-MIME-type upload settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MimeTypeSettings {
    #[serde(rename = "CacheControl")]
    pub cache_control: Option<CacheControlDirective>,
}

/// Settings table keyed by MIME type string
pub type MimeSettingsTable = BTreeMap<String, MimeTypeSettings>;

/// The merged deployment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "mime-types", default)]
    pub mime_types: MimeSettingsTable,
    pub jobs: Option<Vec<Job>>,
}

fn default_version() -> String {
    "1".to_string()
}

/// Read one configuration file as raw YAML.
///
/// A file that cannot be opened is ignored (`Ok(None)`); a file that
/// opens but does not parse is a hard error.
pub fn load_config_file(path: &Path) -> Result<Option<Value>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            info!("{} could not be opened, ignoring: {}", path.display(), e);
            return Ok(None);
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Deep-merge `overlay` over `base`: mappings merge key-wise, any
/// other overlay value wins outright.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Assemble the merged configuration: project-level values override
/// global-level ones, and the placeholder defaults (`version: "1"`,
/// empty `mime-types`) fill whatever remains unset.
pub fn merged_config(
    project: Option<Value>,
    global: Option<Value>,
) -> Result<DeployConfig, ConfigError> {
    let base = global.unwrap_or_else(|| Value::Mapping(Default::default()));
    let merged = match project {
        Some(overlay) => merge_values(base, overlay),
        None => base,
    };

    serde_yaml::from_value(merged).map_err(|e| ConfigError::Shape(e.to_string()))
}
