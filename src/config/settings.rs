//! Optional TOML settings file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FirechatError;

const PROJECT_SETTINGS_FILE: &str = "firechat.toml";
const USER_SETTINGS_DIR: &str = ".firechat";
const USER_SETTINGS_FILE: &str = "config.toml";

/// Contents of a `firechat.toml` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub model: ModelSection,
    pub server: ServerSection,
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub name: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatSection {
    pub system_prompt: Option<String>,
    pub history_limit: Option<usize>,
    pub max_input_chars: Option<usize>,
    pub max_tool_iterations: Option<usize>,
}

impl SettingsFile {
    /// Parse settings from TOML text.
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, FirechatError> {
        toml::from_str(raw).map_err(|e| {
            FirechatError::Configuration(format!("invalid settings in {}: {e}", origin.display()))
        })
    }

    /// Read and parse a settings file that must exist.
    pub fn read(path: &Path) -> Result<Self, FirechatError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            FirechatError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&raw, path)
    }

    /// Load the first settings file found in `cwd` or the user's home directory.
    ///
    /// Returns the default (empty) settings when neither exists.
    pub fn discover(cwd: &Path, home_dir: Option<&Path>) -> Result<Self, FirechatError> {
        for candidate in candidate_paths(cwd, home_dir) {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading settings file");
                return Self::read(&candidate);
            }
        }
        Ok(Self::default())
    }
}

fn candidate_paths(cwd: &Path, home_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(PROJECT_SETTINGS_FILE)];
    if let Some(home) = home_dir {
        paths.push(home.join(USER_SETTINGS_DIR).join(USER_SETTINGS_FILE));
    }
    paths
}

/// The current user's home directory, if one can be determined.
pub fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_reads_all_sections() {
        let raw = r#"
            [model]
            name = "gpt-4o"
            temperature = 0.3

            [server]
            command = "node"
            args = ["server.js"]

            [chat]
            history_limit = 12
        "#;
        let settings = SettingsFile::parse(raw, Path::new("firechat.toml")).unwrap();
        assert_eq!(settings.model.name.as_deref(), Some("gpt-4o"));
        assert_eq!(settings.model.temperature, Some(0.3));
        assert_eq!(settings.server.command.as_deref(), Some("node"));
        assert_eq!(settings.server.args, Some(vec!["server.js".to_string()]));
        assert_eq!(settings.chat.history_limit, Some(12));
        assert!(settings.chat.system_prompt.is_none());
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let err = SettingsFile::parse("[model]\nflavour = \"mint\"\n", Path::new("x.toml"))
            .expect_err("unknown keys should be rejected");
        assert!(matches!(err, FirechatError::Configuration(msg) if msg.contains("x.toml")));
    }

    #[test]
    fn discover_prefers_project_file_over_home() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(USER_SETTINGS_DIR)).unwrap();
        fs::write(
            home.path().join(USER_SETTINGS_DIR).join(USER_SETTINGS_FILE),
            "[model]\nname = \"from-home\"\n",
        )
        .unwrap();

        let from_home = SettingsFile::discover(cwd.path(), Some(home.path())).unwrap();
        assert_eq!(from_home.model.name.as_deref(), Some("from-home"));

        fs::write(
            cwd.path().join(PROJECT_SETTINGS_FILE),
            "[model]\nname = \"from-project\"\n",
        )
        .unwrap();
        let from_project = SettingsFile::discover(cwd.path(), Some(home.path())).unwrap();
        assert_eq!(from_project.model.name.as_deref(), Some("from-project"));
    }

    #[test]
    fn discover_without_files_returns_defaults() {
        let cwd = TempDir::new().unwrap();
        let settings = SettingsFile::discover(cwd.path(), None).unwrap();
        assert_eq!(settings, SettingsFile::default());
    }
}
