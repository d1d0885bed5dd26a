//! Host configuration: where snapshots live, who holds which role, and the
//! member directory used to resolve display names and usernames.
//!
//! ```toml
//! [storage]
//! data_dir = "${HOME}/botc/data"
//!
//! [roles]
//! owner = 100
//! moderators = [101]
//! storytellers = [9]
//!
//! [[members]]
//! id = 1
//! display_name = "Alice"
//! username = "alice_w"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "TOWNSQUARE_CONFIG";
/// Overrides `[storage] data_dir`.
pub const DATA_DIR_ENV: &str = "TOWNSQUARE_DATA_DIR";

#[derive(Debug, Default, Deserialize)]
pub struct TownsquareConfig {
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub roles: RolesConfig,
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Snapshot directory. `${VAR}` references are expanded.
    pub data_dir: Option<String>,
}

/// Numeric platform ids per role. The owner and moderators carry
/// storyteller privilege.
#[derive(Debug, Default, Deserialize)]
pub struct RolesConfig {
    pub owner: Option<u64>,
    #[serde(default)]
    pub moderators: Vec<u64>,
    #[serde(default)]
    pub storytellers: Vec<u64>,
}

impl RolesConfig {
    #[must_use]
    pub fn is_owner(&self, id: u64) -> bool {
        self.owner == Some(id)
    }

    #[must_use]
    pub fn is_moderator(&self, id: u64) -> bool {
        self.moderators.contains(&id)
    }

    #[must_use]
    pub fn is_storyteller(&self, id: u64) -> bool {
        self.storytellers.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberConfig {
    pub id: u64,
    pub display_name: String,
    /// Falls back to the display name.
    pub username: Option<String>,
}

impl MemberConfig {
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.display_name)
    }
}

/// Replace `${VAR}` with the variable's value; unset variables become empty.
/// An unterminated `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if var.is_empty() {
            out.push_str("${}");
        } else {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

impl TownsquareConfig {
    /// Load from [`config_path`]. A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content, path).map(Some)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Snapshot directory: env override, then `[storage] data_dir`, then the
    /// default under the home directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        self.storage
            .as_ref()
            .and_then(|s| s.data_dir.as_deref())
            .map(expand_env_vars)
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(default_data_dir, PathBuf::from)
    }
}

/// `$TOWNSQUARE_CONFIG`, else `~/.townsquare/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".townsquare").join("config.toml"))
}

/// `~/.townsquare`, or `./.townsquare` when there is no home directory.
#[must_use]
pub fn base_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".townsquare"), |home| home.join(".townsquare"))
}

#[must_use]
pub fn default_data_dir() -> PathBuf {
    base_dir().join("data")
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::{env, fs};

    use super::{ConfigError, TownsquareConfig, expand_env_vars};

    fn parse(toml_str: &str) -> TownsquareConfig {
        TownsquareConfig::parse(toml_str, Path::new("config.toml")).expect("parse")
    }

    #[test]
    fn parse_empty_config() {
        let config = parse("");
        assert!(config.storage.is_none());
        assert!(config.members.is_empty());
        assert!(config.roles.owner.is_none());
    }

    #[test]
    fn parse_roles_and_members() {
        let config = parse(
            r#"
[roles]
owner = 100
moderators = [101]
storytellers = [9, 10]

[[members]]
id = 1
display_name = "Alice"
username = "alice_w"

[[members]]
id = 2
display_name = "Bob"
"#,
        );
        assert!(config.roles.is_owner(100));
        assert!(config.roles.is_moderator(101));
        assert!(config.roles.is_storyteller(10));
        assert!(!config.roles.is_storyteller(1));
        assert_eq!(config.members.len(), 2);
        assert_eq!(config.members[0].username(), "alice_w");
        assert_eq!(config.members[1].username(), "Bob");
    }

    #[test]
    fn parse_error_carries_path() {
        let err = TownsquareConfig::parse("[roles\nowner = 1", Path::new("bad.toml"))
            .expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Path::new("bad.toml"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = TownsquareConfig::load_from(&dir.path().join("absent.toml")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\ndata_dir = \"/srv/townsquare\"\n").expect("write");
        let config = TownsquareConfig::load_from(&path)
            .expect("load")
            .expect("present");
        assert_eq!(
            config.storage.and_then(|s| s.data_dir).as_deref(),
            Some("/srv/townsquare")
        );
    }

    #[test]
    fn expand_env_vars_without_references() {
        assert_eq!(expand_env_vars("plain/path"), "plain/path");
    }

    #[test]
    fn expand_env_vars_substitutes_and_blanks_missing() {
        unsafe {
            env::set_var("TOWNSQUARE_TEST_ROOT", "/games");
            env::remove_var("TOWNSQUARE_TEST_UNSET");
        }
        assert_eq!(
            expand_env_vars("${TOWNSQUARE_TEST_ROOT}/data${TOWNSQUARE_TEST_UNSET}"),
            "/games/data"
        );
        unsafe {
            env::remove_var("TOWNSQUARE_TEST_ROOT");
        }
    }

    #[test]
    fn expand_env_vars_keeps_malformed_references() {
        assert_eq!(expand_env_vars("a${}b"), "a${}b");
        assert_eq!(expand_env_vars("a${OPEN"), "a${OPEN");
    }
}
