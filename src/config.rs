use crate::access::{AccessRole, CurrentUser};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const BASE_URL_ENV: &str = "INTERVIEW_ROOM_BASE_URL";
pub const COOKIE_ENV: &str = "INTERVIEW_ROOM_COOKIE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Raw `Cookie` header of an already-authenticated browser session.
    pub session_cookie: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8101".to_string(),
            session_cookie: None,
        }
    }
}

/// Identity of the person using the client. Login itself happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserConfig {
    pub id: String,
    pub name: Option<String>,
    #[serde(default = "default_user_role")]
    pub role: AccessRole,
}

fn default_user_role() -> AccessRole {
    AccessRole::User
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub page_size: u32,
    pub user: Option<UserConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            page_size: 12,
            user: None,
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("interview-room").join("config.toml"))
    }

    /// Loads the config file and applies environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let label = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: label.clone(),
            source,
        })?;
        debug!(path = %label, "Loaded config file");
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: label, source })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.api.base_url = base_url;
        }
        if let Some(cookie) = lookup(COOKIE_ENV) {
            self.api.session_cookie = Some(cookie);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "api.base_url",
                message: format!("'{}' is not an http(s) URL", base_url),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn current_user(&self) -> CurrentUser {
        match &self.user {
            Some(user) => CurrentUser::new(user.id.clone(), user.name.clone(), user.role),
            None => CurrentUser::not_logged_in(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
page_size = 20

[api]
base_url = "https://interview.example.com"

[user]
id = "1840000000000000001"
name = "jiaking"
role = "admin"
"#
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.api.base_url, "https://interview.example.com");
        assert_eq!(config.api.session_cookie, None);

        let user = config.current_user();
        assert!(user.is_logged_in());
        assert_eq!(user.role(), AccessRole::Admin);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            BASE_URL_ENV => Some("http://10.0.0.5:8101".to_string()),
            COOKIE_ENV => Some("user=xyz".to_string()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "http://10.0.0.5:8101");
        assert_eq!(config.api.session_cookie.as_deref(), Some("user=xyz"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = ClientConfig::default();
        config.page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "page_size", .. })
        ));

        let mut config = ClientConfig::default();
        config.api.base_url = "localhost:8101".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "api.base_url", .. })
        ));
    }

    #[test]
    fn test_no_user_section_means_not_logged_in() {
        let config: ClientConfig = toml::from_str("page_size = 5").unwrap();

        assert_eq!(config.api, ApiConfig::default());
        assert!(!config.current_user().is_logged_in());
    }
}
