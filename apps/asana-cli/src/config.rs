//! Layered CLI configuration.
//!
//! Precedence, lowest to highest: built-in defaults, the JSON config file,
//! `ASANA_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use asana_errors::CliError;
use asana_http::{ClientConfig, DEFAULT_TIMEOUT};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/asana-cli/config.json";
pub const TOKEN_ENV: &str = "ASANA_ACCESS_TOKEN";
const ENV_PREFIX: &str = "ASANA_";

/// Flag values that override every other layer when set.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub workspace: Option<String>,
    pub debug: bool,
    pub timeout: Option<Duration>,
}

/// Effective configuration after all layers are merged.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub access_token: Option<SecretString>,
    pub workspace: Option<String>,
    pub team: Option<String>,
    pub timeout: Duration,
    pub debug: bool,
    pub config_path: PathBuf,
    pub config_file_found: bool,
}

/// Keys read from the config file and the environment. The access token is
/// not among them: it only ever comes from `ASANA_ACCESS_TOKEN`.
#[derive(Debug, Deserialize)]
struct Layered {
    #[serde(default)]
    default_workspace: Option<String>,
    #[serde(default)]
    default_team: Option<String>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default)]
    debug: bool,
}

/// Non-empty `ASANA_*` variables, values kept verbatim.
#[derive(Debug, Default)]
struct EnvVars {
    access_token: Option<String>,
    layer: serde_json::Map<String, serde_json::Value>,
}

impl EnvVars {
    fn read() -> Self {
        let mut vars = Self::default();
        let env = Env::prefixed(ENV_PREFIX).only(&["access_token", "workspace", "debug"]);
        for (key, value) in env.iter() {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str().to_ascii_lowercase().as_str() {
                "access_token" => vars.access_token = Some(value),
                "workspace" => {
                    vars.layer
                        .insert("default_workspace".to_owned(), value.into());
                }
                "debug" => {
                    vars.layer
                        .insert("debug".to_owned(), parse_bool(&value).into());
                }
                _ => {}
            }
        }
        vars
    }
}

/// Accepted spellings of "true"; anything else is false.
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}

/// What `config show` prints.
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub access_token: String,
    pub workspace: Option<String>,
    pub team: Option<String>,
    pub timeout: String,
    pub debug: bool,
    pub config_path: String,
    pub config_file_found: bool,
}

/// Replace a leading `~` with the home directory.
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl CliConfig {
    /// Merge defaults, the config file, the environment and `overrides`.
    ///
    /// # Errors
    ///
    /// `GeneralError` when the config file exists but cannot be parsed.
    pub fn load(overrides: &Overrides) -> Result<Self, CliError> {
        let config_path = expand_path(
            overrides
                .config_path
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH)),
        );

        let env = EnvVars::read();
        let layered: Layered = Figment::new()
            .merge(Serialized::defaults(serde_json::json!({
                "timeout": humantime::format_duration(DEFAULT_TIMEOUT).to_string(),
                "debug": false,
            })))
            .merge(Json::file_exact(&config_path))
            .merge(Serialized::defaults(&env.layer))
            .extract()
            .map_err(|e| {
                CliError::general(format!(
                    "failed to load config {}: {e}",
                    config_path.display()
                ))
            })?;

        // Unparsable or zero timeouts fall back to the default.
        let timeout = layered
            .timeout
            .as_deref()
            .and_then(|raw| humantime::parse_duration(raw.trim()).ok())
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut config = Self {
            access_token: env.access_token.map(SecretString::from),
            workspace: non_empty(layered.default_workspace),
            team: non_empty(layered.default_team),
            timeout,
            debug: layered.debug,
            config_file_found: config_path.is_file(),
            config_path,
        };
        config.apply(overrides);

        tracing::debug!(
            path = %config.config_path.display(),
            found = config.config_file_found,
            "configuration loaded"
        );
        Ok(config)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(ws) = overrides.workspace.as_ref().filter(|w| !w.is_empty()) {
            self.workspace = Some(ws.clone());
        }
        if overrides.debug {
            self.debug = true;
        }
        if let Some(timeout) = overrides.timeout.filter(|d| !d.is_zero()) {
            self.timeout = timeout;
        }
    }

    /// # Errors
    ///
    /// `AuthFailure` when no access token is configured.
    pub fn require_token(&self) -> Result<&SecretString, CliError> {
        self.access_token.as_ref().ok_or_else(|| {
            CliError::auth_failure(format!("{TOKEN_ENV} environment variable not set"))
        })
    }

    /// Client settings for talking to the production API.
    ///
    /// # Errors
    ///
    /// `AuthFailure` when no access token is configured.
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        let token = self.require_token()?;
        let mut client = ClientConfig::new(token.expose_secret());
        client.timeout = self.timeout;
        Ok(client)
    }

    /// `abcd...wxyz` for long tokens, `****` for short ones, empty when unset.
    #[must_use]
    pub fn masked_token(&self) -> String {
        let Some(token) = self.access_token.as_ref() else {
            return String::new();
        };
        let chars: Vec<char> = token.expose_secret().chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "****".to_owned()
        }
    }

    #[must_use]
    pub fn view(&self) -> ConfigView {
        ConfigView {
            access_token: self.masked_token(),
            workspace: self.workspace.clone(),
            team: self.team.clone(),
            timeout: humantime::format_duration(self.timeout).to_string(),
            debug: self.debug,
            config_path: self.config_path.display().to_string(),
            config_file_found: self.config_file_found,
        }
    }
}
