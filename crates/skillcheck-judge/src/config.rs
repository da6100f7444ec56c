//! Configuration loading and judge factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillcheck_core::evaluator::EvaluatorConfig;
use skillcheck_core::session::SessionConfig;
use skillcheck_core::traits::JudgeClient;

use crate::judge0::Judge0Client;
use crate::simulated::SimulatedJudge;

/// Credentials that select the simulated judge instead of the remote one.
pub const DEMO_CREDENTIALS: &[&str] = &["demo", "development"];

/// Environment variable that overrides `judge.api_key`.
pub const API_KEY_ENV: &str = "SKILLCHECK_JUDGE_KEY";

/// How the judge backend is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeMode {
    /// Remote when a real credential is set, simulated otherwise.
    #[default]
    Auto,
    /// Always remote; a missing credential surfaces as a config error per call.
    Remote,
    /// Always simulated.
    Simulated,
}

/// Judge backend configuration.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub mode: JudgeMode,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Header carrying the credential.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Artificial latency of the simulated judge.
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("auth_header", &self.auth_header)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("simulated_latency_ms", &self.simulated_latency_ms)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://ce.judge0.com".to_string()
}
fn default_auth_header() -> String {
    "X-RapidAPI-Key".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_simulated_latency() -> u64 {
    1500
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            mode: JudgeMode::Auto,
            api_key: None,
            base_url: default_base_url(),
            auth_header: default_auth_header(),
            request_timeout_secs: default_request_timeout(),
            simulated_latency_ms: default_simulated_latency(),
        }
    }
}

impl JudgeConfig {
    /// The configured credential, if non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Whether the credential is one of [`DEMO_CREDENTIALS`].
    pub fn is_demo_credential(&self) -> bool {
        self.credential()
            .is_some_and(|k| DEMO_CREDENTIALS.contains(&k))
    }

    /// Resolve `Auto` into `Remote` or `Simulated`.
    pub fn effective_mode(&self) -> JudgeMode {
        match self.mode {
            JudgeMode::Auto if self.credential().is_none() || self.is_demo_credential() => {
                JudgeMode::Simulated
            }
            JudgeMode::Auto => JudgeMode::Remote,
            explicit => explicit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorSettings {
    /// Maximum judge calls in flight per submission.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Milliseconds per countdown second.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

/// Top-level skillcheck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillcheckConfig {
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub evaluator: EvaluatorSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

impl SkillcheckConfig {
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            max_concurrency: self.evaluator.max_concurrency.max(1),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tick_interval: Duration::from_millis(self.session.tick_interval_ms.max(1)),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        // Substituted values are not expanded again.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillcheck.toml` in the current directory
/// 2. `~/.config/skillcheck/config.toml`
///
/// Environment variable override: `SKILLCHECK_JUDGE_KEY`.
pub fn load_config() -> Result<SkillcheckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("skillcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SkillcheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SkillcheckConfig::default(),
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.judge.api_key = Some(key);
    }

    config.judge.api_key = config.judge.api_key.as_deref().map(resolve_env_vars);
    config.judge.base_url = resolve_env_vars(&config.judge.base_url);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillcheck"))
}

/// Create the judge client selected by `config`.
pub fn create_judge(config: &JudgeConfig) -> Result<Arc<dyn JudgeClient>> {
    match config.effective_mode() {
        JudgeMode::Simulated => {
            tracing::info!(
                latency_ms = config.simulated_latency_ms,
                "using simulated judge; results are not authoritative"
            );
            Ok(Arc::new(SimulatedJudge::new(Duration::from_millis(
                config.simulated_latency_ms,
            ))))
        }
        JudgeMode::Remote | JudgeMode::Auto => {
            tracing::info!(base_url = %config.base_url, "using remote Judge0 backend");
            let client = Judge0Client::new(config).context("failed to create Judge0 client")?;
            Ok(Arc::new(client))
        }
    }
}
