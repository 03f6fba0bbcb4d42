use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout for calls to the question-answering service.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct QaFrontendConfig {
    pub common: core_config::Config,
    pub language_service: LanguageServiceSettings,
    pub project: ProjectSettings,
    /// Directory holding `index.html` and the client assets.
    pub static_dir: PathBuf,
    /// OTLP collector for trace export; logs only when unset.
    pub otlp_endpoint: Option<String>,
}

/// Credentials for the question-answering service.
///
/// Both values are optional at startup. A request that needs them while they
/// are missing fails with a configuration error.
#[derive(Debug, Clone)]
pub struct LanguageServiceSettings {
    /// e.g. `https://<resource>.cognitiveservices.azure.com/`
    pub endpoint: Option<String>,
    pub key: Option<Secret<String>>,
    pub request_timeout: Duration,
}

impl Default for LanguageServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Knowledge base selection: project plus deployment.
#[derive(Debug, Clone, Default)]
pub struct ProjectSettings {
    pub project_name: Option<String>,
    pub deployment_name: Option<String>,
}

impl ProjectSettings {
    pub fn new(project_name: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Self {
            project_name: Some(project_name.into()),
            deployment_name: Some(deployment_name.into()),
        }
    }

    /// `(project, deployment)` when both are configured.
    pub fn resolve(&self) -> Option<(&str, &str)> {
        match (&self.project_name, &self.deployment_name) {
            (Some(project), Some(deployment)) => Some((project.as_str(), deployment.as_str())),
            _ => None,
        }
    }
}

impl QaFrontendConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let request_timeout = match get("QA_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "QA_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}': {}",
                    raw,
                    e
                ))
            })?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(QaFrontendConfig {
            common,
            language_service: LanguageServiceSettings {
                endpoint: get("AI_SERVICE_ENDPOINT"),
                key: get("AI_SERVICE_KEY").map(Secret::new),
                request_timeout,
            },
            project: ProjectSettings {
                project_name: get("QA_PROJECT_NAME"),
                deployment_name: get("QA_DEPLOYMENT_NAME"),
            },
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_static_dir),
            otlp_endpoint: get("OTLP_ENDPOINT"),
        })
    }
}

/// `static/` next to the crate when started from the workspace root, otherwise
/// `static/` in the working directory.
fn default_static_dir() -> PathBuf {
    let base_path = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if base_path.ends_with("qa-frontend") {
        return base_path.join("static");
    }

    let workspace_static = base_path.join("qa-frontend").join("static");
    if workspace_static.is_dir() {
        workspace_static
    } else {
        base_path.join("static")
    }
}
