use serde::{Deserialize, Serialize};

/// File name of the optional per-project configuration.
pub const CONFIG_FILE_NAME: &str = "dockhand.toml";

/// Build recipe written by the agent and consumed by the build step.
pub const RECIPE_FILE_NAME: &str = "Dockerfile";

/// dockhand.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockhandConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier passed to the oracle endpoint
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on oracle round-trips per run
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Base URL of the generative language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-request timeout for a single oracle call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build tool executable (`docker`, `podman`, ...)
    #[serde(default = "default_program")]
    pub program: String,
    /// Target platform passed as `--platform`
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_turns: default_max_turns(),
            temperature: default_temperature(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            platform: default_platform(),
        }
    }
}

impl DockhandConfig {
    /// Load from dockhand.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_owned()
}

fn default_max_turns() -> u32 {
    15
}

fn default_temperature() -> f32 {
    0.2
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_owned()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_program() -> String {
    "docker".to_owned()
}

fn default_platform() -> String {
    "linux/amd64".to_owned()
}
