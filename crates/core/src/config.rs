use crate::profile::{self, PromptProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

// ─── Config ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    /// Inbound request body size limit (KB).
    pub body_limit_kb: usize,

    // Outbound proxy for the completion API
    pub proxy_url: Option<String>,

    // Logging
    pub logging_to_file: bool,
    pub log_dir: Option<String>,

    // Completion API
    pub upstream: UpstreamConfig,

    // Prompt profiles
    pub default_profile: String,
    pub profiles: HashMap<String, PromptProfile>,

    /// Completion API secret. Never read from the YAML file; injected once at
    /// startup from the CLI/environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            body_limit_kb: 64,
            proxy_url: None,
            logging_to_file: false,
            log_dir: None,
            upstream: UpstreamConfig::default(),
            default_profile: profile::ECO_LENS.to_string(),
            profiles: profile::builtin_profiles(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file, sanitize, and validate.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let mut config: Config = serde_yaml_ng::from_str(contents)?;
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    /// Attach the API key. Blank keys count as missing.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn profile(&self, name: &str) -> Option<&PromptProfile> {
        self.profiles.get(name)
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate configuration.
    fn validate(&self) -> Result<(), anyhow::Error> {
        anyhow::ensure!(
            self.profiles.contains_key(&self.default_profile),
            "default profile '{}' is not defined",
            self.default_profile
        );
        for (name, p) in &self.profiles {
            anyhow::ensure!(
                (0.0..=2.0).contains(&p.temperature),
                "profile '{name}': temperature {} out of range [0, 2]",
                p.temperature
            );
            anyhow::ensure!(
                !p.system_prompt.trim().is_empty(),
                "profile '{name}': system-prompt is empty"
            );
        }
        anyhow::ensure!(!self.upstream.model.is_empty(), "upstream model is empty");
        url::Url::parse(&self.upstream.base_url).map_err(|e| {
            anyhow::anyhow!("invalid upstream base-url '{}': {e}", self.upstream.base_url)
        })?;
        if let Some(ref proxy) = self.proxy_url {
            crate::proxy::validate_proxy_url(proxy)?;
        }
        Ok(())
    }

    /// Sanitize and normalize configuration.
    fn sanitize(&mut self) {
        while self.upstream.base_url.ends_with('/') {
            self.upstream.base_url.pop();
        }
        // Built-ins stay available unless a config entry replaces them.
        for (name, p) in profile::builtin_profiles() {
            self.profiles.entry(name).or_insert(p);
        }
    }
}

// ─── Sub-configs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UpstreamConfig {
    /// OpenAI-compatible base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
