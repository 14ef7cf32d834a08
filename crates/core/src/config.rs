use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    #[serde(default)]
    pub rules: RuleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Predictions below this confidence are flagged for manual review.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    #[serde(default = "default_vocab_size")]
    pub vocab_size: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: None,
            max_sequence_length: default_max_sequence_length(),
            vocab_size: default_vocab_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
    #[serde(default = "enabled")]
    pub create_features: bool,
    #[serde(default = "enabled")]
    pub validate: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_text_bytes: default_max_text_bytes(),
            create_features: true,
            validate: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    pub path: Option<String>,
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_provider() -> String {
    "noop".to_string()
}

fn default_max_sequence_length() -> usize {
    512
}

fn default_vocab_size() -> u32 {
    10_000
}

fn default_max_text_bytes() -> usize {
    1024 * 1024
}

fn enabled() -> bool {
    true
}

/// Loads `path` (or the optional `config/default`), then `LABDOC__*` environment overrides.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("LABDOC")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
