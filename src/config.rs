use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TRIAL_LIMIT: usize = 3;
pub const DEFAULT_ASSEMBLY: &str = "hg38";

/// Remote annotation services, in the order they are tried by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[value(name = "myvariant")]
    MyVariant,
    Ensembl,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::MyVariant => "MyVariant.info",
            SourceKind::Ensembl => "Ensembl",
        }
    }

    pub fn public_url(&self) -> &'static str {
        match self {
            SourceKind::MyVariant => MYVARIANT_URL,
            SourceKind::Ensembl => ENSEMBL_URL,
        }
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "myvariant" | "myvariant.info" => Ok(SourceKind::MyVariant),
            "ensembl" | "vep" => Ok(SourceKind::Ensembl),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to emit when every source failed for a variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustedPolicy {
    /// Synthesize a genome-browser placeholder record
    #[default]
    Placeholder,
    /// Emit an explicit error record tagged with the last failing source
    Error,
}

pub const MYVARIANT_URL: &str = "https://myvariant.info";
pub const ENSEMBL_URL: &str = "https://rest.ensembl.org";
pub const CLINICAL_TRIALS_URL: &str = "https://clinicaltrials.gov";

/// Connection settings of one annotation service. An unset `base_url`
/// means the public service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl EndpointConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    pub fn base_or<'a>(&'a self, public_url: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .unwrap_or(public_url)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialsConfig {
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
    pub limit: usize,
}

impl Default for TrialsConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            limit: DEFAULT_TRIAL_LIMIT,
        }
    }
}

/// Annotator settings. Every field has a default, so a TOML file only needs
/// the keys it overrides:
///
/// ```toml
/// sources = ["myvariant", "ensembl"]
/// on_exhausted = "placeholder"
///
/// [myvariant]
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    pub sources: Vec<SourceKind>,
    pub on_exhausted: ExhaustedPolicy,
    pub assembly: String,
    pub myvariant: EndpointConfig,
    pub ensembl: EndpointConfig,
    pub trials: TrialsConfig,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            sources: vec![SourceKind::MyVariant, SourceKind::Ensembl],
            on_exhausted: ExhaustedPolicy::default(),
            assembly: DEFAULT_ASSEMBLY.to_string(),
            myvariant: EndpointConfig::default(),
            ensembl: EndpointConfig::default(),
            trials: TrialsConfig::default(),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn endpoint(&self, kind: SourceKind) -> &EndpointConfig {
        match kind {
            SourceKind::MyVariant => &self.myvariant,
            SourceKind::Ensembl => &self.ensembl,
        }
    }

    /// Apply one timeout to every remote endpoint
    pub fn set_timeout(&mut self, timeout_secs: u64) {
        self.myvariant.timeout_secs = timeout_secs;
        self.ensembl.timeout_secs = timeout_secs;
        self.trials.endpoint.timeout_secs = timeout_secs;
    }
}
