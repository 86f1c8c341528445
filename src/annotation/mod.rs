//! Multi-source variant annotation.
//!
//! A [`Resolver`] walks a prioritized list of [`LookupSource`]s for each
//! variant and keeps the first usable answer. When every source fails it
//! asks its [`FallbackBuilder`] for a synthetic record, so resolution never
//! fails.

use tracing::{debug, warn};

use crate::config::ExhaustedPolicy;
use crate::error::LookupError;
use crate::types::{AnnotationResult, VariantRecord};

pub mod ensembl;
pub mod fallback;
pub mod fields;
#[cfg(feature = "http")]
pub mod http;
pub mod myvariant;

pub use fallback::{genome_browser_link, FallbackBuilder};

/// One remote annotation service
pub trait LookupSource {
    /// Tag written to `AnnotationResult::source`
    fn name(&self) -> &str;

    fn lookup(&self, variant: &VariantRecord) -> Result<AnnotationResult, LookupError>;
}

/// Tries sources in order; first success wins
pub struct Resolver {
    sources: Vec<Box<dyn LookupSource>>,
    fallback: FallbackBuilder,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Vec::new(), FallbackBuilder::default())
    }
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn LookupSource>>, fallback: FallbackBuilder) -> Self {
        Self { sources, fallback }
    }

    pub fn with_source(mut self, source: impl LookupSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn policy(&self) -> ExhaustedPolicy {
        self.fallback.policy()
    }

    /// Annotate one variant. Always yields exactly one result whose
    /// coordinates match `variant`.
    pub fn resolve(&self, variant: &VariantRecord) -> AnnotationResult {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.lookup(variant) {
                Ok(result) => {
                    debug!("{} annotated by {}", variant, source.name());
                    return result;
                }
                Err(e) => {
                    warn!("{} lookup failed for {}: {}", source.name(), variant, e);
                    failures.push((source.name().to_string(), e.to_string()));
                }
            }
        }

        debug!("{} not found in any source", variant);
        self.fallback.build(variant, &failures)
    }
}

#[cfg(feature = "http")]
mod build {
    use super::*;
    use crate::config::{AnnotatorConfig, SourceKind};

    impl Resolver {
        /// Build the HTTP-backed resolver described by `config`
        pub fn from_config(config: &AnnotatorConfig) -> Result<Self, LookupError> {
            let mut sources: Vec<Box<dyn LookupSource>> = Vec::new();
            for kind in &config.sources {
                let endpoint = config.endpoint(*kind);
                match kind {
                    SourceKind::MyVariant => {
                        sources.push(Box::new(myvariant::MyVariantSource::new(endpoint)?))
                    }
                    SourceKind::Ensembl => {
                        sources.push(Box::new(ensembl::EnsemblSource::new(endpoint)?))
                    }
                }
            }

            Ok(Self::new(
                sources,
                FallbackBuilder::new(config.on_exhausted, &config.assembly),
            ))
        }
    }
}
