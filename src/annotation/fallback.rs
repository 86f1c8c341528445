use crate::config::{ExhaustedPolicy, DEFAULT_ASSEMBLY};
use crate::types::*;

const GENOME_BROWSER_URL: &str = "https://genome.ucsc.edu/cgi-bin/hgTracks";

/// Genome browser deep link built from the coordinates alone
pub fn genome_browser_link(assembly: &str, chromosome: &str, position: u64) -> String {
    format!(
        "{}?db={}&position=chr{}:{}",
        GENOME_BROWSER_URL, assembly, chromosome, position
    )
}

/// Synthesizes a record for a variant that no source could annotate
#[derive(Debug, Clone)]
pub struct FallbackBuilder {
    policy: ExhaustedPolicy,
    assembly: String,
}

impl Default for FallbackBuilder {
    fn default() -> Self {
        Self::new(ExhaustedPolicy::Placeholder, DEFAULT_ASSEMBLY)
    }
}

impl FallbackBuilder {
    pub fn new(policy: ExhaustedPolicy, assembly: &str) -> Self {
        Self {
            policy,
            assembly: assembly.to_string(),
        }
    }

    pub fn policy(&self) -> ExhaustedPolicy {
        self.policy
    }

    /// `failures` holds `(source name, error message)` in the order tried
    pub fn build(&self, variant: &VariantRecord, failures: &[(String, String)]) -> AnnotationResult {
        match self.policy {
            ExhaustedPolicy::Placeholder => self.placeholder(variant, failures),
            ExhaustedPolicy::Error => match failures.last() {
                Some((source, message)) => error_record(variant, source, message),
                None => self.placeholder(variant, failures),
            },
        }
    }

    pub fn placeholder(
        &self,
        variant: &VariantRecord,
        failures: &[(String, String)],
    ) -> AnnotationResult {
        let error = if failures.is_empty() {
            "no lookup sources configured".to_string()
        } else {
            failures
                .iter()
                .map(|(source, message)| format!("{}: {}", source, message))
                .collect::<Vec<_>>()
                .join("; ")
        };

        AnnotationResult {
            gene: UNKNOWN_GENE.to_string(),
            condition: NOT_FOUND_CONDITION.to_string(),
            link: genome_browser_link(&self.assembly, &variant.chromosome, variant.position),
            error: Some(error),
            ..AnnotationResult::for_variant(variant, FALLBACK_SOURCE)
        }
    }
}

/// Explicit failure record, tagged `"<source> (fail)"`
pub fn error_record(variant: &VariantRecord, source: &str, message: &str) -> AnnotationResult {
    AnnotationResult {
        clinical_significance: ERROR_SIGNIFICANCE.to_string(),
        condition: message.to_string(),
        error: Some(message.to_string()),
        ..AnnotationResult::for_variant(variant, format!("{} (fail)", source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failures() -> Vec<(String, String)> {
        vec![
            ("MyVariant.info".to_string(), "HTTP 404".to_string()),
            ("Ensembl".to_string(), "request timed out".to_string()),
        ]
    }

    #[test]
    fn test_placeholder() {
        let variant = VariantRecord::new("7", 117559590, "ATCT", "A");
        let result = FallbackBuilder::default().build(&variant, &failures());

        assert_eq!(result.source, FALLBACK_SOURCE);
        assert_eq!(result.gene, UNKNOWN_GENE);
        assert_eq!(result.condition, NOT_FOUND_CONDITION);
        assert_eq!(result.clinical_significance, NOT_AVAILABLE);
        assert_eq!(
            result.link,
            "https://genome.ucsc.edu/cgi-bin/hgTracks?db=hg38&position=chr7:117559590"
        );
        assert_eq!(
            result.error.as_deref(),
            Some("MyVariant.info: HTTP 404; Ensembl: request timed out")
        );
    }

    #[test]
    fn test_link_ignores_alleles() {
        let builder = FallbackBuilder::default();
        let a = builder.build(&VariantRecord::new("1", 100, "A", "T"), &failures());
        let b = builder.build(&VariantRecord::new("1", 100, "G", "C"), &[]);
        assert_eq!(a.link, b.link);
        assert_eq!(b.error.as_deref(), Some("no lookup sources configured"));
    }

    #[test]
    fn test_error_policy() {
        let variant = VariantRecord::new("1", 100, "A", "T");
        let builder = FallbackBuilder::new(ExhaustedPolicy::Error, "hg19");
        let result = builder.build(&variant, &failures());

        assert_eq!(result.source, "Ensembl (fail)");
        assert_eq!(result.clinical_significance, ERROR_SIGNIFICANCE);
        assert_eq!(result.condition, "request timed out");
        assert_eq!(result.gene, NOT_AVAILABLE);
        assert!(result.link.is_empty());
        assert!(result.is_error());
    }

    #[test]
    fn test_error_policy_without_sources() {
        let variant = VariantRecord::new("1", 100, "A", "T");
        let builder = FallbackBuilder::new(ExhaustedPolicy::Error, "hg19");
        let result = builder.build(&variant, &[]);

        assert!(result.is_fallback());
        assert!(result.link.contains("db=hg19"));
    }
}
