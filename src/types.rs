use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal used for any field a source did not provide
pub const NOT_AVAILABLE: &str = "NA";

/// Gene label of a placeholder record
pub const UNKNOWN_GENE: &str = "Unknown";

/// Clinical significance of an explicit error record
pub const ERROR_SIGNIFICANCE: &str = "Error";

/// Condition of a placeholder record
pub const NOT_FOUND_CONDITION: &str = "Not found in any source";

/// Source tag of a placeholder record
pub const FALLBACK_SOURCE: &str = "Manual Fallback";

/// One alternate allele observed at a genomic position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantRecord {
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}

impl VariantRecord {
    pub fn new(
        chromosome: impl Into<String>,
        position: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// Last reference base covered by this variant
    pub fn end(&self) -> u64 {
        let span = self.reference.len().max(1) as u64;
        self.position.saturating_add(span - 1)
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chromosome, self.position, self.reference, self.alternate
        )
    }
}

/// Annotation of a single variant, one per `VariantRecord`.
///
/// Every field is always populated. Values a source does not supply are
/// [`NOT_AVAILABLE`]; a missing link is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    #[serde(rename = "chr")]
    pub chromosome: String,
    #[serde(rename = "pos")]
    pub position: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "alt")]
    pub alternate: String,
    pub gene: String,
    pub clinical_significance: String,
    pub condition: String,
    pub link: String,
    pub source: String,
    pub error: Option<String>,
}

impl AnnotationResult {
    /// Start a result for `variant` with every annotation field defaulted
    pub fn for_variant(variant: &VariantRecord, source: impl Into<String>) -> Self {
        Self {
            chromosome: variant.chromosome.clone(),
            position: variant.position,
            reference: variant.reference.clone(),
            alternate: variant.alternate.clone(),
            gene: NOT_AVAILABLE.to_string(),
            clinical_significance: NOT_AVAILABLE.to_string(),
            condition: NOT_AVAILABLE.to_string(),
            link: String::new(),
            source: source.into(),
            error: None,
        }
    }

    pub fn has_link(&self) -> bool {
        !self.link.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == FALLBACK_SOURCE
    }

    pub fn is_error(&self) -> bool {
        self.clinical_significance == ERROR_SIGNIFICANCE
    }

    /// Whether `condition` is worth a clinical trial search
    pub fn has_searchable_condition(&self) -> bool {
        is_searchable_condition(&self.condition)
    }

    /// Markdown link line used by the link list
    pub fn link_label(&self) -> String {
        format!(
            "[{} ({}) - {}]({})",
            self.gene, self.condition, self.clinical_significance, self.link
        )
    }
}

pub fn is_searchable_condition(condition: &str) -> bool {
    let condition = condition.trim();
    !condition.is_empty() && condition != NOT_AVAILABLE && condition != NOT_FOUND_CONDITION
}

/// A single clinical study returned by the trial search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub nct_id: String,
    pub title: String,
    pub status: String,
    pub url: String,
}

/// Outcome of a clinical trial search; failures leave `studies` empty and
/// explain themselves in `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialSearch {
    pub condition: String,
    pub query_term: String,
    pub studies: Vec<Study>,
    pub message: Option<String>,
}

impl TrialSearch {
    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_defaults() {
        let variant = VariantRecord::new("1", 100, "A", "T");
        let result = AnnotationResult::for_variant(&variant, "MyVariant.info");

        assert_eq!(result.chromosome, "1");
        assert_eq!(result.position, 100);
        assert_eq!(result.gene, NOT_AVAILABLE);
        assert_eq!(result.clinical_significance, NOT_AVAILABLE);
        assert!(!result.has_link());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_variant_end() {
        assert_eq!(VariantRecord::new("1", 100, "A", "T").end(), 100);
        assert_eq!(VariantRecord::new("1", 100, "ACG", "A").end(), 102);
        assert_eq!(VariantRecord::new("1", u64::MAX, "ACG", "A").end(), u64::MAX);
    }

    #[test]
    fn test_searchable_condition() {
        assert!(is_searchable_condition("Breast Cancer"));
        assert!(!is_searchable_condition(NOT_AVAILABLE));
        assert!(!is_searchable_condition(NOT_FOUND_CONDITION));
        assert!(!is_searchable_condition("  "));
    }
}
