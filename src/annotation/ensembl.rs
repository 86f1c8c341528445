use serde_json::Value;

use crate::annotation::fields::{first, first_text, text_at};
use crate::error::LookupError;
use crate::types::{AnnotationResult, VariantRecord};

pub const SOURCE_NAME: &str = "Ensembl";

const VARIATION_URL: &str = "https://www.ensembl.org/Homo_sapiens/Variation/Explore";

/// VEP region key, e.g. `7:117559590-117559593:1/A`
pub fn coordinate_expression(variant: &VariantRecord) -> String {
    format!(
        "{}:{}-{}:1/{}",
        variant.chromosome,
        variant.position,
        variant.end(),
        variant.alternate
    )
}

/// Map a VEP region response (a list of consequence blocks) onto a result
pub fn annotation_from_json(
    variant: &VariantRecord,
    doc: &Value,
) -> Result<AnnotationResult, LookupError> {
    let blocks = doc
        .as_array()
        .ok_or_else(|| LookupError::Decode("expected a JSON list".into()))?;
    let block = blocks.first().ok_or(LookupError::NoData)?;

    let mut result = AnnotationResult::for_variant(variant, SOURCE_NAME);

    if let Some(gene) = block
        .get("transcript_consequences")
        .and_then(first)
        .and_then(|consequence| text_at(consequence, &["gene_symbol"]))
    {
        result.gene = gene;
    }

    if let Some(consequence) = text_at(block, &["most_severe_consequence"]) {
        result.condition = consequence;
    }

    let colocated = block
        .get("colocated_variants")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if let Some(significance) = colocated
        .iter()
        .find_map(|known| known.get("clin_sig").and_then(first_text))
    {
        result.clinical_significance = significance;
    }

    if let Some(id) = colocated.iter().find_map(|known| text_at(known, &["id"])) {
        result.link = format!("{}?v={}", VARIATION_URL, id);
    }

    Ok(result)
}

#[cfg(feature = "http")]
pub use self::remote::EnsemblSource;

#[cfg(feature = "http")]
mod remote {
    use reqwest::blocking::Client;

    use super::*;
    use crate::annotation::http::{build_client, get_json};
    use crate::annotation::LookupSource;
    use crate::config::{EndpointConfig, ENSEMBL_URL};

    /// Secondary annotation source backed by the Ensembl VEP REST endpoint
    pub struct EnsemblSource {
        client: Client,
        base_url: String,
    }

    impl EnsemblSource {
        pub fn new(endpoint: &EndpointConfig) -> Result<Self, LookupError> {
            Ok(Self {
                client: build_client(endpoint.timeout())?,
                base_url: endpoint.base_or(ENSEMBL_URL).to_string(),
            })
        }

        pub fn url(&self, variant: &VariantRecord) -> String {
            format!(
                "{}/vep/human/region/{}?content-type=application/json",
                self.base_url,
                coordinate_expression(variant)
            )
        }
    }

    impl LookupSource for EnsemblSource {
        fn name(&self) -> &str {
            SOURCE_NAME
        }

        fn lookup(&self, variant: &VariantRecord) -> Result<AnnotationResult, LookupError> {
            let doc = get_json(&self.client, &self.url(variant))?;
            annotation_from_json(variant, &doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NOT_AVAILABLE;
    use serde_json::json;

    #[test]
    fn test_coordinate_expression() {
        let snv = VariantRecord::new("1", 100, "A", "T");
        assert_eq!(coordinate_expression(&snv), "1:100-100:1/T");

        let deletion = VariantRecord::new("7", 117559590, "ATCT", "A");
        assert_eq!(coordinate_expression(&deletion), "7:117559590-117559593:1/A");

        let at_end = VariantRecord::new("1", u64::MAX, "AC", "T");
        assert_eq!(
            coordinate_expression(&at_end),
            "1:18446744073709551615-18446744073709551615:1/T"
        );
    }

    #[test]
    fn test_vep_response() {
        let doc = json!([{
            "most_severe_consequence": "missense_variant",
            "transcript_consequences": [
                {"gene_symbol": "BRCA2", "consequence_terms": ["missense_variant"]},
                {"gene_symbol": "ZAR1L"}
            ],
            "colocated_variants": [
                {"id": "COSV66450121"},
                {"id": "rs80358547", "clin_sig": ["pathogenic", "likely_pathogenic"]}
            ]
        }]);

        let variant = VariantRecord::new("13", 32340301, "G", "A");
        let result = annotation_from_json(&variant, &doc).unwrap();

        assert_eq!(result.source, SOURCE_NAME);
        assert_eq!(result.gene, "BRCA2");
        assert_eq!(result.condition, "missense_variant");
        assert_eq!(result.clinical_significance, "pathogenic");
        assert_eq!(
            result.link,
            "https://www.ensembl.org/Homo_sapiens/Variation/Explore?v=COSV66450121"
        );
    }

    #[test]
    fn test_sparse_response() {
        let doc = json!([{"most_severe_consequence": "intergenic_variant"}]);
        let variant = VariantRecord::new("1", 100, "A", "T");
        let result = annotation_from_json(&variant, &doc).unwrap();

        assert_eq!(result.gene, NOT_AVAILABLE);
        assert_eq!(result.clinical_significance, NOT_AVAILABLE);
        assert_eq!(result.condition, "intergenic_variant");
        assert!(result.link.is_empty());
    }

    #[test]
    fn test_unusable_responses() {
        let variant = VariantRecord::new("1", 100, "A", "T");
        assert!(matches!(
            annotation_from_json(&variant, &json!([])),
            Err(LookupError::NoData)
        ));
        assert!(matches!(
            annotation_from_json(&variant, &json!({"error": "bad region"})),
            Err(LookupError::Decode(_))
        ));
    }
}
