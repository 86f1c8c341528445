use serde_json::Value;

use crate::annotation::fields::{first, first_text, text, text_at};
use crate::error::LookupError;
use crate::types::{AnnotationResult, VariantRecord};

pub const SOURCE_NAME: &str = "MyVariant.info";

const CLINVAR_VARIATION_URL: &str = "https://www.ncbi.nlm.nih.gov/clinvar/variation";

/// Genomic HGVS key, e.g. `chr1:g.100A>T`
pub fn coordinate_expression(variant: &VariantRecord) -> String {
    format!(
        "chr{}:g.{}{}>{}",
        variant.chromosome, variant.position, variant.reference, variant.alternate
    )
}

/// Map a MyVariant.info variant document onto a result.
///
/// Reads `gene.symbol`, `clinvar.clinical_significance`, `clinvar.trait[0]`
/// and `clinvar.rcv[0].accession`. A document carrying neither `gene` nor
/// `clinvar` is not usable.
pub fn annotation_from_json(
    variant: &VariantRecord,
    doc: &Value,
) -> Result<AnnotationResult, LookupError> {
    // Ambiguous keys come back as a list of hits
    let doc = first(doc).ok_or_else(|| LookupError::Decode("expected a JSON object".into()))?;

    let clinvar = doc.get("clinvar");
    if doc.get("gene").is_none() && clinvar.is_none() {
        return Err(LookupError::NoData);
    }

    let mut result = AnnotationResult::for_variant(variant, SOURCE_NAME);

    if let Some(symbol) = text_at(doc, &["gene", "symbol"]) {
        result.gene = symbol;
    }

    if let Some(clinvar) = clinvar {
        if let Some(significance) = clinvar.get("clinical_significance").and_then(first_text) {
            result.clinical_significance = significance;
        }

        if let Some(condition) = clinvar
            .get("trait")
            .and_then(Value::as_array)
            .and_then(|traits| traits.first())
            .and_then(text)
        {
            result.condition = condition;
        }

        if let Some(accession) = clinvar
            .get("rcv")
            .and_then(first)
            .and_then(|rcv| text_at(rcv, &["accession"]))
        {
            result.link = format!("{}/{}", CLINVAR_VARIATION_URL, accession);
        }
    }

    Ok(result)
}

#[cfg(feature = "http")]
pub use self::remote::MyVariantSource;

#[cfg(feature = "http")]
mod remote {
    use reqwest::blocking::Client;

    use super::*;
    use crate::annotation::http::{build_client, get_json};
    use crate::annotation::LookupSource;
    use crate::config::{EndpointConfig, MYVARIANT_URL};

    /// Primary annotation source backed by the MyVariant.info REST API
    pub struct MyVariantSource {
        client: Client,
        base_url: String,
    }

    impl MyVariantSource {
        pub fn new(endpoint: &EndpointConfig) -> Result<Self, LookupError> {
            Ok(Self {
                client: build_client(endpoint.timeout())?,
                base_url: endpoint.base_or(MYVARIANT_URL).to_string(),
            })
        }

        pub fn url(&self, variant: &VariantRecord) -> String {
            format!(
                "{}/v1/variant/{}",
                self.base_url,
                coordinate_expression(variant)
            )
        }
    }

    impl LookupSource for MyVariantSource {
        fn name(&self) -> &str {
            SOURCE_NAME
        }

        fn lookup(&self, variant: &VariantRecord) -> Result<AnnotationResult, LookupError> {
            let doc = get_json(&self.client, &self.url(variant))?;
            annotation_from_json(variant, &doc)
        }
    }
}
