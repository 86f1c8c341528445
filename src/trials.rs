//! Clinical trial search keyed by a record's condition.

use serde_json::Value;

use crate::annotation::fields::{path, text_at};
use crate::error::LookupError;
use crate::types::{Study, TrialSearch, NOT_AVAILABLE};

const STUDY_URL: &str = "https://clinicaltrials.gov/study";
const STUDY_FIELDS: &str = "NCTId,BriefTitle,OverallStatus";

/// Search term for a free-text condition: words are percent-encoded and
/// joined with `+`, so `Breast Cancer` becomes `Breast+Cancer`
pub fn query_term(condition: &str) -> String {
    condition
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// Read up to `limit` studies from a v2 `studies` response
pub fn studies_from_json(doc: &Value, limit: usize) -> Result<Vec<Study>, LookupError> {
    let entries = path(doc, &["studies"])
        .and_then(Value::as_array)
        .ok_or_else(|| LookupError::Decode("missing studies list".into()))?;

    let studies = entries
        .iter()
        .filter_map(|entry| {
            let protocol = entry.get("protocolSection")?;
            let nct_id = text_at(protocol, &["identificationModule", "nctId"])?;
            let field = |keys: &[&str]| {
                text_at(protocol, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            Some(Study {
                url: format!("{}/{}", STUDY_URL, nct_id),
                title: field(&["identificationModule", "briefTitle"]),
                status: field(&["statusModule", "overallStatus"]),
                nct_id,
            })
        })
        .take(limit)
        .collect();

    Ok(studies)
}

/// Empty search carrying a user-facing explanation
pub fn empty_search(condition: &str, message: String) -> TrialSearch {
    TrialSearch {
        condition: condition.to_string(),
        query_term: query_term(condition),
        studies: Vec::new(),
        message: Some(message),
    }
}

fn finish_search(condition: &str, outcome: Result<Vec<Study>, LookupError>) -> TrialSearch {
    match outcome {
        Ok(studies) if studies.is_empty() => empty_search(
            condition,
            format!("No clinical trials found for '{}'", condition),
        ),
        Ok(studies) => TrialSearch {
            condition: condition.to_string(),
            query_term: query_term(condition),
            studies,
            message: None,
        },
        Err(e) => {
            tracing::warn!("Trial lookup failed for '{}': {}", condition, e);
            empty_search(
                condition,
                format!(
                    "Could not retrieve clinical trials for '{}': {}",
                    condition, e
                ),
            )
        }
    }
}

#[cfg(feature = "http")]
pub use self::remote::TrialClient;

#[cfg(feature = "http")]
mod remote {
    use reqwest::blocking::Client;
    use tracing::info;

    use super::*;
    use crate::annotation::http::{build_client, get_json};
    use crate::config::{TrialsConfig, CLINICAL_TRIALS_URL};
    use crate::types::is_searchable_condition;

    /// ClinicalTrials.gov study search
    pub struct TrialClient {
        client: Client,
        base_url: String,
        limit: usize,
    }

    impl TrialClient {
        pub fn new(config: &TrialsConfig) -> Result<Self, LookupError> {
            Ok(Self {
                client: build_client(config.endpoint.timeout())?,
                base_url: config.endpoint.base_or(CLINICAL_TRIALS_URL).to_string(),
                limit: config.limit,
            })
        }

        pub fn with_limit(mut self, limit: usize) -> Self {
            self.limit = limit;
            self
        }

        pub fn url(&self, term: &str) -> String {
            format!(
                "{}/api/v2/studies?query.cond={}&pageSize={}&fields={}&format=json",
                self.base_url, term, self.limit, STUDY_FIELDS
            )
        }

        /// Look up studies for `condition`. Failures come back as an empty
        /// search with a message, never as an error.
        pub fn search(&self, condition: &str) -> TrialSearch {
            if !is_searchable_condition(condition) {
                return empty_search(
                    condition,
                    format!("No searchable condition ('{}')", condition.trim()),
                );
            }

            let term = query_term(condition);
            info!("Searching clinical trials for {}", term);
            let outcome = get_json(&self.client, &self.url(&term))
                .and_then(|doc| studies_from_json(&doc, self.limit));
            finish_search(condition, outcome)
        }
    }
}
