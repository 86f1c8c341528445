use tracing::info;

use crate::annotation::Resolver;
use crate::error::ExtractError;
use crate::parsers::VcfExtractor;
use crate::types::{AnnotationResult, VariantRecord};

/// Counts of how each variant was annotated
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunSummary {
    pub variants: usize,
    pub annotated: usize,
    pub fallback: usize,
    pub errors: usize,
    pub with_links: usize,
}

impl RunSummary {
    pub fn from_results(results: &[AnnotationResult]) -> Self {
        let mut summary = RunSummary {
            variants: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.is_fallback() {
                summary.fallback += 1;
            } else if result.is_error() {
                summary.errors += 1;
            } else {
                summary.annotated += 1;
            }
            if result.has_link() {
                summary.with_links += 1;
            }
        }

        summary
    }
}

/// Resolve every record in input order. `on_progress` runs after each one.
pub fn annotate_records<F>(
    records: &[VariantRecord],
    resolver: &Resolver,
    mut on_progress: F,
) -> Vec<AnnotationResult>
where
    F: FnMut(&AnnotationResult),
{
    records
        .iter()
        .map(|record| {
            let result = resolver.resolve(record);
            on_progress(&result);
            result
        })
        .collect()
}

/// Extract and annotate a whole VCF document.
///
/// Extraction finishes before the first lookup, so a malformed position
/// aborts the run without any network traffic.
pub fn annotate_text(
    text: &str,
    resolver: &Resolver,
) -> Result<Vec<AnnotationResult>, ExtractError> {
    let records = VcfExtractor::new().extract_str(text)?;
    info!("Extracted {} variant records", records.len());
    Ok(annotate_records(&records, resolver, |_| {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::tests::FakeSource;
    use crate::error::LookupError;

    const VCF: &str = "##fileformat=VCFv4.2\n\
                       #CHROM\tPOS\tID\tREF\tALT\n\
                       chr1\t100\trs1\tA\tT,G\n\
                       2\t200\t.\tC\n\
                       3\t300\t.\tG\tA\n\
                       chr1\t100\trs1\tA\tT\n";

    #[test]
    fn test_results_follow_input_order() {
        let resolver = Resolver::default().with_source(FakeSource::ok("MyVariant.info"));
        let results = annotate_text(VCF, &resolver).unwrap();

        let coords: Vec<(&str, u64, &str, &str)> = results
            .iter()
            .map(|r| {
                (
                    r.chromosome.as_str(),
                    r.position,
                    r.reference.as_str(),
                    r.alternate.as_str(),
                )
            })
            .collect();
        assert_eq!(
            coords,
            vec![
                ("1", 100, "A", "T"),
                ("1", 100, "A", "G"),
                ("3", 300, "G", "A"),
                ("1", 100, "A", "T"),
            ]
        );
    }

    #[test]
    fn test_repeated_variants_are_looked_up_again() {
        let source = FakeSource::ok("MyVariant.info");
        let calls = source.counter();
        let resolver = Resolver::default().with_source(source);

        annotate_text(VCF, &resolver).unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_parse_error_skips_lookups() {
        let source = FakeSource::ok("MyVariant.info");
        let calls = source.counter();
        let resolver = Resolver::default().with_source(source);

        let err = annotate_text("1\t100\t.\tA\tT\n1\tpos\t.\tA\tT\n", &resolver).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPosition { line: 2, .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_total_outage_still_yields_every_row() {
        let resolver = Resolver::default()
            .with_source(FakeSource::failing("MyVariant.info", || LookupError::Timeout))
            .with_source(FakeSource::failing("Ensembl", || LookupError::Status(503)));

        let results = annotate_text(VCF, &resolver).unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_fallback() && r.has_link()));

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.variants, 4);
        assert_eq!(summary.fallback, 4);
        assert_eq!(summary.annotated, 0);
    }

    #[test]
    fn test_progress_callback() {
        let resolver = Resolver::default().with_source(FakeSource::ok("Ensembl"));
        let records = vec![
            VariantRecord::new("1", 1, "A", "T"),
            VariantRecord::new("1", 2, "A", "T"),
        ];

        let mut seen = Vec::new();
        let results = annotate_records(&records, &resolver, |r| seen.push(r.position));
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(results.len(), 2);
    }
}
