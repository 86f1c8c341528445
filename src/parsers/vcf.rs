use std::io::BufRead;
use std::path::Path;
use tracing::debug;

use crate::error::ExtractError;
use crate::parsers::{normalize_chromosome, open_file};
use crate::types::VariantRecord;

/// Minimum number of tab-separated columns (CHROM..ALT) for a usable line
const MIN_COLUMNS: usize = 5;

/// Extracts variant records from Variant Call Format text.
///
/// Header and comment lines (`#`) are skipped, as are lines with fewer than
/// five columns. Each comma-separated ALT allele becomes its own record.
#[derive(Debug, Default, Clone, Copy)]
pub struct VcfExtractor;

impl VcfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_str(&self, text: &str) -> Result<Vec<VariantRecord>, ExtractError> {
        self.extract_lines(text.lines())
    }

    pub fn extract_lines<I, S>(&self, lines: I) -> Result<Vec<VariantRecord>, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            self.parse_variant_line(idx + 1, line.as_ref(), &mut records)?;
        }
        Ok(records)
    }

    /// Read a plain or gzip-compressed VCF from disk
    pub fn extract_file(&self, path: &Path) -> Result<Vec<VariantRecord>, ExtractError> {
        let io_error = |source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        };

        let reader = open_file(path).map_err(io_error)?;
        let lines = reader.lines().collect::<Result<Vec<_>, _>>().map_err(io_error)?;
        self.extract_lines(lines)
    }

    fn parse_variant_line(
        &self,
        line_number: usize,
        line: &str,
        records: &mut Vec<VariantRecord>,
    ) -> Result<(), ExtractError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < MIN_COLUMNS {
            debug!(
                "Skipping line {}: {} columns, need {}",
                line_number,
                parts.len(),
                MIN_COLUMNS
            );
            return Ok(());
        }

        let chromosome = normalize_chromosome(parts[0]);
        let position: u64 =
            parts[1]
                .trim()
                .parse()
                .map_err(|_| ExtractError::InvalidPosition {
                    line: line_number,
                    value: parts[1].to_string(),
                })?;
        let reference = parts[3];

        for alternate in parts[4].split(',') {
            records.push(VariantRecord::new(
                chromosome.clone(),
                position,
                reference,
                alternate,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_multi_allelic_line() {
        let records = VcfExtractor::new()
            .extract_str("chr1\t100\trs1\tA\tT,G")
            .unwrap();

        assert_eq!(
            records,
            vec![
                VariantRecord::new("1", 100, "A", "T"),
                VariantRecord::new("1", 100, "A", "G"),
            ]
        );
    }

    #[test]
    fn test_skips_headers_and_short_lines() {
        let text = "##fileformat=VCFv4.2\n\
                    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                    1\t100\trs1\tA\n\
                    \n\
                    2\t200\t.\tC\tT\t50\tPASS\t.\n";

        let records = VcfExtractor::new().extract_str(text).unwrap();
        assert_eq!(records, vec![VariantRecord::new("2", 200, "C", "T")]);
    }

    #[test]
    fn test_alternate_count_matches_records() {
        let alternates = ["T", "T,G", "T,G,C", "T,G,C,<DEL>"];
        for alt in alternates {
            let line = format!("X\t5000\t.\tA\t{}", alt);
            let records = VcfExtractor::new().extract_str(&line).unwrap();

            assert_eq!(records.len(), alt.split(',').count());
            assert!(records
                .iter()
                .all(|r| r.chromosome == "X" && r.position == 5000 && r.reference == "A"));
        }
    }

    #[test]
    fn test_invalid_position_aborts() {
        let text = "1\t100\t.\tA\tT\n1\tabc\t.\tA\tT\n";
        let err = VcfExtractor::new().extract_str(text).unwrap_err();

        match err {
            ExtractError::InvalidPosition { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_windows_line_endings() {
        let records = VcfExtractor::new()
            .extract_str("1\t100\t.\tA\tT\r\n")
            .unwrap();
        assert_eq!(records[0].alternate, "T");
    }

    #[test]
    fn test_non_ascii_chromosome_and_padding() {
        let records = VcfExtractor::new()
            .extract_str("aa€1\t100\t.\tA\tT\n  chr2\t200\t.\tC\tG\n")
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chromosome, "aa€1");
        assert_eq!(records[1].chromosome, "2");
        assert_eq!(records[1].position, 200);
    }

    #[test]
    fn test_largest_position_is_accepted() {
        let records = VcfExtractor::new()
            .extract_str("1\t18446744073709551615\t.\tAC\tT\n")
            .unwrap();
        assert_eq!(records[0].position, u64::MAX);
        assert_eq!(records[0].end(), u64::MAX);
    }

    #[test]
    fn test_extract_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let vcf_path = temp_dir.path().join("test.vcf");
        let mut vcf_file = File::create(&vcf_path)?;
        writeln!(vcf_file, "##fileformat=VCFv4.2")?;
        writeln!(vcf_file, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO")?;
        writeln!(vcf_file, "1\t100\t.\tA\tT\t30\tPASS\t.")?;
        writeln!(vcf_file, "7\t117559590\t.\tATCT\tA\t30\tPASS\t.")?;

        let records = VcfExtractor::new().extract_file(&vcf_path)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].reference, "ATCT");
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = VcfExtractor::new()
            .extract_file(Path::new("/nonexistent/calls.vcf"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}
