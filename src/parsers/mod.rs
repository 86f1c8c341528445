use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

pub mod vcf;

pub use vcf::VcfExtractor;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a plain or gzip-compressed text file. `-` reads standard input.
pub fn open_file(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    let file = File::open(path)?;

    if read == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Strip the `chr` prefix so `chr1`, `Chr1` and `1` all compare equal
pub fn normalize_chromosome(chrom: &str) -> String {
    let chrom = chrom.trim();
    match (chrom.get(..3), chrom.get(3..)) {
        (Some(prefix), Some(rest)) if !rest.is_empty() && prefix.eq_ignore_ascii_case("chr") => {
            rest.to_string()
        }
        _ => chrom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_chromosome() {
        assert_eq!(normalize_chromosome("chr1"), "1");
        assert_eq!(normalize_chromosome("CHRX"), "X");
        assert_eq!(normalize_chromosome("17"), "17");
        assert_eq!(normalize_chromosome("chr"), "chr");
    }

    #[test]
    fn test_normalize_non_ascii_contig() {
        assert_eq!(normalize_chromosome("aa€1"), "aa€1");
        assert_eq!(normalize_chromosome("chrÜ"), "Ü");
        assert_eq!(normalize_chromosome("é"), "é");
    }

    #[test]
    fn test_open_gzip_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("calls.vcf.gz");

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        writeln!(encoder, "##fileformat=VCFv4.2")?;
        writeln!(encoder, "1\t100\t.\tA\tT")?;
        encoder.finish()?;

        let lines: Vec<String> = open_file(&path)?.lines().collect::<io::Result<_>>()?;
        assert_eq!(lines, vec!["##fileformat=VCFv4.2", "1\t100\t.\tA\tT"]);
        Ok(())
    }

    #[test]
    fn test_open_plain_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("calls.vcf");
        std::fs::write(&path, "1\t100\t.\tA\tT\n")?;

        let mut content = String::new();
        open_file(&path)?.read_to_string(&mut content)?;
        assert_eq!(content, "1\t100\t.\tA\tT\n");
        Ok(())
    }
}
