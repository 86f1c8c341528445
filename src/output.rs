use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use csv::{ReaderBuilder, Writer, WriterBuilder};
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tabled::settings::object::Segment;
use tabled::settings::{Style, Width};
use tabled::{Table, Tabled};

use crate::pipeline::RunSummary;
use crate::plot;
use crate::types::*;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Terminal table on stdout
    #[default]
    Table,
    Csv,
    Tsv,
    Json,
    Html,
    /// SVG scatter of variant positions
    Plot,
    /// Markdown list of external links
    Links,
    All,
}

/// Everything produced by one annotation run
#[derive(Debug, Default, Serialize)]
pub struct AnnotationReport {
    pub input: String,
    pub summary: RunSummary,
    pub results: Vec<AnnotationResult>,
    pub trials: Vec<TrialSearch>,
}

impl AnnotationReport {
    pub fn new(input: impl Into<String>, results: Vec<AnnotationResult>) -> Self {
        Self {
            input: input.into(),
            summary: RunSummary::from_results(&results),
            results,
            trials: Vec::new(),
        }
    }

    /// Records that carry an external link, in input order
    pub fn linked(&self) -> impl Iterator<Item = &AnnotationResult> {
        self.results.iter().filter(|r| r.has_link())
    }
}

/// Report generator for annotation results
pub struct ReportGenerator {
    output_dir: PathBuf,
    timestamp: String,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            timestamp: Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
        })
    }

    /// Generate reports in the specified format(s); returns the files written
    pub fn generate(&self, report: &AnnotationReport, format: ReportFormat) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        match format {
            ReportFormat::Table => print!("{}", render_table(&report.results)),
            ReportFormat::Csv => written.push(self.generate_csv_report(report)?),
            ReportFormat::Tsv => written.push(self.generate_tsv_report(report)?),
            ReportFormat::Json => written.push(self.generate_json_report(report)?),
            ReportFormat::Html => written.push(self.generate_html_report(report)?),
            ReportFormat::Plot => written.push(self.generate_plot(report)?),
            ReportFormat::Links => written.push(self.generate_links_report(report)?),
            ReportFormat::All => {
                print!("{}", render_table(&report.results));
                written.push(self.generate_csv_report(report)?);
                written.push(self.generate_tsv_report(report)?);
                written.push(self.generate_json_report(report)?);
                written.push(self.generate_html_report(report)?);
                written.push(self.generate_plot(report)?);
                written.push(self.generate_links_report(report)?);
            }
        }

        Ok(written)
    }

    fn report_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", stem, self.timestamp, extension))
    }

    fn generate_csv_report(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("annotated_variants", "csv");
        let wtr = Writer::from_path(&filename)
            .with_context(|| format!("Failed to create CSV writer for {}", filename.display()))?;
        write_delimited(wtr, &report.results)?;
        Ok(filename)
    }

    fn generate_tsv_report(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("annotated_variants", "tsv");
        let wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&filename)
            .with_context(|| format!("Failed to create TSV writer for {}", filename.display()))?;
        write_delimited(wtr, &report.results)?;
        Ok(filename)
    }

    fn generate_json_report(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("report", "json");
        let json_content =
            to_string_pretty(report).with_context(|| "Failed to serialize results to JSON")?;

        fs::write(&filename, json_content)
            .with_context(|| format!("Failed to write JSON report to {}", filename.display()))?;
        Ok(filename)
    }

    fn generate_html_report(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("report", "html");
        fs::write(&filename, create_html_content(report))
            .with_context(|| format!("Failed to write HTML report to {}", filename.display()))?;
        Ok(filename)
    }

    fn generate_plot(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("variant_positions", "svg");
        plot::write_scatter(&report.results, &filename)?;
        Ok(filename)
    }

    fn generate_links_report(&self, report: &AnnotationReport) -> Result<PathBuf> {
        let filename = self.report_path("links", "md");
        let mut content = String::from("# External Links\n\n");
        for line in link_lines(&report.results) {
            content.push_str(&format!("- {}\n", line));
        }

        fs::write(&filename, content)
            .with_context(|| format!("Failed to write link list to {}", filename.display()))?;
        Ok(filename)
    }
}

fn write_delimited<W: Write>(mut wtr: Writer<W>, results: &[AnnotationResult]) -> Result<()> {
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

/// CSV export as UTF-8 bytes: header row, no index column
pub fn csv_bytes(results: &[AnnotationResult]) -> Result<Vec<u8>> {
    let mut wtr = Writer::from_writer(Vec::new());
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV export: {}", e))
}

/// Load a previously exported CSV
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<AnnotationResult>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    rdr.deserialize()
        .collect::<Result<Vec<AnnotationResult>, _>>()
        .context("Failed to parse annotation CSV")
}

/// `[gene (condition) - significance](link)` for every linked record
pub fn link_lines(results: &[AnnotationResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.has_link())
        .map(AnnotationResult::link_label)
        .collect()
}

/// Terminal view of one result
#[derive(Tabled)]
struct TableRow<'a> {
    #[tabled(rename = "chr")]
    chromosome: &'a str,
    #[tabled(rename = "pos")]
    position: u64,
    #[tabled(rename = "ref")]
    reference: &'a str,
    #[tabled(rename = "alt")]
    alternate: &'a str,
    gene: &'a str,
    clinical_significance: &'a str,
    condition: &'a str,
    source: &'a str,
}

impl<'a> From<&'a AnnotationResult> for TableRow<'a> {
    fn from(result: &'a AnnotationResult) -> Self {
        Self {
            chromosome: &result.chromosome,
            position: result.position,
            reference: &result.reference,
            alternate: &result.alternate,
            gene: &result.gene,
            clinical_significance: &result.clinical_significance,
            condition: &result.condition,
            source: &result.source,
        }
    }
}

/// Widest cell allowed in the terminal table before truncation
const MAX_CELL_WIDTH: usize = 40;

/// Lines above the first data row: header and separator
const TABLE_HEADER_LINES: usize = 2;

/// Results table for the terminal. Error rows are red, fallback rows yellow.
pub fn render_table(results: &[AnnotationResult]) -> String {
    let mut table = Table::new(results.iter().map(TableRow::from));
    table.with(Style::psql()).modify(
        Segment::all(),
        Width::truncate(MAX_CELL_WIDTH).suffix("…"),
    );

    let rendered = table.to_string();
    let mut out = String::new();
    for (index, line) in rendered.lines().enumerate() {
        let line = match index.checked_sub(TABLE_HEADER_LINES) {
            None if index == 0 => style(line).bold().cyan().to_string(),
            None => line.to_string(),
            Some(row) => match results.get(row) {
                Some(result) if result.is_error() => style(line).red().to_string(),
                Some(result) if result.is_fallback() => style(line).yellow().to_string(),
                _ => line.to_string(),
            },
        };
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn create_html_content(report: &AnnotationReport) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Variant Annotation Report</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            margin: 40px;
            background-color: #f5f5f5;
        }}
        .container {{
            max-width: 1400px;
            margin: 0 auto;
            background-color: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
        }}
        h1, h2, h3 {{
            color: #2c3e50;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            margin: 20px 0;
        }}
        th, td {{
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }}
        th {{
            background-color: #3498db;
            color: white;
        }}
        tr:nth-child(even) {{
            background-color: #f2f2f2;
        }}
        .summary-box {{
            background-color: #e8f4f8;
            padding: 20px;
            border-radius: 5px;
            margin: 20px 0;
        }}
        .fallback {{
            background-color: #fff3cd;
        }}
        .error {{
            background-color: #f8d7da;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Variant Annotation Report</h1>
        <p>Generated on: {}</p>

        <div class="summary-box">
            <h2>Summary</h2>
            <p>{}: {} variants, {} annotated, {} fallback, {} errors.</p>
        </div>

        {}
        {}
        {}
    </div>
</body>
</html>"#,
        timestamp,
        escape_html(&report.input),
        report.summary.variants,
        report.summary.annotated,
        report.summary.fallback,
        report.summary.errors,
        results_html(&report.results),
        links_html(report),
        trials_html(&report.trials)
    )
}

fn results_html(results: &[AnnotationResult]) -> String {
    if results.is_empty() {
        return "<div class=\"section\"><h2>Annotations</h2><p>No variants found.</p></div>"
            .to_string();
    }

    let mut html = "<div class=\"section\"><h2>Annotations</h2>\n<table>\n<tr><th>Chr</th><th>Position</th><th>Ref</th><th>Alt</th><th>Gene</th><th>Clinical Significance</th><th>Condition</th><th>Source</th></tr>\n".to_string();

    for result in results {
        let class = if result.is_error() {
            " class=\"error\""
        } else if result.is_fallback() {
            " class=\"fallback\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            escape_html(&result.chromosome),
            result.position,
            escape_html(&result.reference),
            escape_html(&result.alternate),
            escape_html(&result.gene),
            escape_html(&result.clinical_significance),
            escape_html(&result.condition),
            escape_html(&result.source)
        ));
    }

    html.push_str("</table>\n</div>\n");
    html
}

fn links_html(report: &AnnotationReport) -> String {
    let items: Vec<String> = report
        .linked()
        .map(|r| {
            format!(
                "<li><a href=\"{}\">{} ({}) - {}</a></li>",
                escape_html(&r.link),
                escape_html(&r.gene),
                escape_html(&r.condition),
                escape_html(&r.clinical_significance)
            )
        })
        .collect();

    if items.is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"section\"><h2>External Links</h2>\n<ul>\n{}\n</ul>\n</div>\n",
        items.join("\n")
    )
}

fn trials_html(trials: &[TrialSearch]) -> String {
    if trials.is_empty() {
        return String::new();
    }

    let mut html = "<div class=\"section\"><h2>Clinical Trials</h2>\n".to_string();
    for search in trials {
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&search.condition)));
        if let Some(message) = &search.message {
            html.push_str(&format!("<p>{}</p>\n", escape_html(message)));
        }
        if !search.studies.is_empty() {
            html.push_str("<ul>\n");
            for study in &search.studies {
                html.push_str(&format!(
                    "<li><a href=\"{}\">{}</a>: {} ({})</li>\n",
                    escape_html(&study.url),
                    escape_html(&study.nct_id),
                    escape_html(&study.title),
                    escape_html(&study.status)
                ));
            }
            html.push_str("</ul>\n");
        }
    }
    html.push_str("</div>\n");
    html
}
