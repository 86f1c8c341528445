use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use tracing::info;

use variant_annotator::config::{AnnotatorConfig, ExhaustedPolicy, SourceKind};
use variant_annotator::output::{link_lines, AnnotationReport, ReportFormat, ReportGenerator};
use variant_annotator::parsers::VcfExtractor;
use variant_annotator::pipeline::annotate_records;
use variant_annotator::trials::TrialClient;
use variant_annotator::types::{AnnotationResult, TrialSearch};
use variant_annotator::Resolver;

/// Annotate VCF variants against public genomic annotation services
#[derive(Parser, Debug)]
#[command(
    name = "variant-annotator",
    version,
    about = "Annotate VCF variants with MyVariant.info and Ensembl, with clinical trial lookup",
    long_about = r#"
Reads a VCF file (plain or gzip), expands multi-allelic records, and annotates
every alternate allele in input order:
- MyVariant.info first (gene, ClinVar significance, condition, ClinVar link)
- Ensembl VEP when MyVariant.info has nothing usable
- a genome-browser placeholder when every source fails

Results can be printed as a table or written as CSV, TSV, JSON, HTML, an SVG
position plot, or a list of external links.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// VCF file to annotate ("-" reads standard input)
    #[arg(value_name = "VCF", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, default_value = "./reports")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: ReportFormat,

    /// TOML configuration file
    #[arg(short, long, env = "VARIANT_ANNOTATOR_CONFIG", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Timeout in seconds for every remote request
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Lookup sources in priority order (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    sources: Vec<SourceKind>,

    /// What to emit when every source fails
    #[arg(long, value_enum)]
    on_exhausted: Option<ExhaustedPolicy>,

    /// Genome assembly used for placeholder browser links
    #[arg(long)]
    assembly: Option<String>,

    /// Look up clinical trials for every distinct annotated condition
    #[arg(long)]
    trials: bool,

    /// Interactive mode with prompts for all parameters
    #[arg(short, long, help = "Interactive mode with default values")]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Annotate a VCF file
    Annotate {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },
    /// Search clinical trials for a condition
    Trials {
        condition: String,
        /// Maximum number of studies
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the configured lookup sources
    Sources,
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        generate_completions(shell);
        return Ok(());
    }

    if let Some(Commands::Completions { shell }) = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Some(Commands::Trials { condition, limit }) => {
            let mut client = TrialClient::new(&config.trials)?;
            if let Some(limit) = limit {
                client = client.with_limit(*limit);
            }
            print_trial_search(&client.search(condition));
            return Ok(());
        }
        Some(Commands::Sources) => {
            list_sources(&config);
            return Ok(());
        }
        _ => {}
    }

    if cli.interactive {
        let options = run_interactive_mode()?;
        let report = run_annotation(&config, &options)?;
        return browse_trials(&config, &report);
    }

    let options = RunOptions::from_cli(&cli)?;
    run_annotation(&config, &options)?;

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("variant_annotator={}", level))
        .with_writer(io::stderr)
        .init();
}

/// Defaults, then the config file, then command-line overrides
fn load_config(cli: &Cli) -> Result<AnnotatorConfig> {
    let mut config = match &cli.config {
        Some(path) => AnnotatorConfig::from_file(path)?,
        None => AnnotatorConfig::default(),
    };

    if let Some(timeout) = cli.timeout {
        config.set_timeout(timeout);
    }
    if !cli.sources.is_empty() {
        config.sources = cli.sources.clone();
    }
    if let Some(policy) = cli.on_exhausted {
        config.on_exhausted = policy;
    }
    if let Some(assembly) = &cli.assembly {
        config.assembly = assembly.clone();
    }

    Ok(config)
}

fn list_sources(config: &AnnotatorConfig) {
    println!("{}", style("Lookup sources (in priority order):").bold().cyan());
    println!();

    for (rank, kind) in config.sources.iter().enumerate() {
        let endpoint = config.endpoint(*kind);
        println!(
            "  {}. {} - {}",
            rank + 1,
            style(kind.label()).green().bold(),
            style(endpoint.base_or(kind.public_url())).yellow()
        );
        println!("         timeout {}s", endpoint.timeout_secs);
    }

    println!();
    println!(
        "  When all fail: {}",
        style(format!("{:?}", config.on_exhausted).to_lowercase()).dim()
    );
}

fn run_interactive_mode() -> Result<RunOptions> {
    println!(
        "{}",
        style("╔══════════════════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║          Variant Annotator - Interactive Mode                ║")
            .cyan()
            .bold()
    );
    println!(
        "{}",
        style("╚══════════════════════════════════════════════════════════════╝").cyan()
    );
    println!();

    let theme = ColorfulTheme::default();

    let input: String = Input::with_theme(&theme)
        .with_prompt("VCF file to annotate")
        .interact_text()?;

    let formats = vec![
        ("Terminal table", ReportFormat::Table),
        ("CSV", ReportFormat::Csv),
        ("TSV", ReportFormat::Tsv),
        ("JSON", ReportFormat::Json),
        ("HTML", ReportFormat::Html),
        ("Position plot (SVG)", ReportFormat::Plot),
        ("External links", ReportFormat::Links),
        ("All formats", ReportFormat::All),
    ];
    let labels: Vec<&str> = formats.iter().map(|(label, _)| *label).collect();
    let format_idx = Select::with_theme(&theme)
        .with_prompt("Select output format")
        .default(0)
        .items(&labels)
        .interact()?;

    let output: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default("./reports".to_string())
        .interact_text()?;

    Ok(RunOptions {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        format: formats[format_idx].1,
        trials: false,
    })
}

fn run_annotation(config: &AnnotatorConfig, options: &RunOptions) -> Result<AnnotationReport> {
    let records = VcfExtractor::new()
        .extract_file(&options.input)
        .with_context(|| format!("Failed to read variants from {}", options.input.display()))?;
    info!("Extracted {} variant records", records.len());

    let resolver = Resolver::from_config(config)?;
    info!("Lookup order: {}", resolver.source_names().join(" -> "));

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results = annotate_records(&records, &resolver, |result| {
        pb.set_message(format!("{}:{}", result.chromosome, result.position));
        pb.inc(1);
    });
    pb.finish_with_message("Annotation complete!");

    let mut report = AnnotationReport::new(options.input.display().to_string(), results);
    info!(
        "{} variants: {} annotated, {} fallback, {} errors",
        report.summary.variants,
        report.summary.annotated,
        report.summary.fallback,
        report.summary.errors
    );

    if options.trials {
        let client = TrialClient::new(&config.trials)?;
        report.trials = distinct_conditions(&report.results)
            .into_iter()
            .map(|condition| client.search(condition))
            .collect();
    }

    let generator = ReportGenerator::new(&options.output)?;
    let written = generator.generate(&report, options.format)?;

    if options.format == ReportFormat::Table {
        let links = link_lines(&report.results);
        if !links.is_empty() {
            println!("\n{}", style("External Links").bold().cyan());
            for line in links {
                println!("  {}", line);
            }
        }
    }

    for search in &report.trials {
        print_trial_search(search);
    }

    if !written.is_empty() {
        println!(
            "\n{} Reports saved to: {}",
            style("✓").green().bold(),
            style(options.output.display()).cyan()
        );
        for path in &written {
            println!("  {}", style(path.display()).dim());
        }
    }

    Ok(report)
}

/// Searchable conditions in first-seen order
fn distinct_conditions(results: &[AnnotationResult]) -> Vec<&str> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|r| r.has_searchable_condition())
        .map(|r| r.condition.as_str())
        .filter(|condition| seen.insert(*condition))
        .collect()
}

/// Let the user pick annotated records and search trials for their condition
fn browse_trials(config: &AnnotatorConfig, report: &AnnotationReport) -> Result<()> {
    let candidates: Vec<&AnnotationResult> = report
        .results
        .iter()
        .filter(|r| r.has_searchable_condition())
        .collect();
    if candidates.is_empty() {
        println!("{}", style("No annotated conditions to search trials for.").dim());
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    if !Confirm::with_theme(&theme)
        .with_prompt("Search clinical trials for a variant?")
        .default(true)
        .interact()?
    {
        return Ok(());
    }

    let client = TrialClient::new(&config.trials)?;
    let mut items: Vec<String> = candidates
        .iter()
        .map(|r| {
            format!(
                "{}:{} {}>{}  {} - {}",
                r.chromosome, r.position, r.reference, r.alternate, r.gene, r.condition
            )
        })
        .collect();
    items.push("Done".to_string());

    loop {
        let idx = Select::with_theme(&theme)
            .with_prompt("Select a variant")
            .default(0)
            .items(&items)
            .interact()?;

        match candidates.get(idx) {
            Some(record) => print_trial_search(&client.search(&record.condition)),
            None => return Ok(()),
        }
    }
}

fn print_trial_search(search: &TrialSearch) {
    println!(
        "\n{} {}",
        style("Clinical trials for").bold().cyan(),
        style(&search.condition).bold()
    );

    if let Some(message) = &search.message {
        println!("  {}", style(message).yellow());
    }

    for study in &search.studies {
        println!(
            "  {} {} ({})",
            style(&study.nct_id).green(),
            study.title,
            style(&study.status).dim()
        );
        println!("         {}", style(&study.url).dim());
    }
}

#[derive(Debug)]
struct RunOptions {
    input: PathBuf,
    output: PathBuf,
    format: ReportFormat,
    trials: bool,
}

impl RunOptions {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let input = match &cli.command {
            Some(Commands::Annotate { input }) => input.clone(),
            _ => cli
                .input
                .clone()
                .ok_or_else(|| anyhow!("No VCF file given (pass a path or use --interactive)"))?,
        };

        Ok(Self {
            input,
            output: cli.output.clone(),
            format: cli.format,
            trials: cli.trials,
        })
    }
}
