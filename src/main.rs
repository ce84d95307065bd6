use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pharmaguard::*;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "pharmaguard")]
#[command(author = "PharmaGuard Contributors")]
#[command(version = "0.3.0")]
#[command(about = "CPIC-aligned drug-gene interaction screening", long_about = None)]
struct Args {
    /// Patient genome file (opaque upload; contents are not parsed here)
    #[arg(short, long)]
    input: Option<String>,

    /// Medications to screen (repeat the flag or comma-separate)
    #[arg(short, long, value_delimiter = ',')]
    drugs: Vec<String>,

    /// Knowledge-base snapshot to load for this session (.json or .json.gz)
    #[arg(long)]
    snapshot: Option<String>,

    /// Directory holding the persisted session slot (omit for a volatile session)
    #[arg(long)]
    session_dir: Option<String>,

    /// Write the risk matrix as a TSV file
    #[arg(short, long)]
    output: Option<String>,

    /// Export one cell's clinical report, formatted DRUG:GENE
    #[arg(long)]
    export: Option<String>,

    /// Directory for exported report documents
    #[arg(long, default_value = ".")]
    report_dir: String,

    /// Override the snapshot's patient identifier on exported reports
    #[arg(long)]
    patient_id: Option<String>,

    /// Verify the exported report document against the report schema
    #[arg(long)]
    verify: bool,

    /// Simulated upstream pipeline latency in milliseconds
    #[arg(long, default_value_t = 2500)]
    delay_ms: u64,

    /// List the selectable drug catalog and exit
    #[arg(long)]
    list_drugs: bool,

    /// Statistics report output path
    #[arg(long)]
    stats: Option<String>,

    /// Verbose output mode
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (no progress display)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    if args.list_drugs {
        println!("Selectable medications:");
        for drug in dataset::DRUG_CATALOG {
            match dataset::primary_gene(drug) {
                Some(gene) => println!("  {:<14} (primary gene: {})", drug, gene),
                None => println!("  {}", drug),
            }
        }
        return Ok(());
    }

    // Input validation happens before any screening work starts.
    let input = args
        .input
        .as_deref()
        .ok_or(ValidationError::MissingGenomeFile)
        .context("Upload a genome file with --input before running analysis")?;
    if !Path::new(input).exists() {
        anyhow::bail!("Genome file does not exist: {}", input);
    }

    let selection = DrugSelection::new(
        args.drugs
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    );
    if selection.is_empty() {
        return Err(ValidationError::EmptyDrugSelection)
            .context("Select at least one medication to screen with --drugs");
    }

    // Session cache: persisted slot if a directory was given, volatile otherwise.
    let cache = match &args.session_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create session directory: {}", dir))?;
            SessionCache::open(Box::new(FileSlot::in_dir(dir)))
        }
        None => SessionCache::in_memory(),
    };

    if let Some(path) = &args.snapshot {
        let snapshot = KnowledgeSnapshot::from_path(path)
            .with_context(|| format!("Failed to load knowledge-base snapshot: {}", path))?;
        cache
            .replace(snapshot)
            .context("Failed to install knowledge-base snapshot")?;
    }

    let store = cache.store();
    let panel = dataset::gene_panel();

    if args.verbose {
        display_config(&args, &selection, &store);
    }

    // The upstream genomic pipeline is simulated; a request token guards the
    // result so a superseded request could never apply a stale matrix.
    let gate = ScreeningGate::new();
    let token = gate.begin();

    run_pipeline_phase(args.delay_ms, args.quiet);

    let result = run_screening(&selection, &panel, &store)?;
    let result = gate
        .commit(token, result)
        .context("Screening request was superseded before its result was applied")?;

    if !args.quiet {
        display_matrix(&result);
    }

    if args.verbose || args.stats.is_some() {
        print_statistics(&result, &store, args.stats.as_deref())?;
    }

    if let Some(output) = &args.output {
        let mut writer = MatrixWriter::new(output)?;
        writer.write_result(&result)?;
        writer.flush()?;
        if args.verbose {
            println!("  ✓ Wrote {} matrix rows to {}", writer.rows_written(), output);
        }
    }

    if let Some(target) = &args.export {
        export_cell(&args, target, &result, &store)?;
    }

    println!(
        "\n✓ Screening complete: {} of {} cells resolved",
        result.stats().resolved(),
        result.len()
    );

    Ok(())
}

fn display_config(args: &Args, selection: &DrugSelection, store: &InteractionStore) {
    println!("============================================================");
    println!("PharmaGuard Screening Configuration");
    println!("============================================================");
    println!();
    println!("Genome file:            {}", args.input.as_deref().unwrap_or("-"));
    println!("Medications:            {}", selection.drugs().join(", "));
    println!("Gene panel:             {}", dataset::GENE_PANEL.join(", "));
    println!();
    println!("Knowledge base:");
    println!("  Guideline version:    {}", store.cpic_version());
    println!("  Schema version:       {}", store.schema_version());
    println!("  Interaction records:  {}", store.record_count());
    println!();
    println!("============================================================");
}

fn run_pipeline_phase(delay_ms: u64, quiet: bool) {
    let delay = Duration::from_millis(delay_ms);
    if quiet {
        std::thread::sleep(delay);
        return;
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    progress.set_message("Screening genome against CPIC knowledge base...");

    let started = Instant::now();
    while started.elapsed() < delay {
        progress.tick();
        std::thread::sleep(Duration::from_millis(40));
    }
    progress.finish_and_clear();
}

fn display_matrix(result: &ScreeningResult) {
    let drug_width = result
        .drugs()
        .iter()
        .map(|d| d.len())
        .max()
        .unwrap_or(4)
        .max("Drug".len());

    println!("\nClinical Risk Matrix");
    print!("{:<width$}", "Drug", width = drug_width + 2);
    for gene in result.genes() {
        print!("{:>10}", gene);
    }
    println!();

    for (row_idx, drug) in result.drugs().iter().enumerate() {
        print!("{:<width$}", drug, width = drug_width + 2);
        for outcome in result.row(row_idx) {
            print!("{:>10}", classify(outcome.record()).as_str());
        }
        println!();
    }
}

fn print_statistics(
    result: &ScreeningResult,
    store: &InteractionStore,
    output_path: Option<&str>,
) -> Result<()> {
    let stats = result.stats();
    let report = format!(
        r#"
═══════════════════════════════════════════════════════════
                Screening Statistics Report
═══════════════════════════════════════════════════════════

Knowledge base:         {} (schema {})
Interaction records:    {}

Matrix cells:
  - High risk:          {}
  - Moderate risk:      {}
  - Low risk:           {}
  - No data:            {}

Final results:
  - Drugs screened:     {}
  - Genes on panel:     {}
  - Cells resolved:     {} / {}

═══════════════════════════════════════════════════════════
"#,
        store.cpic_version(),
        store.schema_version(),
        store.record_count(),
        stats.high,
        stats.moderate,
        stats.low,
        stats.absent,
        result.drugs().len(),
        result.genes().len(),
        stats.resolved(),
        result.len(),
    );

    println!("{}", report);

    if let Some(path) = output_path {
        fs::write(path, report).context("Failed to write statistics report")?;
        println!("Statistics report written to: {}", path);
    }

    Ok(())
}

fn export_cell(
    args: &Args,
    target: &str,
    result: &ScreeningResult,
    store: &InteractionStore,
) -> Result<()> {
    let (drug, gene) = target
        .split_once(':')
        .context("--export expects DRUG:GENE, e.g. Warfarin:CYP2C9")?;

    let outcome = result
        .get(drug, gene)
        .with_context(|| format!("({}, {}) is not part of the screened matrix", drug, gene))?;
    let record = outcome.record().with_context(|| {
        format!(
            "No interaction record for ({}, {}); nothing to export",
            drug, gene
        )
    })?;

    let patient_id = args
        .patient_id
        .as_deref()
        .unwrap_or_else(|| store.patient_id());
    let report = export_report(record, patient_id, store.cpic_version(), &SystemClock)?;

    fs::create_dir_all(&args.report_dir)
        .with_context(|| format!("Failed to create report directory: {}", args.report_dir))?;
    let path = Path::new(&args.report_dir).join(report_file_name(record));
    let json = report.to_json_pretty()?;
    fs::write(&path, &json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    println!("  ✓ Exported clinical report to {}", path.display());

    if args.verify {
        display_verification(&verify_report_json(&json), args.verbose);
    }

    Ok(())
}

fn display_verification(verification: &VerificationReport, verbose: bool) {
    for check in verification.checks() {
        if verbose || !check.passed {
            println!(
                "    {} {:<28} expected {}, got {}",
                if check.passed { "✓" } else { "✗" },
                check.field,
                check.expected,
                check.actual
            );
        }
    }
    println!(
        "  Schema verification: {}/{} checks passed ({})",
        verification.passed(),
        verification.total(),
        verification.verdict()
    );
}
