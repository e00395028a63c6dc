use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use breed_curator::{
    audit_markdown, load_breeds, save_breeds, BreedAuditor, CurateConfig,
    ImageCatalog, RunReport, SizeBasis, SizeClassifier, SizeHistogram, VERSION,
};

#[derive(Parser)]
#[command(name = "breed-curator")]
#[command(about = "Curate dog breed seed data: sizes, descriptions, images, shelter scores")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every correction stage and write a new snapshot
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Stage definitions (defaults to the built-in pipeline)
        #[arg(long)]
        pipeline: Option<PathBuf>,
        /// Breed → size fallback table (defaults to the built-in table)
        #[arg(long)]
        knowledge: Option<PathBuf>,
        /// Markdown run report
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        changes_csv: Option<PathBuf>,
        /// JSON run configuration; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reclassify sizes from described weights only
    Sizes {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Check descriptions, sizes and images without changing anything
    Audit {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        images_dir: Option<PathBuf>,
        #[arg(long)]
        knowledge: Option<PathBuf>,
        /// Markdown audit report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the configured stages in order
    Stages {
        #[arg(long)]
        pipeline: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the summary
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            input,
            output,
            pipeline,
            knowledge,
            report,
            changes_csv,
            config,
        } => {
            let base = match config {
                Some(path) => CurateConfig::from_file(path)?,
                None => CurateConfig::default(),
            };
            let config = base.merge(CurateConfig {
                input,
                output,
                pipeline,
                knowledge,
                report,
                changes_csv,
                ..CurateConfig::default()
            });
            run_pipeline(&config)
        }
        Command::Sizes {
            input,
            output,
            knowledge,
        } => run_sizes(&CurateConfig {
            input: Some(input),
            output,
            knowledge,
            ..CurateConfig::default()
        }),
        Command::Audit {
            input,
            images_dir,
            knowledge,
            report,
        } => run_audit(&CurateConfig {
            input: Some(input),
            images_dir,
            knowledge,
            report,
            ..CurateConfig::default()
        }),
        Command::Stages { pipeline } => list_stages(&CurateConfig {
            pipeline,
            ..CurateConfig::default()
        }),
    }
}

fn run_pipeline(config: &CurateConfig) -> Result<()> {
    println!("🐕 Breed Curation - full correction pipeline");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let input = config.input()?;
    let output = config.resolved_output()?;

    // 1. Load tables
    println!("\n📚 Loading knowledge + stages...");
    let knowledge = config.load_knowledge()?;
    let pipeline = config.load_pipeline(&knowledge)?;
    println!(
        "✓ {} known breeds, {} stages",
        knowledge.len(),
        pipeline.len()
    );

    // 2. Load records
    println!("\n📂 Loading breeds...");
    let mut records = load_breeds(input)?;
    println!("✓ Loaded {} breeds from {:?}", records.len(), input);

    // 3. Apply stages
    println!("\n🔧 Applying stages...");
    let mut report = pipeline.run(&mut records);
    for stage in &report.stage_counts {
        println!("   {:<24} {} changes", stage.stage, stage.changes);
    }

    // 4. Save
    println!("\n💾 Saving...");
    report.output_fingerprint = Some(save_breeds(&output, &records)?);
    println!("✓ Wrote {:?}", output);

    if let Some(path) = &config.report {
        report.write_markdown(path)?;
        println!("✓ Report written to {:?}", path);
    }
    if let Some(path) = &config.changes_csv {
        report.write_changes_csv(path)?;
        println!("✓ Change log written to {:?}", path);
    }

    print_conflicts(&report);
    print_histogram(&report.histogram);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {}", report.summary());

    Ok(())
}

fn run_sizes(config: &CurateConfig) -> Result<()> {
    println!("📏 Size Classification - weight first, breed knowledge second");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let input = config.input()?;
    let output = config.resolved_output()?;

    let classifier = SizeClassifier::new(config.load_knowledge()?);
    let mut records = load_breeds(input)?;
    println!("\n📂 Loaded {} breeds from {:?}\n", records.len(), input);

    let decisions = classifier.apply(&mut records);

    let mut by_weight = 0;
    let mut by_knowledge = 0;
    let mut retained = 0;
    for decision in &decisions {
        let marker = match decision.classification.basis {
            SizeBasis::Weight(_) => {
                by_weight += 1;
                "⚖️ "
            }
            SizeBasis::Knowledge => {
                by_knowledge += 1;
                "📚"
            }
            SizeBasis::Retained => {
                retained += 1;
                "⚠️ "
            }
        };
        if decision.classification.changed {
            println!("{} ✓ {}", marker, decision.summary());
        } else {
            println!("{}   {}", marker, decision.summary());
        }
    }

    let changed = decisions
        .iter()
        .filter(|d| d.classification.changed)
        .count();

    save_breeds(&output, &records)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ From weight:    {}", by_weight);
    println!("✓ From knowledge: {}", by_knowledge);
    println!("✓ Kept as-is:     {}", retained);
    print_histogram(&SizeHistogram::from_records(&records));
    println!("\n✅ Fixed {} breed sizes → {:?}", changed, output);

    Ok(())
}

fn run_audit(config: &CurateConfig) -> Result<()> {
    println!("🔍 Breed Audit - descriptions, sizes, images");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let input = config.input()?;
    let knowledge = config.load_knowledge()?;
    let records = load_breeds(input)?;

    let known = knowledge
        .breeds()
        .map(str::to_string)
        .chain(records.iter().map(|r| r.breed.clone()));
    let mut auditor = BreedAuditor::new(known);

    if let Some(dir) = &config.images_dir {
        let images = ImageCatalog::from_dir(dir)?;
        println!("✓ Found {} images in {:?}", images.len(), dir);
        auditor = auditor.with_images(images);
    }

    let reports = auditor.audit_batch(&records);
    let summary = auditor.batch_summary(&reports);

    for report in reports.iter().filter(|r| !r.is_clean()) {
        for issue in &report.issues {
            println!("⚠️  {}: {} ({})", report.breed, issue.issue, issue.rule_name);
        }
    }

    if let Some(path) = &config.report {
        std::fs::write(path, audit_markdown(&summary, &reports))?;
        println!("\n✓ Audit report written to {:?}", path);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {}", summary.summary());

    Ok(())
}

fn list_stages(config: &CurateConfig) -> Result<()> {
    let knowledge = config.load_knowledge()?;
    let pipeline = config.load_pipeline(&knowledge)?;

    println!("🔧 {} stages", pipeline.len());
    for (position, name) in pipeline.stage_names().iter().enumerate() {
        println!("   {}. {}", position + 1, name);
    }

    Ok(())
}

fn print_conflicts(report: &RunReport) {
    if report.conflicts.is_empty() {
        return;
    }

    println!("\n⚠️  Contradictory table entries (not applied):");
    for conflict in &report.conflicts {
        println!(
            "   [{}] {}: {}",
            conflict.table,
            conflict.breed,
            conflict.values.join(" / ")
        );
    }
}

fn print_histogram(histogram: &SizeHistogram) {
    println!("\n📊 Size distribution:");
    for (band, count) in histogram.iter() {
        println!("   {:<7} {:>4}  ({})", band.as_str(), count, band.weight_standard());
    }
}
