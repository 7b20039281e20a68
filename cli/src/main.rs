//! relayout CLI - layout planning for translated documents

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use relayout::{
    ConflictReason, Engine, Job, JsonFormat, LayoutOptions, LayoutPlan, PageEvent, PlanStats,
    Strategy, SubstitutionResolver,
};

#[derive(Parser)]
#[command(name = "relayout")]
#[command(version)]
#[command(about = "Plan the layout of translated documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a job and write the layout plan as JSON
    Plan {
        /// Job file (document, fonts, translations, options)
        #[arg(value_name = "JOB")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Layout options file, replacing the job's options
        #[arg(long, value_name = "FILE", env = "RELAYOUT_CONFIG")]
        config: Option<PathBuf>,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Worker thread count
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Plan a job and print a summary with unresolved conflicts
    Report {
        /// Job file
        #[arg(value_name = "JOB")]
        input: PathBuf,

        /// Layout options file, replacing the job's options
        #[arg(long, value_name = "FILE", env = "RELAYOUT_CONFIG")]
        config: Option<PathBuf>,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the substitute chosen for every unavailable font
    Fonts {
        /// Job file
        #[arg(value_name = "JOB")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Plan {
            input,
            output,
            compact,
            config,
            sequential,
            threads,
        }) => cmd_plan(
            &input,
            output.as_deref(),
            compact,
            config.as_deref(),
            sequential,
            threads,
        ),
        Some(Commands::Report {
            input,
            config,
            json,
        }) => cmd_report(&input, config.as_deref(), json),
        Some(Commands::Fonts { input }) => cmd_fonts(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: relayout <COMMAND> <JOB>".yellow());
            println!("       relayout --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load a job, replacing its options with a config file when given.
fn load_job(input: &Path, config: Option<&Path>) -> Result<Job, Box<dyn std::error::Error>> {
    let mut job = Job::from_path(input)?;
    if let Some(path) = config {
        job.options = LayoutOptions::from_path(path)?;
        log::info!("Using layout options from {}", path.display());
    }
    Ok(job)
}

/// Run the engine on a worker thread while a progress bar follows its pages.
fn run_with_progress(job: &Job) -> Result<LayoutPlan, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(job.document.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let engine = Engine::new(job.options.clone()).with_progress(tx);

    let result = thread::scope(|s| {
        // The engine owns the only sender; the loop below ends when it drops.
        let worker = s.spawn(move || job.run_with(&engine));
        for event in rx.iter() {
            match event {
                PageEvent::Started { page } => pb.set_message(format!("page {}", page)),
                PageEvent::Finished { .. } | PageEvent::Skipped { .. } => pb.inc(1),
            }
        }
        worker.join()
    });

    let plan = result.map_err(|_| "planning thread panicked")??;
    pb.finish_with_message("Done!");
    Ok(plan)
}

fn cmd_plan(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    config: Option<&Path>,
    sequential: bool,
    threads: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut job = load_job(input, config)?;
    if sequential {
        job.options = job.options.sequential();
    }
    if let Some(n) = threads {
        job.options = job.options.with_threads(n);
    }

    let plan = run_with_progress(&job)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = relayout::render::to_json(&plan, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    if !plan.unresolved.is_empty() {
        eprintln!(
            "{} {} block(s) still overflow; run `relayout report` for details",
            "Warning:".yellow().bold(),
            plan.unresolved.len()
        );
    }

    Ok(())
}

fn cmd_report(
    input: &Path,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let job = load_job(input, config)?;
    let plan = job.run()?;
    let stats = PlanStats::from_plan(&plan);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Layout Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Blocks".bold(), stats.block_count);
    for strategy in Strategy::ALL {
        let count = stats.count(strategy);
        let label = format!("  {}", strategy);
        let value = match strategy {
            Strategy::OverflowAccept if count > 0 => count.to_string().red().to_string(),
            _ => count.to_string(),
        };
        println!("{}: {}", label.bold(), value);
    }
    if stats.degraded_count > 0 {
        println!(
            "{}: {}",
            "Degraded line breaking".bold(),
            stats.degraded_count.to_string().yellow()
        );
    }
    println!("{}: {:.3}", "Smallest scale".bold(), stats.smallest_scale);
    if stats.cancelled {
        println!("{}", "Cancelled before every page completed".yellow());
    }

    println!();
    println!("{}", "Unresolved Conflicts".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if plan.unresolved.is_empty() {
        println!("{}", "None".green());
    }
    for conflict in &plan.unresolved {
        let reason = match conflict.reason {
            ConflictReason::GrowthDisallowed => conflict.reason.to_string().red(),
            _ => conflict.reason.to_string().yellow(),
        };
        println!(
            "  {} page {} block {}: {} (overflow {:.1})",
            "•".dimmed(),
            conflict.page,
            conflict.block_id.bold(),
            reason,
            conflict.overflow
        );
    }

    let expansion = job.expansion_report();
    println!();
    println!("{}", "Translation".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {:.2}x",
        "Average expansion".bold(),
        expansion.average_factor
    );
    println!(
        "{}: {}",
        "Untranslated runs".bold(),
        expansion.untranslated.len()
    );
    for run in expansion.extreme() {
        println!(
            "  {} run {}: {:.2}x ({} -> {} chars)",
            "⚠".yellow(),
            run.run_id,
            run.factor,
            run.source_chars,
            run.translated_chars
        );
    }

    Ok(())
}

fn cmd_fonts(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let job = Job::from_path(input)?;
    let resolver = SubstitutionResolver::new(
        job.options.max_substitution_distance,
        job.options.min_substitution_confidence,
    )
    .with_overrides(job.options.font_overrides.clone());

    println!("{}", "Font Substitutions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let mut missing = 0;
    for font in job.catalog.iter().filter(|f| !f.is_usable()) {
        missing += 1;
        match resolver.resolve(&font.id, &job.catalog) {
            Ok(mapping) => {
                let confidence = format!("{:.0}%", mapping.confidence * 100.0);
                let confidence = if mapping.reliable {
                    confidence.green()
                } else {
                    confidence.yellow()
                };
                println!(
                    "{} -> {} ({})",
                    mapping.missing.as_str().bold(),
                    mapping.substitute,
                    confidence
                );
                println!("    {}", mapping.rationale.dimmed());
            }
            Err(e) => println!("{} -> {}", font.id.as_str().bold(), e.to_string().red()),
        }
    }

    if missing == 0 {
        println!("{}", "Every font is available".green());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "relayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout reconciliation for translated documents");
    println!();
    println!("License: MIT");
}
