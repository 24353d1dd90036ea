//! dirpdf - Merge a directory's images and PDFs into a single PDF.

use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use dirpdf::cli::Cli;
use dirpdf::error::DirPdfError;
use dirpdf::output::{
    DiagnosticSink, MemorySink, OutputFormatter, RunReport, display_merge_statistics,
};
use dirpdf::pipeline::{Pipeline, RunOutcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), DirPdfError> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    let sink: Arc<dyn DiagnosticSink> = if cli.json {
        Arc::new(MemorySink::new())
    } else {
        Arc::new(formatter.clone())
    };

    if config.dry_run {
        formatter.info("DRY RUN MODE - No files will be created");
    }

    let started = Instant::now();
    let outcome = Pipeline::new(config, sink).run().await?;

    if cli.json {
        let report = RunReport::from_outcome(&outcome, started.elapsed());
        let json = report
            .to_json()
            .map_err(|e| DirPdfError::other(format!("Failed to render report: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    print_outcome(&formatter, &outcome);
    Ok(())
}

/// Print the console summary of a finished run.
fn print_outcome(formatter: &OutputFormatter, outcome: &RunOutcome) {
    match outcome {
        // The pipeline already reported these through the sink
        RunOutcome::NoInputs { .. } => {}
        RunOutcome::NothingMerged { statistics, .. } => {
            display_merge_statistics(formatter, statistics);
        }
        RunOutcome::DryRun { output, plan, .. } => {
            formatter.section(&format!("{} file(s) would be merged:", plan.len()));
            for entry in plan {
                formatter.list_item(
                    entry.order + 1,
                    &format!("{} ({})", entry.file_name(), entry.kind),
                );
            }
            formatter.success("Dry run completed successfully");
            formatter.info(&format!("  Output would be: {}", output.display()));
        }
        RunOutcome::Written {
            output,
            statistics,
            write,
            ..
        } => {
            display_merge_statistics(formatter, statistics);
            formatter.success(&format!(
                "Successfully created {} ({})",
                output.display(),
                write.format_file_size()
            ));
            formatter.detail(
                "Write time",
                &format!("{:.2}s", write.write_time.as_secs_f64()),
            );
        }
    }
}
