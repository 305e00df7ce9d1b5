use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use sptm::config::Config;
use sptm::pipeline::distance_map::{self, DistancePaths, TopicWordFormat};
use sptm::pipeline::transitions::{self, TransitionPaths};
use sptm::topics::conditional::Accumulation;
use sptm::topics::distance::DistanceMeasure;

/// How many skipped rows to list before summarizing the rest.
const DIAGNOSTIC_DISPLAY_LIMIT: usize = 10;

/// sptm: how topics flow from sentence to sentence, and how far apart they are.
///
/// Works on the output of an external topic model: per-sentence doc-topic
/// weights for transitions, topic-word weights for distances.
#[derive(Parser)]
#[command(name = "sptm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the topic transition matrix between consecutive sentences
    Transitions {
        /// Tab-delimited doc-topic export (first two columns are metadata)
        #[arg(long)]
        doc_topics: PathBuf,

        /// Comma-delimited document index (first column = document id)
        #[arg(long)]
        doc_index: PathBuf,

        /// Labels file, one topic label per row
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Where to write the conditional matrix
        #[arg(long, short)]
        output: PathBuf,

        /// Where to write the sorted per-topic view (needs --labels)
        #[arg(long)]
        sorted_output: Option<PathBuf>,

        /// Where to write a JSON export of the labeled matrix (needs --labels)
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Output scale factor (default: 65, or SPTM_SCALE)
        #[arg(long)]
        scale: Option<f64>,

        /// Accumulate topic mass once per transition instead of once per cell
        #[arg(long)]
        corrected: bool,

        /// Skip doc-topic rows of the wrong width instead of failing
        #[arg(long)]
        allow_partial: bool,

        /// Transitions to show per topic (default: 3)
        #[arg(long, default_value = "3")]
        top: usize,
    },

    /// Compute pairwise distances between topic-word distributions
    Distance {
        /// Topic-word weights file
        #[arg(long)]
        topics: PathBuf,

        /// Input layout: dense or mallet (default: dense)
        #[arg(long, default_value = "dense")]
        format: TopicWordFormat,

        /// Normalize dense rows to sum to 1 before comparing
        #[arg(long)]
        normalize: bool,

        /// Distance measure: hellinger or jensen-shannon (default: hellinger, or SPTM_MEASURE)
        #[arg(long)]
        measure: Option<DistanceMeasure>,

        /// Where to write the distance matrix
        #[arg(long, short)]
        output: PathBuf,

        /// Leave out the leading topic index column
        #[arg(long)]
        no_index: bool,

        /// Labels file, used only for the terminal summary
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Nearest neighbors to show per topic (default: 3)
        #[arg(long, default_value = "3")]
        top: usize,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sptm=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Transitions {
            doc_topics,
            doc_index,
            labels,
            output,
            sorted_output,
            json_output,
            scale,
            corrected,
            allow_partial,
            top,
        } => {
            if let Some(scale) = scale {
                config.scale = scale;
            }
            if corrected {
                config.accumulation = Accumulation::Corrected;
            }
            config.allow_partial |= allow_partial;

            let paths = TransitionPaths {
                doc_topics,
                doc_index,
                labels,
                output,
                sorted_output,
                json_output,
            };

            info!(doc_topics = %paths.doc_topics.display(), "Building transition matrix");
            let report = transitions::run(&paths, &config)?;

            sptm::output::terminal::display_transitions(&report, top);
            sptm::output::terminal::display_diagnostics(&report.diagnostics, DIAGNOSTIC_DISPLAY_LIMIT);

            println!(
                "\n{}",
                format!("Matrix saved to: {}", paths.output.display()).bold()
            );
            if let Some(path) = &paths.sorted_output {
                println!("Sorted view saved to: {}", path.display());
            }
            if let Some(path) = &paths.json_output {
                println!("JSON export saved to: {}", path.display());
            }
        }

        Commands::Distance {
            topics,
            format,
            normalize,
            measure,
            output,
            no_index,
            labels,
            top,
        } => {
            if let Some(measure) = measure {
                config.measure = measure;
            }

            let paths = DistancePaths {
                topics,
                format,
                normalize,
                output,
                index_column: !no_index,
                labels,
            };

            info!(topics = %paths.topics.display(), format = %paths.format, "Computing distance map");
            let report = distance_map::run(&paths, &config)?;

            sptm::output::terminal::display_distances(&report, top);
            sptm::output::terminal::display_diagnostics(&report.diagnostics, DIAGNOSTIC_DISPLAY_LIMIT);

            println!(
                "\n{}",
                format!("Distance matrix saved to: {}", paths.output.display()).bold()
            );
        }
    }

    Ok(())
}
