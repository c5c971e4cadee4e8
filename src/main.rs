use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use sentence_cover::config::{Cli, Command, Settings};
use sentence_cover::pipeline::{build_lexicon, combine, write_report, Pipeline};
use sentence_cover::records::{read_candidates, read_records, write_rows};

fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level.parse().unwrap_or(log::LevelFilter::Info));
    // RUST_LOG still wins for anyone who wants per-module filters
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn pipeline(settings: &Settings) -> Result<Pipeline> {
    let catalog = settings.catalog()?;
    info!("Loaded {} template(s)", catalog.len());
    let tagger = settings.build_tagger()?;
    Ok(Pipeline::new(tagger, catalog, settings.limits()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let settings = cli.settings()?;
    info!("Configuration: {:?}", settings);

    if let Some(threads) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to size the worker pool")?;
    }

    match &cli.command {
        Command::Generate { input, candidates } => {
            let records = read_records(input, &settings.columns())?;
            info!("Read {} record(s) from {:?}", records.len(), input);
            let rows = pipeline(&settings)?.generate(&records);
            write_rows(candidates, &rows)?;
            info!("Candidate sentences saved to {:?}", candidates);
        }
        Command::Combine {
            input,
            candidates,
            output,
            report,
        } => {
            let records = read_records(input, &settings.columns())?;
            let store = read_candidates(candidates)?;
            info!(
                "Read {} record(s) and {} candidate(s)",
                records.len(),
                store.len()
            );
            let combined = combine(&records, &store);
            write_rows(output, &combined.rows())?;
            info!("Combined sentences saved to {:?}", output);
            if let Some(path) = report {
                write_report(&combined.report(), path)?;
                info!("Coverage report saved to {:?}", path);
            }
        }
        Command::Run {
            input,
            output,
            candidates,
            report,
        } => {
            let records = read_records(input, &settings.columns())?;
            info!("Read {} record(s) from {:?}", records.len(), input);
            let pipeline = pipeline(&settings)?;
            let store = pipeline.generate(&records);
            if let Some(path) = candidates {
                write_rows(path, &store)?;
                info!("Candidate sentences saved to {:?}", path);
            }
            let combined = combine(&records, &store);
            write_rows(output, &combined.rows())?;
            info!("Combined sentences saved to {:?}", output);
            if let Some(path) = report {
                write_report(&combined.report(), path)?;
                info!("Coverage report saved to {:?}", path);
            }
        }
        Command::BuildLexicon { input, output } => {
            let records = read_records(input, &settings.columns())?;
            let tagger = settings.build_tagger()?;
            let lexicon = build_lexicon(&records, tagger.as_ref(), settings.fallback());
            std::fs::write(output, lexicon.to_lexicon_string())
                .with_context(|| format!("Failed to write lexicon {}", output.display()))?;
            info!("Lexicon with {} word(s) saved to {:?}", lexicon.len(), output);
        }
        Command::Templates => {
            print!("{}", settings.catalog()?.format_concise());
        }
    }

    Ok(())
}
