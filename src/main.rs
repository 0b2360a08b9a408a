// src/main.rs

mod cli;

use anyhow::{Context, Result};
use casa_motility::compliance::ClinicalInput;
use casa_motility::ingest::{find_track_files, session_id, store_from_str};
use casa_motility::pipeline::{AnalysisPipeline, SessionAnalysis};
use casa_motility::report::{render_compliance, render_session, to_json};
use casa_motility::types::{Config, OutputFormat};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("🔬 CASA Motility Analysis Starting");
    info!(
        "✓ Calibration: {} µm/px @ {} fps",
        config.calibration.pixel_to_micron, config.calibration.fps
    );

    match cli.command {
        Commands::Analyze {
            input,
            clinical,
            format,
            output,
            include_tracks,
        } => {
            if let Some(format) = format {
                config.output.format = format.into();
            }
            if let Some(dir) = output {
                config.output.dir = Some(dir.to_string_lossy().into_owned());
            }
            config.output.include_tracks |= include_tracks;
            let input = input.unwrap_or_else(|| PathBuf::from(&config.input.dir));
            run_analyze(config, input, clinical).await
        }
        Commands::Check { input, format } => {
            if let Some(format) = format {
                config.output.format = format.into();
            }
            run_check(config, input).await
        }
    }
}

async fn load_clinical(path: &Path) -> Result<ClinicalInput> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read clinical values {}", path.display()))?;
    let values: ClinicalInput = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse clinical values {}", path.display()))?;
    values
        .validate()
        .with_context(|| format!("Invalid clinical values in {}", path.display()))?;
    Ok(values)
}

async fn run_analyze(config: Config, input: PathBuf, clinical: Option<PathBuf>) -> Result<()> {
    let pipeline = Arc::new(AnalysisPipeline::new(&config)?);
    info!("✓ Analysis pipeline ready");

    let manual = match clinical {
        Some(path) => {
            let values = load_clinical(&path).await?;
            info!("✓ Clinical values loaded from {}", path.display());
            Some(Arc::new(values))
        }
        None => None,
    };

    let files = if input.is_file() {
        vec![input]
    } else {
        let extensions = config.input.extensions.clone();
        tokio::task::spawn_blocking(move || find_track_files(&input, &extensions)).await?
    };

    if files.is_empty() {
        error!("No track files found");
        return Ok(());
    }

    if let Some(dir) = &config.output.dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir))?;
    }

    for (idx, path) in files.iter().enumerate() {
        info!(
            "Processing session {}/{}: {}",
            idx + 1,
            files.len(),
            path.display()
        );

        match analyze_file(&pipeline, path, manual.clone()).await {
            Ok(session) => emit_session(&config, session).await?,
            Err(e) => {
                pipeline.metrics().inc(&pipeline.metrics().sessions_failed);
                error!("Failed to analyze {}: {:#}", path.display(), e);
            }
        }
    }

    let summary = pipeline.metrics().summary();
    info!("\n========================================");
    info!("✓ Sessions analyzed: {}", summary.sessions_analyzed);
    info!(
        "  Tracks: {} ({} valid, {} too short to grade)",
        summary.tracks_analyzed, summary.valid_tracks, summary.short_tracks
    );
    info!("  Samples: {}", summary.samples_ingested);
    info!(
        "  Avg session: {} µs, {:.0} tracks/s",
        summary.avg_session_us, summary.tracks_per_sec
    );
    if summary.sessions_failed > 0 {
        warn!("  ⚠️  Failed sessions: {}", summary.sessions_failed);
        anyhow::bail!(
            "{} of {} sessions failed",
            summary.sessions_failed,
            files.len()
        );
    }
    Ok(())
}

async fn analyze_file(
    pipeline: &Arc<AnalysisPipeline>,
    path: &Path,
    manual: Option<Arc<ClinicalInput>>,
) -> Result<SessionAnalysis> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read track file {}", path.display()))?;
    let id = session_id(path);
    let pipeline = Arc::clone(pipeline);

    // Parsing and analysis are CPU-bound
    tokio::task::spawn_blocking(move || -> Result<SessionAnalysis> {
        let mut store = store_from_str(&text)?;
        debug!("{}: {} tracks, {} samples", id, store.len(), store.sample_count());
        Ok(pipeline.analyze_session(&id, &mut store, manual.as_deref())?)
    })
    .await?
}

async fn emit_session(config: &Config, session: SessionAnalysis) -> Result<()> {
    let session = if config.output.include_tracks {
        session
    } else {
        session.without_tracks()
    };

    match config.output.format {
        OutputFormat::Console => println!("{}", render_session(&session)),
        OutputFormat::Json => {
            let json = to_json(&session)?;
            match &config.output.dir {
                Some(dir) => {
                    let path = Path::new(dir).join(format!("{}.json", session.session_id));
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("💾 Report saved to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}

async fn run_check(config: Config, input: PathBuf) -> Result<()> {
    let pipeline = AnalysisPipeline::new(&config)?;
    let values = load_clinical(&input).await?;
    let report = pipeline.evaluate_manual(&values)?;

    info!(
        "Diagnosis: {}, fertility score {}",
        report.diagnostic_category.as_str(),
        report.fertility_score
    );
    match config.output.format {
        OutputFormat::Console => println!("{}", render_compliance(&report)),
        OutputFormat::Json => println!("{}", to_json(&report)?),
    }
    Ok(())
}
