#![deny(rust_2018_idioms)]
#![deny(clippy::correctness)]
#![deny(clippy::perf)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use chrono::{Local, NaiveDate};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod orchestrator;
pub mod schema;
pub mod sink;
pub mod text;

use crate::config::{GeneratorConfig, SinkKind};
use crate::error::{GenError, Result, Stage};
use crate::generator::EntityGenerator;
use crate::orchestrator::{Orchestrator, Summary};
use crate::sink::{DatabaseSink, Sink, SqlFileSink};
use crate::text::{NameBank, TextProvider};

/// Builds the orchestrator described by `config`, seeded if a seed is given
#[must_use]
pub fn build_orchestrator(
    config: &GeneratorConfig,
    today: NaiveDate,
) -> Orchestrator<StdRng, NameBank> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = EntityGenerator::new(rng, NameBank, config.credentials(), today);
    Orchestrator::new(generator, config.plan)
}

/// Generates into `sink` and finalizes it only if every phase succeeded.
/// On failure the sink is dropped unfinished, which for the database sink
/// means a full rollback.
///
/// # Errors
/// The first generation or finalization failure
pub fn run_with_sink<R: Rng, T: TextProvider, S: Sink>(
    orchestrator: &mut Orchestrator<R, T>,
    mut sink: S,
) -> Result<Summary> {
    let kind = sink.kind();
    let summary = orchestrator.generate(&mut sink)?;
    sink.create_indexes().map_err(|e| e.at_stage(Stage::Indexes, kind))?;
    sink.finish().map_err(|e| e.at_stage(Stage::Commit, kind))?;
    Ok(summary)
}

/// Runs a complete generation as configured
///
/// # Errors
/// Invalid configuration (before any output is touched), then any I/O or
/// database failure
pub fn run(config: &GeneratorConfig) -> Result<Summary> {
    config.validate()?;
    info!(
        "Starting data generation using {} sink ({} credentials)",
        config.sink,
        config.credentials()
    );
    let mut orchestrator = build_orchestrator(config, Local::now().date_naive());
    match config.sink {
        SinkKind::File => {
            let sink = SqlFileSink::create(&config.output)
                .map_err(|e| e.at_stage(Stage::Open, SinkKind::File))?;
            run_with_sink(&mut orchestrator, sink)
        }
        SinkKind::Database => {
            info!("Loading into {}", config.database.display());
            let open_failed = |e: GenError| {
                e.opening(&config.database)
                    .at_stage(Stage::Open, SinkKind::Database)
            };
            let mut conn = Connection::open(&config.database)
                .map_err(|e| open_failed(GenError::from(e)))?;
            let sink = DatabaseSink::new(&mut conn).map_err(open_failed)?;
            run_with_sink(&mut orchestrator, sink)
        }
    }
}
