use std::path::Path;

use tracing::debug;

use crate::{
    data::Report,
    queue::{build_queues, ConfigError, QueueDesc},
    random::UniformSequence,
    simulation::Engine,
};

#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct Config {
    pub queues: Vec<QueueDesc>,
    pub source: UniformSequence,

    /// Initial value of the simulation clock.
    #[builder(default)]
    pub start_time: f64,
}

pub fn run(cfg: Config) -> Result<Report, Error> {
    // The engine's clock never moves backwards, so no queue may activate its
    // arrival stream before the clock's initial value.
    for desc in &cfg.queues {
        if let Some(arrival_start) = desc.arrival_start {
            if arrival_start < cfg.start_time {
                return Err(ConfigError::ArrivalBeforeStart {
                    queue: desc.name.clone(),
                    arrival_start,
                    start_time: cfg.start_time,
                }
                .into());
            }
        }
    }
    let queues = build_queues(cfg.queues)?;
    debug!(queues = queues.len(), start_time = cfg.start_time, "starting simulation");
    let engine = Engine::builder()
        .queues(queues)
        .source(cfg.source)
        .clock(cfg.start_time)
        .build();
    Ok(engine.execute())
}

/// Reads a list of queue descriptors from a JSON file.
pub fn read_queues(path: impl AsRef<Path>) -> Result<Vec<QueueDesc>, Error> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("serde error")]
    Serde(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}
