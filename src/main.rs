//! Query Cache replay tool
//!
//! Replays a JSON fixture of captured API responses through the cache and
//! prints what each read query resolves to. Handy for checking a source
//! definition against real responses without running the orchestrator.
//!
//! ```text
//! query_cache demos/users_and_posts.json
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cache::{Cache, CacheStats, Config, Query, QueryData, SourceDefinition};

/// One captured response to store.
#[derive(Debug, Deserialize)]
struct WriteStep {
    query: Query,
    source: SourceDefinition,
    #[serde(default)]
    response: Value,
}

/// A replay fixture: writes applied in order, then reads.
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    writes: Vec<WriteStep>,
    #[serde(default)]
    reads: Vec<Query>,
}

#[derive(Debug, Serialize)]
struct ReadResult {
    model: String,
    fingerprint: String,
    #[serde(flatten)]
    result: QueryData,
}

#[derive(Debug, Serialize)]
struct Report {
    reads: Vec<ReadResult>,
    stats: CacheStats,
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: query_cache <fixture.json>");
    };

    let config = Config::from_env();
    info!(
        "Configuration loaded: delete_mode={:?}, sweep_interval={}s",
        config.delete_mode, config.sweep_interval
    );

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fixture {}", path.display()))?;

    let cache = Cache::new(config);
    let now = Utc::now();

    for (index, step) in fixture.writes.iter().enumerate() {
        let ids = cache
            .store_query(&step.query, &step.source, &step.response, now)
            .with_context(|| format!("write #{} for model '{}'", index, step.query.model.name))?;
        info!(
            "Write #{}: {} query indexed {} id(s)",
            index,
            step.query.model.name,
            ids.len()
        );
    }

    let reads = fixture
        .reads
        .iter()
        .map(|query| ReadResult {
            model: query.model.name.clone(),
            fingerprint: query.fingerprint(),
            result: cache.get_query_data(query, now),
        })
        .collect();

    let report = Report {
        reads,
        stats: cache.stats(now),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
