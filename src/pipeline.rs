//! Feeding connector output into the resolver.
//!
//! Connectors run concurrently (bounded by `concurrency`) and hand their
//! results over as [`CandidateBatch`] messages on a bounded channel. A single
//! task owns the [`Resolver`] and applies every merge, so merges are
//! serialized without any lock.
//!
//! Because batches arrive in completion order, the "first seen wins"
//! tie-break on canonical names and the order of `finalize()` can differ
//! between runs when more than one connector is in flight. Run with
//! `concurrency = 1` for a reproducible order.

use crate::config::RosterConfig;
use crate::http::{FetchAsync, Http};
use crate::models::{RawCandidate, RunStats, SourceKind};
use crate::normalize::normalize;
use crate::resolver::Resolver;
use crate::scrapers::{collect_source, SourceContext};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

/// Capacity of the connector → resolver channel, in batches.
pub const CHANNEL_CAPACITY: usize = 16;

/// Everything one connector produced.
#[derive(Debug, Clone)]
pub struct CandidateBatch {
    pub source: SourceKind,
    pub candidates: Vec<RawCandidate>,
}

/// Normalize and merge one batch. Malformed candidates are logged and dropped.
pub fn ingest(resolver: &mut Resolver, stats: &mut RunStats, config: &RosterConfig, batch: CandidateBatch) {
    *stats.received.entry(batch.source).or_default() += batch.candidates.len();
    for raw in batch.candidates {
        match normalize(raw, config) {
            Ok(candidate) => {
                resolver.merge(candidate);
            }
            Err(e) => {
                stats.dropped += 1;
                warn!(error = %e, "Dropping malformed candidate");
            }
        }
    }
    debug!(source = %batch.source, identities = resolver.len(), "Batch merged");
}

/// Spawn the single writer that owns the working set. It finishes once every
/// sender has been dropped.
pub fn spawn_resolver(
    config: Arc<RosterConfig>,
    capacity: usize,
) -> (mpsc::Sender<CandidateBatch>, JoinHandle<(Resolver, RunStats)>) {
    let (tx, mut rx) = mpsc::channel::<CandidateBatch>(capacity.max(1));
    let handle = tokio::spawn(async move {
        let mut resolver = Resolver::new(config.relevance.threshold);
        let mut stats = RunStats::default();
        while let Some(batch) = rx.recv().await {
            ingest(&mut resolver, &mut stats, &config, batch);
        }
        info!(
            identities = resolver.len(),
            received = stats.total_received(),
            dropped = stats.dropped,
            "Resolver drained"
        );
        (resolver, stats)
    });
    (tx, handle)
}

/// Run every requested connector and resolve their output.
#[instrument(level = "info", skip_all, fields(company = %ctx.company, sources = sources.len(), concurrency = concurrency))]
pub async fn run<F: FetchAsync>(
    sources: &[SourceKind],
    ctx: &SourceContext,
    http: &Http<F>,
    config: Arc<RosterConfig>,
    concurrency: usize,
) -> Result<(Resolver, RunStats), JoinError> {
    let (tx, handle) = spawn_resolver(config, CHANNEL_CAPACITY);

    stream::iter(sources.iter().copied())
        .map(|kind| {
            let tx = tx.clone();
            async move {
                let candidates = collect_source(kind, ctx, http).await;
                let batch = CandidateBatch {
                    source: kind,
                    candidates,
                };
                if tx.send(batch).await.is_err() {
                    warn!(source = %kind, "Resolver stopped before batch was delivered");
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<()>>()
        .await;
    drop(tx);

    handle.await
}
