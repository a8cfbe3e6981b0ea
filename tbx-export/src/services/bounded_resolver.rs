//! Bounded-concurrency batch resolver
//!
//! Spawns one task per query and resolves each through a [`CatalogClient`].
//! A semaphore admits at most `concurrency_limit` lookups at a time; the rest
//! wait for a slot. One failed lookup only affects its own outcome. The
//! resolver joins every task before returning, unless an optional batch
//! deadline expires or the caller cancels, in which case outstanding lookups
//! are aborted and the batch is returned partial.
//!
//! Outcomes carry their input index and are sorted after the join, so
//! resolved records come back in playlist order.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog_client::CatalogClient;
use crate::models::{
    BatchCompletion, IndexedOutcome, Query, ResolutionBatch, ResolutionOutcome, UnresolvedReason,
};
use tbx_common::config::{ResolverConfig, DEFAULT_CONCURRENCY_LIMIT};

/// Rejected resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("concurrency limit must be greater than zero")]
    InvalidConcurrencyLimit,

    #[error("batch deadline must be greater than zero")]
    InvalidDeadline,
}

/// Resolver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Maximum lookups with outstanding network activity
    pub concurrency_limit: usize,
    /// Overall time budget for one batch
    pub batch_deadline: Option<Duration>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            batch_deadline: None,
        }
    }
}

impl ResolverSettings {
    pub fn new(concurrency_limit: usize) -> Result<Self, ResolverError> {
        let settings = Self {
            concurrency_limit,
            batch_deadline: None,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Result<Self, ResolverError> {
        self.batch_deadline = Some(deadline);
        self.validate()?;
        Ok(self)
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolverError> {
        let settings = Self {
            concurrency_limit: config.concurrency_limit,
            batch_deadline: config.batch_deadline_secs.map(Duration::from_secs),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.concurrency_limit == 0 {
            return Err(ResolverError::InvalidConcurrencyLimit);
        }
        if self.batch_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ResolverError::InvalidDeadline);
        }
        Ok(())
    }
}

/// Resolves a batch of queries with bounded concurrency
pub struct BoundedResolver {
    client: Arc<dyn CatalogClient>,
    settings: ResolverSettings,
}

impl BoundedResolver {
    /// Create a resolver; invalid settings are rejected before any work starts
    pub fn new(
        client: Arc<dyn CatalogClient>,
        settings: ResolverSettings,
    ) -> Result<Self, ResolverError> {
        settings.validate()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// Resolve every query and wait for all of them
    pub async fn resolve_all(&self, queries: Vec<Query>) -> ResolutionBatch {
        self.resolve_all_with_cancel(queries, CancellationToken::new())
            .await
    }

    /// Resolve every query; `cancel` stops the batch early with a partial result
    pub async fn resolve_all_with_cancel(
        &self,
        queries: Vec<Query>,
        cancel: CancellationToken,
    ) -> ResolutionBatch {
        let batch_id = Uuid::new_v4();
        let started = Instant::now();
        let total = queries.len();

        info!(
            batch_id = %batch_id,
            queries = total,
            concurrency_limit = self.settings.concurrency_limit,
            deadline_ms = self.settings.batch_deadline.map(|d| d.as_millis() as u64),
            "Starting batch resolution"
        );

        let gate = Arc::new(Semaphore::new(self.settings.concurrency_limit));
        let mut tasks = JoinSet::new();

        for (index, query) in queries.iter().cloned().enumerate() {
            let client = Arc::clone(&self.client);
            let gate = Arc::clone(&gate);

            tasks.spawn(async move {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, ResolutionOutcome::unresolved(UnresolvedReason::Cancelled)),
                };

                let outcome = AssertUnwindSafe(client.resolve(&query))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        ResolutionOutcome::unresolved(UnresolvedReason::TaskFailed(
                            "lookup panicked".to_string(),
                        ))
                    });

                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ResolutionOutcome>> = (0..total).map(|_| None).collect();
        let completion = self
            .join_tasks(batch_id, &queries, &mut tasks, &mut slots, &cancel)
            .await;

        if completion != BatchCompletion::Complete {
            // Let lookups woken on the same tick finish, then keep what already completed
            tokio::task::yield_now().await;
            while let Some(joined) = tasks.try_join_next() {
                record_joined(batch_id, &queries, &mut slots, joined);
            }
            gate.close();
            tasks.abort_all();
        }

        let leftover = match completion {
            BatchCompletion::Complete => {
                UnresolvedReason::TaskFailed("task ended without an outcome".to_string())
            }
            BatchCompletion::DeadlineExceeded => UnresolvedReason::DeadlineExceeded,
            BatchCompletion::Cancelled => UnresolvedReason::Cancelled,
        };

        let outcomes: Vec<IndexedOutcome> = queries
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (query, slot))| IndexedOutcome {
                index,
                query,
                outcome: slot.unwrap_or_else(|| ResolutionOutcome::unresolved(leftover.clone())),
            })
            .collect();

        let batch = ResolutionBatch {
            batch_id,
            outcomes,
            completion,
            elapsed: started.elapsed(),
        };

        info!(
            batch_id = %batch_id,
            total = batch.len(),
            resolved = batch.resolved_count(),
            unresolved = batch.unresolved_count(),
            partial = batch.is_partial(),
            elapsed_ms = batch.elapsed.as_millis() as u64,
            "Batch resolution completed"
        );

        batch
    }

    /// Collect task results into `slots` until all tasks finish or the batch stops early
    async fn join_tasks(
        &self,
        batch_id: Uuid,
        queries: &[Query],
        tasks: &mut JoinSet<(usize, ResolutionOutcome)>,
        slots: &mut [Option<ResolutionOutcome>],
        cancel: &CancellationToken,
    ) -> BatchCompletion {
        let deadline = self.settings.batch_deadline;
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => record_joined(batch_id, queries, slots, joined),
                    None => return BatchCompletion::Complete,
                },
                _ = &mut expired => {
                    warn!(
                        batch_id = %batch_id,
                        outstanding = tasks.len(),
                        "Batch deadline expired, aborting outstanding lookups"
                    );
                    return BatchCompletion::DeadlineExceeded;
                }
                _ = cancel.cancelled() => {
                    info!(
                        batch_id = %batch_id,
                        outstanding = tasks.len(),
                        "Batch cancelled, aborting outstanding lookups"
                    );
                    return BatchCompletion::Cancelled;
                }
            }
        }
    }
}

/// Store one joined task result in its input slot
fn record_joined(
    batch_id: Uuid,
    queries: &[Query],
    slots: &mut [Option<ResolutionOutcome>],
    joined: Result<(usize, ResolutionOutcome), JoinError>,
) {
    let (index, outcome) = match joined {
        Ok(result) => result,
        Err(e) => {
            // Aborted or panicked outside the catch; the slot is filled later
            warn!(batch_id = %batch_id, error = %e, "Resolution task failed");
            return;
        }
    };

    match outcome.reason() {
        None => debug!(batch_id = %batch_id, index, query = %queries[index], "Query resolved"),
        Some(reason) => debug!(
            batch_id = %batch_id,
            index,
            query = %queries[index],
            stage = reason.stage().map(tracing::field::display),
            reason = %reason,
            "Query unresolved"
        ),
    }
    slots[index] = Some(outcome);
}
