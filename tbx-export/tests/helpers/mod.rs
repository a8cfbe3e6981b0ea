//! Shared test fixtures
//!
//! `FakeCatalog` stands in for the remote catalog: queries registered with a
//! record resolve, everything else returns no search hits. Each call sleeps
//! for a configurable latency and is counted, and the number of calls in
//! flight at once is tracked.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tbx_export::models::{DetailRecord, LookupError, LookupStage, Query, SearchHit};
use tbx_export::services::CatalogClient;

#[derive(Clone)]
enum Behavior {
    Hit(Value),
    DetailFails,
}

#[derive(Default)]
pub struct FakeCatalog {
    behaviors: HashMap<String, Behavior>,
    latency: Duration,
    latency_overrides: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `query` to a record `{"id": id, "query": query}`
    pub fn with_hit(mut self, query: &str, id: &str) -> Self {
        self.behaviors.insert(
            query.to_string(),
            Behavior::Hit(json!({ "id": id, "query": query })),
        );
        self
    }

    /// Search finds `query` but the detail call times out
    pub fn with_failing_detail(mut self, query: &str) -> Self {
        self.behaviors.insert(query.to_string(), Behavior::DetailFails);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Per-call latency for one query, overriding the default
    pub fn with_latency_for(mut self, query: &str, latency: Duration) -> Self {
        self.latency_overrides.insert(query.to_string(), latency);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn simulate_call(&self, key: &str) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self
            .latency_overrides
            .get(key)
            .copied()
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search(&self, query: &Query) -> Result<Option<SearchHit>, LookupError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call(query.as_str()).await;

        Ok(self.behaviors.get(query.as_str()).map(|_| SearchHit {
            // The query doubles as the catalog id
            id: query.as_str().to_string(),
        }))
    }

    async fn fetch_detail(&self, hit: &SearchHit) -> Result<Option<DetailRecord>, LookupError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call(&hit.id).await;

        match self.behaviors.get(&hit.id) {
            Some(Behavior::Hit(record)) => Ok(Some(DetailRecord::new(record.clone()))),
            Some(Behavior::DetailFails) => Err(LookupError::Timeout {
                stage: LookupStage::Detail,
            }),
            None => Ok(None),
        }
    }
}

pub fn queries(texts: &[&str]) -> Vec<Query> {
    texts.iter().map(|t| Query::from(*t)).collect()
}
