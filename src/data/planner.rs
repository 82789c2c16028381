/// Bucket planning: merge per-symbol requests onto one UTC timeline
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::error::{Result, SynthError};
use crate::events::{notify, EventPayload, PipelineObserver};
use crate::time::convert_from_utc;
use crate::types::{ActiveConfig, BucketAlignment, DataRequest};

/// One bar-close instant and the configs tradable during the bar that ends there
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucket {
    /// Close of the bar; the candidate instant plus the bar size
    pub time_utc: DateTime<Utc>,
    pub configs: Vec<ActiveConfig>,
}

/// Ordered, immutable bucket mapping. Cloning shares the buckets.
#[derive(Debug, Clone)]
pub struct BucketPlan {
    buckets: Arc<[TimeBucket]>,
    bar_size: Duration,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    request_count: usize,
}

impl BucketPlan {
    /// Buckets in strictly increasing key order
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeBucket> {
        self.buckets.iter()
    }

    pub fn keys(&self) -> Vec<DateTime<Utc>> {
        self.buckets.iter().map(|b| b.time_utc).collect()
    }

    pub fn get(&self, time_utc: DateTime<Utc>) -> Option<&TimeBucket> {
        self.buckets
            .binary_search_by_key(&time_utc, |b| b.time_utc)
            .ok()
            .map(|i| &self.buckets[i])
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Finest resolution among the requests
    pub fn bar_size(&self) -> Duration {
        self.bar_size
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_utc
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end_utc
    }

    pub fn request_count(&self) -> usize {
        self.request_count
    }

    /// Total active configs across all buckets
    pub fn config_count(&self) -> usize {
        self.buckets.iter().map(|b| b.configs.len()).sum()
    }
}

/// Builds a [`BucketPlan`] from a set of requests
#[derive(Default, Clone, Copy)]
pub struct BucketPlanner<'a> {
    alignment: BucketAlignment,
    observer: Option<&'a dyn PipelineObserver>,
}

impl<'a> BucketPlanner<'a> {
    pub fn new() -> Self {
        BucketPlanner::default()
    }

    pub fn with_alignment(mut self, alignment: BucketAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn PipelineObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Walk `[min start, max end)` in steps of the finest resolution and keep every
    /// instant where at least one request is open. Fails on an empty request set.
    pub fn plan(&self, requests: &[DataRequest]) -> Result<BucketPlan> {
        let bar_size = requests
            .iter()
            .map(|r| r.resolution.to_duration())
            .min()
            .ok_or_else(|| SynthError::EmptyInput("no data requests to plan".to_string()))?;
        let start_utc = requests
            .iter()
            .map(|r| r.start_utc)
            .min()
            .ok_or_else(|| SynthError::EmptyInput("no start time".to_string()))?;
        let end_utc = requests
            .iter()
            .map(|r| r.end_utc)
            .max()
            .ok_or_else(|| SynthError::EmptyInput("no end time".to_string()))?;

        let mut buckets = Vec::new();
        let mut dropped = 0usize;
        let mut candidate = start_utc;

        // A trailing partial bar (close past `end_utc`) is never emitted
        while candidate < end_utc && candidate + bar_size <= end_utc {
            let time_utc = candidate + bar_size;
            let configs: Vec<ActiveConfig> = requests
                .iter()
                .filter(|r| self.contributes(r, candidate, time_utc))
                .map(ActiveConfig::synthesized)
                .collect();

            if configs.is_empty() {
                dropped += 1;
            } else {
                debug!("Bucket {} with {} configs", time_utc, configs.len());
                buckets.push(TimeBucket { time_utc, configs });
            }

            candidate = time_utc;
        }

        info!(
            "📊 Planned {} buckets of {}s over {} -> {} ({} requests, {} closed instants dropped)",
            buckets.len(),
            bar_size.num_seconds(),
            start_utc,
            end_utc,
            requests.len(),
            dropped
        );

        notify(
            self.observer,
            EventPayload::PlanBuilt {
                bucket_count: buckets.len(),
                request_count: requests.len(),
                bar_size_secs: bar_size.num_seconds(),
                start_utc,
                end_utc,
                dropped_candidates: dropped,
            },
        );

        Ok(BucketPlan {
            buckets: buckets.into(),
            bar_size,
            start_utc,
            end_utc,
            request_count: requests.len(),
        })
    }

    fn contributes(&self, request: &DataRequest, candidate: DateTime<Utc>, time_utc: DateTime<Utc>) -> bool {
        if self.alignment == BucketAlignment::RequestGrid {
            if candidate < request.start_utc || candidate >= request.end_utc {
                return false;
            }
            let offset = (time_utc - request.start_utc).num_seconds();
            if offset % request.resolution.duration_seconds() != 0 {
                return false;
            }
        }

        let local = convert_from_utc(candidate, request.calendar.time_zone());
        request.calendar.is_open(local, request.include_extended_hours)
    }
}

/// Plan with the default finest-grid alignment and no observer
pub fn plan(requests: &[DataRequest]) -> Result<BucketPlan> {
    BucketPlanner::new().plan(requests)
}
