/// Diagnostic events reported by the generator pipeline
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub timestamp_ms: i64,
    pub event_id: String,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    PlanBuilt,
    SecurityNotFound,
    SliceEmitted,
    StreamCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventPayload {
    PlanBuilt {
        bucket_count: usize,
        request_count: usize,
        bar_size_secs: i64,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        /// Candidate instants where every request was closed
        dropped_candidates: usize,
    },
    SecurityNotFound {
        symbol: String,
        bucket_utc: DateTime<Utc>,
    },
    SliceEmitted {
        bucket_utc: DateTime<Utc>,
        index: usize,
        packet_count: usize,
    },
    StreamCompleted {
        slice_count: usize,
        data_point_count: usize,
    },
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        let now = Utc::now();
        let event_type = payload.event_type();

        Event {
            event_type,
            timestamp: now,
            timestamp_ms: now.timestamp_millis(),
            event_id: format!("{}:{}", event_type.as_str(), uuid::Uuid::new_v4()),
            payload,
        }
    }
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::PlanBuilt { .. } => EventType::PlanBuilt,
            EventPayload::SecurityNotFound { .. } => EventType::SecurityNotFound,
            EventPayload::SliceEmitted { .. } => EventType::SliceEmitted,
            EventPayload::StreamCompleted { .. } => EventType::StreamCompleted,
        }
    }
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::PlanBuilt => "PLAN_BUILT",
            EventType::SecurityNotFound => "SECURITY_NOT_FOUND",
            EventType::SliceEmitted => "SLICE_EMITTED",
            EventType::StreamCompleted => "STREAM_COMPLETED",
        }
    }
}
