/// Optional observers the pipeline reports to
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, info};

use super::types::{Event, EventPayload, EventType};
use crate::error::Result;

/// Receives pipeline events. Never required for the pipeline to work.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Build and deliver an event only when someone is listening
pub fn notify(observer: Option<&dyn PipelineObserver>, payload: EventPayload) {
    if let Some(observer) = observer {
        observer.on_event(&Event::new(payload));
    }
}

/// In-memory event recorder
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .map(|e| e.iter().filter(|ev| ev.event_type == event_type).count())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append all recorded events to a JSON Lines file
    pub fn write_jsonl<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let events = self.events();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        for event in &events {
            let json_line = serde_json::to_string(event)?;
            writeln!(file, "{}", json_line)?;
        }

        Ok(events.len())
    }
}

impl PipelineObserver for EventLog {
    fn on_event(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &Event) {
        match &event.payload {
            EventPayload::PlanBuilt { bucket_count, request_count, .. } => {
                info!(
                    "{}: {} buckets from {} requests",
                    event.event_type.as_str(),
                    bucket_count,
                    request_count
                );
            }
            EventPayload::StreamCompleted { slice_count, data_point_count } => {
                info!(
                    "{}: {} slices, {} data points",
                    event.event_type.as_str(),
                    slice_count,
                    data_point_count
                );
            }
            payload => debug!("{}: {:?}", event.event_type.as_str(), payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_without_observer_is_noop() {
        notify(
            None,
            EventPayload::StreamCompleted {
                slice_count: 0,
                data_point_count: 0,
            },
        );
    }

    #[test]
    fn test_event_log_records() {
        let log = EventLog::new();
        let observer: &dyn PipelineObserver = &log;
        notify(
            Some(observer),
            EventPayload::StreamCompleted {
                slice_count: 2,
                data_point_count: 4,
            },
        );
        assert_eq!(log.len(), 1);
        assert_eq!(log.count(EventType::StreamCompleted), 1);
        assert_eq!(log.count(EventType::PlanBuilt), 0);
    }

    #[test]
    fn test_event_log_write_jsonl() {
        let log = EventLog::new();
        log.on_event(&Event::new(EventPayload::StreamCompleted {
            slice_count: 1,
            data_point_count: 1,
        }));

        let path = std::env::temp_dir().join(format!("synthfeed_events_{}.jsonl", uuid::Uuid::new_v4()));
        assert_eq!(log.write_jsonl(&path).unwrap(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let event: Event = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(event.event_type, EventType::StreamCompleted);

        // Cleanup
        let _ = std::fs::remove_file(&path);
    }
}
