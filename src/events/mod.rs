pub mod observer;
pub mod types;

pub use observer::{notify, EventLog, PipelineObserver, TracingObserver};
pub use types::{Event, EventPayload, EventType};
