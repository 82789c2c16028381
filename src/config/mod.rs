pub mod loader;

pub use loader::{build_calendars, build_registry, build_requests, load_config, parse_config, validate_config};
