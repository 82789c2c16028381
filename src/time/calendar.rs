/// Trading calendar seam and the registry of named calendars
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use tracing::debug;

use super::session::SessionCalendar;
use crate::error::{Result, SynthError};
use crate::types::CalendarConfig;

/// Open/closed queries for one exchange, answered in the exchange's own time zone
pub trait TradingCalendar: Send + Sync {
    fn name(&self) -> &str;

    /// Zone that `is_open` expects its local times in
    fn time_zone(&self) -> Tz;

    fn is_open(&self, local: NaiveDateTime, include_extended_hours: bool) -> bool;
}

/// Calendar that never closes
#[derive(Debug, Clone)]
pub struct AlwaysOpenCalendar {
    time_zone: Tz,
}

impl AlwaysOpenCalendar {
    pub fn new(time_zone: Tz) -> Self {
        AlwaysOpenCalendar { time_zone }
    }

    pub fn utc() -> Self {
        AlwaysOpenCalendar::new(chrono_tz::UTC)
    }
}

impl TradingCalendar for AlwaysOpenCalendar {
    fn name(&self) -> &str {
        "always_open"
    }

    fn time_zone(&self) -> Tz {
        self.time_zone
    }

    fn is_open(&self, _local: NaiveDateTime, _include_extended_hours: bool) -> bool {
        true
    }
}

/// Named calendars requests can refer to
pub struct CalendarRegistry {
    calendars: HashMap<String, Arc<dyn TradingCalendar>>,
}

impl CalendarRegistry {
    /// Registry with `always_open`, `us_equity` and `nse_equity`
    pub fn with_builtins() -> Self {
        let mut registry = CalendarRegistry {
            calendars: HashMap::new(),
        };
        registry.register(Arc::new(AlwaysOpenCalendar::utc()));
        registry.register(Arc::new(SessionCalendar::us_equity()));
        registry.register(Arc::new(SessionCalendar::nse_equity()));
        registry
    }

    /// Add or replace a calendar under its own name
    pub fn register(&mut self, calendar: Arc<dyn TradingCalendar>) {
        debug!("Registered calendar: {}", calendar.name());
        self.calendars.insert(calendar.name().to_string(), calendar);
    }

    pub fn register_config(&mut self, config: &CalendarConfig) -> Result<()> {
        let calendar = SessionCalendar::from_config(config)?;
        self.register(Arc::new(calendar));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn TradingCalendar>> {
        self.calendars
            .get(name)
            .cloned()
            .ok_or_else(|| SynthError::UnknownCalendar(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calendars.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.calendars.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CalendarRegistry {
    fn default() -> Self {
        CalendarRegistry::with_builtins()
    }
}
