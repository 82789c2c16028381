pub mod calendar;
pub mod holidays;
pub mod session;
pub mod zones;

pub use calendar::{AlwaysOpenCalendar, CalendarRegistry, TradingCalendar};
pub use session::SessionCalendar;
pub use zones::{convert_from_utc, convert_to_utc, parse_instant, parse_time_zone, DstPolicy};
