/// Configuration loading from TOML file
use std::path::Path;

use crate::data::PriceCurve;
use crate::error::{Result, SynthError};
use crate::securities::SecurityRegistry;
use crate::time::{parse_instant, parse_time_zone, CalendarRegistry};
use crate::types::{Config, DataRequest};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SynthError::ConfigError(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
    })?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|e| SynthError::TomlError(e.to_string()))?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.requests.is_empty() {
        return Err(SynthError::ConfigError("no [[requests]] configured".to_string()));
    }

    parse_time_zone(&config.display_time_zone)?;
    PriceCurve::from_config(&config.price_curve)?;

    // Resolving every request checks calendars, zones, timestamps and spans
    let calendars = build_calendars(config)?;
    build_requests(config, &calendars)?;

    Ok(())
}

/// Built-in calendars plus every `[[calendars]]` entry. Custom entries may shadow built-ins.
pub fn build_calendars(config: &Config) -> Result<CalendarRegistry> {
    let mut calendars = CalendarRegistry::with_builtins();
    for calendar in &config.calendars {
        calendars.register_config(calendar)?;
    }
    Ok(calendars)
}

pub fn build_requests(config: &Config, calendars: &CalendarRegistry) -> Result<Vec<DataRequest>> {
    config
        .requests
        .iter()
        .map(|entry| {
            let calendar = calendars.get(&entry.calendar)?;
            let data_time_zone = match &entry.data_time_zone {
                Some(name) => parse_time_zone(name)?,
                None => calendar.time_zone(),
            };

            let start = parse_instant(&entry.start, data_time_zone)?;
            let end = parse_instant(&entry.end, data_time_zone)?;
            if start >= end {
                return Err(SynthError::InvalidParameter(format!(
                    "{}: start {} must be before end {}",
                    entry.symbol, entry.start, entry.end
                )));
            }

            let mut request = DataRequest::new(entry.symbol.clone(), entry.resolution, start, end, calendar)
                .with_extended_hours(entry.extended_hours)
                .with_data_time_zone(data_time_zone)
                .with_fill_forward(entry.fill_forward);
            request.is_custom_data = entry.is_custom_data;
            request.tick_type = entry.tick_type;
            request.normalization_mode = entry.normalization;
            Ok(request)
        })
        .collect()
}

/// `[[securities]]` entries, then the optional CSV master on top.
pub fn build_registry(config: &Config) -> Result<SecurityRegistry> {
    let mut registry = SecurityRegistry::new();
    for security in &config.securities {
        registry.add(security.clone());
    }
    if let Some(path) = &config.securities_csv {
        registry.extend(SecurityRegistry::load_csv(path)?);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::securities::SecurityLookup;
    use crate::types::{BucketAlignment, Resolution, TickType};
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = r#"
display_time_zone = "America/New_York"
alignment = "request_grid"

[price_curve]
base_price = 50.0
amplitude = 5.0

[[calendars]]
name = "lse"
time_zone = "Europe/London"
market_open = "08:00"
market_close = "16:30"
holidays = ["2025-01-01"]

[[securities]]
symbol = "SPY"
name = "SPDR S&P 500"

[[securities]]
symbol = "VOD"
market = "uk"
currency = "GBP"

[[requests]]
symbol = "SPY"
resolution = "minute"
start = "2025-01-06 09:30"
end = "2025-01-06 16:00"
calendar = "us_equity"

[[requests]]
symbol = "VOD"
resolution = "hour"
start = "2025-01-06T08:00:00Z"
end = "2025-01-06T16:00:00Z"
calendar = "lse"
tick_type = "quote"
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.display_time_zone, "America/New_York");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.alignment, BucketAlignment::RequestGrid);
        assert_eq!(config.price_curve.base_price, 50.0);
        assert_eq!(config.price_curve.band_ratio, 1.005);
        assert_eq!(config.requests.len(), 2);
    }

    #[test]
    fn test_build_requests_resolves_calendars_and_zones() {
        let config = parse_config(SAMPLE).unwrap();
        let calendars = build_calendars(&config).unwrap();
        assert!(calendars.contains("lse"));

        let requests = build_requests(&config, &calendars).unwrap();
        let spy = &requests[0];
        assert_eq!(spy.resolution, Resolution::Minute);
        assert_eq!(spy.calendar.name(), "us_equity");
        // naive times are read in New York
        assert_eq!(spy.start_utc, Utc.with_ymd_and_hms(2025, 1, 6, 14, 30, 0).unwrap());
        assert_eq!(spy.end_utc, Utc.with_ymd_and_hms(2025, 1, 6, 21, 0, 0).unwrap());

        let vod = &requests[1];
        assert_eq!(vod.calendar.name(), "lse");
        assert_eq!(vod.data_time_zone, chrono_tz::Europe::London);
        assert_eq!(vod.tick_type, TickType::Quote);
    }

    #[test]
    fn test_build_registry_from_inline_securities() {
        let config = parse_config(SAMPLE).unwrap();
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.try_get("SPY").map(|s| s.name.as_str()), Some("SPDR S&P 500"));
        assert_eq!(registry.try_get("VOD").map(|s| s.currency.as_str()), Some("GBP"));
    }

    #[test]
    fn test_rejects_missing_requests() {
        let err = parse_config("display_time_zone = \"UTC\"").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_unknown_calendar() {
        let toml = r#"
[[requests]]
symbol = "A"
resolution = "minute"
start = "2025-01-06T00:00:00Z"
end = "2025-01-06T01:00:00Z"
calendar = "mars_exchange"
"#;
        assert!(matches!(parse_config(toml), Err(SynthError::UnknownCalendar(_))));
    }

    #[test]
    fn test_rejects_inverted_span() {
        let toml = r#"
[[requests]]
symbol = "A"
resolution = "minute"
start = "2025-01-06T02:00:00Z"
end = "2025-01-06T01:00:00Z"
"#;
        assert!(matches!(parse_config(toml), Err(SynthError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_bad_toml_and_zone() {
        assert!(matches!(parse_config("requests = ["), Err(SynthError::TomlError(_))));

        let toml = r#"
display_time_zone = "Mars/Olympus"

[[requests]]
symbol = "A"
resolution = "minute"
start = "2025-01-06T00:00:00Z"
end = "2025-01-06T01:00:00Z"
"#;
        assert!(matches!(parse_config(toml), Err(SynthError::UnknownTimeZone(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/synthfeed.toml").unwrap_err();
        assert!(matches!(err, SynthError::ConfigError(_)));
    }
}
