/// Weekly market session calendars
use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;

use super::calendar::TradingCalendar;
use super::holidays::{get_nse_holidays_2025, get_nyse_holidays_2025};
use super::zones::parse_time_zone;
use crate::error::{Result, SynthError};
use crate::types::CalendarConfig;

/// Regular hours plus optional extended hours on a fixed set of weekdays
#[derive(Debug, Clone)]
pub struct SessionCalendar {
    name: String,
    time_zone: Tz,
    market_open: NaiveTime,
    market_close: NaiveTime,
    extended: Option<(NaiveTime, NaiveTime)>,
    trading_days: HashSet<Weekday>,
    holidays: HashSet<NaiveDate>,
}

impl SessionCalendar {
    pub fn new(
        name: impl Into<String>,
        time_zone: Tz,
        market_open: NaiveTime,
        market_close: NaiveTime,
    ) -> Result<Self> {
        let name = name.into();
        if market_open >= market_close {
            return Err(SynthError::InvalidSession(format!(
                "{}: open {} is not before close {}",
                name, market_open, market_close
            )));
        }

        Ok(SessionCalendar {
            name,
            time_zone,
            market_open,
            market_close,
            extended: None,
            trading_days: weekdays(),
            holidays: HashSet::new(),
        })
    }

    /// Extended window must contain the regular session
    pub fn with_extended_hours(mut self, open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open > self.market_open || close < self.market_close {
            return Err(SynthError::InvalidSession(format!(
                "{}: extended {}-{} does not cover regular {}-{}",
                self.name, open, close, self.market_open, self.market_close
            )));
        }
        self.extended = Some((open, close));
        Ok(self)
    }

    pub fn with_trading_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.trading_days = days.into_iter().collect();
        self
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// NYSE: 09:30-16:00 New York, extended 04:00-20:00.
    ///
    /// Only 2025 closures are known. Dates in other years are treated as ordinary weekdays,
    /// so add them with [`SessionCalendar::with_holidays`] or a `[[calendars]]` entry.
    pub fn us_equity() -> Self {
        SessionCalendar {
            name: "us_equity".to_string(),
            time_zone: chrono_tz::America::New_York,
            market_open: hm(9, 30),
            market_close: hm(16, 0),
            extended: Some((hm(4, 0), hm(20, 0))),
            trading_days: weekdays(),
            holidays: get_nyse_holidays_2025(),
        }
    }

    /// NSE: 09:15-15:30 IST, pre-open and closing session 09:00-16:00.
    ///
    /// Only 2025 holidays are known; other years need [`SessionCalendar::with_holidays`].
    pub fn nse_equity() -> Self {
        SessionCalendar {
            name: "nse_equity".to_string(),
            time_zone: chrono_tz::Asia::Kolkata,
            market_open: hm(9, 15),
            market_close: hm(15, 30),
            extended: Some((hm(9, 0), hm(16, 0))),
            trading_days: weekdays(),
            holidays: get_nse_holidays_2025(),
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        let time_zone = parse_time_zone(&config.time_zone)?;
        let mut calendar = SessionCalendar::new(
            config.name.clone(),
            time_zone,
            parse_session_time(&config.market_open)?,
            parse_session_time(&config.market_close)?,
        )?;

        match (&config.extended_open, &config.extended_close) {
            (Some(open), Some(close)) => {
                calendar = calendar
                    .with_extended_hours(parse_session_time(open)?, parse_session_time(close)?)?;
            }
            (None, None) => {}
            _ => {
                return Err(SynthError::InvalidSession(format!(
                    "{}: extended_open and extended_close must be set together",
                    config.name
                )))
            }
        }

        let days = config
            .trading_days
            .iter()
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| SynthError::InvalidSession(format!("{}: bad weekday {}", config.name, d)))
            })
            .collect::<Result<Vec<_>>>()?;

        let holidays = config
            .holidays
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| SynthError::InvalidSession(format!("{}: bad holiday {}", config.name, d)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(calendar.with_trading_days(days).with_holidays(holidays))
    }

    /// Check if a local date is a trading day (weekday in session, not a holiday)
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.trading_days.contains(&date.weekday()) && !self.holidays.contains(&date)
    }

    /// Session window for the given extended-hours flag
    pub fn window(&self, include_extended_hours: bool) -> (NaiveTime, NaiveTime) {
        match (include_extended_hours, self.extended) {
            (true, Some(window)) => window,
            _ => (self.market_open, self.market_close),
        }
    }
}

impl TradingCalendar for SessionCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_zone(&self) -> Tz {
        self.time_zone
    }

    fn is_open(&self, local: NaiveDateTime, include_extended_hours: bool) -> bool {
        if !self.is_trading_day(local.date()) {
            return false;
        }
        let (open, close) = self.window(include_extended_hours);
        let current_time = local.time();
        current_time >= open && current_time < close
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn weekdays() -> HashSet<Weekday> {
    [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        .into_iter()
        .collect()
}

fn parse_session_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| SynthError::InvalidSession(format!("bad session time: {}", s)))
}
