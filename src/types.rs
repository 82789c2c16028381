/// Core type definitions for the synthetic data generator
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time::TradingCalendar;

/// Bar duration of a data request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Second,
    Minute,
    Hour,
    Daily,
}

impl Resolution {
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Daily => "daily",
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        match self {
            Resolution::Second => 1,
            Resolution::Minute => 60,
            Resolution::Hour => 3_600,
            Resolution::Daily => 86_400,
        }
    }

    pub fn to_duration(&self) -> Duration {
        Duration::seconds(self.duration_seconds())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of market data a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickType {
    Trade,
    Quote,
    OpenInterest,
}

/// Price normalization applied by the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    Raw,
    Adjusted,
    SplitAdjusted,
    TotalReturn,
}

/// One symbol's history need. Never mutated after creation.
#[derive(Clone)]
pub struct DataRequest {
    pub symbol: String,
    pub resolution: Resolution,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub calendar: Arc<dyn TradingCalendar>,
    pub include_extended_hours: bool,
    pub data_time_zone: Tz,
    pub fill_forward_resolution: Option<Resolution>,
    pub is_custom_data: bool,
    pub tick_type: TickType,
    pub normalization_mode: NormalizationMode,
}

impl DataRequest {
    /// Request stamped in the calendar's own zone, with default tags
    pub fn new(
        symbol: impl Into<String>,
        resolution: Resolution,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        calendar: Arc<dyn TradingCalendar>,
    ) -> Self {
        let data_time_zone = calendar.time_zone();
        DataRequest {
            symbol: symbol.into(),
            resolution,
            start_utc,
            end_utc,
            calendar,
            include_extended_hours: false,
            data_time_zone,
            fill_forward_resolution: None,
            is_custom_data: false,
            tick_type: TickType::Trade,
            normalization_mode: NormalizationMode::Adjusted,
        }
    }

    pub fn with_extended_hours(mut self, include: bool) -> Self {
        self.include_extended_hours = include;
        self
    }

    pub fn with_data_time_zone(mut self, tz: Tz) -> Self {
        self.data_time_zone = tz;
        self
    }

    pub fn with_fill_forward(mut self, resolution: Option<Resolution>) -> Self {
        self.fill_forward_resolution = resolution;
        self
    }

    pub fn exchange_time_zone(&self) -> Tz {
        self.calendar.time_zone()
    }
}

impl fmt::Debug for DataRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataRequest")
            .field("symbol", &self.symbol)
            .field("resolution", &self.resolution)
            .field("start_utc", &self.start_utc)
            .field("end_utc", &self.end_utc)
            .field("calendar", &self.calendar.name())
            .field("include_extended_hours", &self.include_extended_hours)
            .field("data_time_zone", &self.data_time_zone)
            .finish()
    }
}

/// Per-bucket materialization of a request's static parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveConfig {
    pub symbol: String,
    pub resolution: Resolution,
    pub data_time_zone: Tz,
    pub exchange_time_zone: Tz,
    pub include_extended_hours: bool,
    pub fill_forward_resolution: Option<Resolution>,
    pub is_custom_data: bool,
    pub tick_type: TickType,
    pub normalization_mode: NormalizationMode,
    /// Always true: this config was never a real subscription
    pub synthesized: bool,
}

impl ActiveConfig {
    pub fn synthesized(request: &DataRequest) -> Self {
        ActiveConfig {
            symbol: request.symbol.clone(),
            resolution: request.resolution,
            data_time_zone: request.data_time_zone,
            exchange_time_zone: request.exchange_time_zone(),
            include_extended_hours: request.include_extended_hours,
            fill_forward_resolution: request.fill_forward_resolution,
            is_custom_data: request.is_custom_data,
            tick_type: request.tick_type,
            normalization_mode: request.normalization_mode,
            synthesized: true,
        }
    }
}

/// One generated price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticBar {
    pub symbol: String,
    /// Open time in the config's data time zone
    pub time: NaiveDateTime,
    #[serde(with = "duration_seconds")]
    pub period: Duration,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl SyntheticBar {
    pub fn end_time(&self) -> NaiveDateTime {
        self.time + self.period
    }
}

/// Instrument id plus the bar generated for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPacket {
    pub symbol: String,
    pub bar: SyntheticBar,
}

/// Last-price update the caller applies to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: f64,
    pub time_utc: DateTime<Utc>,
}

/// Cash balances by currency
pub type CashBook = HashMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SecurityChanges {
    pub fn none() -> Self {
        SecurityChanges::default()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Universe selection output keyed by universe name
pub type UniverseData = BTreeMap<String, Vec<String>>;

/// Market snapshot handed to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub time_utc: DateTime<Utc>,
    /// `time_utc` in `time_zone`
    pub time: NaiveDateTime,
    pub time_zone: Tz,
    pub packets: Vec<DataPacket>,
    pub bars: BTreeMap<String, SyntheticBar>,
    pub cash_book: CashBook,
    pub security_changes: SecurityChanges,
    pub universe_data: Option<UniverseData>,
}

impl Slice {
    pub fn has_data(&self) -> bool {
        !self.packets.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&SyntheticBar> {
        self.bars.get(symbol)
    }

    /// Price updates implied by this slice, one per packet
    pub fn price_updates(&self) -> Vec<PriceUpdate> {
        self.packets
            .iter()
            .map(|p| PriceUpdate {
                symbol: p.symbol.clone(),
                price: p.bar.close,
                time_utc: self.time_utc,
            })
            .collect()
    }
}

/// Tradable instrument held by the security registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(skip)]
    pub price: Option<f64>,
    #[serde(skip)]
    pub last_update: Option<DateTime<Utc>>,
}

impl Security {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Security {
            name: symbol.clone(),
            symbol,
            market: default_market(),
            currency: default_currency(),
            price: None,
            last_update: None,
        }
    }
}

fn default_market() -> String {
    "usa".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

/// How buckets are matched to each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketAlignment {
    /// Every request is tested at every finest-grid instant
    #[default]
    FinestGrid,
    /// A request only contributes on its own resolution grid and inside its own span
    RequestGrid,
}

/// Configuration for the generator binaries
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_display_time_zone")]
    pub display_time_zone: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub alignment: BucketAlignment,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub securities_csv: Option<String>,
    #[serde(default)]
    pub price_curve: PriceCurveConfig,
    #[serde(default)]
    pub calendars: Vec<CalendarConfig>,
    #[serde(default)]
    pub securities: Vec<Security>,
    #[serde(default)]
    pub requests: Vec<RequestConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceCurveConfig {
    pub base_price: f64,
    pub amplitude: f64,
    pub band_ratio: f64,
    pub volume: u64,
}

impl Default for PriceCurveConfig {
    fn default() -> Self {
        PriceCurveConfig {
            base_price: 100.0,
            amplitude: 10.0,
            band_ratio: 1.005,
            volume: 1000,
        }
    }
}

/// Custom weekly session calendar
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub name: String,
    pub time_zone: String,
    pub market_open: String,
    pub market_close: String,
    #[serde(default)]
    pub extended_open: Option<String>,
    #[serde(default)]
    pub extended_close: Option<String>,
    #[serde(default = "default_trading_days")]
    pub trading_days: Vec<String>,
    #[serde(default)]
    pub holidays: Vec<String>,
}

/// One `[[requests]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub symbol: String,
    pub resolution: Resolution,
    pub start: String,
    pub end: String,
    #[serde(default = "default_calendar")]
    pub calendar: String,
    #[serde(default)]
    pub extended_hours: bool,
    #[serde(default)]
    pub data_time_zone: Option<String>,
    #[serde(default)]
    pub fill_forward: Option<Resolution>,
    #[serde(default)]
    pub is_custom_data: bool,
    #[serde(default = "default_tick_type")]
    pub tick_type: TickType,
    #[serde(default = "default_normalization")]
    pub normalization: NormalizationMode,
}

fn default_display_time_zone() -> String {
    "UTC".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_calendar() -> String {
    "always_open".to_string()
}

fn default_trading_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"].iter().map(|d| d.to_string()).collect()
}

fn default_tick_type() -> TickType {
    TickType::Trade
}

fn default_normalization() -> NormalizationMode {
    NormalizationMode::Adjusted
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(d)?))
    }
}
