/// Security registry for symbol lookups and last-price bookkeeping
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::types::{PriceUpdate, Security};

/// Read-only symbol lookup used while assembling slices
pub trait SecurityLookup {
    fn try_get(&self, symbol: &str) -> Option<&Security>;
}

/// Securities keyed by symbol
#[derive(Debug, Clone, Default)]
pub struct SecurityRegistry {
    securities: HashMap<String, Security>,
}

impl SecurityRegistry {
    pub fn new() -> Self {
        SecurityRegistry::default()
    }

    /// Add or replace a security
    pub fn add(&mut self, security: Security) {
        self.securities.insert(security.symbol.clone(), security);
    }

    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = SecurityRegistry::new();
        for symbol in symbols {
            registry.add(Security::new(symbol));
        }
        registry
    }

    /// Load a security master with `symbol,name,market,currency` columns.
    /// Later rows win on duplicate symbols.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut registry = SecurityRegistry::new();
        for record in csv_reader.deserialize() {
            let mut security: Security = record?;
            if security.name.is_empty() {
                security.name = security.symbol.clone();
            }
            registry.add(security);
        }

        Ok(registry)
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let registry = SecurityRegistry::from_csv_reader(file)?;
        info!("✅ Loaded {} securities from {}", registry.len(), path.as_ref().display());
        Ok(registry)
    }

    /// Merge another registry into this one, replacing duplicates
    pub fn extend(&mut self, other: SecurityRegistry) {
        self.securities.extend(other.securities);
    }

    /// Apply generated prices; returns how many updates matched a security
    pub fn apply_price_updates(&mut self, updates: &[PriceUpdate]) -> usize {
        let mut applied = 0;
        for update in updates {
            match self.securities.get_mut(&update.symbol) {
                Some(security) => {
                    security.price = Some(update.price);
                    security.last_update = Some(update.time_utc);
                    applied += 1;
                }
                None => debug!("Price update for unknown symbol {}", update.symbol),
            }
        }
        applied
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.securities.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}

impl SecurityLookup for SecurityRegistry {
    fn try_get(&self, symbol: &str) -> Option<&Security> {
        self.securities.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_csv_security_master() {
        let csv = "symbol,name,market,currency\n\
                   SPY, SPDR S&P 500 ETF,usa,USD\n\
                   RELIANCE,,india,INR\n\
                   SPY,SPDR Trust,usa,USD\n";
        let registry = SecurityRegistry::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(registry.symbols(), vec!["RELIANCE", "SPY"]);
        assert_eq!(registry.try_get("SPY").unwrap().name, "SPDR Trust");
        assert_eq!(registry.try_get("RELIANCE").unwrap().name, "RELIANCE");
        assert_eq!(registry.try_get("RELIANCE").unwrap().currency, "INR");
        assert!(registry.try_get("QQQ").is_none());
    }

    #[test]
    fn test_csv_missing_column_fails() {
        let csv = "name,market\nfoo,usa\n";
        assert!(SecurityRegistry::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_apply_price_updates() {
        let mut registry = SecurityRegistry::with_symbols(["AAPL"]);
        let time_utc = Utc.with_ymd_and_hms(2025, 1, 2, 15, 0, 0).unwrap();
        let applied = registry.apply_price_updates(&[
            PriceUpdate { symbol: "AAPL".to_string(), price: 104.2, time_utc },
            PriceUpdate { symbol: "MSFT".to_string(), price: 99.0, time_utc },
        ]);

        assert_eq!(applied, 1);
        let aapl = registry.try_get("AAPL").unwrap();
        assert_eq!(aapl.price, Some(104.2));
        assert_eq!(aapl.last_update, Some(time_utc));
    }
}
