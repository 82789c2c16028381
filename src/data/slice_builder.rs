/// Slice construction seam
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::time::convert_from_utc;
use crate::types::{CashBook, DataPacket, SecurityChanges, Slice, UniverseData};

/// Turns one bucket's packets into a [`Slice`]
pub trait SliceFactory {
    fn build(
        &self,
        time_utc: DateTime<Utc>,
        display_time_zone: Tz,
        cash_book: &CashBook,
        packets: Vec<DataPacket>,
        security_changes: &SecurityChanges,
        universe_data: Option<&UniverseData>,
    ) -> Slice;
}

/// Indexes bars by symbol and stamps the slice in the display zone
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSliceFactory;

impl SliceFactory for DefaultSliceFactory {
    fn build(
        &self,
        time_utc: DateTime<Utc>,
        display_time_zone: Tz,
        cash_book: &CashBook,
        packets: Vec<DataPacket>,
        security_changes: &SecurityChanges,
        universe_data: Option<&UniverseData>,
    ) -> Slice {
        let bars: BTreeMap<_, _> = packets
            .iter()
            .map(|p| (p.symbol.clone(), p.bar.clone()))
            .collect();

        Slice {
            time_utc,
            time: convert_from_utc(time_utc, display_time_zone),
            time_zone: display_time_zone,
            packets,
            bars,
            cash_book: cash_book.clone(),
            security_changes: security_changes.clone(),
            universe_data: universe_data.cloned(),
        }
    }
}
