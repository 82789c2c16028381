/// Stream fingerprints for determinism checks
use sha2::{Digest, Sha256};

use crate::types::Slice;

/// Incremental SHA-256 over slice keys and bar values
#[derive(Default, Clone)]
pub struct SliceDigest {
    hasher: Sha256,
    slices: usize,
}

impl SliceDigest {
    pub fn new() -> Self {
        SliceDigest::default()
    }

    pub fn update(&mut self, slice: &Slice) {
        self.hasher.update(slice.time_utc.timestamp().to_le_bytes());
        for packet in &slice.packets {
            let bar = &packet.bar;
            self.hasher.update(packet.symbol.as_bytes());
            self.hasher.update(bar.time.and_utc().timestamp().to_le_bytes());
            self.hasher.update(bar.period.num_seconds().to_le_bytes());
            for value in [bar.open, bar.high, bar.low, bar.close] {
                self.hasher.update(value.to_bits().to_le_bytes());
            }
            self.hasher.update(bar.volume.to_le_bytes());
        }
        self.slices += 1;
    }

    pub fn slice_count(&self) -> usize {
        self.slices
    }

    pub fn finalize(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

pub fn fingerprint_slices(slices: &[Slice]) -> String {
    let mut digest = SliceDigest::new();
    for slice in slices {
        digest.update(slice);
    }
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{plan, BarAssembler, DefaultSliceFactory};
    use crate::securities::SecurityRegistry;
    use crate::time::AlwaysOpenCalendar;
    use crate::types::{DataRequest, Resolution};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn slices(minutes: i64) -> Vec<Slice> {
        let registry = SecurityRegistry::with_symbols(["A"]);
        let factory = DefaultSliceFactory;
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        let request = DataRequest::new(
            "A",
            Resolution::Minute,
            start,
            start + Duration::minutes(minutes),
            Arc::new(AlwaysOpenCalendar::utc()),
        );
        let plan = plan(&[request]).unwrap();
        let slices = BarAssembler::new(&registry, &factory)
            .assemble(&plan, chrono_tz::UTC)
            .collect();
        slices
    }

    #[test]
    fn test_identical_inputs_identical_digest() {
        let key1 = fingerprint_slices(&slices(30));
        let key2 = fingerprint_slices(&slices(30));
        let key3 = fingerprint_slices(&slices(31));

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_eq!(key1.len(), 64);
    }

    #[test]
    fn test_incremental_matches_batch() {
        let all = slices(10);
        let mut digest = SliceDigest::new();
        for slice in &all {
            digest.update(slice);
        }
        assert_eq!(digest.slice_count(), 10);
        assert_eq!(digest.finalize(), fingerprint_slices(&all));
    }
}
