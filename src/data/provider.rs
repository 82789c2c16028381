/// Synthetic history provider: plan then assemble in one call
use chrono_tz::Tz;

use super::assembler::{BarAssembler, EmptySlicePolicy, SliceStream};
use super::planner::{BucketPlan, BucketPlanner};
use super::price_curve::PriceCurve;
use super::slice_builder::SliceFactory;
use crate::error::Result;
use crate::events::PipelineObserver;
use crate::securities::SecurityLookup;
use crate::types::{BucketAlignment, DataRequest};

pub struct SyntheticHistoryProvider<'a> {
    planner: BucketPlanner<'a>,
    assembler: BarAssembler<'a>,
}

impl<'a> SyntheticHistoryProvider<'a> {
    pub fn new(registry: &'a dyn SecurityLookup, slice_factory: &'a dyn SliceFactory) -> Self {
        SyntheticHistoryProvider {
            planner: BucketPlanner::new(),
            assembler: BarAssembler::new(registry, slice_factory),
        }
    }

    pub fn with_alignment(mut self, alignment: BucketAlignment) -> Self {
        self.planner = self.planner.with_alignment(alignment);
        self
    }

    pub fn with_curve(mut self, curve: PriceCurve) -> Self {
        self.assembler = self.assembler.with_curve(curve);
        self
    }

    pub fn with_empty_slice_policy(mut self, policy: EmptySlicePolicy) -> Self {
        self.assembler = self.assembler.with_empty_slice_policy(policy);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn PipelineObserver) -> Self {
        self.planner = self.planner.with_observer(observer);
        self.assembler = self.assembler.with_observer(observer);
        self
    }

    pub fn plan(&self, requests: &[DataRequest]) -> Result<BucketPlan> {
        self.planner.plan(requests)
    }

    pub fn assemble(&self, plan: &BucketPlan, display_time_zone: Tz) -> SliceStream<'a> {
        self.assembler.assemble(plan, display_time_zone)
    }

    /// Eager planning, lazy slices. Re-invoke to iterate again.
    pub fn get_history(&self, requests: &[DataRequest], display_time_zone: Tz) -> Result<SliceStream<'a>> {
        let plan = self.plan(requests)?;
        Ok(self.assemble(&plan, display_time_zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::slice_builder::DefaultSliceFactory;
    use crate::error::SynthError;
    use crate::events::{EventLog, EventType};
    use crate::securities::SecurityRegistry;
    use crate::time::{SessionCalendar, TradingCalendar};
    use crate::types::{PriceUpdate, Resolution, Slice};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    #[test]
    fn test_get_history_empty_requests() {
        let registry = SecurityRegistry::new();
        let factory = DefaultSliceFactory;
        let provider = SyntheticHistoryProvider::new(&registry, &factory);
        assert!(matches!(
            provider.get_history(&[], chrono_tz::UTC),
            Err(SynthError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_mixed_calendars_one_timeline() {
        // Monday 2025-01-06 09:00-11:00 New York; NSE closed by then (19:30-21:30 IST)
        let registry = SecurityRegistry::with_symbols(["SPY", "RELIANCE"]);
        let factory = DefaultSliceFactory;
        let log = EventLog::new();
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 14, 0, 0).unwrap();
        let end = start + Duration::hours(2);
        let us: Arc<dyn TradingCalendar> = Arc::new(SessionCalendar::us_equity());
        let nse: Arc<dyn TradingCalendar> = Arc::new(SessionCalendar::nse_equity());
        let requests = vec![
            DataRequest::new("SPY", Resolution::Minute, start, end, us),
            DataRequest::new("RELIANCE", Resolution::Minute, start, end, nse),
        ];

        let provider = SyntheticHistoryProvider::new(&registry, &factory).with_observer(&log);
        let mut stream = provider.get_history(&requests, chrono_tz::America::New_York).unwrap();
        let slices: Vec<Slice> = stream.by_ref().collect();

        assert_eq!(slices.len(), 90);
        assert!(slices.iter().all(|s| s.get("SPY").is_some() && s.get("RELIANCE").is_none()));
        assert_eq!(stream.data_point_count(), 90);
        assert_eq!(log.count(EventType::PlanBuilt), 1);
        assert_eq!(log.count(EventType::StreamCompleted), 1);
    }

    #[test]
    fn test_price_updates_applied_by_caller() {
        let mut registry = SecurityRegistry::with_symbols(["A"]);
        let factory = DefaultSliceFactory;
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        let calendar: Arc<dyn TradingCalendar> = Arc::new(crate::time::AlwaysOpenCalendar::utc());
        let requests = vec![DataRequest::new("A", Resolution::Minute, start, start + Duration::minutes(3), calendar)];

        let updates: Vec<PriceUpdate> = {
            let provider = SyntheticHistoryProvider::new(&registry, &factory);
            let stream = provider.get_history(&requests, chrono_tz::UTC).unwrap();
            let updates = stream.flat_map(|slice| slice.price_updates()).collect();
            updates
        };
        // generating never touches the registry
        assert!(registry.try_get("A").and_then(|s| s.price).is_none());

        assert_eq!(registry.apply_price_updates(&updates), 3);
        assert_eq!(
            registry.try_get("A").and_then(|s| s.price),
            Some(PriceCurve::default().close(2, 3))
        );
    }
}
