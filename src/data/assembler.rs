/// Bar assembly: walk a bucket plan and emit one slice per bucket
use std::iter::FusedIterator;

use chrono_tz::Tz;
use tracing::debug;

use super::planner::{BucketPlan, TimeBucket};
use super::price_curve::{PriceCurve, PricePoint};
use super::slice_builder::SliceFactory;
use crate::events::{notify, EventPayload, PipelineObserver};
use crate::securities::SecurityLookup;
use crate::time::convert_from_utc;
use crate::types::{CashBook, DataPacket, SecurityChanges, Slice, SyntheticBar};

/// What to do with a bucket whose every config missed the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySlicePolicy {
    /// Emit a slice with zero packets
    #[default]
    Emit,
    /// Drop it; the price index still advances
    Skip,
}

/// Generates synthetic bars for a plan
#[derive(Clone, Copy)]
pub struct BarAssembler<'a> {
    registry: &'a dyn SecurityLookup,
    slice_factory: &'a dyn SliceFactory,
    curve: PriceCurve,
    empty_slices: EmptySlicePolicy,
    observer: Option<&'a dyn PipelineObserver>,
}

impl<'a> BarAssembler<'a> {
    pub fn new(registry: &'a dyn SecurityLookup, slice_factory: &'a dyn SliceFactory) -> Self {
        BarAssembler {
            registry,
            slice_factory,
            curve: PriceCurve::default(),
            empty_slices: EmptySlicePolicy::default(),
            observer: None,
        }
    }

    pub fn with_curve(mut self, curve: PriceCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_empty_slice_policy(mut self, policy: EmptySlicePolicy) -> Self {
        self.empty_slices = policy;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn PipelineObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Lazy, one-shot slice sequence over `plan`. The plan is shared, not consumed,
    /// so assembling it again yields an identical sequence.
    pub fn assemble(&self, plan: &BucketPlan, display_time_zone: Tz) -> SliceStream<'a> {
        SliceStream {
            assembler: *self,
            plan: plan.clone(),
            display_time_zone,
            position: 0,
            slice_count: 0,
            data_point_count: 0,
            completed: false,
        }
    }

    fn build_packets(&self, bucket: &TimeBucket, point: &PricePoint) -> Vec<DataPacket> {
        let mut packets = Vec::with_capacity(bucket.configs.len());

        for config in &bucket.configs {
            if self.registry.try_get(&config.symbol).is_none() {
                debug!("Skipping unregistered symbol {} at {}", config.symbol, bucket.time_utc);
                notify(
                    self.observer,
                    EventPayload::SecurityNotFound {
                        symbol: config.symbol.clone(),
                        bucket_utc: bucket.time_utc,
                    },
                );
                continue;
            }

            // Bucket key is the bar close; bars are stamped with their local open
            let period = config.resolution.to_duration();
            let bar = SyntheticBar {
                symbol: config.symbol.clone(),
                time: convert_from_utc(bucket.time_utc - period, config.data_time_zone),
                period,
                open: point.open,
                high: point.high,
                low: point.low,
                close: point.close,
                volume: point.volume,
            };

            packets.push(DataPacket {
                symbol: config.symbol.clone(),
                bar,
            });
        }

        packets
    }
}

/// Iterator returned by [`BarAssembler::assemble`]
pub struct SliceStream<'a> {
    assembler: BarAssembler<'a>,
    plan: BucketPlan,
    display_time_zone: Tz,
    position: usize,
    slice_count: usize,
    data_point_count: usize,
    completed: bool,
}

impl<'a> SliceStream<'a> {
    /// Bars emitted so far
    pub fn data_point_count(&self) -> usize {
        self.data_point_count
    }

    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    fn finish(&mut self) {
        if !self.completed {
            self.completed = true;
            notify(
                self.assembler.observer,
                EventPayload::StreamCompleted {
                    slice_count: self.slice_count,
                    data_point_count: self.data_point_count,
                },
            );
        }
    }
}

impl<'a> Iterator for SliceStream<'a> {
    type Item = Slice;

    fn next(&mut self) -> Option<Slice> {
        let count = self.plan.len();

        while self.position < count {
            let index = self.position;
            self.position += 1;

            let bucket = &self.plan.buckets()[index];
            let point = self.assembler.curve.point(index, count);
            let packets = self.assembler.build_packets(bucket, &point);

            if packets.is_empty() && self.assembler.empty_slices == EmptySlicePolicy::Skip {
                debug!("Dropping empty slice at {}", bucket.time_utc);
                continue;
            }

            let packet_count = packets.len();
            let slice = self.assembler.slice_factory.build(
                bucket.time_utc,
                self.display_time_zone,
                &CashBook::new(),
                packets,
                &SecurityChanges::none(),
                None,
            );

            self.slice_count += 1;
            self.data_point_count += packet_count;
            notify(
                self.assembler.observer,
                EventPayload::SliceEmitted {
                    bucket_utc: bucket.time_utc,
                    index,
                    packet_count,
                },
            );

            return Some(slice);
        }

        self.finish();
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.len() - self.position;
        match self.assembler.empty_slices {
            EmptySlicePolicy::Emit => (remaining, Some(remaining)),
            EmptySlicePolicy::Skip => (0, Some(remaining)),
        }
    }
}

impl<'a> FusedIterator for SliceStream<'a> {}
