pub mod assembler;
pub mod planner;
pub mod price_curve;
pub mod provider;
pub mod slice_builder;

pub use assembler::{BarAssembler, EmptySlicePolicy, SliceStream};
pub use planner::{plan, BucketPlan, BucketPlanner, TimeBucket};
pub use price_curve::{PriceCurve, PricePoint};
pub use provider::SyntheticHistoryProvider;
pub use slice_builder::{DefaultSliceFactory, SliceFactory};
