pub mod registry;

pub use registry::{SecurityLookup, SecurityRegistry};
