pub mod digest;

pub use digest::{fingerprint_slices, SliceDigest};
