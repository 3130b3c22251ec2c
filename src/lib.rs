#![doc = "Areawalk public API"]
mod convert;
pub mod io;
mod overlap;
mod partition;

#[doc(inline)]
pub use partition::{check_consistency, Partition};

#[doc(inline)]
pub use overlap::{CoverageBand, Overlap};

#[doc(inline)]
pub use convert::{interpolate, Converter, DEFAULT_COVERAGE_THRESHOLD};
