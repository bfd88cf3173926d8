//! Building blocks for fanning work out to concurrent units and fanning their failures back in.
//!
//! See: [`ErrorCollector`], [`WorkerPool`]

mod aggregate;
mod pool;

pub use aggregate::*;
pub use pool::*;
