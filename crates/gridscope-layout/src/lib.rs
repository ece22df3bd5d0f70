#![forbid(unsafe_code)]

//! Headless circle layout algorithms.
//!
//! `gridscope-layout` is used by `gridscope-render` to lay out the Dorling cartogram: every
//! region's events are packed as non-overlapping siblings, wrapped in their smallest enclosing
//! circle, and the resulting clusters are relaxed towards their geographic anchors.
//!
//! All algorithms are deterministic: the randomness they need (shuffling, jiggling exact
//! coincidences apart) comes from a fixed-seed linear congruential generator.

pub mod circle;
pub mod enclose;
pub mod error;
pub mod force;
pub mod pack;
mod rng;

pub use circle::Circle;
pub use enclose::enclose;
pub use error::{Error, Result};
pub use force::{ForceNode, ForceOptions, RelaxStats, relax};
pub use pack::pack_siblings;
