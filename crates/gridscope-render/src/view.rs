use gridscope_core::Records;

use crate::Result;

/// A view whose record set can be replaced wholesale, then re-derived.
///
/// The line chart's brush drives the other views through this trait.
pub trait DataView {
    fn data(&self) -> Records;

    fn set_data(&self, records: Records);

    /// Re-derives aggregation and layout from the current records.
    fn update(&self) -> Result<()>;
}
