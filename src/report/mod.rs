//! Report assembly: row aggregation with duplicate flagging, and the xlsx writer.

pub mod aggregate;
pub mod workbook;

pub use aggregate::Aggregator;
pub use workbook::ReportWriter;
