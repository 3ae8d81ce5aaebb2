// =============================================================================
// Report Module
// =============================================================================
//
// Consumers of an `IndicatorFrame`: chart, console summary and CSV file.

pub mod chart;
pub mod csv_export;
pub mod summary;

pub use chart::save_chart;
pub use csv_export::save_csv;
pub use summary::render_summary;
