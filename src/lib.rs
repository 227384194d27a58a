//! Parse delimited reservation and meter reading files into typed records and render them as
//! text reports.

pub mod aggregate;
pub mod error;
pub mod format;
pub mod menu;
pub mod parse;
pub mod process;
pub mod report;
pub mod types;

pub use error::ReportError;
