//! Read-only reports over a company snapshot
//!
//! Everything here is a pure function of `&CompanyData`; nothing is cached
//! between calls.

pub mod daybook;
pub mod drilldown;
pub mod gst;
pub mod payroll;
pub mod statements;
pub mod stock;

pub use daybook::*;
pub use drilldown::*;
pub use gst::*;
pub use payroll::*;
pub use statements::*;
pub use stock::*;
