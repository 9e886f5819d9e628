//! Financial statement generation.
//!
//! - Profit and loss
//! - Balance sheet with accounting equation check
//! - Cash flow by operating, investing, and financing activity
//! - Revenue, expense, and cash flow trends

mod cash_flow;
pub mod error;
pub mod service;
pub mod trend;
pub mod types;


pub use error::ReportError;
pub use service::StatementEngine;
pub use trend::Interval;
pub use types::*;
