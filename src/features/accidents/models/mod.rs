mod accident_report;
mod status;

pub use accident_report::*;
pub use status::*;
