mod generator;
mod run;

pub use generator::Generator;
pub use run::{run, Report, ReportEntry};
