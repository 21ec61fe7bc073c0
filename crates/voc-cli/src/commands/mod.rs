//! Command implementations.

pub mod analyze;
pub mod report;
pub mod run;
pub mod top_issues;

pub use self::analyze::{analyze_and_store, execute_analyze};
pub use self::report::execute_report;
pub use self::run::execute_run;
pub use self::top_issues::execute_top_issues;
