//! Output formatter trait

use consult_domain::ExecutionResult;

/// Trait for formatting consultation results
pub trait OutputFormatter {
    /// Format the complete consultation report
    fn format(&self, result: &ExecutionResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &ExecutionResult) -> String;

    /// Format the final recommendation only (concise output)
    fn format_summary(&self, result: &ExecutionResult) -> String;
}
