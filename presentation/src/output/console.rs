//! Console output formatter for consultation results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consult_domain::{
    AgentResponse, ConflictSeverity, ConsensusResult, ExecutionResult, ResolutionOutcome,
    ResponseKind, util::truncate_str,
};

/// Longest claim shown in a resolution line
const CLAIM_PREVIEW_BYTES: usize = 60;

/// Formats consultation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete consultation report
    pub fn format(result: &ExecutionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consultation Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            result.question
        ));
        output.push_str(&format!(
            "{} {} ({} mode)\n\n",
            "Framework:".cyan().bold(),
            result.framework,
            result.mode
        ));

        output.push_str(&Self::section_header("Agent Responses"));
        for response in &result.responses {
            output.push_str(&Self::response_block(response));
        }

        if !result.conflicts.is_empty() {
            output.push_str(&Self::section_header("Conflicts"));
            for conflict in &result.conflicts {
                let severity = match conflict.severity {
                    ConflictSeverity::High => conflict.severity.as_str().red().bold(),
                    ConflictSeverity::Medium => conflict.severity.as_str().yellow().bold(),
                    ConflictSeverity::Low => conflict.severity.as_str().dimmed(),
                };
                output.push_str(&format!(
                    "  * [{}] {} {}\n",
                    severity, conflict.id, conflict.description
                ));
            }
        }

        if !result.resolutions.is_empty() {
            output.push_str(&Self::section_header("Resolutions"));
            for resolution in &result.resolutions {
                let detail = match &resolution.outcome {
                    ResolutionOutcome::Adopted {
                        claim,
                        supporting_agent_ids,
                        ..
                    } => format!(
                        "adopted '{}' backed by {}",
                        truncate_str(claim, CLAIM_PREVIEW_BYTES),
                        Self::join_ids(supporting_agent_ids)
                    ),
                    ResolutionOutcome::Escalated { reason } => {
                        format!("{} {}", "escalated:".red(), reason)
                    }
                };
                output.push_str(&format!(
                    "  * {} via {}: {}\n",
                    resolution.conflict_id,
                    resolution.strategy.to_string().bold(),
                    detail
                ));
            }
        }

        output.push_str(&Self::section_header("Outcome"));
        output.push_str(&Self::outcome(result));

        let meta = &result.metadata;
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "{} agents invoked, {} failed, {} rounds, {} ms{}{}",
                meta.agents_invoked,
                meta.agents_failed,
                meta.rounds_completed,
                meta.duration_ms,
                if meta.timed_out { ", timed out" } else { "" },
                if meta.degraded { ", degraded" } else { "" }
            )
            .dimmed()
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &ExecutionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final recommendation only
    pub fn format_summary(result: &ExecutionResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Panel Recommendation ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), result.question));
        output.push_str(&Self::outcome(result));

        output
    }

    fn response_block(response: &AgentResponse) -> String {
        let label = match response.kind {
            ResponseKind::Answer => format!("── {} (round {}) ──", response.agent_id, response.round),
            kind => format!(
                "── {} (round {}, {}) ──",
                response.agent_id,
                response.round,
                match kind {
                    ResponseKind::Decomposition => "decomposition",
                    _ => "moderation",
                }
            ),
        };

        if let Some(failure) = &response.failure {
            return format!("\n{}\nError: {}\n", label.red().bold(), failure);
        }

        let mut block = format!(
            "\n{} {}\n{}\n",
            label.yellow().bold(),
            format!("confidence {:.2}", response.confidence).dimmed(),
            response.content
        );
        if !response.invalid_reasons.is_empty() {
            block.push_str(&format!(
                "{} {}\n",
                "invalid:".red(),
                response.invalid_reasons.join("; ")
            ));
        }
        block
    }

    fn outcome(result: &ExecutionResult) -> String {
        match &result.consensus {
            None => format!(
                "{}\n",
                "No valid responses; nothing to recommend.".red().bold()
            ),
            Some(consensus) => Self::consensus_block(consensus),
        }
    }

    fn consensus_block(consensus: &ConsensusResult) -> String {
        let mut output = String::new();
        let recommendation = &consensus.final_recommendation;

        let status = if consensus.reached {
            format!(
                "Consensus reached ({} of {} required)",
                consensus.supporting_agent_ids.len(),
                consensus.quorum
            )
            .green()
            .bold()
        } else if consensus.needs_review {
            "No consensus: escalated for human review".red().bold()
        } else {
            "No consensus: most confident answer shown".yellow().bold()
        };
        output.push_str(&format!("{}\n\n", status));

        output.push_str(&format!(
            "{}\n\n{}\n",
            format!(
                "Recommendation from {} (confidence {:.2})",
                recommendation.agent_id, recommendation.confidence
            )
            .yellow()
            .bold(),
            recommendation.content
        ));

        if !consensus.supporting_agent_ids.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Supporting:".green(),
                Self::join_ids(&consensus.supporting_agent_ids)
            ));
        }
        if !consensus.dissenting_agent_ids.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Dissenting:".yellow(),
                Self::join_ids(&consensus.dissenting_agent_ids)
            ));
        }

        output
    }

    fn join_ids(ids: &[consult_domain::AgentId]) -> String {
        ids.iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ExecutionResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &ExecutionResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &ExecutionResult) -> String {
        Self::format_summary(result)
    }
}
