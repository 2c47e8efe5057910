//! Prompt templates for each kind of agent turn

use crate::agent::AgentDefinition;
use crate::orchestration::{Contribution, HistoryEntry};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for an agent, falling back to one built from its role
    pub fn system(agent: &AgentDefinition) -> String {
        if !agent.system_prompt.trim().is_empty() {
            return agent.system_prompt.clone();
        }
        let mut prompt = format!(
            "You are the {} on a panel of clinical experts.",
            agent.role
        );
        if !agent.goal.trim().is_empty() {
            prompt.push_str(&format!(" Your goal: {}.", agent.goal.trim_end_matches('.')));
        }
        prompt.push_str(
            "\nGive a clear recommendation, state your confidence between 0 and 1, \
             and keep your reasoning brief.",
        );
        prompt
    }

    /// Independent answer to the question
    pub fn initial_query(question: &str, history: &[HistoryEntry]) -> String {
        format!(
            "{}Question:\n{}\n\nProvide your recommendation.",
            Self::history_section(history),
            question
        )
    }

    /// Answer that builds on the colleagues who already answered
    pub fn sequential_query(
        question: &str,
        history: &[HistoryEntry],
        prior: &[Contribution],
    ) -> String {
        if prior.is_empty() {
            return Self::initial_query(question, history);
        }
        format!(
            "{}Question:\n{}\n\nColleagues who answered before you:\n{}\n\
             Build on or challenge their answers and provide your recommendation.",
            Self::history_section(history),
            question,
            Self::contributions(prior)
        )
    }

    /// One panelist turn in a multi-round discussion
    pub fn conversation_turn(
        question: &str,
        history: &[HistoryEntry],
        transcript: &[Contribution],
        round: usize,
        max_rounds: usize,
    ) -> String {
        let discussion = if transcript.is_empty() {
            "No one has spoken yet.\n".to_string()
        } else {
            Self::contributions(transcript)
        };
        format!(
            "{}Question:\n{}\n\nDiscussion so far:\n{}\n\
             This is round {} of {}. Respond to the other panelists and restate \
             your recommendation.",
            Self::history_section(history),
            question,
            discussion,
            round,
            max_rounds
        )
    }

    /// Moderator summary closing a round
    pub fn moderation(question: &str, transcript: &[Contribution], round: usize) -> String {
        format!(
            "Question:\n{}\n\nDiscussion through round {}:\n{}\n\
             As moderator, summarize where the panel agrees and disagrees, and \
             pose the question the panel should settle next.",
            question,
            round,
            Self::contributions(transcript)
        )
    }

    /// Lead splitting the question among delegates
    pub fn decomposition(
        question: &str,
        history: &[HistoryEntry],
        delegates: &[&AgentDefinition],
    ) -> String {
        let roster: String = delegates
            .iter()
            .map(|d| format!("- {} ({})\n", d.id, d.role))
            .collect();
        format!(
            "{}Question:\n{}\n\nYour team:\n{}\n\
             Break the question into focused tasks for your team. Every member \
             receives your full breakdown.",
            Self::history_section(history),
            question,
            roster
        )
    }

    /// Task handed to a delegate
    pub fn delegated_task(question: &str, instruction: &str) -> String {
        format!(
            "Original question:\n{}\n\nInstructions from the panel lead:\n{}\n\n\
             Complete your part and provide your recommendation.",
            question, instruction
        )
    }

    /// Lead combining the delegate outputs
    pub fn aggregation(question: &str, delegate_outputs: &[Contribution]) -> String {
        format!(
            "Question:\n{}\n\nFindings from your team:\n{}\n\
             Combine the findings into one final recommendation.",
            question,
            Self::contributions(delegate_outputs)
        )
    }

    fn contributions(contributions: &[Contribution]) -> String {
        contributions
            .iter()
            .map(|c| {
                format!(
                    "--- {} ({}, round {}) ---\n{}\n",
                    c.agent_id, c.role, c.round, c.content
                )
            })
            .collect()
    }

    fn history_section(history: &[HistoryEntry]) -> String {
        if history.is_empty() {
            return String::new();
        }
        let lines: String = history
            .iter()
            .map(|h| format!("{}: {}\n", h.role, h.content))
            .collect();
        format!("Conversation so far:\n{}\n", lines)
    }
}
