//! Progress reporting for consultations

use colored::Colorize;
use consult_application::ProgressNotifier;
use consult_domain::{AgentId, Framework, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one indicatif bar per stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn agent_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let pb = if total_tasks > 0 {
            let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
            pb.set_style(Self::agent_style());
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::step_style());
            pb
        };
        pb.set_prefix(stage.display_name().to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.stage_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_agent_complete(&self, _stage: &Stage, agent: &AgentId, success: bool) {
        if let Ok(slot) = self.stage_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &Stage) {
        if let Ok(mut slot) = self.stage_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} complete", stage.as_str().green()));
        }
    }

    fn on_framework_selected(&self, framework: Framework) {
        if let Ok(slot) = self.stage_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(format!("using {}", framework.as_str().bold()));
        }
    }

    fn on_round_start(&self, round: usize, max_rounds: usize) {
        if let Ok(slot) = self.stage_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(format!("round {}/{}", round, max_rounds));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        if total_tasks > 0 {
            println!(
                "{} {} ({} agents)",
                "->".cyan(),
                stage.display_name().bold(),
                total_tasks
            );
        } else {
            println!("{} {}", "->".cyan(), stage.display_name().bold());
        }
    }

    fn on_agent_complete(&self, _stage: &Stage, agent: &AgentId, success: bool) {
        if success {
            println!("  {} {}", "v".green(), agent);
        } else {
            println!("  {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {}

    fn on_framework_selected(&self, framework: Framework) {
        println!("  framework: {}", framework);
    }

    fn on_round_start(&self, round: usize, max_rounds: usize) {
        println!("  round {}/{}", round, max_rounds);
    }
}
