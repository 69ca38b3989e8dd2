//! Report Rendering — plain-text experiment summaries
//!
//! Formats an [`ExperimentStats`] into the human-readable block a run
//! prints at the end. The library only builds strings; writing them to a
//! terminal or a file is the caller's decision.

use std::fmt;

use crate::experiment::ExperimentStats;

impl fmt::Display for ExperimentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Statistics of {} trials in {:.2}s:",
            self.trials,
            self.elapsed.as_secs_f64()
        )?;
        writeln!(f, "  Subjects per trial: {}", self.subject_count)?;
        writeln!(f, "  Infection rate: {}%", self.infection_rate_percent)?;
        writeln!(f, "  Test kits used per trial: {}", self.test_kits_used)?;

        let schemes: Vec<String> = self.schemes.iter().map(|s| s.to_string()).collect();
        writeln!(f, "  Identifier schemes: {}", schemes.join(", "))?;

        writeln!(f, "  Average infected subjects: {:.3}", self.avg_infected)?;
        writeln!(
            f,
            "  Average potential positives: {:.3}",
            self.avg_potential_positives
        )?;
        writeln!(f, "  Average match groups by size:")?;
        for (size, avg) in &self.avg_match_groups_by_size {
            writeln!(f, "    size {size}: {avg:.3}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::experiment::{ExperimentConfig, ExperimentHarness};
    use poolscreen_core::Scheme;

    #[test]
    fn test_summary_mentions_every_figure() {
        let mut config = ExperimentConfig::default();
        config.trials = 10;
        config.trial.subject_count = 16;
        config.trial.schemes = vec![Scheme::Ascending, Scheme::Random];
        config.trial.seed = Some(5);

        let stats = ExperimentHarness::new(config).unwrap().run().unwrap();
        let summary = stats.to_string();

        assert!(summary.contains("10 trials"));
        assert!(summary.contains("Subjects per trial: 16"));
        assert!(summary.contains("Infection rate: 2%"));
        assert!(summary.contains("Test kits used per trial: 10"));
        assert!(summary.contains("ascending, random"));
        assert!(summary.contains("size 1:"));
        assert!(summary.contains("size 2:"));
    }
}
