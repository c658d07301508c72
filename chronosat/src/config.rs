//! Solver configuration.
use serde::Deserialize;

/// Configurable parameters used during solving.
pub struct SolverConfig {
    /// Verify a satisfying assignment against the stored formula before reporting it.
    pub check_model: bool,

    /// Number of conflicts between progress log lines, 0 disables progress logging.
    pub progress_log_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            check_model: false,
            progress_log_interval: 10000,
        }
    }
}

impl SolverConfig {
    /// Overwrite the settings present in the given update.
    pub fn apply(&mut self, update: &SolverConfigUpdate) {
        if let Some(check_model) = update.check_model {
            self.check_model = check_model;
        }
        if let Some(progress_log_interval) = update.progress_log_interval {
            self.progress_log_interval = progress_log_interval;
        }
    }

    /// A listing of all settings with their default values, for command line help output.
    pub fn help() -> String {
        let defaults = SolverConfig::default();
        format!(
            "solver configuration options:\n\
             \n\
             check_model = {} (bool)\n\
             \x20   verify a satisfying assignment against the stored formula\n\
             progress_log_interval = {} (int)\n\
             \x20   conflicts between progress log lines, 0 disables\n",
            defaults.check_model, defaults.progress_log_interval,
        )
    }
}

/// A partial update of a [`SolverConfig`], e.g. parsed from a TOML config file.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub check_model: Option<bool>,
    pub progress_log_interval: Option<u64>,
}

impl SolverConfigUpdate {
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Combine two updates, with settings of `other` taking precedence.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        if other.check_model.is_some() {
            self.check_model = other.check_model;
        }
        if other.progress_log_interval.is_some() {
            self.progress_log_interval = other.progress_log_interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_and_apply() {
        let mut config = SolverConfig::default();

        let mut update: SolverConfigUpdate = toml::from_str("check_model = true").unwrap();
        update.merge(toml::from_str("progress_log_interval = 42").unwrap());

        config.apply(&update);

        assert!(config.check_model);
        assert_eq!(config.progress_log_interval, 42);
    }

    #[test]
    fn unknown_options_are_rejected() {
        assert!(toml::from_str::<SolverConfigUpdate>("no_such_option = 1").is_err());
    }
}
