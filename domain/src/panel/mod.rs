//! Consultation panel: which agents take part and how they are run.

pub mod config;
pub mod mode;

pub use config::{PanelConfiguration, PanelConfigurationBuilder};
pub use mode::ExecutionMode;
