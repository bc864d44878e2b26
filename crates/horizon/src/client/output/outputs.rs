use avail::engine::EquivalenceClass;

use crate::client::commands::available::AvailabilityReport;

/// Number of member nodes listed in a table row before the rest is elided.
pub const MAX_DISPLAYED_NODES: usize = 4;

#[derive(clap::ValueEnum, Clone)]
pub enum Outputs {
    Cli,
    Json,
    Quiet,
}

pub trait Output {
    fn print_availability(&self, report: &AvailabilityReport);
    fn print_classes(&self, classes: &[EquivalenceClass]);

    fn print_error(&self, error: anyhow::Error);
}
