use avail::engine::EquivalenceClass;

use crate::client::commands::available::AvailabilityReport;
use crate::client::output::outputs::Output;

/// One line per class, without headers or decorations.
#[derive(Default)]
pub struct Quiet;

impl Output for Quiet {
    fn print_availability(&self, report: &AvailabilityReport) {
        for line in availability_lines(report) {
            println!("{line}");
        }
    }

    fn print_classes(&self, classes: &[EquivalenceClass]) {
        for class in classes {
            println!("{}", class_line(class));
        }
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{error:?}");
    }
}

fn class_line(class: &EquivalenceClass) -> String {
    format!("{} {}", class.members().len(), class)
}

fn availability_lines(report: &AvailabilityReport) -> Vec<String> {
    report
        .buckets
        .iter()
        .flat_map(|(offset, classes)| {
            classes
                .iter()
                .map(move |class| format!("{offset} {}", class_line(class)))
        })
        .collect()
}
