use serde::{Serialize, Serializer};

use avail::engine::{DedicatedWindow, EquivalenceClass, EquivalenceKey};
use avail::snapshot::TimeOffset;

use crate::client::commands::available::AvailabilityReport;
use crate::client::output::outputs::Output;

#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    fn print(&self, data: impl Serialize) {
        match serde_json::to_string_pretty(&data) {
            Ok(text) => println!("{text}"),
            Err(error) => log::error!("Cannot serialize output: {error}"),
        }
    }
}

impl Output for JsonOutput {
    fn print_availability(&self, report: &AvailabilityReport) {
        self.print(JsonAvailability::from(report));
    }

    fn print_classes(&self, classes: &[EquivalenceClass]) {
        self.print(classes.iter().map(JsonClass::from).collect::<Vec<_>>());
    }

    fn print_error(&self, error: anyhow::Error) {
        self.print(serde_json::json!({ "error": format!("{error:?}") }));
    }
}

/// Resource values keyed by short name, in signature order.
struct JsonResources<'a>(&'a EquivalenceKey);

impl Serialize for JsonResources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

#[derive(Serialize)]
struct JsonClass<'a> {
    signature: String,
    count: usize,
    resources: JsonResources<'a>,
    nodes: &'a [String],
}

impl<'a> From<&'a EquivalenceClass> for JsonClass<'a> {
    fn from(class: &'a EquivalenceClass) -> Self {
        JsonClass {
            signature: class.to_string(),
            count: class.members().len(),
            resources: JsonResources(class.key()),
            nodes: class.members(),
        }
    }
}

#[derive(Serialize)]
struct JsonBucket<'a> {
    offset: TimeOffset,
    classes: Vec<JsonClass<'a>>,
}

#[derive(Serialize)]
struct JsonAvailability<'a> {
    now: i64,
    dedicated_time: Option<DedicatedWindow>,
    availability: Vec<JsonBucket<'a>>,
}

impl<'a> From<&'a AvailabilityReport> for JsonAvailability<'a> {
    fn from(report: &'a AvailabilityReport) -> Self {
        JsonAvailability {
            now: report.now,
            dedicated_time: report.dedicated,
            availability: report
                .buckets
                .iter()
                .map(|(offset, classes)| JsonBucket {
                    offset: *offset,
                    classes: classes.iter().map(JsonClass::from).collect(),
                })
                .collect(),
        }
    }
}
