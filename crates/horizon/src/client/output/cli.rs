use cli_table::format::{Justify, Separator};
use cli_table::{Cell, CellStruct, Color, ColorChoice, Style, Table, TableStruct, print_stdout};
use colored::Colorize;

use avail::engine::EquivalenceClass;
use avail::snapshot::TimeOffset;

use crate::client::commands::available::AvailabilityReport;
use crate::client::output::outputs::{MAX_DISPLAYED_NODES, Output};
use crate::common::format::{format_limited_list, human_offset, human_timestamp};

pub struct CliOutput {
    color_policy: ColorChoice,
}

impl CliOutput {
    pub fn new(color_policy: ColorChoice) -> CliOutput {
        CliOutput { color_policy }
    }

    fn print_horizontal_table(&self, rows: Vec<Vec<CellStruct>>, header: Vec<CellStruct>) {
        let table = rows
            .table()
            .separator(
                Separator::builder()
                    .title(Some(Default::default()))
                    .column(Some(Default::default()))
                    .build(),
            )
            .title(header);
        self.print_table(table);
    }

    fn print_table(&self, table: TableStruct) {
        let table = table.color_choice(self.color_policy);
        if let Err(e) = print_stdout(table) {
            log::error!("Cannot print table to stdout: {e:?}");
        }
    }
}

fn offset_cell(offset: TimeOffset) -> CellStruct {
    let color = match offset {
        TimeOffset::Seconds(0) | TimeOffset::Infinity => Color::Green,
        TimeOffset::Seconds(_) => Color::Yellow,
    };
    human_offset(offset)
        .cell()
        .foreground_color(Some(color))
        .justify(Justify::Right)
}

fn class_cells(class: &EquivalenceClass) -> [CellStruct; 3] {
    [
        class.members().len().cell().justify(Justify::Right),
        class.to_string().cell(),
        format_limited_list(class.members(), MAX_DISPLAYED_NODES).cell(),
    ]
}

impl Output for CliOutput {
    fn print_availability(&self, report: &AvailabilityReport) {
        if let Some(window) = &report.dedicated {
            println!(
                "{} {} - {}",
                "Dedicated time:".bold(),
                human_timestamp(window.start),
                human_timestamp(window.end)
            );
        }

        let rows: Vec<Vec<CellStruct>> = report
            .buckets
            .iter()
            .flat_map(|(offset, classes)| {
                classes.iter().map(move |class| {
                    let mut row = vec![offset_cell(*offset)];
                    row.extend(class_cells(class));
                    row
                })
            })
            .collect();
        if rows.is_empty() {
            log::info!("No nodes are going to become available");
            return;
        }

        let header = vec![
            "Available in".cell().bold(true),
            "Nodes".cell().bold(true),
            "Resources".cell().bold(true),
            "Members".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_classes(&self, classes: &[EquivalenceClass]) {
        let rows: Vec<Vec<CellStruct>> = classes
            .iter()
            .map(|class| class_cells(class).into())
            .collect();
        let header = vec![
            "Count".cell().bold(true),
            "Signature".cell().bold(true),
            "Members".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{}", format!("{error:?}").red());
    }
}
