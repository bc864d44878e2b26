use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use avail::engine::{
    AvailabilityProjector, DedicatedWindow, EquivalenceClass, EquivalenceClassBuilder, clamp,
    default_attributes, next_window, summarize,
};
use avail::snapshot::{Entity, Job, Node, Reservation, TimeOffset};

use crate::client::globalsettings::GlobalSettings;
use crate::client::snapshot::load_entities;
use crate::common::config::HorizonConfig;

#[derive(Parser)]
pub struct AvailableOpts {
    /// Node snapshot, e.g. the output of `pbsnodes -a -F json`
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub nodes: PathBuf,

    /// Job snapshot, e.g. the output of `qstat -f -F json`
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub jobs: Option<PathBuf>,

    /// Reservation snapshot, e.g. the output of `pbs_rstat -f -F json`
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub reservations: Option<PathBuf>,

    /// Reference time in epoch seconds [default: current time]
    #[arg(long)]
    pub now: Option<i64>,

    /// Attribute used to group nodes, can be repeated
    /// [default: configured list, or every `resources_available.*` attribute]
    #[arg(long = "attribute", value_name = "NAME")]
    pub attributes: Vec<String>,

    /// PBS `dedicated_time` file, overrides `dedicated_time_file` from the configuration
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub dedicated_time: Option<PathBuf>,

    /// Also list nodes that have nothing left of a listed resource
    #[arg(long)]
    pub show_zero: bool,

    /// Bytes per word for `w` size units
    #[arg(long)]
    pub word_size: Option<u64>,
}

/// Classes of nodes that become available at each offset from `now`.
pub struct AvailabilityReport {
    pub now: i64,
    /// Upcoming dedicated time the forecast was cut at.
    pub dedicated: Option<DedicatedWindow>,
    pub buckets: BTreeMap<TimeOffset, Vec<EquivalenceClass>>,
}

pub fn command_available(gsettings: &GlobalSettings, opts: AvailableOpts) -> anyhow::Result<()> {
    let report = forecast(gsettings.config(), &opts)?;
    gsettings.printer().print_availability(&report);
    Ok(())
}

fn load(path: &Path, kind: &str) -> anyhow::Result<Vec<Entity>> {
    let entities = load_entities(path)
        .with_context(|| format!("Cannot load {kind} from {}", path.display()))?;
    log::debug!("Loaded {} {kind} from {}", entities.len(), path.display());
    Ok(entities)
}

pub fn forecast(config: &HorizonConfig, opts: &AvailableOpts) -> anyhow::Result<AvailabilityReport> {
    let ctx = config.decode_context(opts.word_size);
    let now = opts.now.unwrap_or_else(|| Utc::now().timestamp());

    let nodes: Vec<Node> = load(&opts.nodes, "nodes")?
        .into_iter()
        .map(Node::new)
        .collect();
    let reservations: Vec<Reservation> = match &opts.reservations {
        Some(path) => load(path, "reservations")?
            .iter()
            .map(|entity| Reservation::from_entity(entity, &ctx))
            .collect(),
        None => Vec::new(),
    };
    let jobs: Vec<Job> = match &opts.jobs {
        Some(path) => load(path, "jobs")?
            .iter()
            .map(|entity| Job::from_entity(entity, &ctx))
            .collect(),
        None => Vec::new(),
    };

    let windows = config
        .dedicated_windows(opts.dedicated_time.as_deref())
        .context("Cannot load dedicated time")?;
    let dedicated = next_window(&windows, now);

    let mut attributes = config.attributes(&opts.attributes);
    if attributes.is_empty() {
        attributes = default_attributes(&nodes);
    }
    let require_non_zero = !opts.show_zero && config.require_non_zero.unwrap_or(true);

    let timeline = AvailabilityProjector::new(&ctx).project(&nodes, &reservations, &jobs, now);
    let timeline = clamp(timeline, dedicated.as_ref(), now);
    let builder = EquivalenceClassBuilder::new(&ctx).require_non_zero(require_non_zero);

    Ok(AvailabilityReport {
        now,
        dedicated,
        buckets: summarize(&timeline, &attributes, &builder),
    })
}
