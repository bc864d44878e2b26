use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use avail::engine::{EquivalenceClass, EquivalenceClassBuilder};

use crate::client::globalsettings::GlobalSettings;
use crate::client::snapshot::load_entities;
use crate::common::config::HorizonConfig;

#[derive(Parser)]
pub struct ClassesOpts {
    /// JSON dump of nodes, jobs or reservations
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Attribute to group by, can be repeated [default: configured list]
    #[arg(long = "attribute", value_name = "NAME")]
    pub attributes: Vec<String>,

    /// Leave out entities that have zero of a listed numeric attribute
    #[arg(long)]
    pub require_non_zero: bool,

    /// Bytes per word for `w` size units
    #[arg(long)]
    pub word_size: Option<u64>,
}

pub fn command_classes(gsettings: &GlobalSettings, opts: ClassesOpts) -> anyhow::Result<()> {
    let classes = compute_classes(gsettings.config(), &opts)?;
    gsettings.printer().print_classes(&classes);
    Ok(())
}

/// Classes ordered from the largest to the smallest; ties keep the order in
/// which the classes were first seen.
pub fn compute_classes(
    config: &HorizonConfig,
    opts: &ClassesOpts,
) -> anyhow::Result<Vec<EquivalenceClass>> {
    let attributes = config.attributes(&opts.attributes);
    if attributes.is_empty() {
        bail!("No attributes to group by, use --attribute or set `attributes` in the configuration");
    }
    let entities = load_entities(&opts.input)
        .with_context(|| format!("Cannot load entities from {}", opts.input.display()))?;

    let ctx = config.decode_context(opts.word_size);
    let require_non_zero = opts.require_non_zero || config.require_non_zero.unwrap_or(false);
    let mut classes = EquivalenceClassBuilder::new(&ctx)
        .require_non_zero(require_non_zero)
        .build(&entities, &attributes);
    classes.sort_by(|a, b| b.members().len().cmp(&a.members().len()));
    Ok(classes)
}
