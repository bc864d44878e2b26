use std::collections::BTreeMap;

use crate::internal::common::{Map, Set};
use crate::internal::engine::equivalence::{EquivalenceClass, EquivalenceClassBuilder};
use crate::internal::snapshot::entity::{ATTR_STATE, RESOURCES_AVAILABLE, split_scope};
use crate::internal::snapshot::model::{Claim, Job, Node, Reservation};
use crate::internal::snapshot::time::TimeOffset;
use crate::internal::snapshot::value::DecodeContext;

/// Nodes that become (or stay) available at each time offset.
///
/// A node may show up in several buckets: a shared node claimed in the future
/// is listed at the claim's offset and, while it stays free, at `Infinity`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    buckets: BTreeMap<TimeOffset, Vec<Node>>,
}

impl Timeline {
    pub fn push(&mut self, offset: TimeOffset, node: Node) {
        self.buckets.entry(offset).or_default().push(node);
    }

    /// Moves `nodes` to the end of the bucket at `offset`, creating it if needed.
    pub fn extend(&mut self, offset: TimeOffset, nodes: Vec<Node>) {
        self.buckets.entry(offset).or_default().extend(nodes);
    }

    pub fn get(&self, offset: TimeOffset) -> Option<&[Node]> {
        self.buckets.get(&offset).map(|nodes| nodes.as_slice())
    }

    /// Buckets in ascending offset order, `Infinity` last.
    pub fn iter(&self) -> impl Iterator<Item = (TimeOffset, &[Node])> {
        self.buckets
            .iter()
            .map(|(offset, nodes)| (*offset, nodes.as_slice()))
    }

    pub fn offsets(&self) -> impl Iterator<Item = TimeOffset> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub(crate) fn into_buckets(self) -> BTreeMap<TimeOffset, Vec<Node>> {
        self.buckets
    }

    fn ensure(&mut self, offset: TimeOffset) {
        self.buckets.entry(offset).or_default();
    }
}

/// Private copy of the input nodes that claims reduce or remove.
struct WorkingSet {
    nodes: Vec<Option<Node>>,
    index: Map<String, usize>,
}

impl WorkingSet {
    fn new(nodes: &[Node]) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id().to_string(), position))
            .collect();
        WorkingSet {
            nodes: nodes.iter().cloned().map(Some).collect(),
            index,
        }
    }

    fn get(&self, id: &str) -> Option<&Node> {
        self.index
            .get(id)
            .and_then(|&position| self.nodes[position].as_ref())
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let position = *self.index.get(id)?;
        self.nodes[position].as_mut()
    }

    fn remove(&mut self, id: &str) -> Option<Node> {
        let position = self.index.remove(id)?;
        self.nodes[position].take()
    }

    fn into_remaining(self) -> impl Iterator<Item = Node> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClaimKind {
    Reservation,
    Job,
}

/// Projects future node availability from reservations and scheduler
/// estimates of queued jobs.
pub struct AvailabilityProjector<'a> {
    ctx: &'a DecodeContext,
}

impl<'a> AvailabilityProjector<'a> {
    pub fn new(ctx: &'a DecodeContext) -> Self {
        AvailabilityProjector { ctx }
    }

    /// Claims are applied in the given order: reservations first, then jobs.
    /// The input nodes are never modified.
    pub fn project(
        &self,
        nodes: &[Node],
        reservations: &[Reservation],
        jobs: &[Job],
        now: i64,
    ) -> Timeline {
        let mut working = WorkingSet::new(nodes);
        let mut timeline = Timeline::default();

        for reservation in reservations {
            match reservation.claim() {
                Some(claim) => {
                    self.apply_claim(claim, ClaimKind::Reservation, now, &mut working, &mut timeline)
                }
                None => log::debug!(
                    "Reservation {} has no resolved start or placement, skipping",
                    reservation.id()
                ),
            }
        }
        for job in jobs {
            match job.claim() {
                Some(claim) => self.apply_claim(claim, ClaimKind::Job, now, &mut working, &mut timeline),
                None => log::trace!("Job {} has no pending estimate, skipping", job.id()),
            }
        }

        timeline.ensure(TimeOffset::Infinity);
        for node in working.into_remaining().filter(|node| node.is_free()) {
            timeline.push(TimeOffset::Infinity, node);
        }
        timeline
    }

    fn apply_claim(
        &self,
        claim: Claim<'_>,
        kind: ClaimKind,
        now: i64,
        working: &mut WorkingSet,
        timeline: &mut Timeline,
    ) {
        let Some(offset) = TimeOffset::between(now, claim.start) else {
            log::debug!("Claim {} has already started, skipping", claim.id);
            return;
        };
        for (node_id, grant) in claim.placement.iter() {
            let Some(node) = working.get(node_id) else {
                log::debug!("Claim {} references unknown node {node_id}", claim.id);
                continue;
            };
            if kind == ClaimKind::Job && !node.is_free() {
                log::debug!("Job {} is estimated on non-free node {node_id}", claim.id);
                continue;
            }
            if node.sharing().is_exclusive() {
                if let Some(node) = working.remove(node_id) {
                    timeline.push(offset, node);
                }
            } else if let Some(node) = working.get_mut(node_id) {
                *node = node.allocate(grant, self.ctx);
                timeline.push(offset, node.clone());
            }
        }
    }
}

/// Every `resources_available.*` attribute name found on `nodes`, in order of
/// first appearance.
pub fn default_attributes(nodes: &[Node]) -> Vec<String> {
    let mut seen = Set::default();
    let mut attributes = Vec::new();
    for node in nodes {
        for (name, _) in node.entity().attributes() {
            let is_available =
                matches!(split_scope(name), Some((scope, _)) if scope == RESOURCES_AVAILABLE);
            if is_available && seen.insert(name.to_string()) {
                attributes.push(name.to_string());
            }
        }
    }
    attributes
}

/// Builds equivalence classes for every bucket of `timeline`.
/// `state` is dropped from the attribute list.
pub fn summarize<S: AsRef<str>>(
    timeline: &Timeline,
    attributes: &[S],
    builder: &EquivalenceClassBuilder<'_>,
) -> BTreeMap<TimeOffset, Vec<EquivalenceClass>> {
    let attributes: Vec<&str> = attributes
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| *name != ATTR_STATE)
        .collect();
    timeline
        .iter()
        .map(|(offset, nodes)| (offset, builder.build(nodes, &attributes)))
        .collect()
}
