use crate::internal::snapshot::entity::{
    ATTR_ESTIMATED_EXEC_VNODE, ATTR_ESTIMATED_START_TIME, ATTR_JOB_STATE, ATTR_RESERVE_START,
    ATTR_RESV_NODES, ATTR_SHARING, ATTR_STATE, Entity,
};
use crate::internal::snapshot::placement::Placement;
use crate::internal::snapshot::state::{JobState, NodeState, SharingPolicy};
use crate::internal::snapshot::time::parse_timestamp;
use crate::internal::snapshot::value::DecodeContext;

/// A compute node with its state and sharing policy resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    entity: Entity,
    state: NodeState,
    sharing: SharingPolicy,
}

impl Node {
    pub fn new(entity: Entity) -> Self {
        let state = entity
            .get(ATTR_STATE)
            .map(NodeState::parse)
            .unwrap_or(NodeState::Unknown);
        let sharing = entity
            .get(ATTR_SHARING)
            .map(SharingPolicy::parse)
            .unwrap_or_default();
        Node {
            entity,
            state,
            sharing,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        self.entity.id()
    }

    #[inline]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn sharing(&self) -> SharingPolicy {
        self.sharing
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.state.is_free()
    }

    /// Same node with different attribute values; state and sharing are kept.
    pub(crate) fn with_entity(&self, entity: Entity) -> Node {
        Node {
            entity,
            state: self.state,
            sharing: self.sharing,
        }
    }
}

impl AsRef<Entity> for Node {
    fn as_ref(&self) -> &Entity {
        &self.entity
    }
}

/// A future claim on nodes: absolute start time and the granted placement.
#[derive(Debug, Clone, Copy)]
pub struct Claim<'a> {
    pub id: &'a str,
    pub start: i64,
    pub placement: &'a Placement,
}

fn resolve_start(entity: &Entity, attribute: &str) -> Option<i64> {
    let raw = entity.get(attribute)?;
    parse_timestamp(raw)
        .inspect_err(|error| {
            log::debug!(
                "Cannot resolve {attribute} '{raw}' of {}: {error}",
                entity.id()
            )
        })
        .ok()
}

fn resolve_placement(entity: &Entity, attribute: &str, ctx: &DecodeContext) -> Option<Placement> {
    let raw = entity.get(attribute)?;
    Placement::parse(raw, ctx)
        .inspect_err(|error| {
            log::debug!(
                "Cannot resolve {attribute} '{raw}' of {}: {error}",
                entity.id()
            )
        })
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id: String,
    start: Option<i64>,
    placement: Option<Placement>,
}

impl Reservation {
    pub fn new(id: impl Into<String>, start: Option<i64>, placement: Option<Placement>) -> Self {
        Reservation {
            id: id.into(),
            start,
            placement,
        }
    }

    /// Resolves `reserve_start` and `resv_nodes`; whatever cannot be resolved
    /// is left empty.
    pub fn from_entity(entity: &Entity, ctx: &DecodeContext) -> Self {
        Reservation {
            id: entity.id().to_string(),
            start: resolve_start(entity, ATTR_RESERVE_START),
            placement: resolve_placement(entity, ATTR_RESV_NODES, ctx),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn claim(&self) -> Option<Claim<'_>> {
        Some(Claim {
            id: &self.id,
            start: self.start?,
            placement: self.placement.as_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: String,
    state: Option<JobState>,
    estimated_start: Option<i64>,
    estimated_placement: Option<Placement>,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        state: Option<JobState>,
        estimated_start: Option<i64>,
        estimated_placement: Option<Placement>,
    ) -> Self {
        Job {
            id: id.into(),
            state,
            estimated_start,
            estimated_placement,
        }
    }

    pub fn from_entity(entity: &Entity, ctx: &DecodeContext) -> Self {
        Job {
            id: entity.id().to_string(),
            state: entity.get(ATTR_JOB_STATE).and_then(JobState::parse),
            estimated_start: resolve_start(entity, ATTR_ESTIMATED_START_TIME),
            estimated_placement: resolve_placement(entity, ATTR_ESTIMATED_EXEC_VNODE, ctx),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn state(&self) -> Option<JobState> {
        self.state
    }

    /// Only jobs that have not started yet and carry a scheduler estimate
    /// produce a claim.
    pub fn claim(&self) -> Option<Claim<'_>> {
        if self.state.is_some_and(JobState::has_started) {
            return None;
        }
        Some(Claim {
            id: &self.id,
            start: self.estimated_start?,
            placement: self.estimated_placement.as_ref()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_resolves_enums_once() {
        let node = Node::new(
            Entity::new("n1")
                .with_attribute("state", "free")
                .with_attribute("sharing", "force_excl"),
        );
        assert!(node.is_free());
        assert_eq!(node.sharing(), SharingPolicy::ForceExcl);

        let node = Node::new(Entity::new("n2"));
        assert_eq!(node.state(), NodeState::Unknown);
        assert_eq!(node.sharing(), SharingPolicy::DefaultShared);
    }

    #[test]
    fn test_reservation_claim() {
        let ctx = DecodeContext::default();
        let resv = Reservation::from_entity(
            &Entity::new("R1")
                .with_attribute("reserve_start", "1000")
                .with_attribute("resv_nodes", "(n1:ncpus=1)"),
            &ctx,
        );
        let claim = resv.claim().unwrap();
        assert_eq!(claim.id, "R1");
        assert_eq!(claim.start, 1000);
        assert_eq!(claim.placement.len(), 1);
    }

    #[test]
    fn test_reservation_without_placement_has_no_claim() {
        let ctx = DecodeContext::default();
        let resv = Reservation::from_entity(
            &Entity::new("R1").with_attribute("reserve_start", "1000"),
            &ctx,
        );
        assert!(resv.claim().is_none());

        let resv = Reservation::from_entity(
            &Entity::new("R2")
                .with_attribute("reserve_start", "soon")
                .with_attribute("resv_nodes", "(n1:ncpus=1)"),
            &ctx,
        );
        assert!(resv.claim().is_none());
    }

    #[test]
    fn test_job_claim_requires_pending_state() {
        let ctx = DecodeContext::default();
        let entity = Entity::new("1.server")
            .with_attribute("job_state", "Q")
            .with_attribute("estimated.start_time", "2000")
            .with_attribute("estimated.exec_vnode", "(n1:ncpus=2)");
        assert!(Job::from_entity(&entity, &ctx).claim().is_some());

        let running = entity.clone().with_attribute("job_state", "R");
        assert!(Job::from_entity(&running, &ctx).claim().is_none());

        let mut no_estimate = entity;
        no_estimate.remove("estimated.start_time");
        assert!(Job::from_entity(&no_estimate, &ctx).claim().is_none());
    }
}
