pub(crate) mod internal;

pub use crate::internal::common::{Map, Set};

pub type Error = internal::common::error::AvailError;
pub type Result<T> = std::result::Result<T, Error>;

pub mod snapshot {
    pub use crate::internal::snapshot::entity::{
        ATTR_ESTIMATED_EXEC_VNODE, ATTR_ESTIMATED_START_TIME, ATTR_JOB_STATE, ATTR_RESERVE_START,
        ATTR_RESV_NODES, ATTR_SHARING, ATTR_STATE, Entity, RESOURCES_ASSIGNED,
        RESOURCES_AVAILABLE, assigned_attr, available_attr, short_name, split_scope,
    };
    pub use crate::internal::snapshot::model::{Claim, Job, Node, Reservation};
    pub use crate::internal::snapshot::placement::{Placement, ResourceGrant};
    pub use crate::internal::snapshot::state::{JobState, NodeState, SharingPolicy};
    pub use crate::internal::snapshot::time::{
        TimeOffset, local_to_epoch, parse_pbs_datetime, parse_timestamp,
    };
    pub use crate::internal::snapshot::value::{
        DecodeContext, SizeUnit, SizeValue, TypedValue, decode, is_size_resource,
    };
}

pub mod engine {
    pub use crate::internal::engine::allocator::allocate;
    pub use crate::internal::engine::dedicated::{
        DedicatedWindow, clamp, next_window, parse_dedicated_datetime, parse_dedicated_time,
    };
    pub use crate::internal::engine::equivalence::{
        EquivalenceClass, EquivalenceClassBuilder, EquivalenceKey,
    };
    pub use crate::internal::engine::projector::{
        AvailabilityProjector, Timeline, default_attributes, summarize,
    };
}
