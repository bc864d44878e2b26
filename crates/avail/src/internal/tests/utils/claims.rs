use crate::internal::snapshot::model::{Job, Reservation};
use crate::internal::snapshot::placement::Placement;
use crate::internal::snapshot::state::JobState;
use crate::internal::snapshot::value::DecodeContext;

fn placement(text: &str) -> Placement {
    Placement::parse(text, &DecodeContext::default()).unwrap()
}

pub fn reservation(id: &str, start: i64, nodes: &str) -> Reservation {
    Reservation::new(id, Some(start), Some(placement(nodes)))
}

pub fn queued_job(id: &str, start: i64, exec_vnode: &str) -> Job {
    job(id, "Q", start, exec_vnode)
}

pub fn job(id: &str, state: &str, start: i64, exec_vnode: &str) -> Job {
    Job::new(
        id,
        JobState::parse(state),
        Some(start),
        Some(placement(exec_vnode)),
    )
}
