use crate::internal::snapshot::entity::{Entity, available_attr};
use crate::internal::snapshot::model::Node;
use crate::internal::snapshot::placement::ResourceGrant;
use crate::internal::snapshot::value::{DecodeContext, SizeValue, TypedValue, decode};

/// Returns a copy of `node` with the numeric parts of `demand` subtracted from
/// its `resources_available.*` attributes.
///
/// The result may go negative; clamping happens when classes are built, so
/// that several claims on one node add up.
pub fn allocate(node: &Entity, demand: &ResourceGrant, ctx: &DecodeContext) -> Entity {
    let mut copy = node.clone();
    for (resource, amount) in demand.iter() {
        let Some(requested) = amount.as_amount() else {
            log::trace!("Ignoring non-numeric demand {resource}={amount} on {}", node.id());
            continue;
        };
        let name = available_attr(resource);
        let reduced = match copy.get(&name).map(|raw| decode(raw, ctx)) {
            Some(TypedValue::Int(current)) => TypedValue::Int(current.saturating_sub(requested)),
            Some(TypedValue::Size(current)) => TypedValue::Size(SizeValue::new(
                current.bytes().saturating_sub(requested),
                current.unit(),
            )),
            Some(TypedValue::Str(_)) | None => {
                log::trace!("{} has no numeric {name}, demand ignored", node.id());
                continue;
            }
        };
        copy.set(name, reduced.to_string());
    }
    copy
}

impl Node {
    pub fn allocate(&self, demand: &ResourceGrant, ctx: &DecodeContext) -> Node {
        self.with_entity(allocate(self.entity(), demand, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(resources: &[(&str, &str)]) -> ResourceGrant {
        let ctx = DecodeContext::default();
        resources
            .iter()
            .fold(ResourceGrant::new(), |grant, (name, raw)| {
                grant.with_resource(*name, decode(raw, &ctx))
            })
    }

    fn node() -> Entity {
        Entity::new("n1")
            .with_attribute("state", "free")
            .with_attribute("resources_available.ncpus", "4")
            .with_attribute("resources_available.mem", "4gb")
    }

    #[test]
    fn test_allocate_leaves_original_untouched() {
        let ctx = DecodeContext::default();
        let original = node();
        let reduced = allocate(&original, &grant(&[("ncpus", "1")]), &ctx);
        assert_eq!(original.get("resources_available.ncpus"), Some("4"));
        assert_eq!(reduced.get("resources_available.ncpus"), Some("3"));
        assert_eq!(reduced.id(), "n1");
    }

    #[test]
    fn test_allocate_size() {
        let ctx = DecodeContext::default();
        let reduced = allocate(&node(), &grant(&[("mem", "1gb")]), &ctx);
        assert_eq!(reduced.get("resources_available.mem"), Some("3gb"));

        let reduced = allocate(&node(), &grant(&[("mem", "512mb")]), &ctx);
        assert_eq!(reduced.get("resources_available.mem"), Some("3584mb"));
    }

    #[test]
    fn test_allocate_composes_below_zero() {
        let ctx = DecodeContext::default();
        let demand = grant(&[("ncpus", "3")]);
        let once = allocate(&node(), &demand, &ctx);
        let twice = allocate(&once, &demand, &ctx);
        assert_eq!(twice.get("resources_available.ncpus"), Some("-2"));
        let thrice = allocate(&twice, &demand, &ctx);
        assert_eq!(thrice.get("resources_available.ncpus"), Some("-5"));
    }

    #[test]
    fn test_allocate_ignores_non_numeric_and_unknown() {
        let ctx = DecodeContext::default();
        let original = node();
        let reduced = allocate(
            &original,
            &grant(&[("model", "abc"), ("ngpus", "1"), ("ncpus", "2")]),
            &ctx,
        );
        assert_eq!(reduced.get("resources_available.ngpus"), None);
        assert_eq!(reduced.get("resources_available.ncpus"), Some("2"));
        assert_eq!(reduced.get("resources_available.mem"), Some("4gb"));
    }
}
