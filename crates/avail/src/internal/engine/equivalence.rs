use std::fmt::{Display, Formatter};

use serde::Serialize;
use smallvec::SmallVec;

use crate::internal::common::Map;
use crate::internal::snapshot::entity::{Entity, RESOURCES_AVAILABLE, assigned_attr, short_name};
use crate::internal::snapshot::value::{
    DecodeContext, SizeUnit, SizeValue, TypedValue, decode, is_size_resource,
};

/// Ordered signature of an entity: `(short name, value)` pairs in the order
/// of the requested attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EquivalenceKey(SmallVec<[(String, TypedValue); 4]>);

impl EquivalenceKey {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for EquivalenceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, (name, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(":")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Entities sharing one signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    key: EquivalenceKey,
    members: Vec<String>,
}

impl EquivalenceClass {
    #[inline]
    pub fn key(&self) -> &EquivalenceKey {
        &self.key
    }

    /// Shared value of an attribute, looked up by its short name.
    /// When a short name occurs more than once in the key, the last one wins.
    pub fn attribute(&self, name: &str) -> Option<&TypedValue> {
        self.key
            .iter()
            .filter(|(short, _)| *short == name)
            .map(|(_, value)| value)
            .last()
    }

    #[inline]
    pub fn members(&self) -> &[String] {
        &self.members
    }
}

impl Display for EquivalenceClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.key, f)
    }
}

/// Partitions entities into equivalence classes.
pub struct EquivalenceClassBuilder<'a> {
    ctx: &'a DecodeContext,
    require_non_zero: bool,
}

impl<'a> EquivalenceClassBuilder<'a> {
    pub fn new(ctx: &'a DecodeContext) -> Self {
        EquivalenceClassBuilder {
            ctx,
            require_non_zero: false,
        }
    }

    /// Leave out every entity that has a listed numeric attribute equal to zero.
    pub fn require_non_zero(mut self, value: bool) -> Self {
        self.require_non_zero = value;
        self
    }

    /// Classes are returned in the order in which their first member appears
    /// in `entities`.
    pub fn build<E: AsRef<Entity>, S: AsRef<str>>(
        &self,
        entities: &[E],
        attributes: &[S],
    ) -> Vec<EquivalenceClass> {
        let mut classes: Vec<EquivalenceClass> = Vec::new();
        if attributes.is_empty() {
            return classes;
        }
        let mut index: Map<EquivalenceKey, usize> = Map::default();

        for entity in entities {
            let entity = entity.as_ref();
            let Some(key) = self.entity_key(entity, attributes) else {
                continue;
            };
            match index.get(&key) {
                Some(&position) => classes[position].members.push(entity.id().to_string()),
                None => {
                    index.insert(key.clone(), classes.len());
                    classes.push(EquivalenceClass {
                        key,
                        members: vec![entity.id().to_string()],
                    });
                }
            }
        }
        classes
    }

    fn entity_key<S: AsRef<str>>(&self, entity: &Entity, attributes: &[S]) -> Option<EquivalenceKey> {
        let mut key = EquivalenceKey::default();
        for name in attributes {
            let name = name.as_ref();
            let Some(value) = self.attribute_value(entity, name) else {
                continue;
            };
            if self.require_non_zero && value.is_zero() {
                log::trace!("{} excluded, {name} is zero", entity.id());
                return None;
            }
            key.0.push((short_name(name).to_string(), value));
        }
        Some(key)
    }

    /// Decoded value of an attribute; `resources_available.<r>` is reduced by
    /// the matching `resources_assigned.<r>` when the entity has one and never
    /// reads below zero.
    fn attribute_value(&self, entity: &Entity, name: &str) -> Option<TypedValue> {
        let available = decode(entity.get(name)?, self.ctx);
        let resource = name
            .strip_prefix(RESOURCES_AVAILABLE)
            .and_then(|rest| rest.strip_prefix('.'));
        let Some(resource) = resource else {
            return Some(available);
        };
        match entity.get(&assigned_attr(resource)) {
            Some(assigned) => Some(net_available(
                resource,
                available,
                decode(assigned, self.ctx),
            )),
            None => Some(available.non_negative()),
        }
    }
}

/// `available - assigned`, clamped to zero.
pub(crate) fn net_available(
    resource: &str,
    available: TypedValue,
    assigned: TypedValue,
) -> TypedValue {
    let (Some(total), Some(used)) = (available.as_amount(), assigned.as_amount()) else {
        return available;
    };
    let net = total.saturating_sub(used).max(0);

    let unit = match (&available, &assigned) {
        (TypedValue::Size(size), _) | (_, TypedValue::Size(size)) => Some(size.unit()),
        _ if is_size_resource(resource) => Some(SizeUnit::B),
        _ => None,
    };
    match unit {
        Some(unit) => TypedValue::Size(SizeValue::new(net, unit)),
        None => TypedValue::Int(net),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, ncpus: &str, assigned: &str, mem: &str) -> Entity {
        Entity::new(id)
            .with_attribute("resources_available.ncpus", ncpus)
            .with_attribute("resources_assigned.ncpus", assigned)
            .with_attribute("resources_available.mem", mem)
    }

    fn keys(classes: &[EquivalenceClass]) -> Vec<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_build_groups_by_signature() {
        let ctx = DecodeContext::default();
        let entities = vec![
            node("n1", "4", "0", "4gb"),
            node("n2", "8", "0", "4gb"),
            node("n3", "4", "0", "4096mb"),
        ];
        let classes = EquivalenceClassBuilder::new(&ctx).build(
            &entities,
            &["resources_available.ncpus", "resources_available.mem"],
        );
        assert_eq!(keys(&classes), vec!["ncpus=4:mem=4gb", "ncpus=8:mem=4gb"]);
        assert_eq!(classes[0].members(), &["n1", "n3"]);
        assert_eq!(classes[1].members(), &["n2"]);
    }

    #[test]
    fn test_build_subtracts_assigned() {
        let ctx = DecodeContext::default();
        let entities = vec![node("n1", "4", "1", "1gb"), node("n2", "3", "0", "1gb")];
        let classes = EquivalenceClassBuilder::new(&ctx)
            .build(&entities, &["resources_available.ncpus"]);
        assert_eq!(keys(&classes), vec!["ncpus=3"]);
        assert_eq!(classes[0].members(), &["n1", "n2"]);
    }

    #[test]
    fn test_build_clamps_over_commitment() {
        let ctx = DecodeContext::default();
        let entities = vec![node("n1", "2", "5", "1gb")];
        let classes = EquivalenceClassBuilder::new(&ctx)
            .build(&entities, &["resources_available.ncpus"]);
        assert_eq!(classes[0].attribute("ncpus"), Some(&TypedValue::Int(0)));
    }

    #[test]
    fn test_build_clamps_negative_without_assigned() {
        let ctx = DecodeContext::default();
        let entities = vec![
            Entity::new("n1")
                .with_attribute("resources_available.ncpus", "-1")
                .with_attribute("resources_available.mem", "-2gb"),
            Entity::new("n2")
                .with_attribute("resources_available.ncpus", "0")
                .with_attribute("resources_available.mem", "0gb"),
        ];
        let attributes = ["resources_available.ncpus", "resources_available.mem"];
        let classes = EquivalenceClassBuilder::new(&ctx).build(&entities, &attributes);
        assert_eq!(keys(&classes), vec!["ncpus=0:mem=0gb"]);
        assert_eq!(classes[0].members(), &["n1", "n2"]);

        let classes = EquivalenceClassBuilder::new(&ctx)
            .require_non_zero(true)
            .build(&entities, &attributes);
        assert!(classes.is_empty());
    }

    #[test]
    fn test_build_net_memory_is_size() {
        let ctx = DecodeContext::default();
        let entities = vec![
            Entity::new("n1")
                .with_attribute("resources_available.mem", "4gb")
                .with_attribute("resources_assigned.mem", "1048576kb"),
        ];
        let classes =
            EquivalenceClassBuilder::new(&ctx).build(&entities, &["resources_available.mem"]);
        assert_eq!(keys(&classes), vec!["mem=3gb"]);
    }

    #[test]
    fn test_build_skips_missing_attributes() {
        let ctx = DecodeContext::default();
        let entities = vec![
            Entity::new("n1").with_attribute("resources_available.ncpus", "2"),
            Entity::new("n2")
                .with_attribute("resources_available.ncpus", "2")
                .with_attribute("resources_available.ngpus", "1"),
        ];
        let classes = EquivalenceClassBuilder::new(&ctx).build(
            &entities,
            &["resources_available.ncpus", "resources_available.ngpus"],
        );
        assert_eq!(keys(&classes), vec!["ncpus=2", "ncpus=2:ngpus=1"]);
    }

    #[test]
    fn test_build_key_order_follows_attribute_list() {
        let ctx = DecodeContext::default();
        let entities = vec![node("n1", "4", "0", "1gb")];
        let builder = EquivalenceClassBuilder::new(&ctx);
        let forward = builder.build(
            &entities,
            &["resources_available.ncpus", "resources_available.mem"],
        );
        let backward = builder.build(
            &entities,
            &["resources_available.mem", "resources_available.ncpus"],
        );
        assert_eq!(keys(&forward), vec!["ncpus=4:mem=1gb"]);
        assert_eq!(keys(&backward), vec!["mem=1gb:ncpus=4"]);
        assert_ne!(forward[0].key(), backward[0].key());
    }

    // Any listed numeric attribute equal to zero excludes the entity, not only memory.
    #[test]
    fn test_require_non_zero_excludes_whole_entity() {
        let ctx = DecodeContext::default();
        let entities = vec![
            node("n1", "4", "4", "1gb"),
            node("n2", "4", "0", "0kb"),
            node("n3", "4", "1", "1gb"),
        ];
        let attributes = ["resources_available.ncpus", "resources_available.mem"];

        let classes = EquivalenceClassBuilder::new(&ctx)
            .require_non_zero(true)
            .build(&entities, &attributes);
        assert_eq!(keys(&classes), vec!["ncpus=3:mem=1gb"]);
        assert_eq!(classes[0].members(), &["n3"]);

        let classes = EquivalenceClassBuilder::new(&ctx).build(&entities, &attributes);
        assert_eq!(classes.len(), 3);
    }

    #[test]
    fn test_require_non_zero_ignores_strings() {
        let ctx = DecodeContext::default();
        let entities = vec![Entity::new("n1").with_attribute("sharing", "default_shared")];
        let classes = EquivalenceClassBuilder::new(&ctx)
            .require_non_zero(true)
            .build(&entities, &["sharing"]);
        assert_eq!(keys(&classes), vec!["sharing=default_shared"]);
    }

    #[test]
    fn test_build_empty_inputs() {
        let ctx = DecodeContext::default();
        let builder = EquivalenceClassBuilder::new(&ctx);
        let no_entities: Vec<Entity> = vec![];
        let no_attributes: [&str; 0] = [];
        assert!(builder.build(&no_entities, &["state"]).is_empty());
        assert!(
            builder
                .build(&[node("n1", "1", "0", "1gb")], &no_attributes)
                .is_empty()
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let ctx = DecodeContext::default();
        let entities: Vec<Entity> = (0..20)
            .map(|i| node(&format!("n{i}"), &(i % 3).to_string(), "0", "2gb"))
            .collect();
        let attributes = ["resources_available.ncpus", "resources_available.mem"];
        let builder = EquivalenceClassBuilder::new(&ctx).require_non_zero(true);
        let first = builder.build(&entities, &attributes);
        let second = builder.build(&entities, &attributes);
        assert_eq!(first, second);

        let total: usize = first.iter().map(|c| c.members().len()).sum();
        // ncpus=0 entities (i % 3 == 0) are excluded, every other entity is in exactly one class
        assert_eq!(total, 13);
    }

    #[test]
    fn test_net_available_mixed_types() {
        let size = |raw: &str| decode(raw, &DecodeContext::default());
        assert_eq!(
            net_available("mem", size("0"), size("0kb")).to_string(),
            "0kb"
        );
        assert_eq!(
            net_available("mem", size("2048"), size("1024")).to_string(),
            "1024b"
        );
        assert_eq!(
            net_available("ncpus", size("abc"), size("1")),
            TypedValue::Str("abc".to_string())
        );
    }
}
