use derive_builder::Builder;

use crate::internal::snapshot::entity::Entity;
use crate::internal::snapshot::model::Node;

#[derive(Builder)]
#[builder(pattern = "owned", build_fn(name = "finish"))]
pub struct TestNode {
    #[builder(setter(into))]
    id: String,
    #[builder(default = "\"free\".to_string()", setter(into))]
    state: String,
    #[builder(default, setter(into, strip_option))]
    sharing: Option<String>,
    #[builder(default = "4")]
    ncpus: i64,
    #[builder(default, setter(into, strip_option))]
    mem: Option<String>,
    #[builder(default, setter(into, strip_option))]
    ncpus_assigned: Option<i64>,
}

impl TestNodeBuilder {
    pub fn build(self) -> Node {
        let TestNode {
            id,
            state,
            sharing,
            ncpus,
            mem,
            ncpus_assigned,
        } = self.finish().unwrap();

        let mut entity = Entity::new(id)
            .with_attribute("state", state)
            .with_attribute("resources_available.ncpus", ncpus.to_string());
        if let Some(sharing) = sharing {
            entity.set("sharing", sharing);
        }
        if let Some(mem) = mem {
            entity.set("resources_available.mem", mem);
        }
        if let Some(assigned) = ncpus_assigned {
            entity.set("resources_assigned.ncpus", assigned.to_string());
        }
        Node::new(entity)
    }
}

pub fn node(id: &str) -> TestNodeBuilder {
    TestNodeBuilder::default().id(id)
}
