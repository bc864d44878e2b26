pub mod claims;
pub mod node;

pub fn ids(nodes: &[crate::internal::snapshot::model::Node]) -> Vec<&str> {
    nodes.iter().map(|node| node.id()).collect()
}
