use serde::{Deserialize, Serialize};

pub const ATTR_STATE: &str = "state";
pub const ATTR_SHARING: &str = "sharing";
pub const ATTR_JOB_STATE: &str = "job_state";
pub const ATTR_RESERVE_START: &str = "reserve_start";
pub const ATTR_RESV_NODES: &str = "resv_nodes";
pub const ATTR_ESTIMATED_EXEC_VNODE: &str = "estimated.exec_vnode";
pub const ATTR_ESTIMATED_START_TIME: &str = "estimated.start_time";

pub const RESOURCES_AVAILABLE: &str = "resources_available";
pub const RESOURCES_ASSIGNED: &str = "resources_assigned";

/// Splits a scoped attribute name (`resources_available.ncpus`) into its
/// scope and short name.
pub fn split_scope(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

/// Attribute name with its scope prefix stripped.
pub fn short_name(name: &str) -> &str {
    split_scope(name).map(|(_, short)| short).unwrap_or(name)
}

pub fn available_attr(resource: &str) -> String {
    format!("{RESOURCES_AVAILABLE}.{resource}")
}

pub fn assigned_attr(resource: &str) -> String {
    format!("{RESOURCES_ASSIGNED}.{resource}")
}

/// Point-in-time snapshot of a node, job or reservation.
///
/// Attributes keep the order in which they were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    attributes: Vec<(String, String)>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Entity {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces the value of an existing attribute in place, or appends a new one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, current)) => *current = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(position).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl AsRef<Entity> for Entity {
    fn as_ref(&self) -> &Entity {
        self
    }
}
