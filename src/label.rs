use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::resource::ResourceVector;
use crate::NodeId;

/// Resource name to value, one entry per tracked resource
pub type Resources = BTreeMap<String, ResourceVector>;

#[derive(Clone, Debug, PartialEq)]
/// Partial path ending at `node`, tagged with its accumulated resource consumption.
///
/// Labels own their resources and path outright and expose no mutators, so a label
/// is a frozen snapshot: changing anything means building a new label.
pub struct Label {
    node : NodeId,
    resources : Resources,
    path : Vec<NodeId>,
}

impl Label {
    /// Root label sitting at `node` with path `[node]`
    pub fn new(node : NodeId, resources : Resources) -> Self {
        Self {
            node,
            resources,
            path : vec![node],
        }
    }

    /// Helper function that creates a child label at `node` from an existing label
    ///
    /// The parent's path is copied and `node` appended, unless it already ends in `node`.
    pub fn extend_with(parent : &Label, node : NodeId, resources : Resources) -> Self {
        let mut path = Vec::with_capacity(parent.path.len() + 1);
        path.extend_from_slice(&parent.path);
        if path.last() != Some(&node) {
            path.push(node);
        }
        Self {
            node,
            resources,
            path,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resource(&self, name : &str) -> Option<&ResourceVector> {
        self.resources.get(name)
    }

    /// First element of a resource, handy for scalar resources
    pub fn scalar(&self, name : &str) -> Option<f64> {
        self.resources.get(name)?.first().copied()
    }

    /// True if `resource` holds a non-zero entry at `index`.
    ///
    /// Lets a driver test the visitation vector before extending towards a node.
    pub fn is_marked(&self, resource : &str, index : usize) -> bool {
        self.resources
            .get(resource)
            .and_then(|v| v.get(index))
            .is_some_and(|&v| v != 0.0)
    }

    /// Gives up the label's resources, e.g. to derive a modified copy
    pub fn into_resources(self) -> Resources {
        self.resources
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Label at {}\n", self.node))?;
        f.write_fmt(format_args!("Visiting: {}\n", self.path.iter().join("-")))?;
        for (name, value) in &self.resources {
            f.write_fmt(format_args!("{name}: {value}\n"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(time : f64) -> Resources {
        let mut r = Resources::new();
        r.insert("time".to_owned(), ResourceVector::scalar(time));
        r.insert("is_visited".to_owned(), ResourceVector::zeros(3));
        r
    }

    #[test]
    fn root_label_path() {
        let label = Label::new(0, resources(0.0));
        assert_eq!(label.path(), &[0]);
        assert_eq!(label.scalar("time"), Some(0.0));
        assert_eq!(label.scalar("load"), None);
    }

    #[test]
    fn extend_appends_node() {
        let root = Label::new(0, resources(0.0));
        let child = Label::extend_with(&root, 2, resources(4.0));
        assert_eq!(child.node(), 2);
        assert_eq!(child.path(), &[0, 2]);
        assert_eq!(root.path(), &[0]);
    }

    #[test]
    fn idempotent_append() {
        let root = Label::new(0, resources(0.0));
        let child = Label::extend_with(&root, 2, resources(4.0));
        let same = Label::extend_with(&child, 2, resources(5.0));
        assert_eq!(same.path(), &[0, 2]);
        assert_eq!(same.scalar("time"), Some(5.0));
    }

    #[test]
    fn copies_are_isolated() {
        let a = Label::new(0, resources(0.0));
        let mut taken = a.resources().clone();
        let b = Label::extend_with(&a, 1, taken.clone());

        taken.get_mut("is_visited").unwrap()[1] = 1.0;
        taken.get_mut("time").unwrap()[0] = 99.0;

        assert_eq!(b.scalar("time"), Some(0.0));
        assert!(!b.is_marked("is_visited", 1));
        assert_eq!(a.scalar("time"), Some(0.0));
    }

    #[test]
    fn display_lists_path() {
        let root = Label::new(0, resources(0.0));
        let child = Label::extend_with(&root, 2, resources(4.0));
        let text = child.to_string();
        assert!(text.contains("Visiting: 0-2"));
        assert!(text.contains("time: [4]"));
    }
}
