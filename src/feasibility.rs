//! Feasibility of a label against the window table.
//!
//! Every resource is checked by a [`FeasibilityRule`]. Unless overridden, the rule is
//! [`WithinBounds`], which compares every element against the window. Problems that
//! track a resource differently swap in another rule for that resource name, like
//! [`AtCurrentNode`] for a running arrival time.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::{EspprcError, Result};
use crate::resource::{ResourceVector, ResourceWindow};
use crate::NodeId;

/// Checks one resource value of a label sitting at `node`.
///
/// `Ok(false)` means infeasible. Errors are reserved for configuration problems
/// such as a value whose shape does not fit its window.
pub trait FeasibilityRule : Send + Sync {
    fn check(&self, resource : &str, value : &ResourceVector, window : &ResourceWindow, node : NodeId) -> Result<bool>;
}

impl<F> FeasibilityRule for F
    where F : Fn(&str, &ResourceVector, &ResourceWindow, NodeId) -> Result<bool> + Send + Sync
{
    fn check(&self, resource : &str, value : &ResourceVector, window : &ResourceWindow, node : NodeId) -> Result<bool> {
        self(resource, value, window, node)
    }
}

/// Element-wise `lower <= value <= upper`.
///
/// A length-one side broadcasts over the other; any other length mismatch is a
/// shape error.
#[derive(Clone, Copy, Debug, Default)]
pub struct WithinBounds;

impl FeasibilityRule for WithinBounds {
    fn check(&self, resource : &str, value : &ResourceVector, window : &ResourceWindow, _node : NodeId) -> Result<bool> {
        let len = match (value.len(), window.len()) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            (got, expected) => {
                return Err(EspprcError::ShapeMismatch {
                    resource : resource.to_owned(),
                    expected,
                    got,
                })
            }
        };
        let element = |i : usize| if value.is_scalar() { value[0] } else { value[i] };

        // window length is either `len` or one, so `bounds_at` always answers
        Ok((0..len).all(|i| {
            let x = element(i);
            window.bounds_at(i).is_some_and(|(lower, upper)| x >= lower && x <= upper)
        }))
    }
}

/// Checks a scalar resource against the bounds of the label's current node only.
///
/// Used for arrival time, which is a running scalar rather than one entry per node.
#[derive(Clone, Copy, Debug, Default)]
pub struct AtCurrentNode;

impl FeasibilityRule for AtCurrentNode {
    fn check(&self, resource : &str, value : &ResourceVector, window : &ResourceWindow, node : NodeId) -> Result<bool> {
        if !value.is_scalar() {
            return Err(EspprcError::ShapeMismatch {
                resource : resource.to_owned(),
                expected : 1,
                got : value.len(),
            });
        }
        window.check_node(resource, node)?;
        let (lower, upper) = window.bounds_at(node).unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        Ok(value[0] >= lower && value[0] <= upper)
    }
}

/// Per-resource dispatch table of feasibility rules, falling back to [`WithinBounds`].
pub struct FeasibilityPolicy {
    rules : HashMap<String, Box<dyn FeasibilityRule>>,
    fallback : WithinBounds,
}

impl FeasibilityPolicy {
    pub fn new() -> Self {
        Self {
            rules : HashMap::new(),
            fallback : WithinBounds,
        }
    }

    /// Overrides the rule for `resource`
    pub fn set_rule(&mut self, resource : impl Into<String>, rule : impl FeasibilityRule + 'static) {
        let resource = resource.into();
        log::debug!("feasibility rule override for `{resource}`");
        self.rules.insert(resource, Box::new(rule));
    }

    /// Rule that applies to `resource`
    pub fn rule(&self, resource : &str) -> &dyn FeasibilityRule {
        match self.rules.get(resource) {
            Some(rule) => rule.as_ref(),
            None => &self.fallback,
        }
    }
}

impl Default for FeasibilityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FeasibilityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut overridden : Vec<&String> = self.rules.keys().collect();
        overridden.sort();
        f.debug_struct("FeasibilityPolicy").field("overridden", &overridden).finish()
    }
}
