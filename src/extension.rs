//! Resource extension functions (REFs) and their registry.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::espptwc::TIME;
use crate::problem::{ProblemContext, RoutingData};
use crate::resource::ResourceVector;
use crate::NodeId;

/// Computes the value of one resource after traversing the arc `origin -> destination`.
///
/// `value` is a private copy of the parent's value, so an implementation may update
/// it in place and return it. Extension functions must not bounds-check their result:
/// that is the feasibility check's job, applied afterwards. The returned vector must
/// keep the length of `value`.
pub trait ResourceExtension<D> : Send + Sync {
    fn extend(&self, value : ResourceVector, origin : NodeId, destination : NodeId, problem : &D) -> ResourceVector;

    /// True if the function writes the entry at index `destination`, so every
    /// destination must be in range of the value it extends.
    fn node_indexed(&self) -> bool {
        false
    }
}

impl<D, F> ResourceExtension<D> for F
    where F : Fn(ResourceVector, NodeId, NodeId, &D) -> ResourceVector + Send + Sync
{
    fn extend(&self, value : ResourceVector, origin : NodeId, destination : NodeId, problem : &D) -> ResourceVector {
        self(value, origin, destination, problem)
    }
}

/// Mapping from resource name to its extension function.
///
/// Filled once during setup. Registration needs `&mut self`, so it cannot race
/// with extensions running on a shared reference.
pub struct RefRegistry<D> {
    refs : HashMap<String, Box<dyn ResourceExtension<D>>>,
}

impl<D> RefRegistry<D> {
    pub fn new() -> Self {
        Self { refs : HashMap::new() }
    }

    /// Stores `ext` under `name`. Re-registering a name replaces the previous function.
    pub fn register(&mut self, name : impl Into<String>, ext : impl ResourceExtension<D> + 'static) {
        let name = name.into();
        if self.refs.insert(name.clone(), Box::new(ext)).is_some() {
            log::debug!("replaced resource extension function for `{name}`");
        } else {
            log::debug!("registered resource extension function for `{name}`");
        }
    }

    pub fn get(&self, name : &str) -> Option<&dyn ResourceExtension<D>> {
        self.refs.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name : &str) -> bool {
        self.refs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<D> Default for RefRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Debug for RefRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names : Vec<&String> = self.refs.keys().collect();
        names.sort();
        f.debug_struct("RefRegistry").field("resources", &names).finish()
    }
}

/// Adds the arc's reduced cost. Arc costs may be negative.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReducedCostRef;

impl<D : RoutingData> ResourceExtension<D> for ReducedCostRef {
    fn extend(&self, mut value : ResourceVector, origin : NodeId, destination : NodeId, problem : &D) -> ResourceVector {
        let cost = problem.reduced_cost(origin, destination).unwrap_or(f64::INFINITY);
        value.iter_mut().for_each(|v| *v += cost);
        value
    }
}

/// Arrival time: previous time plus travel time, waiting up to the destination's
/// earliest start taken from the window of `window`.
#[derive(Clone, Debug)]
pub struct TravelTimeRef {
    window : String,
}

impl TravelTimeRef {
    /// Reads earliest start times from the window named `window`
    pub fn new(window : impl Into<String>) -> Self {
        Self { window : window.into() }
    }
}

impl Default for TravelTimeRef {
    fn default() -> Self {
        Self::new(TIME)
    }
}

impl<D : RoutingData> ResourceExtension<D> for TravelTimeRef {
    fn extend(&self, mut value : ResourceVector, origin : NodeId, destination : NodeId, problem : &D) -> ResourceVector {
        let travel = problem.travel_time(origin, destination).unwrap_or(f64::INFINITY);
        let earliest = problem
            .windows()
            .get(&self.window)
            .ok()
            .and_then(|w| w.bounds_at(destination))
            .map_or(f64::NEG_INFINITY, |(lower, _)| lower);

        if let Some(time) = value.first_mut() {
            *time = (*time + travel).max(earliest);
        }
        value
    }
}

/// Adds the destination's demand.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadRef;

impl<D : RoutingData> ResourceExtension<D> for LoadRef {
    fn extend(&self, mut value : ResourceVector, _origin : NodeId, destination : NodeId, problem : &D) -> ResourceVector {
        let demand = problem.demand(destination);
        value.iter_mut().for_each(|v| *v += demand);
        value
    }
}

/// Marks the destination as visited.
///
/// Marking a node twice is not an error here; revisits are left to feasibility.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisitationRef;

impl<D : ProblemContext> ResourceExtension<D> for VisitationRef {
    fn extend(&self, mut value : ResourceVector, _origin : NodeId, destination : NodeId, _problem : &D) -> ResourceVector {
        // the extension operator has already checked `destination` against the value
        if let Some(visited) = value.get_mut(destination) {
            *visited = 1.0;
        }
        value
    }

    fn node_indexed(&self) -> bool {
        true
    }
}
