#![warn(warnings)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::needless_return)]
#![allow(clippy::module_name_repetitions)]

//! Label algebra for the elementary shortest path problem with resource constraints.
//!
//! This crate does not search. It provides what a labeling algorithm for a
//! column-generation pricing problem needs on every step:
//!
//! - [`Espprc::initialize`] builds the root label at a start node,
//! - [`Espprc::extend`] pushes a label along an arc through the registered
//!   resource extension functions,
//! - [`Espprc::is_feasible`] checks a label against the resource windows,
//! - [`Espprc::dominates`] decides whether a label can be discarded in favour of another.
//!
//! Resources are named numeric vectors. Their bounds live in a [`WindowTable`], their
//! update rules in a [`RefRegistry`] and their feasibility rules in a [`FeasibilityPolicy`].
//! [`espptwc::new`] wires up the usual reduced cost, time, load and visitation resources.
//!
//! Setup needs `&mut Espprc`, everything else `&Espprc`, so one configured instance
//! can be shared by concurrent searches.

use std::collections::HashMap;
use std::fmt::Debug;

pub mod dominance;
pub mod error;
pub mod espptwc;
pub mod extension;
pub mod feasibility;
pub mod instance;
pub mod label;
pub mod problem;
pub mod resource;

pub use error::{EspprcError, Result};
pub use extension::{LoadRef, ReducedCostRef, RefRegistry, ResourceExtension, TravelTimeRef, VisitationRef};
pub use feasibility::{AtCurrentNode, FeasibilityPolicy, FeasibilityRule, WithinBounds};
pub use label::{Label, Resources};
pub use problem::{Adjacency, ArcData, ProblemContext, ProblemData, RoutingData};
pub use resource::{ResourceVector, ResourceWindow, WindowTable};

/// Node identifier, also the index into node-indexed windows
pub type NodeId = usize;

/// How a resource is initialized in the root label
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Initialization {
    /// Full lower-bound vector of the window
    #[default]
    LowerBound,
    /// Scalar lower bound taken at the start node
    LowerBoundAtNode,
    /// Scalar constant, for resources whose window has no finite lower bound
    Fixed(f64),
}

/// Configured label algebra over a problem context `D`.
pub struct Espprc<D : ProblemContext = ProblemData> {
    problem : D,
    refs : RefRegistry<D>,
    feasibility : FeasibilityPolicy,
    initialization : HashMap<String, Initialization>,
}

impl<D : ProblemContext> Espprc<D> {

    /// No extension functions, generic bounds checks, full lower-bound initialization
    pub fn new(problem : D) -> Self {
        Self {
            problem,
            refs : RefRegistry::new(),
            feasibility : FeasibilityPolicy::new(),
            initialization : HashMap::new(),
        }
    }

    /// Returns reference to stored problem
    pub fn get_problem(&self) -> &D {
        &self.problem
    }

    /// Returns mutable reference to stored problem
    pub fn get_problem_mut(&mut self) -> &mut D {
        &mut self.problem
    }

    pub fn refs(&self) -> &RefRegistry<D> {
        &self.refs
    }

    pub fn feasibility(&self) -> &FeasibilityPolicy {
        &self.feasibility
    }

    /// Registers the extension function of resource `name`. The last registration wins.
    pub fn register_ref(&mut self, name : impl Into<String>, ext : impl ResourceExtension<D> + 'static) {
        self.refs.register(name, ext);
    }

    /// Closure flavour of [`Espprc::register_ref`]
    pub fn register_ref_fn<F>(&mut self, name : impl Into<String>, ext : F)
        where F : Fn(ResourceVector, NodeId, NodeId, &D) -> ResourceVector + Send + Sync + 'static
    {
        self.refs.register(name, ext);
    }

    /// Replaces the feasibility rule of resource `name`
    pub fn set_feasibility_rule(&mut self, name : impl Into<String>, rule : impl FeasibilityRule + 'static) {
        self.feasibility.set_rule(name, rule);
    }

    pub fn set_initialization(&mut self, name : impl Into<String>, initialization : Initialization) {
        self.initialization.insert(name.into(), initialization);
    }

    /// Root label at `start`: one resource per window, each at its lower bound.
    pub fn initialize(&self, start : NodeId) -> Result<Label> {
        let mut resources = Resources::new();
        for (name, window) in self.problem.windows().iter() {
            let init = self.initialization.get(name).copied().unwrap_or_default();
            let value = match init {
                Initialization::LowerBound => window.lower().clone(),
                Initialization::LowerBoundAtNode => {
                    window.check_node(name, start)?;
                    let (lower, _) = window.bounds_at(start).unwrap_or((0.0, 0.0));
                    ResourceVector::scalar(lower)
                }
                Initialization::Fixed(value) => ResourceVector::scalar(value),
            };
            resources.insert(name.to_owned(), value);
        }
        Ok(Label::new(start, resources))
    }

    /// Extends `label` along the arc to `destination`.
    ///
    /// Returns `Ok(None)` if the arc is not in the graph; no extension function runs in
    /// that case. A label that violates its windows is still returned, see
    /// [`Espprc::is_feasible`]. Missing extension functions or windows and shape changes
    /// are configuration errors.
    pub fn extend(&self, label : &Label, destination : NodeId) -> Result<Option<Label>> {
        let origin = label.node();

        if let Some(adjacency) = self.problem.adjacency() {
            if !adjacency.contains_arc(origin, destination) {
                log::trace!("no arc {origin} -> {destination}");
                return Ok(None);
            }
        }

        // validate everything before running any extension function
        let mut steps = Vec::with_capacity(label.resources().len());
        for (name, value) in label.resources() {
            let ext = self.refs.get(name).ok_or_else(|| EspprcError::MissingRef {
                resource : name.clone(),
            })?;
            self.problem.windows().get(name)?.check_node(name, destination)?;
            if ext.node_indexed() && destination >= value.len() {
                return Err(EspprcError::NodeOutOfRange {
                    resource : name.clone(),
                    node : destination,
                    len : value.len(),
                });
            }
            steps.push((name, value, ext));
        }

        let mut resources = Resources::new();
        for (name, value, ext) in steps {
            let extended = ext.extend(value.clone(), origin, destination, &self.problem);
            if extended.len() != value.len() {
                return Err(EspprcError::ShapeMismatch {
                    resource : name.clone(),
                    expected : value.len(),
                    got : extended.len(),
                });
            }
            resources.insert(name.clone(), extended);
        }

        return Ok(Some(Label::extend_with(label, destination, resources)));
    }

    /// Checks every resource of `label` with its feasibility rule.
    ///
    /// `Ok(false)` on the first violation; which resource is checked first is unspecified.
    pub fn is_feasible(&self, label : &Label) -> Result<bool> {
        for (name, value) in label.resources() {
            let window = self.problem.windows().get(name)?;
            if !self.feasibility.rule(name).check(name, value, window, label.node())? {
                log::trace!("label at {} violates `{name}`: {value}", label.node());
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// See [`dominance::dominates`]
    pub fn dominates(&self, label_a : &Label, label_b : &Label, excluded : &[&str]) -> bool {
        dominance::dominates(label_a, label_b, excluded)
    }
}

impl<D : ProblemContext + Debug> Debug for Espprc<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Espprc")
            .field("problem", &self.problem)
            .field("refs", &self.refs)
            .field("feasibility", &self.feasibility)
            .field("initialization", &self.initialization)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two resources, no graph
    fn unguarded() -> Espprc {
        let windows = WindowTable::new()
            .with("cost", vec![f64::NEG_INFINITY], vec![f64::INFINITY])
            .unwrap()
            .with("hops", vec![0.0], vec![2.0])
            .unwrap();
        let problem = ProblemData::new(windows).with_arc(0, 1, -1.0, 1.0);
        let mut espprc = Espprc::new(problem);
        espprc.set_initialization("cost", Initialization::Fixed(0.0));
        espprc.register_ref("cost", ReducedCostRef);
        espprc.register_ref_fn("hops", |mut v, _, _, _| {
            v[0] += 1.0;
            v
        });
        espprc
    }

    #[test]
    fn initialize_uses_lower_bounds_unless_overridden() {
        let espprc = unguarded();
        let root = espprc.initialize(0).unwrap();
        assert_eq!(root.scalar("cost"), Some(0.0));
        assert_eq!(root.scalar("hops"), Some(0.0));
        assert_eq!(root.path(), &[0]);
    }

    #[test]
    fn without_graph_every_destination_is_reachable() {
        let espprc = unguarded();
        let root = espprc.initialize(0).unwrap();
        let next = espprc.extend(&root, 5).unwrap().unwrap();
        assert_eq!(next.path(), &[0, 5]);
        assert_eq!(next.scalar("hops"), Some(1.0));
        assert_eq!(next.scalar("cost"), Some(f64::INFINITY));

        let next = espprc.extend(&root, 1).unwrap().unwrap();
        assert_eq!(next.scalar("cost"), Some(-1.0));
        assert!(espprc.is_feasible(&next).unwrap());
    }

    #[test]
    fn infeasible_label_is_still_built() {
        let espprc = unguarded();
        let mut label = espprc.initialize(0).unwrap();
        for next in 1..=3 {
            label = espprc.extend(&label, next).unwrap().unwrap();
        }
        assert_eq!(label.scalar("hops"), Some(3.0));
        assert!(!espprc.is_feasible(&label).unwrap());
    }

    #[test]
    fn missing_ref_is_configuration_error() {
        let mut espprc = unguarded();
        let windows = espprc.get_problem().windows().clone().with("extra", vec![0.0], vec![1.0]).unwrap();
        *espprc.get_problem_mut() = ProblemData::new(windows);

        let root = espprc.initialize(0).unwrap();
        assert!(matches!(
            espprc.extend(&root, 1),
            Err(EspprcError::MissingRef { resource }) if resource == "extra"
        ));
    }

    #[test]
    fn missing_window_is_configuration_error() {
        let espprc = unguarded();
        let mut resources = Resources::new();
        resources.insert("weight".to_owned(), ResourceVector::scalar(1.0));
        let stray = Label::new(0, resources);
        assert!(matches!(espprc.is_feasible(&stray), Err(EspprcError::MissingWindow { .. })));
    }

    #[test]
    fn shape_change_is_configuration_error() {
        let mut espprc = unguarded();
        espprc.register_ref_fn("hops", |_, _, _, _| ResourceVector::zeros(2));
        let root = espprc.initialize(0).unwrap();
        assert!(matches!(
            espprc.extend(&root, 1),
            Err(EspprcError::ShapeMismatch { expected : 1, got : 2, .. })
        ));
    }

    #[test]
    fn node_indexed_ref_needs_entry_for_destination() {
        let mut espprc = unguarded();
        let windows = espprc.get_problem().windows().clone().with("visited", vec![0.0], vec![1.0]).unwrap();
        *espprc.get_problem_mut() = ProblemData::new(windows).with_arc(0, 1, -1.0, 1.0);
        espprc.register_ref("visited", VisitationRef);

        let root = espprc.initialize(0).unwrap();
        assert!(matches!(
            espprc.extend(&root, 1),
            Err(EspprcError::NodeOutOfRange { node : 1, len : 1, .. })
        ));

        let stay = espprc.extend(&root, 0).unwrap().unwrap();
        assert!(stay.is_marked("visited", 0));
    }

    #[test]
    fn start_node_initialization() {
        let windows = WindowTable::new().with("time", vec![3.0, 7.0], vec![9.0, 9.0]).unwrap();
        let mut espprc = Espprc::new(ProblemData::new(windows));
        espprc.set_initialization("time", Initialization::LowerBoundAtNode);
        assert_eq!(espprc.initialize(1).unwrap().resource("time").unwrap().as_slice(), &[7.0]);
        assert!(matches!(espprc.initialize(2), Err(EspprcError::NodeOutOfRange { node : 2, .. })));
    }

    #[test]
    fn shared_across_threads() {
        let espprc = crate::espptwc::new(crate::espptwc::tests::canonical_problem());
        let root = espprc.initialize(0).unwrap();
        let costs : Vec<f64> = std::thread::scope(|s| {
            let handles : Vec<_> = [1, 2]
                .into_iter()
                .map(|next| {
                    let (espprc, root) = (&espprc, &root);
                    s.spawn(move || espprc.extend(root, next).unwrap().unwrap().scalar("reduced_cost").unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(costs, vec![2.0, 3.0]);
    }
}
