//! Elementary shortest path problem with time windows and capacity (ESPPTWC).
//!
//! Windows understood by [`new`]. A problem may leave any of them out; the label then
//! simply does not carry that resource.
//!
//! | resource       | shape         | meaning                                    |
//! |----------------|---------------|--------------------------------------------|
//! | `reduced_cost` | global        | accumulated reduced cost, starts at 0      |
//! | `time`         | one per node  | earliest start / latest arrival per node   |
//! | `load`         | global        | vehicle capacity                           |
//! | `is_visited`   | one per node  | visitation flags, `[0, 1]` each            |

use crate::extension::{LoadRef, ReducedCostRef, TravelTimeRef, VisitationRef};
use crate::feasibility::AtCurrentNode;
use crate::problem::RoutingData;
use crate::{Espprc, Initialization};

pub const REDUCED_COST : &str = "reduced_cost";
pub const TIME : &str = "time";
pub const LOAD : &str = "load";
pub const IS_VISITED : &str = "is_visited";

/// Builds the label algebra with the four canonical resources.
///
/// Time is tracked as a running scalar: it starts at the start node's earliest time and
/// is checked against the current node's window only. Reduced cost starts at zero.
pub fn new<D : RoutingData>(problem : D) -> Espprc<D> {
    let mut espprc = Espprc::new(problem);

    espprc.register_ref(REDUCED_COST, ReducedCostRef);
    espprc.register_ref(TIME, TravelTimeRef::new(TIME));
    espprc.register_ref(LOAD, LoadRef);
    espprc.register_ref(IS_VISITED, VisitationRef);

    espprc.set_initialization(REDUCED_COST, Initialization::Fixed(0.0));
    espprc.set_initialization(TIME, Initialization::LowerBoundAtNode);
    espprc.set_feasibility_rule(TIME, AtCurrentNode);

    espprc
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feasibility::FeasibilityRule;
    use crate::problem::{Adjacency, ProblemContext, ProblemData};
    use crate::resource::WindowTable;

    /// Depot 0 and customers 1 to 3
    pub(crate) fn canonical_problem() -> ProblemData {
        let windows = WindowTable::new()
            .with(REDUCED_COST, vec![0.0], vec![f64::INFINITY])
            .and_then(|w| w.with(TIME, vec![0.0, 10.0, 0.0, 0.0], vec![100.0, 50.0, 40.0, 0.0]))
            .and_then(|w| w.with(LOAD, vec![0.0], vec![15.0]))
            .and_then(|w| w.with(IS_VISITED, vec![0.0; 4], vec![1.0; 4]))
            .unwrap();
        let graph = Adjacency::from_lists([(0, vec![1, 2]), (1, vec![3]), (2, vec![3]), (3, vec![])]);

        ProblemData::new(windows)
            .with_adjacency(graph)
            .with_arc(0, 1, 2.0, 5.0)
            .with_arc(0, 2, 3.0, 4.0)
            .with_arc(1, 3, 4.0, 6.0)
            .with_arc(2, 3, 1.0, 3.0)
            .with_demand(1, 4.0)
            .with_demand(2, 6.0)
            .with_demand(3, 5.0)
    }

    #[test]
    fn preset_wiring() {
        let espprc = new(canonical_problem());
        for name in [REDUCED_COST, TIME, LOAD, IS_VISITED] {
            assert!(espprc.refs().contains(name));
        }
        let root = espprc.initialize(0).unwrap();
        assert_eq!(root.resource(TIME).unwrap().as_slice(), &[0.0]);
        assert_eq!(root.resource(IS_VISITED).unwrap().as_slice(), &[0.0; 4]);
    }

    #[test]
    fn time_narrowed_at_other_start() {
        let espprc = new(canonical_problem());
        let root = espprc.initialize(1).unwrap();
        assert_eq!(root.scalar(TIME), Some(10.0));
        assert!(espprc.is_feasible(&root).unwrap());
    }

    #[test]
    fn waiting_and_feasibility() {
        let espprc = new(canonical_problem());
        let root = espprc.initialize(0).unwrap();
        let at_2 = espprc.extend(&root, 2).unwrap().unwrap();
        assert_eq!(at_2.scalar(TIME), Some(4.0));
        assert_eq!(at_2.scalar(LOAD), Some(6.0));
        assert!(espprc.is_feasible(&at_2).unwrap());

        // node 3 closes at time 0
        let at_3 = espprc.extend(&at_2, 3).unwrap().unwrap();
        assert_eq!(at_3.scalar(TIME), Some(7.0));
        assert!(!espprc.is_feasible(&at_3).unwrap());
    }

    #[test]
    fn capacity_violation() {
        let espprc = new(canonical_problem().with_demand(3, 10.0));
        let root = espprc.initialize(0).unwrap();
        let at_2 = espprc.extend(&root, 2).unwrap().unwrap();
        let at_3 = espprc.extend(&at_2, 3).unwrap().unwrap();
        assert_eq!(at_3.scalar(LOAD), Some(16.0));

        let window = espprc.get_problem().windows().get(LOAD).unwrap();
        let load = at_3.resource(LOAD).unwrap();
        assert!(!espprc.feasibility().rule(LOAD).check(LOAD, load, window, 3).unwrap());
        assert!(!espprc.is_feasible(&at_3).unwrap());
    }
}
