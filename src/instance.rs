//! Turns a VRPTW customer list into a pricing problem.
//!
//! Node 0 is the depot the paths start from and the last node is a copy of the depot
//! the paths end at. Arcs that can never be part of a feasible path are dropped up front.

use serde::{Deserialize, Serialize};

use crate::espptwc::{IS_VISITED, LOAD, REDUCED_COST, TIME};
use crate::error::Result;
use crate::problem::{Adjacency, ProblemData};
use crate::resource::WindowTable;
use crate::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub x : f64,
    pub y : f64,
    pub demand : f64,
    pub ready_time : f64,
    pub due_date : f64,
    pub service_time : f64,
}

/// Dense cost and travel time matrices, indexed `[from][to]`
#[derive(Clone, Debug, PartialEq)]
pub struct TravelMatrices {
    pub cost : Vec<Vec<f64>>,
    pub travel_time : Vec<Vec<f64>>,
}

/// Euclidean distances as costs; travel time adds the service time at the origin.
pub fn build_matrices(customers : &[Customer]) -> TravelMatrices {
    let n = customers.len();
    let mut cost = vec![vec![0.0; n]; n];
    let mut travel_time = vec![vec![0.0; n]; n];

    for (i, from) in customers.iter().enumerate() {
        for (j, to) in customers.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance = (from.x - to.x).hypot(from.y - to.y);
            cost[i][j] = distance;
            travel_time[i][j] = distance + from.service_time;
        }
    }

    TravelMatrices { cost, travel_time }
}

#[derive(Clone, Debug)]
pub struct FilteredArcs {
    pub adjacency : Adjacency,
    /// `(from, to, cost, travel_time)` of every kept arc
    pub arcs : Vec<(NodeId, NodeId, f64, f64)>,
    /// Share of the `n * (n - 1)` candidate arcs that was dropped
    pub ratio_filtered : f64,
}

/// Keeps arc `i -> j` unless
/// - `j` is the start depot or `i` the end depot,
/// - `demand[i] + demand[j]` exceeds `capacity`,
/// - leaving `i` at its ready time reaches `j` after its due date.
pub fn filter_arcs(customers : &[Customer], matrices : &TravelMatrices, capacity : f64) -> FilteredArcs {
    let n = customers.len();
    let last = n.saturating_sub(1);

    let mut adjacency = Adjacency::new();
    let mut arcs = Vec::new();
    let mut total = 0_usize;

    for i in 0..n {
        adjacency.add_node(i);
    }

    for (i, from) in customers.iter().enumerate() {
        for (j, to) in customers.iter().enumerate() {
            if i == j {
                continue;
            }
            total += 1;

            if j == 0 || i == last {
                continue;
            }
            if from.demand + to.demand > capacity {
                continue;
            }
            let travel_time = matrices.travel_time[i][j];
            if from.ready_time + travel_time > to.due_date {
                continue;
            }

            adjacency.add_arc(i, j);
            arcs.push((i, j, matrices.cost[i][j], travel_time));
        }
    }

    let ratio_filtered = if total > 0 {
        1.0 - arcs.len() as f64 / total as f64
    } else {
        0.0
    };
    log::debug!("kept {} of {total} arcs ({:.1}% filtered)", arcs.len(), ratio_filtered * 100.0);

    FilteredArcs { adjacency, arcs, ratio_filtered }
}

impl ProblemData {
    /// Pricing problem over `customers` with the four canonical resources.
    ///
    /// The reduced cost window is unbounded and arcs start with their plain cost as
    /// reduced cost; apply duals with [`ProblemData::set_reduced_cost`].
    pub fn from_customers(customers : &[Customer], capacity : f64) -> Result<Self> {
        let n = customers.len();
        let windows = WindowTable::new()
            .with(REDUCED_COST, vec![f64::NEG_INFINITY], vec![f64::INFINITY])?
            .with(
                TIME,
                customers.iter().map(|c| c.ready_time).collect(),
                customers.iter().map(|c| c.due_date).collect(),
            )?
            .with(LOAD, vec![0.0], vec![capacity])?
            .with(IS_VISITED, vec![0.0; n], vec![1.0; n])?;

        let filtered = filter_arcs(customers, &build_matrices(customers), capacity);

        let mut problem = ProblemData::new(windows).with_adjacency(filtered.adjacency);
        for (from, to, cost, travel_time) in filtered.arcs {
            problem = problem.with_arc(from, to, cost, travel_time);
        }
        for (node, customer) in customers.iter().enumerate() {
            problem = problem.with_demand(node, customer.demand);
        }
        Ok(problem)
    }
}
