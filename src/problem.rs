//! Read-only problem context handed to every resource extension function.

use std::collections::{BTreeMap, HashMap};

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::WindowTable;
use crate::NodeId;

/// What the core itself needs from a problem: the windows and, optionally, the graph.
///
/// Anything else (costs, times, demands) is only read by extension functions.
pub trait ProblemContext {
    fn windows(&self) -> &WindowTable;

    /// Graph used to gate extensions. `None` presumes every destination reachable.
    fn adjacency(&self) -> Option<&Adjacency>;
}

/// Arc and node data read by the canonical extension functions.
pub trait RoutingData : ProblemContext {
    fn reduced_cost(&self, from : NodeId, to : NodeId) -> Option<f64>;

    fn travel_time(&self, from : NodeId, to : NodeId) -> Option<f64>;

    /// Demand of `node`, zero if unknown (e.g. the depot)
    fn demand(&self, node : NodeId) -> f64;
}

/// Ordered successor lists of the problem graph.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
    graph : DiGraphMap<NodeId, ()>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from `(node, successors)` pairs, keeping successor order.
    pub fn from_lists<I, S>(lists : I) -> Self
        where
            I : IntoIterator<Item = (NodeId, S)>,
            S : IntoIterator<Item = NodeId>
    {
        let mut adjacency = Self::new();
        for (node, successors) in lists {
            adjacency.add_node(node);
            for successor in successors {
                adjacency.add_arc(node, successor);
            }
        }
        adjacency
    }

    pub fn add_node(&mut self, node : NodeId) {
        self.graph.add_node(node);
    }

    pub fn add_arc(&mut self, from : NodeId, to : NodeId) {
        self.graph.add_edge(from, to, ());
    }

    pub fn contains_arc(&self, from : NodeId, to : NodeId) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Successors of `node` in insertion order; empty for unknown nodes.
    pub fn successors(&self, node : NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl From<BTreeMap<NodeId, Vec<NodeId>>> for Adjacency {
    fn from(lists : BTreeMap<NodeId, Vec<NodeId>>) -> Self {
        Self::from_lists(lists)
    }
}

impl From<Adjacency> for BTreeMap<NodeId, Vec<NodeId>> {
    fn from(adjacency : Adjacency) -> Self {
        adjacency
            .graph
            .nodes()
            .map(|node| (node, adjacency.successors(node).collect()))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcData {
    pub reduced_cost : f64,
    pub travel_time : f64,
}

/// Default problem context for routing-style pricing problems.
///
/// Arcs without data have infinite reduced cost and travel time.
#[derive(Clone, Debug, Default)]
pub struct ProblemData {
    windows : WindowTable,
    adjacency : Option<Adjacency>,
    arcs : HashMap<(NodeId, NodeId), ArcData>,
    demands : HashMap<NodeId, f64>,
}

impl ProblemData {
    pub fn new(windows : WindowTable) -> Self {
        Self {
            windows,
            ..Self::default()
        }
    }

    pub fn with_adjacency(mut self, adjacency : Adjacency) -> Self {
        self.adjacency = Some(adjacency);
        self
    }

    pub fn with_arc(mut self, from : NodeId, to : NodeId, reduced_cost : f64, travel_time : f64) -> Self {
        self.arcs.insert((from, to), ArcData { reduced_cost, travel_time });
        self
    }

    pub fn with_demand(mut self, node : NodeId, demand : f64) -> Self {
        self.demands.insert(node, demand);
        self
    }

    /// Overwrites the reduced cost of an arc, e.g. after new duals arrive.
    /// Unknown arcs are created with infinite travel time.
    pub fn set_reduced_cost(&mut self, from : NodeId, to : NodeId, reduced_cost : f64) {
        self.arcs
            .entry((from, to))
            .or_insert(ArcData { reduced_cost, travel_time : f64::INFINITY })
            .reduced_cost = reduced_cost;
    }

    pub fn arc(&self, from : NodeId, to : NodeId) -> Option<&ArcData> {
        self.arcs.get(&(from, to))
    }

    /// Reads problem data from its JSON configuration layout.
    pub fn from_json(json : &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ProblemContext for ProblemData {
    fn windows(&self) -> &WindowTable {
        &self.windows
    }

    fn adjacency(&self) -> Option<&Adjacency> {
        self.adjacency.as_ref()
    }
}

impl RoutingData for ProblemData {
    fn reduced_cost(&self, from : NodeId, to : NodeId) -> Option<f64> {
        self.arc(from, to).map(|arc| arc.reduced_cost)
    }

    fn travel_time(&self, from : NodeId, to : NodeId) -> Option<f64> {
        self.arc(from, to).map(|arc| arc.travel_time)
    }

    fn demand(&self, node : NodeId) -> f64 {
        self.demands.get(&node).copied().unwrap_or(0.0)
    }
}

/// Arc entry in the configuration layout; `null` stands for an infinite value
#[derive(Serialize, Deserialize)]
struct RawArc {
    from : NodeId,
    to : NodeId,
    reduced_cost : Option<f64>,
    travel_time : Option<f64>,
}

impl RawArc {
    fn new(from : NodeId, to : NodeId, data : ArcData) -> Self {
        let finite = |v : f64| if v.is_finite() { Some(v) } else { None };
        Self {
            from,
            to,
            reduced_cost : finite(data.reduced_cost),
            travel_time : finite(data.travel_time),
        }
    }

    fn data(&self) -> ArcData {
        ArcData {
            reduced_cost : self.reduced_cost.unwrap_or(f64::INFINITY),
            travel_time : self.travel_time.unwrap_or(f64::INFINITY),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawProblemData {
    resource_windows : WindowTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    graph : Option<BTreeMap<NodeId, Vec<NodeId>>>,
    #[serde(default)]
    arcs : Vec<RawArc>,
    #[serde(default)]
    demands : BTreeMap<NodeId, f64>,
}

impl<'de> Deserialize<'de> for ProblemData {
    fn deserialize<De : serde::Deserializer<'de>>(deserializer : De) -> std::result::Result<Self, De::Error> {
        let raw = RawProblemData::deserialize(deserializer)?;
        Ok(Self {
            windows : raw.resource_windows,
            adjacency : raw.graph.map(Adjacency::from),
            arcs : raw.arcs.iter().map(|arc| ((arc.from, arc.to), arc.data())).collect(),
            demands : raw.demands.into_iter().collect(),
        })
    }
}

impl Serialize for ProblemData {
    fn serialize<Ser : serde::Serializer>(&self, serializer : Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        let mut arcs : Vec<RawArc> = self
            .arcs
            .iter()
            .map(|(&(from, to), &data)| RawArc::new(from, to, data))
            .collect();
        arcs.sort_unstable_by_key(|arc| (arc.from, arc.to));

        RawProblemData {
            resource_windows : self.windows.clone(),
            graph : self.adjacency.clone().map(BTreeMap::from),
            arcs,
            demands : self.demands.iter().map(|(&node, &demand)| (node, demand)).collect(),
        }
        .serialize(serializer)
    }
}
