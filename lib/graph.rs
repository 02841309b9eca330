//! Structural graphs describing the connectivity of a resource state.
//!
//! A [`Graph`] is a fixed set of labeled nodes with undirected edges between
//! them. Nodes are either points on a line or cells in a grid; the graph's
//! [`GraphDescription`] says which.

use std::fmt;
use itertools::Itertools;
use ndarray as nd;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} appears more than once")]
    DuplicateNode(Node),

    #[error("edge references unknown node {0}")]
    UnknownNode(Node),

    #[error("self-loop on node {0}")]
    SelfLoop(Node),

    #[error("node {0} does not fit a graph of dimension {1}")]
    KindMismatch(Node, usize),
}
pub type GraphResult<T> = Result<T, GraphError>;
use GraphError::*;

/// Label for a single node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// Point on a line.
    Line(usize),
    /// Cell in a grid, as `(row, column)`.
    Grid(usize, usize),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(k) => write!(f, "{}", k),
            Self::Grid(r, c) => write!(f, "({}, {})", r, c),
        }
    }
}

impl From<usize> for Node {
    fn from(k: usize) -> Self { Self::Line(k) }
}

impl From<(usize, usize)> for Node {
    fn from(rc: (usize, usize)) -> Self { Self::Grid(rc.0, rc.1) }
}

impl Node {
    /// Return the number of coordinates in the label.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Line(_) => 1,
            Self::Grid(..) => 2,
        }
    }
}

/// Coarse description of a graph's shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphDescription {
    pub is_grid: bool,
    pub dimension: usize,
}

impl GraphDescription {
    /// A 1D chain.
    pub const LINE: Self = Self { is_grid: false, dimension: 1 };

    /// A 2D grid.
    pub const GRID: Self = Self { is_grid: true, dimension: 2 };
}

/// An undirected graph over labeled nodes.
///
/// Nodes are kept in the order they were given, which fixes the qubit index of
/// each node in any state built from the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    description: GraphDescription,
    nodes: Vec<Node>,
    index: FxHashMap<Node, usize>,
    adj: nd::Array2<bool>,
}

impl Graph {
    /// Create a new graph from a description, nodes, and edges.
    ///
    /// Fails if any node is repeated, if an edge references a node not in
    /// `nodes` or connects a node to itself, or if a node label doesn't match
    /// the dimension of the description (only checked for dimensions 1 and
    /// 2).
    pub fn new<N, E>(description: GraphDescription, nodes: N, edges: E)
        -> GraphResult<Self>
    where
        N: IntoIterator<Item = Node>,
        E: IntoIterator<Item = (Node, Node)>,
    {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        let mut index: FxHashMap<Node, usize> = FxHashMap::default();
        for (k, node) in nodes.iter().enumerate() {
            if matches!(description.dimension, 1 | 2)
                && node.dimension() != description.dimension
            {
                return Err(KindMismatch(*node, description.dimension));
            }
            if index.insert(*node, k).is_some() {
                return Err(DuplicateNode(*node));
            }
        }
        let n = nodes.len();
        let mut adj: nd::Array2<bool> = nd::Array2::from_elem((n, n), false);
        for (a, b) in edges.into_iter() {
            let ia = *index.get(&a).ok_or(UnknownNode(a))?;
            let ib = *index.get(&b).ok_or(UnknownNode(b))?;
            if ia == ib { return Err(SelfLoop(a)); }
            adj[[ia, ib]] = true;
            adj[[ib, ia]] = true;
        }
        Ok(Self { description, nodes, index, adj })
    }

    /// Create a 1D chain `0 - 1 - ... - (n - 1)`.
    pub fn linear(n: usize) -> Self {
        let nodes: Vec<Node> = (0..n).map(Node::Line).collect();
        let mut adj: nd::Array2<bool> = nd::Array2::from_elem((n, n), false);
        for k in 1..n {
            adj[[k - 1, k]] = true;
            adj[[k, k - 1]] = true;
        }
        let index = nodes.iter().enumerate().map(|(k, v)| (*v, k)).collect();
        Self { description: GraphDescription::LINE, nodes, index, adj }
    }

    /// Create a 2D grid with nodes `(r, c)` for `r < rows` and `c < cols`,
    /// listed in row-major order, with edges between horizontal and vertical
    /// neighbors.
    pub fn grid(rows: usize, cols: usize) -> Self {
        let nodes: Vec<Node>
            = (0..rows).cartesian_product(0..cols)
            .map(|(r, c)| Node::Grid(r, c))
            .collect();
        let n = nodes.len();
        let mut adj: nd::Array2<bool> = nd::Array2::from_elem((n, n), false);
        for (r, c) in (0..rows).cartesian_product(0..cols) {
            let i = r * cols + c;
            if c + 1 < cols {
                adj[[i, i + 1]] = true;
                adj[[i + 1, i]] = true;
            }
            if r + 1 < rows {
                adj[[i, i + cols]] = true;
                adj[[i + cols, i]] = true;
            }
        }
        let index = nodes.iter().enumerate().map(|(k, v)| (*v, k)).collect();
        Self { description: GraphDescription::GRID, nodes, index, adj }
    }

    /// Return the shape description.
    pub fn description(&self) -> GraphDescription { self.description }

    /// Return the number of nodes.
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Return `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Return all nodes in order.
    pub fn nodes(&self) -> &[Node] { &self.nodes }

    /// Return the position of `node` in the node list.
    pub fn index_of(&self, node: &Node) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Return every edge once, as pairs ordered by position in the node list.
    pub fn edges(&self) -> Vec<(Node, Node)> {
        self.adj.indexed_iter()
            .filter(|((i, j), e)| **e && i < j)
            .map(|((i, j), _)| (self.nodes[i], self.nodes[j]))
            .collect()
    }

    /// Return the number of edges.
    pub fn num_edges(&self) -> usize {
        self.adj.iter().filter(|e| **e).count() / 2
    }

    /// Return the positions of all nodes sharing an edge with the node at
    /// position `k`.
    pub(crate) fn neighbor_indices(&self, k: usize) -> Vec<usize> {
        self.adj.slice(nd::s![k, ..]).iter()
            .enumerate()
            .filter_map(|(j, e)| e.then_some(j))
            .collect()
    }

    /// Return all nodes sharing an edge with `node`, in node order.
    ///
    /// Returns `None` if `node` isn't in the graph.
    pub fn neighbors_of(&self, node: &Node) -> Option<Vec<Node>> {
        let k = self.index_of(node)?;
        let neighbors
            = self.neighbor_indices(k).into_iter()
            .map(|j| self.nodes[j])
            .collect();
        Some(neighbors)
    }
}
