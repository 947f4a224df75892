use crate::logger::Logger;
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::fmt;

/// Directed graph keyed by string identity.
///
/// Population is tolerant: duplicate vertices, self loops and edges that
/// reference unknown vertices are logged and dropped, never returned as
/// errors. Each dropped request is also kept as a [`GraphDiagnostic`].
pub struct Graph<T> {
    pub(crate) graph: DiGraph<Node<T>, ()>,
    pub(crate) keys: IndexMap<String, NodeIndex>,
    diagnostics: Vec<GraphDiagnostic>,
    logger: Logger,
}

pub(crate) struct Node<T> {
    pub(crate) key: String,
    pub(crate) value: T,
}

/// A request the graph refused while being populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphDiagnostic {
    DuplicateVertex { key: String },
    MissingVertex { from: String, to: String, missing: String },
    SelfLoop { key: String },
}

impl fmt::Display for GraphDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateVertex { key } => write!(f, "vertex {key} already exists"),
            Self::MissingVertex { from, to, missing } => {
                write!(f, "edge {from} -> {to} dropped: vertex {missing} not found")
            }
            Self::SelfLoop { key } => write!(f, "cannot add edge to the same vertex: {key}"),
        }
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_logger(Logger::facade("inject::graph"))
    }

    #[must_use]
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            graph: DiGraph::new(),
            keys: IndexMap::new(),
            diagnostics: Vec::new(),
            logger,
        }
    }

    /// Insert a vertex. An existing key keeps its original value.
    pub fn add_vertex(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if self.keys.contains_key(&key) {
            self.logger.warn(format_args!("vertex {key} already exists"));
            self.diagnostics
                .push(GraphDiagnostic::DuplicateVertex { key });
            return;
        }

        let idx = self.graph.add_node(Node {
            key: key.clone(),
            value,
        });
        self.logger.debug(format_args!("vertex added: {key}"));
        self.keys.insert(key, idx);
    }

    /// Add a directed edge `from -> to`.
    ///
    /// Both endpoints must exist and differ; an edge that is already present
    /// is not added twice.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let Some(&from_idx) = self.keys.get(from) else {
            self.drop_edge(from, to, from);
            return;
        };
        let Some(&to_idx) = self.keys.get(to) else {
            self.drop_edge(from, to, to);
            return;
        };

        if from_idx == to_idx {
            self.logger
                .warn(format_args!("cannot add edge to the same vertex: {from}"));
            self.diagnostics.push(GraphDiagnostic::SelfLoop {
                key: from.to_string(),
            });
            return;
        }

        if self.graph.find_edge(from_idx, to_idx).is_some() {
            self.logger
                .debug(format_args!("edge from {from} to {to} already exists"));
            return;
        }

        self.graph.add_edge(from_idx, to_idx, ());
        self.logger
            .debug(format_args!("edge added from {from} to {to}"));
    }

    fn drop_edge(&mut self, from: &str, to: &str, missing: &str) {
        self.logger
            .warn(format_args!("vertex {missing} not found, edge {from} -> {to} dropped"));
        self.diagnostics.push(GraphDiagnostic::MissingVertex {
            from: from.to_string(),
            to: to.to_string(),
            missing: missing.to_string(),
        });
    }

    /// Vertices nothing points to. Order across roots is not meaningful.
    #[must_use]
    pub fn vertices_with_no_incoming_edges(&self) -> Vec<Vertex<'_, T>> {
        self.keys
            .values()
            .filter(|&&idx| self.incoming_count_of(idx) == 0)
            .map(|&index| Vertex { graph: self, index })
            .collect()
    }

    #[must_use]
    pub fn vertex(&self, key: &str) -> Option<Vertex<'_, T>> {
        self.keys
            .get(key)
            .map(|&index| Vertex { graph: self, index })
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex<'_, T>> + '_ {
        self.keys
            .values()
            .map(move |&index| Vertex { graph: self, index })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[GraphDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn logger(&self) -> Logger {
        self.logger
    }

    fn incoming_count_of(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .count()
    }

    /// Neighbours in the given direction, ordered by edge insertion.
    fn neighbours(&self, idx: NodeIndex, direction: Direction) -> Vec<Vertex<'_, T>> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| {
                let index = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                Vertex { graph: self, index }
            })
            .collect()
    }
}

/// Borrowed view of one vertex.
pub struct Vertex<'g, T> {
    graph: &'g Graph<T>,
    index: NodeIndex,
}

impl<T> Clone for Vertex<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Vertex<'_, T> {}

impl<'g, T> Vertex<'g, T> {
    #[must_use]
    pub fn key(&self) -> &'g str {
        &self.graph.graph[self.index].key
    }

    #[must_use]
    pub fn value(&self) -> &'g T {
        &self.graph.graph[self.index].value
    }

    /// Targets of this vertex's outgoing edges.
    #[must_use]
    pub fn adjacent(&self) -> Vec<Vertex<'g, T>> {
        self.graph.neighbours(self.index, Direction::Outgoing)
    }

    /// Sources of the edges that end at this vertex.
    #[must_use]
    pub fn incoming(&self) -> Vec<Vertex<'g, T>> {
        self.graph.neighbours(self.index, Direction::Incoming)
    }

    #[must_use]
    pub fn incoming_count(&self) -> usize {
        self.graph.incoming_count_of(self.index)
    }
}

impl<T> fmt::Debug for Vertex<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Vertex").field(&self.key()).finish()
    }
}
