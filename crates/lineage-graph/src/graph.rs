//! Vertex/edge storage with per-element property payloads.
//!
//! # Overview
//!
//! [`PropertyGraph`] owns a set of vertices and a set of directed edges.
//! Each vertex carries a `V` payload and each edge an `E` payload. Between
//! any ordered pair of vertices there is at most one edge, and self-loops
//! are never created.
//!
//! ## Orientation
//!
//! The graph carries an [`Orientation`] fixed at construction. It decides
//! which end of an edge is closer to a *root*:
//!
//! | Orientation     | edge `u → v` means   | roots have no… | leaves have no… |
//! |-----------------|----------------------|----------------|-----------------|
//! | `ParentToChild` | `v` derives from `u` | inbound edges  | outbound edges  |
//! | `ChildToParent` | `u` derives from `v` | outbound edges | inbound edges   |
//!
//! [`Adjacency::TowardRoot`] and [`Adjacency::TowardLeaf`] resolve through
//! the orientation so callers never need to care which way edges point.
//!
//! ## Ids
//!
//! Storage is a petgraph `StableDiGraph`, so removing a vertex or edge never
//! shifts the ids of the others. Petgraph hands a freed slot to the next
//! insertion, so a [`VertexId`] also carries the generation of its slot.
//! Removing a vertex bumps that generation, and every lookup through a
//! stale id then misses instead of reaching the slot's new occupant.
//!
//! ## Determinism
//!
//! Every adjacency query returns vertices sorted by id. All algorithms built
//! on top inherit that order, so results do not depend on insertion history.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Handle to a vertex of a [`PropertyGraph`].
///
/// Ordering follows the slot index, so live vertices sort by insertion
/// slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId {
    pub(crate) slot: NodeIndex,
    generation: u32,
}

impl VertexId {
    /// Raw slot index of this vertex.
    #[must_use]
    pub fn index(self) -> usize {
        self.slot.index()
    }

    /// How many times the slot was vacated before this id was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "v{}", self.slot.index())
        } else {
            write!(f, "v{}.{}", self.slot.index(), self.generation)
        }
    }
}

/// Handle to an edge of a [`PropertyGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) EdgeIndex);

impl EdgeId {
    /// Raw slot index of this edge.
    #[must_use]
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0.index())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0.index())
    }
}

// ---------------------------------------------------------------------------
// Orientation / adjacency selectors
// ---------------------------------------------------------------------------

/// Which way edges point relative to the derivation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Edges point from the parent (older) vertex to the child (derived) one.
    #[default]
    ParentToChild,
    /// Edges point from the child (derived) vertex to its parent.
    ChildToParent,
}

impl Orientation {
    /// Edge direction leading toward the roots.
    #[must_use]
    pub const fn toward_root(self) -> Direction {
        match self {
            Self::ParentToChild => Direction::Incoming,
            Self::ChildToParent => Direction::Outgoing,
        }
    }

    /// Edge direction leading toward the leaves.
    #[must_use]
    pub const fn toward_leaf(self) -> Direction {
        match self {
            Self::ParentToChild => Direction::Outgoing,
            Self::ChildToParent => Direction::Incoming,
        }
    }
}

/// Selects which neighbours of a vertex an adjacency query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// Vertices with an edge pointing at the queried vertex.
    Inbound,
    /// Vertices the queried vertex points at.
    Outbound,
    /// Neighbours one step closer to the roots.
    TowardRoot,
    /// Neighbours one step closer to the leaves.
    TowardLeaf,
    /// Both directions.
    All,
}

impl Adjacency {
    /// The selector walking the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Inbound => Self::Outbound,
            Self::Outbound => Self::Inbound,
            Self::TowardRoot => Self::TowardLeaf,
            Self::TowardLeaf => Self::TowardRoot,
            Self::All => Self::All,
        }
    }

    /// Petgraph direction for this selector, `None` meaning both.
    #[must_use]
    pub const fn resolve(self, orientation: Orientation) -> Option<Direction> {
        match self {
            Self::Inbound => Some(Direction::Incoming),
            Self::Outbound => Some(Direction::Outgoing),
            Self::TowardRoot => Some(orientation.toward_root()),
            Self::TowardLeaf => Some(orientation.toward_leaf()),
            Self::All => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyGraph
// ---------------------------------------------------------------------------

/// Directed graph with a `V` payload per vertex and an `E` payload per edge.
#[derive(Debug, Clone)]
pub struct PropertyGraph<V, E> {
    pub(crate) inner: StableDiGraph<V, E>,
    /// Current generation per slot. Slots past the end are at generation 0.
    generations: Vec<u32>,
    orientation: Orientation,
}

impl<V, E> Default for PropertyGraph<V, E> {
    fn default() -> Self {
        Self::new(Orientation::default())
    }
}

impl<V, E> PropertyGraph<V, E> {
    /// Create an empty graph.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            inner: StableDiGraph::default(),
            generations: Vec::new(),
            orientation,
        }
    }

    /// Rebuild a graph around `inner`, whose slots match `self`'s.
    pub(crate) fn with_inner<V2, E2>(&self, inner: StableDiGraph<V2, E2>) -> PropertyGraph<V2, E2> {
        PropertyGraph {
            inner,
            generations: self.generations.clone(),
            orientation: self.orientation,
        }
    }

    /// Id of the vertex currently living in `slot`.
    pub(crate) fn vertex_id(&self, slot: NodeIndex) -> VertexId {
        VertexId {
            slot,
            generation: self.generations.get(slot.index()).copied().unwrap_or(0),
        }
    }

    /// Slot of `v`, if `v` is still the vertex living there.
    pub(crate) fn live_slot(&self, v: VertexId) -> Option<NodeIndex> {
        (self.inner.contains_node(v.slot) && self.vertex_id(v.slot) == v).then_some(v.slot)
    }

    /// The orientation this graph was created with.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Remove every vertex and edge. The orientation is kept and every
    /// previously issued id goes stale.
    pub fn clear(&mut self) {
        for slot in self.inner.node_indices().collect::<Vec<_>>() {
            self.retire(slot);
        }
        self.inner.clear();
    }

    fn retire(&mut self, slot: NodeIndex) {
        let i = slot.index();
        if self.generations.len() <= i {
            self.generations.resize(i + 1, 0);
        }
        self.generations[i] = self.generations[i].wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Vertices
    // -----------------------------------------------------------------------

    /// Insert a vertex with default properties.
    pub fn add_vertex(&mut self) -> VertexId
    where
        V: Default,
    {
        self.add_vertex_with(V::default())
    }

    /// Insert a vertex carrying `props`.
    pub fn add_vertex_with(&mut self, props: V) -> VertexId {
        let slot = self.inner.add_node(props);
        self.vertex_id(slot)
    }

    /// Remove a vertex and every incident edge, returning its properties.
    ///
    /// The id of every other vertex stays valid. `v` itself goes stale and
    /// is never issued again.
    pub fn remove_vertex(&mut self, v: VertexId) -> Option<V> {
        let slot = self.live_slot(v)?;
        let props = self.inner.remove_node(slot)?;
        self.retire(slot);
        Some(props)
    }

    #[must_use]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.live_slot(v).is_some()
    }

    /// All vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.inner.node_indices().map(|slot| self.vertex_id(slot))
    }

    #[must_use]
    pub fn properties(&self, v: VertexId) -> Option<&V> {
        self.inner.node_weight(self.live_slot(v)?)
    }

    pub fn properties_mut(&mut self, v: VertexId) -> Option<&mut V> {
        let slot = self.live_slot(v)?;
        self.inner.node_weight_mut(slot)
    }

    /// Replace the properties of `v`.
    ///
    /// # Errors
    ///
    /// [`GraphError::VertexNotFound`] if `v` is not in the graph.
    pub fn set_properties(&mut self, v: VertexId, props: V) -> Result<(), GraphError> {
        let slot = self
            .properties_mut(v)
            .ok_or(GraphError::VertexNotFound(v))?;
        *slot = props;
        Ok(())
    }

    /// First vertex (by id) whose properties satisfy `pred`.
    pub fn find_vertex_by<F>(&self, mut pred: F) -> Option<VertexId>
    where
        F: FnMut(&V) -> bool,
    {
        self.inner
            .node_indices()
            .find(|&idx| self.inner.node_weight(idx).is_some_and(&mut pred))
            .map(|slot| self.vertex_id(slot))
    }

    /// First vertex (by id) whose properties compare equal to `key`.
    ///
    /// Linear in the number of vertices.
    pub fn find_vertex_by_properties<K>(&self, key: &K) -> Option<VertexId>
    where
        K: ?Sized,
        V: PartialEq<K>,
    {
        self.find_vertex_by(|props| props == key)
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Connect `u → v`, returning the edge.
    ///
    /// Returns the existing edge if the pair is already connected. Returns
    /// `None` (and logs) for self-loops and unknown vertices.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Option<EdgeId>
    where
        E: Default,
    {
        if u == v {
            warn!(vertex = %u, "refusing to add a self-loop");
            return None;
        }
        let (Some(from), Some(to)) = (self.live_slot(u), self.live_slot(v)) else {
            warn!(source = %u, target = %v, "refusing to add an edge to an unknown vertex");
            return None;
        };
        if let Some(existing) = self.inner.find_edge(from, to) {
            return Some(EdgeId(existing));
        }
        Some(EdgeId(self.inner.add_edge(from, to, E::default())))
    }

    /// The edge `u → v`, if present.
    #[must_use]
    pub fn edge(&self, u: VertexId, v: VertexId) -> Option<EdgeId> {
        self.inner
            .find_edge(self.live_slot(u)?, self.live_slot(v)?)
            .map(EdgeId)
    }

    #[must_use]
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.edge(u, v).is_some()
    }

    #[must_use]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.inner.edge_endpoints(e.0).is_some()
    }

    /// Remove an edge, returning its properties.
    pub fn remove_edge(&mut self, e: EdgeId) -> Option<E> {
        self.inner.remove_edge(e.0)
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.inner.edge_indices().map(EdgeId)
    }

    /// `(source, target)` of an edge.
    #[must_use]
    pub fn endpoints(&self, e: EdgeId) -> Option<(VertexId, VertexId)> {
        self.inner
            .edge_endpoints(e.0)
            .map(|(s, t)| (self.vertex_id(s), self.vertex_id(t)))
    }

    #[must_use]
    pub fn source(&self, e: EdgeId) -> Option<VertexId> {
        self.endpoints(e).map(|(s, _)| s)
    }

    #[must_use]
    pub fn target(&self, e: EdgeId) -> Option<VertexId> {
        self.endpoints(e).map(|(_, t)| t)
    }

    #[must_use]
    pub fn edge_properties(&self, e: EdgeId) -> Option<&E> {
        self.inner.edge_weight(e.0)
    }

    pub fn edge_properties_mut(&mut self, e: EdgeId) -> Option<&mut E> {
        self.inner.edge_weight_mut(e.0)
    }

    /// Replace the properties of `e`.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] if `e` is not in the graph.
    pub fn set_edge_properties(&mut self, e: EdgeId, props: E) -> Result<(), GraphError> {
        let slot = self
            .inner
            .edge_weight_mut(e.0)
            .ok_or(GraphError::EdgeNotFound(e))?;
        *slot = props;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Degree / adjacency
    // -----------------------------------------------------------------------

    /// Number of neighbours of `v` in `dir`, zero for a stale id.
    fn degree(&self, v: VertexId, dir: Direction) -> usize {
        self.live_slot(v)
            .map_or(0, |slot| self.inner.neighbors_directed(slot, dir).count())
    }

    #[must_use]
    pub fn in_degree(&self, v: VertexId) -> usize {
        self.degree(v, Direction::Incoming)
    }

    #[must_use]
    pub fn out_degree(&self, v: VertexId) -> usize {
        self.degree(v, Direction::Outgoing)
    }

    /// Neighbours of `v` selected by `adjacency`, sorted by id, no duplicates.
    #[must_use]
    pub fn adjacent_vertices(&self, v: VertexId, adjacency: Adjacency) -> Vec<VertexId> {
        let Some(slot) = self.live_slot(v) else {
            return Vec::new();
        };
        let mut out: Vec<VertexId> = match adjacency.resolve(self.orientation) {
            Some(dir) => self
                .inner
                .neighbors_directed(slot, dir)
                .map(|n| self.vertex_id(n))
                .collect(),
            None => self
                .inner
                .neighbors_directed(slot, Direction::Outgoing)
                .chain(self.inner.neighbors_directed(slot, Direction::Incoming))
                .map(|n| self.vertex_id(n))
                .collect(),
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Edges incident to `v` selected by `adjacency`, sorted by the id of the
    /// vertex at the other end.
    #[must_use]
    pub fn edges_of(&self, v: VertexId, adjacency: Adjacency) -> Vec<EdgeId> {
        let Some(slot) = self.live_slot(v) else {
            return Vec::new();
        };
        let dirs: &[Direction] = match adjacency.resolve(self.orientation) {
            Some(Direction::Outgoing) => &[Direction::Outgoing],
            Some(Direction::Incoming) => &[Direction::Incoming],
            None => &[Direction::Outgoing, Direction::Incoming],
        };
        let mut keyed: Vec<(VertexId, EdgeId)> = dirs
            .iter()
            .flat_map(|&dir| self.inner.edges_directed(slot, dir).map(|e| e.id()))
            .filter_map(|idx| {
                let (s, t) = self.inner.edge_endpoints(idx)?;
                let other = if s == slot { t } else { s };
                Some((self.vertex_id(other), EdgeId(idx)))
            })
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, e)| e).collect()
    }

    /// `true` if `v` has no neighbour toward the roots.
    #[must_use]
    pub fn is_root(&self, v: VertexId) -> bool {
        self.degree(v, self.orientation.toward_root()) == 0
    }

    /// `true` if `v` has no neighbour toward the leaves.
    #[must_use]
    pub fn is_leaf(&self, v: VertexId) -> bool {
        self.degree(v, self.orientation.toward_leaf()) == 0
    }

    /// All roots in ascending id order.
    #[must_use]
    pub fn roots(&self) -> Vec<VertexId> {
        self.vertices().filter(|&v| self.is_root(v)).collect()
    }

    /// All leaves in ascending id order.
    #[must_use]
    pub fn leaves(&self) -> Vec<VertexId> {
        self.vertices().filter(|&v| self.is_leaf(v)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
