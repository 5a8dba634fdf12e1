//! A minimal multiscale tree graph (MTG) holding plant topology and organ properties.
//!
//! Nodes live at nested scales. The coarsest scale holds plants, finer scales hold
//! axes, organs and finally the organ elements that receive geometry. Every node
//! below the plant scale points to its *complex*, the enclosing node one scale up,
//! which owns the organ-level attributes shared by its elements.

use crate::mesh::Geometry;
use crate::organ::{LeafShape, OrganClass};
use crate::turtle::Turtle;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// A unique identifier for a graph node. Preserved across sub-graph extraction and union.
pub type NodeId = u32;

/// Aggregation level of a node. Larger values are finer.
pub type Scale = u8;

/// Scale of the plant nodes created by [`Mtg::add_plant`].
pub const PLANT_SCALE: Scale = 1;

/// Contract violations reported by graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MtgError {
    /// No node with this id.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Both graphs of a union hold this id.
    #[error("Node {0} exists in both graphs")]
    IdCollision(NodeId),

    /// The node has a complex or a parent.
    #[error("Node {0} is not a plant root")]
    NotAPlant(NodeId),

    /// Parent and child of a link live at different scales.
    #[error("Cannot link node {child} at scale {child_scale} to parent {parent} at scale {parent_scale}")]
    ScaleMismatch {
        parent: NodeId,
        parent_scale: Scale,
        child: NodeId,
        child_scale: Scale,
    },
}

/// Topological relation between a node and its parent at the same scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    /// Continuation of the same axis (`<`).
    #[default]
    Successor,
    /// Lateral attachment (`+`).
    Branch,
}

/// Attributes read by the interpreter. Unset values have documented defaults
/// that are resolved where they are read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganProperties {
    /// Visible length to mesh. Default 0 (no geometry).
    pub length: Option<f32>,
    /// Hidden length the turtle advances before a stem element. Default 0.
    pub offset: Option<f32>,
    /// Roll applied before a stem element, in degrees. Default 0.
    pub azimuth: Option<f32>,
    /// Pitch for stems (degrees) or insertion multiplier for blades. Default 0.
    pub inclination: Option<f32>,
    /// Stem axis diameter, shared by its elements.
    pub diameter: Option<f32>,
    /// Relative start of a leaf element along the blade. Default 0.
    pub srb: Option<f32>,
    /// Relative top of a leaf element along the blade. Default 1.
    pub srt: Option<f32>,
    /// Blade shape curve.
    pub shape_xysr: Option<LeafShape>,
    /// Length the blade shape is scaled to.
    pub shape_mature_length: Option<f32>,
    /// Width the blade shape is scaled to.
    pub shape_max_width: Option<f32>,
    /// Whether the organ is still green. Not read by the interpreter.
    pub is_green: Option<bool>,
    /// Species name. Not read by the interpreter.
    pub species: Option<String>,
}

/// A single node of the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Organ name; its prefix selects the [`OrganClass`].
    pub label: String,
    /// Aggregation level; plants sit at [`PLANT_SCALE`].
    pub scale: Scale,
    /// Enclosing node one scale coarser.
    pub complex: Option<NodeId>,
    /// Nodes one scale finer enclosed by this one, in insertion order.
    pub components: Vec<NodeId>,
    /// Parent at the same scale.
    pub parent: Option<NodeId>,
    /// Nodes at the same scale attached to this one.
    pub children: Vec<NodeId>,
    /// Relation to `parent`.
    pub edge: EdgeType,
    /// Organ attributes.
    pub props: OrganProperties,
    /// World-space geometry written by the interpreter.
    pub geometry: Option<Geometry>,
    /// Turtle frame the node was interpreted with.
    pub frame: Option<Turtle>,
}

impl Node {
    fn new(label: impl Into<String>, scale: Scale) -> Self {
        Self {
            label: label.into(),
            scale,
            complex: None,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
            edge: EdgeType::default(),
            props: OrganProperties::default(),
            geometry: None,
            frame: None,
        }
    }

    /// Organ class derived from the label.
    pub fn organ(&self) -> OrganClass {
        OrganClass::from_label(&self.label)
    }
}

/// A forest of plants described at several scales.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mtg {
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
}

impl Mtg {
    /// An empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Adds a new plant at the coarsest scale.
    pub fn add_plant(&mut self, label: impl Into<String>) -> NodeId {
        self.insert(Node::new(label, PLANT_SCALE))
    }

    /// Adds a node one scale finer than `complex`, enclosed by it.
    pub fn add_component(
        &mut self,
        complex: NodeId,
        label: impl Into<String>,
    ) -> Result<NodeId, MtgError> {
        let scale = self.get(complex)?.scale + 1;
        let mut node = Node::new(label, scale);
        node.complex = Some(complex);
        let id = self.insert(node);
        self.get_mut(complex)?.components.push(id);
        Ok(id)
    }

    /// Connects two nodes of the same scale.
    pub fn link(&mut self, parent: NodeId, child: NodeId, edge: EdgeType) -> Result<(), MtgError> {
        let parent_scale = self.get(parent)?.scale;
        let child_scale = self.get(child)?.scale;
        if parent_scale != child_scale {
            return Err(MtgError::ScaleMismatch {
                parent,
                parent_scale,
                child,
                child_scale,
            });
        }
        let node = self.get_mut(child)?;
        node.parent = Some(parent);
        node.edge = edge;
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Adds a component of `complex` and links it under `parent`.
    pub fn add_child(
        &mut self,
        complex: NodeId,
        parent: NodeId,
        label: impl Into<String>,
        edge: EdgeType,
    ) -> Result<NodeId, MtgError> {
        self.get(parent)?;
        let id = self.add_component(complex, label)?;
        self.link(parent, id, edge)?;
        Ok(id)
    }

    fn get(&self, id: NodeId) -> Result<&Node, MtgError> {
        self.nodes.get(&id).ok_or(MtgError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, MtgError> {
        self.nodes.get_mut(&id).ok_or(MtgError::UnknownNode(id))
    }

    /// The node with this id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access to the node with this id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// The enclosing node of `id`, if any.
    pub fn complex_of(&self, id: NodeId) -> Option<&Node> {
        self.node(id)?.complex.and_then(|c| self.node(c))
    }

    /// Number of nodes at all scales.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Finest scale present, or [`PLANT_SCALE`] for an empty graph.
    pub fn max_scale(&self) -> Scale {
        self.nodes.values().map(|n| n.scale).max().unwrap_or(PLANT_SCALE)
    }

    /// Roots of the forest at the coarsest scale, in id order.
    pub fn plant_roots(&self) -> Vec<NodeId> {
        let Some(coarsest) = self.nodes.values().map(|n| n.scale).min() else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .filter(|(_, n)| n.scale == coarsest && n.complex.is_none() && n.parent.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Nodes at `scale` enclosed (transitively) by `id`, in component order.
    ///
    /// A node already at `scale` yields itself.
    pub fn components_at_scale(&self, id: NodeId, scale: Scale) -> Result<Vec<NodeId>, MtgError> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.get(current)?;
            if node.scale == scale {
                found.push(current);
            } else if node.scale < scale {
                stack.extend(node.components.iter().rev());
            }
        }
        Ok(found)
    }

    /// Components of `id` at `scale` whose parent lies outside `id`.
    ///
    /// These are the starting points of a walk over the finer scale.
    pub fn component_roots_at_scale(
        &self,
        id: NodeId,
        scale: Scale,
    ) -> Result<Vec<NodeId>, MtgError> {
        let components = self.components_at_scale(id, scale)?;
        let inside: BTreeSet<NodeId> = components.iter().copied().collect();
        Ok(components
            .into_iter()
            .filter(|c| {
                self.nodes
                    .get(c)
                    .and_then(|n| n.parent)
                    .is_none_or(|p| !inside.contains(&p))
            })
            .collect())
    }

    /// Extracts the sub-graph of one plant: the plant, everything it encloses and
    /// everything reachable from those nodes at their own scale. Node ids are kept.
    pub fn sub_mtg(&self, plant: NodeId) -> Result<Mtg, MtgError> {
        let root = self.get(plant)?;
        if root.complex.is_some() || root.parent.is_some() {
            return Err(MtgError::NotAPlant(plant));
        }

        let mut nodes = BTreeMap::new();
        let mut stack = vec![plant];
        while let Some(id) = stack.pop() {
            if nodes.contains_key(&id) {
                continue;
            }
            let node = self.get(id)?;
            stack.extend(node.components.iter().copied());
            stack.extend(node.children.iter().copied());
            nodes.insert(id, node.clone());
        }

        // Drop links leaving the extracted set.
        let kept: BTreeSet<NodeId> = nodes.keys().copied().collect();
        for node in nodes.values_mut() {
            if node.parent.is_some_and(|p| !kept.contains(&p)) {
                node.parent = None;
            }
            if node.complex.is_some_and(|c| !kept.contains(&c)) {
                node.complex = None;
            }
        }

        Ok(Mtg {
            nodes,
            next_id: self.next_id,
        })
    }

    /// Merges two graphs with disjoint node ids.
    pub fn union(mut self, other: Mtg) -> Result<Mtg, MtgError> {
        if let Some(id) = other.nodes.keys().find(|id| self.nodes.contains_key(id)) {
            return Err(MtgError::IdCollision(*id));
        }
        self.next_id = self.next_id.max(other.next_id);
        self.nodes.extend(other.nodes);
        Ok(self)
    }

    /// Nodes carrying geometry, in id order.
    pub fn geometries(&self) -> impl Iterator<Item = (NodeId, &Geometry)> {
        self.nodes
            .iter()
            .filter_map(|(id, n)| n.geometry.as_ref().map(|g| (*id, g)))
    }
}
