//! Turtle interpretation of an [`Mtg`] into world-space organ meshes.
//!
//! The entry point is [`MtgInterpreter`]. Configure it with an [`InterpreterConfig`]
//! and a [`ShapeFitter`] for leaf blades, optionally place plants with
//! [`MtgInterpreter::with_plant_position`], then call [`MtgInterpreter::interpret`].

use crate::mesh::{Geometry, TriangleMesh, transform_to_frame};
use crate::mtg::{Mtg, MtgError, NodeId};
use crate::organ::{OrganClass, ShapeFitter, StemMode, compute_element};
use crate::turtle::Turtle;
use glam::Vec3;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a blade's `inclination` is applied to its shape curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafInclination {
    /// Leaf elements are meshed from the rotated curve.
    #[default]
    Rotate,
    /// The curve is used as stored, whatever the inclination.
    Ignore,
}

/// Configuration for geometric interpretation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Stem meshing fidelity. Default: [`StemMode::Slim`].
    pub stem_mode: StemMode,
    /// Radial slices of [`StemMode::Classic`] stems. Default: 3.
    /// Values below 3 are raised to 3.
    pub stem_slices: u32,
    /// Whether blade inclinations multiply the natural insertion angle
    /// instead of giving it in degrees. Default: `true`.
    pub relative_leaf_angle: bool,
    /// Whether blade inclinations rotate the shape curve. Default: [`LeafInclination::Rotate`].
    pub leaf_inclination: LeafInclination,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            stem_mode: StemMode::Slim,
            stem_slices: 3,
            relative_leaf_angle: true,
            leaf_inclination: LeafInclination::Rotate,
        }
    }
}

/// Walks every plant of a graph with a turtle and attaches organ geometry.
pub struct MtgInterpreter<F> {
    config: InterpreterConfig,
    fitter: F,
    positions: HashMap<NodeId, Vec3>,
}

impl<F: ShapeFitter> MtgInterpreter<F> {
    /// Creates an interpreter. Every plant starts at the origin until placed.
    pub fn new(config: InterpreterConfig, fitter: F) -> Self {
        Self {
            config,
            fitter,
            positions: HashMap::new(),
        }
    }

    /// Sets the position the turtle of `plant` starts from (builder pattern).
    pub fn with_plant_position(mut self, plant: NodeId, position: Vec3) -> Self {
        self.positions.insert(plant, position);
        self
    }

    /// The configuration this interpreter was built with.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Organ-local mesh of one element, before any turtle transform.
    pub fn compute_element(&self, g: &Mtg, id: NodeId) -> Option<TriangleMesh> {
        compute_element(g, id, &self.config, &self.fitter)
    }

    /// Interprets one node and updates the turtle.
    ///
    /// 1. Stem elements roll by their axis `azimuth`, pitch by its `inclination`
    ///    (both degrees) and skip their hidden `offset`.
    /// 2. Nodes with a positive `length` get their mesh placed at the turtle frame.
    /// 3. The turtle is tagged with the node and its frame recorded on the node.
    /// 4. Stem elements advance the turtle by their `length`.
    ///
    /// Leaf elements leave the turtle untouched.
    pub fn visit_node(&self, g: &mut Mtg, id: NodeId, turtle: &mut Turtle) {
        let Some(node) = g.node(id) else {
            return;
        };
        let organ = node.organ();
        let length = node.props.length.unwrap_or(0.0);

        if organ == OrganClass::Stem {
            let (azimuth, inclination) = g
                .complex_of(id)
                .map(|axis| {
                    (
                        axis.props.azimuth.unwrap_or(0.0),
                        axis.props.inclination.unwrap_or(0.0),
                    )
                })
                .unwrap_or_default();
            turtle.roll_left(azimuth.to_radians());
            turtle.pitch_up(inclination.to_radians());
            let offset = node.props.offset.unwrap_or(0.0);
            if offset > 0.0 {
                turtle.forward(offset);
            }
        }

        let geometry = if length > 0.0 {
            self.compute_element(g, id)
                .map(|mesh| transform_to_frame(turtle, &mesh))
        } else {
            None
        };

        turtle.set_id(id);
        if let Some(node) = g.node_mut(id) {
            if let Some(mesh) = geometry {
                trace!(node = id, faces = mesh.face_count(); "Attached geometry");
                node.geometry = Some(Geometry::Mesh(mesh));
            }
            node.frame = Some(turtle.clone());
        }

        if organ == OrganClass::Stem && length > 0.0 {
            turtle.forward(length);
        }
    }

    /// Walks one plant of `g` in parent-before-children order, starting from a
    /// fresh turtle at the plant position. Returns the number of visited nodes.
    pub fn interpret_plant(&self, g: &mut Mtg, plant: NodeId) -> Result<usize, MtgError> {
        let origin = self.positions.get(&plant).copied().unwrap_or(Vec3::ZERO);
        let roots = g.component_roots_at_scale(plant, g.max_scale())?;

        // Each child resumes from the turtle its parent left behind.
        let mut stack: Vec<(NodeId, Turtle)> = roots
            .into_iter()
            .rev()
            .map(|root| (root, Turtle::at(origin)))
            .collect();
        let mut visited = 0;

        while let Some((id, mut turtle)) = stack.pop() {
            self.visit_node(g, id, &mut turtle);
            visited += 1;
            if let Some(node) = g.node(id) {
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|&child| (child, turtle.clone())),
                );
            }
        }

        Ok(visited)
    }

    /// Interprets every plant of `g` and merges the results into a new graph.
    ///
    /// Plants are extracted, walked independently and united; node ids are
    /// preserved, so the output holds exactly the nodes of `g`.
    pub fn interpret(&self, g: &Mtg) -> Result<Mtg, MtgError> {
        let plants = g.plant_roots();
        let mut merged = Mtg::new();

        for &plant in &plants {
            let mut gplant = g.sub_mtg(plant)?;
            let visited = self.interpret_plant(&mut gplant, plant)?;
            debug!(plant, visited; "Interpreted plant");
            merged = merged.union(gplant)?;
        }

        info!(
            plants = plants.len(),
            nodes = merged.len(),
            geometries = merged.geometries().count();
            "Interpretation complete"
        );
        Ok(merged)
    }
}
