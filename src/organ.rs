//! Organ classification and procedural mesh synthesis for organ elements.

use crate::interpreter::{InterpreterConfig, LeafInclination};
use crate::mesh::TriangleMesh;
use crate::mtg::{Mtg, NodeId};
use glam::{Vec2, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::f32::consts::{PI, TAU};

/// Botanical class of a graph node, derived from its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganClass {
    /// `Stem…` elements: tapered cylinders that move the turtle.
    Stem,
    /// `Leaf…` elements: blade segments read off the current frame.
    Leaf,
    /// Anything else. Never receives geometry.
    Other,
}

impl OrganClass {
    /// Classifies a node label by its `Stem`/`Leaf` prefix.
    pub fn from_label(label: &str) -> Self {
        if label.starts_with("Stem") {
            Self::Stem
        } else if label.starts_with("Leaf") {
            Self::Leaf
        } else {
            Self::Other
        }
    }
}

/// Stem meshing fidelity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StemMode {
    /// Six-vertex, eight-face frustum. Constant cost per element.
    #[default]
    Slim,
    /// Closed tapered solid of revolution.
    Classic,
}

/// Normalized leaf blade profile: midrib coordinates `(x, y)`, curvilinear
/// abscissa `s` and relative width `r`, as parallel sequences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafShape {
    /// Midrib abscissas.
    pub x: Vec<f32>,
    /// Midrib ordinates.
    pub y: Vec<f32>,
    /// Normalized curvilinear position along the midrib.
    pub s: Vec<f32>,
    /// Relative blade width at each point.
    pub r: Vec<f32>,
}

impl LeafShape {
    /// Builds a shape from its four parallel sequences.
    pub fn new(x: Vec<f32>, y: Vec<f32>, s: Vec<f32>, r: Vec<f32>) -> Self {
        Self { x, y, s, r }
    }

    /// Number of midrib points.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    /// Whether the midrib has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn point(&self, i: usize) -> Option<Vec2> {
        Some(Vec2::new(*self.x.get(i)?, *self.y.get(i)?))
    }

    /// Angle in radians between the first midrib segment and the vertical.
    ///
    /// `None` when the midrib has fewer than two points or a zero-length first segment.
    pub fn insertion_angle(&self) -> Option<f32> {
        let segment = self.point(1)? - self.point(0)?;
        let norm = segment.length();
        if norm == 0.0 {
            return None;
        }
        Some((segment.dot(Vec2::Y) / norm).clamp(-1.0, 1.0).acos())
    }
}

/// Rotates a leaf shape about its base so that its insertion angle becomes the target.
///
/// With `relative_angle`, `inclination` multiplies the natural insertion angle and the
/// target is capped at π. Otherwise `inclination` is the target angle in degrees.
/// Shapes without a usable first segment are returned unchanged.
pub fn incline_leaf(shape: &LeafShape, inclination: f32, relative_angle: bool) -> LeafShape {
    let (Some(init_angle), Some(base)) = (shape.insertion_angle(), shape.point(0)) else {
        return shape.clone();
    };

    let angle = if relative_angle {
        (inclination * init_angle).min(PI)
    } else {
        inclination.to_radians()
    };
    let rotation = Vec2::from_angle(init_angle - angle);

    let (x, y) = (0..shape.len())
        .filter_map(|i| shape.point(i))
        .map(|p| base + rotation.rotate(p - base))
        .map(|p| (p.x, p.y))
        .unzip();

    LeafShape {
        x,
        y,
        s: shape.s.clone(),
        r: shape.r.clone(),
    }
}

/// Raw output of a leaf shape fit: vertex positions and triangle indices.
pub type FittedStrip = (Vec<Vec3>, Vec<[u32; 3]>);

/// Turns a normalized leaf shape into a triangulated strip for one blade segment.
///
/// Arguments are the shape, the length and width the shape is scaled to, the visible
/// blade length, and the `[s_base, s_top]` window of relative positions to mesh.
/// Returns `None` when the window has no representable geometry.
pub trait ShapeFitter {
    /// Fits `shape` over the `[s_base, s_top]` window.
    fn fit(
        &self,
        shape: &LeafShape,
        target_length: f32,
        visible_length: f32,
        s_base: f32,
        s_top: f32,
        target_width: f32,
    ) -> Option<FittedStrip>;
}

impl<F> ShapeFitter for F
where
    F: Fn(&LeafShape, f32, f32, f32, f32, f32) -> Option<FittedStrip>,
{
    fn fit(
        &self,
        shape: &LeafShape,
        target_length: f32,
        visible_length: f32,
        s_base: f32,
        s_top: f32,
        target_width: f32,
    ) -> Option<FittedStrip> {
        self(
            shape,
            target_length,
            visible_length,
            s_base,
            s_top,
            target_width,
        )
    }
}

/// Low-cost frustum: three vertices per ring, the top ring turned by half a turn.
pub fn slim_cylinder(length: f32, radius_base: f32, radius_top: f32) -> TriangleMesh {
    let angles = [0.0, TAU / 3.0, 2.0 * TAU / 3.0];
    let ring = |radius: f32, turn: f32, z: f32| {
        angles.map(|a| Vec3::new(radius * (a + turn).cos(), radius * (a + turn).sin(), z))
    };

    let mut vertices = ring(radius_base, 0.0, 0.0).to_vec();
    vertices.extend(ring(radius_top, PI, length));

    TriangleMesh::new(
        vertices,
        vec![
            [2, 1, 0],
            [3, 4, 5],
            [0, 5, 4],
            [0, 4, 2],
            [2, 4, 3],
            [3, 1, 2],
            [1, 3, 5],
            [5, 0, 1],
        ],
    )
}

/// Closed tapered cylinder with `slices` radial subdivisions, at least 3.
///
/// Vertices are the base ring, the top ring, then the base and top centres.
pub fn tapered_cylinder(
    length: f32,
    radius_base: f32,
    radius_top: f32,
    slices: u32,
) -> TriangleMesh {
    let n = slices.max(3);
    let mut vertices = Vec::with_capacity(2 * n as usize + 2);
    for (radius, z) in [(radius_base, 0.0), (radius_top, length)] {
        vertices.extend((0..n).map(|i| {
            let a = TAU * i as f32 / n as f32;
            Vec3::new(radius * a.cos(), radius * a.sin(), z)
        }));
    }
    vertices.push(Vec3::ZERO);
    vertices.push(Vec3::new(0.0, 0.0, length));

    let (base_centre, top_centre) = (2 * n, 2 * n + 1);
    let mut faces = Vec::with_capacity(4 * n as usize);
    for i in 0..n {
        let j = (i + 1) % n;
        let (bi, bj, ti, tj) = (i, j, n + i, n + j);
        faces.push([bi, bj, tj]);
        faces.push([bi, tj, ti]);
        faces.push([base_centre, bj, bi]);
        faces.push([top_centre, ti, tj]);
    }

    TriangleMesh::new(vertices, faces)
}

/// Mesh for a stem element of length `length` along `+Z`.
pub fn stem_element_mesh(
    length: f32,
    diameter_base: f32,
    diameter_top: f32,
    mode: StemMode,
    slices: u32,
) -> TriangleMesh {
    match mode {
        StemMode::Slim => slim_cylinder(length, diameter_base / 2.0, diameter_top / 2.0),
        StemMode::Classic => {
            tapered_cylinder(length, diameter_base / 2.0, diameter_top / 2.0, slices)
        }
    }
}

/// Mesh for the `[s_base, s_top]` segment of a leaf blade.
///
/// Fits yielding fewer than two triangles are treated as too small to show.
pub fn leaf_element_mesh(
    fitter: &impl ShapeFitter,
    shape: &LeafShape,
    shape_length: f32,
    shape_width: f32,
    length: f32,
    s_base: f32,
    s_top: f32,
) -> Option<TriangleMesh> {
    let (points, indices) = fitter.fit(shape, shape_length, length, s_base, s_top, shape_width)?;
    if indices.len() < 2 {
        return None;
    }
    Some(TriangleMesh::new(points, indices))
}

/// Computes the organ-local mesh of an element node.
///
/// Shared shape attributes are read from the node's complex. Missing data yields `None`.
pub fn compute_element(
    g: &Mtg,
    id: NodeId,
    config: &InterpreterConfig,
    fitter: &impl ShapeFitter,
) -> Option<TriangleMesh> {
    let node = g.node(id)?;
    let length = node.props.length.unwrap_or(0.0);

    match node.organ() {
        OrganClass::Leaf => {
            let blade = g.complex_of(id)?;
            let Some(shape) = blade.props.shape_xysr.as_ref() else {
                debug!(node = id; "Leaf element without blade shape");
                return None;
            };
            let inclination = blade.props.inclination.unwrap_or(0.0);
            let shape = match config.leaf_inclination {
                LeafInclination::Rotate if inclination > 0.0 => Cow::Owned(incline_leaf(
                    shape,
                    inclination,
                    config.relative_leaf_angle,
                )),
                _ => Cow::Borrowed(shape),
            };
            leaf_element_mesh(
                fitter,
                &shape,
                blade.props.shape_mature_length?,
                blade.props.shape_max_width?,
                length,
                node.props.srb.unwrap_or(0.0),
                node.props.srt.unwrap_or(1.0),
            )
        }
        OrganClass::Stem => {
            // Base and top share the axis diameter; elements are not tapered.
            let Some(diameter) = g.complex_of(id).and_then(|stem| stem.props.diameter) else {
                debug!(node = id; "Stem element without diameter");
                return None;
            };
            Some(stem_element_mesh(
                length,
                diameter,
                diameter,
                config.stem_mode,
                config.stem_slices,
            ))
        }
        OrganClass::Other => None,
    }
}
