// tests/common/mod.rs
#![allow(dead_code)]

use glam::Vec3;
use mtg_turtle::{EdgeType, FittedStrip, LeafShape, Mtg, NodeId};

/// Node ids of the plant built by [`add_plant`].
pub struct PlantIds {
    pub plant: NodeId,
    pub axis: NodeId,
    pub blade: NodeId,
    pub first_stem: NodeId,
    pub leaf: NodeId,
    pub second_stem: NodeId,
}

/// Midrib whose first segment leans `angle_deg` away from the vertical.
pub fn midrib(angle_deg: f32) -> LeafShape {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    LeafShape::new(
        vec![0.0, sin, 2.0 * sin, 3.0 * sin],
        vec![0.0, cos, 2.0 * cos, 2.5 * cos],
        vec![0.0, 0.33, 0.66, 1.0],
        vec![0.0, 1.0, 0.8, 0.0],
    )
}

/// Fitter stub: a flat two-triangle strip in the local XZ plane spanning the
/// `[s_base, s_top]` window of the visible length.
pub fn strip_fitter(
    _shape: &LeafShape,
    _target_length: f32,
    visible_length: f32,
    s_base: f32,
    s_top: f32,
    target_width: f32,
) -> Option<FittedStrip> {
    let half = target_width / 2.0;
    let (z0, z1) = (s_base * visible_length, s_top * visible_length);
    Some((
        vec![
            Vec3::new(-half, 0.0, z0),
            Vec3::new(half, 0.0, z0),
            Vec3::new(-half, 0.0, z1),
            Vec3::new(half, 0.0, z1),
        ],
        vec![[0, 1, 3], [0, 3, 2]],
    ))
}

/// Adds a plant with two stem elements on one axis and a leaf element
/// branching off the first stem element.
///
/// Axis diameter 2, stem lengths 10 and 5, leaf element length 15 over the whole blade.
pub fn add_plant(g: &mut Mtg) -> PlantIds {
    let plant = g.add_plant("Plant");
    let axis = g.add_component(plant, "StemAxis").unwrap();
    let blade = g.add_component(plant, "Blade").unwrap();

    g.node_mut(axis).unwrap().props.diameter = Some(2.0);
    {
        let props = &mut g.node_mut(blade).unwrap().props;
        props.shape_xysr = Some(midrib(30.0));
        props.shape_mature_length = Some(20.0);
        props.shape_max_width = Some(2.0);
    }

    let first_stem = g.add_component(axis, "StemElement").unwrap();
    g.node_mut(first_stem).unwrap().props.length = Some(10.0);

    let leaf = g
        .add_child(blade, first_stem, "LeafElement", EdgeType::Branch)
        .unwrap();
    {
        let props = &mut g.node_mut(leaf).unwrap().props;
        props.length = Some(15.0);
        props.srb = Some(0.0);
        props.srt = Some(1.0);
    }

    let second_stem = g
        .add_child(axis, first_stem, "StemElement", EdgeType::Successor)
        .unwrap();
    g.node_mut(second_stem).unwrap().props.length = Some(5.0);

    PlantIds {
        plant,
        axis,
        blade,
        first_stem,
        leaf,
        second_stem,
    }
}

pub fn z_range(g: &Mtg, id: NodeId) -> (f32, f32) {
    let geometry = g.node(id).unwrap().geometry.as_ref().unwrap();
    let (lo, hi) = geometry.meshes()[0].bounds().unwrap();
    (lo.z, hi.z)
}
