// tests/stand_merge.rs
mod common;

use common::{add_plant, strip_fitter, z_range};
use glam::Vec3;
use mtg_turtle::{EdgeType, FittedStrip, InterpreterConfig, LeafShape, Mtg, MtgError, MtgInterpreter};

type Fitter = fn(&LeafShape, f32, f32, f32, f32, f32) -> Option<FittedStrip>;

fn interpreter() -> MtgInterpreter<Fitter> {
    MtgInterpreter::new(InterpreterConfig::default(), strip_fitter as Fitter)
}

#[test]
fn test_plant_roots_and_scales() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);
    let b = add_plant(&mut g);

    assert_eq!(g.plant_roots(), vec![a.plant, b.plant]);
    assert_eq!(g.max_scale(), 3);
    assert_eq!(
        g.component_roots_at_scale(a.plant, 3).unwrap(),
        vec![a.first_stem]
    );
    assert_eq!(
        g.components_at_scale(a.plant, 3).unwrap(),
        vec![a.first_stem, a.second_stem, a.leaf]
    );
    assert_eq!(g.complex_of(b.leaf).unwrap().label, "Blade");
}

#[test]
fn test_merge_preserves_nodes_and_geometry() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);
    let b = add_plant(&mut g);

    let first = g.sub_mtg(a.plant).unwrap();
    let second = g.sub_mtg(b.plant).unwrap();
    assert_eq!(first.len() + second.len(), g.len());

    let out = interpreter().interpret(&g).unwrap();
    assert_eq!(out.len(), first.len() + second.len());
    for (id, node) in g.nodes() {
        assert_eq!(out.node(id).unwrap().label, node.label);
    }
    for ids in [&a, &b] {
        for id in [ids.first_stem, ids.second_stem, ids.leaf] {
            assert!(out.node(id).unwrap().geometry.is_some());
        }
    }

    // Independent turtles: both plants start from the origin.
    assert_eq!(z_range(&out, a.second_stem), z_range(&out, b.second_stem));
}

#[test]
fn test_plant_positions() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);
    let b = add_plant(&mut g);

    let out = interpreter()
        .with_plant_position(b.plant, Vec3::new(100.0, 0.0, 0.0))
        .interpret(&g)
        .unwrap();

    let frame_a = out.node(a.first_stem).unwrap().frame.clone().unwrap();
    let frame_b = out.node(b.first_stem).unwrap().frame.clone().unwrap();
    assert_eq!(frame_a.position, Vec3::ZERO);
    assert_eq!(frame_b.position, Vec3::new(100.0, 0.0, 0.0));

    let mesh = &out.node(b.leaf).unwrap().geometry.as_ref().unwrap().meshes()[0];
    let (lo, hi) = mesh.bounds().unwrap();
    assert_eq!((lo.x, hi.x), (99.0, 101.0));
}

#[test]
fn test_union_rejects_id_collisions() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);

    let first = g.sub_mtg(a.plant).unwrap();
    let again = g.sub_mtg(a.plant).unwrap();
    assert_eq!(first.union(again), Err(MtgError::IdCollision(a.plant)));
}

#[test]
fn test_sub_mtg_requires_plant_root() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);

    assert_eq!(g.sub_mtg(a.axis), Err(MtgError::NotAPlant(a.axis)));
    assert_eq!(g.sub_mtg(999), Err(MtgError::UnknownNode(999)));
}

#[test]
fn test_empty_graph() {
    let out = interpreter().interpret(&Mtg::new()).unwrap();
    assert!(out.is_empty());
    assert!(Mtg::new().plant_roots().is_empty());
}

#[test]
fn test_link_requires_same_scale() {
    let mut g = Mtg::new();
    let a = add_plant(&mut g);

    let err = g.link(a.axis, a.leaf, EdgeType::Branch).unwrap_err();
    assert_eq!(
        err,
        MtgError::ScaleMismatch {
            parent: a.axis,
            parent_scale: 2,
            child: a.leaf,
            child_scale: 3,
        }
    );
    assert!(g.add_component(42, "Orphan").is_err());
}

#[test]
fn test_plant_without_elements_is_kept() {
    let mut g = Mtg::new();
    let bare = g.add_plant("Plant");
    let a = add_plant(&mut g);

    let out = interpreter().interpret(&g).unwrap();
    assert!(out.contains(bare));
    assert!(out.contains(a.leaf));
    assert_eq!(out.len(), g.len());
}
