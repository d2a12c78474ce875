//! Coordinate system tree, orientation and size propagation tests.

use glam::DVec3;
use vantage_geometry::{
    AxisRole, ChildLayout, CoordinateSystemConfig, CoordinateSystemTree, DataValue, GeometryError,
    Orientation,
};
use vantage_test_utils::{assert_near, assert_vec3_near, chain_tree, init_logging};

fn oriented_chain() -> (CoordinateSystemTree, [vantage_geometry::CsId; 3]) {
    let mut tree = CoordinateSystemTree::new(
        CoordinateSystemConfig::named("root").with_orientation(Orientation::Yxz),
    )
    .unwrap();
    let root = tree.root();
    let middle = tree
        .add_child(
            root,
            CoordinateSystemConfig::named("middle")
                .with_orientation(Orientation::Zxy)
                .with_offset(DVec3::new(5.0, 10.0, 15.0)),
        )
        .unwrap();
    let leaf = tree
        .add_child(
            middle,
            CoordinateSystemConfig::named("leaf")
                .with_orientation(Orientation::Xzy)
                .with_offset(DVec3::new(1.0, 2.0, 3.0)),
        )
        .unwrap();
    (tree, [root, middle, leaf])
}

// ====================
// Frame composition
// ====================

#[test]
fn test_ics_to_wcs_composes_each_frame() {
    let (tree, [root, middle, leaf]) = oriented_chain();
    let v = DVec3::new(7.0, -3.0, 11.0);

    let stepwise = tree
        .ics_to_parent(root, tree.ics_to_parent(middle, tree.ics_to_parent(leaf, v).unwrap()).unwrap())
        .unwrap();
    let direct = tree.ics_to_wcs(leaf, v).unwrap();
    assert_vec3_near(direct, stepwise, 1e-12);

    let via_middle = tree.ics_to_wcs(middle, tree.ics_to_parent(leaf, v).unwrap()).unwrap();
    assert_vec3_near(direct, via_middle, 1e-12);
}

#[test]
fn test_wcs_to_ics_inverts_composition() {
    let (tree, [_, middle, leaf]) = oriented_chain();
    for id in [middle, leaf] {
        let v = DVec3::new(4.0, 9.0, -2.5);
        let world = tree.ics_to_wcs(id, v).unwrap();
        assert_vec3_near(tree.wcs_to_ics(id, world).unwrap(), v, 1e-12);
    }
}

#[test]
fn test_world_roles_match_composed_frames() {
    let (tree, [_, _, leaf]) = oriented_chain();
    let world = tree.world_orientation(leaf).unwrap();
    let origin = tree.ics_to_wcs(leaf, DVec3::ZERO).unwrap();
    for logical in AxisRole::ALL {
        let moved = tree.ics_to_wcs(leaf, logical.unit()).unwrap() - origin;
        assert_vec3_near(moved, world.role_of(logical).unit(), 1e-12);
        assert_eq!(tree.axis(leaf, logical).unwrap().role(), world.role_of(logical));
    }
}

#[test]
fn test_value_to_wcs_goes_through_axes() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    tree.axis_mut(root, AxisRole::X).unwrap().set_range(0.0, 10.0).unwrap();
    tree.axis_mut(root, AxisRole::Y).unwrap().set_range(-1.0, 1.0).unwrap();
    tree.axis_mut(root, AxisRole::Z).unwrap().set_reversed(true);
    tree.adjust_size().unwrap();

    let world = tree
        .value_to_wcs(
            root,
            [
                &DataValue::Number(2.5),
                &DataValue::Number(0.0),
                &DataValue::Number(0.25),
            ],
        )
        .unwrap();
    assert_vec3_near(world, DVec3::new(25.0, 50.0, 75.0), 1e-9);
}

// ====================
// Orientation
// ====================

#[test]
fn test_orientation_group_is_closed() {
    for a in Orientation::PERMUTATIONS {
        assert_eq!(a.compose(a.inverse()), Orientation::Xyz);
        assert_eq!(a.inverse().compose(a), Orientation::Xyz);
        for b in Orientation::PERMUTATIONS {
            let ab = a.compose(b);
            assert!(Orientation::PERMUTATIONS.contains(&ab));
            for c in Orientation::PERMUTATIONS {
                assert_eq!(ab.compose(c), a.compose(b.compose(c)));
            }
        }
    }
}

#[test]
fn test_set_orientation_keeps_axis_settings() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    let child = tree.add_child(root, CoordinateSystemConfig::named("child")).unwrap();
    {
        let axis = tree.axis_mut(root, AxisRole::X).unwrap();
        axis.set_range(3.0, 42.0).unwrap();
        axis.set_user_step(Some(5.0)).unwrap();
    }

    tree.set_orientation(root, Orientation::Yxz).unwrap();

    let x = tree.axis(root, AxisRole::X).unwrap();
    assert_eq!(x.min(), 3.0);
    assert_eq!(x.max(), 42.0);
    assert_eq!(x.user_step(), Some(5.0));
    assert_eq!(x.role(), AxisRole::Y);
    assert_eq!(tree.axis(root, AxisRole::Y).unwrap().role(), AxisRole::X);

    // The vertical axis of the root is now its logical X.
    assert_eq!(tree.axis_for_role(root, AxisRole::Y).unwrap().max(), 42.0);

    // Inheriting descendants follow.
    assert_eq!(tree.axis(child, AxisRole::X).unwrap().role(), AxisRole::Y);
    assert!(!tree.is_settled());
}

#[test]
fn test_embedded_orientation_is_inherited() {
    let mut tree = CoordinateSystemTree::new(
        CoordinateSystemConfig::named("root").with_orientation(Orientation::Yxz),
    )
    .unwrap();
    let root = tree.root();
    let embedded = tree.add_embedded(root, CoordinateSystemConfig::named("series")).unwrap();

    assert_eq!(tree.world_orientation(embedded).unwrap(), Orientation::Yxz);
    assert_eq!(tree.axis(embedded, AxisRole::Y).unwrap().role(), AxisRole::X);
    assert!(tree.set_orientation(embedded, Orientation::Xyz).is_err());
    assert!(
        tree.add_embedded(
            root,
            CoordinateSystemConfig::named("bad").with_orientation(Orientation::Zyx)
        )
        .is_err()
    );
}

// ====================
// Structure
// ====================

#[test]
fn test_removed_id_is_unknown() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    let child = tree.add_child(root, CoordinateSystemConfig::named("child")).unwrap();
    let grandchild = tree.add_child(child, CoordinateSystemConfig::named("grandchild")).unwrap();

    tree.remove(child).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(child).err(), Some(GeometryError::UnknownCoordinateSystem(child)));
    assert_eq!(
        tree.ics_to_wcs(grandchild, DVec3::ZERO).err(),
        Some(GeometryError::UnknownCoordinateSystem(grandchild))
    );
    assert!(tree.children(root).unwrap().is_empty());
    assert_eq!(tree.find_by_name("grandchild"), None);

    // A new system may reuse the slot, but never the handle.
    let replacement = tree.add_child(root, CoordinateSystemConfig::named("child")).unwrap();
    assert_ne!(replacement, child);
    assert!(!tree.contains(child));

    let live: Vec<_> = tree.iter().map(|(id, system)| (id, system.name())).collect();
    assert_eq!(live, vec![(root, Some("root")), (replacement, Some("child"))]);
}

#[test]
fn test_root_cannot_be_removed() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    assert!(matches!(tree.remove(root), Err(GeometryError::InvalidConfiguration(_))));
    assert!(tree.contains(root));
}

#[test]
fn test_embedded_shares_x_and_z() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    let series = tree.add_embedded(root, CoordinateSystemConfig::named("series")).unwrap();

    let root_axes = tree.get(root).unwrap().axis_ids();
    let series_axes = tree.get(series).unwrap().axis_ids();
    assert_eq!(series_axes[0], root_axes[0]);
    assert_ne!(series_axes[1], root_axes[1]);
    assert_eq!(series_axes[2], root_axes[2]);

    tree.axis_mut(series, AxisRole::X).unwrap().set_range(0.0, 500.0).unwrap();
    assert_eq!(tree.axis(root, AxisRole::X).unwrap().max(), 500.0);

    tree.axis_mut(series, AxisRole::Y).unwrap().set_range(-5.0, 5.0).unwrap();
    assert_eq!(tree.axis(root, AxisRole::Y).unwrap().max(), 1.0);

    // Removing the embedded system keeps the shared axes alive.
    tree.remove(series).unwrap();
    assert_eq!(tree.axis(root, AxisRole::X).unwrap().max(), 500.0);
    assert_eq!(tree.axis(root, AxisRole::Z).unwrap().max(), 1.0);
}

// ====================
// Size propagation
// ====================

#[test]
fn test_deep_change_reaches_root() {
    init_logging();
    let (mut tree, ids) = chain_tree(4, DVec3::splat(10.0));
    tree.adjust_size().unwrap();
    assert!(tree.is_settled());

    let deepest = ids[4];
    tree.axis_mut(deepest, AxisRole::X).unwrap().set_ics_length(500.0);
    let processed = tree.adjust_size().unwrap();
    assert_eq!(processed, 5);
    assert!(tree.is_settled());

    let root = tree.get(ids[0]).unwrap();
    assert_vec3_near(root.extent(), DVec3::new(540.0, 140.0, 140.0), 1e-9);
    assert_near(tree.axis(ids[0], AxisRole::X).unwrap().ics_length(), 540.0, 1e-9);
    assert_vec3_near(tree.world_extent().unwrap(), DVec3::new(540.0, 140.0, 140.0), 1e-9);
}

#[test]
fn test_stacked_children_do_not_overlap() {
    let mut tree = CoordinateSystemTree::new(
        CoordinateSystemConfig::named("root").with_layout(ChildLayout::stack(AxisRole::X, 5.0)),
    )
    .unwrap();
    let root = tree.root();
    let lengths = [30.0, 50.0, 20.0];
    let children: Vec<_> = lengths
        .iter()
        .enumerate()
        .map(|(i, &length)| {
            let id = tree
                .add_child(root, CoordinateSystemConfig::named(format!("panel{}", i)))
                .unwrap();
            tree.axis_mut(id, AxisRole::X).unwrap().set_ics_length(length);
            id
        })
        .collect();
    tree.adjust_size().unwrap();

    let offsets: Vec<f64> = children
        .iter()
        .map(|&id| tree.get(id).unwrap().offset().x)
        .collect();
    assert_eq!(offsets, vec![0.0, 35.0, 90.0]);
    for i in 1..children.len() {
        assert!(offsets[i] >= offsets[i - 1] + lengths[i - 1]);
    }
    assert_vec3_near(tree.get(root).unwrap().extent(), DVec3::new(110.0, 100.0, 100.0), 1e-9);
}

#[test]
fn test_overlay_resets_offsets() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    let child = tree
        .add_child(
            root,
            CoordinateSystemConfig::named("child").with_offset(DVec3::new(20.0, 0.0, 0.0)),
        )
        .unwrap();
    tree.adjust_size().unwrap();
    assert_near(tree.get(root).unwrap().extent().x, 120.0, 1e-9);

    tree.set_layout(root, ChildLayout::Overlay).unwrap();
    tree.adjust_size().unwrap();
    assert_eq!(tree.get(child).unwrap().offset(), DVec3::ZERO);
    assert_near(tree.get(root).unwrap().extent().x, 100.0, 1e-9);
}

#[test]
fn test_generation_tracks_changes() {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root")).unwrap();
    let root = tree.root();
    let start = tree.generation();

    let child = tree.add_child(root, CoordinateSystemConfig::named("child")).unwrap();
    let added = tree.generation();
    assert!(added > start);

    tree.adjust_size().unwrap();
    let settled = tree.generation();
    assert_eq!(tree.adjust_size().unwrap(), 0);
    assert_eq!(tree.generation(), settled);

    tree.axis_mut(child, AxisRole::Y).unwrap().set_ics_length(250.0);
    tree.adjust_size().unwrap();
    assert!(tree.generation() > settled);
}
