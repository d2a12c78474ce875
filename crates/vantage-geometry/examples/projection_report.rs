//! Projection Report Example
//!
//! Builds a small chart scene (a dated X axis, a stack of two panels and an embedded
//! series) and prints where the corners of its world box land on a 600x400 target for
//! every projection, followed by the automatic intervals of each axis.
//!
//! Run with: cargo run -p vantage-geometry --example projection_report
//! Set RUST_LOG=debug to see setup and layout events.

use std::sync::Arc;

use glam::DVec3;
use vantage_core::{logging, profiling};
use vantage_geometry::{
    AxisRole, CivilDateTime, ChildLayout, CoordinateSystemConfig, CoordinateSystemTree,
    DateTimeDimension, GeometryResult, Mapping, MappingConfig, ProjectionKind,
};

fn build_scene() -> GeometryResult<CoordinateSystemTree> {
    let mut tree = CoordinateSystemTree::new(
        CoordinateSystemConfig::named("chart").with_layout(ChildLayout::stack(AxisRole::Y, 10.0)),
    )?;
    let root = tree.root();

    let upper = tree.add_child(root, CoordinateSystemConfig::named("prices"))?;
    let lower = tree.add_child(root, CoordinateSystemConfig::named("volume"))?;
    tree.add_embedded(upper, CoordinateSystemConfig::named("moving-average"))?;

    let start = CivilDateTime::date(2024, 1, 1)?.to_timestamp();
    let end = CivilDateTime::date(2024, 4, 1)?.to_timestamp();
    for panel in [upper, lower] {
        let x = tree.axis_mut(panel, AxisRole::X)?;
        x.set_dimension(Arc::new(DateTimeDimension));
        x.set_range(start.as_f64(), end.as_f64())?;
        x.set_ics_length(300.0);
    }
    tree.axis_mut(upper, AxisRole::Y)?.set_range(91.5, 117.25)?;
    tree.axis_mut(lower, AxisRole::Y)?.set_range(0.0, 4.2e6)?;
    tree.axis_mut(lower, AxisRole::Y)?.set_ics_length(40.0);

    tree.adjust_size()?;
    Ok(tree)
}

fn main() -> GeometryResult<()> {
    logging::init();
    profiling::set_enabled(true);
    profiling::new_frame();

    let mut tree = build_scene()?;
    let domain = tree.world_extent()?;
    println!("World box: {:.1} x {:.1} x {:.1}", domain.x, domain.y, domain.z);

    for kind in [
        ProjectionKind::Central,
        ProjectionKind::Parallel,
        ProjectionKind::Isometric,
        ProjectionKind::TwoDimensional,
    ] {
        vantage_core::profile_scope!("projection");
        let config = MappingConfig::new(kind).with_target_size(600.0, 400.0);
        let mut mapping = Mapping::new(config, domain)?;
        println!("\n{:?} (enlargement {:.3})", kind, mapping.enlargement());
        for corner in [DVec3::ZERO, DVec3::new(domain.x, 0.0, 0.0), domain] {
            let target = mapping.map(corner);
            println!(
                "  ({:>6.1}, {:>6.1}, {:>6.1}) -> ({:>6.1}, {:>6.1})",
                corner.x, corner.y, corner.z, target.x, target.y
            );
        }
    }

    for name in ["prices", "volume"] {
        let Some(id) = tree.find_by_name(name) else {
            continue;
        };
        for logical in [AxisRole::X, AxisRole::Y] {
            let axis = tree.axis_mut(id, logical)?;
            let dimension = axis.dimension().clone();
            let intervals = axis.intervals()?;
            let labels: Vec<String> = intervals
                .boundaries()
                .iter()
                .map(|&b| dimension.value(b).to_string())
                .collect();
            println!(
                "\n{} {:?}: step {} {:?}\n  {}",
                name,
                logical,
                intervals.step(),
                intervals.unit(),
                labels.join(", ")
            );
        }
    }

    Ok(())
}
