use geo::{line_string, MultiLineString};
use hedgerow_planner::prelude::*;
use hedgerow_planner_examples::{init_tracing, render_plan_to_png, PointStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let gappy = MultiLineString::new(vec![
        line_string![(x: 0.0, y: 40.0), (x: 25.0, y: 40.0)],
        line_string![(x: 32.0, y: 40.0), (x: 60.0, y: 44.0)],
    ]);
    let layer = HedgerowLayer::new(vec![
        line_string![(x: 0.0, y: 0.0), (x: 30.0, y: 6.0), (x: 60.0, y: 0.0)].into(),
        gappy.into(),
        // Too short for more than one position per row.
        line_string![(x: 80.0, y: 10.0), (x: 80.5, y: 10.0)].into(),
    ])
    .with_crs("EPSG:27700");

    let config = PlannerConfig::default()
        .with_lattice(LatticeConfig::default().with_rows(5))
        .with_aggregation(AggregationConfig::new(1.25).with_quadrant_segments(12));
    let planner = HedgerowPlanner::try_new(config, SpeciesCatalog::native_hedgerow())?;

    let mut sink = VecSink::filtered([PlannerEventKind::Warning, PlannerEventKind::GroupAggregated]);
    let mut rng = StdRng::seed_from_u64(2024);
    let result = planner.run_with_events(&layer, &mut rng, &mut sink)?;

    println!("CRS: {}", result.crs().unwrap_or("none"));
    for poly in &result.polygons {
        println!(
            "group {:>2}: {:>4} positions, area {:>8.2}, perimeter {:>7.2}{}",
            poly.group_id,
            poly.position_count,
            poly.area,
            poly.perimeter,
            if poly.degenerate { " (degenerate)" } else { "" }
        );
        let top: Vec<String> = poly
            .species_counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(name, n)| format!("{name}={n}"))
            .collect();
        println!("          {}", top.join(", "));
    }
    for (context, message) in sink.warnings() {
        println!("warning [{context}]: {message}");
    }

    println!();
    println!("{}", result.summary);

    let render = RenderConfig::new((1200, 800)).with_point_style(PointStyle::BySpecies);
    render_plan_to_png(&result, &render, "aggregation-summary.png")?;
    Ok(())
}
