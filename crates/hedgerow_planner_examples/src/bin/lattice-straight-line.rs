use geo::line_string;
use hedgerow_planner::prelude::*;
use hedgerow_planner_examples::{init_tracing, render_plan_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let layer = HedgerowLayer::new(vec![
        line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)].into(),
    ]);
    let config = PlannerConfig::default()
        .with_lattice(LatticeConfig::new(3, 1.25, 1.0))
        .with_aggregation(AggregationConfig::new(0.5));

    let planner = HedgerowPlanner::try_new(config, SpeciesCatalog::native_hedgerow())?;
    let mut rng = StdRng::seed_from_u64(42);
    let result = planner.run(&layer, &mut rng)?;

    for p in result.positions() {
        println!(
            "#{:<3} row {} ({:?})  ({:6.2}, {:5.2})  {:<6} {}",
            p.id,
            p.row,
            p.row_class,
            p.position.x,
            p.position.y,
            p.plant_type,
            p.species.as_deref().unwrap_or("-"),
        );
    }

    let render = RenderConfig::new((1000, 400)).with_point_radius(8);
    render_plan_to_png(&result, &render, "lattice-straight-line.png")?;
    Ok(())
}
