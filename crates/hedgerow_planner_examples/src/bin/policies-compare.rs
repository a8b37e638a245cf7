use geo::{Geometry, LineString};
use hedgerow_planner::prelude::*;
use hedgerow_planner_examples::{init_tracing, render_plan_to_png, PointStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let layer = field_margins();
    let catalog = SpeciesCatalog::native_hedgerow();
    let clusters = ClusterRange::new(3, 5);

    let policies = [
        AllocationPolicy::FlatPercentage {
            gap: GapHandling::Report,
        },
        AllocationPolicy::TypeSplit {
            tree_percentage: 30.0,
            shrub_percentage: Some(70.0),
        },
        AllocationPolicy::SequentialClusters {
            tree_percentage: 30.0,
            clusters,
        },
        AllocationPolicy::BalancedClusters {
            tree_percentage: 30.0,
            clusters,
        },
    ];

    for policy in policies {
        let name = policy.name();
        let config = PlannerConfig::default().with_allocation(AllocationConfig::new(policy));
        let planner = HedgerowPlanner::try_new(config, catalog.clone())?;

        // Same seed for every policy so the lattices line up.
        let mut rng = StdRng::seed_from_u64(7);
        let result = planner.run(&layer, &mut rng)?;
        let report = &result.allocation;

        println!("== {name}");
        println!(
            "   trees {:>4}  shrubs {:>4}  unassigned {:>4}  repaired {:>4}",
            report.trees, report.shrubs, report.unassigned, report.repaired
        );
        println!(
            "   quota {:?}  per group {:?}  shortfall {}  clusters {}  edge trees {}",
            report.tree_quota,
            report.trees_per_group,
            report.tree_shortfall,
            report.clusters,
            report.edge_trees
        );

        let render = RenderConfig::new((1200, 900)).with_point_style(PointStyle::ByType);
        render_plan_to_png(&result, &render, format!("policies-compare-{name}.png"))?;
    }

    Ok(())
}

/// Three hedges around a field corner.
fn field_margins() -> HedgerowLayer {
    let hedges: Vec<Geometry<f64>> = vec![
        LineString::from(vec![(0.0, 0.0), (60.0, 0.0), (60.0, 40.0)]).into(),
        LineString::from(vec![(0.0, 15.0), (35.0, 30.0)]).into(),
        LineString::from(vec![(10.0, 60.0), (30.0, 55.0), (50.0, 62.0), (70.0, 58.0)]).into(),
    ];
    HedgerowLayer::new(hedges).with_crs("EPSG:27700")
}
