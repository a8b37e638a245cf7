use std::time::Duration;

use criterion::{Criterion, Throughput};
use geo::{Geometry, LineString};
use hedgerow_planner::prelude::HedgerowLayer;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// `features` parallel zigzag hedgerows, each roughly `length` units long.
pub fn zigzag_layer(features: usize, length: f64) -> HedgerowLayer {
    let legs = 8;
    let leg = length / legs as f64;
    let geometries: Vec<Geometry<f64>> = (0..features)
        .map(|f| {
            let y0 = f as f64 * 50.0;
            let coords: Vec<(f64, f64)> = (0..=legs)
                .map(|i| {
                    let x = i as f64 * leg * 0.8;
                    let y = y0 + if i % 2 == 0 { 0.0 } else { leg * 0.6 };
                    (x, y)
                })
                .collect();
            LineString::from(coords).into()
        })
        .collect();
    HedgerowLayer::new(geometries).with_crs("EPSG:27700")
}
