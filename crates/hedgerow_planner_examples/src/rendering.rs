//! PNG rendering of planner output and tracing setup for the example binaries.
use std::path::Path;

use glam::DVec2;
use hedgerow_planner::prelude::{species_color, type_color, PlanResult, PlantingPosition};
use image::{Rgb, RgbImage};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// How planting positions are coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointStyle {
    /// One colour per plant type.
    #[default]
    ByType,
    /// One stable colour per species name.
    BySpecies,
}

/// Output image settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub background: [u8; 3],
    pub outline: [u8; 3],
    pub point_radius: i32,
    pub point_style: PointStyle,
    /// World units added around the content bounds.
    pub margin: f64,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            background: [245, 245, 235],
            outline: [90, 90, 90],
            point_radius: 3,
            point_style: PointStyle::ByType,
            margin: 2.0,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_point_radius(mut self, point_radius: i32) -> Self {
        self.point_radius = point_radius;
        self
    }

    pub fn with_point_style(mut self, point_style: PointStyle) -> Self {
        self.point_style = point_style;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }
}

/// World-to-pixel mapping preserving aspect ratio, y pointing up.
struct Viewport {
    min: DVec2,
    scale: f64,
    height: u32,
}

impl Viewport {
    fn fit(result: &PlanResult, config: &RenderConfig) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        let poly_points = result
            .polygons
            .iter()
            .flat_map(|p| p.boundary.exterior().coords())
            .map(|c| DVec2::new(c.x, c.y));
        for p in result.positions().iter().map(|p| p.position).chain(poly_points) {
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() {
            min = DVec2::ZERO;
            max = DVec2::ONE;
        }
        min -= DVec2::splat(config.margin);
        max += DVec2::splat(config.margin);

        let extent = (max - min).max(DVec2::splat(1e-9));
        let (w, h) = config.image_size;
        let scale = (w as f64 / extent.x).min(h as f64 / extent.y);
        Self { min, scale, height: h }
    }

    fn to_pixel(&self, p: DVec2) -> (i32, i32) {
        let local = (p - self.min) * self.scale;
        (local.x.round() as i32, self.height as i32 - 1 - local.y.round() as i32)
    }
}

/// Renders group polygons as outlines and positions as filled circles.
pub fn render_plan_to_png(
    result: &PlanResult,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    anyhow::ensure!(w > 0 && h > 0, "image size must be non-zero");

    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));
    let viewport = Viewport::fit(result, config);

    for poly in &result.polygons {
        for line in poly.boundary.exterior().lines() {
            let a = viewport.to_pixel(DVec2::new(line.start.x, line.start.y));
            let b = viewport.to_pixel(DVec2::new(line.end.x, line.end.y));
            draw_line(&mut img, a, b, config.outline);
        }
    }

    for p in result.positions() {
        let (x, y) = viewport.to_pixel(p.position);
        draw_disk(&mut img, x, y, config.point_radius, point_color(p, config.point_style));
    }

    img.save(path.as_ref())?;
    tracing::info!("Wrote {}", path.as_ref().display());
    Ok(())
}

fn point_color(position: &PlantingPosition, style: PointStyle) -> [u8; 3] {
    match (style, position.species.as_deref()) {
        (PointStyle::BySpecies, Some(name)) => species_color(name),
        _ => type_color(position.plant_type),
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn draw_disk(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: [u8; 3]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        put(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
