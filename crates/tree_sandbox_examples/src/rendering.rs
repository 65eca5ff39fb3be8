use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use image::{Rgba, RgbaImage};
use tree_sandbox::prelude::PlacementRecord;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Looking down the Y axis.
    Top,
    /// Looking along the Z axis.
    Side,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub pixels_per_block: u32,
    /// Empty blocks around the bounding box.
    pub margin: i32,
    pub projection: Projection,
    pub background: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_block: 12,
            margin: 2,
            projection: Projection::Side,
            background: [235, 240, 245, 255],
        }
    }
}

impl RenderConfig {
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

fn material_color(record: &PlacementRecord) -> [u8; 3] {
    let path = record.state.id.path();
    if path.contains("leaves") {
        if path.contains("cherry") {
            [232, 150, 190]
        } else {
            [58, 140, 62]
        }
    } else if path.contains("log") || path.contains("wood") || path.contains("stem") {
        [110, 78, 48]
    } else {
        [130, 130, 130]
    }
}

/// Projects `placements` onto a plane and writes a PNG to `path`.
///
/// Each pixel cell shows the block nearest the viewer, darkened with depth.
pub fn render_placements_to_png(
    placements: &[PlacementRecord],
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    if placements.is_empty() {
        bail!("nothing to render");
    }

    // (u, v, depth) where a larger depth is nearer the viewer and v grows downwards.
    let project = |r: &PlacementRecord| match config.projection {
        Projection::Top => (r.position.x, r.position.z, r.position.y),
        Projection::Side => (r.position.x, -r.position.y, -r.position.z),
    };

    let mut nearest: HashMap<(i32, i32), (i32, &PlacementRecord)> = HashMap::new();
    for record in placements {
        let (u, v, depth) = project(record);
        let slot = nearest.entry((u, v)).or_insert((depth, record));
        if depth > slot.0 {
            *slot = (depth, record);
        }
    }

    let (mut min_u, mut max_u, mut min_v, mut max_v) = (i32::MAX, i32::MIN, i32::MAX, i32::MIN);
    let (mut min_d, mut max_d) = (i32::MAX, i32::MIN);
    for (&(u, v), &(d, _)) in &nearest {
        min_u = min_u.min(u);
        max_u = max_u.max(u);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
        min_d = min_d.min(d);
        max_d = max_d.max(d);
    }

    let cell = config.pixels_per_block.max(1);
    let blocks_w = (max_u - min_u + 1 + 2 * config.margin) as u32;
    let blocks_h = (max_v - min_v + 1 + 2 * config.margin) as u32;
    let mut image =
        RgbaImage::from_pixel(blocks_w * cell, blocks_h * cell, Rgba(config.background));

    let depth_span = (max_d - min_d).max(1) as f32;
    for (&(u, v), &(d, record)) in &nearest {
        let shade = 0.6 + 0.4 * (d - min_d) as f32 / depth_span;
        let [r, g, b] = material_color(record);
        let color = Rgba([
            (r as f32 * shade) as u8,
            (g as f32 * shade) as u8,
            (b as f32 * shade) as u8,
            255,
        ]);
        let x0 = (u - min_u + config.margin) as u32 * cell;
        let y0 = (v - min_v + config.margin) as u32 * cell;
        for y in y0..y0 + cell {
            for x in x0..x0 + cell {
                image.put_pixel(x, y, color);
            }
        }
    }

    let path = path.as_ref();
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Wrote {} blocks to {}.", placements.len(), path.display());
    Ok(())
}
