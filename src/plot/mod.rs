//! Route plotter: draws flight routes as labeled polylines on a bitmap.

use crate::config::PlotConfig;
use crate::mission::MissionDocument;
use crate::parser::{parse_float, FormatError};
use plotters::prelude::*;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Ordered map-space points of one route.
pub type Route = Vec<(f64, f64)>;

/// Waypoint kinds read from a route file.
const ROUTE_KINDS: [&str; 3] = ["TAKEOFF", "NORMFLY", "LANDING"];

/// Separates routes in a route file.
const ROUTE_SEPARATOR: &str = "#";

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("failed to read routes {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("render failed: {0}")]
    Render(String),
}

/// One route per wing, from its waypoints.
pub fn routes_from_document(doc: &MissionDocument) -> Vec<Route> {
    doc.wings()
        .iter()
        .map(|w| w.waypoints.iter().map(|wp| (wp.x, wp.y)).collect())
        .collect()
}

/// Parse the plain route format: `TAKEOFF|NORMFLY|LANDING X Y ...` lines, `#` between routes.
pub fn parse_routes(text: &str) -> Result<Vec<Route>, FormatError> {
    let mut routes = Vec::new();
    let mut current = Route::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if ROUTE_KINDS.contains(&first) {
            let x = parse_float("X", tokens.next().unwrap_or(""))?;
            let y = parse_float("Y", tokens.next().unwrap_or(""))?;
            current.push((x, y));
        } else if first == ROUTE_SEPARATOR && !current.is_empty() {
            routes.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        routes.push(current);
    }
    Ok(routes)
}

pub fn load_routes(path: &Path) -> Result<Vec<Route>, PlotError> {
    let text = std::fs::read_to_string(path).map_err(|source| PlotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_routes(&text)?)
}

/// Map coordinates to canvas pixels; Y grows upward on the map and downward on the canvas.
pub fn scale_point(p: (f64, f64), cfg: &PlotConfig) -> (i32, i32) {
    let sx = f64::from(cfg.width) / cfg.map_extent;
    let sy = f64::from(cfg.height) / cfg.map_extent;
    (
        (p.0 * sx).round() as i32,
        (f64::from(cfg.height) - p.1 * sy).round() as i32,
    )
}

/// Draw routes onto a white canvas and write the image to `out` (format from its extension).
///
/// Routes with fewer than two points are skipped and do not consume a route
/// number. Vertices are labeled `route-vertex`, both 1-based. Returns the number
/// of routes drawn.
pub fn render_routes(routes: &[Route], cfg: &PlotConfig, out: &Path) -> Result<usize, PlotError> {
    if cfg.width == 0 || cfg.height == 0 || cfg.map_extent <= 0.0 {
        return Err(PlotError::Render(format!(
            "invalid canvas {}x{} over {} map units",
            cfg.width, cfg.height, cfg.map_extent
        )));
    }
    let root = BitMapBackend::new(out, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut rng = rand::thread_rng();
    let mut labels = true;
    let mut drawn = 0usize;
    for route in routes.iter().filter(|r| r.len() >= 2) {
        drawn += 1;
        let color = RGBColor(
            rng.gen_range(100..=255),
            rng.gen_range(100..=255),
            rng.gen_range(100..=255),
        );
        let pixels: Vec<(i32, i32)> = route.iter().map(|p| scale_point(*p, cfg)).collect();
        root.draw(&PathElement::new(pixels.clone(), color.stroke_width(2)))
            .map_err(render_err)?;
        for (i, &px) in pixels.iter().enumerate() {
            root.draw(&Circle::new(px, 2, RED.filled()))
                .map_err(render_err)?;
            if labels {
                let label = format!("{}-{}", drawn, i + 1);
                let style = ("sans-serif", 10).into_font().color(&BLACK);
                if let Err(e) = root.draw(&Text::new(label, px, style)) {
                    tracing::warn!("route labels disabled: {}", e);
                    labels = false;
                }
            }
        }
    }
    root.present().map_err(render_err)?;
    tracing::info!("drew {} route(s) to {}", drawn, out.display());
    Ok(drawn)
}

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_file_is_split_on_hash() {
        let text = "TAKEOFF 1000 2000 0 0\nNORMFLY 3000 4000 500 300\n#\n\n#\nTAKEOFF 5 6\nGATTACK 1 1\nLANDING 7 8\n";
        let routes = parse_routes(text).unwrap();
        assert_eq!(
            routes,
            vec![
                vec![(1000.0, 2000.0), (3000.0, 4000.0)],
                vec![(5.0, 6.0), (7.0, 8.0)]
            ]
        );
    }

    #[test]
    fn route_line_without_coordinates_fails() {
        assert!(matches!(
            parse_routes("NORMFLY 12"),
            Err(FormatError::InvalidFloat { ref key, .. }) if key == "Y"
        ));
    }

    #[test]
    fn scaling_flips_y() {
        let cfg = PlotConfig::default();
        assert_eq!(scale_point((0.0, 0.0), &cfg), (0, 600));
        assert_eq!(scale_point((52_000.0, 52_000.0), &cfg), (800, 0));
        assert_eq!(scale_point((26_000.0, 26_000.0), &cfg), (400, 300));
    }

    #[test]
    fn routes_from_mission_wings() {
        let doc = MissionDocument::parse(
            "[Wing]\na\nb\n[a]\nPlanes 1\n[a_Way]\nTAKEOFF 1 2 0 0\nLANDING 3 4 0 0\n[b]\nPlanes 1\n",
        )
        .unwrap();
        let routes = routes_from_document(&doc);
        assert_eq!(routes, vec![vec![(1.0, 2.0), (3.0, 4.0)], vec![]]);
    }

    #[test]
    fn renders_png_and_skips_single_point_routes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("routes.png");
        let cfg = PlotConfig {
            width: 200,
            height: 150,
            ..PlotConfig::default()
        };
        let routes = vec![
            vec![(1000.0, 1000.0), (20_000.0, 30_000.0), (40_000.0, 5_000.0)],
            vec![(5.0, 5.0)],
        ];
        let drawn = render_routes(&routes, &cfg, &out).unwrap();
        assert_eq!(drawn, 1);
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PlotConfig {
            width: 0,
            ..PlotConfig::default()
        };
        let r = render_routes(&[], &cfg, &dir.path().join("x.png"));
        assert!(matches!(r, Err(PlotError::Render(_))));
    }
}
