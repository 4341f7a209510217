use crate::dataset::{columns, Dataset};
use crate::error::Result;
use crate::ui::chart::color_bar;
use crate::ui::colormap::{viridis, ColorScale};
use crate::ui::widgets::DashboardTab;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

const PH_BINS: usize = 8;
const AZIMUTH_STEP: f64 = 15.0;
const ELEVATION_STEP: f64 = 5.0;
const MIN_ELEVATION: f64 = 5.0;
const MAX_ELEVATION: f64 = 85.0;

/// Camera orientation in degrees. Azimuth turns the scene about the vertical
/// axis; elevation tilts the camera above the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub azimuth: f64,
    pub elevation: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            azimuth: -35.0,
            elevation: 25.0,
        }
    }
}

impl Projection {
    /// Projects a point of the unit cube `[-1, 1]^3` (z up) onto the screen
    /// plane. With elevation inside (0, 90) degrees a larger z always lands
    /// higher on screen.
    pub fn project(&self, [x, y, z]: [f64; 3]) -> (f64, f64) {
        let (sin_a, cos_a) = self.azimuth.to_radians().sin_cos();
        let (sin_e, cos_e) = self.elevation.to_radians().sin_cos();
        let xr = x * cos_a - y * sin_a;
        let yr = x * sin_a + y * cos_a;
        (xr, z * cos_e + yr * sin_e)
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.azimuth = (self.azimuth + degrees).rem_euclid(360.0);
    }

    pub fn tilt(&mut self, degrees: f64) {
        self.elevation = (self.elevation + degrees).clamp(MIN_ELEVATION, MAX_ELEVATION);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            Self { min: 0.0, max: 0.0 }
        } else {
            Self { min, max }
        }
    }

    /// Maps the range onto [-1, 1].
    fn normalize(&self, v: f64) -> f64 {
        if self.max > self.min {
            2.0 * (v - self.min) / (self.max - self.min) - 1.0
        } else {
            0.0
        }
    }
}

/// One observation placed in the unit cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub position: [f64; 3],
    pub ph: f64,
}

/// Longitude, latitude and water column depth, with depth reversed so the
/// shallowest reading sits at the top of the cube.
pub struct DepthTab {
    points: Vec<ScenePoint>,
    scale: ColorScale,
    longitude: AxisRange,
    latitude: AxisRange,
    depth: AxisRange,
    projection: Projection,
}

impl DepthTab {
    pub fn new(dataset: &Dataset) -> Result<Self> {
        let lon = dataset.numeric_column(columns::LONGITUDE)?;
        let lat = dataset.numeric_column(columns::LATITUDE)?;
        let depth = dataset.numeric_column(columns::DEPTH)?;
        let ph = dataset.numeric_column(columns::PH)?;

        let samples: Vec<[f64; 4]> = lon
            .iter()
            .zip(&lat)
            .zip(&depth)
            .zip(&ph)
            .filter_map(|(((x, y), z), c)| Some([(*x)?, (*y)?, (*z)?, (*c)?]))
            .collect();

        let longitude = AxisRange::of(samples.iter().map(|s| s[0]));
        let latitude = AxisRange::of(samples.iter().map(|s| s[1]));
        let depth = AxisRange::of(samples.iter().map(|s| s[2]));
        let scale = ColorScale::from_values(samples.iter().map(|s| s[3]), PH_BINS);

        let points = samples
            .iter()
            .map(|s| ScenePoint {
                position: [
                    longitude.normalize(s[0]),
                    latitude.normalize(s[1]),
                    -depth.normalize(s[2]),
                ],
                ph: s[3],
            })
            .collect();

        Ok(Self {
            points,
            scale,
            longitude,
            latitude,
            depth,
            projection: Projection::default(),
        })
    }

    pub fn points(&self) -> &[ScenePoint] {
        &self.points
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Screen coordinates of every point with its colour, mapped continuously
    /// from pH onto viridis.
    pub fn projected_points(&self) -> Vec<((f64, f64), Color)> {
        self.points
            .iter()
            .map(|point| {
                (
                    self.projection.project(point.position),
                    viridis(self.scale.normalize(point.ph)),
                )
            })
            .collect()
    }

    fn render_scene(&self, frame: &mut Frame, area: Rect) {
        let projection = self.projection;
        let points = self.projected_points();
        let edge = Color::DarkGray;
        let label = Style::default().fg(Color::Gray);

        let corner = |x: f64, y: f64, z: f64| projection.project([x, y, z]);
        let edges: Vec<((f64, f64), (f64, f64))> = {
            let mut edges = Vec::with_capacity(12);
            for &a in &[-1.0, 1.0] {
                for &b in &[-1.0, 1.0] {
                    edges.push((corner(-1.0, a, b), corner(1.0, a, b)));
                    edges.push((corner(a, -1.0, b), corner(a, 1.0, b)));
                    edges.push((corner(a, b, -1.0), corner(a, b, 1.0)));
                }
            }
            edges
        };

        let lon_label = corner(0.0, -1.25, -1.0);
        let lat_label = corner(1.25, 0.0, -1.0);
        let top_label = corner(-1.0, -1.0, 1.0);
        let bottom_label = corner(-1.0, -1.0, -1.0);
        let depth_label = corner(-1.0, -1.0, 0.0);
        let depth = self.depth;

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(" 3D Water Quality View ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White)),
            )
            .marker(Marker::Braille)
            .x_bounds([-1.6, 1.6])
            .y_bounds([-1.9, 1.9])
            .paint(move |ctx| {
                for ((x1, y1), (x2, y2)) in &edges {
                    ctx.draw(&CanvasLine::new(*x1, *y1, *x2, *y2, edge));
                }
                ctx.layer();
                for (coords, color) in &points {
                    ctx.draw(&Points {
                        coords: std::slice::from_ref(coords),
                        color: *color,
                    });
                }
                ctx.print(lon_label.0, lon_label.1, Span::styled("Longitude", label));
                ctx.print(lat_label.0, lat_label.1, Span::styled("Latitude", label));
                ctx.print(
                    depth_label.0,
                    depth_label.1,
                    Span::styled("Water Column Depth (m) ↓", label),
                );
                ctx.print(
                    top_label.0,
                    top_label.1,
                    Span::styled(format!("{:.1}", depth.min), label),
                );
                ctx.print(
                    bottom_label.0,
                    bottom_label.1,
                    Span::styled(format!("{:.1}", depth.max), label),
                );
            });

        frame.render_widget(canvas, area);
    }
}

impl DashboardTab for DepthTab {
    fn title(&self) -> &str {
        "3D Visualization"
    }

    fn render(&self, frame: &mut Frame, area: Rect, _dataset: &Dataset) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        let caption = Line::from(vec![
            Span::styled(
                "Geographic distribution of water quality measurements. ",
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!(
                    "Lon {:.3}..{:.3} | Lat {:.3}..{:.3} | azimuth {:.0}° elevation {:.0}°",
                    self.longitude.min,
                    self.longitude.max,
                    self.latitude.min,
                    self.latitude.max,
                    self.projection.azimuth,
                    self.projection.elevation
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(caption), chunks[0]);
        self.render_scene(frame, chunks[1]);
        frame.render_widget(Paragraph::new(color_bar("pH", &self.scale, 24)), chunks[2]);
    }

    fn key_hints(&self) -> &str {
        "←→: Rotate | ↑↓: Tilt"
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Left => self.projection.rotate(-AZIMUTH_STEP),
            KeyCode::Right => self.projection.rotate(AZIMUTH_STEP),
            KeyCode::Up => self.projection.tilt(ELEVATION_STEP),
            KeyCode::Down => self.projection.tilt(-ELEVATION_STEP),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;
    use crate::ui::tests::render_to_string;

    #[test]
    fn test_shallowest_reading_is_top_of_cube() {
        let tab = DepthTab::new(&fixtures::sample()).unwrap();
        // Depths in the fixture: 1.0, 2.5, 4.0, 0.0
        let z: Vec<f64> = tab.points().iter().map(|p| p.position[2]).collect();
        assert_eq!(z[3], 1.0);
        assert_eq!(z[2], -1.0);
        assert!(z[0] > z[1]);
    }

    #[test]
    fn test_surface_projects_above_depth_for_every_orientation() {
        let mut projection = Projection::default();
        for _ in 0..24 {
            projection.rotate(AZIMUTH_STEP);
            for elevation in [MIN_ELEVATION, 45.0, MAX_ELEVATION] {
                projection.elevation = elevation;
                for (x, y) in [(-1.0, -1.0), (0.3, 0.7), (1.0, -0.2)] {
                    let surface = projection.project([x, y, 1.0]);
                    let deep = projection.project([x, y, -1.0]);
                    assert_eq!(surface.0, deep.0);
                    assert!(surface.1 > deep.1);
                }
            }
        }
    }

    #[test]
    fn test_tilt_is_clamped_and_rotation_wraps() {
        let mut tab = DepthTab::new(&fixtures::sample()).unwrap();
        for _ in 0..40 {
            tab.handle_key(KeyCode::Up);
        }
        assert_eq!(tab.projection().elevation, MAX_ELEVATION);
        for _ in 0..40 {
            tab.handle_key(KeyCode::Down);
        }
        assert_eq!(tab.projection().elevation, MIN_ELEVATION);

        let start = tab.projection().azimuth;
        for _ in 0..24 {
            tab.handle_key(KeyCode::Right);
        }
        assert!((tab.projection().azimuth - start.rem_euclid(360.0)).abs() < 1e-9);
    }

    #[test]
    fn test_points_are_coloured_continuously_by_ph() {
        let tab = DepthTab::new(&fixtures::sample()).unwrap();
        let colors: Vec<Color> = tab.projected_points().iter().map(|p| p.1).collect();
        // pH in the fixture: 8.1, 8.0, 7.9, 7.8
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], viridis(1.0));
        assert_eq!(colors[3], viridis(0.0));
        assert_eq!(colors[1], viridis((8.0 - 7.8) / (8.1 - 7.8)));
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn test_renders_axes() {
        let ds = fixtures::sample();
        let tab = DepthTab::new(&ds).unwrap();
        let text = render_to_string(120, 40, |frame, area| tab.render(frame, area, &ds));
        assert!(text.contains("3D Water Quality View"));
        assert!(text.contains("Longitude"));
        assert!(text.contains("Latitude"));
    }

    #[test]
    fn test_missing_depth_column_is_fatal() {
        let ds = Dataset::from_reader("Longitude,Latitude,pH\n1,2,7\n".as_bytes(), ',').unwrap();
        assert!(DepthTab::new(&ds).is_err());
    }
}
