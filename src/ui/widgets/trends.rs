use crate::dataset::time::time_axis;
use crate::dataset::{columns, Dataset};
use crate::error::Result;
use crate::ui::chart::{color_bar, numeric_labels, padded_bounds};
use crate::ui::colormap::ColorScale;
use crate::ui::widgets::DashboardTab;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset as Series, GraphType, Paragraph},
    Frame,
};

const PH_BINS: usize = 8;

/// Metrics offered by the time-series selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Ph,
    DissolvedOxygen,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Ph, Metric::DissolvedOxygen];

    pub fn column(self) -> &'static str {
        match self {
            Metric::Temperature => columns::TEMPERATURE,
            Metric::Ph => columns::PH,
            Metric::DissolvedOxygen => columns::ODO,
        }
    }

    fn index(self) -> usize {
        match self {
            Metric::Temperature => 0,
            Metric::Ph => 1,
            Metric::DissolvedOxygen => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::ALL[0]
    }
}

/// One metric plotted against `Time`, in row order.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_labels: Vec<String>,
}

impl MetricSeries {
    fn build(
        metric: Metric,
        xs: &[Option<f64>],
        times: &[&str],
        dataset: &Dataset,
    ) -> Result<Self> {
        let values = dataset.numeric_column(metric.column())?;
        // (row, x, y) for rows with both a time and a value.
        let samples: Vec<(usize, f64, f64)> = xs
            .iter()
            .zip(&values)
            .enumerate()
            .filter_map(|(i, (x, y))| Some((i, (*x)?, (*y)?)))
            .collect();
        let points: Vec<(f64, f64)> = samples.iter().map(|&(_, x, y)| (x, y)).collect();

        let first = samples
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|s| times[s.0].to_string());
        let last = samples
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|s| times[s.0].to_string());
        let x_labels = first.into_iter().chain(last).collect();

        let x_bounds = match (
            points.iter().map(|p| p.0).reduce(f64::min),
            points.iter().map(|p| p.0).reduce(f64::max),
        ) {
            (Some(lo), Some(hi)) if hi > lo => [lo, hi],
            (Some(lo), Some(_)) => [lo - 0.5, lo + 0.5],
            _ => [0.0, 1.0],
        };

        Ok(Self {
            metric,
            x_bounds,
            y_bounds: padded_bounds(points.iter().map(|p| p.1)),
            points,
            x_labels,
        })
    }
}

/// Dissolved oxygen against temperature, grouped into pH colour bins.
#[derive(Debug, Clone)]
pub struct PhScatter {
    pub bins: Vec<Vec<(f64, f64)>>,
    pub scale: ColorScale,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl PhScatter {
    fn build(dataset: &Dataset) -> Result<Self> {
        let odo = dataset.numeric_column(columns::ODO)?;
        let temp = dataset.numeric_column(columns::TEMPERATURE)?;
        let ph = dataset.numeric_column(columns::PH)?;

        let samples: Vec<(f64, f64, f64)> = odo
            .iter()
            .zip(&temp)
            .zip(&ph)
            .filter_map(|((x, y), c)| Some(((*x)?, (*y)?, (*c)?)))
            .collect();

        let scale = ColorScale::from_values(samples.iter().map(|s| s.2), PH_BINS);
        let mut bins = vec![Vec::new(); scale.bins];
        for (x, y, c) in &samples {
            bins[scale.bin_of(*c)].push((*x, *y));
        }

        Ok(Self {
            bins,
            scale,
            x_bounds: padded_bounds(samples.iter().map(|s| s.0)),
            y_bounds: padded_bounds(samples.iter().map(|s| s.1)),
        })
    }
}

pub struct TrendsTab {
    metric: Metric,
    series: Vec<MetricSeries>,
    scatter: PhScatter,
    time_is_parsed: bool,
}

impl TrendsTab {
    pub fn new(dataset: &Dataset) -> Result<Self> {
        let times = dataset.text_column(columns::TIME)?;
        let (xs, time_is_parsed) = time_axis(&times);

        let series = Metric::ALL
            .iter()
            .map(|m| MetricSeries::build(*m, &xs, &times, dataset))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metric: Metric::default(),
            series,
            scatter: PhScatter::build(dataset)?,
            time_is_parsed,
        })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn select_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    pub fn current_series(&self) -> &MetricSeries {
        &self.series[self.metric.index()]
    }

    pub fn scatter(&self) -> &PhScatter {
        &self.scatter
    }

    fn render_selector(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "Choose a metric to plot over time: ",
            Style::default().fg(Color::Gray),
        )];
        for metric in Metric::ALL {
            let style = if metric == self.metric {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {} ", metric.column()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_time_series(&self, frame: &mut Frame, area: Rect) {
        let series = self.current_series();
        let name = series.metric.column();

        let block = Block::default()
            .title(format!(" {} Over Time ", name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        if series.points.is_empty() {
            frame.render_widget(Paragraph::new("No data").block(block), area);
            return;
        }

        let x_title = if self.time_is_parsed {
            "Time"
        } else {
            "Time (row order)"
        };

        let datasets = vec![Series::default()
            .name(name)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&series.points)];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(x_title)
                    .style(Style::default().fg(Color::Gray))
                    .labels(series.x_labels.clone())
                    .bounds(series.x_bounds),
            )
            .y_axis(
                Axis::default()
                    .title(name)
                    .style(Style::default().fg(Color::Gray))
                    .labels(numeric_labels(series.y_bounds))
                    .bounds(series.y_bounds),
            );

        frame.render_widget(chart, area);
    }

    fn render_scatter(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(area);

        let scatter = &self.scatter;
        let datasets: Vec<Series> = scatter
            .bins
            .iter()
            .enumerate()
            .filter(|(_, points)| !points.is_empty())
            .map(|(bin, points)| {
                Series::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(scatter.scale.bin_color(bin)))
                    .data(points)
            })
            .collect();

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(" Dissolved Oxygen vs Temperature (Colored by pH) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White)),
            )
            .x_axis(
                Axis::default()
                    .title("Dissolved Oxygen (mg/L)")
                    .style(Style::default().fg(Color::Gray))
                    .labels(numeric_labels(scatter.x_bounds))
                    .bounds(scatter.x_bounds),
            )
            .y_axis(
                Axis::default()
                    .title("Temperature (°C)")
                    .style(Style::default().fg(Color::Gray))
                    .labels(numeric_labels(scatter.y_bounds))
                    .bounds(scatter.y_bounds),
            );

        frame.render_widget(chart, chunks[0]);
        frame.render_widget(
            Paragraph::new(color_bar("pH", &scatter.scale, 24)),
            chunks[1],
        );
    }
}

impl DashboardTab for TrendsTab {
    fn title(&self) -> &str {
        "2D Visualizations"
    }

    fn render(&self, frame: &mut Frame, area: Rect, _dataset: &Dataset) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Percentage(50),
                Constraint::Min(8),
            ])
            .split(area);

        self.render_selector(frame, chunks[0]);
        self.render_time_series(frame, chunks[1]);
        self.render_scatter(frame, chunks[2]);
    }

    fn key_hints(&self) -> &str {
        "m/←→: Metric"
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('m') | KeyCode::Right => self.metric = self.metric.next(),
            KeyCode::Char('M') | KeyCode::Left => self.metric = self.metric.prev(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;
    use crate::error::DatasetError;
    use crate::ui::tests::render_to_string;

    #[test]
    fn test_defaults_to_temperature() {
        let tab = TrendsTab::new(&fixtures::sample()).unwrap();
        assert_eq!(tab.metric(), Metric::Temperature);
        let ys: Vec<f64> = tab.current_series().points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![28.5, 29.0, 29.5, 30.0]);
    }

    #[test]
    fn test_ph_selection_plots_ph_column() {
        let mut tab = TrendsTab::new(&fixtures::sample()).unwrap();
        tab.select_metric(Metric::Ph);
        let series = tab.current_series();
        assert_eq!(series.metric.column(), "pH");
        let ys: Vec<f64> = series.points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![8.1, 8.0, 7.9, 7.8]);

        let text = render_to_string(120, 40, |frame, area| tab.render(frame, area, &fixtures::sample()));
        assert!(text.contains("pH Over Time"));
    }

    #[test]
    fn test_time_axis_uses_parsed_times() {
        let tab = TrendsTab::new(&fixtures::sample()).unwrap();
        let series = tab.current_series();
        assert_eq!(series.points[1].0 - series.points[0].0, 300.0);
        assert_eq!(series.x_labels, vec!["10:00:00", "10:15:00"]);
    }

    #[test]
    fn test_blank_time_drops_row_but_keeps_time_axis() {
        let ds = Dataset::from_reader(
            "Time,Temperature (c),pH,ODO mg/L\n10:00,20,7,5\n,21,7,5\n10:10,22,8,6\n"
                .as_bytes(),
            ',',
        )
        .unwrap();
        let tab = TrendsTab::new(&ds).unwrap();
        assert!(tab.time_is_parsed);
        assert_eq!(
            tab.current_series().points,
            vec![(36000.0, 20.0), (36600.0, 22.0)]
        );
        assert_eq!(tab.current_series().x_labels, vec!["10:00", "10:10"]);
    }

    #[test]
    fn test_metric_cycle() {
        let mut tab = TrendsTab::new(&fixtures::sample()).unwrap();
        assert!(tab.handle_key(KeyCode::Char('m')));
        assert_eq!(tab.metric(), Metric::Ph);
        tab.handle_key(KeyCode::Right);
        assert_eq!(tab.metric(), Metric::DissolvedOxygen);
        tab.handle_key(KeyCode::Right);
        assert_eq!(tab.metric(), Metric::Temperature);
        tab.handle_key(KeyCode::Left);
        assert_eq!(tab.metric(), Metric::DissolvedOxygen);
    }

    #[test]
    fn test_scatter_bins_every_complete_row() {
        let tab = TrendsTab::new(&fixtures::sample()).unwrap();
        let scatter = tab.scatter();
        let total: usize = scatter.bins.iter().map(Vec::len).sum();
        assert_eq!(total, 4);
        // Lowest pH lands in the first bin, highest in the last.
        assert!(scatter.bins[0].contains(&(5.1, 30.0)));
        assert!(scatter.bins[PH_BINS - 1].contains(&(6.2, 28.5)));
    }

    #[test]
    fn test_missing_rows_are_skipped() {
        let ds = Dataset::from_reader(
            "Time,Temperature (c),pH,ODO mg/L\n1,20,,5\n2,,7,6\n3,22,8,7\n".as_bytes(),
            ',',
        )
        .unwrap();
        let tab = TrendsTab::new(&ds).unwrap();
        assert_eq!(tab.current_series().points.len(), 2);
        let total: usize = tab.scatter().bins.iter().map(Vec::len).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_missing_metric_column_is_fatal() {
        let ds = Dataset::from_reader("Time,pH\n1,7\n".as_bytes(), ',').unwrap();
        assert!(matches!(
            TrendsTab::new(&ds),
            Err(DatasetError::MissingColumn(name)) if name == "Temperature (c)"
        ));
    }
}
