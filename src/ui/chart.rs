use crate::ui::colormap::ColorScale;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Axis bounds around the finite values with a little padding.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return [0.0, 1.0];
    }
    if min == max {
        return [min - 0.5, max + 0.5];
    }
    let padding = (max - min) * 0.05;
    [min - padding, max + padding]
}

pub fn numeric_labels(bounds: [f64; 2]) -> Vec<String> {
    let [lo, hi] = bounds;
    let precision = if (hi - lo).abs() < 10.0 { 2 } else { 1 };
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect()
}

/// One-line legend: the scale's range painted as blocks between its labels.
pub fn color_bar(label: &str, scale: &ColorScale, width: usize) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{} ", label), Style::default().fg(Color::Gray)),
        Span::raw(format!("{:.2} ", scale.min)),
    ];
    let width = width.max(1);
    for i in 0..width {
        let value = scale.min + (scale.max - scale.min) * (i as f64 + 0.5) / width as f64;
        spans.push(Span::styled("█", Style::default().fg(scale.color_of(value))));
    }
    spans.push(Span::raw(format!(" {:.2}", scale.max)));
    Line::from(spans)
}
