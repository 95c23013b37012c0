//! Plain-text rendering of messages and charts for the terminal surface.

use crate::message::{ChartKind, Message, Visualization};

const BAR_WIDTH: usize = 30;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render_message(message: &Message) -> String {
    let mut out = format!("{}:", message.role().display_name());
    for line in message.text().lines() {
        out.push_str("\n  ");
        out.push_str(line);
    }
    if let Some(chart) = message.visualization() {
        out.push('\n');
        out.push_str(&render_chart(chart));
    }
    out
}

pub fn render_chart(chart: &Visualization) -> String {
    let mut lines = Vec::new();
    let kind = match chart.kind {
        ChartKind::Bar => "bar",
        ChartKind::Line => "line",
    };
    if chart.series_label.is_empty() {
        lines.push(format!("  [{kind} chart]"));
    } else {
        lines.push(format!("  [{kind} chart: {}]", chart.series_label));
    }

    let label_width = chart
        .points
        .iter()
        .map(|p| p.category.chars().count())
        .max()
        .unwrap_or(0);

    match chart.kind {
        ChartKind::Bar => {
            let max = chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
            for point in &chart.points {
                let len = if max > 0.0 {
                    ((point.value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                lines.push(format!(
                    "  {:<label_width$} {} {}",
                    point.category,
                    "█".repeat(len),
                    format_value(point.value)
                ));
            }
        }
        ChartKind::Line => {
            lines.push(format!("  {}", sparkline(chart)));
            for point in &chart.points {
                lines.push(format!(
                    "  {:<label_width$} {}",
                    point.category,
                    format_value(point.value)
                ));
            }
        }
    }
    lines.join("\n")
}

fn sparkline(chart: &Visualization) -> String {
    let min = chart.points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = chart.points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    chart
        .points
        .iter()
        .map(|p| {
            if span > 0.0 {
                let step = ((p.value - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[step.min(SPARKS.len() - 1)]
            } else {
                SPARKS[SPARKS.len() / 2]
            }
        })
        .collect()
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DataPoint;

    #[test]
    fn test_render_user_message() {
        assert_eq!(
            render_message(&Message::user("Top emitter?")),
            "You:\n  Top emitter?"
        );
    }

    #[test]
    fn test_render_multiline_answer() {
        assert_eq!(
            render_message(&Message::assistant("line one\nline two", None)),
            "Greeny:\n  line one\n  line two"
        );
    }

    #[test]
    fn test_render_error_notice() {
        assert_eq!(
            render_message(&Message::error_notice()),
            "Error:\n  Sorry, I couldn't process your request."
        );
    }

    #[test]
    fn test_bar_chart_scales_to_largest_value() {
        let chart = Visualization {
            kind: ChartKind::Bar,
            series_label: "emissions".to_string(),
            points: vec![DataPoint::new("Acme", 20.0), DataPoint::new("Bo", 10.0)],
        };
        let rendered = render_chart(&chart);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "  [bar chart: emissions]");
        assert_eq!(lines[1], format!("  Acme {} 20", "█".repeat(30)));
        assert_eq!(lines[2], format!("  Bo   {} 10", "█".repeat(15)));
    }

    #[test]
    fn test_line_chart_has_sparkline_in_input_order() {
        let chart = Visualization {
            kind: ChartKind::Line,
            series_label: String::new(),
            points: vec![
                DataPoint::new("2020", 1.0),
                DataPoint::new("2021", 8.0),
                DataPoint::new("2022", 4.5),
            ],
        };
        let rendered = render_chart(&chart);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "  [line chart]");
        assert_eq!(lines[1], "  ▁█▅");
        assert_eq!(lines[2], "  2020 1");
        assert_eq!(lines[4], "  2022 4.5");
    }

    #[test]
    fn test_flat_line_uses_middle_spark() {
        let chart = Visualization {
            kind: ChartKind::Line,
            series_label: String::new(),
            points: vec![DataPoint::new("2020", 2.0), DataPoint::new("2021", 2.0)],
        };
        assert!(render_chart(&chart).contains("▅▅"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(3.456), "3.46");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(-2.0), "-2");
    }
}
