//! Canvas drawing for the dashboard plots.
//!
//! The core renderers produce plain geometry; these functions only map it onto
//! Ratatui's Canvas.

use biosig::render::{LinearPlot, PolarPlot, RecurrenceHistogram, Rgb};
use biosig::RenderOutcome;
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Placeholder for a skipped frame.
fn draw_skipped<T>(f: &mut Frame, area: Rect, outcome: &RenderOutcome<T>, block: Block) {
    let reason = outcome
        .skip_reason()
        .map(|r| r.to_string())
        .unwrap_or_default();
    let text = Paragraph::new(Line::styled(
        format!("waiting for data ({reason}), press Space to play"),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(text, area);
}

/// Time traces. NaN amplitudes break the line.
pub fn draw_linear(f: &mut Frame, area: Rect, outcome: &RenderOutcome<LinearPlot>, title: &str) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let Some(plot) = outcome.as_drawn() else {
        draw_skipped(f, area, outcome, block);
        return;
    };

    let (x0, x1) = plot.x_bounds();
    let x1 = if x1 > x0 { x1 } else { x0 + 1.0 };
    let (y0, y1) = plot.y_bounds();
    let pad = ((y1 - y0) * 0.05).max(1e-6);
    let (y0, y1) = (y0 - pad, y1 + pad);

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([x0, x1])
        .y_bounds([y0, y1])
        .paint(|ctx| {
            for trace in &plot.traces {
                let line_color = color(trace.color);
                for pair in trace.points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if !(a.1.is_finite() && b.1.is_finite()) {
                        continue;
                    }
                    ctx.draw(&CanvasLine {
                        x1: a.0,
                        y1: a.1,
                        x2: b.0,
                        y2: b.1,
                        color: line_color,
                    });
                }
            }
            // Legend
            let step = (y1 - y0) / 12.0;
            for (i, trace) in plot.traces.iter().enumerate() {
                ctx.print(
                    x0,
                    y1 - step * (i as f64 + 0.5),
                    Line::styled(trace.label.clone(), Style::default().fg(color(trace.color))),
                );
            }
            ctx.print(
                x1 - (x1 - x0) * 0.12,
                y0,
                Line::styled(
                    format!("{:.2}s", plot.end_time),
                    Style::default().fg(Color::DarkGray),
                ),
            );
        });

    f.render_widget(canvas, area);
}

/// Polar curves around the origin, one revolution per window.
pub fn draw_polar(f: &mut Frame, area: Rect, outcome: &RenderOutcome<PolarPlot>) {
    let block = Block::default().borders(Borders::ALL).title(" Polar ");
    let Some(plot) = outcome.as_drawn() else {
        draw_skipped(f, area, outcome, block);
        return;
    };

    let extent = plot.extent();
    // Terminal cells are roughly twice as tall as wide
    let aspect = if area.height > 0 {
        (area.width as f64 / (2.0 * area.height as f64)).max(1.0)
    } else {
        1.0
    };

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([-extent * aspect, extent * aspect])
        .y_bounds([-extent, extent])
        .paint(|ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: plot.base_radius * 0.5,
                color: Color::DarkGray,
            });
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: 0.0,
                x2: 0.0,
                y2: extent,
                color: Color::DarkGray,
            });
            ctx.layer();
            for curve in &plot.curves {
                let line_color = color(curve.color);
                for pair in curve.points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if !(a.r.is_finite() && b.r.is_finite()) {
                        continue;
                    }
                    ctx.draw(&CanvasLine {
                        x1: a.x,
                        y1: a.y,
                        x2: b.x,
                        y2: b.y,
                        color: line_color,
                    });
                }
            }
            for (i, curve) in plot.curves.iter().enumerate() {
                ctx.print(
                    -extent * aspect,
                    extent * (1.0 - 0.1 * (i as f64 + 0.5)),
                    Line::styled(curve.label.clone(), Style::default().fg(color(curve.color))),
                );
            }
        });

    f.render_widget(canvas, area);
}

/// Density grid of the selected pair.
pub fn draw_recurrence(
    f: &mut Frame,
    area: Rect,
    outcome: &RenderOutcome<RecurrenceHistogram>,
    names: &[String],
) {
    let title = match names {
        [a, b, ..] => format!(" Recurrence: {a} vs {b} "),
        _ => " Recurrence ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let Some(hist) = outcome.as_drawn() else {
        draw_skipped(f, area, outcome, block);
        return;
    };

    let bins = hist.bins();
    let x_range = hist.x_range();
    let y_range = hist.y_range();
    let cells = hist.cells();

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([x_range.0, x_range.1])
        .y_bounds([y_range.0, y_range.1])
        .paint(|ctx| {
            for cell in &cells {
                let coords = [(
                    RecurrenceHistogram::bin_value(x_range, cell.column, bins),
                    RecurrenceHistogram::bin_value(y_range, cell.row, bins),
                )];
                ctx.draw(&Points {
                    coords: &coords,
                    color: color(cell.color),
                });
            }
            ctx.print(
                x_range.0,
                y_range.1,
                Line::styled(
                    format!("{} pairs, peak {}", hist.sum(), hist.max_count()),
                    Style::default().fg(Color::DarkGray),
                ),
            );
        });

    f.render_widget(canvas, area);
}
