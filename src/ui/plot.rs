use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use super::format;
use crate::analytics::correlation::CorrelationMatrix;
use crate::color::{correlation_color, generate_palette};

/// One labelled value of a chart; `None` is drawn as a gap.
pub type Series = Vec<(String, Option<f64>)>;

const CHART_HEIGHT: f32 = 260.0;
const ACCENT: Color32 = Color32::from_rgb(51, 153, 255);

/// X-axis formatter that names integer grid marks after their category.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, title: &str, series: &Series) {
    ui.strong(title);
    if series.iter().all(|(_, v)| v.is_none()) {
        ui.label(format::NOT_AVAILABLE);
        return;
    }
    let labels: Vec<String> = series.iter().map(|(l, _)| l.clone()).collect();
    let bars: Vec<Bar> = series
        .iter()
        .enumerate()
        .filter_map(|(i, (label, v))| {
            v.map(|v| Bar::new(i as f64, v).name(label).width(0.7))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            for (i, (_, v)) in series.iter().enumerate() {
                if let Some(v) = v {
                    plot_ui.text(Text::new(PlotPoint::new(i as f64, *v), format::compact(*v)));
                }
            }
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// Line with markers. Consecutive defined points are joined; an undefined
/// point breaks the line.
pub fn line_chart(ui: &mut Ui, id: &str, title: &str, series: &Series, decimals: usize) {
    ui.strong(title);
    if series.iter().all(|(_, v)| v.is_none()) {
        ui.label(format::NOT_AVAILABLE);
        return;
    }
    let labels: Vec<String> = series.iter().map(|(l, _)| l.clone()).collect();

    // Split into runs of defined points.
    let mut runs: Vec<Vec<[f64; 2]>> = vec![Vec::new()];
    for (i, (_, v)) in series.iter().enumerate() {
        match v {
            Some(v) => {
                if let Some(run) = runs.last_mut() {
                    run.push([i as f64, *v]);
                }
            }
            None => runs.push(Vec::new()),
        }
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            for run in runs.into_iter().filter(|r| !r.is_empty()) {
                let markers: PlotPoints = run.iter().copied().collect();
                plot_ui.points(Points::new(markers).radius(3.5).color(ACCENT));
                let points: PlotPoints = run.into_iter().collect();
                plot_ui.line(Line::new(points).color(ACCENT).width(2.0));
            }
            for (i, (_, v)) in series.iter().enumerate() {
                if let Some(v) = v {
                    let label = format::thousands(*v, decimals);
                    plot_ui.text(Text::new(PlotPoint::new(i as f64, *v), label));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Share (pie) chart
// ---------------------------------------------------------------------------

/// Wedges larger than this are split so every drawn polygon stays convex.
const MAX_WEDGE: f32 = TAU / 8.0;

pub fn share_chart(ui: &mut Ui, title: &str, series: &[(String, f64)]) {
    ui.strong(title);
    let total: f64 = series.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        ui.label(format::NOT_AVAILABLE);
        return;
    }
    let colors = generate_palette(series.len());

    ui.horizontal(|ui| {
        let size = Vec2::splat(CHART_HEIGHT * 0.8);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let center = response.rect.center();
        let radius = size.x * 0.45;

        let mut start = -TAU / 4.0;
        for ((_, v), color) in series.iter().zip(&colors) {
            let sweep = (v.max(0.0) / total) as f32 * TAU;
            let steps = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                let mut points = vec![center];
                for k in 0..=8 {
                    let a = a0 + (a1 - a0) * k as f32 / 8.0;
                    points.push(center + radius * Vec2::angled(a));
                }
                painter.add(Shape::convex_polygon(points, *color, Stroke::NONE));
            }
            start += sweep;
        }

        ui.vertical(|ui| {
            for ((label, v), color) in series.iter().zip(&colors) {
                let pct = v.max(0.0) / total * 100.0;
                ui.label(RichText::new(format!("■ {label}  {pct:.2}%")).color(*color));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        ui.label(format::NOT_AVAILABLE);
        return;
    }
    egui::ScrollArea::both().show(ui, |ui| {
        TableBuilder::new(ui)
            .striped(false)
            .column(Column::exact(190.0))
            .columns(Column::exact(52.0), matrix.len())
            .header(40.0, |mut header| {
                header.col(|_| {});
                for name in &matrix.columns {
                    header.col(|ui| {
                        ui.label(RichText::new(abbreviate(name)).small())
                            .on_hover_text(name.as_str());
                    });
                }
            })
            .body(|mut body| {
                for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                    body.row(22.0, |mut cells| {
                        cells.col(|ui| {
                            ui.label(name.as_str());
                        });
                        for r in row {
                            cells.col(|ui| {
                                let text = r.map_or_else(
                                    || format::NOT_AVAILABLE.to_string(),
                                    |r| format!("{r:.2}"),
                                );
                                ui.label(
                                    RichText::new(text)
                                        .monospace()
                                        .color(Color32::BLACK)
                                        .background_color(correlation_color(*r)),
                                );
                            });
                        }
                    });
                }
            });
    });
}

/// Short header for a column name: initials of its words.
fn abbreviate(name: &str) -> String {
    name.split('_')
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_column_names() {
        assert_eq!(abbreviate("Credit_Utilization_Ratio"), "CUR");
        assert_eq!(abbreviate("Age"), "A");
    }
}
