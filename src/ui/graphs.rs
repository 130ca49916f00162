use egui;

use crate::stats::{GrowthHistory, RingBuffer};

const DISPLAYED_COLOR: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 215, 0);
const PARTICLE_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 180, 255);

/// Growth convergence and particle count graphs.
pub fn draw_graphs(ctx: &egui::Context, history: &GrowthHistory) {
    egui::Window::new("Growth")
        .default_pos(egui::pos2(16.0, 16.0))
        .default_size(egui::vec2(320.0, 200.0))
        .resizable(true)
        .show(ctx, |ui| {
            let size = egui::vec2(ui.available_width(), 90.0);
            let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, 2.0, egui::Color32::from_gray(20));
            draw_line_in_rect(&painter, &history.target, rect, 0.0..=1.0, TARGET_COLOR);
            draw_line_in_rect(&painter, &history.displayed, rect, 0.0..=1.0, DISPLAYED_COLOR);
            ui.horizontal(|ui| {
                ui.colored_label(DISPLAYED_COLOR, "Displayed");
                ui.colored_label(TARGET_COLOR, "Target");
            });

            ui.collapsing("Live particles", |ui| {
                let size = egui::vec2(ui.available_width(), 60.0);
                let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
                let rect = response.rect;
                painter.rect_filled(rect, 2.0, egui::Color32::from_gray(20));
                let max = history.particles.iter().fold(1.0f32, f32::max);
                draw_line_in_rect(&painter, &history.particles, rect, 0.0..=max, PARTICLE_COLOR);
                if let Some(val) = history.particles.last() {
                    painter.text(
                        egui::pos2(rect.right() - 4.0, rect.top() + 2.0),
                        egui::Align2::RIGHT_TOP,
                        format!("{val:.0}"),
                        egui::FontId::proportional(10.0),
                        egui::Color32::from_gray(200),
                    );
                }
            });
        });
}

fn draw_line_in_rect(
    painter: &egui::Painter,
    buffer: &RingBuffer,
    rect: egui::Rect,
    range: std::ops::RangeInclusive<f32>,
    color: egui::Color32,
) {
    let len = buffer.len();
    if len < 2 {
        return;
    }
    let (lo, hi) = (*range.start(), *range.end());
    let span = (hi - lo).max(f32::EPSILON);

    let points: Vec<egui::Pos2> = buffer
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = rect.left() + (i as f32 / (len - 1) as f32) * rect.width();
            let y = rect.bottom() - ((v - lo) / span).clamp(0.0, 1.0) * rect.height();
            egui::pos2(x, y)
        })
        .collect();

    painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
}
