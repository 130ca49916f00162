use egui;

use super::{apply_field_draft, step_points, UiState};
use crate::config;
use crate::counter::AnimatedCounter;
use crate::growth::GrowthScene;
use crate::particles::{ParticleField, ParticleKind};
use crate::visual::VisualQuality;

/// Ornament A, ornament B, sparkles.
const MILESTONE_LABELS: [&str; 3] = ["Gold ornament", "Tomato ornament", "Sparkles"];

/// Side panel: eco-points input, mount toggles, field settings and readouts.
pub fn draw_controls(
    ctx: &egui::Context,
    field: &mut ParticleField,
    scene: &mut GrowthScene,
    counter: &AnimatedCounter,
    state: &mut UiState,
) {
    egui::SidePanel::right("controls")
        .default_width(260.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("{} Eco-Points", counter.display()))
                    .heading()
                    .strong()
                    .color(egui::Color32::from_rgb(76, 175, 80)),
            );
            ui.separator();

            section(ui, "Eco-Points", |ui| points_controls(ui, scene));
            section(ui, "Mounted", |ui| mount_toggles(ui, field, scene));
            section(ui, "Particles", |ui| field_controls(ui, field, state));
            section(ui, "Tree", |ui| tree_readouts(ui, scene));
            section(ui, "Render", |ui| render_controls(ui, state));
        });
}

fn points_controls(ui: &mut egui::Ui, scene: &mut GrowthScene) {
    let mut points = scene.eco_points();
    let slider = egui::Slider::new(&mut points, 0.0..=config::POINTS_SLIDER_MAX)
        .step_by(1.0)
        .clamping(egui::SliderClamping::Never);
    if ui.add(slider).changed() {
        scene.set_eco_points(points);
    }
    ui.horizontal(|ui| {
        if ui.button(format!("-{}", config::POINTS_STEP)).clicked() {
            step_points(scene, -config::POINTS_STEP);
        }
        if ui.button(format!("+{}", config::POINTS_STEP)).clicked() {
            step_points(scene, config::POINTS_STEP);
        }
    });
}

fn mount_toggles(ui: &mut egui::Ui, field: &mut ParticleField, scene: &mut GrowthScene) {
    let mut field_on = field.is_running();
    if ui.checkbox(&mut field_on, "Particle field (Space)").changed() {
        if field_on {
            field.start();
        } else {
            field.stop();
        }
    }
    let mut scene_on = scene.is_running();
    if ui.checkbox(&mut scene_on, "Growth scene (G)").changed() {
        if scene_on {
            scene.start();
        } else {
            scene.stop();
        }
    }
}

fn field_controls(ui: &mut egui::Ui, field: &mut ParticleField, state: &mut UiState) {
    ui.add(
        egui::Slider::new(&mut state.draft_count, 0..=config::MAX_PARTICLE_COUNT + 50)
            .text("count"),
    );
    ui.horizontal(|ui| {
        for (on, kind) in state.draft_kinds.iter_mut().zip(ParticleKind::ALL) {
            ui.checkbox(on, kind.label());
        }
    });
    if ui.button("Apply").clicked() {
        apply_field_draft(field, state);
    }
    if let Some(err) = &state.field_error {
        ui.colored_label(egui::Color32::from_rgb(230, 110, 90), err);
    }
    metric_row(
        ui,
        "Live",
        format!("{} / {}", field.len(), field.config().particle_count()),
    );
    metric_row(ui, "Frames", format!("{}", field.frame_count()));
}

fn tree_readouts(ui: &mut egui::Ui, scene: &GrowthScene) {
    let params = scene.params();
    ui.add(
        egui::ProgressBar::new(params.growth)
            .text(format!("growth {:.0}%", params.growth * 100.0)),
    );
    metric_row(ui, "Target", format!("{:.3}", scene.target_growth()));
    metric_row(ui, "Trunk", format!("{:.2}", params.trunk_height));
    metric_row(ui, "Foliage", format!("{:.2}", params.foliage_scale));

    let milestones = scene.milestones();
    let reached = [milestones.ornament_a, milestones.ornament_b, milestones.sparkles];
    ui.horizontal_wrapped(|ui| {
        for (label, on) in MILESTONE_LABELS.into_iter().zip(reached) {
            milestone_chip(ui, label, on);
        }
    });
}

fn render_controls(ui: &mut egui::Ui, state: &mut UiState) {
    egui::ComboBox::from_label("Quality")
        .selected_text(state.quality.label())
        .show_ui(ui, |ui| {
            for q in VisualQuality::ALL {
                ui.selectable_value(&mut state.quality, q, q.label());
            }
        });
    ui.checkbox(&mut state.auto_quality, "Auto quality");
    ui.checkbox(&mut state.show_graphs, "Growth graph");
    metric_row(ui, "Frame", format!("{:.1}ms", state.frame_ms));
}

fn section(ui: &mut egui::Ui, heading: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.label(
            egui::RichText::new(heading)
                .small()
                .color(egui::Color32::from_rgb(150, 170, 185)),
        );
        add_contents(ui);
    });
    ui.add_space(4.0);
}

fn metric_row(ui: &mut egui::Ui, key: &str, value: String) {
    ui.label(
        egui::RichText::new(format!("{key}: {value}"))
            .small()
            .color(egui::Color32::from_rgb(205, 215, 225)),
    );
}

fn milestone_chip(ui: &mut egui::Ui, label: &str, reached: bool) {
    let color = if reached {
        egui::Color32::from_rgb(255, 215, 0)
    } else {
        egui::Color32::from_gray(110)
    };
    ui.group(|ui| {
        ui.label(egui::RichText::new(label).small().strong().color(color));
    });
}
