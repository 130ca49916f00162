pub mod controls;
pub mod graphs;

use tracing::warn;

use crate::config::FieldConfig;
use crate::counter::AnimatedCounter;
use crate::growth::GrowthScene;
use crate::particles::{ParticleField, ParticleKind};
use crate::stats::GrowthHistory;
use crate::visual::VisualQuality;

/// Panel state that outlives a single egui pass.
pub struct UiState {
    /// Particle count being edited; applied with the kinds on "Apply".
    pub draft_count: usize,
    pub draft_kinds: [bool; 3],
    pub field_error: Option<String>,
    pub show_graphs: bool,
    pub quality: VisualQuality,
    pub auto_quality: bool,
    pub frame_ms: f32,
}

impl UiState {
    pub fn new(field: &FieldConfig, quality: VisualQuality) -> Self {
        let mut draft_kinds = [false; 3];
        for (slot, kind) in draft_kinds.iter_mut().zip(ParticleKind::ALL) {
            *slot = field.kinds().contains(&kind);
        }
        Self {
            draft_count: field.particle_count(),
            draft_kinds,
            field_error: None,
            show_graphs: true,
            quality,
            auto_quality: true,
            frame_ms: 0.0,
        }
    }

    fn selected_kinds(&self) -> Vec<ParticleKind> {
        ParticleKind::ALL
            .into_iter()
            .zip(self.draft_kinds)
            .filter_map(|(kind, on)| on.then_some(kind))
            .collect()
    }
}

/// Validate the draft field settings and hand them to `field`. A rejected
/// draft leaves the running field untouched and records the reason.
pub fn apply_field_draft(field: &mut ParticleField, state: &mut UiState) {
    let palette = field.config().palette().to_vec();
    match FieldConfig::new(state.draft_count, palette, &state.selected_kinds()) {
        Ok(cfg) => {
            field.reconfigure(cfg);
            state.field_error = None;
        }
        Err(e) => {
            warn!(error = %e, "field settings rejected");
            state.field_error = Some(e.to_string());
        }
    }
}

/// Shift eco-points by `delta`, never below zero.
pub fn step_points(scene: &mut GrowthScene, delta: f32) {
    scene.set_eco_points((scene.eco_points() + delta).max(0.0));
}

/// Which inputs egui claimed this frame. The scene and the shortcuts only
/// see what egui left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiCapture {
    pub pointer: bool,
    pub keyboard: bool,
}

impl UiCapture {
    pub fn of(ctx: &egui::Context) -> Self {
        Self {
            pointer: ctx.wants_pointer_input(),
            keyboard: ctx.wants_keyboard_input(),
        }
    }
}

/// Draw all egui panels.
pub fn draw_ui(
    field: &mut ParticleField,
    scene: &mut GrowthScene,
    counter: &AnimatedCounter,
    history: &GrowthHistory,
    state: &mut UiState,
) -> UiCapture {
    let mut capture = UiCapture::default();
    egui_macroquad::ui(|ctx| {
        controls::draw_controls(ctx, field, scene, counter, state);
        if state.show_graphs {
            graphs::draw_graphs(ctx, history);
        }
        capture = UiCapture::of(ctx);
    });
    egui_macroquad::draw();
    capture
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, SceneConfig};

    #[test]
    fn draft_mirrors_initial_config() {
        let cfg = FieldConfig::default();
        let state = UiState::new(&cfg, VisualQuality::High);
        assert_eq!(state.draft_count, cfg.particle_count());
        assert_eq!(state.draft_kinds, [true; 3]);
    }

    #[test]
    fn rejected_draft_keeps_running_config() {
        let mut field = ParticleField::new(FieldConfig::default(), 1);
        let mut state = UiState::new(field.config(), VisualQuality::High);
        state.draft_kinds = [false; 3];
        state.draft_count = 10;

        apply_field_draft(&mut field, &mut state);

        assert!(state.field_error.is_some());
        assert_eq!(field.config().particle_count(), config::DEFAULT_PARTICLE_COUNT);
        assert_eq!(field.config().kinds().len(), 3);
    }

    #[test]
    fn accepted_draft_reconfigures_field() {
        let mut field = ParticleField::new(FieldConfig::default(), 1);
        let mut state = UiState::new(field.config(), VisualQuality::High);
        state.field_error = Some("stale".into());
        state.draft_count = 12;
        state.draft_kinds = [false, true, false];

        apply_field_draft(&mut field, &mut state);

        assert_eq!(state.field_error, None);
        assert_eq!(field.config().particle_count(), 12);
        assert_eq!(field.config().kinds(), &[ParticleKind::Sparkle]);
    }

    #[test]
    fn focused_text_field_captures_the_keyboard() {
        let ctx = egui::Context::default();
        assert_eq!(UiCapture::of(&ctx), UiCapture::default());

        let mut text = String::new();
        let mut capture = UiCapture::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.text_edit_singleline(&mut text).request_focus();
                });
                capture = UiCapture::of(ctx);
            });
        }
        assert!(capture.keyboard);
    }

    #[test]
    fn stepping_points_floors_at_zero() {
        let mut scene = GrowthScene::new(SceneConfig::default(), 50.0, 3);
        step_points(&mut scene, -config::POINTS_STEP);
        assert_eq!(scene.eco_points(), 0.0);
        step_points(&mut scene, config::POINTS_STEP);
        assert_eq!(scene.eco_points(), config::POINTS_STEP);
    }
}
