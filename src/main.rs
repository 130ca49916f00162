use macroquad::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod camera;
mod config;
mod counter;
mod error;
mod growth;
mod palette;
mod particles;
mod scene_renderer;
mod schedule;
mod stats;
mod surface;
mod tree;
mod ui;
mod visual;

use camera::OrbitCamera;
use config::{AppSettings, CliOptions, FieldConfig, SceneConfig};
use counter::AnimatedCounter;
use growth::GrowthScene;
use particles::ParticleField;
use scene_renderer::SceneRenderer;
use stats::GrowthHistory;
use surface::ScreenSurface;
use ui::UiState;
use visual::AutoQuality;

const SKY: Color = Color::new(0.91, 0.96, 0.93, 1.0);
const TARGET_FRAME_MS: f32 = 1000.0 / 60.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "EcoGrove".to_string(),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecogrove=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// CLI flags over an optional settings file over defaults. Bad input falls
/// back a layer instead of aborting.
fn load_settings() -> AppSettings {
    let cli = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            warn!(error = %e, "ignoring command line");
            CliOptions::default()
        }
    };

    let mut settings = match &cli.config_path {
        Some(path) => match AppSettings::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings file rejected, using defaults");
                AppSettings::default()
            }
        },
        None => AppSettings::default(),
    };
    cli.apply(&mut settings);
    settings
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();
    let settings = load_settings();

    let field_config = FieldConfig::from_settings(&settings.field).unwrap_or_else(|e| {
        warn!(error = %e, "particle field settings rejected, using defaults");
        FieldConfig::default()
    });
    let scene_config = SceneConfig::from_settings(&settings.scene).unwrap_or_else(|e| {
        warn!(error = %e, "growth scene settings rejected, using defaults");
        SceneConfig::default()
    });

    let mut field = ParticleField::new(field_config, settings.seed);
    let mut scene = GrowthScene::new(scene_config, settings.eco_points, settings.seed.wrapping_add(1));
    field.start();
    scene.start();

    let mut camera = OrbitCamera::scene_default();
    let mut renderer = SceneRenderer::new(settings.seed as u32, settings.quality);
    let mut surface = ScreenSurface::new(settings.quality.gradient_rings());
    let mut counter = AnimatedCounter::new(scene.eco_points(), config::COUNTER_DURATION_SECS);
    let mut history = GrowthHistory::new(config::GROWTH_HISTORY_LEN);
    let mut ui_state = UiState::new(field.config(), settings.quality);
    let mut auto_quality = AutoQuality::new(settings.quality, TARGET_FRAME_MS);
    let mut capture = ui::UiCapture::default();

    loop {
        let frame_time = get_frame_time() as f64;
        let dt = frame_time.min(config::MAX_FRAME_TIME) as f32;

        if !capture.keyboard {
            if is_key_pressed(KeyCode::Space) {
                if field.is_running() {
                    field.stop();
                } else {
                    field.start();
                }
            }
            if is_key_pressed(KeyCode::G) {
                if scene.is_running() {
                    scene.stop();
                    history.clear();
                } else {
                    scene.start();
                }
            }
            if is_key_pressed(KeyCode::Up) {
                ui::step_points(&mut scene, config::POINTS_STEP);
            }
            if is_key_pressed(KeyCode::Down) {
                ui::step_points(&mut scene, -config::POINTS_STEP);
            }
        }

        camera.update(dt, capture.pointer);
        let hovered = !capture.pointer
            && renderer
                .tree_screen_bounds(&scene.params(), &camera)
                .is_some_and(|r| r.contains(Vec2::from(mouse_position())));
        scene.set_hovered(hovered);

        let ticks = scene.update(frame_time);
        counter.set_target(scene.eco_points());
        counter.update(dt);

        clear_background(SKY);
        if scene.is_running() {
            renderer.draw(&scene, &camera);
        }

        set_default_camera();
        surface.attach(Some(Rect::new(0.0, 0.0, screen_width(), screen_height())));
        field.update(frame_time, &mut surface);
        history.record(ticks, scene.displayed_growth(), scene.target_growth(), field.len());

        ui_state.frame_ms = dt * 1000.0;
        let shown_quality = ui_state.quality;
        capture = ui::draw_ui(&mut field, &mut scene, &counter, &history, &mut ui_state);
        if ui_state.quality != shown_quality {
            auto_quality.set_ceiling(ui_state.quality);
            info!(quality = ui_state.quality.label(), "render quality chosen");
        }

        if ui_state.auto_quality {
            ui_state.quality = auto_quality.observe(ui_state.quality, ui_state.frame_ms);
        }
        renderer.set_quality(ui_state.quality);
        surface.set_gradient_rings(ui_state.quality.gradient_rings());

        next_frame().await;
    }
}
