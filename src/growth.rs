use ::rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::{self, SceneConfig};
use crate::palette;
use crate::schedule::PeriodicTask;
use crate::tree::{self, AmbientLayer, SparkleCloud, Spring, TreeParams};

/// Negative and NaN scores count as zero.
pub fn sanitize_points(eco_points: f32) -> f32 {
    if eco_points.is_nan() {
        0.0
    } else {
        eco_points.clamp(0.0, f32::MAX)
    }
}

/// Growth ratio a score maps to, in [0, 1].
pub fn target_growth(eco_points: f32) -> f32 {
    (sanitize_points(eco_points) / config::FULL_GROWTH_POINTS).clamp(0.0, 1.0)
}

/// First-order exponential smoothing toward `target`.
pub fn smooth_step(displayed: f32, target: f32, factor: f32) -> f32 {
    displayed + (target - displayed) * factor
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Milestones {
    pub ornament_a: bool,
    pub ornament_b: bool,
    pub sparkles: bool,
}

impl Milestones {
    pub fn for_points(eco_points: f32) -> Self {
        Self {
            ornament_a: tree::ornament_a_visible(eco_points),
            ornament_b: tree::ornament_b_visible(eco_points),
            sparkles: tree::sparkles_active(eco_points),
        }
    }
}

/// Decorative tree whose size follows a score.
///
/// Two tasks drive it once started: a per-frame task for the animation clock
/// (sway, label bob, orb spin, hover spring) and a fixed-interval task that
/// nudges the displayed growth toward the score's target.
pub struct GrowthScene {
    config: SceneConfig,
    eco_points: f32,
    displayed_growth: f32,
    elapsed: f32,
    hover: Spring,
    ambient: AmbientLayer,
    sparkles: SparkleCloud,
    rng: ChaCha8Rng,
    frame_task: Option<PeriodicTask>,
    growth_task: Option<PeriodicTask>,
}

impl GrowthScene {
    pub fn new(config: SceneConfig, eco_points: f32, seed: u64) -> Self {
        Self {
            config,
            eco_points: sanitize_points(eco_points),
            displayed_growth: 0.0,
            elapsed: 0.0,
            hover: Spring::hover(),
            ambient: AmbientLayer::default(),
            sparkles: SparkleCloud::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            frame_task: None,
            growth_task: None,
        }
    }

    /// Mount: growth restarts from zero and the decorative layers are re-rolled.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let orb_colors = palette::parse_palette(&palette::ORB_PALETTE).unwrap_or_default();
        self.ambient = AmbientLayer::generate(&mut self.rng, config::AMBIENT_ORB_COUNT, &orb_colors);
        self.sparkles = SparkleCloud::generate(&mut self.rng, config::SPARKLE_COUNT, config::SPARKLE_BOX);
        self.displayed_growth = 0.0;
        self.elapsed = 0.0;
        self.hover = Spring::hover();

        let frame_task = PeriodicTask::every_frame();
        let growth_task = PeriodicTask::interval(self.config.interval_secs() as f64);
        info!(
            tasks = ?[frame_task.cadence(), growth_task.cadence()],
            eco_points = self.eco_points,
            interval_secs = self.config.interval_secs(),
            smoothing = self.config.smoothing(),
            "growth scene started"
        );
        self.frame_task = Some(frame_task);
        self.growth_task = Some(growth_task);
    }

    /// Teardown: cancels both tasks. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let frame = self.frame_task.take();
        let growth = self.growth_task.take();
        if frame.is_none() && growth.is_none() {
            return;
        }
        for task in frame.iter().chain(growth.iter()) {
            task.cancel();
        }
        info!(growth = self.displayed_growth, "growth scene stopped");
    }

    pub fn is_running(&self) -> bool {
        self.frame_task.as_ref().is_some_and(|t| t.is_active())
            || self.growth_task.as_ref().is_some_and(|t| t.is_active())
    }

    /// Takes effect on the next smoothing tick.
    pub fn set_eco_points(&mut self, eco_points: f32) {
        let eco_points = sanitize_points(eco_points);
        let before = Milestones::for_points(self.eco_points);
        let after = Milestones::for_points(eco_points);
        self.eco_points = eco_points;

        if before != after {
            info!(
                eco_points,
                ornament_a = after.ornament_a,
                ornament_b = after.ornament_b,
                sparkles = after.sparkles,
                "tree milestones changed"
            );
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hover.target = if hovered { config::HOVER_SCALE } else { 1.0 };
    }

    pub fn eco_points(&self) -> f32 {
        self.eco_points
    }

    pub fn displayed_growth(&self) -> f32 {
        self.displayed_growth
    }

    pub fn target_growth(&self) -> f32 {
        target_growth(self.eco_points)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn milestones(&self) -> Milestones {
        Milestones::for_points(self.eco_points)
    }

    pub fn ambient(&self) -> &AmbientLayer {
        &self.ambient
    }

    pub fn sparkles(&self) -> &SparkleCloud {
        &self.sparkles
    }

    /// Render parameters for the current state.
    pub fn params(&self) -> TreeParams {
        TreeParams::derive(self.displayed_growth, self.eco_points, self.elapsed, self.hover.value)
    }

    pub fn label(&self) -> String {
        tree::label_text(self.eco_points)
    }

    /// Advance both tasks by one host frame. Returns the number of smoothing ticks run.
    pub fn update(&mut self, frame_time: f64) -> u32 {
        let frames = self.frame_task.as_mut().map_or(0, |t| t.poll(frame_time));
        for _ in 0..frames {
            let dt = frame_time.clamp(0.0, config::MAX_FRAME_TIME) as f32;
            self.elapsed += dt;
            self.hover.step(dt);
        }

        let ticks = self.growth_task.as_mut().map_or(0, |t| t.poll(frame_time));
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    fn tick(&mut self) {
        let target = target_growth(self.eco_points);
        self.displayed_growth =
            smooth_step(self.displayed_growth, target, self.config.smoothing()).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn running_scene(points: f32) -> GrowthScene {
        let mut scene = GrowthScene::new(SceneConfig::default(), points, 1);
        scene.start();
        scene
    }

    #[test]
    fn target_growth_mapping() {
        assert_eq!(target_growth(0.0), 0.0);
        assert_eq!(target_growth(1000.0), 0.5);
        assert_eq!(target_growth(2000.0), 1.0);
        assert_eq!(target_growth(3000.0), 1.0);
        assert_eq!(target_growth(-50.0), 0.0);
        assert_eq!(target_growth(f32::NAN), 0.0);
        assert_eq!(target_growth(f32::INFINITY), 1.0);

        let mut last = 0.0;
        for p in (0..2500).step_by(25) {
            let g = target_growth(p as f32);
            assert!(g >= last);
            last = g;
        }
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        for &target in &[0.0_f32, 0.25, 0.5, 1.0] {
            let mut g = 0.8_f32;
            let mut gap = (g - target).abs();
            for _ in 0..400 {
                let next = smooth_step(g, target, config::GROWTH_SMOOTHING);
                let next_gap = (next - target).abs();
                // Below ~1e-5 the step is lost in f32 rounding and the gap can only hold.
                if gap > 1e-5 {
                    assert!(next_gap < gap);
                } else {
                    assert!(next_gap <= gap);
                }
                assert!(next >= 0.0);
                if g <= target {
                    assert!(next <= target);
                } else {
                    assert!(next >= target);
                }
                g = next;
                gap = next_gap;
            }
            assert!(gap < 1e-5);
        }
    }

    #[test]
    fn growth_ticks_follow_wall_clock_not_frames() {
        let cfg = SceneConfig::new(config::GROWTH_SMOOTHING, 0.25).unwrap();
        let mut scene = GrowthScene::new(cfg, 2000.0, 1);
        scene.start();

        // Half a second of 16 Hz frames: two ticks.
        let ticks: u32 = (0..8).map(|_| scene.update(0.0625)).sum();
        assert_eq!(ticks, 2);

        // Half a second of 4 Hz frames: two more.
        let ticks: u32 = (0..2).map(|_| scene.update(0.25)).sum();
        assert_eq!(ticks, 2);

        let expected = 1.0 - (1.0 - config::GROWTH_SMOOTHING).powi(4);
        assert!((scene.displayed_growth() - expected).abs() < 1e-5);
    }

    #[test]
    fn displayed_growth_approaches_target_monotonically() {
        let mut scene = running_scene(1000.0);
        let mut last_gap = (scene.displayed_growth() - 0.5).abs();
        for _ in 0..2000 {
            if scene.update(0.05) > 0 {
                let g = scene.displayed_growth();
                assert!((0.0..=0.5).contains(&g));
                let gap = (g - 0.5).abs();
                assert!(gap <= last_gap);
                last_gap = gap;
            }
        }
        assert!(last_gap < 1e-4);
    }

    #[test]
    fn score_change_retargets_on_next_tick() {
        let mut scene = running_scene(2000.0);
        for _ in 0..200 {
            scene.update(0.05);
        }
        let high = scene.displayed_growth();
        assert!(high > 0.99);

        scene.set_eco_points(0.0);
        assert_eq!(scene.displayed_growth(), high);
        scene.update(0.05);
        assert!(scene.displayed_growth() < high);
        assert!(scene.displayed_growth() > 0.0);
    }

    #[test]
    fn negative_scores_are_clamped() {
        let mut scene = running_scene(-400.0);
        assert_eq!(scene.eco_points(), 0.0);
        scene.set_eco_points(-1.0);
        assert_eq!(scene.eco_points(), 0.0);
        scene.update(0.05);
        assert_eq!(scene.displayed_growth(), 0.0);
        let p = scene.params();
        assert_eq!(p.trunk_height, config::MIN_TRUNK_HEIGHT);
        assert_eq!(p.foliage_scale, config::MIN_FOLIAGE_SCALE);
    }

    #[test]
    fn params_track_current_state() {
        let mut scene = running_scene(500.0);
        assert!(!scene.params().ornament_a);
        scene.set_eco_points(501.0);
        assert!(scene.params().ornament_a);
        assert!(!scene.params().sparkles);
        scene.set_eco_points(801.0);
        assert!(scene.params().sparkles);
        assert!(!scene.params().ornament_b);
        scene.set_eco_points(1001.0);
        assert!(scene.params().ornament_b);

        for _ in 0..40 {
            scene.update(0.05);
        }
        let p = scene.params();
        assert!((p.trunk_height - trunk_floor(scene.displayed_growth())).abs() < 1e-6);
    }

    fn trunk_floor(g: f32) -> f32 {
        (g * 2.0).max(config::MIN_TRUNK_HEIGHT)
    }

    #[test]
    fn start_generates_decorations_once() {
        let mut scene = running_scene(900.0);
        assert_eq!(scene.ambient().orbs().len(), config::AMBIENT_ORB_COUNT);
        assert_eq!(scene.sparkles().len(), config::SPARKLE_COUNT);
        let orbs = scene.ambient().orbs().to_vec();
        for _ in 0..100 {
            scene.update(FRAME);
        }
        assert_eq!(scene.ambient().orbs(), orbs.as_slice());
    }

    #[test]
    fn stop_is_idempotent_and_freezes_state() {
        let mut scene = running_scene(1500.0);
        for _ in 0..10 {
            scene.update(0.05);
        }
        scene.stop();
        scene.stop();
        assert!(!scene.is_running());

        let growth = scene.displayed_growth();
        let elapsed = scene.elapsed();
        for _ in 0..100 {
            assert_eq!(scene.update(0.05), 0);
        }
        assert_eq!(scene.displayed_growth(), growth);
        assert_eq!(scene.elapsed(), elapsed);
    }

    #[test]
    fn remount_restarts_growth_from_zero() {
        let mut scene = running_scene(2000.0);
        for _ in 0..50 {
            scene.update(0.05);
        }
        scene.stop();
        scene.start();
        assert_eq!(scene.displayed_growth(), 0.0);
        assert!(scene.is_running());
    }

    #[test]
    fn hover_grows_scale_through_the_spring() {
        let mut scene = running_scene(0.0);
        scene.set_hovered(true);
        for _ in 0..120 {
            scene.update(FRAME);
        }
        assert!((scene.params().scale - config::HOVER_SCALE).abs() < 1e-3);
        scene.set_hovered(false);
        for _ in 0..120 {
            scene.update(FRAME);
        }
        assert!((scene.params().scale - 1.0).abs() < 1e-3);
    }
}
