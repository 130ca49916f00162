use macroquad::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::camera::OrbitCamera;
use crate::growth::GrowthScene;
use crate::palette::{self, with_alpha};
use crate::tree::{AmbientLayer, TreeParams};
use crate::visual::VisualQuality;

const GROUND_Y: f32 = -0.5;
const GROUND_HALF_EXTENT: f32 = 5.0;
const TRUNK_RADIUS_TOP: f32 = 0.1;
const TRUNK_RADIUS_BOTTOM: f32 = 0.15;
const ORB_OPACITY: f32 = 0.6;
const SPARKLE_RADIUS: f32 = 0.02;
const LABEL_FONT_SIZE: f32 = 28.0;

struct Cloud {
    anchor: Vec3,
    speed: f32,
    opacity: f32,
}

const CLOUDS: [Cloud; 2] = [
    Cloud {
        anchor: Vec3::new(3.0, 3.0, -2.0),
        speed: 0.2,
        opacity: 0.3,
    },
    Cloud {
        anchor: Vec3::new(-3.0, 4.0, -3.0),
        speed: 0.3,
        opacity: 0.2,
    },
];

/// Draws a [`GrowthScene`] with macroquad's immediate-mode 3D shapes.
pub struct SceneRenderer {
    noise: Perlin,
    quality: VisualQuality,
}

impl SceneRenderer {
    pub fn new(seed: u32, quality: VisualQuality) -> Self {
        Self {
            noise: Perlin::new(seed),
            quality,
        }
    }

    pub fn set_quality(&mut self, quality: VisualQuality) {
        self.quality = quality;
    }

    fn sphere(&self, center: Vec3, radius: f32, color: Color) {
        let (rings, slices) = self.quality.sphere_detail();
        draw_sphere_ex(
            center,
            radius,
            None,
            color,
            DrawSphereParams {
                rings,
                slices,
                ..Default::default()
            },
        );
    }

    /// Draw the scene through `camera`. Leaves the default 2D camera active.
    pub fn draw(&self, scene: &GrowthScene, camera: &OrbitCamera) {
        set_camera(&camera.to_macroquad_camera());

        draw_plane(
            vec3(0.0, GROUND_Y, 0.0),
            vec2(GROUND_HALF_EXTENT, GROUND_HALF_EXTENT),
            None,
            palette::GROUND,
        );

        let params = scene.params();
        self.draw_clouds(params.elapsed);
        self.draw_tree(&params, scene);
        self.draw_ambient(scene.ambient(), params.elapsed);

        set_default_camera();
        self.draw_label(scene, &params, camera);
    }

    fn draw_tree(&self, params: &TreeParams, scene: &GrowthScene) {
        let t = params.elapsed;
        let (trunk_center, trunk_height) = params.trunk();
        draw_cylinder(
            params.to_world(trunk_center),
            TRUNK_RADIUS_TOP * params.scale,
            TRUNK_RADIUS_BOTTOM * params.scale,
            trunk_height * params.scale,
            None,
            palette::TRUNK,
        );

        for sphere in params.foliage().iter().chain(params.ornaments().iter()) {
            let floated = sphere.motion.apply(sphere.center, t);
            self.sphere(params.to_world(floated), sphere.radius * params.scale, sphere.color);
        }

        if params.sparkles {
            for (pos, brightness) in scene.sparkles().points(t) {
                let color = with_alpha(palette::GOLD, brightness);
                self.sphere(params.to_world(pos), SPARKLE_RADIUS * params.scale, color);
            }
        }
    }

    fn draw_ambient(&self, layer: &AmbientLayer, elapsed: f32) {
        for (pos, orb) in layer.world_positions(elapsed) {
            self.sphere(pos, orb.size, with_alpha(orb.color, ORB_OPACITY));
        }
    }

    fn draw_clouds(&self, elapsed: f32) {
        let puffs = self.quality.cloud_puffs();
        for (ci, cloud) in CLOUDS.iter().enumerate() {
            let drift = vec3((elapsed * cloud.speed).sin() * 0.5, 0.0, 0.0);
            let color = with_alpha(WHITE, cloud.opacity);
            for i in 0..puffs {
                let u = i as f32 / puffs as f32;
                let seed = ci as f64 * 17.0 + i as f64 * 3.1;
                let time = (elapsed * cloud.speed) as f64;
                let wobble = vec3(
                    self.noise.get([seed, time]) as f32,
                    self.noise.get([seed + 40.0, time]) as f32,
                    0.0,
                ) * 0.15;
                let spread = vec3((u - 0.5) * 1.6, (u * std::f32::consts::PI).sin() * 0.25, 0.0);
                let radius = 0.35 + 0.25 * (u * std::f32::consts::PI).sin();
                self.sphere(cloud.anchor + drift + spread + wobble, radius, color);
            }
        }
    }

    fn draw_label(&self, scene: &GrowthScene, params: &TreeParams, camera: &OrbitCamera) {
        let screen = vec2(screen_width(), screen_height());
        let anchor = vec3(0.0, params.label_height(), 0.0);
        let Some(at) = camera.world_to_screen(anchor, screen) else {
            return;
        };
        let text = scene.label();
        let dims = measure_text(&text, None, LABEL_FONT_SIZE as u16, 1.0);
        draw_text(
            &text,
            at.x - dims.width / 2.0,
            at.y + dims.offset_y / 2.0,
            LABEL_FONT_SIZE,
            palette::LABEL,
        );
    }

    /// Screen-space box around the trunk and canopy, for hover hit-testing.
    pub fn tree_screen_bounds(&self, params: &TreeParams, camera: &OrbitCamera) -> Option<Rect> {
        let screen = vec2(screen_width(), screen_height());
        let canopy = 0.8 * params.foliage_scale;
        let top = params.trunk_height + 0.3 + canopy;
        let corners = [
            vec3(-canopy, 0.0, 0.0),
            vec3(canopy, 0.0, 0.0),
            vec3(-canopy, top, 0.0),
            vec3(canopy, top, 0.0),
        ];
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for corner in corners {
            let p = camera.world_to_screen(params.to_world(corner), screen)?;
            min = min.min(p);
            max = max.max(p);
        }
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}
