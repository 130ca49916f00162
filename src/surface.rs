use macroquad::prelude::*;

use crate::palette::with_alpha;

const ELLIPSE_SEGMENTS: usize = 24;

/// A rectangular drawing surface supplied by the host.
///
/// Coordinates are surface-local: (0, 0) is the top-left corner.
pub trait Surface {
    /// Current pixel size, or `None` while the surface is not attached.
    fn size(&self) -> Option<Vec2>;
    fn clear(&mut self);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Color);
    /// Fill a polygon that is star-shaped around the centroid of its vertices.
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    /// Disc fading from `color` at the center to fully transparent at `radius`.
    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, color: Color);
}

/// A region of the macroquad screen. The host clears the whole frame before
/// drawing, so `clear` has nothing left to do.
pub struct ScreenSurface {
    rect: Option<Rect>,
    gradient_rings: usize,
}

impl ScreenSurface {
    pub fn new(gradient_rings: usize) -> Self {
        Self {
            rect: None,
            gradient_rings: gradient_rings.max(1),
        }
    }

    /// Resynchronize to the layout-measured region; `None` detaches the surface.
    pub fn attach(&mut self, rect: Option<Rect>) {
        self.rect = rect.filter(|r| r.w > 0.0 && r.h > 0.0);
    }

    pub fn set_gradient_rings(&mut self, rings: usize) {
        self.gradient_rings = rings.max(1);
    }

    fn origin(&self) -> Vec2 {
        self.rect.map(|r| r.point()).unwrap_or(Vec2::ZERO)
    }
}

impl Surface for ScreenSurface {
    fn size(&self) -> Option<Vec2> {
        self.rect.map(|r| r.size())
    }

    fn clear(&mut self) {}

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Color) {
        let c = self.origin() + center;
        let (sin, cos) = rotation.sin_cos();
        let point = |i: usize| {
            let t = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            let local = vec2(t.cos() * radii.x, t.sin() * radii.y);
            c + vec2(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
        };
        for i in 0..ELLIPSE_SEGMENTS {
            draw_triangle(c, point(i), point(i + 1), color);
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let origin = self.origin();
        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32 + origin;
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            draw_triangle(centroid, origin + *a, origin + b, color);
        }
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, color: Color) {
        // Stacked translucent discs approximate a linear alpha falloff.
        let c = self.origin() + center;
        let rings = self.gradient_rings;
        let step_alpha = color.a / rings as f32;
        for i in 0..rings {
            let r = radius * (1.0 - i as f32 / rings as f32);
            draw_circle(c.x, c.y, r, with_alpha(color, step_alpha));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_surface_is_unavailable_until_attached() {
        let mut surface = ScreenSurface::new(4);
        assert_eq!(surface.size(), None);

        surface.attach(Some(Rect::new(10.0, 20.0, 300.0, 200.0)));
        assert_eq!(surface.size(), Some(vec2(300.0, 200.0)));

        surface.attach(Some(Rect::new(0.0, 0.0, 0.0, 200.0)));
        assert_eq!(surface.size(), None);
    }
}
