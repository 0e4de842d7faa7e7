//! Parametric torus sweep, projection, depth test and shading

use crate::canvas::Surface;
use crate::config::{TorusParams, MIN_SPACING};
use crate::depth::DepthBuffer;
use crate::scroll::Rotation;
use crate::viewport::Viewport;
use serde::Serialize;
use std::f32::consts::TAU;

// Luminance quantization: floor(L * 8) buckets mapped onto 255 / 11
const LUMINANCE_BUCKETS: f32 = 8.0;
const LUMINANCE_DIVISOR: f32 = 11.0;

/// Counters for one rasterization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub samples: u64,       // Surface points swept
    pub behind_viewer: u64, // z <= 0, dropped before projection
    pub culled: u64,        // Facing away from the light (L <= 0)
    pub clipped: u64,       // Projected outside the surface
    pub occluded: u64,      // Lost the depth test
    pub written: u64,       // Pixels painted (including overdraw of farther samples)
}

/// A rotated surface point in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A sample that survived culling and projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i64,
    pub y: i64,
    pub ooz: f32,
    pub luminance: f32,
}

/// Precomputed sin/cos pairs for one sweep parameter over [0, 2π).
/// Steps finer than `MIN_SPACING` are raised to it.
fn trig_table(spacing: f32) -> Vec<(f32, f32)> {
    let step = spacing.max(MIN_SPACING);
    let count = (TAU / step).ceil() as usize;
    (0..=count)
        .map(|i| i as f32 * step)
        .take_while(|&angle| angle < TAU)
        .map(|angle| (angle.cos(), angle.sin()))
        .collect()
}

/// Torus geometry with its sweep tables, built once per parameter set
pub struct Torus {
    params: TorusParams,
    theta_trig: Vec<(f32, f32)>,
    phi_trig: Vec<(f32, f32)>,
}

impl Torus {
    pub fn new(params: TorusParams) -> Self {
        Self {
            theta_trig: trig_table(params.theta_spacing),
            phi_trig: trig_table(params.phi_spacing),
            params,
        }
    }

    pub fn params(&self) -> &TorusParams {
        &self.params
    }

    /// Visit every surviving fragment in sweep order without touching a surface.
    /// The depth buffer must already be sized and zeroed for this frame.
    pub fn sweep<F>(&self, rotation: Rotation, viewport: &Viewport, depth: &mut DepthBuffer, mut emit: F) -> FrameStats
    where
        F: FnMut(Fragment),
    {
        let mut stats = FrameStats::default();
        if viewport.is_empty() {
            return stats;
        }

        let TorusParams { r1, r2, k2, .. } = self.params;
        let (cos_a, sin_a) = (rotation.a.cos(), rotation.a.sin());
        let (cos_b, sin_b) = (rotation.b.cos(), rotation.b.sin());
        let half_w = viewport.width() as f32 / 2.0;
        let half_h = viewport.height() as f32 / 2.0;
        let k1 = viewport.k1();
        let aspect = viewport.cell_aspect();

        for &(cos_theta, sin_theta) in &self.theta_trig {
            let circle_x = r2 + r1 * cos_theta;
            let circle_y = r1 * sin_theta;

            for &(cos_phi, sin_phi) in &self.phi_trig {
                stats.samples += 1;
                let p = rotate(circle_x, circle_y, cos_phi, sin_phi, cos_a, sin_a, cos_b, sin_b, k2);

                if !(p.z > 0.0) || !p.z.is_finite() {
                    stats.behind_viewer += 1;
                    continue;
                }
                let ooz = 1.0 / p.z;

                let l = luminance(cos_theta, sin_theta, cos_phi, sin_phi, cos_a, sin_a, cos_b, sin_b);
                if l <= 0.0 {
                    stats.culled += 1;
                    continue;
                }

                let xp = (half_w + k1 * ooz * p.x).floor() as i64;
                let yp = (half_h - k1 * ooz * p.y * aspect).floor() as i64;

                if depth.index(xp, yp).is_none() {
                    stats.clipped += 1;
                    continue;
                }
                if !depth.test_and_set(xp, yp, ooz) {
                    stats.occluded += 1;
                    continue;
                }

                stats.written += 1;
                emit(Fragment { x: xp, y: yp, ooz, luminance: l });
            }
        }

        stats
    }

    /// Run one full pass: clear the surface, reset the depth buffer, paint
    pub fn rasterize<S>(&self, rotation: Rotation, viewport: &Viewport, depth: &mut DepthBuffer, surface: &mut S) -> FrameStats
    where
        S: Surface + ?Sized,
    {
        surface.clear();
        depth.reset(viewport.width(), viewport.height());
        self.sweep(rotation, viewport, depth, |frag| {
            surface.set_pixel(frag.x as u32, frag.y as u32, shade(frag.luminance));
        })
    }
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn rotate(
    circle_x: f32,
    circle_y: f32,
    cos_phi: f32,
    sin_phi: f32,
    cos_a: f32,
    sin_a: f32,
    cos_b: f32,
    sin_b: f32,
    k2: f32,
) -> Sample {
    Sample {
        x: circle_x * (cos_b * cos_phi + sin_a * sin_b * sin_phi) - circle_y * cos_a * sin_b,
        y: circle_x * (sin_b * cos_phi - sin_a * cos_b * sin_phi) + circle_y * cos_a * cos_b,
        z: k2 + cos_a * circle_x * sin_phi + circle_y * sin_a,
    }
}

/// Surface normal at (θ, φ) dotted with the fixed light direction, under rotation (A, B).
/// Ranges over roughly [-√2, √2].
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn luminance(
    cos_theta: f32,
    sin_theta: f32,
    cos_phi: f32,
    sin_phi: f32,
    cos_a: f32,
    sin_a: f32,
    cos_b: f32,
    sin_b: f32,
) -> f32 {
    cos_phi * cos_theta * sin_b - cos_a * cos_theta * sin_phi - sin_a * sin_theta
        + cos_b * (cos_a * sin_theta - cos_theta * sin_a * sin_phi)
}

/// Grey level for a luminance value: floor(255 * floor(L * 8) / 11), clamped to [0, 255]
pub fn shade(l: f32) -> u8 {
    if !l.is_finite() || l <= 0.0 {
        return 0;
    }
    let index = (l * LUMINANCE_BUCKETS).floor();
    let grey = (255.0 * (index / LUMINANCE_DIVISOR)).floor();
    grey.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::GreyCanvas;
    use std::collections::HashMap;

    impl Torus {
        fn sample_count(&self) -> usize {
            self.theta_trig.len() * self.phi_trig.len()
        }

        /// View-space position of the surface point at (θ, φ)
        fn sample(&self, theta: f32, phi: f32, rotation: Rotation) -> Sample {
            let TorusParams { r1, r2, k2, .. } = self.params;
            rotate(
                r2 + r1 * theta.cos(),
                r1 * theta.sin(),
                phi.cos(),
                phi.sin(),
                rotation.a.cos(),
                rotation.a.sin(),
                rotation.b.cos(),
                rotation.b.sin(),
                k2,
            )
        }
    }

    fn luminance_at(theta: f32, phi: f32, rotation: Rotation) -> f32 {
        luminance(
            theta.cos(),
            theta.sin(),
            phi.cos(),
            phi.sin(),
            rotation.a.cos(),
            rotation.a.sin(),
            rotation.b.cos(),
            rotation.b.sin(),
        )
    }

    /// Screen position of a view-space point, or None behind the viewer
    fn project(sample: Sample, viewport: &Viewport) -> Option<(i64, i64)> {
        if !(sample.z > 0.0) {
            return None;
        }
        let ooz = 1.0 / sample.z;
        let xp = (viewport.width() as f32 / 2.0 + viewport.k1() * ooz * sample.x).floor() as i64;
        let yp = (viewport.height() as f32 / 2.0 - viewport.k1() * ooz * sample.y * viewport.cell_aspect()).floor() as i64;
        Some((xp, yp))
    }

    fn setup(width: u32, height: u32) -> (Torus, Viewport, DepthBuffer) {
        let params = TorusParams::default();
        (
            Torus::new(params),
            Viewport::new(width, height, &params),
            DepthBuffer::new(width, height),
        )
    }

    #[test]
    fn luminance_is_zero_at_origin() {
        assert_eq!(luminance_at(0.0, 0.0, Rotation::default()), 0.0);
    }

    #[test]
    fn luminance_stays_within_sqrt_two() {
        let rotation = Rotation { a: 1.1, b: 2.3 };
        for i in 0..64 {
            for j in 0..64 {
                let l = luminance_at(i as f32 * 0.1, j as f32 * 0.1, rotation);
                assert!(l.abs() <= 2f32.sqrt() + 1e-5);
            }
        }
    }

    #[test]
    fn shade_quantizes_and_clamps() {
        assert_eq!(shade(0.0), 0);
        assert_eq!(shade(-0.5), 0);
        assert_eq!(shade(0.1), 0);
        // floor(0.5 * 8) = 4 -> floor(255 * 4 / 11)
        assert_eq!(shade(0.5), 92);
        assert_eq!(shade(1.0), 185);
        assert_eq!(shade(2f32.sqrt()), 255);
        assert_eq!(shade(1.5), 255);
        assert_eq!(shade(10.0), 255);
        assert_eq!(shade(f32::NAN), 0);
    }

    #[test]
    fn trig_table_covers_half_open_turn() {
        let table = trig_table(0.07);
        assert_eq!(table.len(), 90);
        assert_eq!(table[0], (1.0, 0.0));
        let table = trig_table(0.02);
        assert_eq!(table.len(), 315);
    }

    #[test]
    fn trig_table_length_is_bounded() {
        let finest = trig_table(MIN_SPACING).len();
        assert!((62_000..64_000).contains(&finest), "{}", finest);
        assert_eq!(trig_table(1e-9).len(), finest);
        assert_eq!(trig_table(f32::NAN).len(), finest);
        assert_eq!(trig_table(10.0).len(), 1);
    }

    #[test]
    fn projection_mirrors_under_negated_theta() {
        let (torus, viewport, _) = setup(100, 100);
        let rotation = Rotation::default();
        for i in 1..45 {
            let theta = i as f32 * 0.07;
            for j in 0..315 {
                let phi = j as f32 * 0.02;
                let up = project(torus.sample(theta, phi, rotation), &viewport).unwrap();
                let down = project(torus.sample(-theta, phi, rotation), &viewport).unwrap();
                assert_eq!(up.0, down.0, "column differs at theta={} phi={}", theta, phi);
                let v = torus.sample(theta, phi, rotation);
                let frac = (viewport.k1() * v.y / v.z).fract().abs();
                if frac > 1e-3 && frac < 1.0 - 1e-3 {
                    assert_eq!(up.1 + down.1, 99, "rows not mirrored at theta={} phi={}", theta, phi);
                }
            }
        }
    }

    #[test]
    fn depth_writes_never_regress() {
        let (torus, viewport, mut depth) = setup(120, 80);
        let rotation = Rotation { a: 0.7, b: 1.9 };
        let mut last: HashMap<(i64, i64), f32> = HashMap::new();
        let stats = torus.sweep(rotation, &viewport, &mut depth, |frag| {
            let prev = last.insert((frag.x, frag.y), frag.ooz);
            if let Some(prev) = prev {
                assert!(frag.ooz > prev);
            }
        });
        assert!(stats.written > 0);
        for ((x, y), ooz) in last {
            assert_eq!(depth.get(x, y), Some(ooz));
        }
    }

    #[test]
    fn center_is_painted_and_bounds_respected() {
        let (torus, viewport, mut depth) = setup(100, 100);
        let mut canvas = GreyCanvas::new(100, 100);
        let stats = torus.rasterize(Rotation::default(), &viewport, &mut depth, &mut canvas);
        assert!(stats.written > 0);

        let near_center = canvas
            .painted()
            .any(|(x, y, _)| (47..=53).contains(&x) && (47..=53).contains(&y));
        assert!(near_center, "no pixel painted near the center");

        let mut out_of_bounds = 0;
        torus.sweep(Rotation::default(), &viewport, &mut DepthBuffer::new(100, 100), |frag| {
            if !(0..100).contains(&frag.x) || !(0..100).contains(&frag.y) {
                out_of_bounds += 1;
            }
        });
        assert_eq!(out_of_bounds, 0);
    }

    #[test]
    fn counters_add_up() {
        let (torus, viewport, mut depth) = setup(64, 48);
        let stats = torus.sweep(Rotation { a: 0.3, b: 0.2 }, &viewport, &mut depth, |_| {});
        assert_eq!(stats.samples, torus.sample_count() as u64);
        assert_eq!(
            stats.samples,
            stats.behind_viewer + stats.culled + stats.clipped + stats.occluded + stats.written
        );
        assert_eq!(stats.behind_viewer, 0);
    }

    #[test]
    fn rasterize_is_deterministic() {
        let (torus, viewport, mut depth) = setup(90, 60);
        let rotation = Rotation { a: 2.2, b: 4.1 };
        let mut first = GreyCanvas::new(90, 60);
        let mut second = GreyCanvas::new(90, 60);
        let s1 = torus.rasterize(rotation, &viewport, &mut depth, &mut first);
        let s2 = torus.rasterize(rotation, &viewport, &mut depth, &mut second);
        assert_eq!(s1, s2);
        assert!(first == second);
    }

    #[test]
    fn small_viewport_clips_instead_of_failing() {
        let (torus, viewport, mut depth) = setup(8, 8);
        let mut canvas = GreyCanvas::new(8, 8);
        let stats = torus.rasterize(Rotation::default(), &viewport, &mut depth, &mut canvas);
        assert!(canvas.painted().all(|(x, y, _)| x < 8 && y < 8));
        assert!(stats.clipped + stats.occluded + stats.written > 0);
    }

    #[test]
    fn empty_viewport_produces_empty_frame() {
        let (torus, viewport, mut depth) = setup(0, 50);
        let mut canvas = GreyCanvas::new(0, 50);
        let stats = torus.rasterize(Rotation::default(), &viewport, &mut depth, &mut canvas);
        assert_eq!(stats, FrameStats::default());
        assert_eq!(canvas.painted_count(), 0);
    }

    #[test]
    fn viewer_inside_torus_drops_samples_behind_eye() {
        let params = TorusParams { k2: 1.5, ..TorusParams::default() };
        let torus = Torus::new(params);
        let viewport = Viewport::new(60, 60, &params);
        let mut depth = DepthBuffer::new(60, 60);
        let mut canvas = GreyCanvas::new(60, 60);
        let stats = torus.rasterize(Rotation::default(), &viewport, &mut depth, &mut canvas);
        assert!(stats.behind_viewer > 0);
        assert!(canvas.painted().all(|(x, y, _)| x < 60 && y < 60));
    }

    #[test]
    fn painted_pixels_are_lit() {
        let (torus, viewport, mut depth) = setup(80, 80);
        let mut canvas = GreyCanvas::new(80, 80);
        torus.rasterize(Rotation { a: 1.0, b: 0.5 }, &viewport, &mut depth, &mut canvas);
        // grey 0 is still a painted (lit, L in (0, 1/8)) pixel, but never above 255
        assert!(canvas.painted_count() > 0);
        assert!(canvas.painted().any(|(_, _, g)| g > 0));
    }
}
