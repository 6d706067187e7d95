//! Colormaps for filled contour plots.
//!
//! Wraps `colorous` gradients for the general-purpose maps and defines
//! explicit color-stop tables where a domain convention exists (terrain
//! shading, radar reflectivity).

use image::Rgb;

/// A continuous colormap sampled on `[0, 1]`.
#[derive(Clone, Copy)]
pub struct Colormap {
    kind: Kind,
}

#[derive(Clone, Copy)]
enum Kind {
    Gradient(&'static colorous::Gradient),
    GradientReversed(&'static colorous::Gradient),
    Stops(&'static [(f64, [u8; 3])]),
}

/// Terrain shading: deep blue through green and brown to white peaks.
static TERRAIN_STOPS: [(f64, [u8; 3]); 6] = [
    (0.00, [51, 51, 153]),
    (0.15, [0, 153, 255]),
    (0.25, [0, 204, 102]),
    (0.50, [255, 255, 153]),
    (0.75, [128, 92, 84]),
    (1.00, [255, 255, 255]),
];

/// Radar reflectivity convention: cyan to blue to green to yellow to red
/// to magenta.
static REFLECTIVITY_STOPS: [(f64, [u8; 3]); 9] = [
    (0.000, [0, 236, 236]),
    (0.125, [1, 160, 246]),
    (0.250, [0, 0, 246]),
    (0.375, [0, 255, 0]),
    (0.500, [0, 144, 0]),
    (0.625, [255, 255, 0]),
    (0.750, [255, 144, 0]),
    (0.875, [230, 0, 0]),
    (1.000, [255, 0, 255]),
];

impl Colormap {
    /// Rainbow map for general scalar fields.
    pub fn rainbow() -> Self {
        Self {
            kind: Kind::Gradient(&colorous::TURBO),
        }
    }

    /// Diverging blue-white-red map for signed fields.
    pub fn blue_red() -> Self {
        Self {
            kind: Kind::GradientReversed(&colorous::RED_BLUE),
        }
    }

    /// Terrain shading for topography maps.
    pub fn terrain() -> Self {
        Self {
            kind: Kind::Stops(&TERRAIN_STOPS),
        }
    }

    /// Radar reflectivity palette.
    pub fn reflectivity() -> Self {
        Self {
            kind: Kind::Stops(&REFLECTIVITY_STOPS),
        }
    }

    /// Sample the map at `t` in `[0, 1]` (clamped).
    pub fn sample(&self, t: f64) -> Rgb<u8> {
        let t = t.clamp(0.0, 1.0);
        match self.kind {
            Kind::Gradient(g) => {
                let c = g.eval_continuous(t);
                Rgb([c.r, c.g, c.b])
            }
            Kind::GradientReversed(g) => {
                let c = g.eval_continuous(1.0 - t);
                Rgb([c.r, c.g, c.b])
            }
            Kind::Stops(stops) => sample_stops(stops, t),
        }
    }
}

fn sample_stops(stops: &[(f64, [u8; 3])], t: f64) -> Rgb<u8> {
    let (&first, &last) = match (stops.first(), stops.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Rgb([0, 0, 0]),
    };
    if t <= first.0 {
        return Rgb(first.1);
    }
    if t >= last.0 {
        return Rgb(last.1);
    }

    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t >= t0 && t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let lerp = |a: u8, b: u8| (a as f64 + f * (b as f64 - a as f64)).round() as u8;
            return Rgb([lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]);
        }
    }
    Rgb(last.1)
}
