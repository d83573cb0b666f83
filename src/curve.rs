//! Lissajous curve sampling.
//!
//! A frame traces `x(t) = sin(t)`, `y(t) = sin(t * frequency_ratio + phase)` for `t` in
//! `[0, cycles * 2π)`. The parameter is advanced by repeated addition, so the sample count can
//! differ by one from the exact quotient; that drift is accepted.

use std::f64::consts::TAU;

use crate::foundation::core::AnimationParams;

/// Inputs of one frame's curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveParams {
    /// Ratio between the `y` and `x` oscillator frequencies.
    pub frequency_ratio: f64,
    /// Phase offset of the `y` oscillator, in radians.
    pub phase: f64,
    /// Full turns of the `x` oscillator.
    pub cycles: u32,
    /// Step of `t`, in radians. Must be > 0.
    pub angular_step: f64,
}

impl CurveParams {
    pub fn new(params: &AnimationParams, frequency_ratio: f64, phase: f64) -> Self {
        Self {
            frequency_ratio,
            phase,
            cycles: params.cycles,
            angular_step: params.angular_step,
        }
    }

    /// Upper (exclusive) bound of `t`.
    pub fn t_end(&self) -> f64 {
        f64::from(self.cycles) * TAU
    }

    /// A fresh sampler over this curve.
    pub fn points(&self) -> LissajousCurve {
        LissajousCurve::new(*self)
    }
}

/// Finite, restartable sequence of `(x, y)` samples in `[-1, 1]²`.
#[derive(Clone, Debug)]
pub struct LissajousCurve {
    params: CurveParams,
    t: f64,
    t_end: f64,
}

impl LissajousCurve {
    pub fn new(params: CurveParams) -> Self {
        Self {
            t_end: params.t_end(),
            t: 0.0,
            params,
        }
    }
}

impl Iterator for LissajousCurve {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        // A non-positive step would never reach the end.
        if !(self.t < self.t_end) || !(self.params.angular_step > 0.0) {
            return None;
        }
        let t = self.t;
        self.t += self.params.angular_step;
        Some((
            t.sin(),
            (t * self.params.frequency_ratio + self.params.phase).sin(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if !(self.t < self.t_end) || !(self.params.angular_step > 0.0) {
            return (0, Some(0));
        }
        let approx = ((self.t_end - self.t) / self.params.angular_step).ceil() as usize;
        (approx.saturating_sub(1), Some(approx.saturating_add(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(freq: f64, phase: f64) -> CurveParams {
        CurveParams::new(&AnimationParams::default(), freq, phase)
    }

    #[test]
    fn samples_stay_in_unit_square() {
        for freq in [0.0, 0.5, 1.0, 1.5, 2.999] {
            for phase in [0.0, 0.2, 3.0, -7.5, 12.8, 1.0e6] {
                for (x, y) in curve(freq, phase).points() {
                    assert!((-1.0..=1.0).contains(&x), "x={x}");
                    assert!((-1.0..=1.0).contains(&y), "y={y}");
                }
            }
        }
    }

    #[test]
    fn sample_count_matches_range_and_step() {
        let c = curve(1.0, 0.0);
        let n = c.points().count();
        let expected = (c.t_end() / c.angular_step).ceil() as usize;
        assert!(n.abs_diff(expected) <= 1, "n={n} expected≈{expected}");
    }

    #[test]
    fn sampler_is_restartable_and_deterministic() {
        let c = curve(1.7, 0.4);
        let a: Vec<_> = c.points().take(500).collect();
        let b: Vec<_> = c.points().take(500).collect();
        assert_eq!(a, b);
        assert_eq!(a[0], (0.0, 0.4f64.sin()));
    }

    #[test]
    fn zero_frequency_keeps_y_constant() {
        let phase = 0.6;
        for (_, y) in curve(0.0, phase).points().take(1000) {
            assert_eq!(y, phase.sin());
        }
    }

    #[test]
    fn non_positive_step_yields_nothing() {
        let mut c = curve(1.0, 0.0);
        c.angular_step = 0.0;
        assert_eq!(c.points().count(), 0);
    }
}
