//! Nonlinear channel mixer (NESdev formulas), scaled to a signed 16-bit sample.

/// Output amplitude applied to the 0.0..~1.0 mix.
pub const OUTPUT_AMPLITUDE: f32 = i16::MAX as f32;

/// Mix raw channel levels (pulse 0..15, triangle 0..15, noise 0..15, dmc 0..127) into 0.0..~1.0.
pub fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
    let pulse_sum = pulse1 as f32 + pulse2 as f32;
    let pulse_out = if pulse_sum > 0.0 {
        95.88 / (8128.0 / pulse_sum + 100.0)
    } else {
        0.0
    };

    let tnd_sum = triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;
    let tnd_out = if tnd_sum > 0.0 {
        159.79 / (1.0 / tnd_sum + 100.0)
    } else {
        0.0
    };

    pulse_out + tnd_out
}

/// `mix` scaled and clamped into an `i16` sample.
pub fn to_sample(mixed: f32) -> i16 {
    (mixed * OUTPUT_AMPLITUDE).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_zero() {
        assert_eq!(mix(0, 0, 0, 0, 0), 0.0);
        assert_eq!(to_sample(0.0), 0);
    }

    #[test]
    fn full_scale_stays_in_range() {
        let m = mix(15, 15, 15, 15, 127);
        assert!(m > 0.9 && m < 1.01);
        assert_eq!(to_sample(2.0), i16::MAX);
    }

    #[test]
    fn pulse_curve_matches_formula() {
        let m = mix(8, 0, 0, 0, 0);
        let expected = 95.88 / (8128.0 / 8.0 + 100.0);
        assert!((m - expected).abs() < 1e-6);
    }
}
