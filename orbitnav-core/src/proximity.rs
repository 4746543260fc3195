//! Piecewise-linear mapping from distance-to-geometry to a speed factor.

use crate::config::ProximityConfig;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Speed multiplier for a hit at `distance`, or open space for `None`.
///
/// Ramps from `min_speed` at zero distance up to 1.0 at `slow_distance`,
/// stays at 1.0 until `normal_distance`, then ramps to `max_speed` at
/// `fast_distance`.
pub fn speed_factor(config: &ProximityConfig, distance: Option<f32>) -> f32 {
    let Some(d) = distance else {
        return config.max_speed;
    };
    let d = d.max(0.0);

    if d < config.slow_distance {
        lerp(config.min_speed, 1.0, d / config.slow_distance)
    } else if d < config.normal_distance {
        1.0
    } else if d < config.fast_distance {
        let span = config.fast_distance - config.normal_distance;
        lerp(1.0, config.max_speed, (d - config.normal_distance) / span)
    } else {
        config.max_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProximityConfig {
        ProximityConfig {
            enabled: true,
            slow_distance: 10.0,
            normal_distance: 50.0,
            fast_distance: 150.0,
            min_speed: 0.2,
            max_speed: 4.0,
        }
    }

    #[test]
    fn test_endpoints() {
        let cfg = config();
        assert_eq!(speed_factor(&cfg, Some(0.0)), 0.2);
        assert_eq!(speed_factor(&cfg, Some(10.0)), 1.0);
        assert_eq!(speed_factor(&cfg, Some(49.9)), 1.0);
        assert_eq!(speed_factor(&cfg, Some(50.0)), 1.0);
        assert_eq!(speed_factor(&cfg, Some(150.0)), 4.0);
        assert_eq!(speed_factor(&cfg, Some(1.0e6)), 4.0);
    }

    #[test]
    fn test_interpolates_inside_ramps() {
        let cfg = config();
        assert!((speed_factor(&cfg, Some(5.0)) - 0.6).abs() < 1e-6);
        assert!((speed_factor(&cfg, Some(100.0)) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_hit_is_open_space() {
        assert_eq!(speed_factor(&config(), None), 4.0);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let cfg = config();
        let mut previous = speed_factor(&cfg, Some(0.0));
        for step in 1..=400 {
            let current = speed_factor(&cfg, Some(step as f32 * 0.5));
            assert!(current >= previous, "factor dropped at {}", step as f32 * 0.5);
            previous = current;
        }
    }

    #[test]
    fn test_negative_distance_clamps_to_min() {
        assert_eq!(speed_factor(&config(), Some(-3.0)), 0.2);
    }
}
