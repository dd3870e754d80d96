//! Channel colors and the density gradient

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Channel palette; channel `i` always gets `CHANNEL_COLORS[i % 12]`.
pub const CHANNEL_COLORS: [Rgb; 12] = [
    Rgb(99, 102, 241), // indigo
    Rgb(239, 68, 68),  // red
    Rgb(34, 197, 94),  // green
    Rgb(234, 179, 8),  // yellow
    Rgb(168, 85, 247), // purple
    Rgb(14, 165, 233), // blue
    Rgb(249, 115, 22), // orange
    Rgb(20, 184, 166), // teal
    Rgb(16, 185, 129), // emerald
    Rgb(244, 63, 94),  // rose
    Rgb(132, 204, 22), // lime
    Rgb(79, 70, 229),  // violet
];

/// Stable color for a channel index.
#[inline]
pub fn channel_color(channel: usize) -> Rgb {
    CHANNEL_COLORS[channel % CHANNEL_COLORS.len()]
}

/// Density gradient stops at 0.0, 0.2, 0.4, 0.6, 0.8 and 1.0.
pub const DENSITY_STOPS: [Rgb; 6] = [
    Rgb(12, 7, 133),    // dark purple
    Rgb(68, 1, 119),    // blue-violet
    Rgb(115, 192, 203), // cyan
    Rgb(253, 231, 37),  // green-yellow
    Rgb(252, 233, 3),   // yellow
    Rgb(247, 59, 31),   // red
];

/// Color for a bin holding `count` hits when the fullest bin holds `max_count`.
///
/// The fraction is clamped to `[0, 1]`; the fullest bin always maps to the
/// last stop.
pub fn density_color(count: u32, max_count: u32) -> Rgb {
    if max_count == 0 {
        return DENSITY_STOPS[0];
    }
    gradient(count as f64 / max_count as f64)
}

/// Sample the five-segment density gradient at `fraction`.
pub fn gradient(fraction: f64) -> Rgb {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let scaled = fraction * (DENSITY_STOPS.len() - 1) as f64;
    let segment = (scaled.floor() as usize).min(DENSITY_STOPS.len() - 2);
    let t = scaled - segment as f64;
    let from = DENSITY_STOPS[segment];
    let to = DENSITY_STOPS[segment + 1];
    Rgb(
        lerp(from.0, to.0, t),
        lerp(from.1, to.1, t),
        lerp(from.2, to.2, t),
    )
}

#[inline]
fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 * (1.0 - t) + b as f64 * t).floor().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_colors_cycle() {
        assert_eq!(channel_color(0), channel_color(12));
        assert_ne!(channel_color(0), channel_color(1));
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(0.0), Rgb(12, 7, 133));
        assert_eq!(gradient(1.0), Rgb(247, 59, 31));
        assert_eq!(gradient(2.0), Rgb(247, 59, 31));
        assert_eq!(density_color(7, 7), Rgb(247, 59, 31));
    }

    #[test]
    fn test_gradient_hits_interior_stops() {
        assert_eq!(gradient(0.4), Rgb(115, 192, 203));
        assert_eq!(gradient(0.6), Rgb(253, 231, 37));
    }

    #[test]
    fn test_gradient_interpolates() {
        // halfway between (12,7,133) and (68,1,119)
        assert_eq!(gradient(0.1), Rgb(40, 4, 126));
    }
}
