//! Dark-to-light sequential palette for bar charts.

pub type Rgb = (u8, u8, u8);

// Anchors of a dark purple to pale peach ramp.
const ANCHORS: [Rgb; 6] = [
    (3, 5, 26),
    (76, 29, 75),
    (161, 26, 91),
    (232, 63, 63),
    (246, 156, 115),
    (250, 235, 221),
];

/// `n` colours sampled at segment centres, darkest first.
pub fn bar_palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| sample((i as f64 + 0.5) / n as f64))
        .collect()
}

fn sample(t: f64) -> Rgb {
    let scaled = t.clamp(0.0, 1.0) * (ANCHORS.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(ANCHORS.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (ANCHORS[lo], ANCHORS[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance((r, g, b): Rgb) -> f64 {
        0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
    }

    #[test]
    fn test_palette_darkens_to_lightens() {
        let colors = bar_palette(7);
        assert_eq!(colors.len(), 7);
        for pair in colors.windows(2) {
            assert!(luminance(pair[0]) < luminance(pair[1]), "{:?}", pair);
        }
    }

    #[test]
    fn test_palette_edges() {
        assert!(bar_palette(0).is_empty());
        assert_eq!(sample(0.0), ANCHORS[0]);
        assert_eq!(sample(1.0), ANCHORS[5]);
    }
}
