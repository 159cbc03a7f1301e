use super::colors::Rgba;

#[derive(PartialEq, Debug, Copy, Clone, serde::Serialize, serde::Deserialize, Default)]
pub enum ColorMap {
    #[default]
    Pastel,
    Viridis,
    Inferno,
}

impl ColorMap {
    fn stops(self) -> &'static [(f64, u8, u8, u8)] {
        match self {
            ColorMap::Pastel => PASTEL,
            ColorMap::Viridis => VIRIDIS,
            ColorMap::Inferno => INFERNO,
        }
    }

    /// Color for `value` on a `[min, max]` scale. Empty cells on a log scale
    /// have no color.
    pub fn color(self, value: f64, min: f64, max: f64, log_norm: bool) -> Option<Rgba> {
        if !value.is_finite() || (log_norm && value <= 0.0) {
            return None;
        }

        let normalized = if max > min {
            if log_norm {
                let min = min.max(f64::MIN_POSITIVE);
                (value.log10() - min.log10()) / (max.log10() - min.log10())
            } else {
                (value - min) / (max - min)
            }
        } else {
            0.0
        }
        .clamp(0.0, 1.0);

        let stops = self.stops();
        let mut lower = stops[0];
        let mut upper = stops[0];
        for stop in stops.iter().skip(1) {
            if stop.0 >= normalized {
                upper = *stop;
                break;
            }
            lower = *stop;
        }

        let scale = if upper.0 > lower.0 {
            (normalized - lower.0) / (upper.0 - lower.0)
        } else {
            0.0
        };
        let mix = |a: u8, b: u8| {
            (f64::from(a) + scale * (f64::from(b) - f64::from(a))).clamp(0.0, 255.0) as u8
        };
        Some(Rgba::rgb(
            mix(lower.1, upper.1),
            mix(lower.2, upper.2),
            mix(lower.3, upper.3),
        ))
    }
}

// scalar,RGB_r,RGB_g,RGB_b
const PASTEL: &[(f64, u8, u8, u8)] = &[
    (0.0, 181, 204, 242),
    (0.34, 128, 255, 255),
    (0.61, 255, 255, 128),
    (0.84, 255, 153, 102),
    (1.0, 255, 128, 128),
];

const VIRIDIS: &[(f64, u8, u8, u8)] = &[
    (0.0, 68, 1, 84),
    (0.125, 71, 44, 122),
    (0.25, 59, 81, 139),
    (0.375, 44, 113, 142),
    (0.5, 33, 144, 141),
    (0.625, 39, 173, 129),
    (0.75, 92, 200, 99),
    (0.875, 170, 220, 50),
    (1.0, 253, 231, 37),
];

const INFERNO: &[(f64, u8, u8, u8)] = &[
    (0.0, 0, 0, 4),
    (0.125, 31, 12, 72),
    (0.25, 85, 15, 109),
    (0.375, 136, 34, 106),
    (0.5, 186, 54, 85),
    (0.625, 227, 89, 51),
    (0.75, 249, 140, 10),
    (0.875, 249, 201, 50),
    (1.0, 252, 255, 164),
];
