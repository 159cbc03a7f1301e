pub const COLOR_OPTIONS: &[(Rgba, &str)] = &[
    (Rgba::rgb(0, 0, 0), "black"),
    (Rgba::rgb(255, 255, 255), "white"),
    (Rgba::rgb(128, 128, 128), "gray"),
    (Rgba::rgb(220, 50, 32), "red"),
    (Rgba::rgb(0, 114, 178), "blue"),
    (Rgba::rgb(0, 158, 115), "green"),
    (Rgba::rgb(230, 159, 0), "orange"),
    (Rgba::rgb(240, 228, 66), "yellow"),
    (Rgba::rgb(86, 180, 233), "sky"),
    (Rgba::rgb(204, 121, 167), "purple"),
    (Rgba::rgb(213, 94, 0), "vermillion"),
    (Rgba::rgb(120, 47, 64), "garnet"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    /// Same color with opacity `alpha` in [0, 1].
    pub fn with_alpha(self, alpha: f64) -> Self {
        Rgba {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if let Some(hex) = name.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return Some(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        COLOR_OPTIONS
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(c, _)| *c)
    }

    pub fn to_image(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_hex() {
        assert_eq!(Rgba::from_name("Red"), Some(Rgba::rgb(220, 50, 32)));
        assert_eq!(Rgba::from_name("#ff8000"), Some(Rgba::rgb(255, 128, 0)));
        assert_eq!(Rgba::from_name("#ff80"), None);
        assert_eq!(Rgba::from_name("chartreuse"), None);
    }

    #[test]
    fn alpha() {
        assert_eq!(Rgba::BLACK.with_alpha(0.2).a, 51);
    }
}
