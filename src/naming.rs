use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out unique names for derived histograms. Shared between threads
/// through the render context.
#[derive(Debug, Default)]
pub struct NameCounter {
    next: AtomicU64,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&self, prefix: &str) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{id}")
    }
}

const PLAIN_TEXT: &[(&str, &str)] = &[
    ("&&", "_AND_"),
    ("||", "_OR_"),
    (">=", "GEQ"),
    ("<=", "LEQ"),
    ("==", "EQ"),
    ("!=", "NEQ"),
    (">", "GT"),
    ("<", "LT"),
    ("!", "NOT"),
    ("*", "_TIMES_"),
    ("/", "_DIV_"),
    ("+", "_PLUS_"),
    ("-", "_MINUS_"),
    (".", "p"),
    ("(", ""),
    (")", ""),
    ("[", ""),
    ("]", ""),
    (" ", ""),
];

/// Turns a cut or variable expression into something safe for file names.
pub fn code_to_plain_text(code: &str) -> String {
    let mut text = code.to_owned();
    for (from, to) in PLAIN_TEXT {
        text = text.replace(from, to);
    }
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Readable form of an expression for plot titles.
pub fn code_to_tex(code: &str) -> String {
    code.replace("&&", ", ")
        .replace(">=", " #geq ")
        .replace("<=", " #leq ")
        .replace("!=", " #neq ")
        .replace("==", " = ")
        .replace('>', " > ")
        .replace('<', " < ")
}

/// Formats `value` with at least `digits` significant digits and never in
/// scientific notation.
pub fn fixed_digits(value: f64, digits: i32) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0);
    format!("{value:.prec$}", prec = decimals as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_unique() {
        let counter = NameCounter::new();
        let a = counter.next_name("bkg_ttbar");
        let b = counter.next_name("bkg_ttbar");
        assert_ne!(a, b);
        assert_eq!(a, "bkg_ttbar_0");
    }

    #[test]
    fn plain_text_is_file_safe() {
        assert_eq!(code_to_plain_text("met>150&&nlep==2"), "metGT150_AND_nlepEQ2");
        assert_eq!(code_to_plain_text("weight*1.5"), "weight_TIMES_1p5");
    }

    #[test]
    fn fixed_digit_formatting() {
        assert_eq!(fixed_digits(1234.56, 2), "1235");
        assert_eq!(fixed_digits(0.012345, 2), "0.012");
        assert_eq!(fixed_digits(3.14159, 3), "3.14");
        assert_eq!(fixed_digits(0.0, 2), "0");
    }
}
