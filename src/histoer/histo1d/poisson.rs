//! Garwood (central, 68.27 %) confidence intervals for Poisson counts.

const ALPHA: f64 = 1.0 - 0.682_689_492;

fn ln_gamma(x: f64) -> f64 {
    // Lanczos approximation, g = 7
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = COEF[0];
    let t = x + 7.5;
    for (i, c) in COEF.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Regularized lower incomplete gamma function P(a, x).
pub fn gamma_p(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let gln = ln_gamma(a);
    if x < a + 1.0 {
        let mut ap = a;
        let mut sum = 1.0 / a;
        let mut del = sum;
        for _ in 0..500 {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del.abs() < sum.abs() * 1e-15 {
                break;
            }
        }
        (sum.ln() - x + a * x.ln() - gln).exp()
    } else {
        // continued fraction for Q(a, x)
        let tiny = 1e-300;
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / tiny;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..500 {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < tiny {
                d = tiny;
            }
            c = b + an / c;
            if c.abs() < tiny {
                c = tiny;
            }
            d = 1.0 / d;
            let del = d * c;
            h *= del;
            if (del - 1.0).abs() < 1e-15 {
                break;
            }
        }
        1.0 - (-x + a * x.ln() - gln).exp() * h
    }
}

/// x such that P(a, x) = p, found by bisection.
pub fn gamma_quantile(p: f64, a: f64) -> f64 {
    let mut low = 0.0;
    let mut high = a.max(1.0);
    while gamma_p(a, high) < p {
        high *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (low + high);
        if gamma_p(a, mid) < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < 1e-12 * high.max(1.0) {
            break;
        }
    }
    0.5 * (low + high)
}

pub fn lower_error(content: f64) -> f64 {
    let n = content.trunc();
    if n <= 0.0 {
        return 0.0;
    }
    content - gamma_quantile(ALPHA / 2.0, n)
}

pub fn upper_error(content: f64) -> f64 {
    let n = content.trunc();
    if n < 0.0 {
        return 0.0;
    }
    gamma_quantile(1.0 - ALPHA / 2.0, n + 1.0) - content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_gamma_matches_exponential() {
        // P(1, x) = 1 - exp(-x)
        for x in [0.1, 1.0, 2.5, 7.0] {
            assert!((gamma_p(1.0, x) - (1.0 - (-x).exp())).abs() < 1e-10);
        }
    }

    #[test]
    fn known_intervals() {
        assert!(lower_error(0.0).abs() < 1e-12);
        assert!((upper_error(0.0) - 1.8410).abs() < 1e-3);
        assert!((lower_error(1.0) - 0.8272).abs() < 1e-3);
        assert!((upper_error(1.0) - 2.2994).abs() < 1e-3);
        // large counts: n + sqrt(n) + 1 and n - sqrt(n)
        assert!((upper_error(400.0) - 21.0).abs() < 0.1);
        assert!((lower_error(400.0) - 20.0).abs() < 0.1);
    }
}
