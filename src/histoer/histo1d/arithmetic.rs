use super::histogram1d::Histogram;

impl Histogram {
    pub fn scale(&mut self, factor: f64) {
        if !self.has_sumw2() && factor != 1.0 {
            self.enable_sumw2();
        }
        let (contents, sumw2) = self.cells_mut();
        contents.iter_mut().for_each(|c| *c *= factor);
        if let Some(sumw2) = sumw2 {
            sumw2.iter_mut().for_each(|w2| *w2 *= factor * factor);
        }
    }

    /// `self += factor * other`. Histograms with different binning are left
    /// untouched.
    pub fn add_scaled(&mut self, other: &Histogram, factor: f64) {
        if self.edges() != other.edges() {
            log::error!(
                "Cannot add histogram '{}' to '{}' with different binning",
                other.name,
                self.name
            );
            return;
        }
        let track_sumw2 = self.has_sumw2() || other.has_sumw2();
        if track_sumw2 {
            self.enable_sumw2();
        }
        let other_w2: Vec<f64> = (0..other.contents().len()).map(|b| other.sumw2(b)).collect();
        let (contents, sumw2) = self.cells_mut();
        for (c, o) in contents.iter_mut().zip(other.contents()) {
            *c += factor * o;
        }
        if let Some(sumw2) = sumw2 {
            for (w2, o) in sumw2.iter_mut().zip(&other_w2) {
                *w2 += factor * factor * o;
            }
        }
    }

    pub fn add(&mut self, other: &Histogram) {
        self.add_scaled(other, 1.0);
    }

    pub fn subtract(&mut self, other: &Histogram) {
        self.add_scaled(other, -1.0);
    }

    /// Bin-by-bin division with uncorrelated error propagation. Bins with a
    /// zero denominator become NaN with zero error.
    pub fn divide(&mut self, denominator: &Histogram) {
        if self.edges() != denominator.edges() {
            log::error!(
                "Cannot divide histogram '{}' by '{}' with different binning",
                self.name,
                denominator.name
            );
            return;
        }
        let n = self.contents().len();
        let mut contents = Vec::with_capacity(n);
        let mut sumw2 = Vec::with_capacity(n);
        for bin in 0..n {
            let c1 = self.content(bin);
            let c2 = denominator.content(bin);
            if c2 == 0.0 {
                contents.push(f64::NAN);
                sumw2.push(0.0);
                continue;
            }
            let e1 = self.sumw2(bin);
            let e2 = denominator.sumw2(bin);
            contents.push(c1 / c2);
            sumw2.push((e1 * c2 * c2 + e2 * c1 * c1) / (c2 * c2 * c2 * c2));
        }
        self.enable_sumw2();
        let (c, w2) = self.cells_mut();
        c.copy_from_slice(&contents);
        if let Some(w2) = w2 {
            w2.copy_from_slice(&sumw2);
        }
    }

    /// Folds the flow bins into the first/last visible bin and clears them.
    pub fn merge_overflow(&mut self, underflow: bool, overflow: bool) {
        let n = self.nbins();
        let (contents, sumw2) = self.cells_mut();
        let mut pairs = Vec::with_capacity(2);
        if underflow {
            pairs.push((0, 1));
        }
        if overflow {
            pairs.push((n + 1, n));
        }
        let mut sumw2 = sumw2;
        for (from, to) in pairs {
            contents[to] += contents[from];
            contents[from] = 0.0;
            if let Some(w2) = sumw2.as_deref_mut() {
                w2[to] += w2[from];
                w2[from] = 0.0;
            }
        }
    }

    pub fn has_uniform_bins(&self) -> bool {
        let avg = self.avg_bin_width();
        (1..=self.nbins()).all(|b| (self.bin_width(b) - avg).abs() <= 1e-9 * avg)
    }

    /// Converts contents to "per average bin width" densities. Uniform
    /// binning is left alone.
    pub fn adjust_density_for_bin_width(&mut self) {
        if self.has_uniform_bins() {
            return;
        }
        let avg = self.avg_bin_width();
        let factors: Vec<f64> = (0..self.contents().len())
            .map(|b| avg / self.bin_width(b))
            .collect();
        let (contents, sumw2) = self.cells_mut();
        for (c, f) in contents.iter_mut().zip(&factors) {
            *c *= f;
        }
        if let Some(sumw2) = sumw2 {
            for (w2, f) in sumw2.iter_mut().zip(&factors) {
                *w2 *= f * f;
            }
        }
    }

    /// Scales the visible width integral to `target` (times the average bin
    /// width when `per_avg_width`). Empty histograms are left unscaled.
    pub fn normalize(&mut self, target: f64, per_avg_width: bool) {
        let target = if per_avg_width {
            target * self.avg_bin_width()
        } else {
            target
        };
        let integral = self.integral_width(1, self.nbins());
        if integral == 0.0 || !integral.is_finite() {
            return;
        }
        self.scale(target / integral);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(edges: &[f64], values: &[(f64, f64)]) -> Histogram {
        let mut h = Histogram::new("h", edges);
        for &(x, w) in values {
            h.fill(x, w);
        }
        h
    }

    #[test]
    fn merge_overflow_conserves_total() {
        let base = filled(&[0.0, 1.0, 2.0, 3.0], &[(-1.0, 2.0), (0.5, 1.0), (2.5, 3.0), (9.0, 4.0)]);
        for (under, over) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut h = base.clone();
            h.merge_overflow(under, over);
            assert!((h.total() - base.total()).abs() < 1e-12);
            assert_eq!(h.content(0) == 0.0, under);
            assert_eq!(h.content(4) == 0.0, over);
        }
        let mut h = base;
        h.merge_overflow(true, true);
        assert!((h.content(1) - 3.0).abs() < 1e-12);
        assert!((h.content(3) - 7.0).abs() < 1e-12);
        assert!((h.sumw2(3) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn scale_updates_errors() {
        let mut h = filled(&[0.0, 1.0], &[(0.5, 2.0)]);
        h.scale(3.0);
        assert!((h.content(1) - 6.0).abs() < 1e-12);
        assert!((h.error(1) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn add_and_subtract() {
        let mut a = filled(&[0.0, 1.0, 2.0], &[(0.5, 1.0), (1.5, 2.0)]);
        let b = filled(&[0.0, 1.0, 2.0], &[(0.5, 3.0)]);
        a.add(&b);
        assert!((a.content(1) - 4.0).abs() < 1e-12);
        assert!((a.sumw2(1) - 10.0).abs() < 1e-12);
        a.subtract(&b);
        assert!((a.content(1) - 1.0).abs() < 1e-12);
        let c = filled(&[0.0, 2.0], &[(0.5, 3.0)]);
        a.add(&c);
        assert!((a.content(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn divide_marks_empty_denominators() {
        let mut num = filled(&[0.0, 1.0, 2.0], &[(0.5, 2.0), (1.5, 1.0)]);
        let mut den = filled(&[0.0, 1.0, 2.0], &[(0.5, 4.0)]);
        den.zero_errors();
        num.divide(&den);
        assert!((num.content(1) - 0.5).abs() < 1e-12);
        assert!((num.error(1) - 0.5).abs() < 1e-12);
        assert!(num.content(2).is_nan());
        assert!(num.error(2).abs() < 1e-12);
    }

    #[test]
    fn density_only_for_variable_bins() {
        let mut uniform = filled(&[0.0, 1.0, 2.0], &[(0.5, 2.0)]);
        uniform.adjust_density_for_bin_width();
        assert!((uniform.content(1) - 2.0).abs() < 1e-12);

        let mut variable = filled(&[0.0, 1.0, 4.0], &[(0.5, 2.0), (2.0, 6.0)]);
        variable.adjust_density_for_bin_width();
        // average width is 2
        assert!((variable.content(1) - 4.0).abs() < 1e-12);
        assert!((variable.content(2) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut h = filled(&[0.0, 2.0, 4.0], &[(1.0, 30.0), (3.0, 10.0)]);
        h.normalize(100.0, true);
        let once = h.clone();
        assert!((h.integral_width(1, 2) / h.avg_bin_width() - 100.0).abs() < 1e-9);
        h.normalize(100.0, true);
        for bin in 0..4 {
            assert!((h.content(bin) - once.content(bin)).abs() < 1e-9);
        }

        let mut empty = Histogram::new("e", &[0.0, 1.0]);
        empty.normalize(100.0, true);
        assert!(empty.total().abs() < 1e-12);
    }
}
