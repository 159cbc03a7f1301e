use super::histogram1d::Histogram;

impl Histogram {
    /// Sum of contents over `first..=last` (flow bins included when asked).
    pub fn integral(&self, first: usize, last: usize) -> f64 {
        self.integral_and_error(first, last, false).0
    }

    /// Sum of content times bin width over `first..=last`.
    pub fn integral_width(&self, first: usize, last: usize) -> f64 {
        self.integral_and_error(first, last, true).0
    }

    pub fn integral_and_error(&self, first: usize, last: usize, width: bool) -> (f64, f64) {
        let last = last.min(self.nbins() + 1);
        if first > last {
            return (0.0, 0.0);
        }
        let mut sum = 0.0;
        let mut sum_err2 = 0.0;
        for bin in first..=last {
            let w = if width { self.bin_width(bin) } else { 1.0 };
            sum += self.content(bin) * w;
            sum_err2 += self.sumw2(bin) * w * w;
        }
        (sum, sum_err2.sqrt())
    }

    /// Integral over the whole range, flow bins included.
    pub fn total(&self) -> f64 {
        self.integral(0, self.nbins() + 1)
    }

    /// Content-weighted mean of the visible bin centers.
    pub fn mean(&self) -> f64 {
        let mut sum_w = 0.0;
        let mut sum_wx = 0.0;
        for bin in 1..=self.nbins() {
            sum_w += self.content(bin);
            sum_wx += self.content(bin) * self.bin_center(bin);
        }
        if sum_w == 0.0 { 0.0 } else { sum_wx / sum_w }
    }

    // Calculate the standard deviation of the visible bins
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let mut sum_w = 0.0;
        let mut sum_sq = 0.0;
        for bin in 1..=self.nbins() {
            let diff = self.bin_center(bin) - mean;
            sum_w += self.content(bin);
            sum_sq += self.content(bin) * diff * diff;
        }
        if sum_w <= 0.0 { 0.0 } else { (sum_sq / sum_w).sqrt() }
    }

    /// Largest `content + error_up` (or plain content) strictly below
    /// `max_bound`. Non-finite bins are ignored.
    pub fn max_content(&self, max_bound: f64, include_error: bool, include_overflow: bool) -> f64 {
        let (first, last) = self.range_bins(include_overflow);
        let mut result = f64::NEG_INFINITY;
        for bin in first..=last {
            let mut value = self.content(bin);
            if include_error {
                value += self.error_up(bin);
            }
            if value.is_finite() && value > result && value < max_bound {
                result = value;
            }
        }
        result
    }

    /// Smallest `content - error_low` (or plain content) strictly above
    /// `min_bound`.
    pub fn min_content(&self, min_bound: f64, include_error: bool, include_overflow: bool) -> f64 {
        let (first, last) = self.range_bins(include_overflow);
        let mut result = f64::INFINITY;
        for bin in first..=last {
            let mut value = self.content(bin);
            if include_error {
                value -= self.error_low(bin).abs();
            }
            if value.is_finite() && value < result && value > min_bound {
                result = value;
            }
        }
        result
    }

    fn range_bins(&self, include_overflow: bool) -> (usize, usize) {
        if include_overflow {
            (0, self.nbins() + 1)
        } else {
            (1, self.nbins())
        }
    }
}
