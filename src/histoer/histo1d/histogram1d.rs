use super::poisson;

/// Weighted histogram with variable binning.
///
/// Bins follow the usual HEP numbering: 0 is the underflow, 1..=nbins are the
/// visible bins and nbins+1 is the overflow. When the sum of squared weights
/// is not tracked, errors are Poisson intervals on the content.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Histogram {
    pub name: String,
    edges: Vec<f64>,
    contents: Vec<f64>,
    sumw2: Option<Vec<f64>>,
}

impl Histogram {
    // edges must be strictly increasing, which Axis guarantees
    pub fn new(name: &str, edges: &[f64]) -> Self {
        let cells = edges.len() + 1;
        Histogram {
            name: name.to_owned(),
            edges: edges.to_vec(),
            contents: vec![0.0; cells],
            sumw2: Some(vec![0.0; cells]),
        }
    }

    pub fn reset(&mut self) {
        self.contents.iter_mut().for_each(|c| *c = 0.0);
        if let Some(sumw2) = &mut self.sumw2 {
            sumw2.iter_mut().for_each(|c| *c = 0.0);
        }
    }

    pub fn nbins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Bin index for x; values outside the range land in the flow bins.
    pub fn find_bin(&self, x: f64) -> usize {
        let n = self.nbins();
        if x < self.edges[0] {
            0
        } else if x >= self.edges[n] {
            n + 1
        } else {
            self.edges.partition_point(|&e| e <= x)
        }
    }

    pub fn fill(&mut self, x: f64, weight: f64) {
        if x.is_nan() || weight.is_nan() {
            return;
        }
        let bin = self.find_bin(x);
        self.contents[bin] += weight;
        if let Some(sumw2) = &mut self.sumw2 {
            sumw2[bin] += weight * weight;
        }
    }

    // The flow bins borrow the width of their neighbouring visible bin.
    pub fn bin_width(&self, bin: usize) -> f64 {
        let n = self.nbins();
        let b = bin.clamp(1, n);
        self.edges[b] - self.edges[b - 1]
    }

    pub fn low_edge(&self, bin: usize) -> f64 {
        let n = self.nbins();
        match bin {
            0 => self.edges[0] - self.bin_width(0),
            b if b > n => self.edges[n],
            b => self.edges[b - 1],
        }
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        self.low_edge(bin) + 0.5 * self.bin_width(bin)
    }

    pub fn avg_bin_width(&self) -> f64 {
        (self.edges[self.nbins()] - self.edges[0]) / self.nbins() as f64
    }

    pub fn content(&self, bin: usize) -> f64 {
        self.contents.get(bin).copied().unwrap_or(0.0)
    }

    pub fn set_content(&mut self, bin: usize, value: f64) {
        if let Some(c) = self.contents.get_mut(bin) {
            *c = value;
        }
    }

    pub fn has_sumw2(&self) -> bool {
        self.sumw2.is_some()
    }

    pub fn sumw2(&self, bin: usize) -> f64 {
        match &self.sumw2 {
            Some(sumw2) => sumw2.get(bin).copied().unwrap_or(0.0),
            None => self.content(bin).abs(),
        }
    }

    /// Starts tracking squared weights, seeded from the Poisson expectation.
    pub fn enable_sumw2(&mut self) {
        if self.sumw2.is_none() {
            self.sumw2 = Some(self.contents.iter().map(|c| c.abs()).collect());
        }
    }

    pub fn disable_sumw2(&mut self) {
        self.sumw2 = None;
    }

    pub(crate) fn sumw2_cells(&self) -> Option<&[f64]> {
        self.sumw2.as_deref()
    }

    pub(crate) fn cells_mut(&mut self) -> (&mut [f64], Option<&mut [f64]>) {
        (&mut self.contents, self.sumw2.as_deref_mut())
    }

    pub fn error(&self, bin: usize) -> f64 {
        self.sumw2(bin).sqrt()
    }

    pub fn set_error(&mut self, bin: usize, error: f64) {
        self.enable_sumw2();
        if let Some(w2) = self.sumw2.as_mut().and_then(|s| s.get_mut(bin)) {
            *w2 = error * error;
        }
    }

    pub fn error_up(&self, bin: usize) -> f64 {
        if self.has_sumw2() {
            self.error(bin)
        } else {
            poisson::upper_error(self.content(bin))
        }
    }

    pub fn error_low(&self, bin: usize) -> f64 {
        if self.has_sumw2() {
            self.error(bin)
        } else {
            poisson::lower_error(self.content(bin))
        }
    }

    /// Sets every error to zero while keeping the contents.
    pub fn zero_errors(&mut self) {
        self.sumw2 = Some(vec![0.0; self.contents.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_uses_flow_bins() {
        let mut h = Histogram::new("h", &[0.0, 1.0, 3.0, 6.0]);
        h.fill(-1.0, 1.0);
        h.fill(0.0, 2.0);
        h.fill(2.9, 0.5);
        h.fill(6.0, 4.0);
        h.fill(f64::NAN, 100.0);
        assert_eq!(h.contents(), &[1.0, 2.0, 0.5, 0.0, 4.0]);
        assert!((h.sumw2(2) - 0.25).abs() < 1e-12);
        assert!((h.error(1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn widths_and_centers() {
        let h = Histogram::new("h", &[0.0, 1.0, 3.0, 6.0]);
        assert!((h.bin_width(2) - 2.0).abs() < 1e-12);
        assert!((h.bin_width(0) - 1.0).abs() < 1e-12);
        assert!((h.bin_width(4) - 3.0).abs() < 1e-12);
        assert!((h.bin_center(3) - 4.5).abs() < 1e-12);
        assert!((h.avg_bin_width() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn poisson_errors_without_sumw2() {
        let mut h = Histogram::new("h", &[0.0, 1.0]);
        h.set_content(1, 0.0);
        h.disable_sumw2();
        assert!(h.error_low(1).abs() < 1e-9);
        assert!((h.error_up(1) - 1.841).abs() < 1e-3);
    }
}
