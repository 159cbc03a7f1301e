use crate::error::HepError;
use crate::event::NamedFunc;

/// Binning and labelling for one plotted quantity.
#[derive(Debug, Clone)]
pub struct Axis {
    bins: Vec<f64>,
    pub var: NamedFunc,
    pub title: String,
    pub units: String,
    pub cut_vals: Vec<f64>,
    pub hard_cut_vals: Vec<f64>,
}

impl Axis {
    pub fn uniform(
        nbins: usize,
        low: f64,
        high: f64,
        var: NamedFunc,
        title: &str,
    ) -> Result<Self, HepError> {
        if nbins == 0 || !(low < high) {
            return Err(HepError::InvalidAxis(format!(
                "{title}: {nbins} bins between {low} and {high}"
            )));
        }
        let width = (high - low) / nbins as f64;
        let bins = (0..=nbins).map(|i| low + i as f64 * width).collect();
        Self::variable(bins, var, title)
    }

    pub fn variable(bins: Vec<f64>, var: NamedFunc, title: &str) -> Result<Self, HepError> {
        if bins.len() < 2 {
            return Err(HepError::InvalidAxis(format!(
                "{title}: need at least two bin edges"
            )));
        }
        if bins.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(HepError::InvalidAxis(format!(
                "{title}: bin edges must be strictly increasing"
            )));
        }
        Ok(Axis {
            bins,
            var,
            title: title.to_owned(),
            units: String::new(),
            cut_vals: Vec::new(),
            hard_cut_vals: Vec::new(),
        })
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = units.to_owned();
        self
    }

    pub fn cut_vals(mut self, cut_vals: Vec<f64>) -> Self {
        self.cut_vals = cut_vals;
        self
    }

    pub fn hard_cut_vals(mut self, hard_cut_vals: Vec<f64>) -> Self {
        self.hard_cut_vals = hard_cut_vals;
        self
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn nbins(&self) -> usize {
        self.bins.len() - 1
    }

    pub fn low(&self) -> f64 {
        self.bins[0]
    }

    pub fn high(&self) -> f64 {
        self.bins[self.bins.len() - 1]
    }

    pub fn avg_bin_width(&self) -> f64 {
        (self.high() - self.low()) / self.nbins() as f64
    }

    /// Title with units appended in brackets.
    pub fn full_title(&self) -> String {
        if self.units.is_empty() {
            self.title.clone()
        } else {
            format!("{} [{}]", self.title, self.units)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_edges() {
        let axis = Axis::uniform(4, 0.0, 100.0, NamedFunc::scalar_field("met"), "MET").unwrap();
        assert_eq!(axis.nbins(), 4);
        assert_eq!(axis.bins().len(), 5);
        assert!((axis.bins()[2] - 50.0).abs() < 1e-12);
        assert!((axis.avg_bin_width() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn variable_edges_must_increase() {
        let var = NamedFunc::scalar_field("met");
        assert!(Axis::variable(vec![0.0, 10.0, 10.0], var.clone(), "MET").is_err());
        assert!(Axis::variable(vec![0.0], var.clone(), "MET").is_err());
        assert!(Axis::uniform(0, 0.0, 1.0, var.clone(), "MET").is_err());
        assert!(Axis::uniform(3, 1.0, 1.0, var, "MET").is_err());
    }

    #[test]
    fn titles() {
        let axis = Axis::uniform(1, 0.0, 1.0, NamedFunc::scalar_field("met"), "E_{T}^{miss}")
            .unwrap()
            .units("GeV");
        assert_eq!(axis.full_title(), "E_{T}^{miss} [GeV]");
    }
}
