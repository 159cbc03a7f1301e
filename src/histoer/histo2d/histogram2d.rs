/// Dense weighted 2D histogram with flow bins on both axes.
///
/// Cells are stored row-major: index = `iy * (nx + 2) + ix`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Histogram2D {
    pub name: String,
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
}

fn find_bin(edges: &[f64], v: f64) -> usize {
    let n = edges.len() - 1;
    if v < edges[0] {
        0
    } else if v >= edges[n] {
        n + 1
    } else {
        edges.partition_point(|&e| e <= v)
    }
}

impl Histogram2D {
    pub fn new(name: &str, x_edges: &[f64], y_edges: &[f64]) -> Self {
        let cells = (x_edges.len() + 1) * (y_edges.len() + 1);
        Histogram2D {
            name: name.to_owned(),
            x_edges: x_edges.to_vec(),
            y_edges: y_edges.to_vec(),
            contents: vec![0.0; cells],
            sumw2: vec![0.0; cells],
        }
    }

    pub fn nbins_x(&self) -> usize {
        self.x_edges.len() - 1
    }

    pub fn nbins_y(&self) -> usize {
        self.y_edges.len() - 1
    }

    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    fn index(&self, ix: usize, iy: usize) -> usize {
        iy * (self.nbins_x() + 2) + ix
    }

    pub fn find_bin_x(&self, x: f64) -> usize {
        find_bin(&self.x_edges, x)
    }

    pub fn find_bin_y(&self, y: f64) -> usize {
        find_bin(&self.y_edges, y)
    }

    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        self.fill_merged(x, y, weight, weight * weight);
    }

    /// Fills a pre-merged group of entries with total weight `weight` and
    /// summed squared weight `sumw2`.
    pub fn fill_merged(&mut self, x: f64, y: f64, weight: f64, sumw2: f64) {
        if x.is_nan() || y.is_nan() || weight.is_nan() {
            return;
        }
        let i = self.index(self.find_bin_x(x), self.find_bin_y(y));
        self.contents[i] += weight;
        self.sumw2[i] += sumw2;
    }

    pub fn content(&self, ix: usize, iy: usize) -> f64 {
        if ix > self.nbins_x() + 1 || iy > self.nbins_y() + 1 {
            return 0.0;
        }
        self.contents[self.index(ix, iy)]
    }

    pub fn error(&self, ix: usize, iy: usize) -> f64 {
        if ix > self.nbins_x() + 1 || iy > self.nbins_y() + 1 {
            return 0.0;
        }
        self.sumw2[self.index(ix, iy)].sqrt()
    }

    pub fn scale(&mut self, factor: f64) {
        self.contents.iter_mut().for_each(|c| *c *= factor);
        self.sumw2.iter_mut().for_each(|w2| *w2 *= factor * factor);
    }

    pub fn add(&mut self, other: &Histogram2D) {
        if self.x_edges != other.x_edges || self.y_edges != other.y_edges {
            log::error!(
                "Cannot add 2D histogram '{}' to '{}' with different binning",
                other.name,
                self.name
            );
            return;
        }
        for (c, o) in self.contents.iter_mut().zip(&other.contents) {
            *c += o;
        }
        for (w2, o) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *w2 += o;
        }
    }

    pub fn bin_center_x(&self, ix: usize) -> f64 {
        let b = ix.clamp(1, self.nbins_x());
        0.5 * (self.x_edges[b - 1] + self.x_edges[b])
    }

    pub fn bin_center_y(&self, iy: usize) -> f64 {
        let b = iy.clamp(1, self.nbins_y());
        0.5 * (self.y_edges[b - 1] + self.y_edges[b])
    }

    /// Visible cells, row-major without flow bins, as used for heatmaps.
    pub fn visible_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.nbins_x() * self.nbins_y());
        for iy in 1..=self.nbins_y() {
            for ix in 1..=self.nbins_x() {
                values.push(self.content(ix, iy));
            }
        }
        values
    }

    /// Smallest and largest visible content. Zero cells are skipped for the
    /// minimum when `positive_only`.
    pub fn z_range(&self, positive_only: bool) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in self.visible_values() {
            if positive_only && v <= 0.0 {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
        if min > max { (0.0, 1.0) } else { (min, max) }
    }
}
