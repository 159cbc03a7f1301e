use fnv::FnvHashMap;

use super::histogram2d::Histogram2D;
use crate::render::scene::ScatterPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
struct WeightedPoint {
    x: f64,
    y: f64,
    w: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    count: u64,
    sum_w: f64,
    sum_w2: f64,
    sum_abs_w: f64,
    sum_x: f64,
    sum_y: f64,
    sum_x_abs_w: f64,
    sum_y_abs_w: f64,
}

impl Cell {
    fn add(&mut self, p: WeightedPoint) {
        self.count += 1;
        self.sum_w += p.w;
        self.sum_w2 += p.w * p.w;
        self.sum_abs_w += p.w.abs();
        self.sum_x += p.x;
        self.sum_y += p.y;
        self.sum_x_abs_w += p.x * p.w.abs();
        self.sum_y_abs_w += p.y * p.w.abs();
    }

    fn centroid(&self) -> (f64, f64) {
        if self.sum_abs_w > 0.0 {
            (self.sum_x_abs_w / self.sum_abs_w, self.sum_y_abs_w / self.sum_abs_w)
        } else {
            let n = self.count.max(1) as f64;
            (self.sum_x / n, self.sum_y / n)
        }
    }
}

// (x bin, y bin, x sub-cell, y sub-cell)
type CellKey = (usize, usize, u32, u32);

/// Accumulates `(x, y, w)` points. Beyond `max_points` the points are merged
/// into sub-cells nested inside the template binning, so binned output stays
/// exact while the scatter output keeps a bounded size.
#[derive(Debug, Clone)]
pub struct Clusterizer {
    template: Histogram2D,
    max_points: usize,
    points: Vec<WeightedPoint>,
    cells: Option<FnvHashMap<CellKey, Cell>>,
    subdivisions: u32,
}

impl Clusterizer {
    pub fn new(template: Histogram2D, max_points: usize) -> Self {
        Clusterizer {
            template,
            max_points: max_points.max(1),
            points: Vec::new(),
            cells: None,
            subdivisions: 1,
        }
    }

    pub fn is_clustered(&self) -> bool {
        self.cells.is_some()
    }

    pub fn n_points(&self) -> usize {
        match &self.cells {
            Some(cells) => cells.len(),
            None => self.points.len(),
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64, w: f64) {
        if x.is_nan() || y.is_nan() || w.is_nan() {
            return;
        }
        let point = WeightedPoint { x, y, w };
        let key = self.cell_key(point);
        if let Some(cells) = &mut self.cells {
            cells.entry(key).or_default().add(point);
            return;
        }
        self.points.push(point);
        if self.points.len() > self.max_points {
            self.cluster();
        }
    }

    fn sub_index(edges: &[f64], bin: usize, v: f64, subdivisions: u32) -> u32 {
        let n = edges.len() - 1;
        if bin == 0 || bin > n {
            return 0;
        }
        let (low, high) = (edges[bin - 1], edges[bin]);
        let frac = ((v - low) / (high - low)).clamp(0.0, 1.0);
        ((frac * f64::from(subdivisions)) as u32).min(subdivisions - 1)
    }

    fn cell_key(&self, p: WeightedPoint) -> CellKey {
        let ix = self.template.find_bin_x(p.x);
        let iy = self.template.find_bin_y(p.y);
        (
            ix,
            iy,
            Self::sub_index(self.template.x_edges(), ix, p.x, self.subdivisions),
            Self::sub_index(self.template.y_edges(), iy, p.y, self.subdivisions),
        )
    }

    fn cluster(&mut self) {
        let n_bins = (self.template.nbins_x() * self.template.nbins_y()).max(1);
        let per_bin = self.max_points as f64 / n_bins as f64;
        self.subdivisions = (per_bin.sqrt().floor() as u32).max(1);

        let mut cells: FnvHashMap<CellKey, Cell> = FnvHashMap::default();
        for point in std::mem::take(&mut self.points) {
            let key = self.cell_key(point);
            cells.entry(key).or_default().add(point);
        }
        log::debug!(
            "Clustered {} into {} cells ({} subdivisions per bin)",
            self.template.name,
            cells.len(),
            self.subdivisions
        );
        self.cells = Some(cells);
    }

    /// Binned view of every point, weights scaled by `luminosity`.
    pub fn histogram(&self, luminosity: f64) -> Histogram2D {
        let mut hist = self.template.clone();
        match &self.cells {
            Some(cells) => {
                let mut entries: Vec<_> = cells.values().collect();
                entries.sort_by(|a, b| a.sum_x.total_cmp(&b.sum_x));
                for cell in entries {
                    let (x, y) = cell.centroid();
                    hist.fill_merged(
                        x,
                        y,
                        cell.sum_w * luminosity,
                        cell.sum_w2 * luminosity * luminosity,
                    );
                }
            }
            None => {
                for p in &self.points {
                    hist.fill(p.x, p.y, p.w * luminosity);
                }
            }
        }
        hist
    }

    /// Weighted scatter points, weights scaled by `luminosity`.
    pub fn graph(&self, luminosity: f64) -> Vec<ScatterPoint> {
        let mut out: Vec<ScatterPoint> = match &self.cells {
            Some(cells) => cells
                .values()
                .map(|cell| {
                    let (x, y) = cell.centroid();
                    ScatterPoint {
                        x,
                        y,
                        weight: cell.sum_w * luminosity,
                    }
                })
                .collect(),
            None => self
                .points
                .iter()
                .map(|p| ScatterPoint {
                    x: p.x,
                    y: p.y,
                    weight: p.w * luminosity,
                })
                .collect(),
        };
        out.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        out
    }
}
