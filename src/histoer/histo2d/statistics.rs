use super::histogram2d::Histogram2D;

impl Histogram2D {
    // Calculate (sum_w, mean_x, mean_y, var_x, var_y, cov_xy) over the visible cells
    fn moments(&self) -> (f64, f64, f64, f64, f64, f64) {
        let mut sw = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;
        for iy in 1..=self.nbins_y() {
            for ix in 1..=self.nbins_x() {
                let w = self.content(ix, iy);
                sw += w;
                sx += w * self.bin_center_x(ix);
                sy += w * self.bin_center_y(iy);
            }
        }
        if sw == 0.0 {
            return (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        }
        let (mx, my) = (sx / sw, sy / sw);
        let mut vx = 0.0;
        let mut vy = 0.0;
        let mut cxy = 0.0;
        for iy in 1..=self.nbins_y() {
            for ix in 1..=self.nbins_x() {
                let w = self.content(ix, iy);
                let dx = self.bin_center_x(ix) - mx;
                let dy = self.bin_center_y(iy) - my;
                vx += w * dx * dx;
                vy += w * dy * dy;
                cxy += w * dx * dy;
            }
        }
        (sw, mx, my, vx / sw, vy / sw, cxy / sw)
    }

    pub fn mean_x(&self) -> f64 {
        self.moments().1
    }

    pub fn mean_y(&self) -> f64 {
        self.moments().2
    }

    /// Pearson correlation of the binned distribution, 0 when undefined.
    pub fn correlation_factor(&self) -> f64 {
        let (_, _, _, vx, vy, cxy) = self.moments();
        if vx <= 0.0 || vy <= 0.0 {
            return 0.0;
        }
        cxy / (vx * vy).sqrt()
    }
}
