use super::PlotOpt;
use super::types::BottomType;
use crate::render::scene::Margins;

/// Column for legend entry `entry` when `n_entries` are spread over
/// `n_columns` columns, filling one column after the other. The first
/// `n_entries % n_columns` columns hold one extra entry.
pub fn legend_index(entry: usize, n_entries: usize, n_columns: usize) -> usize {
    if n_columns == 0 {
        return 0;
    }
    let per_column = n_entries / n_columns;
    let with_extra = n_entries % n_columns;
    let mut boundary = 0;
    for column in 0..n_columns {
        boundary += per_column;
        if column < with_extra {
            boundary += 1;
        }
        if entry < boundary {
            return column;
        }
    }
    n_columns - 1
}

impl PlotOpt {
    fn has_bottom(&self) -> bool {
        self.bottom != BottomType::Off
    }

    /// Maps a y coordinate of the top pad's frame region onto the canvas.
    pub fn top_to_global_y_ndc(&self, y: f64) -> f64 {
        if !self.has_bottom() {
            return y;
        }
        1.0 - (1.0 - y) * (1.0 - self.bottom_margin - self.bottom_height)
    }

    pub fn global_to_top_y_ndc(&self, y: f64) -> f64 {
        if !self.has_bottom() {
            return y;
        }
        1.0 - (1.0 - y) / (1.0 - self.bottom_margin - self.bottom_height)
    }

    pub fn bottom_to_global_y_ndc(&self, y: f64) -> f64 {
        if !self.has_bottom() {
            return y;
        }
        y * (self.bottom_margin + self.bottom_height)
    }

    pub fn top_pad_margins(&self) -> Margins {
        Margins {
            left: self.left_margin,
            right: self.right_margin,
            top: self.top_margin,
            bottom: if self.has_bottom() {
                self.bottom_height
            } else {
                self.bottom_margin
            },
        }
    }

    pub fn bottom_pad_margins(&self) -> Margins {
        Margins {
            left: self.left_margin,
            right: self.right_margin,
            top: 1.0 - self.bottom_height,
            bottom: self.bottom_margin,
        }
    }

    fn legend_rows(&self, n_entries: usize) -> f64 {
        let columns = self.legend_columns.max(1);
        n_entries.div_ceil(columns) as f64
    }

    pub fn true_legend_height(&self, n_entries: usize) -> f64 {
        self.legend_max_height
            .min(self.legend_entry_height * self.legend_rows(n_entries))
    }

    pub fn true_legend_entry_height(&self, n_entries: usize) -> f64 {
        let rows = self.legend_rows(n_entries);
        if rows == 0.0 {
            return self.legend_entry_height;
        }
        self.true_legend_height(n_entries) / rows
    }

    pub fn legend_left(&self) -> f64 {
        let in_frame = if self.title_in_frame { 0.3 } else { 0.0 };
        self.left_margin + self.legend_left_pad + self.legend_pad + in_frame
    }

    pub fn legend_right(&self) -> f64 {
        1.0 - self.right_margin - self.legend_pad
    }

    pub fn legend_top(&self) -> f64 {
        1.0 - self.top_margin - self.legend_pad
    }

    pub fn true_legend_width(&self, n_entries: usize) -> f64 {
        let columns = n_entries.min(self.legend_columns).max(1);
        (self.legend_right() - self.legend_left()) / columns as f64
    }

    /// Factor by which the y range must grow so the legend does not cover
    /// the data.
    pub fn legend_ratio(&self, n_entries: usize) -> f64 {
        let margins = self.top_pad_margins();
        let pad_height = 1.0 - margins.top - margins.bottom;
        let free = pad_height - self.true_legend_height(n_entries) - 2.0 * self.legend_pad;
        if free <= 0.0 {
            return 1.0;
        }
        pad_height / free
    }
}
