//! Minimal raster backend. Geometry (frames, histograms, markers, bands,
//! lines, heatmaps, scatters and legend swatches) is drawn; text is left to
//! the json scene dump.

use std::path::Path;

use image::RgbaImage;

use super::colors::Rgba;
use super::scene::{Drawable, Legend, LineStyle, Marker, Pad, Scene};
use crate::error::HepError;

#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

struct PadTransform<'a> {
    pad: &'a Pad,
    frame: Frame,
}

impl PadTransform<'_> {
    fn x(&self, x: f64) -> f64 {
        let (lo, hi) = self.pad.x_range;
        self.frame.left + (x - lo) / (hi - lo) * (self.frame.right - self.frame.left)
    }

    fn y(&self, y: f64) -> f64 {
        let (lo, hi) = self.pad.y_range;
        let frac = if self.pad.log_y {
            if y <= 0.0 || lo <= 0.0 {
                return self.frame.bottom;
            }
            (y.ln() - lo.ln()) / (hi.ln() - lo.ln())
        } else {
            (y - lo) / (hi - lo)
        };
        self.frame.bottom - frac * (self.frame.bottom - self.frame.top)
    }
}

fn blend(image: &mut RgbaImage, x: i64, y: i64, color: Rgba) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    let alpha = f64::from(color.a) / 255.0;
    let mix = |dst: u8, src: u8| (f64::from(src) * alpha + f64::from(dst) * (1.0 - alpha)).round() as u8;
    pixel.0 = [
        mix(pixel.0[0], color.r),
        mix(pixel.0[1], color.g),
        mix(pixel.0[2], color.b),
        255,
    ];
}

fn fill_rect(image: &mut RgbaImage, clip: Frame, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: Rgba) {
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
        return;
    }
    let xa = x0.min(x1).max(clip.left).round() as i64;
    let xb = x0.max(x1).min(clip.right).round() as i64;
    let ya = y0.min(y1).max(clip.top).round() as i64;
    let yb = y0.max(y1).min(clip.bottom).round() as i64;
    for y in ya..yb {
        for x in xa..xb {
            blend(image, x, y, color);
        }
    }
}

fn draw_line(
    image: &mut RgbaImage,
    clip: Frame,
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    color: Rgba,
    width: f64,
    style: LineStyle,
) {
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || width <= 0.0 {
        return;
    }
    let length = (x1 - x0).hypot(y1 - y0);
    let steps = length.ceil().max(1.0) as usize;
    let half = (width / 2.0).max(0.5);
    for i in 0..=steps {
        let on = match style {
            LineStyle::Solid => true,
            LineStyle::Dashed => (i / 6) % 2 == 0,
            LineStyle::Dotted => (i / 2) % 2 == 0,
            LineStyle::DashDot => matches!(i % 14, 0..=7 | 10..=11),
        };
        if !on {
            continue;
        }
        let t = i as f64 / steps as f64;
        let x = x0 + t * (x1 - x0);
        let y = y0 + t * (y1 - y0);
        if x < clip.left - half || x > clip.right + half || y < clip.top - half || y > clip.bottom + half {
            continue;
        }
        fill_rect(
            image,
            Frame {
                left: clip.left - half,
                right: clip.right + half,
                top: clip.top - half,
                bottom: clip.bottom + half,
            },
            (x - half, y - half),
            (x + half, y + half),
            color,
        );
    }
}

fn frame_of(pad: &Pad, width: f64, height: f64) -> Frame {
    let w = pad.x_high - pad.x_low;
    let h = pad.y_high - pad.y_low;
    Frame {
        left: (pad.x_low + pad.margins.left * w) * width,
        right: (pad.x_high - pad.margins.right * w) * width,
        top: (1.0 - (pad.y_high - pad.margins.top * h)) * height,
        bottom: (1.0 - (pad.y_low + pad.margins.bottom * h)) * height,
    }
}

fn draw_item(image: &mut RgbaImage, t: &PadTransform<'_>, item: &Drawable) {
    let clip = t.frame;
    match item {
        Drawable::Hist {
            edges,
            contents,
            fill,
            line,
            line_width,
            line_style,
            ..
        } => {
            let mut previous: Option<f64> = None;
            for (i, &c) in contents.iter().enumerate() {
                let (x0, x1) = (t.x(edges[i]), t.x(edges[i + 1]));
                let y = t.y(c);
                if let Some(color) = fill {
                    fill_rect(image, clip, (x0, y), (x1, clip.bottom), *color);
                }
                draw_line(image, clip, (x0, y), (x1, y), *line, *line_width, *line_style);
                if let Some(py) = previous {
                    draw_line(image, clip, (x0, py), (x0, y), *line, *line_width, *line_style);
                }
                previous = Some(y);
            }
        }
        Drawable::Points {
            x,
            y,
            err_low,
            err_high,
            color,
            marker_size,
            ..
        } => {
            let half = (marker_size * 3.0).max(1.0);
            for i in 0..x.len().min(y.len()) {
                if !y[i].is_finite() {
                    continue;
                }
                let px = t.x(x[i]);
                let lo = t.y(y[i] - err_low.get(i).copied().unwrap_or(0.0));
                let hi = t.y(y[i] + err_high.get(i).copied().unwrap_or(0.0));
                draw_line(image, clip, (px, lo), (px, hi), *color, 1.5, LineStyle::Solid);
                let py = t.y(y[i]);
                fill_rect(image, clip, (px - half, py - half), (px + half, py + half), *color);
            }
        }
        Drawable::Band {
            edges,
            low,
            high,
            color,
            ..
        } => {
            for i in 0..low.len().min(high.len()) {
                let (x0, x1) = (t.x(edges[i]), t.x(edges[i + 1]));
                fill_rect(image, clip, (x0, t.y(low[i])), (x1, t.y(high[i])), *color);
            }
        }
        Drawable::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
            style,
        } => {
            draw_line(image, clip, (t.x(*x1), t.y(*y1)), (t.x(*x2), t.y(*y2)), *color, *width, *style);
        }
        Drawable::Heatmap {
            x_edges,
            y_edges,
            values,
            colormap,
            z_range,
            log_z,
            ..
        } => {
            let nx = x_edges.len().saturating_sub(1);
            for (i, value) in values.iter().enumerate() {
                let (ix, iy) = (i % nx.max(1), i / nx.max(1));
                if iy + 1 >= y_edges.len() {
                    break;
                }
                if let Some(color) = colormap.color(*value, z_range.0, z_range.1, *log_z) {
                    fill_rect(
                        image,
                        clip,
                        (t.x(x_edges[ix]), t.y(y_edges[iy])),
                        (t.x(x_edges[ix + 1]), t.y(y_edges[iy + 1])),
                        color,
                    );
                }
            }
        }
        Drawable::Scatter {
            points,
            color,
            marker_size,
            ..
        } => {
            let max_w = points.iter().map(|p| p.weight.abs()).fold(0.0, f64::max);
            let half = (marker_size * 2.0).max(1.0);
            for p in points {
                let strength = if max_w > 0.0 { (p.weight.abs() / max_w).max(0.2) } else { 1.0 };
                let (px, py) = (t.x(p.x), t.y(p.y));
                fill_rect(image, clip, (px - half, py - half), (px + half, py + half), color.with_alpha(strength));
            }
        }
    }
}

fn draw_legend(image: &mut RgbaImage, legend: &Legend, width: f64, height: f64) {
    let rows = legend.entries.len().max(1) as f64;
    let left = legend.x1 * width;
    let box_w = (legend.x2 - legend.x1) * width;
    let top = (1.0 - legend.y2) * height;
    let row_h = (legend.y2 - legend.y1) * height / rows;
    let canvas = Frame {
        left: 0.0,
        right: width,
        top: 0.0,
        bottom: height,
    };
    for (i, entry) in legend.entries.iter().enumerate() {
        let y0 = top + i as f64 * row_h + 0.2 * row_h;
        let y1 = top + (i + 1) as f64 * row_h - 0.2 * row_h;
        let x0 = left;
        let x1 = left + 0.25 * box_w;
        match entry.marker {
            Marker::Fill => fill_rect(image, canvas, (x0, y0), (x1, y1), entry.color),
            Marker::Line => {
                let y = 0.5 * (y0 + y1);
                draw_line(image, canvas, (x0, y), (x1, y), entry.color, 3.0, LineStyle::Solid);
            }
            Marker::Points => {
                let (cx, cy) = (0.5 * (x0 + x1), 0.5 * (y0 + y1));
                fill_rect(image, canvas, (cx - 3.0, cy - 3.0), (cx + 3.0, cy + 3.0), entry.color);
            }
            Marker::Empty => {}
        }
    }
}

pub fn render(scene: &Scene) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(scene.width.max(1), scene.height.max(1), Rgba::WHITE.to_image());
    let (width, height) = (f64::from(image.width()), f64::from(image.height()));
    for pad in &scene.pads {
        let frame = frame_of(pad, width, height);
        let transform = PadTransform { pad, frame };
        for item in &pad.items {
            draw_item(&mut image, &transform, item);
        }
        let outline = Frame {
            left: 0.0,
            right: width,
            top: 0.0,
            bottom: height,
        };
        let corners = [
            ((frame.left, frame.top), (frame.right, frame.top)),
            ((frame.right, frame.top), (frame.right, frame.bottom)),
            ((frame.right, frame.bottom), (frame.left, frame.bottom)),
            ((frame.left, frame.bottom), (frame.left, frame.top)),
        ];
        for (a, b) in corners {
            draw_line(&mut image, outline, a, b, Rgba::BLACK, 1.0, LineStyle::Solid);
        }
        for legend in &pad.legends {
            draw_legend(&mut image, legend, width, height);
        }
    }
    image
}

pub fn write_scene(scene: &Scene, path: &Path) -> Result<(), HepError> {
    render(scene).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::Margins;

    #[test]
    fn filled_histogram_colors_frame() {
        let margins = Margins {
            left: 0.1,
            right: 0.1,
            bottom: 0.1,
            top: 0.1,
        };
        let mut pad = Pad::new("top", margins);
        pad.x_range = (0.0, 2.0);
        pad.y_range = (0.0, 10.0);
        pad.items.push(Drawable::Hist {
            name: "h".to_owned(),
            edges: vec![0.0, 1.0, 2.0],
            contents: vec![10.0, 5.0],
            fill: Some(Rgba::rgb(255, 0, 0)),
            line: Rgba::rgb(255, 0, 0),
            line_width: 1.0,
            line_style: LineStyle::Solid,
        });
        let scene = Scene {
            name: "t".to_owned(),
            width: 100,
            height: 100,
            pads: vec![pad],
            texts: Vec::new(),
        };
        let image = render(&scene);
        // inside the first (full height) bin
        assert_eq!(image.get_pixel(30, 50).0, [255, 0, 0, 255]);
        // above the second bin
        assert_eq!(image.get_pixel(70, 30).0, [255, 255, 255, 255]);
        // outside the frame
        assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
    }
}
