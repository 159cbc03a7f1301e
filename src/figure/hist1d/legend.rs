use super::{Hist1D, SingleHist1D};
use crate::histoer::Histogram;
use crate::naming::fixed_digits;
use crate::plot_opt::{StackType, TitleType, legend_index};
use crate::process::ProcessType;
use crate::render::colors::Rgba;
use crate::render::scene::{Align, Legend, LegendEntry, Marker, Text};

// Rough width of one character in units of the text height.
const CHAR_WIDTH: f64 = 0.5;
const MARKER_FUDGE: f64 = 0.25;
// Shown when histograms are left at unit luminosity.
const FULL_RUN2_LUMINOSITY: &str = "137";

impl Hist1D {
    /// Component minus the next stacked background, if any. Signals keep
    /// what is drawn.
    fn unstacked(&self, group: &[SingleHist1D], index: usize) -> Histogram {
        let mut h = group[index].scaled.clone();
        let kind = group[index].process.kind;
        if kind == ProcessType::Background
            && self.this_opt.backgrounds_stacked()
            && let Some(next) = group.get(index + 1)
        {
            h.subtract(&next.scaled);
        }
        h
    }

    /// Yield shown in the legend: width integral over the average bin width.
    pub fn legend_yield(&self, group: &[SingleHist1D], index: usize) -> f64 {
        let h = self.unstacked(group, index);
        h.integral_width(1, h.nbins()) / h.avg_bin_width()
    }

    pub fn legend_mean(&self, group: &[SingleHist1D], index: usize) -> f64 {
        self.unstacked(group, index).mean()
    }

    fn entry_label(&self, group: &[SingleHist1D], index: usize) -> String {
        let mut label = group[index].process.name.clone();
        if self.this_opt.title != TitleType::Info {
            return label;
        }
        if self.this_opt.stack.is_shapes() {
            let mean = self.legend_mean(group, index);
            label.push_str(&format!(" [#mu={}]", fixed_digits(mean, 3)));
        } else {
            let value = self.legend_yield(group, index);
            let digits = if value >= 1.0 { 2 } else { 1 };
            label.push_str(&format!(" [N={}]", fixed_digits(value, digits)));
        }
        label
    }

    fn lumi_label(&self) -> String {
        let mut label = if !self.luminosity_tag.is_empty() {
            format!("L={} fb^{{-1}}", self.luminosity_tag)
        } else if self.luminosity == 1.0 {
            format!("L={FULL_RUN2_LUMINOSITY} fb^{{-1}}")
        } else {
            format!("L={} fb^{{-1}}", fixed_digits(self.luminosity, 3))
        };
        if self.this_opt.stack == StackType::DataNorm && !self.components.datas.is_empty() {
            label.push_str(&format!(
                ", ({}#pm{})%",
                fixed_digits(100.0 * self.mc_scale, 3),
                fixed_digits(100.0 * self.mc_scale_error, 2)
            ));
        }
        label
    }

    /// Legend columns filled data first, then backgrounds, then signals.
    pub fn legends(&self) -> Vec<Legend> {
        let opt = &self.this_opt;
        let n_entries = self.n_legend_entries();
        let n_columns = n_entries.min(opt.legend_columns).max(1);
        let top = opt.legend_top();
        let bottom = top - opt.true_legend_height(n_entries);
        let left = opt.legend_left();
        let delta_x = opt.true_legend_width(n_entries);
        let entry_height = opt.true_legend_entry_height(n_entries);

        let mut legends: Vec<Legend> = (0..n_columns)
            .map(|column| {
                let offset = if column == 0 { opt.legend_left_column_offset } else { 0.0 };
                let x1 = left + column as f64 * delta_x + offset;
                Legend {
                    x1,
                    y1: bottom,
                    x2: x1 + opt.legend_marker_width,
                    y2: top,
                    text_size: entry_height,
                    entries: Vec::new(),
                }
            })
            .collect();

        let max_width = (delta_x - opt.legend_marker_width * MARKER_FUDGE) * f64::from(opt.canvas_width);
        let max_height = entry_height * opt.legend_density * f64::from(opt.canvas_height);
        let mut text_size = entry_height;
        let mut added = 0;
        let groups = [
            (&self.components.datas, Marker::Points),
            (
                &self.components.backgrounds,
                if opt.backgrounds_stacked() { Marker::Fill } else { Marker::Line },
            ),
            (&self.components.signals, Marker::Line),
        ];
        for (group, marker) in groups {
            for (index, component) in group.iter().enumerate() {
                let label = self.entry_label(group, index);
                // shrink every column until the label fits its box
                let chars = label.chars().count() as f64;
                while text_size > 1e-4 {
                    let height = text_size * f64::from(opt.canvas_height);
                    if height * CHAR_WIDTH * chars <= max_width && height <= max_height {
                        break;
                    }
                    text_size *= 0.95;
                }
                let column = legend_index(added, n_entries, n_columns);
                legends[column].entries.push(LegendEntry {
                    label,
                    marker: marker.clone(),
                    color: component.process.style.color,
                });
                added += 1;
            }
        }

        if opt.display_lumi_entry() {
            let column = legend_index(added, n_entries, n_columns);
            legends[column].entries.push(LegendEntry {
                label: self.lumi_label(),
                marker: Marker::Empty,
                color: Rgba::WHITE,
            });
        }
        for legend in &mut legends {
            legend.text_size = text_size;
        }
        legends
    }

    fn luminosity_text(&self) -> String {
        if self.this_opt.stack == StackType::Shapes {
            "13 TeV".to_owned()
        } else if !self.luminosity_tag.is_empty() {
            format!("{} fb^{{-1}} (13 TeV)", self.luminosity_tag)
        } else if self.luminosity < 1.1 {
            format!("{FULL_RUN2_LUMINOSITY} fb^{{-1}} (13 TeV)")
        } else {
            format!("{} fb^{{-1}} (13 TeV)", fixed_digits(self.luminosity, 3))
        }
    }

    /// Texts above the frame: the selection for info plots, otherwise the
    /// experiment label and the luminosity.
    pub fn title_texts(&self) -> Vec<Text> {
        let opt = &self.this_opt;
        let left = opt.left_margin;
        let right = 1.0 - opt.right_margin;
        let bottom = 1.0 - opt.top_margin;
        let top = 1.0;
        let mut out = Vec::new();
        if opt.title == TitleType::Info {
            let title = self.title();
            if title.is_empty() {
                return out;
            }
            // shrink to fit the title region
            let max_width = (right - left) * f64::from(opt.canvas_width);
            let chars = title.chars().count() as f64;
            let mut size = opt.top_margin * 0.8;
            while size * f64::from(opt.canvas_height) * CHAR_WIDTH * chars > max_width && size > 1e-4 {
                size *= 0.8;
            }
            out.push(Text {
                x: 0.5 * (left + right),
                y: 0.5 * (bottom + top),
                text: title,
                size,
                align: Align::Center,
                font: opt.font,
            });
            return out;
        }

        let (x, y) = if opt.title_in_frame {
            (
                opt.left_margin + opt.legend_pad,
                1.0 - opt.top_margin - opt.legend_pad - opt.title_size,
            )
        } else {
            (left, bottom + 0.2 * (top - bottom))
        };
        out.push(Text {
            x,
            y,
            text: format!(
                "#font[62]{{CMS}}#scale[0.74]{{#font[52]{{ {}}}}}",
                opt.title.extra_label()
            ),
            size: opt.title_size,
            align: Align::Left,
            font: opt.font,
        });
        out.push(Text {
            x: right,
            y: bottom + 0.2 * (top - bottom),
            text: self.luminosity_text(),
            size: opt.title_size,
            align: Align::Right,
            font: opt.font,
        });
        out
    }

    /// Free labels stacked below the legend, left and right aligned.
    pub fn label_texts(&self) -> Vec<Text> {
        let opt = &self.this_opt;
        let legend_height = opt.true_legend_height(self.n_legend_entries());
        let row = |i: usize| (i + 1) as f64 * opt.extra_label_size;
        let left = self.left_label.iter().enumerate().map(|(i, label)| Text {
            x: opt.left_margin + 0.05,
            y: 1.0 - legend_height - 2.0 * opt.legend_pad - row(i) - 0.02,
            text: label.clone(),
            size: opt.extra_label_size,
            align: Align::Left,
            font: opt.font + 10,
        });
        let right = self.right_label.iter().enumerate().map(|(i, label)| Text {
            x: 1.0 - opt.right_margin - 0.03,
            y: 1.0 - legend_height - 0.01 - 2.0 * opt.legend_pad - row(i) - 0.02,
            text: label.clone(),
            size: opt.extra_label_size,
            align: Align::Right,
            font: opt.font + 10,
        });
        left.chain(right).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{axis, events, filled};
    use super::*;
    use crate::event::NamedFunc;
    use crate::figure::test_support::process;
    use crate::naming::NameCounter;
    use crate::plot_opt::PlotOpt;

    fn figure() -> Hist1D {
        let procs = vec![
            process("data", ProcessType::Data, events(&[3, 3, 3])),
            process("tt", ProcessType::Background, events(&[2, 2, 2])),
            process("dy", ProcessType::Background, events(&[1, 0, 0])),
            process("sig", ProcessType::Signal, events(&[0, 0, 1])),
        ];
        let mut figure = Hist1D::new(axis(), NamedFunc::default(), &procs, Vec::new());
        filled(&mut figure);
        figure
    }

    #[test]
    fn entries_follow_column_order() {
        let mut fig = figure();
        fig.refresh(1.0, &PlotOpt::default(), &NameCounter::new());
        let legends = fig.legends();
        assert_eq!(legends.len(), 2);
        // five entries over two columns: three then two
        assert_eq!(legends[0].entries.len(), 3);
        assert_eq!(legends[1].entries.len(), 2);
        assert!(legends[0].entries[0].label.starts_with("data"));
        assert_eq!(legends[0].entries[1].label, "tt [N=6.0]");
        assert_eq!(legends[0].entries[2].label, "dy [N=1.0]");
        assert_eq!(legends[1].entries[1].marker, Marker::Empty);
        assert_eq!(legends[1].entries[1].label, "L=137 fb^{-1}");
    }

    #[test]
    fn data_norm_lumi_entry_shows_scale() {
        let mut fig = figure();
        let opt = PlotOpt::default().stack(StackType::DataNorm);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let legends = fig.legends();
        let lumi = &legends[1].entries[1].label;
        assert!(lumi.starts_with("L=137 fb^{-1}, (129#pm"), "{lumi}");
    }

    #[test]
    fn shapes_show_means() {
        let mut fig = figure();
        let opt = PlotOpt::default().stack(StackType::Shapes);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let legends = fig.legends();
        let labels: Vec<&str> = legends
            .iter()
            .flat_map(|l| l.entries.iter().map(|e| e.label.as_str()))
            .collect();
        assert_eq!(labels.len(), 4);
        assert!(labels.contains(&"dy [#mu=0.500]"));
    }

    #[test]
    fn long_labels_shrink_text() {
        let procs = vec![process(
            "a_background_process_with_a_very_long_descriptive_name",
            ProcessType::Background,
            events(&[1, 1, 1]),
        )];
        let mut fig = Hist1D::new(axis(), NamedFunc::default(), &procs, Vec::new());
        filled(&mut fig);
        let opt = PlotOpt::default();
        fig.refresh(1.0, &opt, &NameCounter::new());
        let legends = fig.legends();
        assert!(legends[0].text_size < opt.true_legend_entry_height(2));
    }

    #[test]
    fn cms_title_and_luminosity() {
        let mut fig = figure().luminosity_tag("41.5");
        let opt = PlotOpt::default().title(TitleType::Preliminary);
        fig.refresh(41.5, &opt, &NameCounter::new());
        let texts = fig.title_texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].text.contains("Preliminary"));
        assert_eq!(texts[1].text, "41.5 fb^{-1} (13 TeV)");
        assert_eq!(texts[1].align, Align::Right);
    }

    #[test]
    fn unit_luminosity_reads_as_full_run2() {
        let mut fig = figure();
        let opt = PlotOpt::default().title(TitleType::Preliminary);
        fig.refresh(1.0, &opt, &NameCounter::new());
        assert_eq!(fig.title_texts()[1].text, "137 fb^{-1} (13 TeV)");
        assert_eq!(fig.lumi_label(), "L=137 fb^{-1}");

        fig.refresh(41.5, &opt, &NameCounter::new());
        assert_eq!(fig.title_texts()[1].text, "41.5 fb^{-1} (13 TeV)");
        assert_eq!(fig.lumi_label(), "L=41.5 fb^{-1}");
    }

    #[test]
    fn signal_on_top_yield_is_drawn_histogram() {
        let mut fig = figure();
        let opt = PlotOpt::default().stack(StackType::SignalOnTop);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let signals = &fig.components.signals;
        // one signal event stacked on seven background events
        assert!((fig.legend_yield(signals, 0) - 8.0).abs() < 1e-12);
        let labels: Vec<String> = fig
            .legends()
            .iter()
            .flat_map(|l| l.entries.iter().map(|e| e.label.clone()))
            .collect();
        assert!(labels.contains(&"sig [N=8.0]".to_owned()), "{labels:?}");
    }

    #[test]
    fn labels_sit_below_legend() {
        let mut fig = figure()
            .left_label(vec!["ee".to_owned(), "mumu".to_owned()])
            .right_label(vec!["SR".to_owned()]);
        fig.refresh(1.0, &PlotOpt::default(), &NameCounter::new());
        let labels = fig.label_texts();
        assert_eq!(labels.len(), 3);
        assert!(labels[1].y < labels[0].y);
        assert_eq!(labels[2].align, Align::Right);
    }
}
