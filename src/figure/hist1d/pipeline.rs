use super::{Hist1D, SingleHist1D};
use crate::naming::NameCounter;
use crate::plot_opt::{PlotOpt, StackType};
use crate::process::ProcessType;

fn prefix(kind: ProcessType) -> &'static str {
    match kind {
        ProcessType::Background => "bkg",
        ProcessType::Signal => "sig",
        ProcessType::Data => "dat",
    }
}

impl Hist1D {
    /// Rebuilds every scaled histogram from the raw ones for `opt`. Raw
    /// histograms are never modified, so refreshing is repeatable.
    pub fn refresh(&mut self, luminosity: f64, opt: &PlotOpt, names: &NameCounter) {
        self.this_opt = opt.clone().make_sane();
        self.luminosity = luminosity;
        self.initialize_histos(names);
        self.merge_overflow();
        self.scale_histos();
        self.stack_histos();
        self.normalize_histos();
        self.fix_asymm_errors();
    }

    fn initialize_histos(&mut self, names: &NameCounter) {
        for component in self.components.iter_mut() {
            component.scaled = component.raw.clone();
            let kind = component.process.kind;
            component.scaled.name =
                names.next_name(&format!("{}_{}", prefix(kind), component.process.name));
        }
    }

    fn merge_overflow(&mut self) {
        let underflow = self.this_opt.overflow.merges_underflow();
        let overflow = self.this_opt.overflow.merges_overflow();
        for component in self.components.iter_mut() {
            component.scaled.merge_overflow(underflow, overflow);
        }
    }

    fn scale_histos(&mut self) {
        let luminosity = self.luminosity;
        for component in self.components.iter_mut() {
            component.scaled.adjust_density_for_bin_width();
            if component.process.kind != ProcessType::Data {
                component.scaled.scale(luminosity);
            }
        }
    }

    fn stack_histos(&mut self) {
        if !self.this_opt.backgrounds_stacked() {
            return;
        }
        let backgrounds = &mut self.components.backgrounds;
        for i in (0..backgrounds.len().saturating_sub(1)).rev() {
            let (head, tail) = backgrounds.split_at_mut(i + 1);
            head[i].scaled.add(&tail[0].scaled);
        }
        if self.this_opt.stack == StackType::SignalOnTop
            && let Some(total) = self.components.backgrounds.first()
        {
            let total = total.scaled.clone();
            for signal in &mut self.components.signals {
                signal.scaled.add(&total);
            }
        }
    }

    fn normalize_histos(&mut self) {
        self.mc_scale = 1.0;
        self.mc_scale_error = 1.0;
        match self.this_opt.stack {
            StackType::DataNorm => self.normalize_to_data(),
            StackType::Shapes => {
                for component in self.components.iter_mut() {
                    component.scaled.normalize(100.0, true);
                }
            }
            _ => {}
        }
    }

    fn normalize_to_data(&mut self) {
        let (Some(data), Some(mc)) = (
            self.components.datas.first(),
            self.components.backgrounds.first(),
        ) else {
            return;
        };
        let last = data.scaled.nbins() + 1;
        let (data_norm, data_err) = data.scaled.integral_and_error(0, last, true);
        let (mc_norm, mc_err) = mc.scaled.integral_and_error(0, last, true);

        if mc_norm == 0.0 {
            self.mc_scale = 1.0;
            self.mc_scale_error = 1.0;
        } else {
            self.mc_scale = data_norm / mc_norm;
            self.mc_scale_error = (data_norm * mc_err).hypot(mc_norm * data_err) / (mc_norm * mc_norm);
        }

        for background in &mut self.components.backgrounds {
            background.scaled.scale(self.mc_scale);
        }
        for data in &mut self.components.datas {
            let integral = data.scaled.integral_width(0, last);
            if integral != 0.0 {
                data.scaled.scale(data_norm / integral);
            }
        }

        log::info!(
            "MC scale factor for {}: {:.4} ± {:.4}",
            self.xaxis.var.name(),
            self.mc_scale,
            self.mc_scale_error
        );
        if self.this_opt.print_vals {
            println!(
                "Normalization factor Data/MC = {:.4} ± {:.4}",
                self.mc_scale, self.mc_scale_error
            );
        }
    }

    fn fix_asymm_errors(&mut self) {
        let error_on_zero_data = self.this_opt.error_on_zero_data;
        let n_datas = self.components.datas.len();
        for component in self
            .components
            .backgrounds
            .iter_mut()
            .chain(&mut self.components.signals)
        {
            fix_asymm_errors(component, false);
        }
        for (i, component) in self.components.datas.iter_mut().enumerate() {
            fix_asymm_errors(component, error_on_zero_data && i + 1 == n_datas);
        }
    }
}

/// Switches to Poisson errors when the histogram still holds unit weights
/// only.
fn fix_asymm_errors(component: &mut SingleHist1D, force: bool) {
    let h = &mut component.scaled;
    if !h.has_sumw2() {
        return;
    }
    let unit_weights = (0..=h.nbins() + 1)
        .all(|bin| (h.sumw2(bin) - h.content(bin)).abs() <= 4.0 * f64::EPSILON * h.content(bin));
    if unit_weights || force {
        h.disable_sumw2();
    }
}
