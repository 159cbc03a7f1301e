use crate::event::baby::truthy;
use crate::event::{Baby, NamedFunc, Value};

/// Applies the shared fill rule to one event and calls `fill` once per
/// accepted entry with the values of `vars` and the weight. Returns the
/// number of fills.
///
/// Scalar quantities broadcast. With any vector-valued cut, weight or
/// variable the number of entries is the shortest vector length, and entries
/// where a vector cut is false are skipped.
pub fn fill_event(
    cut: &NamedFunc,
    weight: &NamedFunc,
    vars: &[&NamedFunc],
    baby: &dyn Baby,
    mut fill: impl FnMut(&[f64], f64),
) -> usize {
    let mut length: Option<usize> = None;
    let mask = match cut.evaluate(baby) {
        Value::Scalar(pass) => {
            if !truthy(pass) {
                return 0;
            }
            None
        }
        Value::Vector(values) => {
            let mask: Vec<bool> = values.into_iter().map(truthy).collect();
            if !mask.iter().any(|&pass| pass) {
                return 0;
            }
            length = Some(mask.len());
            Some(mask)
        }
    };

    let weight = weight.evaluate(baby);
    let values: Vec<Value> = vars.iter().map(|v| v.evaluate(baby)).collect();
    for value in std::iter::once(&weight).chain(&values) {
        if let Some(n) = value.vector_len() {
            length = Some(length.map_or(n, |m| m.min(n)));
        }
    }

    let mut point = vec![0.0; values.len()];
    let mut fills = 0;
    for i in 0..length.unwrap_or(1) {
        if let Some(mask) = &mask
            && !mask[i]
        {
            continue;
        }
        for (p, value) in point.iter_mut().zip(&values) {
            *p = value.at(i);
        }
        fill(&point, weight.at(i));
        fills += 1;
    }
    fills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MapBaby;

    fn collect(cut: &NamedFunc, weight: &NamedFunc, var: &NamedFunc, baby: &MapBaby) -> Vec<(f64, f64)> {
        let mut out = Vec::new();
        let n = fill_event(cut, weight, &[var], baby, |v, w| out.push((v[0], w)));
        assert_eq!(n, out.len());
        out
    }

    #[test]
    fn scalars_fill_once() {
        let baby = MapBaby::new().with_scalar("x", 3.0).with_scalar("w", 2.0);
        let filled = collect(
            &NamedFunc::default(),
            &NamedFunc::scalar_field("w"),
            &NamedFunc::scalar_field("x"),
            &baby,
        );
        assert_eq!(filled, vec![(3.0, 2.0)]);
    }

    #[test]
    fn vector_cut_masks_entries() {
        let baby = MapBaby::new()
            .with_vector("pass", vec![1.0, 0.0, 1.0])
            .with_vector("pt", vec![10.0, 20.0, 30.0, 40.0])
            .with_scalar("w", 0.5);
        let filled = collect(
            &NamedFunc::vector_field("pass"),
            &NamedFunc::scalar_field("w"),
            &NamedFunc::vector_field("pt"),
            &baby,
        );
        assert_eq!(filled, vec![(10.0, 0.5), (30.0, 0.5)]);
    }

    #[test]
    fn all_false_vector_cut_fills_nothing() {
        let baby = MapBaby::new()
            .with_vector("pass", vec![0.0, 0.0])
            .with_scalar("x", 1.0);
        let filled = collect(
            &NamedFunc::vector_field("pass"),
            &NamedFunc::constant(1.0),
            &NamedFunc::scalar_field("x"),
            &baby,
        );
        assert!(filled.is_empty());
    }

    #[test]
    fn shortest_vector_wins() {
        let baby = MapBaby::new()
            .with_vector("pt", vec![1.0, 2.0, 3.0])
            .with_vector("w", vec![0.1, 0.2]);
        let filled = collect(
            &NamedFunc::default(),
            &NamedFunc::vector_field("w"),
            &NamedFunc::vector_field("pt"),
            &baby,
        );
        assert_eq!(filled, vec![(1.0, 0.1), (2.0, 0.2)]);
    }

    #[test]
    fn empty_vector_fills_nothing() {
        let baby = MapBaby::new().with_scalar("x", 1.0);
        let filled = collect(
            &NamedFunc::default(),
            &NamedFunc::constant(1.0),
            &NamedFunc::vector_field("missing"),
            &baby,
        );
        assert!(filled.is_empty());
    }

    #[test]
    fn falsy_scalar_cut_skips() {
        let baby = MapBaby::new().with_scalar("x", 1.0).with_scalar("pass", 0.0);
        let filled = collect(
            &NamedFunc::scalar_field("pass"),
            &NamedFunc::constant(1.0),
            &NamedFunc::scalar_field("x"),
            &baby,
        );
        assert!(filled.is_empty());
    }
}
