use fnv::FnvHashMap;

use crate::error::HepError;

/// One event row. Fields are either a single number or a per-object list
/// (one entry per jet, lepton, photon, ...).
pub trait Baby {
    fn scalar(&self, field: &str) -> Option<f64>;
    fn vector(&self, field: &str) -> Option<&[f64]>;
}

/// Anything that can replay its rows to a closure. Implemented by the
/// columnar [`EventTable`](super::event_table::EventTable) and by plain
/// vectors of [`MapBaby`] for hand built samples.
pub trait EventSource: Send + Sync {
    fn for_each_event(&self, f: &mut dyn FnMut(&dyn Baby)) -> Result<usize, HepError>;

    fn len_hint(&self) -> usize {
        0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    pub fn vector_len(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::Vector(v) => Some(v.len()),
        }
    }

    /// Element `i`, with scalars broadcast to every index.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Value::Scalar(x) => *x,
            Value::Vector(v) => v.get(i).copied().unwrap_or(f64::NAN),
        }
    }

    /// Element-wise combination. Two scalars give a scalar; otherwise the
    /// result is as long as the shortest vector operand.
    pub fn zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(*a, *b)),
            _ => {
                let n = match (self.vector_len(), other.vector_len()) {
                    (Some(a), Some(b)) => a.min(b),
                    (Some(a), None) | (None, Some(a)) => a,
                    (None, None) => 0,
                };
                Value::Vector((0..n).map(|i| f(self.at(i), other.at(i))).collect())
            }
        }
    }
}

/// Numbers used as booleans: non-zero and not NaN is true.
pub fn truthy(x: f64) -> bool {
    x != 0.0 && !x.is_nan()
}

/// A single in-memory event, handy for tests and small hand built samples.
#[derive(Debug, Clone, Default)]
pub struct MapBaby {
    fields: FnvHashMap<String, Value>,
}

impl MapBaby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar(mut self, field: &str, value: f64) -> Self {
        self.fields.insert(field.to_owned(), Value::Scalar(value));
        self
    }

    pub fn with_vector(mut self, field: &str, values: Vec<f64>) -> Self {
        self.fields.insert(field.to_owned(), Value::Vector(values));
        self
    }
}

impl Baby for MapBaby {
    fn scalar(&self, field: &str) -> Option<f64> {
        match self.fields.get(field) {
            Some(Value::Scalar(x)) => Some(*x),
            _ => None,
        }
    }

    fn vector(&self, field: &str) -> Option<&[f64]> {
        match self.fields.get(field) {
            Some(Value::Vector(v)) => Some(v),
            _ => None,
        }
    }
}

impl EventSource for Vec<MapBaby> {
    fn for_each_event(&self, f: &mut dyn FnMut(&dyn Baby)) -> Result<usize, HepError> {
        for baby in self {
            f(baby);
        }
        Ok(self.len())
    }

    fn len_hint(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_broadcasts_scalars() {
        let a = Value::Vector(vec![1.0, 2.0, 3.0]);
        let b = Value::Scalar(10.0);
        assert_eq!(a.zip_with(&b, |x, y| x + y), Value::Vector(vec![11.0, 12.0, 13.0]));
    }

    #[test]
    fn zip_truncates_to_shortest_vector() {
        let a = Value::Vector(vec![1.0, 2.0, 3.0]);
        let b = Value::Vector(vec![1.0, 1.0]);
        assert_eq!(a.zip_with(&b, |x, y| x * y).vector_len(), Some(2));
    }

    #[test]
    fn map_baby_separates_field_kinds() {
        let baby = MapBaby::new()
            .with_scalar("met", 120.0)
            .with_vector("jet_pt", vec![50.0, 30.0]);
        assert_eq!(baby.scalar("met"), Some(120.0));
        assert!(baby.vector("met").is_none());
        assert_eq!(baby.vector("jet_pt").map(<[f64]>::len), Some(2));
        assert!(baby.scalar("missing").is_none());
    }

    #[test]
    fn nan_is_false() {
        assert!(!truthy(f64::NAN));
        assert!(!truthy(0.0));
        assert!(truthy(-1.0));
    }
}
