use std::fmt;
use std::sync::Arc;

use super::baby::{Baby, Value, truthy};

type Eval = Arc<dyn Fn(&dyn Baby) -> Value + Send + Sync>;

/// A named, cheaply clonable function of one event row. The name doubles
/// as the human readable description used for titles and file names.
#[derive(Clone)]
pub struct NamedFunc {
    name: String,
    is_vector: bool,
    eval: Eval,
}

impl NamedFunc {
    pub fn scalar<F>(name: &str, f: F) -> Self
    where
        F: Fn(&dyn Baby) -> f64 + Send + Sync + 'static,
    {
        NamedFunc {
            name: name.to_owned(),
            is_vector: false,
            eval: Arc::new(move |b| Value::Scalar(f(b))),
        }
    }

    pub fn vector<F>(name: &str, f: F) -> Self
    where
        F: Fn(&dyn Baby) -> Vec<f64> + Send + Sync + 'static,
    {
        NamedFunc {
            name: name.to_owned(),
            is_vector: true,
            eval: Arc::new(move |b| Value::Vector(f(b))),
        }
    }

    pub fn constant(value: f64) -> Self {
        NamedFunc::scalar(&format_number(value), move |_| value)
    }

    /// Reads a scalar field; missing fields evaluate to NaN.
    pub fn scalar_field(field: &str) -> Self {
        let key = field.to_owned();
        NamedFunc::scalar(field, move |b| b.scalar(&key).unwrap_or(f64::NAN))
    }

    /// Reads a vector field; missing fields evaluate to an empty list.
    pub fn vector_field(field: &str) -> Self {
        let key = field.to_owned();
        NamedFunc::vector(field, move |b| {
            b.vector(&key).map(<[f64]>::to_vec).unwrap_or_default()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_vector
    }

    pub fn is_vector(&self) -> bool {
        self.is_vector
    }

    /// True for the trivial "1" selection.
    pub fn is_trivial(&self) -> bool {
        self.name == "1"
    }

    pub fn evaluate(&self, baby: &dyn Baby) -> Value {
        (self.eval)(baby)
    }

    pub fn get_scalar(&self, baby: &dyn Baby) -> f64 {
        match self.evaluate(baby) {
            Value::Scalar(x) => x,
            Value::Vector(v) => {
                log::debug!("{} is vector valued, using its first entry", self.name);
                v.first().copied().unwrap_or(f64::NAN)
            }
        }
    }

    pub fn get_vector(&self, baby: &dyn Baby) -> Vec<f64> {
        match self.evaluate(baby) {
            Value::Scalar(x) => vec![x],
            Value::Vector(v) => v,
        }
    }

    /// Element-wise combination of two functions.
    pub fn binary(name: &str, a: &NamedFunc, b: &NamedFunc, op: fn(f64, f64) -> f64) -> Self {
        let (a, b) = (a.clone(), b.clone());
        NamedFunc {
            name: name.to_owned(),
            is_vector: a.is_vector || b.is_vector,
            eval: Arc::new(move |baby| a.evaluate(baby).zip_with(&b.evaluate(baby), op)),
        }
    }

    /// Logical and. The trivial selection "1" is the identity.
    pub fn and(&self, other: &NamedFunc) -> NamedFunc {
        if self.is_trivial() {
            return other.clone();
        }
        if other.is_trivial() {
            return self.clone();
        }
        NamedFunc::binary(
            &format!("{}&&{}", self.name, other.name),
            self,
            other,
            |x, y| f64::from(u8::from(truthy(x) && truthy(y))),
        )
    }

    pub fn times(&self, other: &NamedFunc) -> NamedFunc {
        NamedFunc::binary(&format!("{}*{}", self.name, other.name), self, other, |x, y| {
            x * y
        })
    }
}

impl Default for NamedFunc {
    fn default() -> Self {
        NamedFunc::constant(1.0)
    }
}

impl fmt::Debug for NamedFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFunc")
            .field("name", &self.name)
            .field("is_vector", &self.is_vector)
            .finish()
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
