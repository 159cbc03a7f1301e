use std::sync::LazyLock;

use fnv::FnvHashMap;
use regex::Regex;

use super::named_func::NamedFunc;
use crate::error::HepError;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static CONDITION_RE: Pattern = LazyLock::new(|| {
    Regex::new(
        r"^(?P<column>\w+)(?P<op>>=|<=|!=|==|>|<)(?P<value>[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?|[+-]?nan|[+-]?inf)$",
    )
});
static BARE_RE: Pattern = LazyLock::new(|| Regex::new(r"^(?P<not>!?)(?P<column>\w+)$"));
static IDENT_RE: Pattern = LazyLock::new(|| Regex::new(r"^\w+$"));

fn pattern(re: &'static Pattern) -> Result<&'static Regex, HepError> {
    re.as_ref().map_err(|e| HepError::Expression(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Vector,
}

/// Names and kinds of the fields an event source provides.
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    fields: FnvHashMap<String, FieldKind>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.insert(name, kind);
        self
    }

    pub fn insert(&mut self, name: &str, kind: FieldKind) {
        self.fields.insert(name.to_owned(), kind);
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn merge(&mut self, other: &FieldSchema) {
        for (name, kind) in &other.fields {
            self.fields.entry(name.clone()).or_insert(*kind);
        }
    }

    pub fn field(&self, name: &str) -> Result<NamedFunc, HepError> {
        match self.kind(name) {
            Some(FieldKind::Scalar) => Ok(NamedFunc::scalar_field(name)),
            Some(FieldKind::Vector) => Ok(NamedFunc::vector_field(name)),
            None => Err(HepError::UnknownField(name.to_owned())),
        }
    }
}

fn compact(expression: &str) -> String {
    expression.chars().filter(|c| !c.is_whitespace()).collect()
}

fn comparison(op: &str) -> Option<fn(f64, f64) -> f64> {
    let f: fn(f64, f64) -> f64 = match op {
        ">" => |x, y| f64::from(u8::from(x > y)),
        "<" => |x, y| f64::from(u8::from(x < y)),
        ">=" => |x, y| f64::from(u8::from(x >= y)),
        "<=" => |x, y| f64::from(u8::from(x <= y)),
        "==" => |x, y| f64::from(u8::from(x == y)),
        "!=" => |x, y| f64::from(u8::from(x != y)),
        _ => return None,
    };
    Some(f)
}

fn parse_literal(text: &str) -> Option<f64> {
    match text {
        "nan" => Some(f64::NAN),
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => text.parse().ok(),
    }
}

/// Parses a selection such as `nlep==2 && met>150 & sig_photon`.
///
/// Conditions are joined by `&&` (or `&`). Each is `field op number` or a
/// bare field used as a boolean, optionally negated with `!`. An empty
/// expression or `1` selects everything.
pub fn parse_cut(expression: &str, schema: &FieldSchema) -> Result<NamedFunc, HepError> {
    let expression = compact(expression);
    if expression.is_empty() || expression == "1" {
        return Ok(NamedFunc::default());
    }

    let condition_re = pattern(&CONDITION_RE)?;
    let bare_re = pattern(&BARE_RE)?;

    let mut cut = NamedFunc::default();
    for condition in expression.replace("&&", "&").split('&') {
        let term = if let Some(caps) = condition_re.captures(condition) {
            let field = schema.field(&caps["column"])?;
            let op = comparison(&caps["op"])
                .ok_or_else(|| HepError::Expression(condition.to_owned()))?;
            let value = parse_literal(&caps["value"])
                .ok_or_else(|| HepError::Expression(condition.to_owned()))?;
            NamedFunc::binary(condition, &field, &NamedFunc::constant(value), op)
        } else if let Some(caps) = bare_re.captures(condition) {
            let field = schema.field(&caps["column"])?;
            if caps["not"].is_empty() {
                field
            } else {
                NamedFunc::binary(condition, &field, &NamedFunc::constant(0.0), |x, y| {
                    f64::from(u8::from(x == y))
                })
            }
        } else {
            log::error!("Failed to parse condition '{condition}' in '{expression}'");
            return Err(HepError::Expression(expression.clone()));
        };
        cut = cut.and(&term);
    }
    Ok(cut.with_name(&expression))
}

/// Parses a variable or weight: a product of fields and numbers such as
/// `weight*w_lumi*1.1`.
pub fn parse_value(expression: &str, schema: &FieldSchema) -> Result<NamedFunc, HepError> {
    let expression = compact(expression);
    if expression.is_empty() {
        return Err(HepError::Expression("empty expression".to_owned()));
    }

    let ident_re = pattern(&IDENT_RE)?;
    let mut product: Option<NamedFunc> = None;
    for term in expression.split('*') {
        let factor = if let Some(value) = parse_literal(term) {
            NamedFunc::constant(value)
        } else if ident_re.is_match(term) {
            schema.field(term)?
        } else {
            return Err(HepError::Expression(expression.clone()));
        };
        product = Some(match product {
            Some(p) => p.times(&factor),
            None => factor,
        });
    }
    product
        .map(|p| p.with_name(&expression))
        .ok_or(HepError::Expression(expression))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::baby::MapBaby;

    fn schema() -> FieldSchema {
        FieldSchema::new()
            .with_field("met", FieldKind::Scalar)
            .with_field("nlep", FieldKind::Scalar)
            .with_field("weight", FieldKind::Scalar)
            .with_field("photon_pt", FieldKind::Vector)
            .with_field("photon_sig", FieldKind::Vector)
    }

    #[test]
    fn scalar_conditions() {
        let cut = parse_cut("nlep == 2 && met > 150", &schema()).unwrap();
        assert!(cut.is_scalar());
        assert_eq!(cut.name(), "nlep==2&&met>150");
        let pass = MapBaby::new().with_scalar("nlep", 2.0).with_scalar("met", 200.0);
        let fail = MapBaby::new().with_scalar("nlep", 2.0).with_scalar("met", 100.0);
        assert!((cut.get_scalar(&pass) - 1.0).abs() < 1e-12);
        assert!(cut.get_scalar(&fail).abs() < 1e-12);
    }

    #[test]
    fn vector_condition_is_elementwise() {
        let cut = parse_cut("met>100&photon_pt>=20&photon_sig", &schema()).unwrap();
        assert!(cut.is_vector());
        let baby = MapBaby::new()
            .with_scalar("met", 120.0)
            .with_vector("photon_pt", vec![10.0, 25.0, 40.0])
            .with_vector("photon_sig", vec![1.0, 1.0, 0.0]);
        assert_eq!(cut.get_vector(&baby), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn trivial_and_negated() {
        assert!(parse_cut("1", &schema()).unwrap().is_trivial());
        assert!(parse_cut("  ", &schema()).unwrap().is_trivial());
        let cut = parse_cut("!nlep", &schema()).unwrap();
        let baby = MapBaby::new().with_scalar("nlep", 0.0);
        assert!((cut.get_scalar(&baby) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_fields_and_garbage() {
        assert!(matches!(
            parse_cut("ht>300", &schema()),
            Err(HepError::UnknownField(_))
        ));
        assert!(parse_cut("met>>3", &schema()).is_err());
        assert!(parse_value("met+3", &schema()).is_err());
    }

    #[test]
    fn number_forms() {
        let baby = MapBaby::new().with_scalar("met", 0.7);
        for (expression, pass) in [
            ("met>.5", true),
            ("met<-.5", false),
            ("met>5.", false),
            ("met<7E-1", false),
            ("met<=7e-1", true),
            ("met>+0.25", true),
        ] {
            let cut = parse_cut(expression, &schema()).unwrap();
            assert_eq!(cut.get_scalar(&baby) == 1.0, pass, "{expression}");
        }
        let w = parse_value("weight*.5", &schema()).unwrap();
        assert!((w.get_scalar(&MapBaby::new().with_scalar("weight", 3.0)) - 1.5).abs() < 1e-12);
        assert!(parse_cut("met>.", &schema()).is_err());
        assert!(parse_cut("met>1e", &schema()).is_err());
    }

    #[test]
    fn weight_products() {
        let w = parse_value("weight*2", &schema()).unwrap();
        let baby = MapBaby::new().with_scalar("weight", 0.25);
        assert!((w.get_scalar(&baby) - 0.5).abs() < 1e-12);
        assert_eq!(w.name(), "weight*2");
        assert!(parse_value("photon_pt", &schema()).unwrap().is_vector());
    }
}
