pub mod baby;
pub mod event_table;
pub mod expression;
pub mod named_func;

pub use baby::{Baby, EventSource, MapBaby, Value};
pub use event_table::EventTable;
pub use expression::{FieldKind, FieldSchema, parse_cut, parse_value};
pub use named_func::NamedFunc;
