//! Arrow-independent schema intermediate representation.

mod format;
mod types;
mod unify;

pub use format::format_field_defs;
pub use types::{DataTypeDef, ElementDef, FieldDef, FieldDefs};
pub use unify::{join_path, natural_type, unify};
