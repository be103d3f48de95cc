use std::{
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// Column type inferred from dynamically-typed values.
///
/// Variant names mirror [`Value`](crate::Value) where a value kind maps
/// directly onto a type. Unsigned integers share [`DataTypeDef::I64`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeDef {
    Null,
    Bool,
    I64,
    F64,
    String,
    Bytes,
    List(Box<ElementDef>),
    Struct(FieldDefs),
}

impl DataTypeDef {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataTypeDef::Struct(_) | DataTypeDef::List(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataTypeDef::Null => "null",
            DataTypeDef::Bool => "bool",
            DataTypeDef::I64 => "i64",
            DataTypeDef::F64 => "f64",
            DataTypeDef::String => "string",
            DataTypeDef::Bytes => "bytes",
            DataTypeDef::List(_) => "list",
            DataTypeDef::Struct(_) => "struct",
        }
    }

    /// Structural equality that ignores struct member order.
    ///
    /// Struct unification appends one-sided members in observation order, so
    /// two unification orders can yield the same members in different
    /// positions.
    pub fn is_equivalent(&self, other: &DataTypeDef) -> bool {
        match (self, other) {
            (DataTypeDef::List(a), DataTypeDef::List(b)) => a.is_equivalent(b),
            (DataTypeDef::Struct(a), DataTypeDef::Struct(b)) => {
                a.len() == b.len()
                    && a.iter().all(|fa| {
                        b.get(&fa.name)
                            .is_some_and(|fb| fa.element.is_equivalent(&fb.element))
                    })
            }
            (a, b) => a == b,
        }
    }
}

/// Ordered collection of [`FieldDef`] used for schema bodies and struct members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDefs(pub Vec<FieldDef>);

impl FieldDefs {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self(fields)
    }

    pub fn as_slice(&self) -> &[FieldDef] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.0.iter().find(|f| f.name == name)
    }
}

impl From<Vec<FieldDef>> for FieldDefs {
    fn from(value: Vec<FieldDef>) -> Self {
        Self(value)
    }
}

impl From<FieldDefs> for Vec<FieldDef> {
    fn from(value: FieldDefs) -> Self {
        value.0
    }
}

impl AsRef<[FieldDef]> for FieldDefs {
    fn as_ref(&self) -> &[FieldDef] {
        self.as_slice()
    }
}

impl Deref for FieldDefs {
    type Target = [FieldDef];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Display for FieldDefs {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = super::format_field_defs(self.as_slice())?;
        f.write_str(&text)
    }
}

/// A type together with its nullability, used for columns, list items and
/// struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub data_type: DataTypeDef,
    pub nullable: bool,
}

impl ElementDef {
    pub fn new(data_type: DataTypeDef, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }

    pub fn is_equivalent(&self, other: &ElementDef) -> bool {
        self.nullable == other.nullable && self.data_type.is_equivalent(&other.data_type)
    }
}

/// Named column or struct member.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub element: ElementDef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, data_type: DataTypeDef, nullable: bool) -> Self {
        Self {
            name: name.into(),
            element: ElementDef::new(data_type, nullable),
        }
    }
}
