//! Type unification lattice over [`ElementDef`].
//!
//! `Null` is the bottom element: it unifies with any type to that type and
//! makes the result nullable. `I64` widens to `F64`. Lists unify item-wise and
//! structs unify member-wise by name. Every other mixed pairing is an error.

use crate::{
    error::UnifyError,
    schema::{DataTypeDef, ElementDef, FieldDef, FieldDefs},
    value::Value,
};

/// Join a parent path and a member name into a dotted field path.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn item_path(parent: &str) -> String {
    format!("{parent}[]")
}

/// Derive the type directly implied by a value.
///
/// Unsigned integers beyond the signed range cannot be represented as `I64`;
/// they are typed as `F64` and reported through `on_precision_loss` with the
/// path and original value.
pub fn natural_type<F>(
    value: &Value,
    path: &str,
    on_precision_loss: &mut F,
) -> Result<ElementDef, UnifyError>
where
    F: FnMut(&str, u64),
{
    let data_type = match value {
        Value::Null => return Ok(ElementDef::new(DataTypeDef::Null, true)),
        Value::Bool(_) => DataTypeDef::Bool,
        Value::I64(_) => DataTypeDef::I64,
        Value::U64(v) => {
            if i64::try_from(*v).is_ok() {
                DataTypeDef::I64
            } else {
                on_precision_loss(path, *v);
                DataTypeDef::F64
            }
        }
        Value::F64(_) => DataTypeDef::F64,
        Value::String(_) => DataTypeDef::String,
        Value::Bytes(_) => DataTypeDef::Bytes,
        Value::Array(items) => {
            let path = item_path(path);
            let mut item: Option<ElementDef> = None;
            for v in items {
                let observed = natural_type(v, &path, on_precision_loss)?;
                item = Some(match item {
                    Some(existing) => unify(&existing, &observed, &path)?,
                    None => observed,
                });
            }
            DataTypeDef::List(Box::new(
                item.unwrap_or_else(|| ElementDef::new(DataTypeDef::Null, true)),
            ))
        }
        Value::Map(entries) => {
            let mut fields = Vec::with_capacity(entries.len());
            for (name, v) in entries {
                let element = natural_type(v, &join_path(path, name), on_precision_loss)?;
                fields.push(FieldDef {
                    name: name.to_string(),
                    element,
                });
            }
            DataTypeDef::Struct(fields.into())
        }
    };
    Ok(ElementDef::new(data_type, false))
}

/// Unify two observed types for the field at `path`.
///
/// The operation is commutative and associative; for structs, commutativity
/// holds up to member order (see [`DataTypeDef::is_equivalent`]).
pub fn unify(
    existing: &ElementDef,
    incoming: &ElementDef,
    path: &str,
) -> Result<ElementDef, UnifyError> {
    let nullable = existing.nullable || incoming.nullable;
    let data_type = match (&existing.data_type, &incoming.data_type) {
        (DataTypeDef::Null, other) | (other, DataTypeDef::Null) => {
            return Ok(ElementDef::new(other.clone(), true));
        }
        (DataTypeDef::I64, DataTypeDef::F64) | (DataTypeDef::F64, DataTypeDef::I64) => {
            DataTypeDef::F64
        }
        (DataTypeDef::List(a), DataTypeDef::List(b)) => {
            DataTypeDef::List(Box::new(unify(a, b, &item_path(path))?))
        }
        (DataTypeDef::Struct(a), DataTypeDef::Struct(b)) => {
            DataTypeDef::Struct(unify_struct_members(a, b, path)?)
        }
        (a, b) if a.is_primitive() && a == b => a.clone(),
        (a, b) => {
            return Err(UnifyError {
                path: path.to_string(),
                existing: a.type_name(),
                incoming: b.type_name(),
            });
        }
    };
    Ok(ElementDef::new(data_type, nullable))
}

fn unify_struct_members(
    existing: &FieldDefs,
    incoming: &FieldDefs,
    path: &str,
) -> Result<FieldDefs, UnifyError> {
    let mut out = Vec::with_capacity(existing.len().max(incoming.len()));

    for field in existing.iter() {
        let element = match incoming.get(&field.name) {
            Some(other) => unify(
                &field.element,
                &other.element,
                &join_path(path, &field.name),
            )?,
            None => ElementDef::new(field.element.data_type.clone(), true),
        };
        out.push(FieldDef {
            name: field.name.clone(),
            element,
        });
    }

    for field in incoming.iter() {
        if existing.get(&field.name).is_none() {
            out.push(FieldDef {
                name: field.name.clone(),
                element: ElementDef::new(field.element.data_type.clone(), true),
            });
        }
    }

    Ok(out.into())
}
