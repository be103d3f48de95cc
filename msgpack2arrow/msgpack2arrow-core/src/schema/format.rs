use std::fmt::{Error, Result, Write as _};

use super::{DataTypeDef, FieldDef};

/// Format field definitions in a readable style:
/// primitive fields are rendered in one line, compound fields are pretty-printed.
/// Nested fields follow the same rule.
pub fn format_field_defs(fields: impl AsRef<[FieldDef]>) -> std::result::Result<String, Error> {
    let mut out = String::new();
    for field in fields.as_ref() {
        format_labeled_type(
            &field.name,
            &field.element.data_type,
            field.element.nullable,
            0,
            &mut out,
        )?;
    }
    Ok(out)
}

fn format_labeled_type(
    label: &str,
    data_type: &DataTypeDef,
    nullable: bool,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    match data_type {
        DataTypeDef::List(item) => {
            writeln!(out, "{pad}{label}:")?;
            writeln!(out, "{pad}    type: list")?;
            writeln!(out, "{pad}    nullable: {nullable}")?;
            format_labeled_type("item", &item.data_type, item.nullable, indent + 4, out)
        }
        DataTypeDef::Struct(fields) => {
            writeln!(out, "{pad}{label}:")?;
            writeln!(out, "{pad}    type: struct")?;
            writeln!(out, "{pad}    nullable: {nullable}")?;
            writeln!(out, "{pad}    fields:")?;
            for child in fields.iter() {
                format_labeled_type(
                    &child.name,
                    &child.element.data_type,
                    child.element.nullable,
                    indent + 8,
                    out,
                )?;
            }
            Ok(())
        }
        primitive => writeln!(
            out,
            "{pad}{label}: {{ type: {}, nullable: {nullable} }}",
            primitive.type_name()
        ),
    }
}
