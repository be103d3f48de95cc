//! Incremental schema inference over a sequence of map records.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::InferError,
    schema::{ElementDef, FieldDef, FieldDefs, natural_type, unify},
    value::Value,
};

/// Non-fatal outcome recorded while inferring a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceWarning {
    /// An unsigned integer beyond `i64::MAX` forced its field to `F64`.
    PrecisionLoss {
        record: usize,
        path: String,
        value: u64,
    },
}

#[derive(Debug)]
struct FieldState {
    element: ElementDef,
    /// Number of records in which the key was present (null or not).
    present: usize,
}

/// Derives a unified field list from records observed one at a time.
///
/// Field order is first-seen order. A field that is absent from any record,
/// or null in any record, is nullable in the final schema.
#[derive(Debug, Default)]
pub struct SchemaInferencer {
    fields: IndexMap<String, FieldState>,
    records: usize,
    warnings: Vec<InferenceWarning>,
}

/// Frozen result of [`SchemaInferencer::finish`].
#[derive(Debug, Clone, PartialEq)]
pub struct InferredSchema {
    pub fields: FieldDefs,
    pub record_count: usize,
    pub warnings: Vec<InferenceWarning>,
}

impl SchemaInferencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records observed so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Thread one record through the inferencer.
    ///
    /// On error the inferencer must be discarded; its state is unspecified.
    pub fn observe(&mut self, record: &Value) -> Result<(), InferError> {
        let index = self.records;
        let Value::Map(entries) = record else {
            return Err(InferError::RootMustBeMap {
                record: index,
                found: record.variant_name(),
            });
        };

        for (name, value) in entries {
            let name: &str = name;
            let warnings = &mut self.warnings;
            let observed = natural_type(value, name, &mut |path: &str, v: u64| {
                warn!(
                    record = index,
                    path,
                    value = v,
                    "unsigned integer exceeds i64 range; field widened to f64"
                );
                warnings.push(InferenceWarning::PrecisionLoss {
                    record: index,
                    path: path.to_string(),
                    value: v,
                });
            })
            .map_err(|e| InferError::incompatible(index, e))?;

            match self.fields.get_mut(name) {
                Some(state) => {
                    state.element = unify(&state.element, &observed, name)
                        .map_err(|e| InferError::incompatible(index, e))?;
                    state.present += 1;
                }
                None => {
                    self.fields.insert(
                        name.to_string(),
                        FieldState {
                            element: observed,
                            present: 1,
                        },
                    );
                }
            }
        }

        self.records += 1;
        Ok(())
    }

    /// Freeze the field list. Order and types are fixed from here on.
    pub fn finish(self) -> InferredSchema {
        let records = self.records;
        let fields: Vec<FieldDef> = self
            .fields
            .into_iter()
            .map(|(name, state)| {
                let nullable = state.element.nullable || state.present < records;
                FieldDef::new(name, state.element.data_type, nullable)
            })
            .collect();
        debug!(
            records,
            fields = fields.len(),
            warnings = self.warnings.len(),
            "schema inference finished"
        );
        InferredSchema {
            fields: fields.into(),
            record_count: records,
            warnings: self.warnings,
        }
    }
}
