//! Error types for the core layer.

/// A value whose runtime kind does not match the type it is being read as.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{}expected {expected}, found {actual}{}",
    record_prefix(.record),
    path_suffix(.path)
)]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
    pub path: Option<String>,
    pub record: Option<usize>,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            path: None,
            record: None,
        }
    }

    /// Attach the field path at which the mismatch occurred.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Prefix the path with an enclosing field name or `[]` list segment.
    pub fn nested_in(mut self, parent: &str) -> Self {
        self.path = Some(match self.path.take() {
            None => parent.to_string(),
            Some(p) if p.starts_with('[') => format!("{parent}{p}"),
            Some(p) => format!("{parent}.{p}"),
        });
        self
    }

    /// Attach the index of the record being converted.
    pub fn in_record(mut self, record: usize) -> Self {
        self.record = Some(record);
        self
    }
}

fn record_prefix(record: &Option<usize>) -> String {
    match record {
        Some(r) => format!("record {r}: "),
        None => String::new(),
    }
}

fn path_suffix(path: &Option<String>) -> String {
    match path {
        Some(p) => format!(" at '{p}'"),
        None => String::new(),
    }
}

/// Two observed types for the same field have no common supertype.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("incompatible types at '{path}': {existing} vs {incoming}")]
pub struct UnifyError {
    pub path: String,
    pub existing: &'static str,
    pub incoming: &'static str,
}

/// Schema errors raised while threading records through the inferencer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferError {
    /// A top-level value was not a map, so it cannot be a row.
    #[error("record {record}: top-level value must be a map, found {found}")]
    RootMustBeMap { record: usize, found: &'static str },

    /// A field was observed with two kinds that cannot be unified.
    #[error("record {record}: incompatible types at '{path}': {existing} vs {incoming}")]
    IncompatibleTypes {
        record: usize,
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },
}

impl InferError {
    pub(crate) fn incompatible(record: usize, err: UnifyError) -> Self {
        Self::IncompatibleTypes {
            record,
            path: err.path,
            existing: err.existing,
            incoming: err.incoming,
        }
    }
}
