use std::{
    io::{self, Read},
    sync::Arc,
};

use arrow::{array::Array, datatypes::DataType};
use msgpack2arrow::{
    MsgPackReader, ReadOptions, ReaderError,
    core::{DataTypeDef, InferenceWarning},
    memory_pool::{GreedyMemoryPool, MemoryPool, UnboundedMemoryPool},
    msgpack::DecodeError,
};
use msgpack2arrow_msgpack::test_util::*;

fn unbounded() -> Arc<dyn MemoryPool> {
    Arc::new(UnboundedMemoryPool::default())
}

fn records(count: usize) -> Vec<u8> {
    stream(
        (0..count)
            .map(|i| map(vec![("i", int(i as i64)), ("s", string("value"))]))
            .collect(),
    )
}

#[test]
fn chunk_size_splits_every_column_identically() {
    let input = records(10);
    let options = ReadOptions::default().with_chunk_size(Some(3));
    let table = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap();

    assert_eq!(table.chunk_lengths(), &[3, 3, 3, 1]);
    for column in table.columns() {
        let lengths: Vec<usize> = column.chunks().iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![3, 3, 3, 1]);
    }
    assert_eq!(table.to_record_batches().unwrap().len(), 4);
}

#[test]
fn strict_root_rejects_top_level_array() {
    let input = array(vec![map(vec![("a", int(1))])]);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default())
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::RootMustBeMap {
            record: 0,
            found: "Array"
        }
    ));
}

#[test]
fn lenient_root_reads_array_elements_as_records() {
    let input = stream(vec![
        array(vec![map(vec![("a", int(1))]), map(vec![("a", int(2))])]),
        map(vec![("a", int(3))]),
    ]);
    let options = ReadOptions::default().with_strict_root(false);
    let table = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(table.num_rows(), 3);
}

#[test]
fn lenient_root_still_requires_map_elements() {
    let input = array(vec![map(vec![("a", int(1))]), string("nope")]);
    let options = ReadOptions::default().with_strict_root(false);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::RootMustBeMap {
            record: 1,
            found: "String"
        }
    ));
}

#[test]
fn lenient_root_wrapper_does_not_count_toward_nesting() {
    let input = array(vec![map(vec![("a", int(1))])]);
    let options = ReadOptions::default()
        .with_max_nesting_depth(1)
        .with_strict_root(false);
    let table = MsgPackReader::make(unbounded(), input.as_slice(), options.clone())
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(table.num_rows(), 1);

    let input = array(vec![map(vec![("a", array(vec![int(1)]))])]);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Decode(DecodeError::NestingTooDeep { max_depth: 1, .. })
    ));
}

#[test]
fn lenient_root_truncated_wrapper_fails() {
    let mut input = array(vec![map(vec![("a", int(1))]), map(vec![("a", int(2))])]);
    input.truncate(input.len() - 4);
    let options = ReadOptions::default().with_strict_root(false);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Decode(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn second_read_fails_with_already_consumed() {
    let input = records(2);
    let mut reader =
        MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default()).unwrap();
    assert_eq!(reader.read().unwrap().num_rows(), 2);
    assert!(matches!(reader.read(), Err(ReaderError::AlreadyConsumed)));
    assert!(matches!(
        reader.infer_field_defs(),
        Err(ReaderError::AlreadyConsumed)
    ));
}

#[test]
fn failed_read_also_consumes_input() {
    let input = int(1);
    let mut reader =
        MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default()).unwrap();
    assert!(matches!(
        reader.read(),
        Err(ReaderError::RootMustBeMap { .. })
    ));
    assert!(matches!(reader.read(), Err(ReaderError::AlreadyConsumed)));
}

#[test]
fn invalid_options_fail_at_make() {
    let zero_depth = ReadOptions::default().with_max_nesting_depth(0);
    assert!(matches!(
        MsgPackReader::make(unbounded(), io::empty(), zero_depth),
        Err(ReaderError::InvalidOptions(_))
    ));

    let zero_chunk = ReadOptions::default().with_chunk_size(Some(0));
    assert!(matches!(
        MsgPackReader::make(unbounded(), io::empty(), zero_chunk),
        Err(ReaderError::InvalidOptions(_))
    ));
}

#[test]
fn custom_nesting_limit_is_applied() {
    let input = map(vec![("a", nested_arrays(3))]);
    let options = ReadOptions::default().with_max_nesting_depth(3);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Decode(DecodeError::NestingTooDeep { max_depth: 3, .. })
    ));

    let options = ReadOptions::default().with_max_nesting_depth(4);
    let table = MsgPackReader::make(unbounded(), input.as_slice(), options)
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(table.num_rows(), 1);
}

#[test]
fn truncated_record_fails_without_table() {
    let mut input = records(3);
    input.truncate(input.len() - 2);
    let err = MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default())
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Decode(DecodeError::TruncatedInput { .. })
    ));
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn stream_errors_are_surfaced() {
    let err = MsgPackReader::make(unbounded(), FailingReader, ReadOptions::default())
        .unwrap()
        .read()
        .unwrap_err();
    match err {
        ReaderError::Decode(DecodeError::Io(e)) => assert_eq!(e.to_string(), "disk on fire"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn memory_limit_is_enforced() {
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(256));
    let input = records(100);
    let err = MsgPackReader::make(Arc::clone(&pool), input.as_slice(), ReadOptions::default())
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(err, ReaderError::MemoryLimit(_)));
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn memory_limit_is_enforced_while_building_columns() {
    let input = records(100);
    let mut sizing =
        MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default()).unwrap();
    sizing.infer_field_defs().unwrap();
    let retained = sizing.peak_reserved();
    assert!(retained > 0);

    // room for the retained records but not for the column buffers
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(retained + 64));
    let err = MsgPackReader::make(Arc::clone(&pool), input.as_slice(), ReadOptions::default())
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(err, ReaderError::MemoryLimit(_)));
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn retained_records_are_released_and_table_holds_columns() {
    let pool: Arc<dyn MemoryPool> = Arc::new(UnboundedMemoryPool::default());
    let input = records(50);
    let mut reader =
        MsgPackReader::make(Arc::clone(&pool), input.as_slice(), ReadOptions::default()).unwrap();
    let table = reader.read().unwrap();

    let held_by_table = pool.reserved();
    assert!(held_by_table > 0);
    assert!(reader.peak_reserved() > held_by_table);

    drop(table);
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn infer_field_defs_returns_frozen_schema() {
    let input = stream(vec![
        map(vec![("a", int(1)), ("b", nil())]),
        map(vec![("a", float(2.0)), ("c", binary(&[1, 2]))]),
    ]);
    let mut reader =
        MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default()).unwrap();
    let fields = reader.infer_field_defs().unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(fields[0].element.data_type, DataTypeDef::F64);
    assert!(!fields[0].element.nullable);
    assert_eq!(fields[1].element.data_type, DataTypeDef::Null);
    assert!(fields[1].element.nullable);
    assert_eq!(fields[2].element.data_type, DataTypeDef::Bytes);
    assert!(fields[2].element.nullable);
}

#[test]
fn all_null_field_becomes_null_column() {
    let input = stream(vec![
        map(vec![("a", nil()), ("b", int(1))]),
        map(vec![("b", int(2))]),
    ]);
    let table = MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default())
        .unwrap()
        .read()
        .unwrap();
    let field = table.schema().field(0);
    assert_eq!(field.data_type(), &DataType::Null);
    assert_eq!(table.column(0).len(), 2);
}

#[test]
fn oversized_unsigned_widens_with_warning() {
    let input = stream(vec![
        map(vec![("n", uint(1))]),
        map(vec![("n", uint(u64::MAX))]),
    ]);
    let mut reader =
        MsgPackReader::make(unbounded(), input.as_slice(), ReadOptions::default()).unwrap();
    let table = reader.read().unwrap();

    assert_eq!(table.schema().field(0).data_type(), &DataType::Float64);
    assert_eq!(
        reader.warnings(),
        &[InferenceWarning::PrecisionLoss {
            record: 1,
            path: "n".to_string(),
            value: u64::MAX,
        }]
    );
}
