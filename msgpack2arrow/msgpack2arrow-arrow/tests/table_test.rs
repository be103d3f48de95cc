use std::sync::Arc;

use arrow::{
    array::{Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use datafusion_execution::memory_pool::{
    GreedyMemoryPool, MemoryConsumer, MemoryPool, MemoryReservation,
};
use msgpack2arrow_arrow::{
    ArrowConvertError, TableAssembler, append_record, arrow_value_rows_to_table,
};
use msgpack2arrow_core::Value;

fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("n", DataType::Int64, false),
        Field::new("s", DataType::Utf8, true),
    ]))
}

fn reservation(pool: &Arc<dyn MemoryPool>) -> MemoryReservation {
    MemoryConsumer::new("table test").register(pool)
}

fn rows(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let s = if i % 2 == 0 {
                Value::string(format!("row{i}"))
            } else {
                Value::Null
            };
            Value::map([("n", Value::I64(i as i64)), ("s", s)])
        })
        .collect()
}

#[test]
fn single_chunk_without_chunk_size() {
    let table = arrow_value_rows_to_table(&rows(10), TableAssembler::new(schema())).unwrap();
    assert_eq!(table.chunk_lengths(), &[10]);
    for column in table.columns() {
        assert_eq!(column.num_chunks(), 1);
        assert_eq!(column.len(), 10);
    }
    assert_eq!(table.column_by_name("s").unwrap().null_count(), 5);
    assert!(table.column_by_name("missing").is_none());
}

#[test]
fn chunks_are_aligned_across_columns() {
    let assembler = TableAssembler::new(schema()).with_chunk_size(Some(4));
    let table = arrow_value_rows_to_table(&rows(10), assembler).unwrap();

    assert_eq!(table.num_rows(), 10);
    assert_eq!(table.chunk_lengths(), &[4, 4, 2]);
    for column in table.columns() {
        let lengths: Vec<usize> = column.chunks().iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![4, 4, 2]);
    }

    let last = table.column(0).chunks()[2]
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap()
        .clone();
    assert_eq!(last.values().to_vec(), vec![8, 9]);

    let middle = table.column(1).chunks()[1]
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .clone();
    assert_eq!(middle.value(0), "row4");
    assert!(middle.is_null(1));
}

#[test]
fn record_batches_follow_chunks() {
    let assembler = TableAssembler::new(schema()).with_chunk_size(Some(3));
    let table = arrow_value_rows_to_table(&rows(7), assembler).unwrap();
    let batches = table.to_record_batches().unwrap();
    let sizes: Vec<usize> = batches.iter().map(|b| b.num_rows()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert!(batches.iter().all(|b| b.schema() == *table.schema()));
}

#[test]
fn exact_multiple_has_no_empty_trailing_chunk() {
    let assembler = TableAssembler::new(schema()).with_chunk_size(Some(5));
    let table = arrow_value_rows_to_table(&rows(10), assembler).unwrap();
    assert_eq!(table.chunk_lengths(), &[5, 5]);
}

#[test]
fn zero_rows_without_chunk_size_is_one_empty_chunk() {
    let table = arrow_value_rows_to_table(&[], TableAssembler::new(schema())).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.num_columns(), 2);
    assert_eq!(table.chunk_lengths(), &[0]);
    assert!(table.column(0).is_empty());
}

#[test]
fn zero_rows_with_chunk_size_has_no_chunks() {
    let assembler = TableAssembler::new(schema()).with_chunk_size(Some(8));
    let table = arrow_value_rows_to_table(&[], assembler).unwrap();
    assert!(table.chunk_lengths().is_empty());
    assert!(table.columns().iter().all(|c| c.num_chunks() == 0));
    assert!(table.to_record_batches().unwrap().is_empty());
}

#[test]
#[should_panic(expected = "chunk size must be positive")]
fn zero_chunk_size_panics() {
    let _ = TableAssembler::new(schema()).with_chunk_size(Some(0));
}

#[test]
fn reservation_is_held_by_table_and_released_on_drop() {
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(64 * 1024 * 1024));
    let assembler = TableAssembler::new(schema()).with_reservation(reservation(&pool));
    let table = arrow_value_rows_to_table(&rows(100), assembler).unwrap();

    let held = pool.reserved();
    let actual: usize = table
        .columns()
        .iter()
        .flat_map(|c| c.chunks())
        .map(|a| a.get_array_memory_size())
        .sum();
    assert_eq!(held, actual);

    drop(table);
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn builder_preallocation_over_limit_fails_before_appending() {
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(16));
    let mut assembler = TableAssembler::new(schema()).with_reservation(reservation(&pool));
    let err = assembler.column_builders(100).err().unwrap();
    assert!(matches!(err, ArrowConvertError::Memory(_)));
    assert_eq!(pool.reserved(), 0);
}

#[test]
fn builder_growth_is_reserved_while_appending() {
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(4096));
    let mut assembler = TableAssembler::new(schema()).with_reservation(reservation(&pool));
    let mut builders = assembler.column_builders(4).unwrap();
    let initial = pool.reserved();
    assert!(initial > 0 && initial < 4096);

    let long = "x".repeat(1000);
    for i in 0..2 {
        let record = Value::map([("n", Value::I64(i)), ("s", Value::string(&long))]);
        append_record(&mut builders, &record).unwrap();
    }
    assembler.reserve_builders(&builders).unwrap();
    assert!(pool.reserved() > 2000);

    for i in 2..8 {
        let record = Value::map([("n", Value::I64(i)), ("s", Value::string(&long))]);
        append_record(&mut builders, &record).unwrap();
    }
    let err = assembler.reserve_builders(&builders).unwrap_err();
    assert!(matches!(err, ArrowConvertError::Memory(_)));
}

#[test]
fn column_growth_over_limit_fails_during_conversion() {
    let pool: Arc<dyn MemoryPool> = Arc::new(GreedyMemoryPool::new(64 * 1024));
    let long = "y".repeat(100);
    let rows: Vec<Value> = (0..2048)
        .map(|i| Value::map([("n", Value::I64(i)), ("s", Value::string(&long))]))
        .collect();
    let assembler = TableAssembler::new(schema()).with_reservation(reservation(&pool));
    let err = arrow_value_rows_to_table(&rows, assembler).unwrap_err();
    assert!(matches!(err, ArrowConvertError::Memory(_)));
    assert_eq!(pool.reserved(), 0);
}
