//! Reshapes decoded API responses into flat records driven by a [`KeyMap`].
//!
//! Only fields named in the key-map that are present and non-empty in the
//! source survive. Nested key-maps pull fields out of sub-records and write
//! them at the top level of the output. When two entries produce the same
//! output key the one processed last wins.

use crate::core::{Formatted, FormattedRecord, KeyMap, Record, TargetSpec};
use crate::domain::model::value_kind;
use crate::utils::error::{HelperError, Result};
use serde_json::Value;

/// Whether a looked-up value should be carried into the output.
///
/// Absent, `null`, `false`, numeric zero, `""`, `[]` and `{}` are dropped.
pub fn is_present_and_non_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => f != 0.0,
            None => true,
        },
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(obj)) => !obj.is_empty(),
    }
}

/// Reshapes a single record or an array of records.
///
/// An array element that is not an object aborts the whole batch.
pub fn format_response(input: &Value, key_map: &KeyMap) -> Result<Formatted> {
    match input {
        Value::Object(record) => Ok(Formatted::Single(format_record(record, key_map))),
        Value::Array(items) => {
            let records = items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(HelperError::InvalidInputShape {
                        expected: format!("object at index {}", index),
                        found: value_kind(other).to_string(),
                    }),
                });
            Ok(Formatted::Batch(try_format_records(records, key_map)?))
        }
        other => Err(HelperError::InvalidInputShape {
            expected: "object or array of objects".to_string(),
            found: value_kind(other).to_string(),
        }),
    }
}

/// Reshapes every record of a single-pass iterator, keeping input order.
pub fn format_records<'a, I>(records: I, key_map: &KeyMap) -> Vec<FormattedRecord>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .map(|record| format_record(record, key_map))
        .collect()
}

fn try_format_records<'a, I>(records: I, key_map: &KeyMap) -> Result<Vec<FormattedRecord>>
where
    I: IntoIterator<Item = Result<&'a Record>>,
{
    records
        .into_iter()
        .map(|record| record.map(|r| format_record(r, key_map)))
        .collect()
}

pub fn format_record(record: &Record, key_map: &KeyMap) -> FormattedRecord {
    let mut formatted = FormattedRecord::new();
    collect_fields(record, key_map, &mut formatted);
    formatted
}

fn collect_fields(record: &Record, key_map: &KeyMap, out: &mut FormattedRecord) {
    for (source_key, spec) in key_map.iter() {
        let Some(value) = record
            .get(source_key)
            .filter(|v| is_present_and_non_empty(Some(*v)))
        else {
            tracing::trace!(field = source_key, "skipping missing or empty field");
            continue;
        };

        match (value, spec) {
            (Value::Object(sub_record), TargetSpec::Nested(sub_map)) => {
                collect_fields(sub_record, sub_map, out);
            }
            _ => {
                // 後寫入者覆蓋先前的同名欄位
                out.insert(spec.output_key(source_key).to_string(), value.clone());
            }
        }
    }
}
