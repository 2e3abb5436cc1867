use crumpet_core::stmt::{Record, Value as CoreValue};
use crumpet_core::{Error, Result};

use mysql_async::prelude::ToValue;

#[derive(Debug)]
pub(crate) struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> mysql_async::Value {
        match &self.0 {
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::String(value) => value.to_value(),
        }
    }
}

pub(crate) fn to_params(args: &[CoreValue]) -> mysql_async::Params {
    if args.is_empty() {
        return mysql_async::Params::Empty;
    }

    mysql_async::Params::Positional(
        args.iter()
            .map(|arg| Value::from(arg.clone()).to_value())
            .collect(),
    )
}

/// Converts a column value read from the wire into the runtime value
/// domain. Anything outside the five mapped kinds is a conversion error.
pub(crate) fn from_sql(value: mysql_async::Value) -> Result<CoreValue> {
    use mysql_async::Value as Sql;

    Ok(match value {
        Sql::NULL => CoreValue::Null,
        Sql::Int(value) => CoreValue::I64(value),
        Sql::UInt(value) => CoreValue::I64(i64::try_from(value).map_err(|_| {
            Error::type_conversion(format!("unsigned value {value} overflows bigint"))
        })?),
        Sql::Float(value) => CoreValue::F64(value.into()),
        Sql::Double(value) => CoreValue::F64(value),
        Sql::Bytes(bytes) => CoreValue::String(String::from_utf8(bytes).map_err(|err| {
            Error::type_conversion(format!("column bytes are not valid utf-8: {err}"))
        })?),
        other => {
            return Err(Error::type_conversion(format!(
                "unsupported column value {other:?}"
            )))
        }
    })
}

/// Materializes a wire row as an ordered record keyed by column name.
pub(crate) fn record_from_row(row: mysql_async::Row) -> Result<Record> {
    let columns = row.columns();
    let values = row.unwrap();

    let mut record = Record::new();
    for (column, value) in columns.iter().zip(values) {
        record.insert(column.name_str().into_owned(), from_sql(value)?);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_value_mapping() {
        assert_eq!(
            Value::from(CoreValue::Null).to_value(),
            mysql_async::Value::NULL
        );
        assert_eq!(
            Value::from(CoreValue::I64(7)).to_value(),
            mysql_async::Value::Int(7)
        );
        assert_eq!(
            Value::from(CoreValue::F64(0.5)).to_value(),
            mysql_async::Value::Double(0.5)
        );
        assert_eq!(
            Value::from(CoreValue::String("hi".into())).to_value(),
            mysql_async::Value::Bytes(b"hi".to_vec())
        );
    }

    #[test]
    fn from_sql_round_trip_kinds() {
        assert_eq!(from_sql(mysql_async::Value::NULL).unwrap(), CoreValue::Null);
        assert_eq!(
            from_sql(mysql_async::Value::Int(-3)).unwrap(),
            CoreValue::I64(-3)
        );
        assert_eq!(
            from_sql(mysql_async::Value::UInt(3)).unwrap(),
            CoreValue::I64(3)
        );
        assert_eq!(
            from_sql(mysql_async::Value::Double(1.25)).unwrap(),
            CoreValue::F64(1.25)
        );
        assert_eq!(
            from_sql(mysql_async::Value::Bytes(b"text".to_vec())).unwrap(),
            CoreValue::String("text".into())
        );
    }

    #[test]
    fn from_sql_rejects_unrepresentable_values() {
        assert!(from_sql(mysql_async::Value::UInt(u64::MAX)).is_err());
        assert!(from_sql(mysql_async::Value::Bytes(vec![0xff, 0xfe])).is_err());
        assert!(from_sql(mysql_async::Value::Date(2024, 1, 1, 0, 0, 0, 0)).is_err());
    }
}
