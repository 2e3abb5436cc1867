use crate::{ident, Templates};

use crumpet_core::schema::ModelSchema;
use crumpet_core::stmt::{Limit, Value};

/// The select template restricted to the primary key.
pub fn select_by_key(templates: &Templates, schema: &ModelSchema) -> String {
    format!(
        "{} where {}=?",
        templates.select,
        ident(schema.column(schema.primary_key()))
    )
}

/// Composes the base select template with optional `where`, `order by` and
/// `limit` fragments.
///
/// Limit placeholders go last, so their argument(s) are appended to `args`
/// in placeholder order, after any filter arguments already bound.
pub fn select_query(
    templates: &Templates,
    filter: Option<&str>,
    order_by: Option<&str>,
    limit: Option<Limit>,
    args: &mut Vec<Value>,
) -> String {
    let mut sql = templates.select.clone();

    if let Some(filter) = filter {
        sql.push_str(" where ");
        sql.push_str(filter);
    }

    if let Some(order_by) = order_by {
        sql.push_str(" order by ");
        sql.push_str(order_by);
    }

    match limit {
        Some(Limit::Count(count)) => {
            sql.push_str(" limit ?");
            args.push(Value::I64(count as i64));
        }
        Some(Limit::OffsetCount(offset, count)) => {
            sql.push_str(" limit ?, ?");
            args.push(Value::I64(offset as i64));
            args.push(Value::I64(count as i64));
        }
        None => {}
    }

    sql
}

/// A single-scalar select: `select <field> as _num_ from <table> [where …]`.
///
/// `select_field` is a caller-supplied fragment (a column or an aggregate
/// such as `count(*)`), trusted the same way a filter fragment is.
pub fn scalar_select(schema: &ModelSchema, select_field: &str, filter: Option<&str>) -> String {
    let mut sql = format!(
        "select {select_field} as _num_ from {}",
        ident(schema.table())
    );

    if let Some(filter) = filter {
        sql.push_str(" where ");
        sql.push_str(filter);
    }

    sql
}
