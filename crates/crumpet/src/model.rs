use crate::{Db, Query};

use crumpet_core::schema::ModelDef;
use crumpet_core::stmt::{Record, Value};
use crumpet_core::Result;

use async_trait::async_trait;
use tracing::warn;

/// Behavior shared by every mapped entity type.
///
/// An implementation supplies its declaration and the record plumbing; the
/// CRUD surface is provided. Register the type on a [`Db`] builder before
/// using it; the registrar compiles the declaration into a schema and the
/// four statement templates exactly once per type.
///
/// `save`, `update` and `remove` return the affected-row count. A count
/// other than one is reported as a warning, not an error; callers wanting
/// strict confirmation inspect the returned count.
#[async_trait]
pub trait Model: Sized + Send + Sync + 'static {
    /// The entity's declaration, consumed by the registrar.
    fn definition() -> ModelDef;

    /// Materializes an instance from a record keyed by attribute name.
    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// The stored value for `key`, or `Value::Null` when unset. Never
    /// resolves descriptor defaults.
    fn value(&self, key: &str) -> Value {
        self.record().get(key)
    }

    /// Looks up one entity by primary key.
    async fn find(db: &Db, pk: Value) -> Result<Option<Self>> {
        let model = db.model::<Self>()?;
        let sql = crumpet_sql::select_by_key(&model.templates, &model.schema);

        let rows = db.select(&sql, &[pk], Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| Self::from_record(model.schema.record_from_row(row))))
    }

    /// Finds every entity matching the query, in the order the database
    /// returned them.
    async fn find_all(db: &Db, query: Query) -> Result<Vec<Self>> {
        let model = db.model::<Self>()?;
        let (filter, mut args, order_by, limit) = query.into_parts();
        let sql = crumpet_sql::select_query(
            &model.templates,
            filter.as_deref(),
            order_by.as_deref(),
            limit,
            &mut args,
        );

        let rows = db.select(&sql, &args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Self::from_record(model.schema.record_from_row(row)))
            .collect())
    }

    /// Selects a single scalar, typically an aggregate such as `count(*)`.
    async fn find_number(
        db: &Db,
        select_field: &str,
        filter: Option<&str>,
        args: &[Value],
    ) -> Result<Option<Value>> {
        let model = db.model::<Self>()?;
        let sql = crumpet_sql::scalar_select(&model.schema, select_field, filter);

        let rows = db.select(&sql, args, Some(1)).await?;
        Ok(rows.into_iter().next().map(|row| row.get("_num_")))
    }

    /// Inserts this entity.
    ///
    /// Arguments are the non-key fields in declaration order, then the
    /// primary key, each through default resolution. Resolved defaults
    /// (including generated ids) are memoized onto the instance, so the
    /// primary key is readable after a save.
    async fn save(&mut self, db: &Db) -> Result<u64> {
        let model = db.model::<Self>()?;
        let schema = &model.schema;

        let mut args = Vec::with_capacity(schema.len());
        {
            let record = self.record_mut();
            for field in schema.non_key_fields() {
                args.push(schema.value_or_default(record, field));
            }
            args.push(schema.value_or_default(record, schema.primary_key()));
        }

        let rows = db.execute(&model.templates.insert, &args, true).await?;
        if rows != 1 {
            warn!(
                model = schema.name(),
                rows, "insert affected an unexpected number of rows"
            );
        }
        Ok(rows)
    }

    /// Rewrites this entity's row, keyed by primary key.
    ///
    /// Unlike `save`, fields read through plain `value`: an unset field is
    /// written as null rather than silently defaulted.
    async fn update(&self, db: &Db) -> Result<u64> {
        let model = db.model::<Self>()?;
        let schema = &model.schema;

        let mut args: Vec<Value> = schema
            .non_key_fields()
            .iter()
            .map(|field| self.record().get(field))
            .collect();
        args.push(self.record().get(schema.primary_key()));

        let rows = db.execute(&model.templates.update, &args, true).await?;
        if rows != 1 {
            warn!(
                model = schema.name(),
                rows, "update affected an unexpected number of rows"
            );
        }
        Ok(rows)
    }

    /// Deletes this entity's row, keyed by primary key.
    async fn remove(&mut self, db: &Db) -> Result<u64> {
        let model = db.model::<Self>()?;
        let schema = &model.schema;

        let args = [schema.value_or_default(self.record_mut(), schema.primary_key())];

        let rows = db.execute(&model.templates.delete, &args, true).await?;
        if rows != 1 {
            warn!(
                model = schema.name(),
                rows, "delete affected an unexpected number of rows"
            );
        }
        Ok(rows)
    }
}
