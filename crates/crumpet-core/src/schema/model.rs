use super::{FieldDef, FieldDefault};
use crate::stmt::{Record, Value};
use crate::{Error, Result};

use indexmap::IndexMap;
use tracing::debug;

/// An entity type's declaration: model name, optional table-name override,
/// and field descriptors in declaration order.
#[derive(Debug, Clone)]
pub struct ModelDef {
    name: String,
    table: Option<String>,
    fields: Vec<FieldDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the table name; defaults to the model name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// The compiled mapping for one entity type, produced once per type by
/// [`ModelSchema::build`].
#[derive(Debug, Clone)]
pub struct ModelSchema {
    name: String,
    table: String,
    fields: IndexMap<String, FieldDef>,
    primary_key: String,
    non_key: Vec<String>,
}

impl ModelSchema {
    /// Compiles a declaration into a schema mapping.
    ///
    /// Exactly one declared field must carry the primary-key flag; zero or
    /// a second one aborts with a definition error. Deterministic and free
    /// of side effects beyond debug logging.
    pub fn build(def: ModelDef) -> Result<Self> {
        let table = def.table.unwrap_or_else(|| def.name.clone());
        debug!(model = %def.name, table = %table, "registering model");

        let mut fields = IndexMap::with_capacity(def.fields.len());
        let mut primary_key = None;
        let mut non_key = Vec::new();

        for field in def.fields {
            debug!(model = %def.name, field = %field, "found mapping");

            let name = field.name().to_string();
            if fields.contains_key(&name) {
                return Err(Error::duplicate_field(&def.name, name));
            }

            if field.is_primary_key() {
                if primary_key.is_some() {
                    return Err(Error::duplicate_primary_key(&def.name, &name));
                }
                primary_key = Some(name.clone());
            } else {
                non_key.push(name.clone());
            }

            fields.insert(name, field);
        }

        let Some(primary_key) = primary_key else {
            return Err(Error::missing_primary_key(&def.name));
        };

        Ok(Self {
            name: def.name,
            table,
            fields,
            primary_key,
            non_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The primary key's attribute name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Non-key attribute names in declaration order.
    pub fn non_key_fields(&self) -> &[String] {
        &self.non_key
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// All descriptors in declaration order, primary key included.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The storage column for an attribute name.
    pub fn column(&self, attr: &str) -> &str {
        self.fields
            .get(attr)
            .map(|field| field.column_name())
            .unwrap_or(attr)
    }

    /// Returns the stored value for `name`, resolving the descriptor's
    /// default when absent.
    ///
    /// A resolved default (including the result of a producer function) is
    /// memoized onto the record, so a second read observes the same value.
    pub fn value_or_default(&self, record: &mut Record, name: &str) -> Value {
        let current = record.get(name);
        if !current.is_null() {
            return current;
        }

        let Some(field) = self.fields.get(name) else {
            return Value::Null;
        };

        let resolved = match field.default() {
            FieldDefault::None => return Value::Null,
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Func(f) => f(),
        };

        debug!(model = %self.name, field = name, value = ?resolved, "using default value");
        record.insert(name, resolved.clone());
        resolved
    }

    /// Re-keys a result row from storage column names to attribute names.
    ///
    /// Columns that map to no attribute (e.g. computed selections) pass
    /// through unchanged.
    pub fn record_from_row(&self, row: Record) -> Record {
        row.into_iter()
            .map(|(column, value)| {
                let attr = self
                    .fields
                    .iter()
                    .find(|(_, field)| field.column_name() == column)
                    .map(|(name, _)| name.clone())
                    .unwrap_or(column);
                (attr, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn user_def() -> ModelDef {
        ModelDef::new("User")
            .table("users")
            .field(FieldDef::string("id").primary_key())
            .field(FieldDef::string("email"))
            .field(FieldDef::boolean("admin"))
            .field(FieldDef::integer("visits"))
    }

    #[test]
    fn compiles_declaration_in_order() {
        let schema = ModelSchema::build(user_def()).unwrap();

        assert_eq!(schema.name(), "User");
        assert_eq!(schema.table(), "users");
        assert_eq!(schema.primary_key(), "id");
        assert_eq!(schema.non_key_fields(), ["email", "admin", "visits"]);
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.field("admin").unwrap().kind(), FieldKind::Boolean);
    }

    #[test]
    fn table_defaults_to_model_name() {
        let def = ModelDef::new("Blog").field(FieldDef::string("id").primary_key());
        let schema = ModelSchema::build(def).unwrap();
        assert_eq!(schema.table(), "Blog");
    }

    #[test]
    fn missing_primary_key_is_fatal() {
        let def = ModelDef::new("User").field(FieldDef::string("email"));
        let err = ModelSchema::build(def).unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey { .. }));
    }

    #[test]
    fn duplicate_primary_key_names_second_field() {
        // Both declaration orders must fail, naming the later field.
        let def = ModelDef::new("User")
            .field(FieldDef::string("id").primary_key())
            .field(FieldDef::string("email").primary_key());
        match ModelSchema::build(def).unwrap_err() {
            Error::DuplicatePrimaryKey { field, .. } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {other}"),
        }

        let def = ModelDef::new("User")
            .field(FieldDef::string("email").primary_key())
            .field(FieldDef::string("id").primary_key());
        match ModelSchema::build(def).unwrap_err() {
            Error::DuplicatePrimaryKey { field, .. } => assert_eq!(field, "id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_attribute_is_fatal() {
        let def = ModelDef::new("User")
            .field(FieldDef::string("id").primary_key())
            .field(FieldDef::string("email"))
            .field(FieldDef::text("email"));
        let err = ModelSchema::build(def).unwrap_err();
        assert!(matches!(err, Error::DuplicateField { .. }));
    }

    #[test]
    fn value_or_default_memoizes() {
        let schema = ModelSchema::build(user_def()).unwrap();
        let mut record = Record::new();

        // Stored values win and are never replaced.
        record.insert("visits", 7);
        assert_eq!(schema.value_or_default(&mut record, "visits"), Value::I64(7));

        // Kind defaults resolve and stick.
        assert_eq!(
            schema.value_or_default(&mut record, "admin"),
            Value::Bool(false)
        );
        assert!(record.contains("admin"));

        // No default: stays absent.
        assert_eq!(schema.value_or_default(&mut record, "email"), Value::Null);
        assert!(!record.contains("email"));
    }

    #[test]
    fn value_or_default_invokes_producer_once() {
        fn fresh_id() -> Value {
            Value::from("generated")
        }

        let def = ModelDef::new("Session")
            .field(FieldDef::string("id").primary_key().default_fn(fresh_id))
            .field(FieldDef::string("note"));
        let schema = ModelSchema::build(def).unwrap();

        let mut record = Record::new();
        let first = schema.value_or_default(&mut record, "id");
        assert_eq!(first, Value::from("generated"));
        // Memoized: the stored copy is read back, not re-produced.
        assert_eq!(record.get("id"), first);
        assert_eq!(schema.value_or_default(&mut record, "id"), first);
    }

    #[test]
    fn rows_are_rekeyed_by_column_override() {
        let def = ModelDef::new("User")
            .field(FieldDef::string("id").primary_key())
            .field(FieldDef::string("email").column("email_addr"));
        let schema = ModelSchema::build(def).unwrap();

        let row = Record::new()
            .with("id", "u1")
            .with("email_addr", "u1@example.com")
            .with("_num_", 3);
        let record = schema.record_from_row(row);

        assert_eq!(record.get("email"), Value::from("u1@example.com"));
        assert!(!record.contains("email_addr"));
        assert_eq!(record.get("_num_"), Value::I64(3));
    }
}
