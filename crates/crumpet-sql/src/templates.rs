use crate::ident;

use crumpet_core::schema::ModelSchema;

/// The four statements precomputed for a registered entity type.
///
/// Identifiers are storage column names (overrides honored), placeholders
/// are positional `?` in declaration order:
///
/// - select: primary key first, then the non-key columns
/// - insert: non-key columns first, primary key last
/// - update: one `<column>=?` per non-key column, primary key as the sole
///   predicate
/// - delete: primary key as the sole predicate
#[derive(Debug, Clone)]
pub struct Templates {
    pub select: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

impl Templates {
    pub fn build(schema: &ModelSchema) -> Self {
        let table = ident(schema.table());
        let pk = ident(schema.column(schema.primary_key()));
        let columns: Vec<String> = schema
            .non_key_fields()
            .iter()
            .map(|attr| ident(schema.column(attr)))
            .collect();

        let select = if columns.is_empty() {
            format!("select {pk} from {table}")
        } else {
            format!("select {pk}, {} from {table}", columns.join(", "))
        };

        let insert_columns = if columns.is_empty() {
            pk.clone()
        } else {
            format!("{}, {pk}", columns.join(", "))
        };
        let placeholders = vec!["?"; columns.len() + 1].join(", ");
        let insert = format!("insert into {table} ({insert_columns}) values ({placeholders})");

        let assignments: Vec<String> = columns.iter().map(|col| format!("{col}=?")).collect();
        let update = format!(
            "update {table} set {} where {pk}=?",
            assignments.join(", ")
        );

        let delete = format!("delete from {table} where {pk}=?");

        Self {
            select,
            insert,
            update,
            delete,
        }
    }
}

/// Emits `create table if not exists` DDL for a schema: column types from
/// the field descriptors, primary key clause last. One-shot setup only;
/// there is no diffing or altering.
pub fn create_table(schema: &ModelSchema) -> String {
    let mut columns: Vec<String> = schema
        .fields()
        .map(|field| {
            let mut column = format!("{} {}", ident(field.column_name()), field.ty());
            if field.is_primary_key() {
                column.push_str(" not null");
            }
            column
        })
        .collect();
    columns.push(format!(
        "primary key ({})",
        ident(schema.column(schema.primary_key()))
    ));

    format!(
        "create table if not exists {} ({})",
        ident(schema.table()),
        columns.join(", ")
    )
}
