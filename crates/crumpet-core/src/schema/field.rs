use crate::stmt::Value;

use std::fmt;

/// The five mapped column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

impl FieldKind {
    fn default_column_type(self) -> &'static str {
        match self {
            Self::String => "varchar(100)",
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
            Self::Float => "real",
            Self::Text => "text",
        }
    }

    fn default_value(self) -> FieldDefault {
        match self {
            Self::Boolean => FieldDefault::Value(Value::Bool(false)),
            Self::Integer => FieldDefault::Value(Value::I64(0)),
            Self::Float => FieldDefault::Value(Value::F64(0.0)),
            Self::String | Self::Text => FieldDefault::None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Text => "Text",
        };
        f.write_str(name)
    }
}

/// The default supplied when a field is absent at write time.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// No default; an unset field is written as null.
    None,

    /// A fixed value.
    Value(Value),

    /// A producer invoked lazily, once per resolution.
    Func(fn() -> Value),
}

/// Declarative metadata for one mapped column.
///
/// Immutable once handed to the registrar. The attribute name doubles as the
/// storage column name unless overridden with [`FieldDef::column`].
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    column: Option<String>,
    kind: FieldKind,
    column_type: String,
    primary_key: bool,
    default: FieldDefault,
}

impl FieldDef {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind,
            column_type: kind.default_column_type().to_string(),
            primary_key: false,
            default: kind.default_value(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Marks this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Overrides the storage column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Overrides the column's DDL type, e.g. `varchar(50)`.
    pub fn column_type(mut self, ddl: impl Into<String>) -> Self {
        self.column_type = ddl.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    pub fn default_fn(mut self, f: fn() -> Value) -> Self {
        self.default = FieldDefault::Func(f);
        self
    }

    /// Clears the kind-supplied default.
    pub fn no_default(mut self) -> Self {
        self.default = FieldDefault::None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage column name: the override if present, else the
    /// attribute name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn ty(&self) -> &str {
        &self.column_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}: {}>", self.kind, self.column_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_fixes_column_type() {
        assert_eq!(FieldDef::string("email").ty(), "varchar(100)");
        assert_eq!(FieldDef::boolean("admin").ty(), "boolean");
        assert_eq!(FieldDef::integer("visits").ty(), "bigint");
        assert_eq!(FieldDef::float("score").ty(), "real");
        assert_eq!(FieldDef::text("bio").ty(), "text");
    }

    #[test]
    fn column_type_override() {
        let field = FieldDef::string("id").column_type("varchar(50)");
        assert_eq!(field.ty(), "varchar(50)");
    }

    #[test]
    fn kind_supplies_default() {
        assert!(matches!(
            FieldDef::boolean("admin").default(),
            FieldDefault::Value(Value::Bool(false))
        ));
        assert!(matches!(
            FieldDef::integer("visits").default(),
            FieldDefault::Value(Value::I64(0))
        ));
        assert!(matches!(FieldDef::string("email").default(), FieldDefault::None));
    }

    #[test]
    fn column_name_falls_back_to_attribute() {
        let plain = FieldDef::string("email");
        assert_eq!(plain.column_name(), "email");

        let renamed = FieldDef::string("email").column("email_addr");
        assert_eq!(renamed.column_name(), "email_addr");
        assert_eq!(renamed.name(), "email");
    }

    #[test]
    fn display_form() {
        let field = FieldDef::string("email");
        assert_eq!(field.to_string(), "<String, varchar(100): email>");
    }
}
