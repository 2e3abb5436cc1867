pub mod db;
pub use db::{Builder, Config, Db};

mod id;
pub use id::generate_id;

mod model;
pub use model::Model;

mod query;
pub use query::Query;

mod value;

pub use crumpet_core::schema::{FieldDef, FieldDefault, FieldKind, ModelDef, ModelSchema};
pub use crumpet_core::stmt::{Limit, Record, Value};
pub use crumpet_core::{Error, Result};
