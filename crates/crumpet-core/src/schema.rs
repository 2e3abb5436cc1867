mod field;
pub use field::{FieldDef, FieldDefault, FieldKind};

mod model;
pub use model::{ModelDef, ModelSchema};
