use crumpet_core::stmt::Value;

use uuid::Uuid;

/// Produces a fresh 32-character hex id.
///
/// Shaped as a field default for string primary keys:
/// `FieldDef::string("id").primary_key().default_fn(generate_id)`.
pub fn generate_id() -> Value {
    Uuid::new_v4().simple().to_string().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_hex_strings() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);

        let id = a.as_str().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
