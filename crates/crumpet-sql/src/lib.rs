//! MySQL statement synthesis for crumpet.
//!
//! Statements are assembled as strings with backtick-quoted identifiers and
//! `?` positional placeholders. Argument binding happens in the executor;
//! this crate only produces text and accounts for placeholders.

mod ident;
pub use ident::ident;

mod params;
pub use params::placeholder_count;

mod select;
pub use select::{scalar_select, select_by_key, select_query};

mod templates;
pub use templates::{create_table, Templates};
