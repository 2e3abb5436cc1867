/// Quotes an identifier MySQL-style, escaping embedded backticks by
/// doubling them.
pub fn ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
