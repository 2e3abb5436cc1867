use crumpet_core::stmt::{Limit, Value};

/// Options for [`Model::find_all`](crate::Model::find_all): an optional
/// filter fragment with its positional arguments, an optional order-by
/// fragment, and an optional row limit.
///
/// Fragments are trusted SQL text; values always travel as bound
/// placeholder arguments, never interpolated.
#[derive(Debug, Default, Clone)]
pub struct Query {
    filter: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `where` fragment, e.g. `` "`admin`=?" ``.
    pub fn filter(mut self, fragment: impl Into<String>) -> Self {
        self.filter = Some(fragment.into());
        self
    }

    /// Appends one positional argument for the filter fragment.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets the `order by` fragment, e.g. `` "`created_at` desc" ``.
    pub fn order_by(mut self, fragment: impl Into<String>) -> Self {
        self.order_by = Some(fragment.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<Value>, Option<String>, Option<Limit>) {
        (self.filter, self.args, self.order_by, self.limit)
    }
}
