use super::Value;
use crate::{Error, Result};

/// A row limit for `find_all`: either a plain row count or an
/// `(offset, count)` pair, rendered as `limit ?` / `limit ?, ?`.
///
/// Typed construction is infallible; loose inputs (query-string text, a
/// runtime [`Value`]) go through [`Limit::parse`] / `TryFrom`, which reject
/// every other shape with the invalid-limit error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    OffsetCount(u64, u64),
}

impl Limit {
    /// Parses `"N"` or `"N,M"` (offset, count).
    pub fn parse(src: &str) -> Result<Self> {
        let parts: Vec<&str> = src.split(',').map(str::trim).collect();

        let number = |part: &str| -> Result<u64> {
            part.parse()
                .map_err(|_| Error::invalid_limit(format!("`{src}` is not a row count")))
        };

        match parts.as_slice() {
            &[count] => Ok(Self::Count(number(count)?)),
            &[offset, count] => Ok(Self::OffsetCount(number(offset)?, number(count)?)),
            _ => Err(Error::invalid_limit(format!(
                "`{src}` is neither a count nor an offset, count pair"
            ))),
        }
    }
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Self::Count(count)
    }
}

impl From<u32> for Limit {
    fn from(count: u32) -> Self {
        Self::Count(count.into())
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self::OffsetCount(offset, count)
    }
}

impl TryFrom<&Value> for Limit {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::I64(count) if *count >= 0 => Ok(Self::Count(*count as u64)),
            Value::String(src) => Self::parse(src),
            other => Err(Error::invalid_limit(format!(
                "{other:?} is neither a count nor an offset, count pair"
            ))),
        }
    }
}
