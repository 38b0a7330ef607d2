/// Parameters for a record listing.
///
/// Only free-text search is delegated to the store. Topic filtering is
/// always done client-side by [`crate::filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    text: Option<String>,
}

impl RecordQuery {
    /// Creates a query that lists the most recent records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query that searches text and notes for `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Returns the trimmed search text, or `None` if it is blank.
    pub fn search_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Builds the PostgREST `or` filter matching text or notes.
    ///
    /// Returns `None` when there is nothing to search for.
    pub(crate) fn or_filter(&self) -> Option<String> {
        let text = self.search_text()?;
        let pattern = quote_value(&format!("%{}%", escape_like(text)));
        Some(format!("(text.ilike.{pattern},notes.ilike.{pattern})"))
    }
}

/// Escapes LIKE wildcards so the text matches literally.
///
/// `%` and `_` are prefixed with a backslash, as is the backslash itself.
///
/// # Examples
///
/// ```
/// use prasang::store::escape_like;
///
/// assert_eq!(escape_like("100%"), r"100\%");
/// assert_eq!(escape_like("a_b"), r"a\_b");
/// assert_eq!(escape_like("seva"), "seva");
/// ```
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps a filter value in double quotes for PostgREST's logic-tree syntax.
///
/// Quoting keeps commas and parentheses in user text from being read as
/// syntax; backslashes and quotes inside are backslash-escaped.
fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
