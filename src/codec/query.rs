//! Query string and form body encoding.

/// Percent-encodes each key and value and joins them as `key=value` pairs
/// separated by `&`, preserving the given order.
///
/// Everything outside the RFC 3986 unreserved set is escaped, so titles
/// joined with `|` and free-form page text survive the round trip.
///
/// # Example
///
/// ```
/// use wiki_updater_core::codec::build_query;
///
/// let qs = build_query([("action", "query"), ("titles", "A|B C")]);
/// assert_eq!(qs, "action=query&titles=A%7CB%20C");
/// ```
#[must_use]
pub fn build_query<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
