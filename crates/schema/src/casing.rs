//! Declared-name standardization
//!
//! Pipeline: insert a separator before each internal uppercase letter,
//! then lowercase. camelCase declarations and snake_case declarations both
//! standardize to the same snake_case property names, so entities and
//! repositories written in either convention meet in one namespace.
//!
//! This is a deliberate per-uppercase state machine, not an acronym-aware
//! case converter: `findByISBN` standardizes to `find_by_i_s_b_n`, exactly
//! as the underscore-casing convention prescribes.

/// Standardize a declared member name.
///
/// A separator is inserted before each internal uppercase letter (unless
/// one is already there) and the result is lowercased.
///
/// # Example
///
/// ```
/// use quarry_schema::casing::standardize;
///
/// assert_eq!(standardize("findByTitleAndAuthor"), "find_by_title_and_author");
/// assert_eq!(standardize("already_snake"), "already_snake");
/// ```
pub fn standardize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split a standardized name into its `_`-separated tokens.
///
/// Empty tokens (doubled or leading separators) are dropped.
///
/// # Example
///
/// ```
/// use quarry_schema::casing::tokens;
///
/// let toks: Vec<&str> = tokens("find_by_title").collect();
/// assert_eq!(toks, vec!["find", "by", "title"]);
/// ```
pub fn tokens(name: &str) -> impl Iterator<Item = &str> {
    name.split('_').filter(|t| !t.is_empty())
}
