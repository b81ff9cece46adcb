use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "books", "car-parts", "c1a2b3c4"
    /// - Invalid: "-cars", "cars-", "car--parts", "Cars", "car_parts"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Escape `%`, `_` and `\` so user text is matched literally inside an ILIKE pattern
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build a case-insensitive substring pattern for ILIKE
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}
