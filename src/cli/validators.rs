//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

/// Parse a strictly positive count.
///
/// # Arguments
///
/// * `s` - The string to parse
/// * `name` - Name of the parameter for error messages
pub fn parse_positive(s: &str, name: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid whole number"))?;

    if value == 0 {
        return Err(format!("{name} must be at least 1"));
    }

    Ok(value)
}

/// Parse and validate the number of ranked predictions.
pub fn parse_top_k(s: &str) -> Result<usize, String> {
    parse_positive(s, "top-k")
}

/// Parse and validate the engine thread count.
pub fn parse_threads(s: &str) -> Result<usize, String> {
    parse_positive(s, "threads")
}
