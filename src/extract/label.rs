//! Label recovery from taxonomy-summary filenames.
//!
//! Grammar: the filename is split on `.`; each token `t` is read as
//! the decimal `0.t`. The first value whose rendered form is longer
//! than three characters is the label, so `0.03` is accepted while
//! `0.5` or `0` are not.
//!
//! This is a heuristic with known blind spots (single-digit labels
//! are never found, exponent tokens such as `1e2` are accepted) and
//! is kept as-is for compatibility with existing run directories.

/// Minimum rendered length, exclusive.
const MIN_RENDERED_LEN: usize = 3;

/// Read a single token as the fractional part of a decimal.
pub fn parse_token(token: &str) -> Option<f64> {
    let value = format!("0.{}", token).parse::<f64>().ok()?;

    if render(value).len() > MIN_RENDERED_LEN {
        Some(value)
    } else {
        None
    }
}

/// Shortest decimal rendering, keeping a `.0` on integral values.
fn render(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// First qualifying label token in `filename`, if any.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::extract::label::parse_label;
///
/// assert_eq!(parse_label("run.0.03.cons.taxonomy"), Some(0.03));
/// assert_eq!(parse_label("run.unique.cons.taxonomy"), None);
/// ```
pub fn parse_label(filename: &str) -> Option<f64> {
    filename.split('.').find_map(parse_token)
}
