use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YMD: Regex = Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})([tT ].*)?$").unwrap();
    static ref MDY: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap();
    static ref BARE_YEAR: Regex = Regex::new(r"^\d{4}$").unwrap();
}

/// Canonical value produced by normalization. Every comparison in the
/// engine happens between two of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Date(NaiveDate),
    Number(f64),
    /// Always stored lowercased after normalization.
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Canonicalize a raw value for comparison. Idempotent: normalizing an
    /// already-normalized value returns it unchanged.
    ///
    /// Strings are checked against the permissive date parser before being
    /// lowercased, so a bare 4-digit year classifies as a Date even when the
    /// field it came from is numeric. That coercion order is load-bearing
    /// for saved shelves; do not reorder it.
    pub fn normalize(self) -> Value {
        match self {
            Value::Text(s) => match parse_loose_date(&s) {
                Some(date) => Value::Date(date),
                None => Value::Text(s.to_lowercase()),
            },
            Value::List(items) => {
                Value::List(items.into_iter().map(Value::normalize).collect())
            }
            other => other,
        }
    }

    /// Numeric coercion for the comparison operators. Anything that has no
    /// numeric reading becomes NaN, and NaN comparisons are always false.
    pub fn coerce_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            // Midnight epoch milliseconds, matching instant comparison.
            Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
                Some(dt) => dt.and_utc().timestamp_millis() as f64,
                None => f64::NAN,
            },
            Value::Null | Value::List(_) => f64::NAN,
        }
    }

    /// Lowercase string form used for set-membership comparisons.
    /// Null and nested lists have no term form.
    pub fn as_term(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.to_lowercase()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::Null | Value::List(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Format a number the way it appears in rule operands: whole values
/// without a trailing ".0".
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Permissive date parser: accepts YYYY-MM-DD (optionally with a trailing
/// time component), YYYY/MM/DD, MM/DD/YYYY, and a bare 4-digit year
/// (January 1st of that year).
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    if let Some(caps) = YMD.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = MDY.captures(s) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if BARE_YEAR.is_match(s) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}
