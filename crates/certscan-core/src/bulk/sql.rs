//! Field formatting for `LOAD DATA INFILE` files
//!
//! Lines use `FIELDS TERMINATED BY ',' ENCLOSED BY '"' ESCAPED BY '\\'`
//! with the default `\n` line terminator. A bare `NONE` stands for a
//! missing value.

use chrono::NaiveDateTime;

/// Field options matching the line format produced here
pub const FIELD_OPTIONS: &str = r#"FIELDS TERMINATED BY ',' ENCLOSED BY '"' ESCAPED BY '\\'"#;

/// Unquoted placeholder for a missing value
pub const NONE: &str = "NONE";

/// Datetime layout expected by the database
pub const SQL_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Quote a field, backslash-escaping `\`, `"`, `,` and newline
pub fn escape_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '\\' | '"' | ',' | '\n') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Integer field, `NONE` if `s` is not an integer
pub fn to_sql_int(s: &str) -> String {
    s.parse::<i64>()
        .map_or_else(|_| NONE.to_string(), |n| escape_field(&n.to_string()))
}

/// String field, `NONE` if empty
pub fn to_sql_string(s: &str) -> String {
    if s.is_empty() {
        NONE.to_string()
    } else {
        escape_field(s)
    }
}

/// Boolean field
pub fn to_sql_bool(value: bool) -> String {
    escape_field(if value { "TRUE" } else { "FALSE" })
}

/// Datetime field
pub fn to_sql_datetime(t: &NaiveDateTime) -> String {
    escape_field(&t.format(SQL_DATETIME).to_string())
}

/// Join fields into one terminated line
pub fn to_sql_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(field.as_ref());
    }
    line.push('\n');
    line
}
