//! Identifier quoting and statement construction for HiveQL.
//!
//! Database and table names are never spliced into statements raw: each part
//! is validated and backtick-quoted, and the table-name pattern is validated
//! before it becomes a string literal.

use crate::error::HiveSheetError;
use crate::Result;

/// Quotes a (possibly dotted) identifier with backticks.
///
/// Embedded backticks are doubled, which is how HiveQL escapes them inside a
/// quoted identifier.
///
/// # Errors
/// Rejects empty names, empty dotted parts and control characters.
///
/// # Example
/// ```rust
/// use hivesheet_core::adapters::identifiers::quote_identifier;
///
/// assert_eq!(quote_identifier("dws.orders")?, "`dws`.`orders`");
/// assert_eq!(quote_identifier("we`ird")?, "`we``ird`");
/// # Ok::<(), hivesheet_core::HiveSheetError>(())
/// ```
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(HiveSheetError::configuration("identifier cannot be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(HiveSheetError::configuration(format!(
            "identifier {name:?} contains control characters"
        )));
    }

    let parts = name
        .split('.')
        .map(|part| {
            if part.is_empty() {
                Err(HiveSheetError::configuration(format!(
                    "identifier {name:?} has an empty part"
                )))
            } else {
                Ok(format!("`{}`", part.replace('`', "``")))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join("."))
}

/// Builds the `'<prefix>*'` literal for `SHOW TABLES LIKE`.
///
/// The engine's own pattern syntax (`*`, `|`) passes through untouched;
/// only characters that could end the literal are refused.
///
/// # Errors
/// Rejects quotes, backslashes and control characters.
pub fn table_pattern_literal(prefix: &str) -> Result<String> {
    if let Some(bad) = prefix
        .chars()
        .find(|c| *c == '\'' || *c == '\\' || c.is_control())
    {
        return Err(HiveSheetError::configuration(format!(
            "table prefix {prefix:?} contains forbidden character {bad:?}"
        )));
    }
    Ok(format!("'{prefix}*'"))
}

/// `USE <db>`
pub fn use_database(database: &str) -> Result<String> {
    Ok(format!("USE {}", quote_identifier(database)?))
}

/// `SHOW TABLES LIKE '<prefix>*'`
pub fn show_tables_like(prefix: &str) -> Result<String> {
    Ok(format!("SHOW TABLES LIKE {}", table_pattern_literal(prefix)?))
}

/// `SHOW TBLPROPERTIES <table>('comment')`
pub fn show_table_comment(table: &str) -> Result<String> {
    Ok(format!(
        "SHOW TBLPROPERTIES {}('comment')",
        quote_identifier(table)?
    ))
}

/// `DESCRIBE <table>`
pub fn describe_table(table: &str) -> Result<String> {
    Ok(format!("DESCRIBE {}", quote_identifier(table)?))
}

/// `SELECT * FROM <table>`
pub fn select_all(table: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {}", quote_identifier(table)?))
}
