use std::str::FromStr;

use rust_decimal::Decimal;
use sales_core::RepositoryError;
use sqlx::{Row, TypeInfo, ValueRef};

/// Parse a TEXT amount written by this crate.
pub fn parse_decimal(
    column: &str,
    text: &str,
) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(text.trim()).map_err(|e| {
        RepositoryError::Database(format!("Invalid decimal '{text}' in column '{column}': {e}"))
    })
}

/// Get a decimal value from a row.
///
/// Amounts are written as TEXT, but rows edited by hand or seeded with bare
/// numbers come back as INTEGER or REAL, so those are accepted too.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            parse_decimal(column, &val)
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}
