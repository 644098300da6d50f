// ABOUTME: Column decoding helpers shared by the per-entity database modules
// ABOUTME: Converts TEXT-encoded UUIDs, timestamps, enums and JSON lists back into Rust types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Storage format for salon-local datetimes
pub(crate) const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Storage format for dates
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn fmt_local(value: NaiveDateTime) -> String {
    value.format(LOCAL_FORMAT).to_string()
}

pub(crate) fn fmt_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn fmt_utc(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn uuid_col(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Invalid UUID in column {column}: {e}")))
}

pub(crate) fn opt_uuid_col(row: &SqliteRow, column: &str) -> AppResult<Option<Uuid>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| {
        Uuid::parse_str(&value)
            .map_err(|e| AppError::database(format!("Invalid UUID in column {column}: {e}")))
    })
    .transpose()
}

pub(crate) fn utc_col(row: &SqliteRow, column: &str) -> AppResult<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    parse_utc(column, &raw)
}

pub(crate) fn opt_utc_col(row: &SqliteRow, column: &str) -> AppResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| parse_utc(column, &value)).transpose()
}

fn parse_utc(column: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in column {column}: {e}")))
}

pub(crate) fn local_col(row: &SqliteRow, column: &str) -> AppResult<NaiveDateTime> {
    let raw: String = row.try_get(column)?;
    parse_local(column, &raw)
}

pub(crate) fn opt_local_col(row: &SqliteRow, column: &str) -> AppResult<Option<NaiveDateTime>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| parse_local(column, &value)).transpose()
}

fn parse_local(column: &str, raw: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT)
        .map_err(|e| AppError::database(format!("Invalid local time in column {column}: {e}")))
}

pub(crate) fn date_col(row: &SqliteRow, column: &str) -> AppResult<NaiveDate> {
    let raw: String = row.try_get(column)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| AppError::database(format!("Invalid date in column {column}: {e}")))
}

pub(crate) fn opt_date_col(row: &SqliteRow, column: &str) -> AppResult<Option<NaiveDate>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| {
        NaiveDate::parse_from_str(&value, DATE_FORMAT)
            .map_err(|e| AppError::database(format!("Invalid date in column {column}: {e}")))
    })
    .transpose()
}

/// Decode a text-backed enum with its `parse` function
pub(crate) fn enum_col<T>(
    row: &SqliteRow,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> AppResult<T> {
    let raw: String = row.try_get(column)?;
    parse(&raw).ok_or_else(|| AppError::database(format!("Unknown value '{raw}' in {column}")))
}

pub(crate) fn u32_col(row: &SqliteRow, column: &str) -> AppResult<u32> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw)
        .map_err(|_| AppError::database(format!("Value {raw} out of range in {column}")))
}

pub(crate) fn opt_u32_col(row: &SqliteRow, column: &str) -> AppResult<Option<u32>> {
    let raw: Option<i64> = row.try_get(column)?;
    raw.map(|value| {
        u32::try_from(value)
            .map_err(|_| AppError::database(format!("Value {value} out of range in {column}")))
    })
    .transpose()
}

pub(crate) fn json_col<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> AppResult<T> {
    let raw: String = row.try_get(column)?;
    Ok(serde_json::from_str(&raw)?)
}
