//! Timestamp utilities
//!
//! Translation and comment rows are stamped with UTC times stored as
//! fixed-width text, so `ORDER BY created_at` in SQL agrees with
//! chronological order.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Type};
use std::fmt;
use std::str::FromStr;

/// Storage format for `created_at` columns
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format shown to clients in history feeds
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A UTC instant as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Current UTC time
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Text written into `created_at` columns
    pub fn to_db_string(&self) -> String {
        self.0.format(DB_FORMAT).to_string()
    }

    /// Second-resolution text used in JSON responses
    pub fn display(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDateTime::parse_from_str(s, DB_FORMAT)?;
        Ok(Timestamp(naive.and_utc()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Type<Sqlite> for Timestamp {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for Timestamp {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <String as Decode<Sqlite>>::decode(value)?;
        Ok(text.parse()?)
    }
}
