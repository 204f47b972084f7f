// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! A wrapper type for Unix epoch millisecond timestamps stored in
//! SQLite `BIGINT` columns.
//!
//! # Overview
//!
//! Element instances record `last_updated` and `config_last_updated`
//! as milliseconds since the Unix epoch. Fog agents compare these
//! values numerically against their own clocks, so the database keeps
//! the raw integer rather than a formatted timestamp.
//!
//! `EpochMillis` keeps that integer representation on the wire while
//! giving Rust code a distinct type, so a timestamp cannot be passed
//! where a track id or log size is expected.
//!
//! # Diesel Integration
//!
//! `EpochMillis` implements:
//! * `ToSql<BigInt, Sqlite>`
//! * `FromSql<BigInt, Sqlite>`
//! * `AsExpression<BigInt>`
//! * `FromSqlRow<BigInt>`

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::BigInt)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Returns the inner i64 value.
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Converts to a UTC datetime, or `None` if the stored value is
    /// outside the range chrono can represent.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl std::fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<i64> for EpochMillis {
    fn from(val: i64) -> Self {
        Self(val)
    }
}

impl From<EpochMillis> for i64 {
    fn from(val: EpochMillis) -> Self {
        val.0
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from(val: DateTime<Utc>) -> Self {
        Self(val.timestamp_millis())
    }
}

impl diesel::serialize::ToSql<diesel::sql_types::BigInt, diesel::sqlite::Sqlite> for EpochMillis {
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, diesel::sqlite::Sqlite>,
    ) -> diesel::serialize::Result {
        diesel::serialize::ToSql::<diesel::sql_types::BigInt, diesel::sqlite::Sqlite>::to_sql(
            &self.0, out,
        )
    }
}

impl diesel::deserialize::FromSql<diesel::sql_types::BigInt, diesel::sqlite::Sqlite>
    for EpochMillis
{
    fn from_sql(
        bytes: <diesel::sqlite::Sqlite as diesel::backend::Backend>::RawValue<'_>,
    ) -> diesel::deserialize::Result<Self> {
        <i64 as diesel::deserialize::FromSql<diesel::sql_types::BigInt, diesel::sqlite::Sqlite>>::from_sql(bytes)
            .map(Self)
    }
}
