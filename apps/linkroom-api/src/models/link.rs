use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::schema::links;

/// Capacity status of a shared link.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Available,
    Filling,
    Full,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Available => "available",
            LinkStatus::Filling => "filling",
            LinkStatus::Full => "full",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown link status `{0}` (expected available, filling or full)")]
pub struct UnknownLinkStatus(pub String);

impl FromStr for LinkStatus {
    type Err = UnknownLinkStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(LinkStatus::Available),
            "filling" => Ok(LinkStatus::Filling),
            "full" => Ok(LinkStatus::Full),
            other => Err(UnknownLinkStatus(other.to_string())),
        }
    }
}

impl ToSql<Text, Pg> for LinkStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for LinkStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(raw.parse::<LinkStatus>()?)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = links)]
pub struct Link {
    pub id: i64,
    pub room_id: i64,
    pub url: String,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = links)]
pub struct NewLink<'a> {
    pub room_id: i64,
    pub url: &'a str,
    pub status: LinkStatus,
}

/// Partial update of a link. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = links)]
pub struct LinkChanges {
    pub url: Option<String>,
    pub status: Option<LinkStatus>,
}

impl LinkChanges {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.status.is_none()
    }
}

/// A link joined with the name of its room, as pushed to room viewers on update.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LinkWithRoom {
    #[serde(flatten)]
    pub link: Link,
    pub room_name: String,
}
