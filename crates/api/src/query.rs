//! Query parameter types for the player endpoints.
//!
//! Enum-valued and timestamp parameters arrive as raw strings / epoch
//! milliseconds and are converted here, so unknown values surface as JSON
//! `400` responses instead of extractor rejections.

use chrono::DateTime;
use roster_core::error::CoreError;
use roster_core::filter::{PageRequest, PlayerFilter, PlayerOrder};
use roster_core::types::Timestamp;
use serde::Deserialize;

/// Filters shared by `GET /players` and `GET /players/count`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFilterParams {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<String>,
    pub profession: Option<String>,
    /// Epoch milliseconds, inclusive.
    pub after: Option<i64>,
    /// Epoch milliseconds, inclusive.
    pub before: Option<i64>,
    pub banned: Option<bool>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
}

impl PlayerFilterParams {
    /// Convert raw parameters into a typed [`PlayerFilter`].
    pub fn into_filter(self) -> Result<PlayerFilter, CoreError> {
        Ok(PlayerFilter {
            name: self.name,
            title: self.title,
            race: self.race.as_deref().map(str::parse).transpose()?,
            profession: self.profession.as_deref().map(str::parse).transpose()?,
            after: self.after.map(|ms| from_millis("after", ms)).transpose()?,
            before: self.before.map(|ms| from_millis("before", ms)).transpose()?,
            banned: self.banned,
            min_experience: self.min_experience,
            max_experience: self.max_experience,
            min_level: self.min_level,
            max_level: self.max_level,
        })
    }
}

/// Sorting and paging for `GET /players` (`?order=&pageNumber=&pageSize=`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub order: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Apply defaults (`ID`, page 0, size 3) and reject invalid values.
    pub fn into_order_and_page(self) -> Result<(PlayerOrder, PageRequest), CoreError> {
        let order = PlayerOrder::parse_or_default(self.order.as_deref())?;
        let page = PageRequest::new(self.page_number, self.page_size)?;
        Ok((order, page))
    }
}

fn from_millis(param: &str, ms: i64) -> Result<Timestamp, CoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| CoreError::InvalidInput(format!("{param} is out of range (got {ms})")))
}
