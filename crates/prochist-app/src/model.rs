// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;
use time::macros::format_description;

/// One historical execution of a process definition, as reported by the
/// engine's history API. Read-only input; the table never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub id: String,
    pub state: String,
    #[serde(default)]
    pub business_key: Option<String>,
    #[serde(default, with = "engine_time")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "engine_time")]
    pub end_time: Option<OffsetDateTime>,
}

/// Row derived 1:1 from an [`InstanceRecord`]: timestamps carry both the
/// raw instant (for chronological comparison) and the formatted text shown
/// in the table, with an empty marker for absent values.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub id: String,
    pub state: String,
    pub business_key: Option<String>,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
    pub start_text: String,
    pub end_text: String,
}

impl DisplayRow {
    pub fn from_record(record: &InstanceRecord) -> Self {
        Self {
            id: record.id.clone(),
            state: record.state.clone(),
            business_key: record.business_key.clone(),
            start_time: record.start_time,
            end_time: record.end_time,
            start_text: format_instant(record.start_time),
            end_text: format_instant(record.end_time),
        }
    }

    pub fn cell(&self, column: ColumnKey) -> CellValue<'_> {
        match column {
            ColumnKey::State => CellValue::Text(&self.state),
            ColumnKey::InstanceId => CellValue::Text(&self.id),
            ColumnKey::StartTime => CellValue::Instant(self.start_time),
            ColumnKey::EndTime => CellValue::Instant(self.end_time),
            ColumnKey::BusinessKey => CellValue::OptionalText(self.business_key.as_deref()),
            ColumnKey::Download => CellValue::Action,
        }
    }

    pub fn cell_text(&self, column: ColumnKey) -> String {
        match column {
            ColumnKey::State => self.state.clone(),
            ColumnKey::InstanceId => self.id.clone(),
            ColumnKey::StartTime => self.start_text.clone(),
            ColumnKey::EndTime => self.end_text.clone(),
            ColumnKey::BusinessKey => self.business_key.clone().unwrap_or_default(),
            ColumnKey::Download => "download".to_owned(),
        }
    }
}

pub fn format_instant(value: Option<OffsetDateTime>) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    match value {
        Some(instant) => instant.format(&format).unwrap_or_default(),
        None => String::new(),
    }
}

/// The fixed, closed column set of the history table. `Download` is an
/// action column and carries no sortable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    State,
    InstanceId,
    StartTime,
    EndTime,
    BusinessKey,
    Download,
}

impl ColumnKey {
    pub const ALL: [Self; 6] = [
        Self::State,
        Self::InstanceId,
        Self::StartTime,
        Self::EndTime,
        Self::BusinessKey,
        Self::Download,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::InstanceId => "Instance ID",
            Self::StartTime => "Start Time",
            Self::EndTime => "End Time",
            Self::BusinessKey => "Business Key",
            Self::Download => "Download",
        }
    }

    pub const fn is_sortable(self) -> bool {
        !matches!(self, Self::Download)
    }
}

/// A single cell's typed sort value. Absent cells compare strictly less
/// than any present cell, independent of sort direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    OptionalText(Option<&'a str>),
    Instant(Option<OffsetDateTime>),
    Action,
}

impl CellValue<'_> {
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::OptionalText(value) => value.is_none_or(str::is_empty),
            Self::Instant(value) => value.is_none(),
            Self::Action => true,
        }
    }

    /// Compares two present values of the same column; callers resolve
    /// absence first via [`CellValue::is_absent`].
    pub fn cmp_present(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::OptionalText(left), Self::OptionalText(right)) => left.cmp(right),
            (Self::Instant(left), Self::Instant(right)) => left.cmp(right),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Per-column sort state with the three-step toggle cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSortState {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl ColumnSortState {
    /// Pure toggle transition: Unsorted -> Ascending -> Descending -> Unsorted.
    pub const fn next(self) -> Self {
        match self {
            Self::Unsorted => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Unsorted,
        }
    }

    pub const fn direction(self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::Ascending => Some(SortDirection::Asc),
            Self::Descending => Some(SortDirection::Desc),
        }
    }
}

/// Engine timestamps arrive either as RFC 3339 or in the engine's own
/// `2024-05-02T09:30:00.000+0000` shape (no colon in the offset).
pub mod engine_time {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;

    pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
        if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
            return Ok(parsed);
        }
        let engine_format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
        );
        OffsetDateTime::parse(value, engine_format)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) => parse(&value).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            None => serializer.serialize_none(),
            Some(instant) => {
                let formatted = instant.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
        }
    }
}
