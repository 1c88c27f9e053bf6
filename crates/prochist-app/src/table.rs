// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnKey, ColumnSortState, DisplayRow, InstanceRecord, SortDirection, sort_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSort {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

/// Outcome of a sort toggle, rendered on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStatus {
    Asc(&'static str),
    Desc(&'static str),
    Cleared,
    Unsortable,
}

impl SortStatus {
    pub fn message(self) -> String {
        match self {
            Self::Asc(column) => format!("sort {column} asc"),
            Self::Desc(column) => format!("sort {column} desc"),
            Self::Cleared => "sort cleared".to_owned(),
            Self::Unsortable => "column not sortable".to_owned(),
        }
    }
}

/// The table assembly: owns the derived-row cache and the
/// single-active-column sort state. Records are replaced wholesale and
/// projected to rows once per reload.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    rows: Vec<DisplayRow>,
    sort: Option<ActiveSort>,
}

impl HistoryTable {
    pub fn new(records: Vec<InstanceRecord>) -> Self {
        let mut table = Self::default();
        table.replace_records(records);
        table
    }

    /// Swaps in a fresh record sequence and rebuilds the derived rows.
    /// The active sort survives a reload.
    pub fn replace_records(&mut self, records: Vec<InstanceRecord>) {
        self.rows = records.iter().map(DisplayRow::from_record).collect();
    }

    pub fn active_sort(&self) -> Option<ActiveSort> {
        self.sort
    }

    /// Sort state of one column. At most one column is ever non-Unsorted.
    pub fn column_state(&self, column: ColumnKey) -> ColumnSortState {
        match self.sort {
            Some(active) if active.column == column => match active.direction {
                SortDirection::Asc => ColumnSortState::Ascending,
                SortDirection::Desc => ColumnSortState::Descending,
            },
            _ => ColumnSortState::Unsorted,
        }
    }

    /// Cycles the clicked column through Unsorted -> Ascending -> Descending
    /// -> Unsorted and resets every other column.
    pub fn toggle_sort(&mut self, column: ColumnKey) -> SortStatus {
        if !column.is_sortable() {
            return SortStatus::Unsortable;
        }

        let next = self.column_state(column).next();
        self.sort = next
            .direction()
            .map(|direction| ActiveSort { column, direction });

        match next.direction() {
            Some(SortDirection::Asc) => SortStatus::Asc(column.label()),
            Some(SortDirection::Desc) => SortStatus::Desc(column.label()),
            None => SortStatus::Cleared,
        }
    }

    pub fn clear_sort(&mut self) -> SortStatus {
        self.sort = None;
        SortStatus::Cleared
    }

    /// Rows in display order. Unsorted reproduces the input sequence
    /// exactly; sorted orders are always computed from that original
    /// sequence, never from a previously sorted one.
    pub fn visible_rows(&self) -> Vec<DisplayRow> {
        match self.sort {
            Some(active) => sort_rows(&self.rows, active.column, active.direction),
            None => self.rows.clone(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
