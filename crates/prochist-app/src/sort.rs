// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnKey, DisplayRow, SortDirection};
use std::cmp::Ordering;

/// Stable sort of display rows by one column. Pure: identical inputs yield
/// identical output, and rows with equal keys keep their input order.
pub fn sort_rows(
    rows: &[DisplayRow],
    column: ColumnKey,
    direction: SortDirection,
) -> Vec<DisplayRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|left, right| compare_rows(left, right, column, direction));
    sorted
}

/// Absence resolves before direction: an absent cell compares strictly less
/// than any present cell in both directions, so missing data pins to the
/// top of the order instead of flipping ends or scattering.
fn compare_rows(
    left: &DisplayRow,
    right: &DisplayRow,
    column: ColumnKey,
    direction: SortDirection,
) -> Ordering {
    let left_value = left.cell(column);
    let right_value = right.cell(column);

    match (left_value.is_absent(), right_value.is_absent()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match direction {
            SortDirection::Asc => left_value.cmp_present(&right_value),
            SortDirection::Desc => left_value.cmp_present(&right_value).reverse(),
        },
    }
}
