// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The one place where dates and times are turned into text.

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Format a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a wall-clock time the way reports are talked about: `15h00`.
pub fn format_time(time: NaiveTime) -> String {
    format!("{}h{:02}", time.hour(), time.minute())
}
