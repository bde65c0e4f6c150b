//! Page views.
//!
//! Each page pairs pure view logic (grouping, ranking, summaries) with a
//! `run_*` entry point used by the `desk` CLI. The entry points load their
//! document through [`DataStore`](crate::store::DataStore) and print
//! [`NO_DATA`] when it is absent.
//!
//! | Page | Document |
//! |------|----------|
//! | [`dashboard`] | `dashboard_data` |
//! | [`chat`] | `weekly_reports` |
//! | [`schedule`] | `schedules` |
//! | [`staff`] | `staff_profiles` |
//! | [`evaluation`] | `evaluation_manual` |
//! | [`cards`] | `business_cards` |
//! | [`admin`] | any |

pub mod admin;
pub mod cards;
pub mod chat;
pub mod dashboard;
pub mod evaluation;
pub mod schedule;
pub mod staff;

use crate::models::Table;
use crate::store::DataStore;

/// Printed when a page's document cannot be loaded.
pub const NO_DATA: &str = "No data available.";

/// Load a page's table, printing [`NO_DATA`] when it is absent or empty.
pub(crate) fn load_or_report<T: Table + HasRecords>(store: &DataStore) -> Option<T> {
    match store.load_table::<T>() {
        Some(table) if table.has_records() => Some(table),
        _ => {
            println!("{NO_DATA}");
            None
        }
    }
}

/// Whether a loaded table has anything to show.
pub(crate) trait HasRecords {
    fn has_records(&self) -> bool;
}

impl<T> HasRecords for Vec<T> {
    fn has_records(&self) -> bool {
        !self.is_empty()
    }
}

/// Join list items for display, or `-` when empty.
pub(crate) fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Format an integer with thousands separators.
pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_join_or_dash() {
        assert_eq!(join_or_dash(&[]), "-");
        assert_eq!(join_or_dash(&["a".into(), "b".into()]), "a, b");
    }
}
