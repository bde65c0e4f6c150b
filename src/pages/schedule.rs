//! Schedules and common free time.
//!
//! The working day is a fixed hourly grid from 9:00 to 17:00 inclusive.
//! Free time for a selection of staff on one date is the grid minus the
//! union of everything they have booked that day, in grid order.

use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};

use super::load_or_report;
use crate::models::ScheduleEntry;
use crate::store::DataStore;

pub const FIRST_HOUR: u32 = 9;
pub const LAST_HOUR: u32 = 17;

/// The hourly slots of a working day: `"9:00"` through `"17:00"`.
pub fn time_grid() -> Vec<String> {
    (FIRST_HOUR..=LAST_HOUR).map(|h| format!("{h}:00")).collect()
}

/// Grid slots not present in `busy`, in grid order.
pub fn free_slots<'a>(busy: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let busy: BTreeSet<&str> = busy.into_iter().map(str::trim).collect();
    time_grid()
        .into_iter()
        .filter(|slot| !busy.contains(slot.as_str()))
        .collect()
}

/// Per-date totals for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary<'a> {
    pub date: &'a str,
    pub entries: usize,
    pub busy_slots: usize,
}

/// Read-only queries over the schedules table.
pub struct ScheduleBoard<'a> {
    entries: &'a [ScheduleEntry],
}

fn selected<S: AsRef<str>>(selection: &[S], name: &str) -> bool {
    selection.iter().any(|s| s.as_ref() == name)
}

impl<'a> ScheduleBoard<'a> {
    pub fn new(entries: &'a [ScheduleEntry]) -> Self {
        Self { entries }
    }

    /// Distinct staff names, sorted.
    pub fn staff_names(&self) -> Vec<&'a str> {
        let names: BTreeSet<&str> = self
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        names.into_iter().collect()
    }

    /// Entries belonging to the selected staff, in table order.
    pub fn entries_for<S: AsRef<str>>(&self, selection: &[S]) -> Vec<&'a ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| selected(selection, &e.name))
            .collect()
    }

    /// Distinct dates with entries for the selection, sorted.
    pub fn dates_for<S: AsRef<str>>(&self, selection: &[S]) -> Vec<&'a str> {
        let dates: BTreeSet<&str> = self
            .entries_for(selection)
            .into_iter()
            .map(|e| e.date.as_str())
            .filter(|d| !d.is_empty())
            .collect();
        dates.into_iter().collect()
    }

    /// Entries for the selection on one date.
    pub fn entries_on<S: AsRef<str>>(
        &self,
        selection: &[S],
        date: &str,
    ) -> Vec<&'a ScheduleEntry> {
        self.entries_for(selection)
            .into_iter()
            .filter(|e| e.date == date)
            .collect()
    }

    /// Booked slots per selected staff member on one date.
    pub fn busy_by_staff<S: AsRef<str>>(
        &self,
        selection: &[S],
        date: &str,
    ) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
        let mut busy: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for entry in self.entries_on(selection, date) {
            busy.entry(entry.name.as_str())
                .or_default()
                .extend(entry.time_slots.iter().map(|s| s.trim()));
        }
        busy
    }

    /// Slots on `date` where nobody in the selection is booked.
    pub fn free_time<S: AsRef<str>>(&self, selection: &[S], date: &str) -> Vec<String> {
        let busy = self.busy_by_staff(selection, date);
        free_slots(busy.values().flatten().copied())
    }

    /// Entry and busy-slot counts per date for the selection.
    pub fn summary<S: AsRef<str>>(&self, selection: &[S]) -> Vec<DaySummary<'a>> {
        self.dates_for(selection)
            .into_iter()
            .map(|date| {
                let entries = self.entries_on(selection, date);
                DaySummary {
                    date,
                    entries: entries.len(),
                    busy_slots: entries.iter().map(|e| e.time_slots.len()).sum(),
                }
            })
            .collect()
    }
}

pub fn run_staff(store: &DataStore) -> Result<()> {
    let Some(entries) = load_or_report::<Vec<ScheduleEntry>>(store) else {
        return Ok(());
    };
    let board = ScheduleBoard::new(&entries);
    for name in board.staff_names() {
        println!("{name}");
    }
    Ok(())
}

fn check_selection(board: &ScheduleBoard<'_>, staff: &[String]) -> Result<()> {
    if staff.is_empty() {
        bail!("select at least one staff member with --staff");
    }
    let known = board.staff_names();
    let unknown: Vec<&str> = staff
        .iter()
        .map(String::as_str)
        .filter(|s| !known.contains(s))
        .collect();
    if !unknown.is_empty() {
        bail!(
            "unknown staff: {} (see `desk schedule staff`)",
            unknown.join(", ")
        );
    }
    Ok(())
}

/// Print the schedule and free time for `staff` on `date`.
///
/// Without a date, the first date with entries for the selection is used.
pub fn run_free(store: &DataStore, staff: &[String], date: Option<&str>) -> Result<()> {
    let Some(entries) = load_or_report::<Vec<ScheduleEntry>>(store) else {
        return Ok(());
    };
    let board = ScheduleBoard::new(&entries);
    check_selection(&board, staff)?;

    let dates = board.dates_for(staff);
    let Some(first) = dates.first().copied() else {
        println!("No schedule data for the selected staff.");
        return Ok(());
    };
    let date = date.unwrap_or(first);

    println!("Schedule for {date}");
    println!();
    let day = board.entries_on(staff, date);
    if day.is_empty() {
        println!("  No entries on this date.");
    } else {
        println!("  {:<16} {:<32} EVENT", "STAFF", "BUSY");
        println!("  {}", "-".repeat(64));
        for entry in &day {
            println!(
                "  {:<16} {:<32} {}",
                entry.name,
                entry.time_slots.join(", "),
                entry.event.as_deref().unwrap_or("")
            );
        }
    }
    println!();

    if let [single] = staff {
        if day.is_empty() {
            println!("No schedule data for {single} on {date}.");
            return Ok(());
        }
    }

    let free = board.free_time(staff, date);
    let label = match staff {
        [single] => format!("Free time for {single}"),
        _ => "Common free time".to_string(),
    };
    if free.is_empty() {
        println!("{label}: none, every slot is booked.");
    } else {
        println!("{label} ({} slot(s)): {}", free.len(), free.join(", "));
    }
    Ok(())
}

pub fn run_summary(store: &DataStore, staff: &[String]) -> Result<()> {
    let Some(entries) = load_or_report::<Vec<ScheduleEntry>>(store) else {
        return Ok(());
    };
    let board = ScheduleBoard::new(&entries);
    check_selection(&board, staff)?;

    let summary = board.summary(staff);
    if summary.is_empty() {
        println!("No schedule data for the selected staff.");
        return Ok(());
    }
    println!("  {:<12} {:>8} {:>10}", "DATE", "ENTRIES", "BUSY SLOTS");
    println!("  {}", "-".repeat(32));
    for day in summary {
        println!("  {:<12} {:>8} {:>10}", day.date, day.entries, day.busy_slots);
    }
    Ok(())
}
