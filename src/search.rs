//! Keyword search over the record tables.
//!
//! Each entity type has a fixed set of weighted fields. A record's score is
//! the sum of the weights of every field that contains the keyword
//! (case-insensitive substring); list fields add their weight once per
//! matching item. Records scoring zero are dropped, the rest are ranked by
//! score with ties kept in input order.
//!
//! | Entity | Field weights |
//! |--------|---------------|
//! | [`WeeklyReport`] | department 10, each issue 8, summary 5 |
//! | [`StaffProfile`] | dept 10, each expertise 8, each interest 5, name 3 |
//! | [`BusinessCard`] | org 10, name 8, history 6, position 5 |
//!
//! A blank keyword (empty or whitespace) matches everything: the input is
//! returned unchanged, in order, with score 0.

use crate::models::{BusinessCard, StaffProfile, WeeklyReport};

/// A record that can be scored against a lowercased keyword.
pub trait Searchable {
    fn score(&self, needle: &str) -> u32;
}

fn hit(field: &str, needle: &str, weight: u32) -> u32 {
    if field.to_lowercase().contains(needle) {
        weight
    } else {
        0
    }
}

fn hits(items: &[String], needle: &str, weight: u32) -> u32 {
    items.iter().map(|item| hit(item, needle, weight)).sum()
}

fn hit_opt(field: Option<&str>, needle: &str, weight: u32) -> u32 {
    field.map_or(0, |f| hit(f, needle, weight))
}

impl Searchable for WeeklyReport {
    fn score(&self, needle: &str) -> u32 {
        hit(&self.department, needle, 10)
            + hits(&self.issues, needle, 8)
            + hit(&self.summary, needle, 5)
    }
}

impl Searchable for StaffProfile {
    fn score(&self, needle: &str) -> u32 {
        hit(&self.dept, needle, 10)
            + hits(&self.expertise, needle, 8)
            + hits(&self.interests, needle, 5)
            + hit(&self.name, needle, 3)
    }
}

impl Searchable for BusinessCard {
    fn score(&self, needle: &str) -> u32 {
        hit(&self.org, needle, 10)
            + hit(&self.name, needle, 8)
            + hit_opt(self.history.as_deref(), needle, 6)
            + hit(&self.position, needle, 5)
    }
}

/// Rank `records` against `keyword`, keeping scores.
pub fn rank<'a, T: Searchable>(keyword: &str, records: &'a [T]) -> Vec<(&'a T, u32)> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().map(|r| (r, 0)).collect();
    }

    let mut scored: Vec<(&T, u32)> = records
        .iter()
        .map(|r| (r, r.score(&needle)))
        .filter(|(_, score)| *score > 0)
        .collect();
    // sort_by is stable, so equal scores keep input order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

fn records_only<T>(ranked: Vec<(&T, u32)>) -> Vec<&T> {
    ranked.into_iter().map(|(r, _)| r).collect()
}

pub fn search_reports<'a>(keyword: &str, reports: &'a [WeeklyReport]) -> Vec<&'a WeeklyReport> {
    records_only(rank(keyword, reports))
}

pub fn search_reports_scored<'a>(
    keyword: &str,
    reports: &'a [WeeklyReport],
) -> Vec<(&'a WeeklyReport, u32)> {
    rank(keyword, reports)
}

pub fn search_staff<'a>(keyword: &str, staff: &'a [StaffProfile]) -> Vec<&'a StaffProfile> {
    records_only(rank(keyword, staff))
}

pub fn search_staff_scored<'a>(
    keyword: &str,
    staff: &'a [StaffProfile],
) -> Vec<(&'a StaffProfile, u32)> {
    rank(keyword, staff)
}

pub fn search_cards<'a>(keyword: &str, cards: &'a [BusinessCard]) -> Vec<&'a BusinessCard> {
    records_only(rank(keyword, cards))
}

pub fn search_cards_scored<'a>(
    keyword: &str,
    cards: &'a [BusinessCard],
) -> Vec<(&'a BusinessCard, u32)> {
    rank(keyword, cards)
}
