//! Institutional evaluation coaching: guidance and last year's feedback
//! per evaluation item, grouped by category.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

use super::load_or_report;
use crate::models::EvaluationItem;
use crate::store::DataStore;

/// Category used for items with a blank category.
pub const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationStats {
    pub total: usize,
    pub categories: usize,
    pub with_feedback: usize,
    /// Item count per category, sorted by category.
    pub per_category: Vec<(String, usize)>,
}

fn category_of(item: &EvaluationItem) -> &str {
    let c = item.category.trim();
    if c.is_empty() {
        UNCATEGORIZED
    } else {
        c
    }
}

/// Items grouped by category. Categories iterate in sorted order; items
/// keep table order.
pub fn group_by_category(items: &[EvaluationItem]) -> BTreeMap<&str, Vec<&EvaluationItem>> {
    let mut groups: BTreeMap<&str, Vec<&EvaluationItem>> = BTreeMap::new();
    for item in items {
        groups.entry(category_of(item)).or_default().push(item);
    }
    groups
}

pub fn has_feedback(item: &EvaluationItem) -> bool {
    item.prev_feedback
        .as_deref()
        .is_some_and(|f| !f.trim().is_empty())
}

pub fn stats(items: &[EvaluationItem]) -> EvaluationStats {
    let groups = group_by_category(items);
    EvaluationStats {
        total: items.len(),
        categories: groups.len(),
        with_feedback: items.iter().filter(|i| has_feedback(i)).count(),
        per_category: groups
            .iter()
            .map(|(c, items)| (c.to_string(), items.len()))
            .collect(),
    }
}

fn print_item(item: &EvaluationItem) {
    println!("  * {}", item.criteria);
    println!("    Guide:         {}", item.guide);
    match item.prev_feedback.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(feedback) => println!("    Prev feedback: {feedback}"),
        None => println!("    Prev feedback: (none)"),
    }
}

/// Print all items, or only `category`, followed by statistics.
pub fn run_evaluation(store: &DataStore, category: Option<&str>) -> Result<()> {
    let Some(items) = load_or_report::<Vec<EvaluationItem>>(store) else {
        return Ok(());
    };
    let groups = group_by_category(&items);

    match category.map(str::trim) {
        Some(wanted) => {
            let Some(group) = groups.get(wanted) else {
                let known: Vec<&str> = groups.keys().copied().collect();
                bail!(
                    "unknown category '{wanted}'; available: {}",
                    known.join(", ")
                );
            };
            println!("{wanted}");
            println!();
            for item in group {
                print_item(item);
            }
        }
        None => {
            for (name, group) in &groups {
                println!("{name}");
                for item in group {
                    print_item(item);
                }
                println!();
            }
        }
    }

    let s = stats(&items);
    println!();
    println!("Statistics");
    println!("  Items:            {}", s.total);
    println!("  Categories:       {}", s.categories);
    println!("  With feedback:    {}/{}", s.with_feedback, s.total);
    for (name, count) in &s.per_category {
        println!("  - {name}: {count} item(s)");
    }
    Ok(())
}
