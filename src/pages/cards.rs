//! Business card hub: contact search and per-organization counts.

use anyhow::Result;

use super::load_or_report;
use crate::models::BusinessCard;
use crate::search::search_cards;
use crate::store::DataStore;

/// Card count per organization, most cards first. Ties keep the order in
/// which organizations first appear.
pub fn org_counts(cards: &[BusinessCard]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for card in cards {
        match counts.iter_mut().find(|(org, _)| *org == card.org) {
            Some((_, n)) => *n += 1,
            None => counts.push((card.org.as_str(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn print_card(index: usize, card: &BusinessCard) {
    println!("  {index}. {} - {}", card.name, card.org);
    println!("     Position: {}", card.position);
    match card.contact.as_deref() {
        Some(email) if card.has_email() => println!("     Email:    {email}"),
        Some(contact) => println!("     Contact:  {contact}"),
        None => println!("     Contact:  -"),
    }
    if let Some(history) = &card.history {
        println!("     History:  {history}");
    }
}

pub fn run_search(store: &DataStore, keyword: Option<&str>) -> Result<()> {
    let Some(cards) = load_or_report::<Vec<BusinessCard>>(store) else {
        return Ok(());
    };
    let keyword = keyword.map(str::trim).unwrap_or("");
    let results = search_cards(keyword, &cards);

    if keyword.is_empty() {
        println!("All cards: {}", results.len());
    } else {
        println!("Results for '{keyword}': {}", results.len());
    }
    if results.is_empty() {
        println!("No matching cards.");
        return Ok(());
    }
    for (i, card) in results.iter().enumerate() {
        println!();
        print_card(i + 1, card);
    }
    Ok(())
}

pub fn run_orgs(store: &DataStore) -> Result<()> {
    let Some(cards) = load_or_report::<Vec<BusinessCard>>(store) else {
        return Ok(());
    };
    let counts = org_counts(&cards);
    println!("{:<32} {:>8}", "ORGANIZATION", "CONTACTS");
    for (org, n) in &counts {
        println!("{org:<32} {n:>8}");
    }
    println!();
    println!("Organizations: {}", counts.len());
    println!("Contacts:      {}", cards.len());
    Ok(())
}
