//! Staff directory: expertise search and department listings.

use anyhow::Result;
use std::collections::BTreeSet;

use super::{join_or_dash, load_or_report};
use crate::models::StaffProfile;
use crate::search::search_staff_scored;
use crate::store::DataStore;

/// Distinct non-empty departments, sorted.
pub fn departments(profiles: &[StaffProfile]) -> Vec<&str> {
    let depts: BTreeSet<&str> = profiles
        .iter()
        .map(|p| p.dept.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    depts.into_iter().collect()
}

/// Members of exactly `dept`, in table order.
pub fn members<'a>(profiles: &'a [StaffProfile], dept: &str) -> Vec<&'a StaffProfile> {
    profiles.iter().filter(|p| p.dept == dept).collect()
}

fn print_profile(profile: &StaffProfile) {
    println!("  {} ({})", profile.name, profile.dept);
    println!("    Expertise: {}", join_or_dash(&profile.expertise));
    println!("    Interests: {}", join_or_dash(&profile.interests));
    if let Some(email) = &profile.email {
        println!("    Email:     {email}");
    }
}

pub fn run_search(store: &DataStore, keyword: Option<&str>) -> Result<()> {
    let Some(profiles) = load_or_report::<Vec<StaffProfile>>(store) else {
        return Ok(());
    };
    let keyword = keyword.map(str::trim).unwrap_or("");
    let results = search_staff_scored(keyword, &profiles);

    if keyword.is_empty() {
        println!("All staff: {}", results.len());
    } else {
        println!("Results for '{keyword}': {}", results.len());
    }
    if results.is_empty() {
        println!("No matching staff.");
        return Ok(());
    }
    for (profile, _) in results {
        println!();
        print_profile(profile);
    }
    Ok(())
}

pub fn run_departments(store: &DataStore) -> Result<()> {
    let Some(profiles) = load_or_report::<Vec<StaffProfile>>(store) else {
        return Ok(());
    };
    println!("{:<24} {:>7}", "DEPARTMENT", "MEMBERS");
    for dept in departments(&profiles) {
        println!("{:<24} {:>7}", dept, members(&profiles, dept).len());
    }
    Ok(())
}

pub fn run_department(store: &DataStore, dept: &str) -> Result<()> {
    let Some(profiles) = load_or_report::<Vec<StaffProfile>>(store) else {
        return Ok(());
    };
    let dept = dept.trim();
    let team = members(&profiles, dept);
    if team.is_empty() {
        println!("No staff in '{dept}'.");
        println!("Departments: {}", departments(&profiles).join(", "));
        return Ok(());
    }
    println!("{dept}: {} member(s)", team.len());
    for profile in team {
        println!();
        print_profile(profile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, dept: &str) -> StaffProfile {
        StaffProfile {
            name: name.into(),
            dept: dept.into(),
            expertise: vec![],
            interests: vec![],
            email: None,
        }
    }

    #[test]
    fn test_departments_sorted_distinct() {
        let profiles = vec![
            profile("a", "기획팀"),
            profile("b", "교학팀"),
            profile("c", "기획팀"),
            profile("d", ""),
        ];
        assert_eq!(departments(&profiles), vec!["교학팀", "기획팀"]);
    }

    #[test]
    fn test_members_exact_match_in_order() {
        let profiles = vec![
            profile("a", "기획팀"),
            profile("b", "교학팀"),
            profile("c", "기획팀"),
            profile("d", "기획팀2"),
        ];
        let names: Vec<&str> = members(&profiles, "기획팀")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
