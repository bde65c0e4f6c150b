//! Dashboard: KPI summary, students by region, and MOU partners.

use anyhow::Result;

use super::{load_or_report, with_thousands, HasRecords};
use crate::models::{DashboardData, RegionCount};
use crate::store::DataStore;

impl HasRecords for DashboardData {
    fn has_records(&self) -> bool {
        true
    }
}

/// One region row with its share of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShare<'a> {
    pub region: &'a str,
    pub count: u64,
    pub percent: f64,
}

/// Sum of students across all regions.
pub fn region_total(regions: &[RegionCount]) -> u64 {
    regions.iter().map(|r| r.count).sum()
}

/// Each region's share of the total, in input order.
pub fn region_shares(regions: &[RegionCount]) -> Vec<RegionShare<'_>> {
    let total = region_total(regions);
    regions
        .iter()
        .map(|r| RegionShare {
            region: &r.region,
            count: r.count,
            percent: if total > 0 {
                r.count as f64 * 100.0 / total as f64
            } else {
                0.0
            },
        })
        .collect()
}

pub fn run_dashboard(store: &DataStore) -> Result<()> {
    let Some(data) = load_or_report::<DashboardData>(store) else {
        return Ok(());
    };

    println!("Dashboard");
    println!("=========");
    println!();
    println!("  Students:         {}", with_thousands(data.kpi.total_students));
    println!("  Partners:         {}", with_thousands(data.kpi.partners));
    println!("  Employment rate:  {:.1}%", data.kpi.employment_rate);

    println!();
    println!("  Students by region:");
    if data.students_by_region.is_empty() {
        println!("  (none)");
    } else {
        println!("  {:<20} {:>8} {:>7}", "REGION", "COUNT", "SHARE");
        println!("  {}", "-".repeat(37));
        for share in region_shares(&data.students_by_region) {
            println!(
                "  {:<20} {:>8} {:>6.1}%",
                share.region,
                with_thousands(share.count),
                share.percent
            );
        }
        println!(
            "  {:<20} {:>8}",
            "Total",
            with_thousands(region_total(&data.students_by_region))
        );
    }

    println!();
    println!("  MOU partners:");
    if data.mou_partners.is_empty() {
        println!("  (none)");
    } else {
        println!("  {:<32} {:<16} {:>4}", "NAME", "COUNTRY", "YEAR");
        println!("  {}", "-".repeat(54));
        for partner in &data.mou_partners {
            println!(
                "  {:<32} {:<16} {:>4}",
                partner.name, partner.country, partner.year
            );
        }
    }
    println!();
    Ok(())
}
