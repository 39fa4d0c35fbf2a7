//! Demo go-to-market plan
//!
//! Nine records spread over one month so a fresh calendar is not empty.
//! Ids are fixed, which keeps the seed reproducible across runs.

use chrono::NaiveDate;
use plancal_core::dates::{add_days, first_of_month};
use plancal_core::Record;

/// Seed records placed in the month containing `anchor`
pub fn seed_records(anchor: NaiveDate) -> Vec<Record> {
    let first = first_of_month(anchor);
    let day = |n: i64| add_days(first, n - 1);

    vec![
        Record::new("seed-01", "Q1 Strategy Kickoff", "milestone", day(1), day(1))
            .owner("Leadership")
            .notes("Set priorities and OKRs for the quarter."),
        Record::new("seed-02", "Blog Post: Product Intro", "content", day(5), day(5))
            .channel("Organic")
            .sub_channel("Blog")
            .category("awareness")
            .owner("Content Team")
            .notes("SEO-optimised intro article."),
        Record::new("seed-03", "Paid Social Campaign", "marketing", day(8), day(22))
            .channel("Paid Social")
            .sub_channel("Meta")
            .category("awareness")
            .category("retargeting")
            .owner("Paid Media")
            .notes("Facebook & Instagram retargeting."),
        Record::new("seed-04", "Sales Deck Update", "sales", day(10), day(11))
            .channel("Sales Enablement")
            .owner("Sales Team")
            .notes("Refresh slide deck with new case studies."),
        Record::new("seed-05", "Press Release", "pr", day(14), day(14))
            .channel("PR")
            .owner("PR Agency")
            .notes("Coordinate with TechCrunch."),
        Record::new("seed-06", "Partner Webinar", "partnership", day(18), day(18))
            .channel("Events")
            .sub_channel("Webinar")
            .owner("Partnerships")
            .notes("Co-host with Strategic Partner Inc."),
        Record::new("seed-07", "v2.0 Product Launch", "launch", day(21), day(21))
            .category("launch")
            .owner("Product + Mktg")
            .notes("Full launch across all channels.")
            .promo(Some("Launch week offer".into())),
        Record::new("seed-08", "Email Nurture Sequence", "marketing", day(21), day(28))
            .channel("CRM")
            .sub_channel("Email")
            .category("retention")
            .owner("CRM Team")
            .notes("5-email drip campaign post-launch."),
        Record::new("seed-09", "Monthly Review", "milestone", day(28), day(28))
            .owner("All Leads")
            .notes("Review metrics and adjust plan."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancal_core::{Facet, RecordStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn seed_is_valid_and_deterministic() {
        let anchor = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        let records = seed_records(anchor);

        assert_eq!(records.len(), 9);
        assert_eq!(records, seed_records(anchor));
        assert!(RecordStore::from_records(records.clone()).is_ok());

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids[0], "seed-01");
        assert_eq!(ids[8], "seed-09");
    }

    #[test]
    fn seed_stays_inside_short_months() {
        let anchor = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        for record in seed_records(anchor) {
            assert_eq!(record.start.format("%Y-%m").to_string(), "2026-02");
            assert_eq!(record.end.format("%Y-%m").to_string(), "2026-02");
        }
    }

    #[test]
    fn seed_carries_a_crm_record() {
        let records = seed_records(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        let crm: Vec<&str> = records
            .iter()
            .filter(|r| r.first_value(Facet::Channel) == Some("CRM"))
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(crm, vec!["Email Nurture Sequence"]);
    }
}
