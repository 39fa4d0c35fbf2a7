//! Facet filtering
//!
//! Every dimension with a concrete selection must match (exact equality,
//! or membership when the record holds several values); dimensions combine
//! with AND. An `All` dimension is ignored.

use plancal_core::{compare_labels, Facet, FilterSelection, Record};

/// Whether a record passes every active dimension of `selection`
pub fn matches(record: &Record, selection: &FilterSelection) -> bool {
    selection
        .active()
        .all(|(facet, sel)| sel.matches_any(record.facet_values(facet)))
}

/// Records passing `selection`, in their original order
pub fn filter_records<'a>(records: &'a [Record], selection: &FilterSelection) -> Vec<&'a Record> {
    if selection.is_unfiltered() {
        return records.iter().collect();
    }
    records.iter().filter(|r| matches(r, selection)).collect()
}

/// Distinct values a dimension takes across `records`, in label order
pub fn known_values(records: &[Record], facet: Facet) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .flat_map(|r| r.facet_values(facet))
        .map(String::from)
        .collect();
    values.sort_by(|a, b| compare_labels(a, b));
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use plancal_core::Selection;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new("1", "Email Nurture", "marketing", date(1), date(5))
                .channel("CRM")
                .sub_channel("Email")
                .category("retention"),
            Record::new("2", "Paid Social", "marketing", date(2), date(9)).channel("Paid Social"),
            Record::new("3", "Win-back Push", "sales", date(3), date(3))
                .channel("CRM")
                .sub_channel("Push")
                .category("retention")
                .category("reactivation"),
            Record::new("4", "Press Release", "pr", date(4), date(4)),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn all_returns_everything_unchanged() {
        let records = sample();
        let out = filter_records(&records, &FilterSelection::all());
        assert_eq!(ids(&out), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn channel_equality() {
        let records = sample();
        let selection = FilterSelection::all().with(Facet::Channel, Selection::only("CRM"));
        let out = filter_records(&records, &selection);

        assert_eq!(ids(&out), vec!["1", "3"]);
        assert!(out.iter().all(|r| r.first_value(Facet::Channel) == Some("CRM")));
    }

    #[test]
    fn category_membership() {
        let records = sample();
        let selection = FilterSelection::all().with(Facet::Category, Selection::only("reactivation"));
        assert_eq!(ids(&filter_records(&records, &selection)), vec!["3"]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let records = sample();
        let selection = FilterSelection::all()
            .with(Facet::Channel, Selection::only("CRM"))
            .with(Facet::Group, Selection::only("marketing"));
        assert_eq!(ids(&filter_records(&records, &selection)), vec!["1"]);
    }

    #[test]
    fn multi_value_selection_is_or_within_dimension() {
        let records = sample();
        let selection = FilterSelection::all().with(Facet::SubChannel, Selection::parse("Email,Push"));
        assert_eq!(ids(&filter_records(&records, &selection)), vec!["1", "3"]);
    }

    #[test]
    fn records_without_facet_never_match_concrete_selection() {
        let records = sample();
        let selection = FilterSelection::all().with(Facet::Channel, Selection::only("PR"));
        assert!(filter_records(&records, &selection).is_empty());
    }

    #[test]
    fn known_values_are_sorted_and_distinct() {
        let records = sample();
        assert_eq!(known_values(&records, Facet::Channel), vec!["CRM", "Paid Social"]);
        assert_eq!(known_values(&records, Facet::Group), vec!["marketing", "pr", "sales"]);
    }
}
