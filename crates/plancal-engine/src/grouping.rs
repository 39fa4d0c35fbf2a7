//! Row grouping
//!
//! Records sharing a grouping key form one display row. Rows are ordered by
//! key label, entries within a row by title, and equal titles keep their
//! insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use plancal_core::{compare_labels, Facet, Record, ValidationError};

/// Separator used when a grouping key is composed of several attributes
pub const KEY_SEPARATOR: &str = " / ";

/// Which attributes make up a row's grouping key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Theme / category only
    #[default]
    Group,
    /// Theme, then channel
    GroupChannel,
    /// Theme, channel, then sub-channel
    GroupChannelSubChannel,
}

impl FromStr for GroupBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" | "theme" => Ok(GroupBy::Group),
            "group_channel" | "channel" => Ok(GroupBy::GroupChannel),
            "group_channel_sub_channel" | "sub_channel" => Ok(GroupBy::GroupChannelSubChannel),
            other => Err(ValidationError::UnknownGroupBy(other.to_string())),
        }
    }
}

/// Grouping key of a record; missing channel parts are left out
pub fn group_key(record: &Record, group_by: GroupBy) -> String {
    let mut parts = vec![record.group.as_str()];
    let extra: &[Facet] = match group_by {
        GroupBy::Group => &[],
        GroupBy::GroupChannel => &[Facet::Channel],
        GroupBy::GroupChannelSubChannel => &[Facet::Channel, Facet::SubChannel],
    };
    for facet in extra {
        if let Some(value) = record.first_value(*facet) {
            parts.push(value);
        }
    }
    parts.join(KEY_SEPARATOR)
}

/// One row's worth of records
#[derive(Clone, Debug)]
pub struct Group<'a> {
    pub key: String,
    /// Entries in display order
    pub entries: Vec<&'a Record>,
}

/// Partition records into rows and order them deterministically
pub fn group_records<'a>(records: &[&'a Record], group_by: GroupBy) -> Vec<Group<'a>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group<'a>> = Vec::new();

    for &record in records {
        let key = group_key(record, group_by);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entries.push(record);
    }

    // Both sorts are stable, so insertion order breaks remaining ties
    for group in &mut groups {
        group.entries.sort_by(|a, b| compare_labels(&a.title, &b.title));
    }
    groups.sort_by(|a, b| compare_labels(&a.key, &b.key));
    groups
}

/// The entry whose detail a cell shows: earliest start, then smallest id
pub fn representative<'a>(active: &[&'a Record]) -> Option<&'a Record> {
    active
        .iter()
        .copied()
        .min_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn rec(id: &str, title: &str, group: &str, start: u32) -> Record {
        Record::new(id, title, group, date(start), date(start + 1))
    }

    #[test]
    fn groups_sorted_by_label_then_title() {
        let records = vec![
            rec("1", "Zeta", "sales", 1),
            rec("2", "Alpha", "Launch", 2),
            rec("3", "Beta", "sales", 3),
            rec("4", "Gamma", "content", 4),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = group_records(&refs, GroupBy::Group);

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["content", "Launch", "sales"]);

        let sales: Vec<&str> = groups[2].entries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(sales, vec!["3", "1"]);
    }

    #[test]
    fn equal_titles_keep_insertion_order() {
        let records = vec![
            rec("b", "Same", "g", 5),
            rec("a", "Same", "g", 1),
            rec("c", "Same", "g", 3),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = group_records(&refs, GroupBy::Group);
        let order: Vec<&str> = groups[0].entries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn grouping_is_reproducible() {
        let records = vec![
            rec("1", "One", "x", 1),
            rec("2", "Two", "y", 2),
            rec("3", "Three", "x", 3),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let first: Vec<(String, Vec<String>)> = group_records(&refs, GroupBy::Group)
            .into_iter()
            .map(|g| (g.key, g.entries.iter().map(|r| r.id.clone()).collect()))
            .collect();
        let second: Vec<(String, Vec<String>)> = group_records(&refs, GroupBy::Group)
            .into_iter()
            .map(|g| (g.key, g.entries.iter().map(|r| r.id.clone()).collect()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn composed_keys_split_rows() {
        let crm = rec("1", "Nurture", "marketing", 1).channel("CRM").sub_channel("Email");
        let social = rec("2", "Social", "marketing", 2).channel("Paid Social");
        let bare = rec("3", "Bare", "marketing", 3);

        assert_eq!(group_key(&crm, GroupBy::Group), "marketing");
        assert_eq!(group_key(&crm, GroupBy::GroupChannel), "marketing / CRM");
        assert_eq!(group_key(&crm, GroupBy::GroupChannelSubChannel), "marketing / CRM / Email");
        assert_eq!(group_key(&social, GroupBy::GroupChannelSubChannel), "marketing / Paid Social");
        assert_eq!(group_key(&bare, GroupBy::GroupChannel), "marketing");

        let records = vec![crm, social, bare];
        let refs: Vec<&Record> = records.iter().collect();
        assert_eq!(group_records(&refs, GroupBy::GroupChannel).len(), 3);
        assert_eq!(group_records(&refs, GroupBy::Group).len(), 1);
    }

    #[test]
    fn representative_prefers_earliest_start_then_id() {
        let a = rec("b-late", "A", "g", 5);
        let b = rec("z-early", "B", "g", 2);
        let c = rec("a-early", "C", "g", 2);
        assert_eq!(representative(&[&a, &b, &c]).unwrap().id, "a-early");
        assert!(representative(&[]).is_none());
    }

    #[test]
    fn group_by_parse() {
        assert_eq!("channel".parse::<GroupBy>().unwrap(), GroupBy::GroupChannel);
        assert_eq!("theme".parse::<GroupBy>().unwrap(), GroupBy::Group);
        assert!("owner".parse::<GroupBy>().is_err());
    }
}
