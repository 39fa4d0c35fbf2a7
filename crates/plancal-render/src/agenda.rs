//! Upcoming list and day panel text

use chrono::NaiveDate;
use plancal_core::{Facet, Record};

/// Short date such as "Jun 14"
fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

fn date_span(record: &Record) -> String {
    if record.start == record.end {
        short_date(record.start)
    } else {
        format!("{} - {}", short_date(record.start), short_date(record.end))
    }
}

/// Upcoming records, one per line: date span then title
pub fn render_upcoming(records: &[&Record]) -> String {
    if records.is_empty() {
        return "No upcoming events\n".into();
    }
    let span_width = records.iter().map(|r| date_span(r).chars().count()).max().unwrap_or(0);
    records
        .iter()
        .map(|r| format!("{:<width$}  {}\n", date_span(r), r.title, width = span_width))
        .collect()
}

/// Everything scheduled on one day, with group and owner
pub fn render_day(date: NaiveDate, records: &[&Record]) -> String {
    let mut out = format!("{}\n", date.format("%a, %B %-d, %Y"));
    if records.is_empty() {
        out.push_str("No events scheduled\n");
        return out;
    }
    for record in records {
        let mut meta = vec![record.group.clone()];
        if let Some(channel) = record.first_value(Facet::Channel) {
            meta.push(channel.to_string());
        }
        if let Some(owner) = &record.owner {
            meta.push(owner.clone());
        }
        out.push_str(&format!("  {}\n    {}\n", record.title, meta.join(" · ")));
        if let Some(message) = record.promo.as_ref().and_then(|p| p.message.as_deref()) {
            out.push_str(&format!("    promo: {}\n", message));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    #[test]
    fn upcoming_aligns_titles() {
        let press = Record::new("a", "Press Release", "pr", date(14), date(14));
        let nurture = Record::new("b", "Email Nurture Sequence", "marketing", date(21), date(28));
        assert_eq!(
            render_upcoming(&[&press, &nurture]),
            "Jun 14           Press Release\nJun 21 - Jun 28  Email Nurture Sequence\n"
        );
        assert_eq!(render_upcoming(&[]), "No upcoming events\n");
    }

    #[test]
    fn day_panel_lists_meta() {
        let launch = Record::new("l", "v2.0 Product Launch", "launch", date(21), date(21))
            .owner("Product + Mktg")
            .promo(Some("Launch week offer".into()));
        let nurture = Record::new("n", "Email Nurture Sequence", "marketing", date(21), date(28)).channel("CRM");

        let text = render_day(date(21), &[&launch, &nurture]);
        assert_eq!(
            text,
            "Sun, June 21, 2026\n  v2.0 Product Launch\n    launch · Product + Mktg\n    promo: Launch week offer\n  Email Nurture Sequence\n    marketing · CRM\n"
        );
        assert_eq!(render_day(date(22), &[]), "Mon, June 22, 2026\nNo events scheduled\n");
    }
}
