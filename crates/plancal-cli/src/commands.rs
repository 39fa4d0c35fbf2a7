//! Command execution
//!
//! A [`Session`] opens the data file through the controller, applies the
//! command as intents and renders the result to a string.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use plancal_core::dates::{format_iso, last_of_month};
use plancal_core::{Facet, Record, RecordFields, Renderer, ViewWindow};
use plancal_engine::{
    records_on, upcoming, Controller, Intent, LayoutOptions, MonthCursor, MonthGridOptions, PersistenceWarning,
};
use plancal_render::{render_day, render_upcoming, JsonRenderer, MonthTextRenderer, TextTimelineRenderer};
use plancal_storage::{seed_records, JsonFileStorage};

use crate::config::Config;
use crate::{Commands, OutputFormat, RecordArgs, ViewArgs};

pub struct Session {
    config: Config,
    controller: Controller<JsonFileStorage>,
    today: NaiveDate,
}

impl Session {
    pub fn open(config: Config, data_file: PathBuf, today: NaiveDate) -> Result<Self> {
        let storage = JsonFileStorage::new(data_file);
        let options = LayoutOptions::new()
            .group_by(config.group_by)
            .palette(config.palette().context("Invalid palette in config")?);
        let window = ViewWindow::month_of(today, config.default_unit);

        let colors = match storage.load_colors() {
            Ok(colors) => colors.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable color history");
                Default::default()
            }
        };

        let controller = Controller::open(storage, seed_records(today), window, options).with_colors(colors);
        if let Some(warning) = controller.open_warning() {
            report(warning);
        }

        Ok(Self {
            config,
            controller,
            today,
        })
    }

    pub fn run(&mut self, command: Commands) -> Result<String> {
        match command {
            Commands::List { view } => {
                self.apply_view(view)?;
                Ok(self.list())
            }
            Commands::Add { fields } => {
                let fields = new_fields(fields)?;
                let id = self.dispatch(Intent::CreateRecord(fields))?;
                Ok(format!("Created {}\n", id.unwrap_or_default()))
            }
            Commands::Edit { id, fields } => {
                let current = self
                    .controller
                    .state()
                    .records
                    .find(&id)
                    .with_context(|| format!("Record not found: {}", id))?;
                let fields = merge_fields(RecordFields::from_record(current), fields);
                self.dispatch(Intent::UpdateRecord { id: id.clone(), fields })?;
                Ok(format!("Updated {}\n", id))
            }
            Commands::Delete { id } => {
                self.dispatch(Intent::DeleteRecord(id.clone()))?;
                Ok(format!("Deleted {}\n", id))
            }
            Commands::Layout {
                start,
                end,
                unit,
                view,
                format,
                color,
            } => {
                let start = start.unwrap_or(self.controller.state().window.start);
                let end = end.unwrap_or_else(|| last_of_month(start));
                if let Some(unit) = unit {
                    self.dispatch(Intent::SetGranularity(unit))?;
                }
                self.dispatch(Intent::SetWindow { start, end })?;
                self.apply_view(view)?;

                let layout = self.controller.layout();
                self.save_colors();
                let output = match format {
                    OutputFormat::Text => TextTimelineRenderer::new()
                        .with_records(self.controller.records())
                        .ansi(color)
                        .render(&layout)?,
                    OutputFormat::Json => JsonRenderer::new().render(&layout)?,
                };
                Ok(output)
            }
            Commands::Month { month, view } => {
                self.apply_view(view)?;
                let cursor = month.unwrap_or_else(|| MonthCursor::containing(self.today));
                let options = MonthGridOptions::default()
                    .week_start(self.config.week_start.weekday())
                    .max_chips(self.config.max_chips)
                    .today(self.today);
                let grid = self.controller.month_grid(cursor, &options);
                Ok(MonthTextRenderer::new()
                    .with_records(self.controller.records())
                    .render(&grid)?)
            }
            Commands::Upcoming { limit } => {
                let limit = limit.unwrap_or(self.config.upcoming_limit);
                Ok(render_upcoming(&upcoming(self.controller.records(), self.today, limit)))
            }
            Commands::Day { date } => Ok(render_day(date, &records_on(self.controller.records(), date))),
            Commands::Reset => {
                self.dispatch(Intent::ResetStore(seed_records(self.today)))?;
                Ok(format!("Reset to {} sample records\n", self.controller.records().len()))
            }
        }
    }

    /// Commit an intent, surfacing storage warnings on stderr
    fn dispatch(&mut self, intent: Intent) -> Result<Option<String>> {
        let out = self.controller.dispatch(intent)?;
        if let Some(warning) = &out.warning {
            report(warning);
        }
        Ok(out.affected)
    }

    fn apply_view(&mut self, view: ViewArgs) -> Result<()> {
        if let Some(group_by) = view.group_by {
            self.dispatch(Intent::SetGroupBy(group_by))?;
        }
        for (facet, selection) in view.filters {
            self.dispatch(Intent::SetFilter { facet, selection })?;
        }
        Ok(())
    }

    fn save_colors(&self) {
        if self.controller.is_in_memory() {
            return;
        }
        if let Err(e) = self.controller.storage().save_colors(self.controller.colors()) {
            warn!(error = %e, "could not save color history");
        }
    }

    /// Records passing the active filters, one per line
    fn list(&self) -> String {
        let state = self.controller.state();
        let records: Vec<&Record> = plancal_engine::filter_records(state.records.records(), &state.selection);
        if records.is_empty() {
            return "No records\n".into();
        }
        let id_width = records.iter().map(|r| r.id.chars().count()).max().unwrap_or(0);
        let group_width = records.iter().map(|r| r.group.chars().count()).max().unwrap_or(0);
        records
            .iter()
            .map(|r| {
                let channel = r
                    .first_value(Facet::Channel)
                    .map(|c| format!(" [{}]", c))
                    .unwrap_or_default();
                format!(
                    "{:<iw$}  {}  {}  {:<gw$}  {}{}\n",
                    r.id,
                    format_iso(r.start),
                    format_iso(r.end),
                    r.group,
                    r.title,
                    channel,
                    iw = id_width,
                    gw = group_width
                )
            })
            .collect()
    }
}

fn report(warning: &PersistenceWarning) {
    eprintln!("warning: {}", warning);
}

/// Fields for a new record; title, group and start are required
fn new_fields(args: RecordArgs) -> Result<RecordFields> {
    let Some(title) = args.title.clone() else {
        bail!("--title is required");
    };
    let Some(group) = args.group.clone() else {
        bail!("--group is required");
    };
    Ok(merge_fields(RecordFields::new(title, group), args))
}

/// Overlay the flags that were given onto existing fields
fn merge_fields(mut fields: RecordFields, args: RecordArgs) -> RecordFields {
    if let Some(title) = args.title {
        fields.title = title;
    }
    if let Some(group) = args.group {
        fields.group = group;
    }
    if let Some(start) = args.start {
        fields.start = Some(start);
        // A new start without a new end keeps single-day records single-day
        if args.end.is_none() && fields.end.is_some_and(|end| end < start) {
            fields.end = Some(start);
        }
    }
    if let Some(end) = args.end {
        fields.end = Some(end);
    }
    if let Some(channel) = args.channel {
        fields.facets.insert(Facet::Channel, vec![channel]);
    }
    if let Some(sub_channel) = args.sub_channel {
        fields.facets.insert(Facet::SubChannel, vec![sub_channel]);
    }
    if !args.categories.is_empty() {
        fields.facets.insert(Facet::Category, args.categories);
    }
    if let Some(owner) = args.owner {
        fields.owner = Some(owner);
    }
    if let Some(notes) = args.notes {
        fields.notes = Some(notes);
    }
    if let Some(message) = args.promo {
        fields = fields.promo(Some(message));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let record = Record::new("x", "Press Release", "pr", date(14), date(14))
            .channel("PR")
            .owner("PR Agency");
        let args = RecordArgs {
            title: Some("Press Release v2".into()),
            start: Some(date(16)),
            ..Default::default()
        };
        let fields = merge_fields(RecordFields::from_record(&record), args);

        assert_eq!(fields.title, "Press Release v2");
        assert_eq!(fields.group, "pr");
        assert_eq!(fields.start, Some(date(16)));
        assert_eq!(fields.end, Some(date(16)));
        assert_eq!(fields.owner.as_deref(), Some("PR Agency"));
        assert_eq!(fields.facets.get(&Facet::Channel), Some(&vec!["PR".to_string()]));
    }

    #[test]
    fn new_fields_require_title_and_group() {
        assert!(new_fields(RecordArgs::default()).is_err());
        let args = RecordArgs {
            title: Some("Webinar".into()),
            group: Some("partnership".into()),
            start: Some(date(18)),
            promo: Some(String::new()),
            ..Default::default()
        };
        let record = new_fields(args).unwrap().into_record("id".into()).unwrap();
        assert_eq!(record.end, date(18));
        assert!(record.promo.is_some());
        assert_eq!(record.promo.unwrap().message, None);
    }
}
