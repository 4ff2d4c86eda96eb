use crate::application::tui::Theme;
use crate::application::{AppResult, Config, Form, PickerApp, PickerSettings};
use crate::entities::{DateValue, PickerError, PopperPosition, ValueKind};
use crate::infrastructure::init_file_logger;
use crate::picker::DatePickerOptions;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datepicker")]
#[command(about = "Pick a day, a range of days or several days in the terminal")]
#[command(version)]
pub struct Cli {
    /// Colour theme: dark, light or minimal
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Config file (defaults to $DATEPICKER_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick a single value and print it as JSON
    Pick(PickArgs),
    /// A form with one field of each kind (the default)
    Form {
        #[arg(long)]
        touch: bool,
    },
}

#[derive(Args, Debug)]
pub struct PickArgs {
    /// single, range or multi
    #[arg(short, long, default_value = "single")]
    pub mode: ValueKind,
    /// Initial value: YYYY-MM-DD, FROM..TO, or a comma separated list
    #[arg(short, long)]
    pub value: Option<String>,
    /// Centered popup over a dimmed screen
    #[arg(long)]
    pub touch: bool,
    /// auto or top
    #[arg(long)]
    pub position: Option<PopperPosition>,
    /// Earliest selectable day (YYYY-MM-DD)
    #[arg(long)]
    pub min: Option<NaiveDate>,
    /// Latest selectable day (YYYY-MM-DD)
    #[arg(long)]
    pub max: Option<NaiveDate>,
    /// Days that cannot be selected, comma separated
    #[arg(long, value_delimiter = ',')]
    pub disabled: Vec<NaiveDate>,
    /// Label shown above the input
    #[arg(short, long, default_value = "Date")]
    pub label: String,
}

impl PickArgs {
    /// The labelled field options: config file defaults, then flags on top.
    pub fn options(
        self,
        settings: &PickerSettings,
    ) -> Result<(String, DatePickerOptions), PickerError> {
        let value = match &self.value {
            Some(text) => DateValue::parse(self.mode, text)?,
            None => DateValue::empty(self.mode),
        };
        let mut options = field_options(&self.label, value, settings);
        if self.touch {
            options = options.touch(true);
        }
        if let Some(position) = self.position {
            options = options.calendar_popper_position(position);
        }
        if let Some(min) = self.min {
            options = options.minimum_date(min);
        }
        if let Some(max) = self.max {
            options = options.maximum_date(max);
        }
        if !self.disabled.is_empty() {
            options = options.disabled_days(self.disabled);
        }
        Ok((self.label, options))
    }
}

/// Options for a form field, with file defaults and logging callbacks
fn field_options(label: &str, value: DateValue, settings: &PickerSettings) -> DatePickerOptions {
    let changed = label.to_string();
    let rejected = label.to_string();
    let options = DatePickerOptions::new(value)
        .input_id(label)
        .on_change(move |value| log::info!("{} changed to {:?}", changed, value))
        .on_disabled_day_error(move |day| log::info!("{}: {} is not selectable", rejected, day));
    settings.apply_to(options)
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let config = Config::load(cli.config.clone()).context("Failed to load config")?;

        // Logging is best effort; the picker works without it
        if let Err(e) = init_file_logger(&config.log_path) {
            eprintln!("Logging disabled: {:#}", e);
        }

        let theme = cli
            .theme
            .as_deref()
            .or(config.settings.theme.as_deref())
            .map(Theme::by_name)
            .unwrap_or_default();

        let fields = match cli.command {
            Some(Commands::Pick(args)) => vec![args.options(&config.settings)?],
            Some(Commands::Form { touch }) => Self::form_fields(&config.settings, touch),
            None => Self::form_fields(&config.settings, false),
        };
        let single_field = matches!(fields.as_slice(), [_]);

        let mut app = PickerApp::new()?;
        let mut form = Form::new(theme, app.viewport()?);
        for (label, options) in fields {
            form.add_field(label, options);
        }

        let result = app.run(&mut form)?;
        drop(app);

        match result {
            AppResult::Submitted(values) if single_field => {
                if let Some((_, value)) = values.into_iter().next() {
                    println!("{}", serde_json::to_string(&value)?);
                }
            }
            AppResult::Submitted(values) => {
                let values: BTreeMap<String, DateValue> = values.into_iter().collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            }
            AppResult::Cancelled => {}
        }

        Ok(())
    }

    fn form_fields(settings: &PickerSettings, touch: bool) -> Vec<(String, DatePickerOptions)> {
        [
            ("Day", ValueKind::Single),
            ("Range", ValueKind::Range),
            ("Days", ValueKind::Multi),
        ]
        .into_iter()
        .map(|(label, kind)| {
            let mut options = field_options(label, DateValue::empty(kind), settings);
            if touch {
                options = options.touch(true);
            }
            (label.to_string(), options)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pick_args(args: &[&str]) -> PickArgs {
        let mut argv = vec!["datepicker", "pick"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Pick(args)) => args,
            _ => panic!("expected the pick command"),
        }
    }

    fn file_settings() -> PickerSettings {
        PickerSettings {
            touch: Some(true),
            position: Some(PopperPosition::Auto),
            minimum_date: Some(day(2024, 1, 1)),
            maximum_date: Some(day(2025, 12, 31)),
            disabled_days: vec![day(2024, 2, 29)],
            ..PickerSettings::default()
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let args = pick_args(&[
            "--mode",
            "range",
            "--value",
            "2024-03-01..2024-03-05",
            "--position",
            "top",
            "--min",
            "2024-03-01",
            "--disabled",
            "2024-03-10,2024-03-11",
        ]);
        let (label, options) = args.options(&file_settings()).unwrap();

        assert_eq!(label, "Date");
        assert_eq!(options.calendar_popper_position, PopperPosition::Top);
        assert_eq!(options.minimum_date, Some(day(2024, 3, 1)));
        assert_eq!(
            options.disabled_days,
            vec![day(2024, 3, 10), day(2024, 3, 11)]
        );
        assert_eq!(
            options.value,
            DateValue::Range(crate::entities::DayRange::new(
                Some(day(2024, 3, 1)),
                Some(day(2024, 3, 5))
            ))
        );
    }

    #[test]
    fn test_config_file_values_apply_without_flags() {
        let (_, options) = pick_args(&[]).options(&file_settings()).unwrap();

        assert!(options.touch);
        assert_eq!(options.calendar_popper_position, PopperPosition::Auto);
        assert_eq!(options.minimum_date, Some(day(2024, 1, 1)));
        assert_eq!(options.maximum_date, Some(day(2025, 12, 31)));
        assert_eq!(options.disabled_days, vec![day(2024, 2, 29)]);
        assert_eq!(options.value, DateValue::Single(None));
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let args = pick_args(&["--value", "tomorrow"]);
        assert!(matches!(
            args.options(&PickerSettings::default()),
            Err(PickerError::InvalidDate(_))
        ));
    }
}
