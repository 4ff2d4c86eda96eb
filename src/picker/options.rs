use crate::entities::{DateValue, PopperPosition};
use crate::picker::selection::DayRules;
use chrono::{Datelike, NaiveDate};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use std::fmt;
use std::ops::RangeInclusive;

pub type ChangeHandler = Box<dyn FnMut(&DateValue)>;
pub type DisabledDayHandler = Box<dyn FnMut(NaiveDate)>;
pub type InputFormatter = Box<dyn Fn(&DateValue) -> String>;
/// Receives the value and its formatted text.
pub type InputRenderer = Box<dyn Fn(&DateValue, &str) -> Line<'static>>;
pub type FooterRenderer = Box<dyn Fn() -> Line<'static>>;

/// Years offered by the calendar when no explicit range is configured.
pub const YEARS_BEFORE_TODAY: i32 = 100;
pub const YEARS_AFTER_TODAY: i32 = 50;

/// A day drawn with its own style.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDay {
    pub date: NaiveDate,
    pub style: Style,
}

/// Style overrides for the calendar's day substates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayStyles {
    pub today: Option<Style>,
    pub selected_day: Option<Style>,
    pub range_start: Option<Style>,
    pub range_between: Option<Style>,
    pub range_end: Option<Style>,
}

/// Everything a [`DatePicker`](crate::picker::DatePicker) is built from.
pub struct DatePickerOptions {
    pub value: DateValue,
    pub(crate) on_change: Option<ChangeHandler>,
    pub(crate) on_disabled_day_error: Option<DisabledDayHandler>,
    pub(crate) format_input_text: Option<InputFormatter>,
    pub(crate) render_input: Option<InputRenderer>,
    pub(crate) render_footer: Option<FooterRenderer>,
    pub input_placeholder: Option<String>,
    pub input_id: Option<String>,
    pub input_style: Option<Style>,
    pub calendar_style: Option<Style>,
    pub day_styles: DayStyles,
    pub custom_days: Vec<CustomDay>,
    pub color_primary: Option<Color>,
    pub color_primary_light: Option<Color>,
    pub disabled: bool,
    pub touch: bool,
    pub calendar_popper_position: PopperPosition,
    pub minimum_date: Option<NaiveDate>,
    pub maximum_date: Option<NaiveDate>,
    pub selector_starting_year: Option<i32>,
    pub selector_ending_year: Option<i32>,
    pub locale: String,
    pub should_highlight_weekends: bool,
    pub disabled_days: Vec<NaiveDate>,
}

impl DatePickerOptions {
    pub fn new(value: DateValue) -> Self {
        Self {
            value,
            on_change: None,
            on_disabled_day_error: None,
            format_input_text: None,
            render_input: None,
            render_footer: None,
            input_placeholder: None,
            input_id: None,
            input_style: None,
            calendar_style: None,
            day_styles: DayStyles::default(),
            custom_days: Vec::new(),
            color_primary: None,
            color_primary_light: None,
            disabled: false,
            touch: false,
            calendar_popper_position: PopperPosition::Auto,
            minimum_date: None,
            maximum_date: None,
            selector_starting_year: None,
            selector_ending_year: None,
            locale: "en".to_string(),
            should_highlight_weekends: false,
            disabled_days: Vec::new(),
        }
    }

    pub fn on_change(mut self, handler: impl FnMut(&DateValue) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn on_disabled_day_error(mut self, handler: impl FnMut(NaiveDate) + 'static) -> Self {
        self.on_disabled_day_error = Some(Box::new(handler));
        self
    }

    pub fn format_input_text(mut self, formatter: impl Fn(&DateValue) -> String + 'static) -> Self {
        self.format_input_text = Some(Box::new(formatter));
        self
    }

    pub fn render_input(
        mut self,
        renderer: impl Fn(&DateValue, &str) -> Line<'static> + 'static,
    ) -> Self {
        self.render_input = Some(Box::new(renderer));
        self
    }

    pub fn render_footer(mut self, renderer: impl Fn() -> Line<'static> + 'static) -> Self {
        self.render_footer = Some(Box::new(renderer));
        self
    }

    pub fn input_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.input_placeholder = Some(placeholder.into());
        self
    }

    pub fn input_id(mut self, id: impl Into<String>) -> Self {
        self.input_id = Some(id.into());
        self
    }

    pub fn input_style(mut self, style: Style) -> Self {
        self.input_style = Some(style);
        self
    }

    pub fn calendar_style(mut self, style: Style) -> Self {
        self.calendar_style = Some(style);
        self
    }

    pub fn calendar_today_style(mut self, style: Style) -> Self {
        self.day_styles.today = Some(style);
        self
    }

    pub fn calendar_selected_day_style(mut self, style: Style) -> Self {
        self.day_styles.selected_day = Some(style);
        self
    }

    pub fn calendar_range_start_style(mut self, style: Style) -> Self {
        self.day_styles.range_start = Some(style);
        self
    }

    pub fn calendar_range_between_style(mut self, style: Style) -> Self {
        self.day_styles.range_between = Some(style);
        self
    }

    pub fn calendar_range_end_style(mut self, style: Style) -> Self {
        self.day_styles.range_end = Some(style);
        self
    }

    pub fn custom_days(mut self, days: Vec<CustomDay>) -> Self {
        self.custom_days = days;
        self
    }

    pub fn color_primary(mut self, color: Color) -> Self {
        self.color_primary = Some(color);
        self
    }

    pub fn color_primary_light(mut self, color: Color) -> Self {
        self.color_primary_light = Some(color);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn touch(mut self, touch: bool) -> Self {
        self.touch = touch;
        self
    }

    pub fn calendar_popper_position(mut self, position: PopperPosition) -> Self {
        self.calendar_popper_position = position;
        self
    }

    pub fn minimum_date(mut self, date: NaiveDate) -> Self {
        self.minimum_date = Some(date);
        self
    }

    pub fn maximum_date(mut self, date: NaiveDate) -> Self {
        self.maximum_date = Some(date);
        self
    }

    pub fn selector_years(mut self, starting: i32, ending: i32) -> Self {
        self.selector_starting_year = Some(starting);
        self.selector_ending_year = Some(ending);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn should_highlight_weekends(mut self, highlight: bool) -> Self {
        self.should_highlight_weekends = highlight;
        self
    }

    pub fn disabled_days(mut self, days: Vec<NaiveDate>) -> Self {
        self.disabled_days = days;
        self
    }

    pub fn has_footer(&self) -> bool {
        self.render_footer.is_some()
    }

    /// Years the calendar may navigate through.
    pub fn year_range(&self, today: NaiveDate) -> RangeInclusive<i32> {
        let start = self
            .selector_starting_year
            .unwrap_or(today.year() - YEARS_BEFORE_TODAY);
        let end = self
            .selector_ending_year
            .unwrap_or(today.year() + YEARS_AFTER_TODAY);
        start.min(end)..=end.max(start)
    }

    pub fn day_rules(&self) -> DayRules {
        DayRules::new(self.minimum_date, self.maximum_date, self.disabled_days.clone())
    }

    pub fn custom_day_style(&self, date: NaiveDate) -> Option<Style> {
        self.custom_days
            .iter()
            .find(|custom| custom.date == date)
            .map(|custom| custom.style)
    }
}

impl fmt::Debug for DatePickerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatePickerOptions")
            .field("value", &self.value)
            .field("input_id", &self.input_id)
            .field("disabled", &self.disabled)
            .field("touch", &self.touch)
            .field("calendar_popper_position", &self.calendar_popper_position)
            .field("minimum_date", &self.minimum_date)
            .field("maximum_date", &self.maximum_date)
            .field("locale", &self.locale)
            .field("disabled_days", &self.disabled_days)
            .field("has_footer", &self.has_footer())
            .finish_non_exhaustive()
    }
}
