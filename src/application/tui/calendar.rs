use super::theme::Theme;
use crate::entities::{Bounds, DateValue};
use crate::picker::{DatePickerOptions, DayRules};
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, StatefulWidget, Table, Widget},
};
use std::ops::RangeInclusive;

/// Natural popup size without a footer.
pub const CALENDAR_WIDTH: u16 = 24;
pub const CALENDAR_HEIGHT: u16 = 10;

const DAY_COLUMN_WIDTH: u16 = 2;
const COLUMN_SPACING: u16 = 1;
const WEEKS_SHOWN: usize = 6;
const GRID_HEIGHT: u16 = WEEKS_SHOWN as u16 + 1;

const WEEKDAY_HEADERS: [(&str, Weekday); 7] = [
    ("Su", Weekday::Sun),
    ("Mo", Weekday::Mon),
    ("Tu", Weekday::Tue),
    ("We", Weekday::Wed),
    ("Th", Weekday::Thu),
    ("Fr", Weekday::Fri),
    ("Sa", Weekday::Sat),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarAction {
    None,
    Moved,
    Select(NaiveDate),
    Dismiss,
}

/// Cursor and hit-testing state for the month grid.
#[derive(Debug, Clone)]
pub struct CalendarState {
    cursor: NaiveDate,
    today: NaiveDate,
    years: RangeInclusive<i32>,
    minimum_date: Option<NaiveDate>,
    maximum_date: Option<NaiveDate>,
    /// Screen cells of the days drawn in the last frame
    day_cells: Vec<(Bounds, NaiveDate)>,
}

impl CalendarState {
    pub fn new(
        anchor: NaiveDate,
        today: NaiveDate,
        years: RangeInclusive<i32>,
        minimum_date: Option<NaiveDate>,
        maximum_date: Option<NaiveDate>,
    ) -> Self {
        let mut state = Self {
            cursor: anchor,
            today,
            years,
            minimum_date,
            maximum_date,
            day_cells: Vec::new(),
        };
        state.cursor = state.clamp(anchor);
        state
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.cursor = self.clamp(date);
    }

    /// Handle keyboard input while the popup has focus
    pub fn handle_key(&mut self, key: KeyEvent) -> CalendarAction {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_days(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_days(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_days(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_days(7),
            KeyCode::PageUp => self.move_months(-1),
            KeyCode::PageDown => self.move_months(1),
            KeyCode::Char('[') => self.move_months(-12),
            KeyCode::Char(']') => self.move_months(12),
            KeyCode::Char('t') => self.move_to(self.today),
            KeyCode::Enter | KeyCode::Char(' ') => CalendarAction::Select(self.cursor),
            KeyCode::Esc => CalendarAction::Dismiss,
            _ => CalendarAction::None,
        }
    }

    /// The day drawn at a screen cell in the last frame
    pub fn day_at(&self, column: i32, row: i32) -> Option<NaiveDate> {
        self.day_cells
            .iter()
            .find(|(bounds, _)| bounds.contains(column, row))
            .map(|(_, date)| *date)
    }

    fn move_days(&mut self, days: i64) -> CalendarAction {
        match self.cursor.checked_add_signed(Duration::days(days)) {
            Some(date) => self.move_to(date),
            None => CalendarAction::None,
        }
    }

    fn move_months(&mut self, months: i32) -> CalendarAction {
        let shifted = if months >= 0 {
            self.cursor.checked_add_months(Months::new(months as u32))
        } else {
            self.cursor
                .checked_sub_months(Months::new(months.unsigned_abs()))
        };
        match shifted {
            Some(date) => self.move_to(date),
            None => CalendarAction::None,
        }
    }

    fn move_to(&mut self, date: NaiveDate) -> CalendarAction {
        let target = self.clamp(date);
        if target == self.cursor {
            CalendarAction::None
        } else {
            self.cursor = target;
            CalendarAction::Moved
        }
    }

    /// Keep the cursor inside the selectable years and the min/max dates
    fn clamp(&self, date: NaiveDate) -> NaiveDate {
        let first_year = NaiveDate::from_ymd_opt(*self.years.start(), 1, 1).unwrap_or(NaiveDate::MIN);
        let last_year = NaiveDate::from_ymd_opt(*self.years.end(), 12, 31).unwrap_or(NaiveDate::MAX);

        let lower = self.minimum_date.map_or(first_year, |min| min.max(first_year));
        let upper = self.maximum_date.map_or(last_year, |max| max.min(last_year));

        if lower > upper {
            lower
        } else {
            date.clamp(lower, upper)
        }
    }
}

/// Six Sunday-first weeks covering `year`/`month`; days of other months are `None`.
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let offset = first.weekday().num_days_from_sunday() as i64;
    let start = first - Duration::days(offset);

    (0..WEEKS_SHOWN)
        .map(|week| {
            let mut days = [None; 7];
            for (weekday, slot) in days.iter_mut().enumerate() {
                let date = start + Duration::days((week * 7 + weekday) as i64);
                if date.month() == month {
                    *slot = Some(date);
                }
            }
            days
        })
        .collect()
}

/// The month grid drawn inside the popup.
pub struct CalendarView<'a> {
    value: &'a DateValue,
    options: &'a DatePickerOptions,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> CalendarView<'a> {
    pub fn new(value: &'a DateValue, options: &'a DatePickerOptions, theme: &'a Theme) -> Self {
        Self {
            value,
            options,
            theme,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Width and height the popup needs
    pub fn size(options: &DatePickerOptions) -> (u16, u16) {
        let footer = if options.has_footer() { 1 } else { 0 };
        (CALENDAR_WIDTH, CALENDAR_HEIGHT + footer)
    }

    fn primary_style(&self) -> Style {
        match self.options.color_primary {
            Some(color) => Style::default().bg(color).fg(ratatui::style::Color::Black),
            None => self.theme.colors.primary.to_ratatui(),
        }
    }

    fn selected_style(&self) -> Style {
        match self.options.color_primary {
            Some(_) => self.primary_style(),
            None => self.theme.colors.selected.to_ratatui(),
        }
    }

    fn primary_light_style(&self) -> Style {
        match self.options.color_primary_light {
            Some(color) => Style::default().bg(color),
            None => self.theme.colors.primary_light.to_ratatui(),
        }
    }

    /// Styling for a day cell: weekend < disabled < today < range < selected < custom
    fn day_style(&self, date: NaiveDate, rules: &DayRules, state: &CalendarState) -> Style {
        let colors = &self.theme.colors;
        let overrides = &self.options.day_styles;

        let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let mut style = if self.options.should_highlight_weekends && is_weekend {
            colors.weekend.to_ratatui()
        } else {
            colors.normal_day.to_ratatui()
        };

        if !rules.is_selectable(date) {
            style = colors.disabled.to_ratatui_with_modifier(Modifier::DIM);
        }

        if date == state.today {
            style = overrides
                .today
                .unwrap_or_else(|| colors.today.to_ratatui_with_modifier(Modifier::BOLD));
        }

        match self.value {
            DateValue::Range(range) => {
                if range.is_between(date) {
                    style = overrides.range_between.unwrap_or_else(|| self.primary_light_style());
                }
                if range.from == Some(date) {
                    style = overrides.range_start.unwrap_or_else(|| self.primary_style());
                }
                if range.to == Some(date) {
                    style = overrides.range_end.unwrap_or_else(|| self.primary_style());
                }
            }
            value => {
                if value.is_selected(date) {
                    style = overrides.selected_day.unwrap_or_else(|| self.selected_style());
                }
            }
        }

        if let Some(custom) = self.options.custom_day_style(date) {
            style = style.patch(custom);
        }

        if date == state.cursor {
            let marker = if self.focused {
                Modifier::REVERSED
            } else {
                Modifier::UNDERLINED
            };
            style = style.add_modifier(marker);
        }

        style
    }
}

impl StatefulWidget for CalendarView<'_> {
    type State = CalendarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut CalendarState) {
        let colors = &self.theme.colors;
        let mut block_style = colors.border.to_ratatui();
        if let Some(style) = self.options.calendar_style {
            block_style = block_style.patch(style);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(block_style)
            .padding(Padding::horizontal(1))
            .title(format!("{}", state.cursor.format("%B %Y")))
            .title_style(colors.header.to_ratatui())
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        block.render(area, buf);

        let footer_height = if self.options.has_footer() { 1 } else { 0 };
        let [grid_area, status_area, footer_area] = Layout::vertical([
            Constraint::Length(GRID_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(footer_height),
        ])
        .areas(inner);

        let header = Row::new(WEEKDAY_HEADERS.iter().map(|(name, weekday)| {
            let style = if self.options.should_highlight_weekends
                && matches!(weekday, Weekday::Sat | Weekday::Sun)
            {
                colors.weekend.to_ratatui()
            } else {
                colors.header.to_ratatui()
            };
            Cell::from(*name).style(style)
        }))
        .height(1);

        let rules = self.options.day_rules();
        let grid = month_grid(state.cursor.year(), state.cursor.month());
        let rows: Vec<Row> = grid
            .iter()
            .map(|week| {
                Row::new(week.iter().map(|day| match day {
                    Some(date) => Cell::from(format!("{:>2}", date.day()))
                        .style(self.day_style(*date, &rules, state)),
                    None => Cell::from("  "),
                }))
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(DAY_COLUMN_WIDTH); 7])
            .header(header)
            .column_spacing(COLUMN_SPACING);
        Widget::render(table, grid_area, buf);

        state.day_cells.clear();
        for (week, days) in grid.iter().enumerate() {
            let row = grid_area.y + 1 + week as u16;
            if row >= grid_area.bottom() {
                break;
            }
            for (weekday, day) in days.iter().enumerate() {
                if let Some(date) = day {
                    let column = grid_area.x + weekday as u16 * (DAY_COLUMN_WIDTH + COLUMN_SPACING);
                    if column < grid_area.right() {
                        let bounds =
                            Bounds::new(column as i32, row as i32, DAY_COLUMN_WIDTH as i32, 1);
                        state.day_cells.push((bounds, *date));
                    }
                }
            }
        }

        let status = Paragraph::new(Line::from(Span::styled(
            format!("{}", state.cursor.format("%a %b %d %Y")),
            colors.help_text.to_ratatui(),
        )))
        .alignment(Alignment::Center);
        status.render(status_area, buf);

        if let Some(render_footer) = &self.options.render_footer {
            Paragraph::new(render_footer())
                .alignment(Alignment::Center)
                .render(footer_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DayRange, ValueKind};
    use crossterm::event::KeyModifiers;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_at(anchor: NaiveDate) -> CalendarState {
        CalendarState::new(anchor, day(2024, 3, 15), 1924..=2074, None, None)
    }

    #[test]
    fn test_month_grid_starts_on_sunday() {
        // March 2024 starts on a Friday
        let grid = month_grid(2024, 3);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0][..5], [None; 5]);
        assert_eq!(grid[0][5], Some(day(2024, 3, 1)));
        assert_eq!(grid[5][0], Some(day(2024, 3, 31)));
        let count: usize = grid
            .iter()
            .map(|week| week.iter().flatten().count())
            .sum();
        assert_eq!(count, 31);
    }

    #[test]
    fn test_cursor_navigation() {
        let mut state = state_at(day(2024, 3, 15));
        assert_eq!(state.handle_key(key(KeyCode::Right)), CalendarAction::Moved);
        assert_eq!(state.cursor(), day(2024, 3, 16));
        state.handle_key(key(KeyCode::Char('k')));
        assert_eq!(state.cursor(), day(2024, 3, 9));
        state.handle_key(key(KeyCode::PageDown));
        assert_eq!(state.cursor(), day(2024, 4, 9));
        state.handle_key(key(KeyCode::Char('[')));
        assert_eq!(state.cursor(), day(2023, 4, 9));
        state.handle_key(key(KeyCode::Char('t')));
        assert_eq!(state.cursor(), day(2024, 3, 15));
    }

    #[test]
    fn test_month_jump_clamps_day_of_month() {
        let mut state = state_at(day(2024, 1, 31));
        state.handle_key(key(KeyCode::PageDown));
        assert_eq!(state.cursor(), day(2024, 2, 29));
    }

    #[test]
    fn test_navigation_is_clamped_to_bounds() {
        let mut state = CalendarState::new(
            day(2024, 3, 15),
            day(2024, 3, 15),
            2000..=2030,
            Some(day(2024, 3, 10)),
            Some(day(2024, 3, 20)),
        );
        state.handle_key(key(KeyCode::PageUp));
        assert_eq!(state.cursor(), day(2024, 3, 10));
        assert_eq!(state.handle_key(key(KeyCode::Left)), CalendarAction::None);

        let mut state = CalendarState::new(day(2030, 12, 20), day(2024, 1, 1), 2000..=2030, None, None);
        state.handle_key(key(KeyCode::Char(']')));
        assert_eq!(state.cursor(), day(2030, 12, 31));
    }

    #[test]
    fn test_select_and_dismiss_keys() {
        let mut state = state_at(day(2024, 3, 15));
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            CalendarAction::Select(day(2024, 3, 15))
        );
        assert_eq!(
            state.handle_key(key(KeyCode::Char(' '))),
            CalendarAction::Select(day(2024, 3, 15))
        );
        assert_eq!(state.handle_key(key(KeyCode::Esc)), CalendarAction::Dismiss);
        assert_eq!(state.handle_key(key(KeyCode::Char('x'))), CalendarAction::None);
    }

    #[test]
    fn test_render_records_day_cells() {
        let options = DatePickerOptions::new(DateValue::empty(ValueKind::Single));
        let value = DateValue::Single(None);
        let theme = Theme::default();
        let mut state = state_at(day(2024, 3, 15));

        let area = Rect::new(10, 5, CALENDAR_WIDTH, CALENDAR_HEIGHT);
        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 30));
        CalendarView::new(&value, &options, &theme).render(area, &mut buf, &mut state);

        // Border + padding put the grid at x=12; header row at y=6
        assert_eq!(state.day_at(12 + 5 * 3, 7), Some(day(2024, 3, 1)));
        assert_eq!(state.day_at(13 + 5 * 3, 7), Some(day(2024, 3, 1)));
        assert_eq!(state.day_at(12, 12), Some(day(2024, 3, 31)));
        assert_eq!(state.day_at(12, 6), None);

        let title: String = (10..34).map(|x| buf[(x, 5)].symbol().to_string()).collect();
        assert!(title.contains("March 2024"));
    }

    #[test]
    fn test_range_endpoints_use_override_styles() {
        let start_style = Style::default().fg(ratatui::style::Color::Red);
        let options = DatePickerOptions::new(DateValue::empty(ValueKind::Range))
            .calendar_range_start_style(start_style);
        let value = DateValue::Range(DayRange::new(Some(day(2024, 3, 4)), Some(day(2024, 3, 8))));
        let theme = Theme::default();
        let state = state_at(day(2024, 3, 20));
        let view = CalendarView::new(&value, &options, &theme);
        let rules = options.day_rules();

        assert_eq!(view.day_style(day(2024, 3, 4), &rules, &state), start_style);
        assert_eq!(
            view.day_style(day(2024, 3, 6), &rules, &state),
            theme.colors.primary_light.to_ratatui()
        );
        assert_eq!(
            view.day_style(day(2024, 3, 8), &rules, &state),
            theme.colors.primary.to_ratatui()
        );
    }

    #[test]
    fn test_selected_day_uses_theme_selected_colors() {
        let value = DateValue::Single(Some(day(2024, 3, 6)));
        let options = DatePickerOptions::new(value.clone());
        let theme = Theme::default();
        let state = state_at(day(2024, 3, 20));
        let view = CalendarView::new(&value, &options, &theme);
        let rules = options.day_rules();
        assert_eq!(
            view.day_style(day(2024, 3, 6), &rules, &state),
            theme.colors.selected.to_ratatui()
        );

        let options = DatePickerOptions::new(value.clone()).color_primary(ratatui::style::Color::Red);
        let view = CalendarView::new(&value, &options, &theme);
        assert_eq!(
            view.day_style(day(2024, 3, 6), &rules, &state),
            Style::default().bg(ratatui::style::Color::Red).fg(ratatui::style::Color::Black)
        );
    }

    #[test]
    fn test_footer_adds_a_row() {
        let options = DatePickerOptions::new(DateValue::empty(ValueKind::Single));
        assert_eq!(CalendarView::size(&options), (24, 10));
        let options = options.render_footer(|| Line::from("Clear"));
        assert_eq!(CalendarView::size(&options), (24, 11));
    }
}
