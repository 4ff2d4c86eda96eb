use super::theme::Theme;
use crate::entities::{DateValue, ValueKind};
use crate::picker::DatePickerOptions;
use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Height of a bordered input box.
pub const INPUT_HEIGHT: u16 = 3;

const DISPLAY_FORMAT: &str = "%Y/%m/%d";

fn display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Default text for a value: `2024/03/15`, `from A to B`, or a comma list.
pub fn format_value(value: &DateValue) -> String {
    match value {
        DateValue::Single(date) => date.map(display).unwrap_or_default(),
        DateValue::Range(range) => {
            let mut parts = Vec::new();
            if let Some(from) = range.from {
                parts.push(format!("from {}", display(from)));
            }
            if let Some(to) = range.to {
                parts.push(format!("to {}", display(to)));
            }
            parts.join(" ")
        }
        DateValue::Multi(dates) => dates
            .iter()
            .map(|date| display(*date))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub fn default_placeholder(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Single => "Select a day",
        ValueKind::Range => "Select a day range",
        ValueKind::Multi => "Select days",
    }
}

/// The text the input shows and whether it is the placeholder.
pub fn input_text(options: &DatePickerOptions, value: &DateValue) -> (String, bool) {
    let text = match &options.format_input_text {
        Some(formatter) => formatter(value),
        None => format_value(value),
    };

    if text.is_empty() {
        let placeholder = options
            .input_placeholder
            .clone()
            .unwrap_or_else(|| default_placeholder(value.kind()).to_string());
        (placeholder, true)
    } else {
        (text, false)
    }
}

/// Draw the read-only input box.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    options: &DatePickerOptions,
    value: &DateValue,
    theme: &Theme,
    focused: bool,
) {
    let colors = &theme.colors;
    let (text, is_placeholder) = input_text(options, value);

    let line = match &options.render_input {
        Some(renderer) => renderer(value, &text),
        None if is_placeholder => Line::from(Span::styled(text, colors.placeholder.to_ratatui())),
        None => Line::from(text),
    };

    let mut border_style = if focused {
        colors.input_focused.to_ratatui_with_modifier(Modifier::BOLD)
    } else {
        colors.input.to_ratatui()
    };
    if options.disabled {
        border_style = colors.disabled.to_ratatui();
    }

    let mut style = colors.label.to_ratatui();
    if let Some(input_style) = options.input_style {
        style = style.patch(input_style);
    }

    let paragraph = Paragraph::new(line).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);
}
