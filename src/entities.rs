use chrono::NaiveDate;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Date format accepted on the command line and in config files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid range '{0}', expected FROM..TO")]
    InvalidRange(String),

    #[error("unknown value kind '{0}', expected single, range or multi")]
    UnknownKind(String),

    #[error("unknown popper position '{0}', expected auto or top")]
    UnknownPosition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why the calendar refused a day.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{0} is a disabled day")]
    DisabledDay(NaiveDate),

    #[error("{day} is before the minimum date {minimum}")]
    BeforeMinimum { day: NaiveDate, minimum: NaiveDate },

    #[error("{day} is after the maximum date {maximum}")]
    AfterMaximum { day: NaiveDate, maximum: NaiveDate },

    #[error("range {from}..{to} includes disabled day {disabled}")]
    RangeIncludesDisabledDay {
        from: NaiveDate,
        to: NaiveDate,
        disabled: NaiveDate,
    },
}

impl SelectionError {
    /// The day handed to `on_disabled_day_error`.
    pub fn day(&self) -> NaiveDate {
        match self {
            SelectionError::DisabledDay(day) => *day,
            SelectionError::BeforeMinimum { day, .. } => *day,
            SelectionError::AfterMaximum { day, .. } => *day,
            SelectionError::RangeIncludesDisabledDay { disabled, .. } => *disabled,
        }
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, PickerError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| PickerError::InvalidDate(text.trim().to_string()))
}

// ============================================================================
// Value Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Single,
    Range,
    Multi,
}

impl FromStr for ValueKind {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ValueKind::Single),
            "range" => Ok(ValueKind::Range),
            "multi" => Ok(ValueKind::Multi),
            _ => Err(PickerError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Single => "single",
            ValueKind::Range => "range",
            ValueKind::Multi => "multi",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DayRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Strictly between the two endpoints of a complete range.
    pub fn is_between(&self, date: NaiveDate) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => date > from && date < to,
            _ => false,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.from
            .zip(self.to)
            .into_iter()
            .flat_map(|(from, to)| from.iter_days().take_while(move |day| *day <= to))
    }
}

/// The picker's value. The shape is explicit rather than inferred from which
/// fields happen to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateValue {
    Single(Option<NaiveDate>),
    Range(DayRange),
    Multi(Vec<NaiveDate>),
}

impl DateValue {
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Single => DateValue::Single(None),
            ValueKind::Range => DateValue::Range(DayRange::default()),
            ValueKind::Multi => DateValue::Multi(Vec::new()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            DateValue::Single(_) => ValueKind::Single,
            DateValue::Range(_) => ValueKind::Range,
            DateValue::Multi(_) => ValueKind::Multi,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DateValue::Single(date) => date.is_none(),
            DateValue::Range(range) => range.is_empty(),
            DateValue::Multi(dates) => dates.is_empty(),
        }
    }

    /// Whether `date` is one of the chosen days (range endpoints included).
    pub fn is_selected(&self, date: NaiveDate) -> bool {
        match self {
            DateValue::Single(selected) => *selected == Some(date),
            DateValue::Range(range) => range.from == Some(date) || range.to == Some(date),
            DateValue::Multi(dates) => dates.contains(&date),
        }
    }

    /// The day the calendar should open on.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Single(date) => *date,
            DateValue::Range(range) => range.from.or(range.to),
            DateValue::Multi(dates) => dates.first().copied(),
        }
    }

    /// Parse command-line text: `YYYY-MM-DD`, `FROM..TO` or a comma list.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, PickerError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::empty(kind));
        }

        match kind {
            ValueKind::Single => Ok(DateValue::Single(Some(parse_date(text)?))),
            ValueKind::Range => {
                let (from, to) = text
                    .split_once("..")
                    .ok_or_else(|| PickerError::InvalidRange(text.to_string()))?;
                let from = Self::parse_optional(from)?;
                let to = Self::parse_optional(to)?;
                if let (Some(from), Some(to)) = (from, to) {
                    if from > to {
                        return Err(PickerError::InvalidRange(text.to_string()));
                    }
                }
                Ok(DateValue::Range(DayRange::new(from, to)))
            }
            ValueKind::Multi => {
                let mut dates = text
                    .split(',')
                    .filter(|part| !part.trim().is_empty())
                    .map(parse_date)
                    .collect::<Result<Vec<_>, _>>()?;
                dates.sort();
                dates.dedup();
                Ok(DateValue::Multi(dates))
            }
        }
    }

    fn parse_optional(text: &str) -> Result<Option<NaiveDate>, PickerError> {
        if text.trim().is_empty() {
            Ok(None)
        } else {
            parse_date(text).map(Some)
        }
    }
}

// ============================================================================
// Placement and Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopperPosition {
    #[default]
    Auto,
    Top,
}

impl FromStr for PopperPosition {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PopperPosition::Auto),
            "top" => Ok(PopperPosition::Top),
            _ => Err(PickerError::UnknownPosition(s.to_string())),
        }
    }
}

/// A box in viewport cells. Signed so that boxes scrolled past the top or
/// left edge keep their real coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn contains(&self, column: i32, row: i32) -> bool {
        column >= self.left && column < self.right() && row >= self.top && row < self.bottom()
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(
            rect.x as i32,
            rect.y as i32,
            rect.width as i32,
            rect.height as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub scroll_x: i32,
    pub scroll_y: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0,
            scroll_y: 0,
        }
    }

    pub fn with_scroll(mut self, scroll_x: i32, scroll_y: i32) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

impl From<Rect> for Viewport {
    fn from(rect: Rect) -> Self {
        Self::new(rect.width as i32, rect.height as i32)
    }
}

/// Where the popup goes, in document coordinates (viewport plus scroll).
/// A centered position names the viewport point the popup is centered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupPosition {
    pub top: i32,
    pub left: i32,
    pub centered: bool,
}

// ============================================================================
// Focus and Window Events
// ============================================================================

/// Where focus went when the picker lost it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Input,
    Popup,
    Outside,
}

/// What the picker asks its host to do with focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    /// Focus the input and deliver a focus event back to the picker.
    Input,
    /// Keep focus inside the popup.
    Popup,
    /// Let go of focus entirely.
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowEventKind {
    Blur,
    Resize,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The terminal lost focus.
    Blur,
    Resize(Viewport),
    Scroll(Viewport),
}

impl WindowEvent {
    pub fn kind(&self) -> WindowEventKind {
        match self {
            WindowEvent::Blur => WindowEventKind::Blur,
            WindowEvent::Resize(_) => WindowEventKind::Resize,
            WindowEvent::Scroll(_) => WindowEventKind::Scroll,
        }
    }
}
