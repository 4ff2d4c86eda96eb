pub mod options;
pub mod positioner;
pub mod selection;
pub mod visibility;

pub use options::*;
pub use positioner::*;
pub use selection::*;
pub use visibility::*;

use crate::application::tui::{CalendarAction, CalendarState};
use crate::entities::{
    Bounds, DateValue, FocusRequest, FocusTarget, PopupPosition, Viewport, WindowEvent,
    WindowEventKind,
};
use crate::infrastructure::{ListenerGuard, ListenerRegistry};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

const SUPPORTED_LOCALES: [&str; 1] = ["en"];

/// Something that happened to the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    /// The input gained focus
    Focus,
    /// Focus left the input or the popup
    Blur { related: FocusTarget },
    /// A key was released on the input
    KeyUp(KeyCode),
    /// Mouse button pressed somewhere inside the popup
    PopupMouseDown,
    /// The calendar produced a new value
    Select(DateValue),
    Window(WindowEvent),
}

/// An input with a popup calendar.
pub struct DatePicker {
    options: DatePickerOptions,
    visibility: Visibility,
    positioner: Positioner,
    position: PopupPosition,
    viewport: Viewport,
    input_bounds: Option<Bounds>,
    popup_size: Option<PopupSize>,
    calendar: CalendarState,
    listeners: Vec<ListenerGuard>,
}

impl DatePicker {
    pub fn new(options: DatePickerOptions) -> Self {
        Self::with_today(options, chrono::Local::now().date_naive())
    }

    pub fn with_today(options: DatePickerOptions, today: NaiveDate) -> Self {
        if !SUPPORTED_LOCALES.contains(&options.locale.as_str()) {
            log::warn!(
                "Locale '{}' is not supported, using 'en' for {}",
                options.locale,
                Self::owner_name(&options)
            );
        }

        let calendar = CalendarState::new(
            options.value.anchor_date().unwrap_or(today),
            today,
            options.year_range(today),
            options.minimum_date,
            options.maximum_date,
        );

        Self {
            positioner: Positioner::new(options.calendar_popper_position, options.touch),
            options,
            visibility: Visibility::new(),
            position: PopupPosition::default(),
            viewport: Viewport::default(),
            input_bounds: None,
            popup_size: None,
            calendar,
            listeners: Vec::new(),
        }
    }

    fn owner_name(options: &DatePickerOptions) -> String {
        options
            .input_id
            .clone()
            .unwrap_or_else(|| "datepicker".to_string())
    }

    pub fn name(&self) -> String {
        Self::owner_name(&self.options)
    }

    pub fn value(&self) -> &DateValue {
        &self.options.value
    }

    /// Replace the value from outside, e.g. when the host owns it.
    pub fn set_value(&mut self, value: DateValue) {
        self.options.value = value;
    }

    pub fn options(&self) -> &DatePickerOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    pub fn is_disabled(&self) -> bool {
        self.options.disabled
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn position(&self) -> PopupPosition {
        self.position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn input_bounds(&self) -> Option<Bounds> {
        self.input_bounds
    }

    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    /// Split borrows for rendering the popup
    pub fn calendar_parts(&mut self) -> (&DateValue, &DatePickerOptions, &mut CalendarState) {
        (&self.options.value, &self.options, &mut self.calendar)
    }

    /// Where the input was laid out, in viewport cells
    pub fn record_input_bounds(&mut self, bounds: Bounds) {
        self.input_bounds = Some(bounds);
    }

    /// Size the popup was drawn with. A change repositions an open popup.
    pub fn record_popup_size(&mut self, size: PopupSize) {
        if self.popup_size != Some(size) {
            self.popup_size = Some(size);
            if self.is_open() {
                self.update_position();
            }
        }
    }

    /// Register the window-level listeners this picker depends on.
    pub fn mount(&mut self, registry: &ListenerRegistry) {
        if self.is_mounted() {
            return;
        }
        let owner = self.name();
        self.listeners = [
            WindowEventKind::Blur,
            WindowEventKind::Resize,
            WindowEventKind::Scroll,
        ]
        .into_iter()
        .map(|kind| registry.subscribe(kind, owner.clone()))
        .collect();
        self.update_position();
    }

    /// Release the window-level listeners.
    pub fn unmount(&mut self) {
        self.listeners.clear();
    }

    pub fn is_mounted(&self) -> bool {
        !self.listeners.is_empty()
    }

    fn is_listening(&self, kind: WindowEventKind) -> bool {
        self.listeners.iter().any(|guard| guard.kind() == kind)
    }

    pub fn handle(&mut self, event: PickerEvent) -> Option<FocusRequest> {
        match event {
            PickerEvent::Focus => {
                if self.options.disabled {
                    return None;
                }
                if self.visibility.on_focus() {
                    self.on_opened();
                }
                None
            }
            PickerEvent::Blur { related } => {
                let was_open = self.is_open();
                let request = self.visibility.on_blur(related);
                if was_open && !self.is_open() {
                    log::debug!("{} closed on blur", self.name());
                }
                request
            }
            PickerEvent::KeyUp(_) if self.options.disabled => None,
            PickerEvent::KeyUp(code) => {
                let (opened, request) = self.visibility.on_key(code);
                if opened {
                    self.on_opened();
                }
                if code == KeyCode::Esc {
                    log::debug!("{} dismissed with Escape", self.name());
                }
                request
            }
            PickerEvent::PopupMouseDown => {
                self.visibility.suppress();
                None
            }
            PickerEvent::Select(value) => self.forward_selection(value),
            PickerEvent::Window(window_event) => self.handle_window_event(window_event),
        }
    }

    /// Keys pressed while the popup has focus.
    pub fn handle_calendar_key(&mut self, key: KeyEvent) -> Option<FocusRequest> {
        match self.calendar.handle_key(key) {
            CalendarAction::Select(day) => self.select_day(day),
            CalendarAction::Dismiss => self.handle(PickerEvent::KeyUp(KeyCode::Esc)),
            CalendarAction::Moved | CalendarAction::None => None,
        }
    }

    /// Mouse-down at a screen cell inside the popup.
    pub fn click_popup(&mut self, column: i32, row: i32) -> Option<FocusRequest> {
        self.handle(PickerEvent::PopupMouseDown);
        let request = match self.calendar.day_at(column, row) {
            Some(day) => {
                self.calendar.jump_to(day);
                self.select_day(day)
            }
            None => None,
        };
        self.visibility.end_press();
        request
    }

    /// Choose `day` on the calendar, subject to the day rules.
    pub fn select_day(&mut self, day: NaiveDate) -> Option<FocusRequest> {
        match next_value(&self.options.value, day, &self.options.day_rules()) {
            Ok(value) => self.handle(PickerEvent::Select(value)),
            Err(err) => {
                log::info!("{} rejected selection: {}", self.name(), err);
                if let Some(on_disabled_day_error) = self.options.on_disabled_day_error.as_mut() {
                    on_disabled_day_error(err.day());
                }
                None
            }
        }
    }

    fn forward_selection(&mut self, value: DateValue) -> Option<FocusRequest> {
        let kind = self.options.value.kind();
        if let Some(on_change) = self.options.on_change.as_mut() {
            on_change(&value);
        }

        let close = should_close(kind, &value);
        self.options.value = value;

        if close {
            log::debug!("{} closed after {} selection", self.name(), kind);
            self.visibility.close().or(Some(FocusRequest::Release))
        } else {
            None
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent) -> Option<FocusRequest> {
        if !self.is_listening(event.kind()) {
            log::trace!("{} ignored {:?}, not subscribed", self.name(), event);
            return None;
        }

        match event {
            WindowEvent::Blur => {
                if self.is_open() {
                    log::debug!("{} closed, terminal lost focus", self.name());
                }
                self.visibility.close()
            }
            WindowEvent::Resize(viewport) | WindowEvent::Scroll(viewport) => {
                self.viewport = viewport;
                self.update_position();
                None
            }
        }
    }

    fn on_opened(&mut self) {
        if let Some(anchor) = self.options.value.anchor_date() {
            self.calendar.jump_to(anchor);
        }
        self.update_position();
        log::debug!("{} opened at {:?}", self.name(), self.position);
    }

    fn update_position(&mut self) {
        if self.options.touch {
            self.position = centered(self.viewport);
            return;
        }
        if let Some(bounds) = self.input_bounds {
            self.position = self
                .positioner
                .compute(bounds, self.viewport, self.popup_size);
        }
    }
}
