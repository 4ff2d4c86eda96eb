use crate::application::tui::{INPUT_HEIGHT, Theme, clamp_to_screen, render_input, render_popup};
use crate::entities::{
    Bounds, DATE_FORMAT, DateValue, FocusRequest, FocusTarget, Viewport, WindowEvent,
};
use crate::infrastructure::ListenerRegistry;
use crate::picker::{DatePicker, DatePickerOptions, PickerEvent};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::cell::RefCell;
use std::rc::Rc;

const TOP_MARGIN: i32 = 1;
const LEFT_MARGIN: i32 = 2;
const LABEL_HEIGHT: i32 = 1;
const FIELD_GAP: i32 = 1;
const FIELD_HEIGHT: i32 = LABEL_HEIGHT + INPUT_HEIGHT as i32 + FIELD_GAP;
const INPUT_WIDTH: i32 = 40;
const STATUS_HEIGHT: i32 = 1;

/// Upper bound on focus requests handled for one user action
const MAX_FOCUS_HOPS: usize = 8;

const INPUT_HELP: &str = "Tab: next  Enter: open  Esc: close  q: done  Ctrl+C: cancel";
const POPUP_HELP: &str = "Arrows/hjkl: move  PgUp/PgDn: month  [ ]: year  t: today  Enter: select";

pub struct DateField {
    pub label: String,
    pub picker: DatePicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Input,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusLocation {
    pub field: usize,
    pub area: FocusArea,
}

impl FocusLocation {
    pub fn input(field: usize) -> Self {
        Self {
            field,
            area: FocusArea::Input,
        }
    }

    pub fn popup(field: usize) -> Self {
        Self {
            field,
            area: FocusArea::Popup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Submit,
    Cancel,
}

/// A scrollable column of date fields hosting their pickers.
///
/// The form owns terminal focus. It turns crossterm events into picker events
/// and carries out the focus requests the pickers hand back.
pub struct Form {
    fields: Vec<DateField>,
    focus: Option<FocusLocation>,
    last_field: Option<usize>,
    scroll: i32,
    viewport: Viewport,
    registry: ListenerRegistry,
    theme: Theme,
    status: Rc<RefCell<Option<String>>>,
    popup_areas: Vec<(usize, Rect)>,
}

impl Form {
    pub fn new(theme: Theme, viewport: Viewport) -> Self {
        Self {
            fields: Vec::new(),
            focus: None,
            last_field: None,
            scroll: 0,
            viewport,
            registry: ListenerRegistry::new(),
            theme,
            status: Rc::new(RefCell::new(None)),
            popup_areas: Vec::new(),
        }
    }

    /// Add a field; rejected days are reported on the status line.
    pub fn add_field(&mut self, label: impl Into<String>, mut options: DatePickerOptions) {
        let status = Rc::clone(&self.status);
        let mut reported = options.on_disabled_day_error.take();
        options = options.on_disabled_day_error(move |day| {
            *status.borrow_mut() = Some(format!("{} cannot be selected", day.format(DATE_FORMAT)));
            if let Some(handler) = reported.as_mut() {
                handler(day);
            }
        });
        self.add_picker(label, DatePicker::new(options));
    }

    pub fn add_picker(&mut self, label: impl Into<String>, mut picker: DatePicker) {
        let index = self.fields.len();
        picker.set_viewport(self.viewport);
        picker.record_input_bounds(self.input_bounds(index));
        picker.mount(&self.registry);
        self.fields.push(DateField {
            label: label.into(),
            picker,
        });
    }

    pub fn fields(&self) -> &[DateField] {
        &self.fields
    }

    pub fn focus(&self) -> Option<FocusLocation> {
        self.focus
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn status(&self) -> Option<String> {
        self.status.borrow().clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current value of every field, in display order
    pub fn values(&self) -> Vec<(String, DateValue)> {
        self.fields
            .iter()
            .map(|field| (field.label.clone(), field.picker.value().clone()))
            .collect()
    }

    pub fn handle_event(&mut self, event: Event) -> FormOutcome {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.viewport = Viewport::new(width as i32, height as i32);
                self.scroll = self.scroll.min(self.max_scroll());
                self.viewport.scroll_y = self.scroll;
                self.refresh_layout();
                self.broadcast(WindowEvent::Resize(self.viewport));
            }
            Event::FocusLost => self.broadcast(WindowEvent::Blur),
            _ => {}
        }
        FormOutcome::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return FormOutcome::Cancel;
        }
        self.status.borrow_mut().take();

        match key.code {
            KeyCode::Tab => {
                let next = self.next_location(false);
                self.move_focus(next);
                return FormOutcome::Continue;
            }
            KeyCode::BackTab => {
                let previous = self.next_location(true);
                self.move_focus(previous);
                return FormOutcome::Continue;
            }
            _ => {}
        }

        match self.focus {
            Some(location) if location.area == FocusArea::Popup => {
                let request = self.fields[location.field].picker.handle_calendar_key(key);
                self.apply(request.map(|request| (location.field, request)));
            }
            Some(_) if key.code == KeyCode::Char('q') => return FormOutcome::Submit,
            Some(location) => {
                let request = self.fields[location.field]
                    .picker
                    .handle(PickerEvent::KeyUp(key.code));
                self.apply(request.map(|request| (location.field, request)));
            }
            None => match key.code {
                KeyCode::Char('q') => return FormOutcome::Submit,
                KeyCode::Esc => return FormOutcome::Cancel,
                _ => {}
            },
        }
        FormOutcome::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column as i32, mouse.row as i32);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(column, row),
            MouseEventKind::ScrollDown => self.scroll_by(1),
            MouseEventKind::ScrollUp => self.scroll_by(-1),
            _ => {}
        }
    }

    fn click(&mut self, column: i32, row: i32) {
        if let Some(field) = self.popup_at(column, row) {
            self.move_focus(Some(FocusLocation::popup(field)));
            let request = self.fields[field].picker.click_popup(column, row);
            self.apply(request.map(|request| (field, request)));
        } else if let Some(field) = self.input_at(column, row) {
            self.move_focus(Some(FocusLocation::input(field)));
        } else {
            self.move_focus(None);
        }
    }

    fn popup_at(&self, column: i32, row: i32) -> Option<usize> {
        self.popup_areas
            .iter()
            .rev()
            .find(|(field, area)| {
                self.fields[*field].picker.is_open() && Bounds::from(*area).contains(column, row)
            })
            .map(|(field, _)| *field)
    }

    fn input_at(&self, column: i32, row: i32) -> Option<usize> {
        self.fields.iter().position(|field| {
            field
                .picker
                .input_bounds()
                .is_some_and(|bounds| bounds.contains(column, row))
        })
    }

    fn scroll_by(&mut self, delta: i32) {
        let scroll = (self.scroll + delta).clamp(0, self.max_scroll());
        if scroll == self.scroll {
            return;
        }
        self.scroll = scroll;
        self.viewport.scroll_y = scroll;
        self.refresh_layout();
        self.broadcast(WindowEvent::Scroll(self.viewport));
    }

    fn max_scroll(&self) -> i32 {
        let document_height = TOP_MARGIN + self.fields.len() as i32 * FIELD_HEIGHT;
        (document_height - (self.viewport.height - STATUS_HEIGHT)).max(0)
    }

    /// Where field `index`'s input sits on screen
    fn input_bounds(&self, index: usize) -> Bounds {
        let top = TOP_MARGIN + index as i32 * FIELD_HEIGHT + LABEL_HEIGHT - self.scroll;
        let left = LEFT_MARGIN.min(self.viewport.width - 1).max(0);
        let width = INPUT_WIDTH.min(self.viewport.width - left - LEFT_MARGIN).max(1);
        Bounds::new(left, top, width, INPUT_HEIGHT as i32)
    }

    fn refresh_layout(&mut self) {
        for index in 0..self.fields.len() {
            let bounds = self.input_bounds(index);
            self.fields[index].picker.record_input_bounds(bounds);
        }
    }

    fn broadcast(&mut self, event: WindowEvent) {
        let requests: Vec<(usize, FocusRequest)> = self
            .fields
            .iter_mut()
            .enumerate()
            .filter_map(|(index, field)| {
                field
                    .picker
                    .handle(PickerEvent::Window(event))
                    .map(|request| (index, request))
            })
            .collect();

        for request in requests {
            self.apply(Some(request));
        }
    }

    fn next_location(&self, backwards: bool) -> Option<FocusLocation> {
        let count = self.fields.len();
        if count == 0 {
            return None;
        }
        let step = |field: usize| {
            if backwards {
                (field + count - 1) % count
            } else {
                (field + 1) % count
            }
        };

        match self.focus {
            Some(FocusLocation {
                field,
                area: FocusArea::Input,
            }) if !backwards && self.fields[field].picker.is_open() => {
                Some(FocusLocation::popup(field))
            }
            Some(FocusLocation {
                field,
                area: FocusArea::Popup,
            }) if backwards => Some(FocusLocation::input(field)),
            Some(location) => Some(FocusLocation::input(step(location.field))),
            None => match self.last_field {
                Some(field) => Some(FocusLocation::input(step(field))),
                None if backwards => Some(FocusLocation::input(count - 1)),
                None => Some(FocusLocation::input(0)),
            },
        }
    }

    fn move_focus(&mut self, target: Option<FocusLocation>) {
        let request = self.shift_focus(target);
        self.apply(request);
    }

    /// Move focus one step and return whatever the pickers ask for next.
    fn shift_focus(&mut self, target: Option<FocusLocation>) -> Option<(usize, FocusRequest)> {
        let previous = self.focus;
        if previous == target {
            return None;
        }
        self.focus = target;
        if let Some(location) = target {
            self.last_field = Some(location.field);
        }

        if let Some(left) = previous {
            let related = match target {
                Some(next) if next.field == left.field => match next.area {
                    FocusArea::Input => FocusTarget::Input,
                    FocusArea::Popup => FocusTarget::Popup,
                },
                _ => FocusTarget::Outside,
            };
            // Popup back to its own input never blurs the picker
            let returning = left.area == FocusArea::Popup && related == FocusTarget::Input;
            if !returning {
                let request = self.fields[left.field]
                    .picker
                    .handle(PickerEvent::Blur { related });
                if let Some(request) = request {
                    return Some((left.field, request));
                }
            }
        }

        match target {
            Some(next) if next.area == FocusArea::Input => self.fields[next.field]
                .picker
                .handle(PickerEvent::Focus)
                .map(|request| (next.field, request)),
            _ => None,
        }
    }

    fn apply(&mut self, mut pending: Option<(usize, FocusRequest)>) {
        let mut hops = 0;
        while let Some((field, request)) = pending.take() {
            if hops == MAX_FOCUS_HOPS {
                log::warn!(
                    "Dropping focus request {:?} for {} after {} hops",
                    request,
                    self.fields[field].label,
                    hops
                );
                break;
            }
            hops += 1;

            pending = match request {
                FocusRequest::Input => {
                    let input = FocusLocation::input(field);
                    if self.focus == Some(input) {
                        // Focusing the focused input again still counts
                        self.fields[field]
                            .picker
                            .handle(PickerEvent::Focus)
                            .map(|request| (field, request))
                    } else {
                        self.shift_focus(Some(input))
                    }
                }
                FocusRequest::Popup => {
                    self.focus = Some(FocusLocation::popup(field));
                    None
                }
                FocusRequest::Release => {
                    if self.focus.is_some_and(|location| location.field == field) {
                        self.focus = None;
                    }
                    None
                }
            };
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let screen = frame.area();
        let content_bottom = screen.bottom() as i32 - STATUS_HEIGHT;
        let colors = &self.theme.colors;

        for (index, field) in self.fields.iter().enumerate() {
            let Some(bounds) = field.picker.input_bounds() else {
                continue;
            };
            let label_top = bounds.top - LABEL_HEIGHT;
            if label_top < screen.y as i32 || bounds.bottom() > content_bottom {
                continue;
            }

            let input_focused = self.focus == Some(FocusLocation::input(index));
            let label_style = if input_focused {
                colors.label.to_ratatui_with_modifier(Modifier::BOLD)
            } else {
                colors.label.to_ratatui()
            };
            if let Some(area) =
                clamp_to_screen(bounds.left, label_top, bounds.width, LABEL_HEIGHT, screen)
            {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(field.label.clone(), label_style))),
                    area,
                );
            }
            if let Some(area) =
                clamp_to_screen(bounds.left, bounds.top, bounds.width, bounds.height, screen)
            {
                render_input(
                    frame,
                    area,
                    field.picker.options(),
                    field.picker.value(),
                    &self.theme,
                    input_focused,
                );
            }
        }

        self.popup_areas.clear();
        for (index, field) in self.fields.iter_mut().enumerate() {
            let focused = self.focus == Some(FocusLocation::popup(index));
            if let Some(area) = render_popup(frame, &mut field.picker, &self.theme, focused) {
                self.popup_areas.push((index, area));
            }
        }

        if screen.height > 0 {
            let status_line = match self.status.borrow().as_ref() {
                Some(message) => Span::styled(message.clone(), colors.error_text.to_ratatui()),
                None => {
                    let help = match self.focus {
                        Some(location) if location.area == FocusArea::Popup => POPUP_HELP,
                        _ => INPUT_HELP,
                    };
                    Span::styled(help, colors.help_text.to_ratatui())
                }
            };
            frame.render_widget(
                Paragraph::new(Line::from(status_line)),
                Rect::new(screen.x, screen.bottom() - 1, screen.width, 1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DayRange, ValueKind, WindowEventKind};
    use crate::infrastructure::test_utils::test_harness::day;
    use ratatui::{Terminal, backend::TestBackend};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn form_with(values: Vec<DateValue>, viewport: Viewport) -> Form {
        let mut form = Form::new(Theme::default(), viewport);
        for (index, value) in values.into_iter().enumerate() {
            form.add_field(format!("field {}", index), DatePickerOptions::new(value));
        }
        form
    }

    fn draw(form: &mut Form) {
        let viewport = form.viewport();
        let backend = TestBackend::new(viewport.width as u16, viewport.height as u16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| form.draw(frame)).unwrap();
    }

    fn single(y: i32, m: u32, d: u32) -> DateValue {
        DateValue::Single(Some(day(y, m, d)))
    }

    #[test]
    fn test_tab_focuses_first_field_and_opens() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        assert_eq!(form.focus(), Some(FocusLocation::input(0)));
        assert!(form.fields()[0].picker.is_open());
    }

    #[test]
    fn test_escape_closes_and_keeps_input_focus() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Esc));

        let picker = &form.fields()[0].picker;
        assert!(!picker.is_open());
        assert!(!picker.visibility().is_suppressed());
        assert_eq!(form.focus(), Some(FocusLocation::input(0)));

        form.handle_event(key(KeyCode::Enter));
        assert!(form.fields()[0].picker.is_open());
    }

    #[test]
    fn test_keyboard_selection_in_popup() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));
        assert_eq!(form.focus(), Some(FocusLocation::popup(0)));

        form.handle_event(key(KeyCode::Right));
        form.handle_event(key(KeyCode::Enter));

        assert_eq!(form.fields()[0].picker.value(), &single(2024, 3, 16));
        assert!(!form.fields()[0].picker.is_open());
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn test_escape_in_popup_returns_to_input() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Esc));

        assert!(!form.fields()[0].picker.is_open());
        assert!(!form.fields()[0].picker.visibility().is_suppressed());
        assert_eq!(form.focus(), Some(FocusLocation::input(0)));
    }

    #[test]
    fn test_tab_out_of_popup_closes_it() {
        let mut form = form_with(
            vec![single(2024, 3, 15), single(2024, 4, 1)],
            Viewport::new(80, 24),
        );
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));

        assert!(!form.fields()[0].picker.is_open());
        assert!(form.fields()[1].picker.is_open());
        assert_eq!(form.focus(), Some(FocusLocation::input(1)));
    }

    #[test]
    fn test_terminal_focus_loss_closes_popups() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(Event::FocusLost);
        assert!(!form.fields()[0].picker.is_open());
    }

    #[test]
    fn test_click_on_day_selects_and_closes() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        draw(&mut form);

        // Popup at (2, 5); 20 March 2024 is the Wednesday of the fourth week
        form.handle_event(click(4 + 3 * 3, 6 + 1 + 3));

        assert_eq!(form.fields()[0].picker.value(), &single(2024, 3, 20));
        assert!(!form.fields()[0].picker.is_open());
        assert_eq!(form.focus(), Some(FocusLocation::input(0)));
    }

    #[test]
    fn test_click_outside_closes() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        draw(&mut form);
        form.handle_event(click(70, 2));
        assert!(!form.fields()[0].picker.is_open());
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn test_resize_repositions_open_popup() {
        let mut form = form_with(
            vec![single(2024, 3, 15), single(2024, 3, 15), single(2024, 3, 15)],
            Viewport::new(80, 24),
        );
        // Third input spans rows 12..15; only the space above fits
        form.handle_event(click(3, 13));
        assert!(form.fields()[2].picker.is_open());
        assert_eq!(form.fields()[2].picker.position().top, 2);

        form.handle_event(Event::Resize(80, 40));
        assert_eq!(form.fields()[2].picker.position().top, 15);
    }

    #[test]
    fn test_draws_on_a_very_narrow_terminal() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        form.handle_event(Event::Resize(2, 24));
        draw(&mut form);

        form.handle_event(key(KeyCode::Tab));
        assert!(form.fields()[0].picker.is_open());
        draw(&mut form);

        let bounds = form.fields()[0].picker.input_bounds().unwrap();
        assert!(bounds.left < 2 && bounds.left + bounds.width <= 2);
    }

    #[test]
    fn test_range_start_click_then_click_outside_closes() {
        let range = DateValue::Range(DayRange::new(
            Some(day(2024, 3, 4)),
            Some(day(2024, 3, 8)),
        ));
        let mut form = form_with(vec![range], Viewport::new(80, 24));
        form.handle_event(key(KeyCode::Tab));
        draw(&mut form);

        // Restarts the range at the 20th; the popup stays open
        form.handle_event(click(13, 10));
        assert!(form.fields()[0].picker.is_open());

        form.handle_event(click(70, 2));
        assert!(!form.fields()[0].picker.is_open());
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn test_wheel_scrolls_and_moves_inputs() {
        let mut form = form_with(
            vec![single(2024, 3, 15), single(2024, 3, 15), single(2024, 3, 15)],
            Viewport::new(80, 10),
        );
        form.handle_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 10,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(form.viewport().scroll_y, 1);
        assert_eq!(form.fields()[0].picker.input_bounds().map(|b| b.top), Some(1));
        assert_eq!(form.fields()[0].picker.viewport().scroll_y, 1);
    }

    #[test]
    fn test_rejected_day_shows_status() {
        let mut form = Form::new(Theme::default(), Viewport::new(80, 24));
        form.add_field(
            "start",
            DatePickerOptions::new(single(2024, 3, 15)).disabled_days(vec![day(2024, 3, 16)]),
        );
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Right));
        form.handle_event(key(KeyCode::Enter));

        assert_eq!(form.status().as_deref(), Some("2024-03-16 cannot be selected"));
        assert!(form.fields()[0].picker.is_open());
        assert_eq!(form.fields()[0].picker.value(), &single(2024, 3, 15));
    }

    #[test]
    fn test_fields_register_window_listeners() {
        let form = form_with(
            vec![single(2024, 3, 15), DateValue::empty(ValueKind::Range)],
            Viewport::new(80, 24),
        );
        assert_eq!(form.registry().listener_count(WindowEventKind::Resize), 2);
        assert_eq!(form.values().len(), 2);
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut form = form_with(vec![single(2024, 3, 15)], Viewport::new(80, 24));
        assert_eq!(form.handle_event(key(KeyCode::Char('q'))), FormOutcome::Submit);
        assert_eq!(
            form.handle_event(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            FormOutcome::Cancel
        );
    }
}
