use super::calendar::CalendarView;
use super::theme::Theme;
use crate::entities::{PopupPosition, Viewport};
use crate::picker::{DatePicker, PopupSize};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    widgets::Clear,
};

/// Draw the calendar popup of an open picker. Returns the screen area used.
pub fn render_popup(
    frame: &mut Frame,
    picker: &mut DatePicker,
    theme: &Theme,
    focused: bool,
) -> Option<Rect> {
    if !picker.is_open() {
        return None;
    }

    let (width, height) = CalendarView::size(picker.options());
    picker.record_popup_size(PopupSize::new(width as i32, height as i32));

    let area = popup_area(
        picker.position(),
        picker.viewport(),
        width,
        height,
        frame.area(),
    )?;

    if picker.options().touch {
        let overlay = theme
            .colors
            .overlay
            .to_ratatui_with_modifier(Modifier::DIM);
        let screen = frame.area();
        frame.buffer_mut().set_style(screen, overlay);
    }

    let (value, options, calendar) = picker.calendar_parts();
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(
        CalendarView::new(value, options, theme).focused(focused),
        area,
        calendar,
    );

    Some(area)
}

/// Screen rectangle for a popup at `position`, clipped to `screen`.
pub fn popup_area(
    position: PopupPosition,
    viewport: Viewport,
    width: u16,
    height: u16,
    screen: Rect,
) -> Option<Rect> {
    let (left, top) = if position.centered {
        (
            position.left - width as i32 / 2,
            position.top - height as i32 / 2,
        )
    } else {
        (
            position.left - viewport.scroll_x,
            position.top - viewport.scroll_y,
        )
    };

    clamp_to_screen(left, top, width as i32, height as i32, screen)
}

/// Intersect a signed rectangle with `screen`; `None` when nothing is left.
pub fn clamp_to_screen(left: i32, top: i32, width: i32, height: i32, screen: Rect) -> Option<Rect> {
    let screen_left = screen.x as i32;
    let screen_top = screen.y as i32;
    let screen_right = screen.right() as i32;
    let screen_bottom = screen.bottom() as i32;

    let x = left.max(screen_left);
    let y = top.max(screen_top);
    let right = (left + width).min(screen_right);
    let bottom = (top + height).min(screen_bottom);

    if right <= x || bottom <= y {
        return None;
    }

    Some(Rect::new(
        x as u16,
        y as u16,
        (right - x) as u16,
        (bottom - y) as u16,
    ))
}
