use crate::entities::{Bounds, PopperPosition, PopupPosition, Viewport};

/// Height assumed for a popup that has not been rendered yet.
pub const FALLBACK_POPUP_HEIGHT: i32 = 10;
/// Width assumed for a popup that has not been rendered yet.
pub const FALLBACK_POPUP_WIDTH: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSize {
    pub width: i32,
    pub height: i32,
}

impl PopupSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for PopupSize {
    fn default() -> Self {
        Self::new(FALLBACK_POPUP_WIDTH, FALLBACK_POPUP_HEIGHT)
    }
}

/// Places the popup next to its input while keeping it inside the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Positioner {
    pub preference: PopperPosition,
    pub touch: bool,
}

impl Positioner {
    pub fn new(preference: PopperPosition, touch: bool) -> Self {
        Self { preference, touch }
    }

    pub fn compute(
        &self,
        input: Bounds,
        viewport: Viewport,
        measured: Option<PopupSize>,
    ) -> PopupPosition {
        if self.touch {
            return centered(viewport);
        }

        let size = measured.unwrap_or_default();
        let top = vertical_top(input, viewport, size.height, self.preference);
        let left = input.left + horizontal_shift(input.left, size.width, viewport.width);

        PopupPosition {
            top,
            left: left + viewport.scroll_x,
            centered: false,
        }
    }
}

/// The viewport's center point, used by the touch presentation.
pub fn centered(viewport: Viewport) -> PopupPosition {
    PopupPosition {
        top: viewport.height / 2,
        left: viewport.width / 2,
        centered: true,
    }
}

/// Top edge of the popup in document coordinates.
///
/// Below is preferred; above is used when only above has room. With room on
/// neither side the popup goes below and is allowed to overflow.
pub fn vertical_top(
    input: Bounds,
    viewport: Viewport,
    popup_height: i32,
    preference: PopperPosition,
) -> i32 {
    let below = input.bottom() + viewport.scroll_y;
    let above = input.top + viewport.scroll_y - popup_height;

    if preference == PopperPosition::Top {
        return above;
    }

    let space_below = viewport.height - input.bottom();
    let space_above = input.top;

    if space_below >= popup_height {
        below
    } else if space_above >= popup_height {
        above
    } else {
        below
    }
}

/// Horizontal correction for a popup whose left edge sits at `left`.
///
/// Negative when the popup runs past the right edge, positive when it starts
/// left of the viewport. Right overflow wins when both apply.
pub fn horizontal_shift(left: i32, popup_width: i32, viewport_width: i32) -> i32 {
    let overflow_right = left + popup_width - viewport_width;
    if overflow_right > 0 {
        -overflow_right
    } else if left < 0 {
        left.abs()
    } else {
        0
    }
}
