use crate::entities::{FocusRequest, FocusTarget};
use crossterm::event::KeyCode;

/// Open/closed state of the popup plus the suppress-toggle flag.
///
/// The flag is raised when the user presses Escape or mouses down inside the
/// popup. While it is raised, the next focus event on the input is swallowed
/// instead of reopening the popup, so a gesture that blurs and refocuses the
/// input never flashes the popup closed and open again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    open: bool,
    suppress_toggle: bool,
}

impl Visibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_toggle
    }

    /// Returns true when the popup was closed before.
    pub fn open(&mut self) -> bool {
        let opened = !self.open;
        self.open = true;
        opened
    }

    /// Close the popup. A pending suppress flag sends focus back to the input,
    /// where the resulting focus event consumes it.
    pub fn close(&mut self) -> Option<FocusRequest> {
        self.open = false;
        if self.suppress_toggle {
            Some(FocusRequest::Input)
        } else {
            None
        }
    }

    pub fn suppress(&mut self) {
        self.suppress_toggle = true;
    }

    /// A popup press ended with the popup still open; drop the flag it raised.
    pub fn end_press(&mut self) {
        if self.open {
            self.suppress_toggle = false;
        }
    }

    /// Input gained focus. Returns true when this opened the popup.
    pub fn on_focus(&mut self) -> bool {
        if self.suppress_toggle {
            self.suppress_toggle = false;
            false
        } else {
            self.open()
        }
    }

    pub fn on_blur(&mut self, related: FocusTarget) -> Option<FocusRequest> {
        if !self.open {
            return None;
        }

        if related == FocusTarget::Popup {
            Some(FocusRequest::Popup)
        } else if self.suppress_toggle {
            self.suppress_toggle = false;
            Some(FocusRequest::Input)
        } else {
            self.close()
        }
    }

    /// Enter opens, Escape closes and raises the suppress flag.
    pub fn on_key(&mut self, key: KeyCode) -> (bool, Option<FocusRequest>) {
        match key {
            KeyCode::Enter => (self.open(), None),
            KeyCode::Esc => {
                self.suppress_toggle = true;
                (false, self.close())
            }
            _ => (false, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_opens() {
        let mut visibility = Visibility::new();
        assert!(visibility.on_focus());
        assert!(visibility.is_open());
        assert!(!visibility.on_focus());
    }

    #[test]
    fn test_escape_closes_and_next_focus_does_not_reopen() {
        let mut visibility = Visibility::new();
        visibility.open();

        let (_, request) = visibility.on_key(KeyCode::Esc);
        assert!(!visibility.is_open());
        assert_eq!(request, Some(FocusRequest::Input));
        assert!(visibility.is_suppressed());

        // Host refocuses the input
        assert!(!visibility.on_focus());
        assert!(!visibility.is_open());
        assert!(!visibility.is_suppressed());

        // A later, unrelated focus opens again
        assert!(visibility.on_focus());
    }

    #[test]
    fn test_blur_into_popup_keeps_open() {
        let mut visibility = Visibility::new();
        visibility.open();
        assert_eq!(
            visibility.on_blur(FocusTarget::Popup),
            Some(FocusRequest::Popup)
        );
        assert!(visibility.is_open());
    }

    #[test]
    fn test_blur_with_suppress_refocuses_input() {
        let mut visibility = Visibility::new();
        visibility.open();
        visibility.suppress();

        assert_eq!(
            visibility.on_blur(FocusTarget::Outside),
            Some(FocusRequest::Input)
        );
        assert!(visibility.is_open());
        assert!(!visibility.is_suppressed());

        // The refocus does not toggle anything
        assert!(!visibility.on_focus());
        assert!(visibility.is_open());
    }

    #[test]
    fn test_blur_outside_closes() {
        let mut visibility = Visibility::new();
        visibility.open();
        assert_eq!(visibility.on_blur(FocusTarget::Outside), None);
        assert!(!visibility.is_open());
    }

    #[test]
    fn test_blur_while_closed_is_ignored() {
        let mut visibility = Visibility::new();
        visibility.suppress();
        assert_eq!(visibility.on_blur(FocusTarget::Outside), None);
        assert!(visibility.is_suppressed());
    }

    #[test]
    fn test_enter_opens() {
        let mut visibility = Visibility::new();
        assert_eq!(visibility.on_key(KeyCode::Enter), (true, None));
        assert!(visibility.is_open());
        assert_eq!(visibility.on_key(KeyCode::Char('x')), (false, None));
    }

    #[test]
    fn test_press_ending_open_clears_flag() {
        let mut visibility = Visibility::new();
        visibility.open();
        visibility.suppress();
        visibility.end_press();
        assert!(!visibility.is_suppressed());
        assert_eq!(visibility.on_blur(FocusTarget::Outside), None);
        assert!(!visibility.is_open());
    }

    #[test]
    fn test_press_ending_closed_keeps_flag() {
        let mut visibility = Visibility::new();
        visibility.open();
        visibility.suppress();
        assert_eq!(visibility.close(), Some(FocusRequest::Input));
        visibility.end_press();
        assert!(visibility.is_suppressed());
    }
}
