use crossterm::style::Color as CrosstermColor;
use ratatui::style::{Color as RatatuiColor, Modifier, Style as RatatuiStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Primary colors
    pub primary: ColorPair,
    pub primary_light: ColorPair,

    // Day states
    pub selected: ColorPair,
    pub today: ColorPair,
    pub weekend: ColorPair,
    pub disabled: ColorPair,
    pub normal_day: ColorPair,

    // Popup
    pub border: ColorPair,
    pub header: ColorPair,
    pub overlay: ColorPair,

    // Input
    pub input: ColorPair,
    pub input_focused: ColorPair,
    pub placeholder: ColorPair,
    pub label: ColorPair,

    // Text
    pub help_text: ColorPair,
    pub error_text: ColorPair,
}

#[derive(Debug, Clone)]
pub struct ColorPair {
    pub fg: CrosstermColor,
    pub bg: Option<CrosstermColor>,
}

impl ColorPair {
    pub fn new(fg: CrosstermColor) -> Self {
        Self { fg, bg: None }
    }

    pub fn with_bg(fg: CrosstermColor, bg: CrosstermColor) -> Self {
        Self { fg, bg: Some(bg) }
    }

    /// Convert to ratatui style
    pub fn to_ratatui(&self) -> RatatuiStyle {
        let mut style = RatatuiStyle::default().fg(self.crossterm_to_ratatui(self.fg));
        if let Some(bg) = self.bg {
            style = style.bg(self.crossterm_to_ratatui(bg));
        }
        style
    }

    /// Convert crossterm color to ratatui color
    pub fn crossterm_to_ratatui(&self, color: CrosstermColor) -> RatatuiColor {
        match color {
            CrosstermColor::Black => RatatuiColor::Black,
            CrosstermColor::DarkRed => RatatuiColor::Red,
            CrosstermColor::DarkGreen => RatatuiColor::Green,
            CrosstermColor::DarkYellow => RatatuiColor::Yellow,
            CrosstermColor::DarkBlue => RatatuiColor::Blue,
            CrosstermColor::DarkMagenta => RatatuiColor::Magenta,
            CrosstermColor::DarkCyan => RatatuiColor::Cyan,
            CrosstermColor::Grey => RatatuiColor::Gray,
            CrosstermColor::DarkGrey => RatatuiColor::DarkGray,
            CrosstermColor::Red => RatatuiColor::LightRed,
            CrosstermColor::Green => RatatuiColor::LightGreen,
            CrosstermColor::Yellow => RatatuiColor::LightYellow,
            CrosstermColor::Blue => RatatuiColor::LightBlue,
            CrosstermColor::Magenta => RatatuiColor::LightMagenta,
            CrosstermColor::Cyan => RatatuiColor::LightCyan,
            CrosstermColor::White => RatatuiColor::White,
            CrosstermColor::Rgb { r, g, b } => RatatuiColor::Rgb(r, g, b),
            CrosstermColor::AnsiValue(v) => RatatuiColor::Indexed(v),
            _ => RatatuiColor::White,
        }
    }

    /// Convert to ratatui style with modifier
    pub fn to_ratatui_with_modifier(&self, modifier: Modifier) -> RatatuiStyle {
        self.to_ratatui().add_modifier(modifier)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                primary: ColorPair::with_bg(CrosstermColor::Black, CrosstermColor::Cyan),
                primary_light: ColorPair::with_bg(
                    CrosstermColor::White,
                    CrosstermColor::Rgb { r: 0, g: 70, b: 80 },
                ),

                selected: ColorPair::with_bg(CrosstermColor::Black, CrosstermColor::DarkCyan),
                today: ColorPair::new(CrosstermColor::Yellow),
                weekend: ColorPair::new(CrosstermColor::Rgb { r: 150, g: 150, b: 150 }),
                disabled: ColorPair::new(CrosstermColor::DarkGrey),
                normal_day: ColorPair::new(CrosstermColor::White),

                border: ColorPair::new(CrosstermColor::DarkCyan),
                header: ColorPair::new(CrosstermColor::DarkCyan),
                overlay: ColorPair::new(CrosstermColor::DarkGrey),

                input: ColorPair::new(CrosstermColor::Grey),
                input_focused: ColorPair::new(CrosstermColor::Cyan),
                placeholder: ColorPair::new(CrosstermColor::DarkGrey),
                label: ColorPair::new(CrosstermColor::White),

                help_text: ColorPair::new(CrosstermColor::DarkCyan),
                error_text: ColorPair::new(CrosstermColor::Red),
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                primary: ColorPair::with_bg(CrosstermColor::White, CrosstermColor::DarkBlue),
                primary_light: ColorPair::with_bg(
                    CrosstermColor::Black,
                    CrosstermColor::Rgb { r: 200, g: 215, b: 240 },
                ),

                selected: ColorPair::with_bg(CrosstermColor::White, CrosstermColor::DarkBlue),
                today: ColorPair::new(CrosstermColor::DarkRed),
                weekend: ColorPair::new(CrosstermColor::DarkGrey),
                disabled: ColorPair::new(CrosstermColor::Grey),
                normal_day: ColorPair::new(CrosstermColor::Black),

                border: ColorPair::new(CrosstermColor::DarkBlue),
                header: ColorPair::new(CrosstermColor::DarkBlue),
                overlay: ColorPair::new(CrosstermColor::Grey),

                input: ColorPair::new(CrosstermColor::DarkGrey),
                input_focused: ColorPair::new(CrosstermColor::DarkBlue),
                placeholder: ColorPair::new(CrosstermColor::Grey),
                label: ColorPair::new(CrosstermColor::Black),

                help_text: ColorPair::new(CrosstermColor::DarkBlue),
                error_text: ColorPair::new(CrosstermColor::DarkRed),
            },
        }
    }

    pub fn minimal() -> Self {
        Self {
            name: "Minimal".to_string(),
            colors: ThemeColors {
                primary: ColorPair::with_bg(CrosstermColor::Black, CrosstermColor::White),
                primary_light: ColorPair::with_bg(
                    CrosstermColor::White,
                    CrosstermColor::Rgb { r: 60, g: 60, b: 60 },
                ),

                selected: ColorPair::with_bg(CrosstermColor::Black, CrosstermColor::White),
                today: ColorPair::new(CrosstermColor::White),
                weekend: ColorPair::new(CrosstermColor::Grey),
                disabled: ColorPair::new(CrosstermColor::DarkGrey),
                normal_day: ColorPair::new(CrosstermColor::White),

                border: ColorPair::new(CrosstermColor::White),
                header: ColorPair::new(CrosstermColor::White),
                overlay: ColorPair::new(CrosstermColor::DarkGrey),

                input: ColorPair::new(CrosstermColor::Grey),
                input_focused: ColorPair::new(CrosstermColor::White),
                placeholder: ColorPair::new(CrosstermColor::DarkGrey),
                label: ColorPair::new(CrosstermColor::White),

                help_text: ColorPair::new(CrosstermColor::Grey),
                error_text: ColorPair::new(CrosstermColor::White),
            },
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "minimal" => Self::minimal(),
            "dark" => Self::dark(),
            other => {
                log::warn!("Unknown theme '{}', falling back to dark", other);
                Self::dark()
            }
        }
    }

    pub fn available_themes() -> Vec<String> {
        vec!["dark".to_string(), "light".to_string(), "minimal".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(Theme::by_name("LIGHT").name, "Light");
        assert_eq!(Theme::by_name("Minimal").name, "Minimal");
    }

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::by_name("solarized").name, "Dark");
    }

    #[test]
    fn test_color_pair_conversion() {
        let pair = ColorPair::with_bg(CrosstermColor::DarkBlue, CrosstermColor::Rgb { r: 1, g: 2, b: 3 });
        let style = pair.to_ratatui();
        assert_eq!(style.fg, Some(RatatuiColor::Blue));
        assert_eq!(style.bg, Some(RatatuiColor::Rgb(1, 2, 3)));
    }
}
