use std::io::IsTerminal;

use colored::{Color, Colorize};

/// Output styling resolved once per invocation.
#[derive(Debug, Clone)]
pub struct UiStyle {
    pub use_color: bool,
    pub horizontal: char,
    pub color_header: Color,
    pub color_warning: Color,
    pub color_error: Color,
}

impl UiStyle {
    /// Colour only when enabled, stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect(color_enabled: bool) -> Self {
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self {
            use_color: color_enabled && stdout_tty && !no_color,
            ..Self::plain()
        }
    }

    pub fn plain() -> Self {
        Self {
            use_color: false,
            horizontal: '-',
            color_header: Color::BrightBlue,
            color_warning: Color::Yellow,
            color_error: Color::Red,
        }
    }

    pub fn horizontal_line(&self, width: usize) -> String {
        self.horizontal.to_string().repeat(width)
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(text, self.color_header, true)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, self.color_warning, false)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, self.color_error, true)
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.use_color {
            return text.to_string();
        }
        let painted = text.color(color);
        if bold {
            painted.bold().to_string()
        } else {
            painted.to_string()
        }
    }
}
