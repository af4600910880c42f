use inksac::prelude::*;

/// Colors error messages written to stderr. Protocol output on stdout is never styled.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    color_support: ColorSupport,
}

impl Highlighter {
    pub fn new(enabled: bool) -> Self {
        let color_support = if enabled {
            check_color_support().unwrap_or(ColorSupport::NoColor)
        } else {
            ColorSupport::NoColor
        };
        Self { color_support }
    }

    pub fn highlight_error(&self, error: &str) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return error.to_string();
        }

        let error_style = Style::builder().foreground(Color::Red).bold().build();

        error.style(error_style).to_string()
    }
}
