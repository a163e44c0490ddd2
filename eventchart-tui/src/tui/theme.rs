use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub axis: Color,
    pub alerts: Color,
    pub events: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            axis: Color::Gray,
            alerts: Color::Rgb(0xE8, 0x4B, 0x38), // flame pea
            events: Color::Rgb(0x1E, 0x90, 0xFF), // dodger blue
            error: Color::Red,
        }
    }
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            axis: Color::DarkGray,
            alerts: Color::Rgb(0xC0, 0x39, 0x2B),
            events: Color::Rgb(0x15, 0x65, 0xC0),
            error: Color::Red,
        }
    }
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            axis: Color::Rgb(129, 161, 193),
            alerts: Color::Rgb(191, 97, 106),
            events: Color::Rgb(94, 129, 172),
            error: Color::Rgb(191, 97, 106),
        }
    }
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "nord" => Self::nord(),
            _ => Self::dark(),
        }
    }
    /// resolves a series palette name to this theme's colour
    pub fn series_color(&self, palette: &str) -> Color {
        match palette {
            "flame_pea" => self.alerts,
            "dodger_blue" => self.events,
            _ => self.fg,
        }
    }
}
