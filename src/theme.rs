use crate::logger;
use crate::storage::LocalStore;
use ratatui::style::Color;

pub const THEME_STORAGE_KEY: &str = "stunotes-ui-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "system" => Some(ThemeMode::System),
            _ => None,
        }
    }

    /// Light -> Dark -> System -> Light
    pub fn cycle(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub border: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        fg: Color::White,
        muted: Color::Gray,
        accent: Color::Cyan,
        highlight: Color::Yellow,
        success: Color::Green,
        warning: Color::Yellow,
        danger: Color::Red,
        border: Color::DarkGray,
    };

    pub const LIGHT: Palette = Palette {
        fg: Color::Black,
        muted: Color::DarkGray,
        accent: Color::Blue,
        highlight: Color::Magenta,
        success: Color::Green,
        warning: Color::Rgb(180, 110, 0),
        danger: Color::Red,
        border: Color::Gray,
    };
}

/// `COLORFGBG` is "fg;bg" (sometimes "fg;default;bg"); backgrounds 7 and 15
/// are light.
fn system_prefers_light(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg == 7 || bg == 15)
}

#[derive(Debug, Clone)]
pub struct ThemeContext {
    mode: ThemeMode,
    store: LocalStore,
}

impl ThemeContext {
    /// Load the saved mode, falling back to dark.
    pub fn load(store: LocalStore) -> Self {
        let mode = store
            .get(THEME_STORAGE_KEY)
            .and_then(|value| ThemeMode::parse(&value))
            .unwrap_or_default();
        Self { mode, store }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.mode = mode;
        if let Err(e) = self.store.set(THEME_STORAGE_KEY, mode.as_str()) {
            logger::warn(&format!("Failed to save theme preference: {}", e));
        }
    }

    pub fn cycle(&mut self) {
        self.set_mode(self.mode.cycle());
    }

    pub fn palette(&self) -> Palette {
        self.palette_with(std::env::var("COLORFGBG").ok().as_deref())
    }

    fn palette_with(&self, colorfgbg: Option<&str>) -> Palette {
        let light = match self.mode {
            ThemeMode::Light => true,
            ThemeMode::Dark => false,
            ThemeMode::System => system_prefers_light(colorfgbg),
        };
        if light { Palette::LIGHT } else { Palette::DARK }
    }
}
