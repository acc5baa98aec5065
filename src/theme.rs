use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colours used by the booking form.
///
/// Built from one of the Catppuccin flavors; only the palette entries the
/// form actually draws with are kept.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    base: Color,
    surface0: Color,
    surface1: Color,
    surface2: Color,
    overlay0: Color,
    overlay1: Color,
    text: Color,
    subtext0: Color,
    subtext1: Color,
    mauve: Color,
    red: Color,
    peach: Color,
    green: Color,
    blue: Color,
    lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            subtext1: catppuccin_to_color(&c.subtext1),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            green: catppuccin_to_color(&c.green),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn surface2(&self) -> Color {
        self.surface2
    }

    #[must_use]
    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn subtext1(&self) -> Color {
        self.subtext1
    }

    #[must_use]
    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn peach(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    // Semantic colors
    #[must_use]
    pub const fn primary(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// A named built-in theme.
#[derive(Debug, Clone, Copy)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub theme: Theme,
}

pub fn available_themes() -> Vec<ThemeInfo> {
    vec![
        ThemeInfo { name: "Catppuccin Mocha", theme: Theme::catppuccin_mocha() },
        ThemeInfo { name: "Catppuccin Macchiato", theme: Theme::catppuccin_macchiato() },
        ThemeInfo { name: "Catppuccin Frappé", theme: Theme::catppuccin_frappe() },
        ThemeInfo { name: "Catppuccin Latte", theme: Theme::catppuccin_latte() },
    ]
}

/// Look up a theme by name. Falls back to the first theme if not found.
pub fn theme_from_name(name: &str) -> ThemeInfo {
    let themes = available_themes();
    themes
        .iter()
        .find(|t| t.name == name)
        .copied()
        .unwrap_or(themes[0])
}

/// The theme that follows `name` in [`available_themes`], wrapping around.
///
/// Unknown names start over at the first theme.
pub fn next_theme(name: &str) -> ThemeInfo {
    let themes = available_themes();
    let next = themes
        .iter()
        .position(|t| t.name == name)
        .map_or(0, |i| (i + 1) % themes.len());
    themes[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_theme_wraps_around() {
        assert_eq!(next_theme("Catppuccin Mocha").name, "Catppuccin Macchiato");
        assert_eq!(next_theme("Catppuccin Latte").name, "Catppuccin Mocha");
    }

    #[test]
    fn test_next_theme_unknown_name() {
        assert_eq!(next_theme("Solarized").name, "Catppuccin Mocha");
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(theme_from_name("Catppuccin Latte").name, "Catppuccin Latte");
        assert_eq!(theme_from_name("Solarized").name, "Catppuccin Mocha");
    }
}
