//! Matchday theme: dark pitch greys with a floodlight accent.

use ratatui::style::Color;

pub struct Theme;

impl Theme {
    // Palette

    /// Maximum emphasis
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Primary text
    pub const GREY_100: Color = Color::Rgb(236, 242, 236);

    /// Secondary text
    pub const GREY_200: Color = Color::Rgb(212, 222, 212);

    /// Muted text, field labels
    pub const GREY_400: Color = Color::Rgb(148, 160, 150);

    /// Borders, separators
    pub const GREY_500: Color = Color::Rgb(110, 124, 112);

    /// Dim borders, empty gauge track
    pub const GREY_600: Color = Color::Rgb(62, 74, 64);

    /// Pill and key-cap backgrounds
    pub const GREY_700: Color = Color::Rgb(36, 46, 38);

    /// Deepest background
    pub const GREY_900: Color = Color::Rgb(12, 18, 14);

    pub const BG: Color = Self::GREY_900;

    // Accents

    /// Success toasts, ready status
    pub const GREEN: Color = Color::Rgb(96, 200, 120);

    /// Errors (red card)
    pub const RED: Color = Color::Rgb(226, 84, 84);

    /// Cooldown, outcome tags (yellow card)
    pub const YELLOW: Color = Color::Rgb(250, 214, 64);

    /// Focus and gauge fill
    pub const ACCENT: Color = Color::Rgb(190, 230, 255);

    pub const LOGO: &'static str = "𝘮 𝘢 𝘵 𝘤 𝘩 𝘥 𝘢 𝘺";

    /// Card marker for outcome scorelines
    pub const OUTCOME_BULLET: char = '●';
}
