//! Terminal palette for the SkyScope CLI.
//!
//! Brand orange for progress, muted greys for detail lines.

use colored::{ColoredString, Colorize, CustomColor};

pub struct Palette;

impl Palette {
    pub const SIGNAL_ORANGE: CustomColor = CustomColor {
        r: 255,
        g: 107,
        b: 0,
    }; // #FF6B00
    pub const SKY: CustomColor = CustomColor {
        r: 110,
        g: 170,
        b: 220,
    };
    pub const CLEAR: CustomColor = CustomColor {
        r: 144,
        g: 190,
        b: 109,
    };
    pub const DENIED: CustomColor = CustomColor {
        r: 200,
        g: 80,
        b: 70,
    };
    pub const STONE: CustomColor = CustomColor {
        r: 128,
        g: 128,
        b: 128,
    };
}

/// Semantic styling for CLI output.
pub trait SiteStyle {
    fn headline(self) -> ColoredString;
    fn progress_fill(self) -> ColoredString;
    fn allowed(self) -> ColoredString;
    fn denied(self) -> ColoredString;
    fn muted(self) -> ColoredString;
}

impl SiteStyle for &str {
    fn headline(self) -> ColoredString {
        self.custom_color(Palette::SKY).bold()
    }

    fn progress_fill(self) -> ColoredString {
        self.custom_color(Palette::SIGNAL_ORANGE)
    }

    fn allowed(self) -> ColoredString {
        self.custom_color(Palette::CLEAR).bold()
    }

    fn denied(self) -> ColoredString {
        self.custom_color(Palette::DENIED).bold()
    }

    fn muted(self) -> ColoredString {
        self.custom_color(Palette::STONE)
    }
}
