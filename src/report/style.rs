//! Threshold-based coloring for terminal output.
//!
//! Tone selection is a pure function of `(value, thresholds)`; the palette
//! turns a tone into ANSI styling, or nothing when color is off.

use crossterm::style::{ContentStyle, Stylize};

use crate::domain::Policy;

/// Visual emphasis for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    /// A notably good value.
    Strong,
    Positive,
    Muted,
    Highlight,
}

/// Rolling windows up to this many days use the short-window cutoffs.
pub const SHORT_WINDOW_DAYS: u32 = 7;

/// Coloring cutoffs for one report flavor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Daily revenue above this is emphasized (no strong tier when `None`).
    pub strong_revenue: Option<f64>,
    /// Reported daily CPM above this is highlighted.
    pub highlight_cpm: f64,
}

impl Thresholds {
    pub fn for_policy(policy: &Policy) -> Self {
        match policy {
            Policy::RollingWindow { days } if *days <= SHORT_WINDOW_DAYS => Self {
                strong_revenue: Some(12.0),
                highlight_cpm: 0.6,
            },
            Policy::AllTime { .. } | Policy::RollingWindow { .. } => Self {
                strong_revenue: None,
                highlight_cpm: 0.5,
            },
            Policy::MonthlyGrouped { .. } => Self {
                strong_revenue: Some(12.0),
                highlight_cpm: 0.8,
            },
            Policy::HalfMonthSplit => Self {
                strong_revenue: Some(12.0),
                highlight_cpm: 0.6,
            },
        }
    }
}

pub fn revenue_tone(revenue: f64, thresholds: &Thresholds) -> Tone {
    match thresholds.strong_revenue {
        Some(strong) if revenue > strong => Tone::Strong,
        _ if revenue > 0.0 => Tone::Positive,
        _ => Tone::Muted,
    }
}

pub fn cpm_tone(cpm: f64, thresholds: &Thresholds) -> Tone {
    if cpm > thresholds.highlight_cpm {
        Tone::Highlight
    } else {
        Tone::Plain
    }
}

/// Applies tones as ANSI styles when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Color on unless `NO_COLOR` is set (any value).
    pub fn from_env(requested: bool) -> Self {
        Self::new(requested && std::env::var_os("NO_COLOR").is_none())
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let style = match tone {
            Tone::Plain => return text.to_string(),
            Tone::Heading => ContentStyle::new().cyan().bold(),
            Tone::Strong => ContentStyle::new().green().bold(),
            Tone::Positive => ContentStyle::new().green(),
            Tone::Muted => ContentStyle::new().dark_grey(),
            Tone::Highlight => ContentStyle::new().yellow(),
        };
        style.apply(text).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_tones_with_strong_tier() {
        let t = Thresholds::for_policy(&Policy::HalfMonthSplit);
        assert_eq!(revenue_tone(12.5, &t), Tone::Strong);
        assert_eq!(revenue_tone(12.0, &t), Tone::Positive);
        assert_eq!(revenue_tone(0.01, &t), Tone::Positive);
        assert_eq!(revenue_tone(0.0, &t), Tone::Muted);
    }

    #[test]
    fn revenue_tones_without_strong_tier() {
        let t = Thresholds::for_policy(&Policy::RollingWindow { days: 30 });
        assert_eq!(revenue_tone(500.0, &t), Tone::Positive);
    }

    #[test]
    fn short_rolling_window_uses_strong_tier() {
        let week = Thresholds::for_policy(&Policy::RollingWindow { days: 7 });
        assert_eq!(revenue_tone(13.0, &week), Tone::Strong);
        assert_eq!(cpm_tone(0.55, &week), Tone::Plain);
        assert_eq!(cpm_tone(0.65, &week), Tone::Highlight);

        let month = Thresholds::for_policy(&Policy::RollingWindow { days: 8 });
        assert_eq!(revenue_tone(13.0, &month), Tone::Positive);
        assert_eq!(cpm_tone(0.55, &month), Tone::Highlight);
    }

    #[test]
    fn cpm_highlight_is_per_policy() {
        let monthly = Thresholds::for_policy(&Policy::MonthlyGrouped { days: 90 });
        let half = Thresholds::for_policy(&Policy::HalfMonthSplit);
        assert_eq!(cpm_tone(0.7, &monthly), Tone::Plain);
        assert_eq!(cpm_tone(0.7, &half), Tone::Highlight);
        assert_eq!(cpm_tone(0.6, &half), Tone::Plain);
    }

    #[test]
    fn disabled_palette_is_plain_text() {
        assert_eq!(Palette::plain().paint("$1.000", Tone::Strong), "$1.000");
    }

    #[test]
    fn enabled_palette_wraps_in_ansi() {
        let painted = Palette::new(true).paint("x", Tone::Strong);
        assert!(painted.contains('\u{1b}'));
        assert!(painted.contains('x'));
        assert_eq!(Palette::new(true).paint("x", Tone::Plain), "x");
    }
}
