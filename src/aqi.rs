// Air-Sentinel - Air Quality Classification
//
// Maps a smoothed PM2.5 concentration (ug/m3) onto the six US EPA AQI
// breakpoints. The level index doubles as the indicator line to drive.

use crate::config::CATEGORY_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Inclusive upper bounds for every category but the last.
const BREAKPOINTS: [(f32, Category); CATEGORY_COUNT - 1] = [
    (12.0, Category::Good),
    (35.4, Category::Moderate),
    (55.4, Category::UnhealthySensitive),
    (150.4, Category::Unhealthy),
    (250.4, Category::VeryUnhealthy),
];

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthySensitive,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Moderate => "MODERATE",
            Self::UnhealthySensitive => "UNHEALTHY-S",
            Self::Unhealthy => "UNHEALTHY",
            Self::VeryUnhealthy => "V. UNHEALTHY",
            Self::Hazardous => "HAZARDOUS",
        }
    }

    /// Output-line index, 0 (GOOD) ..= 5 (HAZARDOUS).
    pub fn level(self) -> usize {
        self as usize
    }
}

/// Total over every `f32`: NaN falls through to the top category.
pub fn classify(concentration: f32) -> Category {
    BREAKPOINTS
        .iter()
        .find(|(upper, _)| concentration <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Hazardous)
}
