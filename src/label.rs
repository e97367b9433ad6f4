//! Maps a predicted score on the 0-100 scale to a performance level and a
//! pass/fail status.

use crate::utils::round2;
use std::fmt;

/// The scores below this fail.
pub const PASS_MARK: f64 = 60.0;

/// The CGPA scale tops out at this value.
pub const CGPA_SCALE: f64 = 4.0;

/// The display language of labels and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Kurdish,
}

impl Language {
    /// Parse a language code such as "en" or "ku".
    pub fn from_code(code: &str) -> Option<Language> {
        match code.to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "ku" | "ckb" | "kurdish" => Some(Language::Kurdish),
            _ => None,
        }
    }
}

/// Performance levels, from the lowest to the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PerformanceLevel {
    NeedsImprovement,
    Average,
    Good,
    VeryGood,
    Excellent,
}

impl PerformanceLevel {
    /// Classify 'score'. The lower bound of every level is inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            PerformanceLevel::Excellent
        } else if score >= 80.0 {
            PerformanceLevel::VeryGood
        } else if score >= 70.0 {
            PerformanceLevel::Good
        } else if score >= PASS_MARK {
            PerformanceLevel::Average
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }

    pub fn name(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (PerformanceLevel::Excellent, Language::English) => "Excellent",
            (PerformanceLevel::VeryGood, Language::English) => "Very Good",
            (PerformanceLevel::Good, Language::English) => "Good",
            (PerformanceLevel::Average, Language::English) => "Average",
            (PerformanceLevel::NeedsImprovement, Language::English) => {
                "Needs Improvement"
            }
            (PerformanceLevel::Excellent, Language::Kurdish) => "نایاب",
            (PerformanceLevel::VeryGood, Language::Kurdish) => "زۆر باش",
            (PerformanceLevel::Good, Language::Kurdish) => "باش",
            (PerformanceLevel::Average, Language::Kurdish) => "مامناوەند",
            (PerformanceLevel::NeedsImprovement, Language::Kurdish) => {
                "پێویستی بە باشترکردن هەیە"
            }
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name(Language::English))
    }
}

/// Whether a score passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Pass,
    Fail,
}

impl PassStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= PASS_MARK {
            PassStatus::Pass
        } else {
            PassStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        *self == PassStatus::Pass
    }

    pub fn name(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (PassStatus::Pass, Language::English) => "Pass",
            (PassStatus::Fail, Language::English) => "Fail",
            (PassStatus::Pass, Language::Kurdish) => "تێپەڕ",
            (PassStatus::Fail, Language::Kurdish) => "شکست",
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name(Language::English))
    }
}

/// A score rounded to two decimals, with its level and status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub level: PerformanceLevel,
    pub status: PassStatus,
}

impl Assessment {
    /// Round 'score' to two decimals and classify the rounded value.
    pub fn from_score(score: f64) -> Self {
        let score = round2(score);
        Self {
            score,
            level: PerformanceLevel::from_score(score),
            status: PassStatus::from_score(score),
        }
    }
}

/// Convert a CGPA on the 0-4.0 scale to a percentage.
pub fn cgpa_to_percentage(cgpa: f64) -> f64 {
    (cgpa / CGPA_SCALE) * 100.0
}
