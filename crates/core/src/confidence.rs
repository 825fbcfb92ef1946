//! Confidence Scoring
//!
//! Summarises how complete a [`SpecificationContext`] is in six categories.
//! Each turn is scored from scratch; there is no incremental state.

use serde::{Deserialize, Serialize};

use crate::context::SpecificationContext;
use crate::rules::{ScoringTable, DEVELOPMENT_ENVIRONMENT_SCORE, GENERATION_THRESHOLD, SCORING_TABLE};

/// The six scored categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceCategory {
    TechnicalArchitecture,
    UserExperience,
    BusinessLogic,
    DevelopmentEnvironment,
    SecurityCompliance,
    PerformanceScaling,
}

impl ConfidenceCategory {
    pub const ALL: [ConfidenceCategory; 6] = [
        Self::TechnicalArchitecture,
        Self::UserExperience,
        Self::BusinessLogic,
        Self::DevelopmentEnvironment,
        Self::SecurityCompliance,
        Self::PerformanceScaling,
    ];

    /// Get the display label for this category
    pub fn label(&self) -> &'static str {
        match self {
            Self::TechnicalArchitecture => "Technical Architecture",
            Self::UserExperience => "User Experience",
            Self::BusinessLogic => "Business Logic",
            Self::DevelopmentEnvironment => "Development Environment",
            Self::SecurityCompliance => "Security & Compliance",
            Self::PerformanceScaling => "Performance & Scaling",
        }
    }

    /// Short description of what the category covers
    pub fn description(&self) -> &'static str {
        match self {
            Self::TechnicalArchitecture => "Platform, database, API design",
            Self::UserExperience => "UI/UX, workflows, accessibility",
            Self::BusinessLogic => "Features, requirements, rules",
            Self::DevelopmentEnvironment => "Tools, setup, configuration",
            Self::SecurityCompliance => "Authentication, data protection",
            Self::PerformanceScaling => "Speed, capacity, optimization",
        }
    }
}

/// Progress label shown next to a category score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    NotStarted,
    Started,
    InProgress,
    Complete,
}

impl CategoryStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Complete,
            40..=79 => Self::InProgress,
            1..=39 => Self::Started,
            0 => Self::NotStarted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Started => "Started",
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
        }
    }
}

/// Category scores, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMetrics {
    pub technical_architecture: u8,
    pub user_experience: u8,
    pub business_logic: u8,
    pub development_environment: u8,
    pub security_compliance: u8,
    pub performance_scaling: u8,
}

impl Default for ConfidenceMetrics {
    /// Session start: only the development environment is complete
    fn default() -> Self {
        Self {
            technical_architecture: 0,
            user_experience: 0,
            business_logic: 0,
            development_environment: DEVELOPMENT_ENVIRONMENT_SCORE,
            security_compliance: 0,
            performance_scaling: 0,
        }
    }
}

impl ConfidenceMetrics {
    pub fn get(&self, category: ConfidenceCategory) -> u8 {
        match category {
            ConfidenceCategory::TechnicalArchitecture => self.technical_architecture,
            ConfidenceCategory::UserExperience => self.user_experience,
            ConfidenceCategory::BusinessLogic => self.business_logic,
            ConfidenceCategory::DevelopmentEnvironment => self.development_environment,
            ConfidenceCategory::SecurityCompliance => self.security_compliance,
            ConfidenceCategory::PerformanceScaling => self.performance_scaling,
        }
    }

    fn set(&mut self, category: ConfidenceCategory, value: u8) {
        match category {
            ConfidenceCategory::TechnicalArchitecture => self.technical_architecture = value,
            ConfidenceCategory::UserExperience => self.user_experience = value,
            ConfidenceCategory::BusinessLogic => self.business_logic = value,
            ConfidenceCategory::DevelopmentEnvironment => self.development_environment = value,
            ConfidenceCategory::SecurityCompliance => self.security_compliance = value,
            ConfidenceCategory::PerformanceScaling => self.performance_scaling = value,
        }
    }

    /// Arithmetic mean of the six categories, rounded to the nearest integer
    pub fn overall(&self) -> u8 {
        let sum: u32 = ConfidenceCategory::ALL
            .iter()
            .map(|c| u32::from(self.get(*c)))
            .sum();
        let mean = sum as f64 / ConfidenceCategory::ALL.len() as f64;
        mean.round() as u8
    }

    /// Whether the overall confidence unlocks specification generation
    pub fn can_generate_spec(&self) -> bool {
        can_generate_spec(self.overall())
    }
}

/// The sole generation gate: overall confidence of at least [`GENERATION_THRESHOLD`]
pub fn can_generate_spec(overall: u8) -> bool {
    overall >= GENERATION_THRESHOLD
}

/// Score a context with the built-in rule table
pub fn score(context: &SpecificationContext) -> ConfidenceMetrics {
    score_with(&SCORING_TABLE, context)
}

/// Score a context with an explicit rule table
pub fn score_with(table: &ScoringTable, context: &SpecificationContext) -> ConfidenceMetrics {
    let rules = table.rules_for(context);
    let mut metrics = ConfidenceMetrics {
        technical_architecture: 0,
        user_experience: 0,
        business_logic: 0,
        development_environment: DEVELOPMENT_ENVIRONMENT_SCORE,
        security_compliance: 0,
        performance_scaling: 0,
    };

    for rule in rules {
        if rule.category == ConfidenceCategory::DevelopmentEnvironment {
            continue;
        }
        metrics.set(rule.category, clamp_score(rule.raw_score(context)));
    }

    metrics
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
