//! Scoring and Heuristic Rule Tables
//!
//! Every constant that shapes confidence scoring or keyword extraction lives here,
//! so the rules can be audited and tested without reading control flow.
//!
//! ## Quality path (structured extraction succeeded)
//!
//! | Category               | Weighted quality fields                           | Bonuses                                                       |
//! |------------------------|---------------------------------------------------|---------------------------------------------------------------|
//! | Technical Architecture | technical .40, data model .30, integration .20, project type .10 | +10 >3 tech reqs, +10 data reqs, +10 integrations |
//! | User Experience        | user depth .40, features .30, problem .20, project type .10 | +15 user flows, +10 >3 features                     |
//! | Business Logic         | project type .30, problem .30, user depth .25, features .15 | +10 business goals, +5 constraints                  |
//! | Security & Compliance  | security .70                                      | +15 per security need (max 30), +20 auth-like feature         |
//! | Performance & Scaling  | performance .70                                   | +20 per perf need (max 30), +10 >5 features, +10 >2 integrations, +10 >2 data reqs |
//!
//! ## Fallback path (no quality scores)
//!
//! Presence and count rules only; see [`FALLBACK_RULES`].

use crate::confidence::ConfidenceCategory;
use crate::context::{ListField, QualityField, ScalarField, SpecificationContext};

/// Overall confidence required before specification generation is offered.
pub const GENERATION_THRESHOLD: u8 = 80;

/// Environment setup is completed before the conversation starts.
pub const DEVELOPMENT_ENVIRONMENT_SCORE: u8 = 100;

/// One weighted quality-score input
#[derive(Debug, Clone, Copy)]
pub struct Weight {
    pub field: QualityField,
    pub weight: f64,
}

/// Fixed point increments derived from context fields
#[derive(Debug, Clone, Copy)]
pub enum Bonus {
    /// Flat points when the scalar is set
    ScalarPresent { field: ScalarField, points: u32 },
    /// Flat points when the list holds more than `count` entries
    MoreThan {
        field: ListField,
        count: usize,
        points: u32,
    },
    /// Points per entry, optionally capped
    PerEntry {
        field: ListField,
        points: u32,
        cap: Option<u32>,
    },
    /// Flat points when any entry contains one of the needles
    AnyEntryContains {
        field: ListField,
        needles: &'static [&'static str],
        ignore_case: bool,
        points: u32,
    },
}

impl Bonus {
    /// Points this bonus awards for `context`
    pub fn award(&self, context: &SpecificationContext) -> u32 {
        match *self {
            Bonus::ScalarPresent { field, points } => {
                if context.scalar(field).is_some_and(|v| !v.trim().is_empty()) {
                    points
                } else {
                    0
                }
            }
            Bonus::MoreThan {
                field,
                count,
                points,
            } => {
                if context.list(field).len() > count {
                    points
                } else {
                    0
                }
            }
            Bonus::PerEntry { field, points, cap } => {
                let entries = u32::try_from(context.list(field).len()).unwrap_or(u32::MAX);
                let total = entries.saturating_mul(points);
                cap.map_or(total, |c| total.min(c))
            }
            Bonus::AnyEntryContains {
                field,
                needles,
                ignore_case,
                points,
            } => {
                let hit = context.list(field).iter().any(|entry| {
                    let entry = if ignore_case {
                        entry.to_lowercase()
                    } else {
                        entry.clone()
                    };
                    needles.iter().any(|n| entry.contains(n))
                });
                if hit {
                    points
                } else {
                    0
                }
            }
        }
    }
}

/// Scoring rule for one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: ConfidenceCategory,
    pub weights: &'static [Weight],
    pub bonuses: &'static [Bonus],
}

impl CategoryRule {
    /// Weighted sum plus bonuses, before rounding and clamping
    pub fn raw_score(&self, context: &SpecificationContext) -> f64 {
        let weighted: f64 = self
            .weights
            .iter()
            .map(|w| context.quality_scores.get(w.field).unwrap_or(0) as f64 * w.weight)
            .sum();
        let bonus: u32 = self
            .bonuses
            .iter()
            .map(|b| b.award(context))
            .fold(0u32, u32::saturating_add);
        weighted + bonus as f64
    }
}

/// Both scoring paths
#[derive(Debug, Clone, Copy)]
pub struct ScoringTable {
    pub quality: &'static [CategoryRule],
    pub fallback: &'static [CategoryRule],
}

impl ScoringTable {
    /// Rule set for a context: the quality path once any quality score exists
    pub fn rules_for(&self, context: &SpecificationContext) -> &'static [CategoryRule] {
        if context.quality_scores.is_empty() {
            self.fallback
        } else {
            self.quality
        }
    }
}

const AUTH_NEEDLES: &[&str] = &["auth", "login", "user accounts"];

pub static QUALITY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ConfidenceCategory::TechnicalArchitecture,
        weights: &[
            Weight { field: QualityField::TechnicalSpecificity, weight: 0.4 },
            Weight { field: QualityField::DataModelClarity, weight: 0.3 },
            Weight { field: QualityField::IntegrationClarity, weight: 0.2 },
            Weight { field: QualityField::ProjectTypeClarity, weight: 0.1 },
        ],
        bonuses: &[
            Bonus::MoreThan { field: ListField::TechnicalRequirements, count: 3, points: 10 },
            Bonus::MoreThan { field: ListField::DataRequirements, count: 0, points: 10 },
            Bonus::MoreThan { field: ListField::Integrations, count: 0, points: 10 },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::UserExperience,
        weights: &[
            Weight { field: QualityField::UserDefinitionDepth, weight: 0.4 },
            Weight { field: QualityField::FeatureSpecificity, weight: 0.3 },
            Weight { field: QualityField::ProblemDefinitionDepth, weight: 0.2 },
            Weight { field: QualityField::ProjectTypeClarity, weight: 0.1 },
        ],
        bonuses: &[
            Bonus::MoreThan { field: ListField::UserFlows, count: 0, points: 15 },
            Bonus::MoreThan { field: ListField::KeyFeatures, count: 3, points: 10 },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::BusinessLogic,
        weights: &[
            Weight { field: QualityField::ProjectTypeClarity, weight: 0.3 },
            Weight { field: QualityField::ProblemDefinitionDepth, weight: 0.3 },
            Weight { field: QualityField::UserDefinitionDepth, weight: 0.25 },
            Weight { field: QualityField::FeatureSpecificity, weight: 0.15 },
        ],
        bonuses: &[
            Bonus::MoreThan { field: ListField::BusinessGoals, count: 0, points: 10 },
            Bonus::MoreThan { field: ListField::Constraints, count: 0, points: 5 },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::SecurityCompliance,
        weights: &[Weight { field: QualityField::SecurityConsiderations, weight: 0.7 }],
        bonuses: &[
            Bonus::PerEntry { field: ListField::SecurityNeeds, points: 15, cap: Some(30) },
            Bonus::AnyEntryContains {
                field: ListField::KeyFeatures,
                needles: AUTH_NEEDLES,
                ignore_case: true,
                points: 20,
            },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::PerformanceScaling,
        weights: &[Weight { field: QualityField::PerformanceConsiderations, weight: 0.7 }],
        bonuses: &[
            Bonus::PerEntry { field: ListField::PerformanceNeeds, points: 20, cap: Some(30) },
            Bonus::MoreThan { field: ListField::KeyFeatures, count: 5, points: 10 },
            Bonus::MoreThan { field: ListField::Integrations, count: 2, points: 10 },
            Bonus::MoreThan { field: ListField::DataRequirements, count: 2, points: 10 },
        ],
    },
];

pub static FALLBACK_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ConfidenceCategory::TechnicalArchitecture,
        weights: &[],
        bonuses: &[
            Bonus::ScalarPresent { field: ScalarField::ProjectType, points: 20 },
            Bonus::PerEntry { field: ListField::TechnicalRequirements, points: 15, cap: Some(60) },
            Bonus::MoreThan { field: ListField::DataRequirements, count: 0, points: 20 },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::UserExperience,
        weights: &[],
        bonuses: &[
            Bonus::ScalarPresent { field: ScalarField::TargetUsers, points: 30 },
            Bonus::PerEntry { field: ListField::UserFlows, points: 20, cap: Some(40) },
            Bonus::MoreThan { field: ListField::KeyFeatures, count: 2, points: 30 },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::BusinessLogic,
        weights: &[],
        bonuses: &[
            Bonus::ScalarPresent { field: ScalarField::ProjectType, points: 30 },
            Bonus::ScalarPresent { field: ScalarField::MainProblem, points: 25 },
            Bonus::ScalarPresent { field: ScalarField::TargetUsers, points: 25 },
            Bonus::PerEntry { field: ListField::KeyFeatures, points: 5, cap: Some(20) },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::SecurityCompliance,
        weights: &[],
        bonuses: &[
            Bonus::PerEntry { field: ListField::SecurityNeeds, points: 25, cap: None },
            Bonus::AnyEntryContains {
                field: ListField::KeyFeatures,
                needles: AUTH_NEEDLES,
                ignore_case: false,
                points: 40,
            },
        ],
    },
    CategoryRule {
        category: ConfidenceCategory::PerformanceScaling,
        weights: &[],
        bonuses: &[
            Bonus::PerEntry { field: ListField::PerformanceNeeds, points: 30, cap: None },
            Bonus::ScalarPresent { field: ScalarField::ProjectType, points: 20 },
        ],
    },
];

pub static SCORING_TABLE: ScoringTable = ScoringTable {
    quality: QUALITY_RULES,
    fallback: FALLBACK_RULES,
};

/// Project type assigned when any keyword appears in the conversation
#[derive(Debug, Clone, Copy)]
pub struct ProjectTypeRule {
    pub project_type: &'static str,
    pub keywords: &'static [&'static str],
}

/// Evaluated in order; first match wins.
pub static PROJECT_TYPE_RULES: &[ProjectTypeRule] = &[
    ProjectTypeRule {
        project_type: "Agricultural/Farm Website",
        keywords: &["farm", "agriculture", "regenerative"],
    },
    ProjectTypeRule {
        project_type: "E-commerce Platform",
        keywords: &["e-commerce", "shop", "store"],
    },
    ProjectTypeRule {
        project_type: "Educational Platform",
        keywords: &["course", "education", "learning"],
    },
    ProjectTypeRule {
        project_type: "Web Application",
        keywords: &["web app", "website"],
    },
    ProjectTypeRule {
        project_type: "Mobile Application",
        keywords: &["mobile app", "ios", "android"],
    },
];

/// Feature vocabulary recognised by the keyword fallback, in output order
pub static FEATURE_KEYWORDS: &[&str] = &[
    "user accounts",
    "authentication",
    "login",
    "register",
    "signup",
    "payments",
    "checkout",
    "billing",
    "subscriptions",
    "real-time",
    "live updates",
    "notifications",
    "chat",
    "messaging",
    "search",
    "filtering",
    "dashboard",
    "analytics",
    "reports",
    "upload",
    "file sharing",
    "photos",
    "images",
    "media",
    "calendar",
    "scheduling",
    "booking",
    "appointments",
    "social",
    "sharing",
    "comments",
    "likes",
    "reviews",
    // agriculture
    "iot sensors",
    "weather data",
    "soil monitoring",
    "crop tracking",
    "livestock management",
    "irrigation",
    "harvest tracking",
    // education
    "course management",
    "video content",
    "progress tracking",
    "certificates",
    "discussion forums",
    "assignments",
    "quizzes",
];
