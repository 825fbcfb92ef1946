//! Specification Context
//!
//! The structured facts accumulated from a conversation, and the pure merge that
//! folds each new extraction into the running record.
//!
//! ## Merge rules
//!
//! - Scalars are replaced only by a non-blank extracted value; never cleared.
//! - Lists are concatenated and deduplicated (exact, case-sensitive match),
//!   keeping the first occurrence.
//! - Quality scores are shallow-merged, extracted values win.
//! - Missing areas describe the currently open gaps, so they are replaced
//!   whenever the extraction supplies them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Scalar (single string) fields of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    ProjectType,
    TargetUsers,
    MainProblem,
}

impl ScalarField {
    pub const ALL: [ScalarField; 3] = [Self::ProjectType, Self::TargetUsers, Self::MainProblem];

    /// JSON key of this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::ProjectType => "projectType",
            Self::TargetUsers => "targetUsers",
            Self::MainProblem => "mainProblem",
        }
    }
}

/// List-of-string fields of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListField {
    KeyFeatures,
    TechnicalRequirements,
    DataRequirements,
    SecurityNeeds,
    PerformanceNeeds,
    Integrations,
    BusinessGoals,
    UserFlows,
    Constraints,
    DomainSpecificTerms,
}

impl ListField {
    pub const ALL: [ListField; 10] = [
        Self::KeyFeatures,
        Self::TechnicalRequirements,
        Self::DataRequirements,
        Self::SecurityNeeds,
        Self::PerformanceNeeds,
        Self::Integrations,
        Self::BusinessGoals,
        Self::UserFlows,
        Self::Constraints,
        Self::DomainSpecificTerms,
    ];

    /// JSON key of this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::KeyFeatures => "keyFeatures",
            Self::TechnicalRequirements => "technicalRequirements",
            Self::DataRequirements => "dataRequirements",
            Self::SecurityNeeds => "securityNeeds",
            Self::PerformanceNeeds => "performanceNeeds",
            Self::Integrations => "integrations",
            Self::BusinessGoals => "businessGoals",
            Self::UserFlows => "userFlows",
            Self::Constraints => "constraints",
            Self::DomainSpecificTerms => "domainSpecificTerms",
        }
    }
}

/// The nine 0-100 quality estimates supplied by structured extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityField {
    ProjectTypeClarity,
    UserDefinitionDepth,
    ProblemDefinitionDepth,
    FeatureSpecificity,
    TechnicalSpecificity,
    DataModelClarity,
    SecurityConsiderations,
    PerformanceConsiderations,
    IntegrationClarity,
}

impl QualityField {
    pub const ALL: [QualityField; 9] = [
        Self::ProjectTypeClarity,
        Self::UserDefinitionDepth,
        Self::ProblemDefinitionDepth,
        Self::FeatureSpecificity,
        Self::TechnicalSpecificity,
        Self::DataModelClarity,
        Self::SecurityConsiderations,
        Self::PerformanceConsiderations,
        Self::IntegrationClarity,
    ];

    /// JSON key of this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::ProjectTypeClarity => "projectTypeClarity",
            Self::UserDefinitionDepth => "userDefinitionDepth",
            Self::ProblemDefinitionDepth => "problemDefinitionDepth",
            Self::FeatureSpecificity => "featureSpecificity",
            Self::TechnicalSpecificity => "technicalSpecificity",
            Self::DataModelClarity => "dataModelClarity",
            Self::SecurityConsiderations => "securityConsiderations",
            Self::PerformanceConsiderations => "performanceConsiderations",
            Self::IntegrationClarity => "integrationClarity",
        }
    }
}

/// Per-facet quality scores. Values are kept as supplied; the scorer clamps its output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type_clarity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_definition_depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_definition_depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_specificity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specificity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model_clarity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_considerations: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_considerations: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_clarity: Option<i64>,
}

impl QualityScores {
    pub fn get(&self, field: QualityField) -> Option<i64> {
        *self.slot(field)
    }

    pub fn set(&mut self, field: QualityField, value: i64) {
        *self.slot_mut(field) = Some(value);
    }

    /// True when no quality score has ever been supplied
    pub fn is_empty(&self) -> bool {
        QualityField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Overwrite every field that `other` sets; leave the rest untouched.
    pub fn merge_from(&mut self, other: &QualityScores) {
        for field in QualityField::ALL {
            if let Some(value) = other.get(field) {
                self.set(field, value);
            }
        }
    }

    fn slot(&self, field: QualityField) -> &Option<i64> {
        match field {
            QualityField::ProjectTypeClarity => &self.project_type_clarity,
            QualityField::UserDefinitionDepth => &self.user_definition_depth,
            QualityField::ProblemDefinitionDepth => &self.problem_definition_depth,
            QualityField::FeatureSpecificity => &self.feature_specificity,
            QualityField::TechnicalSpecificity => &self.technical_specificity,
            QualityField::DataModelClarity => &self.data_model_clarity,
            QualityField::SecurityConsiderations => &self.security_considerations,
            QualityField::PerformanceConsiderations => &self.performance_considerations,
            QualityField::IntegrationClarity => &self.integration_clarity,
        }
    }

    fn slot_mut(&mut self, field: QualityField) -> &mut Option<i64> {
        match field {
            QualityField::ProjectTypeClarity => &mut self.project_type_clarity,
            QualityField::UserDefinitionDepth => &mut self.user_definition_depth,
            QualityField::ProblemDefinitionDepth => &mut self.problem_definition_depth,
            QualityField::FeatureSpecificity => &mut self.feature_specificity,
            QualityField::TechnicalSpecificity => &mut self.technical_specificity,
            QualityField::DataModelClarity => &mut self.data_model_clarity,
            QualityField::SecurityConsiderations => &mut self.security_considerations,
            QualityField::PerformanceConsiderations => &mut self.performance_considerations,
            QualityField::IntegrationClarity => &mut self.integration_clarity,
        }
    }
}

/// Accumulated specification facts for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_problem: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technical_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performance_needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_flows: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_specific_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "QualityScores::is_empty")]
    pub quality_scores: QualityScores,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_areas: Vec<String>,
    /// Number of turns processed when the context was last merged
    #[serde(default)]
    pub conversation_depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analyzed: Option<DateTime<Utc>>,
}

impl SpecificationContext {
    /// Create an empty context (session start)
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a scalar field, if set
    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        match field {
            ScalarField::ProjectType => self.project_type.as_deref(),
            ScalarField::TargetUsers => self.target_users.as_deref(),
            ScalarField::MainProblem => self.main_problem.as_deref(),
        }
    }

    fn scalar_mut(&mut self, field: ScalarField) -> &mut Option<String> {
        match field {
            ScalarField::ProjectType => &mut self.project_type,
            ScalarField::TargetUsers => &mut self.target_users,
            ScalarField::MainProblem => &mut self.main_problem,
        }
    }

    /// Entries of a list field
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::KeyFeatures => &self.key_features,
            ListField::TechnicalRequirements => &self.technical_requirements,
            ListField::DataRequirements => &self.data_requirements,
            ListField::SecurityNeeds => &self.security_needs,
            ListField::PerformanceNeeds => &self.performance_needs,
            ListField::Integrations => &self.integrations,
            ListField::BusinessGoals => &self.business_goals,
            ListField::UserFlows => &self.user_flows,
            ListField::Constraints => &self.constraints,
            ListField::DomainSpecificTerms => &self.domain_specific_terms,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::KeyFeatures => &mut self.key_features,
            ListField::TechnicalRequirements => &mut self.technical_requirements,
            ListField::DataRequirements => &mut self.data_requirements,
            ListField::SecurityNeeds => &mut self.security_needs,
            ListField::PerformanceNeeds => &mut self.performance_needs,
            ListField::Integrations => &mut self.integrations,
            ListField::BusinessGoals => &mut self.business_goals,
            ListField::UserFlows => &mut self.user_flows,
            ListField::Constraints => &mut self.constraints,
            ListField::DomainSpecificTerms => &mut self.domain_specific_terms,
        }
    }
}

/// Facts extracted from one analysis pass. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_problem: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technical_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performance_needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_flows: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_specific_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "QualityScores::is_empty")]
    pub quality_scores: QualityScores,
    /// `None` keeps the current gaps; `Some` replaces them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_areas: Option<Vec<String>>,
}

impl PartialContext {
    /// Create an empty partial (nothing extracted)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        match field {
            ScalarField::ProjectType => self.project_type.as_deref(),
            ScalarField::TargetUsers => self.target_users.as_deref(),
            ScalarField::MainProblem => self.main_problem.as_deref(),
        }
    }

    pub fn set_scalar(&mut self, field: ScalarField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            ScalarField::ProjectType => self.project_type = value,
            ScalarField::TargetUsers => self.target_users = value,
            ScalarField::MainProblem => self.main_problem = value,
        }
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::KeyFeatures => &self.key_features,
            ListField::TechnicalRequirements => &self.technical_requirements,
            ListField::DataRequirements => &self.data_requirements,
            ListField::SecurityNeeds => &self.security_needs,
            ListField::PerformanceNeeds => &self.performance_needs,
            ListField::Integrations => &self.integrations,
            ListField::BusinessGoals => &self.business_goals,
            ListField::UserFlows => &self.user_flows,
            ListField::Constraints => &self.constraints,
            ListField::DomainSpecificTerms => &self.domain_specific_terms,
        }
    }

    pub fn set_list(&mut self, field: ListField, values: Vec<String>) {
        match field {
            ListField::KeyFeatures => self.key_features = values,
            ListField::TechnicalRequirements => self.technical_requirements = values,
            ListField::DataRequirements => self.data_requirements = values,
            ListField::SecurityNeeds => self.security_needs = values,
            ListField::PerformanceNeeds => self.performance_needs = values,
            ListField::Integrations => self.integrations = values,
            ListField::BusinessGoals => self.business_goals = values,
            ListField::UserFlows => self.user_flows = values,
            ListField::Constraints => self.constraints = values,
            ListField::DomainSpecificTerms => self.domain_specific_terms = values,
        }
    }

    /// Decode a structured extraction result.
    ///
    /// The value must be a JSON object. Within it, anything of the wrong type is
    /// dropped: non-string scalars, non-array lists, non-string list entries,
    /// non-numeric quality scores. A structured result always describes the
    /// open gaps, so an absent `missingAreas` decodes as an empty list.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::parse("extraction result is not a JSON object"))?;

        let mut partial = Self::empty();

        for field in ScalarField::ALL {
            if let Some(text) = obj.get(field.key()).and_then(Value::as_str) {
                let text = text.trim();
                if !text.is_empty() {
                    partial.set_scalar(field, text);
                }
            }
        }

        for field in ListField::ALL {
            partial.set_list(field, string_entries(obj.get(field.key())));
        }

        if let Some(scores) = obj.get("qualityScores").and_then(Value::as_object) {
            for field in QualityField::ALL {
                if let Some(n) = scores.get(field.key()).and_then(as_integer) {
                    partial.quality_scores.set(field, n);
                }
            }
        }

        partial.missing_areas = Some(string_entries(obj.get("missingAreas")));

        Ok(partial)
    }
}

fn string_entries(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
}

/// Fold an extraction result into the current context.
///
/// Pure: the caller supplies the depth and the analysis timestamp.
pub fn merge(
    current: &SpecificationContext,
    extracted: &PartialContext,
    conversation_depth: u32,
    analyzed_at: DateTime<Utc>,
) -> SpecificationContext {
    let mut next = current.clone();

    for field in ScalarField::ALL {
        if let Some(value) = extracted.scalar(field) {
            if !value.trim().is_empty() {
                *next.scalar_mut(field) = Some(value.to_string());
            }
        }
    }

    for field in ListField::ALL {
        append_unique(next.list_mut(field), extracted.list(field));
    }

    next.quality_scores.merge_from(&extracted.quality_scores);

    if let Some(areas) = &extracted.missing_areas {
        next.missing_areas = areas.clone();
    }

    next.conversation_depth = conversation_depth;
    next.last_analyzed = Some(analyzed_at);
    next
}

fn append_unique(target: &mut Vec<String>, incoming: &[String]) {
    let combined: Vec<String> = std::mem::take(target)
        .into_iter()
        .chain(incoming.iter().filter(|s| !s.trim().is_empty()).cloned())
        .collect();

    let mut seen = HashSet::with_capacity(combined.len());
    for item in combined {
        if seen.insert(item.clone()) {
            target.push(item);
        }
    }
}
