//! Keyword fallback used when structured extraction is unavailable.

use tracing::debug;

use crate::context::{PartialContext, SpecificationContext};
use crate::conversation::ConversationTurn;
use crate::rules::{FEATURE_KEYWORDS, PROJECT_TYPE_RULES};

/// Derive a partial context from keyword matches over the whole conversation.
///
/// Sets a project type only when `current` has none. Vocabulary keywords that
/// appear in the text and are not already key features are returned in
/// vocabulary order. Quality scores and missing areas are left unset.
pub fn keyword_fallback(turns: &[ConversationTurn], current: &SpecificationContext) -> PartialContext {
    let text = turns
        .iter()
        .map(|t| t.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut partial = PartialContext::empty();

    let has_project_type = current
        .project_type
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    if !has_project_type {
        partial.project_type = PROJECT_TYPE_RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| text.contains(k)))
            .map(|rule| rule.project_type.to_string());
    }

    partial.key_features = FEATURE_KEYWORDS
        .iter()
        .filter(|k| text.contains(*k))
        .filter(|k| !current.key_features.iter().any(|f| f == *k))
        .map(|k| k.to_string())
        .collect();

    debug!(
        project_type = ?partial.project_type,
        features = partial.key_features.len(),
        "Keyword fallback applied"
    );

    partial
}
