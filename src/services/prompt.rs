//! Prompt Templates
//!
//! Every piece of text sent to the model or shown as a canned assistant reply.

use spec_mentor_core::{render_transcript, ConversationTurn, SpecificationContext};

/// Mentor persona used as the base of every reply call
pub const MENTOR_SYSTEM_PROMPT: &str = r#"You are a seasoned software architect acting as a patient mentor. You help people who are new to software development turn an idea into a complete software specification.

## What you do
1. Hold a guided conversation and ask follow-up questions that clarify the user's vision.
2. Notice missing requirements and help the user think them through.
3. Move every exchange closer to a complete specification.
4. Explain technical ideas plainly and never talk down to the user.
5. Keep the conversation on track.

## How you behave
- Remember what it was like to be a beginner.
- Stay patient while steering toward concrete requirements.
- Explain the reasoning behind technical recommendations.
- Point out pitfalls beginners often overlook.
- Acknowledge progress so the user keeps going.

## How you ask
- Ask two to four focused questions per reply.
- Build on earlier answers instead of jumping between topics.
- Aim for concrete, actionable requirements.
- Help the user see the consequences of their choices.
- Look for gaps in security, scalability, user experience and data management.

## Reply shape
- Open by acknowledging what the user shared.
- Ask your follow-up questions.
- Add short guidance on relevant technical considerations.
- Close with a clear next step.

## What to gather
- Business requirements: the problem, the users, how success is measured
- Technical requirements: platform, data, integrations, scale
- User experience: key workflows, accessibility, web or mobile
- Security and compliance needs
- Performance and scaling expectations
- Development and deployment preferences

The goal is a specification complete enough that a coding assistant could build the software without asking anything further."#;

/// First assistant turn of every session
pub const WELCOME_MESSAGE: &str = "Hello! I'm your specification mentor. I'll help you put together a complete software specification through a guided conversation.

Let's begin with the basics: **what kind of software would you like to build?**

For example:
- A task manager for a small team
- A fitness tracker for your phone
- A place to sell handmade goods
- A tool that turns spreadsheets into charts
- Something else entirely

Don't worry if you're unsure about the technical details yet. Working those out together is what I'm here for.";

/// Reply used when no API key is configured
pub const MISSING_CREDENTIALS_MESSAGE: &str = "I can't reach the language model right now because no Anthropic API key is configured.

**To fix this:**
1. Get an API key from the Anthropic console
2. Run `spec-mentor --set-api-key <KEY>` (or set `ANTHROPIC_API_KEY`)
3. Send your message again

Once the key is in place I can start helping you build your specification.";

/// Reply used when the API reports rate limiting
pub const RATE_LIMIT_REPLY: &str = "I'm receiving a lot of requests right now, so please wait a moment before sending your next message.

While you wait, you could think about:
- Who your target users are and which problems you are solving for them
- Which core features would make your solution valuable
- Any technical preferences or constraints I should know about

I'll be ready to continue once the limit resets.";

/// Reply used when the API rejects the credentials
pub const AUTH_FAILURE_REPLY: &str = "I'm having trouble connecting to the language model. This usually means the API key is invalid.

In the meantime you can:
- Describe your project idea in more detail
- Think about your target users and their main problems
- Consider what success looks like for the project

Please check your API key and send your message again.";

/// Reply used when the model answers with no text
pub const EMPTY_REPLY_MESSAGE: &str =
    "Sorry, I couldn't come up with a response just now. Please try again.";

/// Build the system prompt for a reply call
pub fn build_reply_system_prompt(context: &SpecificationContext) -> String {
    format!("{}\n\n{}", MENTOR_SYSTEM_PROMPT, build_context_block(context))
}

/// Summarise what is known so far for the reply system prompt
pub fn build_context_block(context: &SpecificationContext) -> String {
    let mut parts = Vec::new();

    if let Some(project_type) = &context.project_type {
        parts.push(format!("Project Type: {}", project_type));
    }
    if let Some(target_users) = &context.target_users {
        parts.push(format!("Target Users: {}", target_users));
    }
    if let Some(main_problem) = &context.main_problem {
        parts.push(format!("Main Problem Being Solved: {}", main_problem));
    }
    for (label, values) in [
        ("Key Features Identified", &context.key_features),
        ("Technical Requirements", &context.technical_requirements),
        ("Constraints", &context.constraints),
    ] {
        if !values.is_empty() {
            parts.push(format!("{}: {}", label, values.join(", ")));
        }
    }

    if parts.is_empty() {
        return "## Current Context: Just starting the specification process.".to_string();
    }

    let lines: Vec<String> = parts.iter().map(|p| format!("- {}", p)).collect();
    format!("## Current Context:\n{}", lines.join("\n"))
}

const EXTRACTION_SCHEMA: &str = r#"{
  "projectType": "specific project type (e.g. 'E-commerce Website', 'Farm Management Platform', 'Educational Course Platform')",
  "targetUsers": "detailed description of who will use this",
  "mainProblem": "clear statement of the problem being solved",
  "keyFeatures": ["specific features mentioned"],
  "technicalRequirements": ["technologies, platforms or technical needs mentioned"],
  "dataRequirements": ["types of data to be stored or processed"],
  "securityNeeds": ["security requirements or concerns mentioned"],
  "performanceNeeds": ["performance or scaling requirements"],
  "integrations": ["third-party services or systems to integrate with"],
  "businessGoals": ["business objectives or success metrics"],
  "userFlows": ["key user workflows or journeys described"],
  "constraints": ["limitations such as budget or timeline"],
  "domainSpecificTerms": ["industry-specific terms or concepts mentioned"],
  "qualityScores": {
    "projectTypeClarity": 0-100,
    "userDefinitionDepth": 0-100,
    "problemDefinitionDepth": 0-100,
    "featureSpecificity": 0-100,
    "technicalSpecificity": 0-100,
    "dataModelClarity": 0-100,
    "securityConsiderations": 0-100,
    "performanceConsiderations": 0-100,
    "integrationClarity": 0-100
  },
  "missingAreas": ["important areas that still need more information"]
}"#;

/// Build the single user message for an extraction call
pub fn build_extraction_prompt(window: &[ConversationTurn], current: &SpecificationContext) -> String {
    let current_json =
        serde_json::to_string_pretty(current).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Analyze this conversation about a software project and extract structured information. \
         Return a JSON object with the following structure:\n\n{}\n\n\
         Only include information that is explicitly mentioned or can be reasonably inferred. \
         Use the quality scores to indicate how well-defined each area is given the depth of the conversation.\n\n\
         Conversation:\n{}\n\n\
         Current Context:\n{}",
        EXTRACTION_SCHEMA,
        render_transcript(window),
        current_json
    )
}

/// Generic fallback reply, tailored to the last thing the user said
pub fn generic_fallback_reply(last_user_text: &str) -> String {
    let lowered = last_user_text.to_lowercase();
    let guidance = if lowered.contains("web") {
        "It sounds like you want something that runs in the browser, which is a great way to reach people on any device. Let's think about: Who will use it? What main problem does it solve? Which features matter most?"
    } else if lowered.contains("mobile") {
        "Something people carry on their phones sounds exciting, and those products can be very engaging. Some key questions: Which phone platforms do you need? What is the core functionality? Will people need to work offline?"
    } else {
        "It sounds like you have a project in mind. To build a solid specification I'd like to understand: What kind of software are you picturing? Who are your users? What problem does it solve?"
    };

    format!(
        "Sorry, I ran into a temporary problem. Here's how I can help based on what you've shared so far:\n\n{}\n\nPlease send your message again and I should be able to give you more detailed guidance.",
        guidance
    )
}
