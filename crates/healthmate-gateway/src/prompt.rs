//! Prompt assembly for the generation call.
//!
//! A prompt is built from up to four segments joined by blank lines:
//! system instruction, serialized context window, optional task
//! instruction, and the new user turn. Empty segments are omitted rather
//! than leaving blank placeholders.

use healthmate_core::types::Message;

/// Persona selection for the system instruction block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    #[default]
    Health,
    General,
}

impl Domain {
    /// Parse a config domain string. Anything other than "health" selects
    /// the generic assistant instruction.
    pub fn from_config(s: &str) -> Self {
        if s == "health" {
            Domain::Health
        } else {
            Domain::General
        }
    }
}

/// Optional task directive appended after the context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SymptomCheck,
}

/// Options controlling prompt assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions {
    pub domain: Domain,
    pub task: Option<Task>,
}

/// Fixed HealthMate persona block.
///
/// Advisory prompt content only: the gateway does not validate that the
/// model's output obeys these constraints.
const HEALTH_SYSTEM_PROMPT: &str = "\
You are HealthMate, a careful, empathetic AI health assistant.
Capabilities:
- Symptom triage with likely, possible, and unlikely causes.
- Self-care advice and when-to-seek-care guidance.
- Medication info (general), lifestyle tips, and medical FAQs.
Safety & scope:
- You are NOT a doctor and do NOT diagnose or prescribe.
- Encourage professional care for red flags and emergencies.
- Do not provide definitive diagnoses or treatment plans.
- Avoid unsafe instructions. Do not guess if uncertain.
Style & format:
- Use short sections with bullets. Prefer markdown.
- Add an Emergency note when symptoms suggest urgent care.
- End with: \"This is informational and not a medical diagnosis.\"";

const GENERIC_SYSTEM_PROMPT: &str = "You are a helpful, concise assistant.";

const SYMPTOM_CHECK_INSTRUCTION: &str = "Task: Perform symptom triage. \
Provide likely and possible causes, home care tips, and red flags. \
Keep it concise.";

/// Assemble the full prompt for one generation request.
pub fn build_prompt(user_text: &str, context: &[Message], options: &PromptOptions) -> String {
    let system = match options.domain {
        Domain::Health => HEALTH_SYSTEM_PROMPT,
        Domain::General => GENERIC_SYSTEM_PROMPT,
    };

    let history = context
        .iter()
        .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    let instruction = match options.task {
        Some(Task::SymptomCheck) => SYMPTOM_CHECK_INSTRUCTION,
        None => "",
    };

    let user_turn = format!("User: {}", user_text);

    [system, history.as_str(), instruction, user_turn.as_str()]
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}
