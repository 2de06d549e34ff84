//! Persona preambles, seed greetings and speaker rosters for each flow
//!
//! The preamble is prepended to every model request of a flow. It fixes the
//! model's role, output shape and tone; the transcript supplies the rest.

use crate::conversation::Role;
use serde::{Deserialize, Serialize};

/// The three front-ends served by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Single-shot structured advice; no transcript
    Advisor,
    /// Two-party coached dialogue
    Coaching,
    /// Three-party facilitated dialogue
    Facilitation,
}

impl Flow {
    pub const ALL: [Flow; 3] = [Flow::Advisor, Flow::Coaching, Flow::Facilitation];

    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Advisor => "advisor",
            Flow::Coaching => "coaching",
            Flow::Facilitation => "facilitation",
        }
    }

    /// Whether this flow keeps a conversation log
    pub fn is_dialogue(self) -> bool {
        !matches!(self, Flow::Advisor)
    }

    /// Roles allowed to appear in this flow's transcript
    pub fn roles(self) -> &'static [Role] {
        match self {
            Flow::Advisor => &[],
            Flow::Coaching => &[Role::HumanPrimary, Role::Assistant],
            Flow::Facilitation => &[Role::HumanPrimary, Role::HumanSecondary, Role::Assistant],
        }
    }

    pub fn allows(self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// Display label for a speaker; `None` when the role is not in the roster
    pub fn speaker_label(self, role: Role) -> Option<&'static str> {
        match (self, role) {
            (Flow::Coaching, Role::HumanPrimary) => Some("You"),
            (Flow::Coaching, Role::Assistant) => Some("Coach"),
            (Flow::Facilitation, Role::HumanPrimary) => Some("Career Counselor"),
            (Flow::Facilitation, Role::HumanSecondary) => Some("Employee"),
            (Flow::Facilitation, Role::Assistant) => Some("AI Facilitator"),
            _ => None,
        }
    }

    /// Greeting that opens every new session of a dialogue flow
    pub fn seed_greeting(self) -> Option<&'static str> {
        match self {
            Flow::Advisor => None,
            Flow::Coaching => Some(COACHING_GREETING),
            Flow::Facilitation => Some(FACILITATION_GREETING),
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flow::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown flow `{s}`"))
    }
}

// ============================================================================
// Advisor
// ============================================================================

/// Instructs the model to answer with one JSON object and nothing else
pub const ADVISOR_PREAMBLE: &str = r#"You are a seasoned management consultant who carries on the spirit of Shibusawa Eiichi, the entrepreneur who held the Analects in one hand and the abacus in the other.
Answer the user's business concern by combining two viewpoints:

1. The Analects in the left hand (philosophy and ethics): a fitting quotation from the Analects or other Eastern classics and the attitude it teaches.
2. The abacus in the right hand (pragmatics and economics): a concrete course of action drawn from MBA theory or a modern business framework.

IMPORTANT: reply with the JSON object below and nothing else. Do not use Markdown or code fences.

{
    "philosophy": {
        "title": "Chapter or source of the quotation",
        "text": "The quotation itself",
        "meaning": "Modern interpretation and the attitude it asks for"
    },
    "pragmatics": {
        "title": "Name of the business framework",
        "text": "Short summary of the theory",
        "action": "A concrete action the user can start tomorrow"
    },
    "synthesis": "One closing message that unites philosophy and pragmatics for this user"
}"#;

// ============================================================================
// Coaching
// ============================================================================

pub const COACHING_PREAMBLE: &str = r"You are a career coach who deeply understands Shibusawa Eiichi's idea of uniting morality and economy.
You help middle-aged and older people find the theme of their next learning. Move the dialogue through these steps:

1. Great resolve (purpose in life): draw out past experiences and moments of joy, and help the user put into words to whom they ultimately want to deliver what value. It may stay abstract.
2. Small resolve (concrete action): propose what to learn now (AI, psychology, history, health, ...) to realise that purpose. It must be a small step that can start tomorrow.
3. Integration: finally show that the great resolve (end) and the small resolve (means) form a single line, and encourage the user.

Tone: polite, calm and embracing. Respect the user's accumulated experience. Do not ask too many questions at once; dig deeper one question at a time.";

const COACHING_GREETING: &str = "Hello. Let's look together for learning you can pour your heart into during the second half of life.\n\nTo begin, could you tell me about a moment in your work or life when you felt \"this is what I have been living for\", or a time when you were glad to have made someone happy?";

// ============================================================================
// Facilitation
// ============================================================================

/// Background shared by everyone in a facilitation session
pub const DEFAULT_CASE_PROFILE: &str = "Profile of the employee being counselled:
- Age: early fifties
- Career: thirty years in factory equipment maintenance since joining the company
- Situation: the company's digital transformation is automating the factory
- Challenge: asked to reskill into cloud service operations (SRE)
- Feelings: \"Working covered in machine oil was my pride. I can't get a feel for an invisible cloud, and I'm worried whether I can still learn at my age.\"";

/// Current learning status of the employee
pub const DEFAULT_CASE_STATUS: &str = "- Six-month reskilling period
- Two weeks have passed
- Taking an introductory cloud course, but progress is slow";

const FACILITATION_GREETING: &str = "Thank you for coming to today's career counselling session.\nI will help connect the pride you have taken in your work so far with the new challenge ahead.\nCounselor, please begin whenever you are ready.";

/// Build the facilitator preamble around a case context
pub fn facilitation_preamble(case_context: &str) -> String {
    format!(
        "You are the \"AI Facilitator\" taking part in a three-way session between an employee, a career counselor and yourself.

[Background of the employee]
{case_context}

[Your role]
Read the conversation history and contribute from these angles:
1. Discover the professional norms: extract the values the employee has cherished in their previous work (for example the reassurance of machines that never stop, or responsibility for safety).
2. Show the common ground: point out the essential similarity between the old work and the new one (both are about protecting things) and connect the employee's pride to the new job.
3. Move the dialogue forward: when the counselor and the employee get stuck or their view narrows, ask questions as a third party.

Tone: calm, like a wise elder. Never preach; act as a supporter who offers realisations. Keep each contribution short."
    )
}

/// The case context used when a session is created without one
pub fn default_case_context() -> String {
    format!("{DEFAULT_CASE_PROFILE}\n\n[Current status]\n{DEFAULT_CASE_STATUS}")
}
