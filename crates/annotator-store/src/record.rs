//! Annotation record types (compatible with the annotations.json array layout)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier tagging every record saved during one session
///
/// Never blank, including when read back from the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier; blank input is rejected
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = &'static str;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id).ok_or("session id must not be blank")
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-way preference between two responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Preference {
    #[default]
    A,
    B,
    #[serde(rename = "Both Equal")]
    BothEqual,
}

impl Preference {
    pub const ALL: [Preference; 3] = [Preference::A, Preference::B, Preference::BothEqual];

    pub fn label(&self) -> &'static str {
        match self {
            Preference::A => "A",
            Preference::B => "B",
            Preference::BothEqual => "Both Equal",
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("unknown preference: {}", s))
    }
}

/// Yes/No judgment on an image label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verdict {
    #[default]
    Yes,
    No,
}

impl Verdict {
    pub const ALL: [Verdict; 2] = [Verdict::Yes, Verdict::No];

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Yes => "Yes",
            Verdict::No => "No",
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.label() == s)
            .ok_or_else(|| format!("unknown verdict: {}", s))
    }
}

/// Per-criterion winners of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub correctness: Preference,
    pub clarity: Preference,
    pub reasoning: Preference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HallucinationFlags {
    pub incorrect_fact: bool,
    pub unsupported_claim: bool,
    pub made_up_numbers: bool,
    pub safety_violation: bool,
}

impl HallucinationFlags {
    pub fn any(&self) -> bool {
        self.incorrect_fact || self.unsupported_claim || self.made_up_numbers || self.safety_violation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComparison {
    #[serde(rename = "ref_key")]
    pub session_id: SessionId,
    pub prompt: String,
    #[serde(rename = "responseA")]
    pub response_a: String,
    #[serde(rename = "responseB")]
    pub response_b: String,
    pub scores: Scores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hallucination {
    #[serde(rename = "ref_key")]
    pub session_id: SessionId,
    pub response: String,
    pub flags: HallucinationFlags,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEval {
    #[serde(rename = "ref_key")]
    pub session_id: SessionId,
    pub predicted_label: String,
    pub is_correct: Verdict,
    /// Written as `null` when the prediction was judged correct
    #[serde(default)]
    pub correct_label: Option<String>,
}

impl ImageEval {
    /// Build an image evaluation, keeping `correct_label` only for a "No" verdict
    pub fn new(
        session_id: SessionId,
        predicted_label: String,
        is_correct: Verdict,
        correct_label: Option<String>,
    ) -> Self {
        let correct_label = match is_correct {
            Verdict::Yes => None,
            Verdict::No => correct_label,
        };
        Self {
            session_id,
            predicted_label,
            is_correct,
            correct_label,
        }
    }
}

/// One persisted judgment, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnnotationRecord {
    #[serde(rename = "text-comparison")]
    TextComparison(TextComparison),
    #[serde(rename = "hallucination")]
    Hallucination(Hallucination),
    #[serde(rename = "image-eval")]
    ImageEval(ImageEval),
}

impl AnnotationRecord {
    pub fn session_id(&self) -> &SessionId {
        match self {
            AnnotationRecord::TextComparison(r) => &r.session_id,
            AnnotationRecord::Hallucination(r) => &r.session_id,
            AnnotationRecord::ImageEval(r) => &r.session_id,
        }
    }

    /// The `type` discriminant as written to disk
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationRecord::TextComparison(_) => "text-comparison",
            AnnotationRecord::Hallucination(_) => "hallucination",
            AnnotationRecord::ImageEval(_) => "image-eval",
        }
    }
}

impl From<TextComparison> for AnnotationRecord {
    fn from(r: TextComparison) -> Self {
        AnnotationRecord::TextComparison(r)
    }
}

impl From<Hallucination> for AnnotationRecord {
    fn from(r: Hallucination) -> Self {
        AnnotationRecord::Hallucination(r)
    }
}

impl From<ImageEval> for AnnotationRecord {
    fn from(r: ImageEval) -> Self {
        AnnotationRecord::ImageEval(r)
    }
}
