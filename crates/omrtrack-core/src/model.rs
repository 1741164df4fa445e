//! Core data model types for omrtrack.
//!
//! These are the fundamental types shared by the test builder, the scoring
//! engine, the session, and the history store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Exam subjects, in canonical block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
}

impl Subject {
    /// All subjects in the order their blocks appear on a sheet.
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Biology];
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Physics => write!(f, "physics"),
            Subject::Chemistry => write!(f, "chemistry"),
            Subject::Biology => write!(f, "biology"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" | "phy" => Ok(Subject::Physics),
            "chemistry" | "chem" => Ok(Subject::Chemistry),
            "biology" | "bio" => Ok(Subject::Biology),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Sheet-wide question number, dense and ascending from 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuestionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(QuestionId)
            .map_err(|_| format!("invalid question number: '{trimmed}'"))
    }
}

/// How strictly captured marks are checked before they are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePolicy {
    /// Any non-empty token is stored verbatim; unknown tokens simply never
    /// match and grade as incorrect.
    #[default]
    Permissive,
    /// Only `A`, `B`, `C` or `D` are accepted.
    Strict,
}

impl CapturePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            CapturePolicy::Strict
        } else {
            CapturePolicy::Permissive
        }
    }
}

/// A single bubbled option, compared by exact token equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionToken(String);

impl OptionToken {
    /// The four options printed on every question row.
    pub const STANDARD: [&'static str; 4] = ["A", "B", "C", "D"];

    /// Validate a raw mark under the given policy.
    pub fn capture(raw: &str, policy: CapturePolicy) -> Result<Self, CoreError> {
        let token = raw.trim();
        let accepted = match policy {
            CapturePolicy::Permissive => !token.is_empty(),
            CapturePolicy::Strict => Self::STANDARD.contains(&token),
        };
        if accepted {
            Ok(OptionToken(token.to_string()))
        } else {
            Err(CoreError::InvalidOptionToken {
                token: token.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is one of the four printed options.
    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(&self.0.as_str())
    }
}

impl fmt::Display for OptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marks keyed by question. Single-select: recording again overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionId, OptionToken>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a mark, returning the one it replaced.
    pub fn record(&mut self, id: QuestionId, token: OptionToken) -> Option<OptionToken> {
        self.0.insert(id, token)
    }

    pub fn get(&self, id: QuestionId) -> Option<&OptionToken> {
        self.0.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &OptionToken)> {
        self.0.iter().map(|(id, token)| (*id, token))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(QuestionId, OptionToken)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (QuestionId, OptionToken)>>(iter: T) -> Self {
        AnswerMap(iter.into_iter().collect())
    }
}

/// Number of questions requested per subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCounts {
    #[serde(default)]
    pub physics: u32,
    #[serde(default)]
    pub chemistry: u32,
    #[serde(default)]
    pub biology: u32,
}

impl SubjectCounts {
    pub fn new(physics: u32, chemistry: u32, biology: u32) -> Self {
        Self {
            physics,
            chemistry,
            biology,
        }
    }

    pub fn get(&self, subject: Subject) -> u32 {
        match subject {
            Subject::Physics => self.physics,
            Subject::Chemistry => self.chemistry,
            Subject::Biology => self.biology,
        }
    }

    pub fn total(&self) -> u32 {
        self.physics
            .saturating_add(self.chemistry)
            .saturating_add(self.biology)
    }
}

/// Configuration of one practice test. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Human-readable test name, carried into history and mistakes.
    pub name: String,
    /// Time allowed in minutes.
    pub duration_minutes: u32,
    /// Question count per subject.
    pub counts: SubjectCounts,
}

impl TestConfig {
    pub fn new(name: impl Into<String>, duration_minutes: u32, counts: SubjectCounts) -> Self {
        Self {
            name: name.into(),
            duration_minutes,
            counts,
        }
    }

    pub fn total_questions(&self) -> u32 {
        self.counts.total()
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// One row of the bubble sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Sheet-wide number, never resets across subjects.
    pub id: QuestionId,
    pub subject: Subject,
    /// 1-based position within the subject block.
    pub display_number: u32,
}

/// The ordered questions of one session, partitioned into subject blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    pub(crate) fn from_vec(questions: Vec<Question>) -> Self {
        QuestionSet(questions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Question] {
        &self.0
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.0.iter().map(|q| q.id)
    }

    /// Look up a question by id. Ids are dense from 1, so this is an index.
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.0.get(index).filter(|q| q.id == id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.get(id).is_some()
    }

    pub fn by_subject(&self, subject: Subject) -> impl Iterator<Item = &Question> {
        self.0.iter().filter(move |q| q.subject == subject)
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
