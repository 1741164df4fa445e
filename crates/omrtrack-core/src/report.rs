//! Graded-test report with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::GradedTest;
use crate::model::{AnswerMap, QuestionSet};
use crate::results::{MistakeRecord, Outcome, ResultSet, TestResultSummary};
use crate::statistics::{subject_breakdown, ScoreBand, SubjectBreakdown};

/// Everything needed to render the result sheet of one graded test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub summary: TestResultSummary,
    pub questions: QuestionSet,
    pub answers: AnswerMap,
    pub answer_key: AnswerMap,
    pub results: ResultSet,
    pub breakdown: Vec<SubjectBreakdown>,
    pub mistakes: Vec<MistakeRecord>,
}

/// One line of the per-question breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionLine {
    pub label: String,
    pub outcome: Outcome,
    pub given: Option<String>,
    pub expected: Option<String>,
}

impl GradeReport {
    pub fn new(
        graded: &GradedTest,
        questions: &QuestionSet,
        answers: &AnswerMap,
        answer_key: &AnswerMap,
    ) -> Self {
        Self {
            summary: graded.summary.clone(),
            questions: questions.clone(),
            answers: answers.clone(),
            answer_key: answer_key.clone(),
            results: graded.results.clone(),
            breakdown: subject_breakdown(questions, &graded.results),
            mistakes: graded.mistakes.clone(),
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.summary.score)
    }

    /// Per-question outcomes in sheet order.
    pub fn question_lines(&self) -> Vec<QuestionLine> {
        self.questions
            .iter()
            .map(|q| QuestionLine {
                label: format!("Q{}", q.id),
                outcome: self.results.outcome(q.id).unwrap_or(Outcome::Unanswered),
                given: self.answers.get(q.id).map(ToString::to_string),
                expected: self.answer_key.get(q.id).map(ToString::to_string),
            })
            .collect()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", s.name));
        md.push_str(&format!(
            "**Score:** {} ({} correct, {} incorrect, {} unanswered of {})\n\n",
            s.score, s.correct_count, s.incorrect_count, s.unanswered_count, s.total_questions
        ));

        if !self.breakdown.is_empty() {
            md.push_str("### Subjects\n\n");
            md.push_str("| Subject | Correct | Incorrect | Unanswered | Total |\n");
            md.push_str("|---------|---------|-----------|------------|-------|\n");
            for b in &self.breakdown {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    b.subject, b.correct, b.incorrect, b.unanswered, b.total
                ));
            }
            md.push('\n');
        }

        if !self.mistakes.is_empty() {
            md.push_str("### Mistakes\n\n");
            md.push_str("| Question | Subject | Yours | Correct |\n");
            md.push_str("|----------|---------|-------|---------|\n");
            for m in &self.mistakes {
                md.push_str(&format!(
                    "| Q{} | {} | {} | {} |\n",
                    m.question_id,
                    m.subject,
                    md_cell(m.user_answer.as_str()),
                    md_cell(m.correct_answer.as_str())
                ));
            }
        }

        md
    }
}

/// Keep a free-form mark from splitting a markdown table cell.
fn md_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
