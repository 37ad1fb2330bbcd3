use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::AppError;

/// Point value a difficulty falls back to when none is configured.
pub const DEFAULT_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    /// Free-text entry; correctness is a trimmed, case-folded string match.
    TextInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub id: Uuid,
    pub name: String,
    /// Configured point value; `None` falls back to [`DEFAULT_POINTS`].
    pub points: Option<u32>,
}

impl Difficulty {
    pub fn point_value(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_POINTS)
    }
}

/// A player's submitted answer, shaped by the question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum SubmittedAnswer {
    Choice(Uuid),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub category_id: Uuid,
    pub difficulty_id: Uuid,
    pub kind: QuestionKind,
    pub text: String,
    pub points: u32,
    pub time_limit_secs: u32,
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }

    /// Resolves correctness of a submitted answer against this question.
    ///
    /// Choice submissions must name one of this question's answers; text
    /// submissions are compared with literal trim + lowercase equality.
    pub fn check(&self, submitted: &SubmittedAnswer) -> Result<bool, AppError> {
        match (self.kind, submitted) {
            (QuestionKind::TextInput, SubmittedAnswer::Text(text)) => {
                let correct = self.correct_answer().ok_or_else(|| {
                    AppError::Unexpected(format!("question {} has no correct answer", self.id))
                })?;
                Ok(normalize(text) == normalize(&correct.text))
            }
            (QuestionKind::TextInput, SubmittedAnswer::Choice(_)) => Err(AppError::InvalidInput(
                "this question expects a text answer".to_string(),
            )),
            (_, SubmittedAnswer::Text(_)) => Err(AppError::InvalidInput(
                "this question expects an answer choice".to_string(),
            )),
            (_, SubmittedAnswer::Choice(answer_id)) => {
                let answer = self
                    .answers
                    .iter()
                    .find(|a| a.id == *answer_id)
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "answer does not belong to this question".to_string(),
                        )
                    })?;
                Ok(answer.is_correct)
            }
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
