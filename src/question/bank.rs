use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::types::{Answer, Category, Difficulty, Question, QuestionKind};
use crate::shared::AppError;

/// External question bank: supplies questions for a (category, difficulty)
/// pair. The core only ever reads from it.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Returns all questions for the pair, excluding already-served ids.
    async fn find_questions(
        &self,
        category_id: Uuid,
        difficulty_id: Uuid,
        exclude_ids: &[Uuid],
    ) -> Result<Vec<Question>, AppError>;

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError>;
}

/// Category/difficulty directory, also external to the core.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, AppError>;
    async fn get_difficulty(&self, id: Uuid) -> Result<Option<Difficulty>, AppError>;
}

#[derive(Default)]
struct BankInner {
    categories: HashMap<Uuid, Category>,
    difficulties: HashMap<Uuid, Difficulty>,
    questions: HashMap<Uuid, Question>,
}

/// In-memory implementation of both collaborator traits, used by the binary
/// for development seeding and by the test suites.
pub struct InMemoryQuestionBank {
    inner: Mutex<BankInner>,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BankInner::default()),
        }
    }

    pub fn add_category(&self, name: &str) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.categories.insert(category.id, category.clone());
        category
    }

    pub fn add_difficulty(&self, name: &str, points: Option<u32>) -> Difficulty {
        let difficulty = Difficulty {
            id: Uuid::new_v4(),
            name: name.to_string(),
            points,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.difficulties.insert(difficulty.id, difficulty.clone());
        difficulty
    }

    /// Adds a choice question whose answers are (text, is_correct) pairs.
    pub fn add_question(
        &self,
        category: &Category,
        difficulty: &Difficulty,
        kind: QuestionKind,
        text: &str,
        answers: &[(&str, bool)],
    ) -> Question {
        let question = Question {
            id: Uuid::new_v4(),
            category_id: category.id,
            difficulty_id: difficulty.id,
            kind,
            text: text.to_string(),
            points: difficulty.point_value(),
            time_limit_secs: 30,
            answers: answers
                .iter()
                .map(|(text, is_correct)| Answer {
                    id: Uuid::new_v4(),
                    text: text.to_string(),
                    is_correct: *is_correct,
                })
                .collect(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.questions.insert(question.id, question.clone());
        question
    }
}

impl Default for InMemoryQuestionBank {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn find_questions(
        &self,
        category_id: Uuid,
        difficulty_id: Uuid,
        exclude_ids: &[Uuid],
    ) -> Result<Vec<Question>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .questions
            .values()
            .filter(|q| {
                q.category_id == category_id
                    && q.difficulty_id == difficulty_id
                    && !exclude_ids.contains(&q.id)
            })
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.questions.get(&id).cloned())
    }
}

#[async_trait]
impl Catalog for InMemoryQuestionBank {
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.categories.get(&id).cloned())
    }

    async fn get_difficulty(&self, id: Uuid) -> Result<Option<Difficulty>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.difficulties.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_questions_filters_by_pair_and_exclusions() {
        let bank = InMemoryQuestionBank::new();
        let science = bank.add_category("Science");
        let history = bank.add_category("History");
        let easy = bank.add_difficulty("Easy", Some(10));

        let q1 = bank.add_question(
            &science,
            &easy,
            QuestionKind::MultipleChoice,
            "Q1",
            &[("a", true), ("b", false)],
        );
        let q2 = bank.add_question(
            &science,
            &easy,
            QuestionKind::MultipleChoice,
            "Q2",
            &[("a", true), ("b", false)],
        );
        bank.add_question(
            &history,
            &easy,
            QuestionKind::MultipleChoice,
            "Q3",
            &[("a", true), ("b", false)],
        );

        let found = bank
            .find_questions(science.id, easy.id, &[])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let found = bank
            .find_questions(science.id, easy.id, &[q1.id])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, q2.id);

        let found = bank
            .find_questions(science.id, easy.id, &[q1.id, q2.id])
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn catalog_lookups_return_none_for_unknown_ids() {
        let bank = InMemoryQuestionBank::new();
        assert!(bank.get_category(Uuid::new_v4()).await.unwrap().is_none());
        assert!(bank.get_difficulty(Uuid::new_v4()).await.unwrap().is_none());
        assert!(bank.get_question(Uuid::new_v4()).await.unwrap().is_none());
    }
}
