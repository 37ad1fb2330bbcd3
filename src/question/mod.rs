pub mod bank;
pub mod types;

pub use bank::{Catalog, QuestionBank};
pub use types::{Answer, Category, Difficulty, Question, QuestionKind, SubmittedAnswer};
