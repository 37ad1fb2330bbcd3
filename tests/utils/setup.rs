use std::sync::Arc;
use uuid::Uuid;

use quizclash::{
    entitlement::AllowAllQuota,
    event::EventBus,
    game::{state::AnswerOutcome, GameMode, GameService, GameState, GameStore},
    player::PlayerIdentity,
    question::{bank::InMemoryQuestionBank, Category, Difficulty, Question, QuestionKind},
    results::{InMemoryLeaderboardRepository, ResultsService},
    shared::AppError,
    SubmittedAnswer,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub game_service: GameService,
    pub results_service: ResultsService,
    pub event_bus: EventBus,
    pub game_id: String,
    pub host_id: Uuid,
    /// Player ids in join order (seat 1 first).
    pub players: Vec<Uuid>,
    pub category: Category,
    pub difficulty: Difficulty,
}

pub struct TestSetupBuilder {
    mode: GameMode,
    player_names: Vec<String>,
    total_questions: u32,
    bank_questions: usize,
    question_points: u32,
    started: bool,
}

impl TestSetupBuilder {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            player_names: vec![],
            total_questions: 3,
            bank_questions: 8,
            question_points: 10,
            started: true,
        }
    }

    pub fn with_players(mut self, names: Vec<&str>) -> Self {
        self.player_names = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["Alice", "Bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["Alice", "Bob", "Carol"])
    }

    pub fn with_total_questions(mut self, total: u32) -> Self {
        self.total_questions = total;
        self
    }

    pub fn with_question_points(mut self, points: u32) -> Self {
        self.question_points = points;
        self
    }

    pub fn not_started(mut self) -> Self {
        self.started = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let bank = Arc::new(InMemoryQuestionBank::new());
        let category = bank.add_category("General Knowledge");
        let difficulty = bank.add_difficulty("Standard", Some(self.question_points));
        for i in 0..self.bank_questions {
            bank.add_question(
                &category,
                &difficulty,
                QuestionKind::MultipleChoice,
                &format!("Question {}?", i + 1),
                &[("Right", true), ("Wrong", false)],
            );
        }

        let store = Arc::new(GameStore::new());
        let event_bus = EventBus::new();
        let game_service = GameService::new(
            store.clone(),
            bank.clone(),
            bank,
            Arc::new(AllowAllQuota),
            event_bus.clone(),
        );
        let results_service = ResultsService::new(
            store,
            Arc::new(InMemoryLeaderboardRepository::new()),
            event_bus.clone(),
        );

        let host_id = Uuid::new_v4();
        let game = game_service
            .create_game(host_id, self.mode, self.total_questions)
            .await
            .expect("game creation should succeed");

        let mut players = Vec::new();
        for name in &self.player_names {
            let player = game_service
                .join_game(
                    &game.id,
                    PlayerIdentity::Guest { name: name.clone() },
                )
                .await
                .expect("join should succeed");
            players.push(player.id);
        }

        if self.started && players.len() >= 2 {
            game_service
                .start_game(&game.id, host_id)
                .await
                .expect("start should succeed");
        }

        TestSetup {
            game_service,
            results_service,
            event_bus,
            game_id: game.id,
            host_id,
            players,
            category,
            difficulty,
        }
    }
}

impl TestSetup {
    pub async fn game(&self) -> GameState {
        self.game_service
            .get_game(&self.game_id)
            .await
            .expect("game should exist")
    }

    /// Selects the builder's category/difficulty for the player and draws
    /// a question.
    pub async fn select_and_draw(&self, player: Uuid) -> Question {
        self.game_service
            .select_category(&self.game_id, player, self.category.id, self.difficulty.id)
            .await
            .expect("selection should succeed");
        let (question, _number) = self
            .game_service
            .draw_question(&self.game_id, player)
            .await
            .expect("draw should succeed");
        question
    }

    pub async fn answer(
        &self,
        player: Uuid,
        question: &Question,
        correct: bool,
    ) -> Result<AnswerOutcome, AppError> {
        let answer = question
            .answers
            .iter()
            .find(|a| a.is_correct == correct)
            .expect("question should have both answer kinds");
        self.game_service
            .submit_answer(
                &self.game_id,
                player,
                question.id,
                SubmittedAnswer::Choice(answer.id),
            )
            .await
    }
}
