use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizclash::entitlement::AllowAllQuota;
use quizclash::event::EventBus;
use quizclash::game::{handlers, GameStore};
use quizclash::question::bank::InMemoryQuestionBank;
use quizclash::question::QuestionKind;
use quizclash::results::InMemoryLeaderboardRepository;
use quizclash::shared::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizclash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting QuizClash trivia server");

    // Create shared application state with dependency injection.
    // The in-memory bank doubles as the catalog; in production both sit
    // behind the content service.
    let question_bank = Arc::new(seeded_bank());

    let app_state = AppState::new(
        Arc::new(GameStore::new()),
        question_bank.clone(),
        question_bank,
        Arc::new(AllowAllQuota),
        Arc::new(InMemoryLeaderboardRepository::new()),
        EventBus::new(),
    );

    let app = handlers::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = std::env::var("QUIZCLASH_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await.unwrap();
}

/// Development content: a small fixed bank so the server is playable out of
/// the box.
fn seeded_bank() -> InMemoryQuestionBank {
    let bank = InMemoryQuestionBank::new();

    let science = bank.add_category("Science");
    let history = bank.add_category("History");
    let easy = bank.add_difficulty("Easy", Some(10));
    let medium = bank.add_difficulty("Medium", Some(20));
    let hard = bank.add_difficulty("Hard", Some(30));

    bank.add_question(
        &science,
        &easy,
        QuestionKind::MultipleChoice,
        "What is the chemical formula of water?",
        &[("H2O", true), ("CO2", false), ("NaCl", false), ("O2", false)],
    );
    bank.add_question(
        &science,
        &easy,
        QuestionKind::TrueFalse,
        "Sound travels faster in water than in air.",
        &[("True", true), ("False", false)],
    );
    bank.add_question(
        &science,
        &medium,
        QuestionKind::MultipleChoice,
        "Which planet has the most moons?",
        &[
            ("Saturn", true),
            ("Jupiter", false),
            ("Uranus", false),
            ("Neptune", false),
        ],
    );
    bank.add_question(
        &history,
        &easy,
        QuestionKind::MultipleChoice,
        "In which year did the Berlin Wall fall?",
        &[("1989", true), ("1991", false), ("1985", false), ("1979", false)],
    );
    bank.add_question(
        &history,
        &medium,
        QuestionKind::TrueFalse,
        "The Great Fire of London happened in 1666.",
        &[("True", true), ("False", false)],
    );
    bank.add_question(
        &science,
        &hard,
        QuestionKind::TextInput,
        "What is the chemical symbol for gold?",
        &[("Au", true)],
    );
    bank.add_question(
        &history,
        &hard,
        QuestionKind::MultipleChoice,
        "Who was the first emperor of Rome?",
        &[
            ("Augustus", true),
            ("Julius Caesar", false),
            ("Nero", false),
            ("Tiberius", false),
        ],
    );

    bank
}
