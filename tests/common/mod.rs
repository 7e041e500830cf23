use quizdeck::db::Db;
use quizdeck::db::models::NewUserRecord;
use quizdeck::models::{Role, User};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Connect to the server named by `TEST_DATABASE_URL` and isolate the test in
/// a fresh schema. Returns `None` (test should bail out) when the variable is
/// unset, so the suite passes on machines without PostgreSQL.
pub async fn create_test_db() -> Option<Db> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let schema = format!("quizdeck_test_{}_{}", std::process::id(), id);

    // Single connection: SET search_path sticks for the pool's lifetime, so
    // every query (and the migrations) lands in the isolated schema.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::raw_sql(&format!(
        "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema}; SET search_path TO {schema}",
    ))
    .execute(&pool)
    .await
    .expect("failed to create test schema");

    Some(
        Db::from_pool(pool)
            .await
            .expect("failed to run migrations in test schema"),
    )
}

/// Insert a user directly, skipping the expensive key derivation. Tests that
/// exercise real sign-in go through `AuthService` instead.
pub async fn create_user(db: &Db, username: &str, role: Role) -> User {
    let record = NewUserRecord {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        display_name: username.to_string(),
        role,
        salt: "00112233445566778899aabbccddeeff".to_string(),
        password_hash: "unused".to_string(),
        password_algo: "scrypt",
    };
    db.insert_user(&record)
        .await
        .expect("failed to insert test user")
}

pub async fn create_category(db: &Db, name: &str) -> String {
    use quizdeck::models::CategoryInput;
    db.create_category(&CategoryInput {
        name: name.to_string(),
        description: None,
    })
    .await
    .expect("failed to create test category")
    .id
}

pub fn quiz_input(category_id: &str, prompts: &[&str]) -> quizdeck::models::QuizInput {
    use quizdeck::models::{OptionInput, QuestionInput, QuizInput};

    QuizInput {
        title: "Sample Quiz".to_string(),
        description: Some("A sample".to_string()),
        category_id: category_id.to_string(),
        questions: prompts
            .iter()
            .map(|prompt| QuestionInput {
                prompt: prompt.to_string(),
                options: vec![
                    OptionInput {
                        label: "Right".to_string(),
                        is_correct: true,
                    },
                    OptionInput {
                        label: "Wrong".to_string(),
                        is_correct: false,
                    },
                ],
            })
            .collect(),
    }
}

/// A submitted pending quiz, ready for moderation tests.
pub async fn submit_sample_quiz(db: &Db, user: &User, category_id: &str) -> Uuid {
    db.submit_quiz(&quiz_input(category_id, &["Q1", "Q2"]), user.id)
        .await
        .expect("failed to submit test quiz")
}
