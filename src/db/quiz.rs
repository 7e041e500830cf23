use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::Db;
use super::models::{OptionRow, QuestionRow, QuizRow};
use crate::error::AppError;
use crate::models::{AnswerOption, Question, Quiz, QuizInput};
use crate::validate::{self, MAX_REJECTION_LEN, NormalizedQuestion};

const QUIZ_COLUMNS: &str = "id, title, description, category_id, created_by, created_at, \
                            reviewed_by, reviewed_at, status, rejection_reason";

impl Db {
    /// Validate and persist a user submission. The quiz enters the
    /// moderation queue as `pending`; the whole aggregate (quiz, questions,
    /// options) commits atomically or not at all.
    pub async fn submit_quiz(&self, input: &QuizInput, user_id: Uuid) -> Result<Uuid, AppError> {
        let normalized = validate::normalize_quiz(input)?;
        self.require_category(&normalized.category_id).await?;

        let quiz_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, description, category_id, created_by, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            "#,
        )
        .bind(quiz_id)
        .bind(&normalized.title)
        .bind(&normalized.description)
        .bind(&normalized.category_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        Self::insert_questions_tx(&mut tx, quiz_id, &normalized.questions).await?;

        tx.commit().await?;

        tracing::info!(%quiz_id, %user_id, "quiz submitted for review");
        Ok(quiz_id)
    }

    /// Re-validate and replace the full aggregate of a quiz that is still
    /// pending. Editing an approved or rejected quiz reads as "not found".
    pub async fn update_pending_quiz(
        &self,
        quiz_id: Uuid,
        input: &QuizInput,
    ) -> Result<(), AppError> {
        let normalized = validate::normalize_quiz(input)?;
        self.require_category(&normalized.category_id).await?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE quizzes
            SET title = $2, description = $3, category_id = $4, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(quiz_id)
        .bind(&normalized.title)
        .bind(&normalized.description)
        .bind(&normalized.category_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Pending quiz not found."));
        }

        // Delete-then-reinsert: positions always derive from the new payload
        // order; options cascade with their questions.
        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        Self::insert_questions_tx(&mut tx, quiz_id, &normalized.questions).await?;

        tx.commit().await?;

        tracing::info!(%quiz_id, "pending quiz updated");
        Ok(())
    }

    /// `pending -> approved`. The status guard makes the first writer win;
    /// a lost race observes "not found" instead of clobbering the decision.
    pub async fn approve_pending_quiz(
        &self,
        quiz_id: Uuid,
        admin_id: Uuid,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE quizzes
            SET status = 'approved', reviewed_by = $2, reviewed_at = now(),
                rejection_reason = NULL, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(quiz_id)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Pending quiz not found."));
        }

        tracing::info!(%quiz_id, %admin_id, "quiz approved");
        Ok(())
    }

    /// `pending -> rejected`, with a mandatory reason. Rejection is terminal
    /// for the quiz; resubmission means a new `submit_quiz`.
    pub async fn reject_pending_quiz(
        &self,
        quiz_id: Uuid,
        admin_id: Uuid,
        reason: &str,
    ) -> Result<(), AppError> {
        let reason = validate::require_text(reason, "Rejection reason", MAX_REJECTION_LEN)?;

        let updated = sqlx::query(
            r#"
            UPDATE quizzes
            SET status = 'rejected', reviewed_by = $2, reviewed_at = now(),
                rejection_reason = $3, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(quiz_id)
        .bind(admin_id)
        .bind(&reason)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Pending quiz not found."));
        }

        tracing::info!(%quiz_id, %admin_id, "quiz rejected");
        Ok(())
    }

    /// Admin shortcut past the moderation queue: validates exactly like
    /// `submit_quiz`, lands directly in `approved` with reviewer stamps.
    pub async fn create_quiz_as_admin(
        &self,
        input: &QuizInput,
        admin_id: Uuid,
    ) -> Result<Quiz, AppError> {
        let normalized = validate::normalize_quiz(input)?;
        self.require_category(&normalized.category_id).await?;

        let quiz_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, description, category_id, created_by,
                                 status, reviewed_by, reviewed_at)
            VALUES ($1, $2, $3, $4, $5, 'approved', $5, $6)
            "#,
        )
        .bind(quiz_id)
        .bind(&normalized.title)
        .bind(&normalized.description)
        .bind(&normalized.category_id)
        .bind(admin_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        Self::insert_questions_tx(&mut tx, quiz_id, &normalized.questions).await?;

        tx.commit().await?;

        tracing::info!(%quiz_id, %admin_id, "quiz created by admin");

        self.get_quiz_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz not found."))
    }

    /// Cascades to questions and options via foreign keys.
    pub async fn delete_quiz(&self, quiz_id: Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Quiz not found."));
        }

        tracing::info!(%quiz_id, "quiz deleted");
        Ok(())
    }

    /// Public catalog: approved quizzes only, newest first.
    pub async fn get_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE status = 'approved' ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Public lookup; pending/rejected quizzes are invisible here.
    pub async fn get_quiz_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1 AND status = 'approved'",
        ))
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// A submitter's own pending and rejected quizzes, rejection reasons
    /// included.
    pub async fn get_user_submissions(&self, user_id: Uuid) -> Result<Vec<Quiz>, AppError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            r#"
            SELECT {QUIZ_COLUMNS} FROM quizzes
            WHERE created_by = $1 AND status IN ('pending', 'rejected')
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// The moderation queue.
    pub async fn get_pending_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE status = 'pending' ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn require_category(&self, category_id: &str) -> Result<(), AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Err(AppError::not_found("Category not found."));
        }
        Ok(())
    }

    /// Batch-insert questions and options via UNNEST to avoid N+1
    /// round-trips. Ids are generated app-side so both levels insert without
    /// reading ids back; positions come from input order.
    async fn insert_questions_tx(
        tx: &mut Transaction<'_, Postgres>,
        quiz_id: Uuid,
        questions: &[NormalizedQuestion],
    ) -> Result<(), AppError> {
        let question_ids: Vec<Uuid> = questions.iter().map(|_| Uuid::new_v4()).collect();
        let prompts: Vec<String> = questions.iter().map(|q| q.prompt.clone()).collect();
        let positions: Vec<i32> = (0..questions.len() as i32).collect();
        let quiz_ids: Vec<Uuid> = vec![quiz_id; questions.len()];

        sqlx::query(
            r#"
            INSERT INTO questions (id, quiz_id, prompt, position)
            SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::INT4[])
            "#,
        )
        .bind(&question_ids)
        .bind(&quiz_ids)
        .bind(&prompts)
        .bind(&positions)
        .execute(&mut **tx)
        .await?;

        let mut o_ids = Vec::new();
        let mut o_question_ids = Vec::new();
        let mut o_labels = Vec::new();
        let mut o_corrects = Vec::new();
        let mut o_positions = Vec::new();

        for (question, &question_id) in questions.iter().zip(question_ids.iter()) {
            for (position, option) in question.options.iter().enumerate() {
                o_ids.push(Uuid::new_v4());
                o_question_ids.push(question_id);
                o_labels.push(option.label.clone());
                o_corrects.push(option.is_correct);
                o_positions.push(position as i32);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO options (id, question_id, label, is_correct, position)
            SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::BOOL[], $5::INT4[])
            "#,
        )
        .bind(&o_ids)
        .bind(&o_question_ids)
        .bind(&o_labels)
        .bind(&o_corrects)
        .bind(&o_positions)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Attach ordered questions and options to a page of quiz rows with two
    /// batched lookups.
    async fn hydrate(&self, rows: Vec<QuizRow>) -> Result<Vec<Quiz>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let quiz_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let question_rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, quiz_id, prompt FROM questions
            WHERE quiz_id = ANY($1)
            ORDER BY quiz_id, position
            "#,
        )
        .bind(&quiz_ids)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<Uuid> = question_rows.iter().map(|row| row.id).collect();
        let option_rows = if question_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, OptionRow>(
                r#"
                SELECT id, question_id, label, is_correct FROM options
                WHERE question_id = ANY($1)
                ORDER BY question_id, position
                "#,
            )
            .bind(&question_ids)
            .fetch_all(&self.pool)
            .await?
        };

        let mut options_by_question: HashMap<Uuid, Vec<AnswerOption>> = HashMap::new();
        for row in option_rows {
            options_by_question
                .entry(row.question_id)
                .or_default()
                .push(AnswerOption {
                    id: row.id,
                    label: row.label,
                    is_correct: row.is_correct,
                });
        }

        let mut questions_by_quiz: HashMap<Uuid, Vec<Question>> = HashMap::new();
        for row in question_rows {
            let options = options_by_question.remove(&row.id).unwrap_or_default();
            questions_by_quiz
                .entry(row.quiz_id)
                .or_default()
                .push(Question {
                    id: row.id,
                    prompt: row.prompt,
                    options,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Quiz {
                questions: questions_by_quiz.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                description: row.description,
                category_id: row.category_id,
                created_by: row.created_by,
                created_at: row.created_at,
                reviewed_by: row.reviewed_by,
                reviewed_at: row.reviewed_at,
                status: row.status,
                rejection_reason: row.rejection_reason,
            })
            .collect())
    }
}
