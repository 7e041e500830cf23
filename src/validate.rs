//! Validation boundary: every external payload is trimmed, range-checked and
//! normalized here before any store method runs.

use crate::error::AppError;
use crate::models::{QuestionInput, QuizInput};

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESC_LEN: usize = 500;
pub const MAX_QUESTION_COUNT: usize = 20;
pub const MIN_OPTION_COUNT: usize = 2;
pub const MAX_OPTION_COUNT: usize = 6;
pub const MAX_PROMPT_LEN: usize = 240;
pub const MAX_OPTION_LEN: usize = 140;
pub const MAX_USERNAME_LEN: usize = 24;
pub const MAX_EMAIL_LEN: usize = 120;
pub const MAX_CATEGORY_NAME_LEN: usize = 40;
pub const MAX_CATEGORY_DESC_LEN: usize = 160;
pub const MAX_REJECTION_LEN: usize = 200;

/// A quiz payload that has passed validation. Positions are implied by
/// element order.
#[derive(Debug, Clone)]
pub struct NormalizedQuiz {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub questions: Vec<NormalizedQuestion>,
}

#[derive(Debug, Clone)]
pub struct NormalizedQuestion {
    pub prompt: String,
    pub options: Vec<NormalizedOption>,
}

#[derive(Debug, Clone)]
pub struct NormalizedOption {
    pub label: String,
    pub is_correct: bool,
}

pub fn require_text(value: &str, field: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required.")));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(format!("{field} is too long.")));
    }
    Ok(trimmed.to_string())
}

pub fn optional_text(value: Option<&str>, max_len: usize) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation("Value is too long.".to_string()));
    }
    Ok(Some(trimmed.to_string()))
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::validation("Email is too long."));
    }
    let mut parts = email.split('@');
    let (local, domain) = (parts.next().unwrap_or(""), parts.next().unwrap_or(""));
    let well_formed = parts.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(AppError::validation("Email is invalid."));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation("Username is too long."));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    if username.is_empty() || !username.chars().all(allowed) {
        return Err(AppError::validation(
            "Username can only use letters, numbers, ., - and _.",
        ));
    }
    Ok(())
}

/// Lowercase, collapse non-alphanumeric runs into `-`, trim leading/trailing
/// dashes.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Validate a full quiz payload: title/description bounds, 1–20 questions,
/// each with a prompt, 2–6 options and exactly one correct option.
pub fn normalize_quiz(input: &QuizInput) -> Result<NormalizedQuiz, AppError> {
    let title = require_text(&input.title, "Title", MAX_TITLE_LEN)?;
    let description = optional_text(input.description.as_deref(), MAX_DESC_LEN)?.unwrap_or_default();
    let category_id = require_text(&input.category_id, "Category", MAX_CATEGORY_NAME_LEN)?;
    let questions = normalize_questions(&input.questions)?;

    Ok(NormalizedQuiz {
        title,
        description,
        category_id,
        questions,
    })
}

fn normalize_questions(input: &[QuestionInput]) -> Result<Vec<NormalizedQuestion>, AppError> {
    if input.is_empty() {
        return Err(AppError::validation("Questions are required."));
    }
    if input.len() > MAX_QUESTION_COUNT {
        return Err(AppError::validation("Too many questions."));
    }

    input
        .iter()
        .map(|question| {
            let prompt = require_text(&question.prompt, "Question prompt", MAX_PROMPT_LEN)?;
            if question.options.len() < MIN_OPTION_COUNT {
                return Err(AppError::validation(
                    "Each question needs at least two options.",
                ));
            }
            if question.options.len() > MAX_OPTION_COUNT {
                return Err(AppError::validation("Too many options in a question."));
            }

            let options = question
                .options
                .iter()
                .map(|option| {
                    Ok(NormalizedOption {
                        label: require_text(&option.label, "Option label", MAX_OPTION_LEN)?,
                        is_correct: option.is_correct,
                    })
                })
                .collect::<Result<Vec<_>, AppError>>()?;

            let correct = options.iter().filter(|option| option.is_correct).count();
            if correct != 1 {
                return Err(AppError::validation(
                    "Each question needs exactly one correct option.",
                ));
            }

            Ok(NormalizedQuestion { prompt, options })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionInput;

    fn question(labels: &[(&str, bool)]) -> QuestionInput {
        QuestionInput {
            prompt: "What is 1+1?".to_string(),
            options: labels
                .iter()
                .map(|(label, is_correct)| OptionInput {
                    label: label.to_string(),
                    is_correct: *is_correct,
                })
                .collect(),
        }
    }

    fn quiz(questions: Vec<QuestionInput>) -> QuizInput {
        QuizInput {
            title: "Arithmetic".to_string(),
            description: Some("Basics".to_string()),
            category_id: "math".to_string(),
            questions,
        }
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Web Security"), "web-security");
        assert_eq!(slugify("  C++ & Rust!  "), "c-rust");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("Already-Fine"), "already-fine");
    }

    #[test]
    fn require_text_trims_and_bounds() {
        assert_eq!(require_text("  hi  ", "Field", 10).unwrap(), "hi");
        assert!(matches!(
            require_text("   ", "Field", 10),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            require_text("abcdef", "Field", 5),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn optional_text_empty_collapses_to_none() {
        assert_eq!(optional_text(None, 5).unwrap(), None);
        assert_eq!(optional_text(Some("  "), 5).unwrap(), None);
        assert_eq!(optional_text(Some(" a "), 5).unwrap(), Some("a".into()));
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("spaced user@example.com").is_err());
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("alice_01.x-y").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("bad space").is_err());
        assert!(validate_username("emoji🦀").is_err());
    }

    #[test]
    fn quiz_roundtrip() {
        let normalized = normalize_quiz(&quiz(vec![question(&[("1", false), ("2", true)])]))
            .expect("valid quiz");
        assert_eq!(normalized.title, "Arithmetic");
        assert_eq!(normalized.questions.len(), 1);
        assert_eq!(normalized.questions[0].options.len(), 2);
        assert!(normalized.questions[0].options[1].is_correct);
    }

    #[test]
    fn rejects_no_questions() {
        assert!(matches!(
            normalize_quiz(&quiz(vec![])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_wrong_correct_count() {
        // zero correct
        assert!(normalize_quiz(&quiz(vec![question(&[("a", false), ("b", false)])])).is_err());
        // two correct
        assert!(normalize_quiz(&quiz(vec![question(&[("a", true), ("b", true)])])).is_err());
    }

    #[test]
    fn rejects_option_count_out_of_range() {
        assert!(normalize_quiz(&quiz(vec![question(&[("only", true)])])).is_err());

        let mut labels = vec![("yes", true)];
        labels.extend(std::iter::repeat(("no", false)).take(6));
        assert!(normalize_quiz(&quiz(vec![question(&labels)])).is_err());
    }

    #[test]
    fn rejects_too_many_questions() {
        let questions = (0..MAX_QUESTION_COUNT + 1)
            .map(|_| question(&[("a", true), ("b", false)]))
            .collect();
        assert!(normalize_quiz(&quiz(questions)).is_err());
    }
}
