use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub question: String,
    pub correct_answer: String,
    pub distractors: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("Trivia generator error: {0}")]
    Generator(String),
}

/// Turns a list of movie titles into quiz questions. The persistence layer
/// treats implementations as opaque and returns their output unchanged.
#[async_trait]
pub trait TriviaGenerator: Send + Sync {
    async fn generate(&self, titles: &[String]) -> Result<Vec<TriviaQuestion>, TriviaError>;
}

// Filler answers for the multiple-choice questions. Anything the user has
// actually reviewed is filtered out before sampling.
const DISTRACTOR_POOL: &[&str] = &[
    "Casablanca",
    "The Godfather",
    "Pulp Fiction",
    "Spirited Away",
    "The Matrix",
    "Jaws",
    "Alien",
    "Goodfellas",
    "Blade Runner",
    "Amélie",
    "Seven Samurai",
    "Vertigo",
];

/// Builds "which of these have you reviewed?" questions locally, one per
/// reviewed title up to `max_questions`.
pub struct LocalTriviaGenerator {
    max_questions: usize,
}

impl LocalTriviaGenerator {
    pub fn new(max_questions: usize) -> Self {
        Self { max_questions }
    }
}

#[async_trait]
impl TriviaGenerator for LocalTriviaGenerator {
    async fn generate(&self, titles: &[String]) -> Result<Vec<TriviaQuestion>, TriviaError> {
        let mut rng = rand::thread_rng();

        let pool: Vec<&str> = DISTRACTOR_POOL
            .iter()
            .copied()
            .filter(|d| !titles.iter().any(|t| t == d))
            .collect();

        let questions = titles
            .iter()
            .take(self.max_questions)
            .map(|title| TriviaQuestion {
                question: "Which of these movies have you reviewed?".to_string(),
                correct_answer: title.clone(),
                distractors: pool
                    .choose_multiple(&mut rng, 3)
                    .map(|d| d.to_string())
                    .collect(),
            })
            .collect();

        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_title_list_yields_no_questions() {
        let generator = LocalTriviaGenerator::new(5);
        let questions = generator.generate(&[]).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn one_question_per_title_up_to_cap() {
        let generator = LocalTriviaGenerator::new(2);
        let titles: Vec<String> = ["Dune", "Inception", "Heat"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let questions = generator.generate(&titles).await.unwrap();
        assert_eq!(questions.len(), 2);
        for q in &questions {
            assert!(titles.contains(&q.correct_answer));
            assert_eq!(q.distractors.len(), 3);
            assert!(!q.distractors.contains(&q.correct_answer));
        }
    }

    #[tokio::test]
    async fn reviewed_titles_are_not_distractors() {
        let generator = LocalTriviaGenerator::new(20);
        let titles = vec!["The Matrix".to_string(), "Alien".to_string()];

        let questions = generator.generate(&titles).await.unwrap();
        for q in &questions {
            assert!(!q.distractors.iter().any(|d| titles.contains(d)));
        }
    }
}
