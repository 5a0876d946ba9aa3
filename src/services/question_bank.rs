use crate::error::{Error, Result};
use crate::models::question::QuestionRecord;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use tokio::fs;

/// Read-only question collection, loaded once per process and shared by every session.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Cannot read question bank {}: {}", path.display(), e))
        })?;
        let bank = Self::from_json(&raw)?;
        tracing::info!(
            "Loaded {} questions from {}",
            bank.len(),
            path.display()
        );
        Ok(bank)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let records: Vec<QuestionRecord> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("Malformed question bank: {}", e)))?;

        let total = records.len();
        let questions: Vec<QuestionRecord> = records
            .into_iter()
            .filter(|q| !q.question.trim().is_empty())
            .collect();
        if questions.len() < total {
            tracing::warn!(
                "Skipped {} question bank entries with empty question text",
                total - questions.len()
            );
        }
        if questions.is_empty() {
            return Err(Error::Config("Question bank is empty".to_string()));
        }

        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    /// Picks `count` questions without replacement. A bank no larger than
    /// `count` is returned whole, in file order.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<QuestionRecord> {
        if self.questions.len() > count {
            self.questions.choose_multiple(rng, count).cloned().collect()
        } else {
            self.questions.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::DEFAULT_HINT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn bank_of(n: usize) -> QuestionBank {
        QuestionBank::new(
            (1..=n)
                .map(|i| QuestionRecord::new(format!("Question {}", i)))
                .collect(),
        )
    }

    #[test]
    fn sample_is_capped_and_distinct() {
        let bank = bank_of(5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = bank.sample(3, &mut rng);
            assert_eq!(picked.len(), 3);
            let unique: HashSet<_> = picked.iter().map(|q| q.question.clone()).collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn small_bank_is_returned_whole_in_order() {
        let bank = bank_of(2);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = bank.sample(3, &mut rng);
        assert_eq!(picked, bank.questions().to_vec());
    }

    #[test]
    fn from_json_applies_defaults_and_skips_blank_questions() {
        let bank = QuestionBank::from_json(
            r#"[
                {"question": "What does SUMIF do?", "rubric": "Conditional sum", "hint": "Think criteria."},
                {"question": "   "},
                {"question": "What is a named range?"}
            ]"#,
        )
        .unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions()[0].hint, "Think criteria.");
        assert_eq!(bank.questions()[1].rubric, "");
        assert_eq!(bank.questions()[1].hint, DEFAULT_HINT);
    }

    #[test]
    fn empty_or_malformed_bank_is_a_config_error() {
        assert!(matches!(QuestionBank::from_json("[]"), Err(Error::Config(_))));
        assert!(matches!(
            QuestionBank::from_json(r#"{"question": "not a list"}"#),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn bundled_bank_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/interview_questions.json");
        let bank = QuestionBank::load(path).await.unwrap();
        assert!(bank.len() >= 5);
        assert!(bank.questions().iter().all(|q| !q.rubric.is_empty()));
    }
}
