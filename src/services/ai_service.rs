use crate::config::{DEFAULT_OPENAI_API_URL, DEFAULT_OPENAI_MODEL};
use crate::error::Result;
use crate::models::evaluation::{EvaluationResult, TurnRecord, MAX_SCORE, MIN_SCORE};
use crate::services::assessor::Assessor;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const REPORT_FAILURE_MESSAGE: &str = "Could not generate the final report due to an error.";

const EVALUATOR_SYSTEM_PROMPT: &str =
    "You are an expert Excel evaluator that only responds in valid JSON.";
const REPORT_SYSTEM_PROMPT: &str =
    "You are a helpful hiring manager writing a performance report in Markdown.";

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    call_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    score: JsonValue,
    #[serde(default)]
    justification: Option<String>,
}

impl AIService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            api_url: DEFAULT_OPENAI_API_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            call_delay: Duration::from_secs(1),
        }
    }

    pub fn with_endpoint(mut self, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.model = model.into();
        self
    }

    /// Pause awaited after every successful completion, to stay under provider rate limits.
    pub fn with_call_delay(mut self, call_delay: Duration) -> Self {
        self.call_delay = call_delay;
        self
    }

    async fn try_evaluate(&self, question: &str, answer: &str, rubric: &str) -> Result<EvaluationResult> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": EVALUATOR_SYSTEM_PROMPT},
                {"role": "user", "content": evaluation_prompt(question, answer, rubric)}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.1
        });

        let content = self.chat_openai(payload).await?;
        parse_evaluation(&content)
    }

    async fn try_generate_report(&self, results: &[TurnRecord]) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": REPORT_SYSTEM_PROMPT},
                {"role": "user", "content": report_prompt(&build_transcript(results))}
            ],
            "temperature": 0.4
        });

        let content = self.chat_openai(payload).await?;
        let report = content.trim();
        if report.is_empty() {
            return Err(anyhow::anyhow!("Model returned an empty report").into());
        }
        Ok(report.to_string())
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<String> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format"))?;

        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        Ok(content)
    }
}

#[async_trait]
impl Assessor for AIService {
    async fn evaluate_answer(&self, question: &str, answer: &str, rubric: &str) -> EvaluationResult {
        match self.try_evaluate(question, answer, rubric).await {
            Ok(evaluation) => {
                tracing::info!(score = evaluation.score, "Answer evaluated");
                evaluation
            }
            Err(e) => {
                tracing::error!("An error occurred during evaluation: {:?}", e);
                EvaluationResult::failed(e)
            }
        }
    }

    async fn generate_report(&self, results: &[TurnRecord]) -> String {
        match self.try_generate_report(results).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("An error occurred while generating the report: {:?}", e);
                REPORT_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

pub fn evaluation_prompt(question: &str, answer: &str, rubric: &str) -> String {
    let rubric = if rubric.trim().is_empty() {
        "No question-specific rubric was provided. Use the general scale above."
    } else {
        rubric
    };

    format!(
        r#"You are an expert Excel Interview Evaluator. Your task is to analyze a candidate's answer to an interview question.
You must provide a numeric score from 1 to 5 and a brief justification for your score based on the provided rubric.
Your entire output must be a single, valid JSON object of the form {{"score": <1-5>, "justification": "<text>"}}.

**Rubric:**
- 5: Excellent. The answer is accurate, complete, and demonstrates deep understanding.
- 4: Good. The answer is mostly correct but may have minor inaccuracies.
- 3: Satisfactory. The answer demonstrates a basic understanding but is incomplete or contains notable errors.
- 2: Poor. The answer is largely incorrect and shows a fundamental misunderstanding.
- 1: Very Poor. The answer is completely wrong or irrelevant.

**Interview Question:**
{question}

**Candidate's Answer:**
{answer}

**Evaluation Rubric for this question:**
{rubric}
"#
    )
}

pub fn report_prompt(transcript: &str) -> String {
    format!(
        r#"You are a helpful and constructive hiring manager, specializing in data roles.
Your task is to generate a final performance summary for a candidate who has just completed an Excel skills interview in Markdown format.

Based on the full transcript, provide a report with these sections:
1.  **Overall Summary:** A brief, 2-3 sentence paragraph summarizing the candidate's performance.
2.  **Strengths:** 2-3 bullet points highlighting what the candidate did well.
3.  **Areas for Improvement:** 2-3 bullet points with constructive feedback.
4.  **Final Recommendation:** A concluding sentence (e.g., "Recommend for next round," "Shows promise but needs more practice," "Not a strong fit at this time").

**Interview Transcript and Evaluations:**
{transcript}
"#
    )
}

pub fn build_transcript(results: &[TurnRecord]) -> String {
    let mut transcript = String::new();
    for (i, res) in results.iter().enumerate() {
        transcript.push_str(&format!("**Question {}:** {}\n", i + 1, res.question));
        transcript.push_str(&format!("**Candidate's Answer:** {}\n", res.answer));
        transcript.push_str(&format!("**Score:** {}/{}\n", res.evaluation.score, MAX_SCORE));
        transcript.push_str(&format!(
            "**Justification:** {}\n\n---\n\n",
            res.evaluation.justification
        ));
    }
    transcript
}

/// Parses the model's JSON reply. Scores outside 1-5 count as malformed output.
pub fn parse_evaluation(content: &str) -> Result<EvaluationResult> {
    let raw: RawEvaluation = serde_json::from_str(strip_code_fence(content))?;

    let score = match &raw.score {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| anyhow::anyhow!("Score is not an integer: {}", raw.score))?;

    if score < MIN_SCORE as i64 || score > MAX_SCORE as i64 {
        return Err(anyhow::anyhow!("Score {} is outside the {}-{} range", score, MIN_SCORE, MAX_SCORE).into());
    }

    let justification = raw
        .justification
        .map(|j| j.trim().to_string())
        .filter(|j| !j.is_empty())
        .unwrap_or_else(|| "No justification provided.".to_string());

    Ok(EvaluationResult::new(score as i32, justification))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
