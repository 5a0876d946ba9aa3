use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_QUESTION_BANK_PATH: &str = "data/interview_questions.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub openai_model: String,
    pub question_bank_path: String,
    pub interview_length: usize,
    pub public_rps: u32,
    pub llm_call_delay_ms: u64,
    pub llm_timeout_secs: u64,
    pub session_idle_ttl_secs: u64,
    pub finished_session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            openai_api_key: get_env("OPENAI_API_KEY")?,
            openai_api_url: get_env_or("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
            openai_model: get_env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            question_bank_path: get_env_or("QUESTION_BANK_PATH", DEFAULT_QUESTION_BANK_PATH),
            interview_length: get_env_parse_or("INTERVIEW_LENGTH", 3)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            llm_call_delay_ms: get_env_parse_or("LLM_CALL_DELAY_MS", 1000)?,
            llm_timeout_secs: get_env_parse_or("LLM_TIMEOUT_SECS", 120)?,
            session_idle_ttl_secs: get_env_parse_or("SESSION_IDLE_TTL_SECS", 1800)?,
            finished_session_ttl_secs: get_env_parse_or("FINISHED_SESSION_TTL_SECS", 300)?,
            session_sweep_interval_secs: get_env_parse_or("SESSION_SWEEP_INTERVAL_SECS", 60)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
