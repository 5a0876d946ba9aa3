pub mod ai_service;
pub mod assessor;
pub mod interview_service;
pub mod interview_session;
pub mod question_bank;
pub mod session_store;
