pub const CREDENTIAL_ENV_VAR: &str = "GROQ_API_KEY";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_INDEX_PATH: &str = "vectorstore/index.db";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "http://127.0.0.1:8080/v1";
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_RETRIEVAL_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SESSION_COOKIE: &str = "medichat_session";
