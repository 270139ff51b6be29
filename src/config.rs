use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Google Cloud project hosting the Firestore database
    pub firestore_project_id: String,

    /// Firestore database name
    #[serde(default = "default_firestore_database")]
    pub firestore_database: String,

    /// Firestore REST API base URL
    #[serde(default = "default_firestore_api_url")]
    pub firestore_api_url: String,

    /// Collection holding the platform's posts
    #[serde(default = "default_firestore_collection")]
    pub firestore_collection: String,

    /// Pre-issued OAuth bearer token, if the database is not public
    #[serde(default)]
    pub firestore_access_token: Option<String>,

    /// Request timeout for Firestore calls, in seconds
    #[serde(default = "default_firestore_timeout_secs")]
    pub firestore_timeout_secs: u64,

    /// Directory holding the persisted model snapshot
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Reload articles from Firestore before answering each query
    #[serde(default = "default_refresh_on_request")]
    pub refresh_on_request: bool,

    /// Origins allowed by the CORS layer (comma separated in the environment)
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_firestore_database() -> String {
    "(default)".to_string()
}

fn default_firestore_api_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_firestore_collection() -> String {
    "posts".to_string()
}

fn default_firestore_timeout_secs() -> u64 {
    30
}

fn default_model_dir() -> String {
    "ml_models_artelipi".to_string()
}

fn default_refresh_on_request() -> bool {
    true
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "https://artelipi.vercel.app".to_string(),
        "https://artelipi-frontend-production.up.railway.app".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let vars = vec![("FIRESTORE_PROJECT_ID".to_string(), "artelipi".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.firestore_project_id, "artelipi");
        assert_eq!(config.firestore_collection, "posts");
        assert_eq!(config.model_dir, "ml_models_artelipi");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!(config.refresh_on_request);
        assert!(config.firestore_access_token.is_none());
    }

    #[test]
    fn test_cors_origins_parse_comma_separated() {
        let vars = vec![
            ("FIRESTORE_PROJECT_ID".to_string(), "artelipi".to_string()),
            (
                "CORS_ALLOWED_ORIGINS".to_string(),
                "http://a.test,http://b.test".to_string(),
            ),
            ("REFRESH_ON_REQUEST".to_string(), "false".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.refresh_on_request);
    }

    #[test]
    fn test_missing_project_id_is_an_error() {
        let vars: Vec<(String, String)> = vec![];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
