use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_ONEDRIVE_FOLDER_URL: &str = "https://graph.microsoft.com/v1.0/me/drive/root:/Documents/College Documents/S4DS/Knowhow Reports/";

/// Client-credentials for the Microsoft Graph upload
#[derive(Debug, Clone)]
pub struct GraphCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_base_url: String,
    /// `None` when no Graph credentials are configured; uploads are skipped.
    pub graph: Option<GraphCredentials>,
    pub onedrive_folder_url: String,
    pub college_logo: PathBuf,
    pub club_logo: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let groq_api_key = get("GROQ_API_KEY").context(
            "GROQ_API_KEY not found.\n\n\
            To fix this, create ~/.config/knowhow-report/.env with:\n  \
            GROQ_API_KEY=your_key_here\n  \
            MS_CLIENT_ID=...\n  \
            MS_CLIENT_SECRET=...\n  \
            MS_TENANT_ID=...\n\n\
            Get your Groq API key from: https://console.groq.com/keys",
        )?;

        let graph = match (
            get("MS_CLIENT_ID"),
            get("MS_CLIENT_SECRET"),
            get("MS_TENANT_ID"),
        ) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => Some(GraphCredentials {
                client_id,
                client_secret,
                tenant_id,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "Incomplete OneDrive credentials: MS_CLIENT_ID, MS_CLIENT_SECRET and MS_TENANT_ID \
                must all be set, or none of them."
            ),
        };

        Ok(Self {
            groq_api_key,
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            groq_base_url: get("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            graph,
            onedrive_folder_url: get("ONEDRIVE_FOLDER_URL")
                .unwrap_or_else(|| DEFAULT_ONEDRIVE_FOLDER_URL.to_string()),
            college_logo: get("KNOWHOW_COLLEGE_LOGO")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("collegelogo.png")),
            club_logo: get("KNOWHOW_CLUB_LOGO")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logo.jpg")),
        })
    }

    /// Header logos in the order they appear in the document
    pub fn logo_paths(&self) -> Vec<PathBuf> {
        vec![self.college_logo.clone(), self.club_logo.clone()]
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/knowhow-report/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("knowhow-report").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = config_from(&[("GROQ_API_KEY", "gsk_test")]).unwrap();
        assert_eq!(config.groq_api_key, "gsk_test");
        assert_eq!(config.groq_model, DEFAULT_MODEL);
        assert_eq!(config.groq_base_url, DEFAULT_GROQ_BASE_URL);
        assert!(config.graph.is_none());
        assert_eq!(
            config.logo_paths(),
            vec![PathBuf::from("collegelogo.png"), PathBuf::from("logo.jpg")]
        );
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(config_from(&[("GROQ_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn test_full_graph_credentials() {
        let config = config_from(&[
            ("GROQ_API_KEY", "k"),
            ("MS_CLIENT_ID", "id"),
            ("MS_CLIENT_SECRET", "secret"),
            ("MS_TENANT_ID", "tenant"),
        ])
        .unwrap();
        let graph = config.graph.unwrap();
        assert_eq!(graph.client_id, "id");
        assert_eq!(graph.tenant_id, "tenant");
    }

    #[test]
    fn test_partial_graph_credentials_rejected() {
        let err = config_from(&[("GROQ_API_KEY", "k"), ("MS_CLIENT_ID", "id")]).unwrap_err();
        assert!(err.to_string().contains("Incomplete OneDrive credentials"));
    }
}
