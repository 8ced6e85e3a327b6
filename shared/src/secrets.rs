//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

use crate::{Error, Result};

/// JSON form of the completion service credential secret.
#[derive(Debug, Deserialize)]
pub struct ApiKeySecret {
    #[serde(alias = "apiKey")]
    pub api_key: String,
}

/// Get a secret value from Secrets Manager.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    Ok(response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string())
}

/// Get the completion service API key from Secrets Manager.
pub async fn resolve_api_key(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_api_key(&secret_string)
}

/// Accept either a bare key or `{"api_key": "..."}`.
pub fn parse_api_key(secret_string: &str) -> Result<String> {
    let trimmed = secret_string.trim();

    let key = if trimmed.starts_with('{') {
        serde_json::from_str::<ApiKeySecret>(trimmed)
            .map_err(|e| Error::Config(format!("Failed to parse API key secret: {}", e)))?
            .api_key
    } else {
        trimmed.to_string()
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config("API key secret is empty".to_string()));
    }

    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_key() {
        assert_eq!(parse_api_key("  AIzaTestKey\n").unwrap(), "AIzaTestKey");
    }

    #[test]
    fn test_parse_json_key() {
        assert_eq!(parse_api_key(r#"{"api_key":"AIzaTestKey"}"#).unwrap(), "AIzaTestKey");
        assert_eq!(parse_api_key(r#"{"apiKey":"AIzaOther"}"#).unwrap(), "AIzaOther");
    }

    #[test]
    fn test_parse_empty_key() {
        assert!(matches!(parse_api_key("   "), Err(Error::Config(_))));
        assert!(matches!(parse_api_key(r#"{"api_key":""}"#), Err(Error::Config(_))));
        assert!(matches!(parse_api_key(r#"{"token":"x"}"#), Err(Error::Config(_))));
    }
}
