use clinic_core::prelude::StoreError;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/spreadsheets.readonly",
];

const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Service-account identity used to sign the token request.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountCredentials {
    /// Accepts a PEM key whose newlines were flattened to literal `\n`, which
    /// is how CI secret stores usually hold it.
    pub fn new(client_email: impl Into<String>, private_key: &str) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.replace("\\n", "\n"),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Claims<'a> {
    pub iss: &'a str,
    pub scope: String,
    pub aud: &'a str,
    pub iat: u64,
    pub exp: u64,
}

pub(crate) fn claims(email: &str, issued_at: u64) -> Claims<'_> {
    Claims {
        iss: email,
        scope: SCOPES.join(" "),
        aud: TOKEN_URI,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// An authenticated connection to the Google APIs. Created once per run by
/// [`GoogleSession::initialize`] and handed to [`crate::GoogleStore`].
#[derive(Clone)]
pub struct GoogleSession {
    pub(crate) client: Client,
    access_token: String,
}

impl GoogleSession {
    /// Signs a service-account assertion and exchanges it for an access token.
    pub async fn initialize(credentials: &ServiceAccountCredentials) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent("ClinicSync/0.1")
            .build()
            .map_err(|e| StoreError::Generic(format!("Failed to build HTTP client: {e}")))?;

        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Generic(e.to_string()))?
            .as_secs();

        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("Invalid service account key: {e}")))?;
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &claims(&credentials.client_email, issued_at),
            &key,
        )
        .map_err(|e| StoreError::Auth(format!("Failed to sign assertion: {e}")))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let res = client
            .post(TOKEN_URI)
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::Generic(format!("Network error: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("Token exchange returned {status}: {text}")));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|_| StoreError::Auth("Failed to parse token response".into()))?;

        debug!(
            account = %credentials.client_email,
            expires_in = token.expires_in,
            "Google session initialized"
        );

        Ok(Self {
            client,
            access_token: token.access_token,
        })
    }

    pub(crate) fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.access_token)
    }
}
