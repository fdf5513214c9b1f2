//! Signed, time-bounded access tokens.
//!
//! Tokens are compact HS256 JWTs. Nothing is stored server-side; a token is
//! valid as long as its signature, issuer, audience and expiry check out.

use std::fmt::{Debug, Formatter};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::auth::{AccessToken, VerifiedUser};
use crate::settings::{ConfigurationError, TokenSettings};

/// Message attached to every issued [`AccessToken`].
pub const TOKEN_ISSUED: &str = "token issued";

/// Longest accepted token lifetime: one hundred years, in hours.
pub const MAX_LIFETIME_HOURS: f64 = 100.0 * 366.0 * 24.0;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token expiration is out of range")]
    ExpirationOutOfRange,
}

/// Claim set embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Verified subject identifier.
    pub sub: String,
    pub unique_name: String,
    /// Display name, only when the identity store knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens for one signing configuration.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: TimeDelta,
}

impl Debug for TokenIssuer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

fn require<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ConfigurationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigurationError::MissingValue(name))
    } else {
        Ok(trimmed)
    }
}

/// Parse a lifetime in hours into whole seconds.
fn parse_lifetime(raw: &str) -> Result<TimeDelta, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidTokenLifetime(raw.to_string());

    let hours: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_LIFETIME_HOURS {
        return Err(invalid());
    }

    let seconds = (hours * 3600.0).round();
    if seconds < 1.0 {
        return Err(invalid());
    }
    TimeDelta::try_seconds(seconds as i64).ok_or_else(invalid)
}

impl TokenIssuer {
    /// Validate the token configuration once, up front.
    pub fn new(settings: &TokenSettings) -> Result<Self, ConfigurationError> {
        // The key is used verbatim; only blank keys are refused.
        if settings.key.trim().is_empty() {
            return Err(ConfigurationError::MissingValue("jwt.key"));
        }
        let issuer = require("token_configuration.issuer", &settings.issuer)?;
        let audience = require("token_configuration.audience", &settings.audience)?;
        let lifetime = parse_lifetime(&settings.expire_hours)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.key.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            lifetime,
        })
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Issue a token for `user` valid from now.
    pub fn issue(&self, user: &VerifiedUser) -> Result<AccessToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user: &VerifiedUser,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, TokenError> {
        // JWT times have whole-second resolution.
        let issued_at = now.trunc_subsecs(0);
        let expiration = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or(TokenError::ExpirationOutOfRange)?;

        let claims = TokenClaims {
            sub: user.id.clone(),
            unique_name: user.user_name.clone(),
            name: user.display_name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;
        log::info!("Issued access token for subject {}", claims.sub);

        Ok(AccessToken {
            authenticated: true,
            token,
            expiration,
            message: TOKEN_ISSUED.to_string(),
        })
    }

    /// Check signature, issuer, audience and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;
        validation
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn settings(expire_hours: &str) -> TokenSettings {
        TokenSettings {
            key: "a-test-signing-key-that-is-long-enough".to_string(),
            issuer: "catalogo".to_string(),
            audience: "catalogo-clients".to_string(),
            expire_hours: expire_hours.to_string(),
        }
    }

    fn user(display_name: Option<&str>) -> VerifiedUser {
        VerifiedUser {
            id: "42".to_string(),
            user_name: "ana@example.com".to_string(),
            display_name: display_name.map(str::to_string),
        }
    }

    #[test]
    fn round_trip_recovers_claims() {
        let issuer = TokenIssuer::new(&settings("1")).unwrap();

        let access = issuer.issue(&user(Some("Ana"))).unwrap();
        let claims = issuer.verify(&access.token).unwrap();

        assert!(access.authenticated);
        assert_eq!(access.message, "token issued");
        assert_eq!(access.token.split('.').count(), 3);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.unique_name, "ana@example.com");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
        assert_eq!(claims.iss, "catalogo");
        assert_eq!(claims.aud, "catalogo-clients");
        assert_eq!(claims.exp, access.expiration.timestamp());
    }

    #[test]
    fn expiration_is_issue_time_plus_lifetime() {
        let issuer = TokenIssuer::new(&settings("1.5")).unwrap();
        let now = Utc::now();

        let access = issuer.issue_at(&user(None), now).unwrap();
        let claims = issuer.verify(&access.token).unwrap();

        assert_eq!(claims.exp - claims.iat, 5400);
        assert_eq!(access.expiration, now.trunc_subsecs(0) + TimeDelta::seconds(5400));
    }

    #[test]
    fn name_claim_is_omitted_without_display_name() {
        let issuer = TokenIssuer::new(&settings("1")).unwrap();

        let access = issuer.issue(&user(None)).unwrap();
        let raw = decode::<serde_json::Value>(
            &access.token,
            &issuer.decoding_key,
            &issuer.validation(),
        )
        .unwrap()
        .claims;

        assert!(raw.get("name").is_none());
        assert_eq!(raw["unique_name"], "ana@example.com");
    }

    #[test]
    fn rejects_token_for_another_audience() {
        let issuer = TokenIssuer::new(&settings("1")).unwrap();
        let mut other = settings("1");
        other.audience = "someone-else".to_string();
        let other = TokenIssuer::new(&other).unwrap();

        let access = other.issue(&user(None)).unwrap();

        assert!(matches!(
            issuer.verify(&access.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let issuer = TokenIssuer::new(&settings("1")).unwrap();
        let mut forged = settings("1");
        forged.key = "a-different-key-of-reasonable-length".to_string();
        let forged = TokenIssuer::new(&forged).unwrap();

        let access = forged.issue(&user(None)).unwrap();

        assert!(issuer.verify(&access.token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = TokenIssuer::new(&settings("1")).unwrap();
        let long_ago = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        let access = issuer.issue_at(&user(None), long_ago).unwrap();

        assert!(issuer.verify(&access.token).is_err());
    }

    #[test]
    fn rejects_malformed_lifetimes() {
        for raw in ["", "abc", "0", "-1", "NaN", "inf", "0.00001", "1e10", "878401"] {
            let err = TokenIssuer::new(&settings(raw)).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidTokenLifetime(_)),
                "lifetime {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn longest_accepted_lifetime_still_issues() {
        let issuer = TokenIssuer::new(&settings(&MAX_LIFETIME_HOURS.to_string())).unwrap();

        let access = issuer.issue(&user(None)).unwrap();
        let claims = issuer.verify(&access.token).unwrap();

        assert_eq!(claims.exp - claims.iat, issuer.lifetime().num_seconds());
        assert_eq!(issuer.lifetime().num_hours(), 878_400);
    }

    #[test]
    fn rejects_blank_key_issuer_or_audience() {
        let mut blank_key = settings("1");
        blank_key.key = "  ".to_string();
        assert!(matches!(
            TokenIssuer::new(&blank_key).unwrap_err(),
            ConfigurationError::MissingValue("jwt.key")
        ));

        let mut blank_issuer = settings("1");
        blank_issuer.issuer = String::new();
        assert!(matches!(
            TokenIssuer::new(&blank_issuer).unwrap_err(),
            ConfigurationError::MissingValue("token_configuration.issuer")
        ));

        let mut blank_audience = settings("1");
        blank_audience.audience = String::new();
        assert!(matches!(
            TokenIssuer::new(&blank_audience).unwrap_err(),
            ConfigurationError::MissingValue("token_configuration.audience")
        ));
    }
}
