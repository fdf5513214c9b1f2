use crate::domain::auth::{AccessToken, CredentialValidator, Credentials, VerifiedUser};
use crate::forms::auth::CredentialsForm;
use crate::token::TokenIssuer;

use super::{ServiceError, ServiceResult};

fn issue(issuer: &TokenIssuer, user: &VerifiedUser) -> ServiceResult<AccessToken> {
    issuer.issue(user).map_err(|e| {
        log::error!("Failed to issue token for subject {}: {e}", user.id);
        ServiceError::Internal
    })
}

/// Verify existing credentials and issue a token.
pub fn login<V>(
    form: CredentialsForm,
    validator: &V,
    issuer: &TokenIssuer,
) -> ServiceResult<AccessToken>
where
    V: CredentialValidator,
{
    let credentials = Credentials::try_from(form)?;

    let user = validator.verify(&credentials).map_err(|e| {
        log::warn!("Login refused for {}: {e}", credentials.email);
        ServiceError::from(e)
    })?;

    issue(issuer, &user)
}

/// Register new credentials and issue a token for the created account.
pub fn register_user<V>(
    form: CredentialsForm,
    validator: &V,
    issuer: &TokenIssuer,
) -> ServiceResult<AccessToken>
where
    V: CredentialValidator,
{
    let credentials = Credentials::try_from(form)?;

    let user = validator.register(&credentials).map_err(|e| {
        log::warn!("Registration refused for {}: {e}", credentials.email);
        ServiceError::from(e)
    })?;

    issue(issuer, &user)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::domain::auth::CredentialRejection;
    use crate::settings::TokenSettings;

    /// Identity store keyed by e-mail.
    #[derive(Default)]
    struct StubValidator {
        users: RefCell<HashMap<String, String>>,
    }

    impl CredentialValidator for StubValidator {
        fn register(&self, credentials: &Credentials) -> Result<VerifiedUser, CredentialRejection> {
            let mut users = self.users.borrow_mut();
            if users.contains_key(&credentials.email) {
                return Err(CredentialRejection::DuplicateUser(credentials.email.clone()));
            }
            users.insert(credentials.email.clone(), credentials.password.clone());
            Ok(VerifiedUser {
                id: format!("user-{}", users.len()),
                user_name: credentials.email.clone(),
                display_name: None,
            })
        }

        fn verify(&self, credentials: &Credentials) -> Result<VerifiedUser, CredentialRejection> {
            match self.users.borrow().get(&credentials.email) {
                Some(password) if *password == credentials.password => Ok(VerifiedUser {
                    id: "user-1".to_string(),
                    user_name: credentials.email.clone(),
                    display_name: Some("Ana".to_string()),
                }),
                _ => Err(CredentialRejection::InvalidLogin),
            }
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenSettings {
            key: "service-test-signing-key-0123456789".to_string(),
            issuer: "catalogo".to_string(),
            audience: "catalogo-clients".to_string(),
            expire_hours: "1".to_string(),
        })
        .unwrap()
    }

    fn form(email: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_then_login_issues_tokens() {
        let validator = StubValidator::default();
        let issuer = issuer();

        let registered =
            register_user(form("ana@example.com", "Secr3t!"), &validator, &issuer).unwrap();
        let logged_in = login(form("ana@example.com", "Secr3t!"), &validator, &issuer).unwrap();

        assert!(registered.authenticated);
        let claims = issuer.verify(&logged_in.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.unique_name, "ana@example.com");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let validator = StubValidator::default();
        let issuer = issuer();
        register_user(form("ana@example.com", "Secr3t!"), &validator, &issuer).unwrap();

        let err = login(form("ana@example.com", "nope"), &validator, &issuer).unwrap_err();

        assert!(matches!(err, ServiceError::CredentialRejected(_)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let validator = StubValidator::default();
        let issuer = issuer();
        register_user(form("ana@example.com", "Secr3t!"), &validator, &issuer).unwrap();

        let err =
            register_user(form("ana@example.com", "Other1!"), &validator, &issuer).unwrap_err();

        assert_eq!(
            err,
            ServiceError::CredentialRejected("user ana@example.com already exists".to_string())
        );
    }

    #[test]
    fn malformed_email_never_reaches_validator() {
        let validator = StubValidator::default();

        let err = register_user(form("ana", "Secr3t!"), &validator, &issuer()).unwrap_err();

        assert!(matches!(err, ServiceError::ValidationFailed(_)));
        assert!(validator.users.borrow().is_empty());
    }
}
