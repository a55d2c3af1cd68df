use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest};
use crate::utils::{JwtService, verify_password};

/// Operator login: a single shared password checked against a bcrypt hash
#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(jwt_service: JwtService, admin: AdminConfig) -> Self {
        Self { jwt_service, admin }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        if self.admin.password_hash.is_empty() {
            return Err(AppError::AuthError("Operator login is disabled".to_string()));
        }

        let password_hash = self.admin.password_hash.clone();
        let password = request.password;
        // bcrypt verification blocks, run it off the async workers
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Password check aborted: {e}")))??;

        if !valid {
            return Err(AppError::AuthError("Wrong password".to_string()));
        }

        let access_token = self.jwt_service.generate_operator_token()?;
        log::info!("Operator logged in");

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash_password;
    use assert_matches::assert_matches;

    fn service(password: &str) -> AuthService {
        let admin = AdminConfig {
            password_hash: if password.is_empty() {
                String::new()
            } else {
                hash_password(password).unwrap()
            },
        };
        AuthService::new(JwtService::new("test-secret", 3600), admin)
    }

    #[tokio::test]
    async fn correct_password_yields_operator_token() {
        let auth = service("hemmelig");
        let response = auth
            .login(LoginRequest {
                password: "hemmelig".into(),
            })
            .await
            .unwrap();
        let claims = JwtService::new("test-secret", 3600)
            .verify_access_token(&response.access_token)
            .unwrap();
        assert!(claims.is_operator());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service("hemmelig");
        assert_matches!(
            auth.login(LoginRequest {
                password: "feil".into()
            })
            .await,
            Err(AppError::AuthError(_))
        );
    }

    #[tokio::test]
    async fn login_disabled_without_hash() {
        let auth = service("");
        assert_matches!(
            auth.login(LoginRequest {
                password: "anything".into()
            })
            .await,
            Err(AppError::AuthError(_))
        );
    }
}
