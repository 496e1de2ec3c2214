//! Crate-level tests for the session manager, run against the in-memory store.

#[cfg(test)]
mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::kv::MemoryStore;
    use platform::password::ClearTextPassword;

    use crate::application::config::AuthConfig;
    use crate::domain::entity::account::Account;
    use crate::domain::repository::AccountRepository;
    use crate::domain::value_object::{role::Role, username::Username};
    use crate::infra::kv::KvAuthRepository;

    pub const PASSWORD: &str = "Shop#Pass2024";

    pub type Repo = KvAuthRepository<MemoryStore>;

    pub fn repo() -> Repo {
        KvAuthRepository::new(Arc::new(MemoryStore::new()), "session:")
    }

    pub fn config(ttl: Duration) -> Arc<AuthConfig> {
        Arc::new(AuthConfig::default().with_session_ttl(ttl))
    }

    pub async fn seed(repo: &Repo, username: &str, role: Role) -> Account {
        let password = ClearTextPassword::new(PASSWORD.to_string()).unwrap();
        let account = Account::provision(Username::parse(username).unwrap(), &password, role).unwrap();
        repo.save(&account).await.unwrap();
        account
    }
}

#[cfg(test)]
mod authenticate_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::fixtures::*;
    use crate::application::{AuthenticateInput, AuthenticateUseCase};
    use crate::domain::repository::{AccountRepository, SessionRepository};
    use crate::domain::value_object::{account_status::AccountStatus, role::Role};
    use crate::error::AuthError;

    fn input(username: &str, password: &str) -> AuthenticateInput {
        AuthenticateInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_persists_session() {
        let repo = Arc::new(repo());
        let account = seed(&repo, "shop_a", Role::Shop).await;
        let use_case = AuthenticateUseCase::new(repo.clone(), repo.clone(), config(Duration::from_secs(60)));

        let output = use_case.execute(input("Shop_A", PASSWORD)).await.unwrap();
        assert_eq!(output.account.id, account.id);
        assert_eq!(output.session.account_id, account.id);
        assert_eq!(output.session.role, Role::Shop);

        let stored = repo.find(&output.session_token).await.unwrap().unwrap();
        assert_eq!(stored, output.session);
        assert_eq!(stored.expires_at_ms - stored.created_at_ms, 60_000);
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let repo = Arc::new(repo());
        let mut disabled = seed(&repo, "closed_shop", Role::Shop).await;
        disabled.status = AccountStatus::Disabled;
        repo.save(&disabled).await.unwrap();
        seed(&repo, "shop_a", Role::Shop).await;

        let use_case = AuthenticateUseCase::new(repo.clone(), repo.clone(), config(Duration::from_secs(60)));

        for attempt in [
            input("shop_a", "wrong-password"),
            input("nobody_here", PASSWORD),
            input("closed_shop", PASSWORD),
            input("x", PASSWORD),
        ] {
            let err = use_case.execute(attempt).await.err().unwrap();
            assert!(matches!(err, AuthError::InvalidCredentials));
            assert_eq!(err.to_string(), "Invalid credentials");
        }
    }
}

#[cfg(test)]
mod validate_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::fixtures::*;
    use crate::application::{AuthenticateInput, AuthenticateUseCase, ValidateSessionUseCase};
    use crate::domain::repository::{AccountRepository, SessionRepository};
    use crate::domain::value_object::{
        account_status::AccountStatus, role::Role, session_token::SessionToken,
    };
    use crate::error::AuthError;

    async fn sign_in(repo: &Arc<Repo>, username: &str, ttl: Duration) -> SessionToken {
        AuthenticateUseCase::new(repo.clone(), repo.clone(), config(ttl))
            .execute(AuthenticateInput {
                username: username.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap()
            .session_token
    }

    #[tokio::test]
    async fn test_valid_session_resolves_account() {
        let repo = Arc::new(repo());
        let account = seed(&repo, "shop_a", Role::Shop).await;
        let token = sign_in(&repo, "shop_a", Duration::from_secs(60)).await;

        let validated = ValidateSessionUseCase::new(repo.clone(), repo.clone())
            .execute(token.expose())
            .await
            .unwrap();
        assert_eq!(validated.id, account.id);
        assert_eq!(validated.role, Role::Shop);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_tokens() {
        let repo = Arc::new(repo());
        let validate = ValidateSessionUseCase::new(repo.clone(), repo.clone());
        let unknown = SessionToken::generate();

        for raw in ["", "garbage", unknown.expose()] {
            let err = validate.execute(raw).await.unwrap_err();
            assert!(matches!(err, AuthError::SessionInvalid));
        }
    }

    #[tokio::test]
    async fn test_validation_does_not_renew() {
        let repo = Arc::new(repo());
        seed(&repo, "shop_a", Role::Shop).await;
        let token = sign_in(&repo, "shop_a", Duration::from_secs(60)).await;
        let before = repo.find(&token).await.unwrap().unwrap();

        let validate = ValidateSessionUseCase::new(repo.clone(), repo.clone());
        validate.execute(token.expose()).await.unwrap();
        validate.execute(token.expose()).await.unwrap();

        let after = repo.find(&token).await.unwrap().unwrap();
        assert_eq!(before.expires_at_ms, after.expires_at_ms);
    }

    #[tokio::test]
    async fn test_expired_session_requires_reauthentication() {
        let repo = Arc::new(repo());
        seed(&repo, "shop_a", Role::Shop).await;
        let token = sign_in(&repo, "shop_a", Duration::from_millis(60)).await;
        let validate = ValidateSessionUseCase::new(repo.clone(), repo.clone());
        validate.execute(token.expose()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(
            validate.execute(token.expose()).await.unwrap_err(),
            AuthError::SessionInvalid
        ));

        let fresh = sign_in(&repo, "shop_a", Duration::from_secs(60)).await;
        assert_ne!(fresh, token);
        assert!(validate.execute(fresh.expose()).await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_or_demoted_account_invalidates_session() {
        let repo = Arc::new(repo());
        let mut account = seed(&repo, "staff_a", Role::Staff).await;
        let validate = ValidateSessionUseCase::new(repo.clone(), repo.clone());

        let token = sign_in(&repo, "staff_a", Duration::from_secs(60)).await;
        account.role = Role::Shop;
        repo.save(&account).await.unwrap();
        assert!(validate.execute(token.expose()).await.is_err());
        // Invalid sessions are removed
        assert!(repo.find(&token).await.unwrap().is_none());

        let token = sign_in(&repo, "staff_a", Duration::from_secs(60)).await;
        account.status = AccountStatus::Disabled;
        repo.save(&account).await.unwrap();
        assert!(matches!(
            validate.execute(token.expose()).await.unwrap_err(),
            AuthError::SessionInvalid
        ));
    }
}

#[cfg(test)]
mod sign_out_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::fixtures::*;
    use crate::application::{
        AuthenticateInput, AuthenticateUseCase, SignOutUseCase, ValidateSessionUseCase,
    };
    use crate::domain::value_object::role::Role;

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let repo = Arc::new(repo());
        seed(&repo, "shop_a", Role::Shop).await;
        let token = AuthenticateUseCase::new(repo.clone(), repo.clone(), config(Duration::from_secs(60)))
            .execute(AuthenticateInput {
                username: "shop_a".into(),
                password: PASSWORD.into(),
            })
            .await
            .unwrap()
            .session_token;

        let sign_out = SignOutUseCase::new(repo.clone());
        sign_out.execute(token.expose()).await.unwrap();
        sign_out.execute(token.expose()).await.unwrap();
        sign_out.execute("not-a-token").await.unwrap();

        let validate = ValidateSessionUseCase::new(repo.clone(), repo.clone());
        assert!(validate.execute(token.expose()).await.is_err());
    }
}

#[cfg(test)]
mod store_failure_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::kv::{CasOutcome, FieldMap, KvStore, StoreError};

    use crate::application::{AuthenticateInput, AuthenticateUseCase};
    use crate::error::AuthError;
    use crate::infra::kv::KvAuthRepository;

    struct SlowStore;

    impl KvStore for SlowStore {
        async fn get_fields(&self, _: &str) -> Result<Option<FieldMap>, StoreError> {
            Err(StoreError::Timeout("get_fields"))
        }
        async fn put_fields(&self, _: &str, _: &FieldMap, _: Option<Duration>) -> Result<(), StoreError> {
            Err(StoreError::Timeout("put_fields"))
        }
        async fn put_fields_if_absent(
            &self,
            _: &str,
            _: &FieldMap,
            _: Option<Duration>,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Timeout("put_fields_if_absent"))
        }
        async fn compare_and_set(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &FieldMap,
            _: Option<&str>,
        ) -> Result<CasOutcome, StoreError> {
            Err(StoreError::Timeout("compare_and_set"))
        }
        async fn put_records(&self, _: &[(&str, &FieldMap)]) -> Result<(), StoreError> {
            Err(StoreError::Timeout("put_records"))
        }
        async fn delete(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Timeout("delete"))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Timeout("ping"))
        }
    }

    #[tokio::test]
    async fn test_store_timeout_is_not_a_credential_error() {
        let repo = Arc::new(KvAuthRepository::new(Arc::new(SlowStore), "session:"));
        let err = AuthenticateUseCase::new(repo.clone(), repo, super::fixtures::config(Duration::from_secs(60)))
            .execute(AuthenticateInput {
                username: "shop_a".into(),
                password: "whatever".into(),
            })
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AuthError::Store(StoreError::Timeout(_))));
        assert_eq!(err.status_code(), 504);
    }
}

#[cfg(test)]
mod http_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::fixtures::*;
    use crate::application::config::AuthConfig;
    use crate::domain::value_object::role::Role;
    use crate::presentation::handlers::AuthAppState;
    use crate::presentation::router::auth_routes;

    async fn app() -> Router {
        let repo = repo();
        seed(&repo, "shop_a", Role::Shop).await;
        auth_routes(AuthAppState::new(repo, AuthConfig::default()))
    }

    fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_me_logout_flow() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                json!({"username": "shop_a", "password": PASSWORD}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["sessionToken"].as_str().unwrap().to_string();
        assert_eq!(body["account"]["role"], "shop");
        assert!(body["expiresAt"].as_i64().is_some());
        assert!(body["account"].get("credentialHash").is_none());

        let me = app
            .clone()
            .oneshot(json_request("GET", "/me", json!({}), Some(&token)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(body_json(me).await["username"], "shop_a");

        let logout = app
            .clone()
            .oneshot(json_request("POST", "/logout", json!({}), Some(&token)))
            .await
            .unwrap();
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);

        let me = app
            .oneshot(json_request("GET", "/me", json!({}), Some(&token)))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_login_is_401_problem() {
        let response = app()
            .await
            .oneshot(json_request(
                "POST",
                "/login",
                json!({"username": "shop_a", "password": "nope"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        let body = body_json(response).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["title"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_me_without_bearer() {
        let response = app()
            .await
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
