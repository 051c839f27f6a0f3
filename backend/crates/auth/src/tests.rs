//! Integration-style tests for the auth crate
//! (token lifecycle, revocation store release, use cases, HTTP surface)

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use platform::cache::{
        CacheClient, CacheError, CacheOp, CacheResult, CacheStore, MemoryCache,
    };
    use platform::crypto::HmacFingerprinter;
    use platform::password::{KdfHasher, KdfParams};
    use tokio::sync::Mutex;

    use crate::application::config::AuthConfig;
    use crate::application::token_authority::SessionTokenAuthority;
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{user_id::UserId, user_name::UserName};
    use crate::error::{AuthError, AuthResult};

    pub const SECRET: &str = "an-hs256-secret-of-sufficient-length";
    pub const SALT: &str = "a-process-wide-password-salt";

    pub fn config(lifetime: &str) -> Arc<AuthConfig> {
        Arc::new(AuthConfig::new(lifetime, SECRET, SALT).unwrap())
    }

    pub fn fingerprinter() -> Arc<HmacFingerprinter> {
        Arc::new(HmacFingerprinter::new(SALT.as_bytes()))
    }

    pub fn kdf(salt: &str) -> KdfHasher {
        KdfHasher::new(salt.as_bytes(), KdfParams::insecure_fast()).unwrap()
    }

    pub fn authority(
        lifetime: &str,
        cache: &MemoryCache,
    ) -> SessionTokenAuthority<HmacFingerprinter, MemoryCache> {
        SessionTokenAuthority::new(config(lifetime), fingerprinter(), Arc::new(cache.clone()))
    }

    // ------------------------------------------------------------------------
    // In-memory user repository
    // ------------------------------------------------------------------------

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        users: Mutex<HashMap<String, User>>,
    }

    impl UserRepository for InMemoryUserRepository {
        async fn create(&self, user: &User) -> AuthResult<()> {
            let mut users = self.users.lock().await;
            if users.contains_key(user.user_name.as_str()) {
                return Err(AuthError::UserNameTaken);
            }
            users.insert(user.user_name.as_str().to_string(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            let users = self.users.lock().await;
            Ok(users.values().find(|u| &u.id == user_id).cloned())
        }

        async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
            let users = self.users.lock().await;
            Ok(users.get(user_name.as_str()).cloned())
        }
    }

    // ------------------------------------------------------------------------
    // Misbehaving cache
    // ------------------------------------------------------------------------

    #[derive(Debug, Clone, Copy)]
    pub enum Failure {
        /// connect fails
        Unreachable,
        /// connect succeeds, every query fails
        Query,
    }

    /// Cache whose stores fail, counting calls to `disconnect`
    #[derive(Clone)]
    pub struct FailingCache {
        failure: Failure,
        pub queries: Arc<AtomicUsize>,
        pub disconnects: Arc<AtomicUsize>,
    }

    impl FailingCache {
        pub fn new(failure: Failure) -> Self {
            Self {
                failure,
                queries: Arc::new(AtomicUsize::new(0)),
                disconnects: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn disconnects(&self) -> usize {
            self.disconnects.load(Ordering::SeqCst)
        }

        pub fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    pub struct FailingStore(FailingCache);

    impl CacheClient for FailingCache {
        type Store = FailingStore;

        fn store(&self) -> FailingStore {
            FailingStore(self.clone())
        }
    }

    impl FailingStore {
        fn fail(&self, operation: CacheOp) -> CacheError {
            self.0.queries.fetch_add(1, Ordering::SeqCst);
            CacheError::query(operation, "connection reset by peer")
        }
    }

    impl CacheStore for FailingStore {
        async fn connect(&self) -> CacheResult<()> {
            match self.0.failure {
                Failure::Unreachable => Err(CacheError::Connection("connection refused".into())),
                Failure::Query => Ok(()),
            }
        }

        async fn disconnect(&self) -> CacheResult<()> {
            self.0.disconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn set(&self, _key: &str, _value: &str, _ttl_secs: i64) -> CacheResult<()> {
            Err(self.fail(CacheOp::Set))
        }

        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(self.fail(CacheOp::Get))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(self.fail(CacheOp::Delete))
        }
    }
}

// ============================================================================
// Token lifecycle
// ============================================================================

#[cfg(test)]
mod lifecycle_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use platform::cache::{CacheClient, CacheStore, MemoryCache};
    use platform::password::Hasher;

    use super::support::*;
    use crate::application::token_authority::SessionTokenAuthority;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_token_expires_after_lifetime() {
        let cache = MemoryCache::new();
        // `iat` is truncated to the second, so a 2s lifetime leaves at least
        // one full second of validity right after issue
        let authority = authority("2s", &cache);

        let token = authority.issue("u1", None).unwrap();
        assert_eq!(authority.verify(&token).unwrap().subject, "u1");

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(matches!(authority.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_revoke_is_separate_from_verify() {
        let cache = MemoryCache::new();
        let authority = authority("2h", &cache);

        let token = authority.issue("u2", None).unwrap();
        let verified = authority.verify(&token).unwrap();
        assert!(!authority.is_revoked(&token).await.unwrap());

        authority
            .revoke(&token, "u2", verified.expires_at)
            .await
            .unwrap();

        assert!(authority.is_revoked(&token).await.unwrap());
        // verify は失効リストを参照しない
        assert_eq!(authority.verify(&token).unwrap().subject, "u2");
    }

    #[tokio::test]
    async fn test_revoke_past_expiry_stores_nothing() {
        let cache = MemoryCache::new();
        let authority = authority("2h", &cache);
        let token = authority.issue("u4", None).unwrap();

        let before = cache.len().await;
        authority
            .revoke(&token, "u4", Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();
        authority.revoke(&token, "u4", Utc::now()).await.unwrap();

        assert_eq!(cache.len().await, before);
        assert!(!authority.is_revoked(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_twice_is_idempotent() {
        let cache = MemoryCache::new();
        let authority = authority("2h", &cache);
        let token = authority.issue("u5", None).unwrap();
        let expires_at = authority.verify(&token).unwrap().expires_at;

        authority.revoke(&token, "u5", expires_at).await.unwrap();
        authority.revoke(&token, "u5", expires_at).await.unwrap();

        assert_eq!(cache.len().await, 1);
        let store = cache.store();
        store.connect().await.unwrap();
        let key = authority.revocation_key(&token).unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("u5"));
    }

    #[tokio::test]
    async fn test_revocations_are_per_token() {
        let cache = MemoryCache::new();
        let authority = authority("2h", &cache);
        let first = authority.issue("u6", None).unwrap();
        let second = authority.issue("u6", Some(&serde_json::Map::from_iter([(
            "device".to_string(),
            serde_json::Value::from("phone"),
        )])))
        .unwrap();
        assert_ne!(first, second);

        authority.revoke_token(&first).await.unwrap();
        assert!(authority.is_revoked(&first).await.unwrap());
        assert!(!authority.is_revoked(&second).await.unwrap());
    }

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let a = kdf(SALT);
        let b = kdf("some-other-process-wide-salt");

        let first = a.hash("Secret123!").unwrap();
        assert_eq!(first, a.hash("Secret123!").unwrap());
        assert_ne!(first, b.hash("Secret123!").unwrap());

        assert!(a.compare("Secret123!", &first).unwrap());
        assert!(!a.compare("Secret123?", &first).unwrap());
    }

    #[tokio::test]
    async fn test_is_revoked_releases_store_on_query_failure() {
        let cache = FailingCache::new(Failure::Query);
        let authority =
            SessionTokenAuthority::new(config("2h"), fingerprinter(), Arc::new(cache.clone()));
        let token = authority.issue("u1", None).unwrap();

        let err = authority.is_revoked(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::CacheQuery { .. }));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(cache.disconnects(), 1);

        let err = authority
            .revoke(&token, "u1", Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CacheQuery { .. }));
        assert_eq!(cache.disconnects(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_surfaces_connection_error() {
        let cache = FailingCache::new(Failure::Unreachable);
        let authority =
            SessionTokenAuthority::new(config("2h"), fingerprinter(), Arc::new(cache.clone()));
        let token = authority.issue("u1", None).unwrap();

        assert!(matches!(
            authority.is_revoked(&token).await,
            Err(AuthError::CacheConnection(_))
        ));
        assert_eq!(cache.queries(), 0);
        assert_eq!(cache.disconnects(), 1);
    }

    #[tokio::test]
    async fn test_revoke_expired_skips_store_entirely() {
        let cache = FailingCache::new(Failure::Unreachable);
        let authority =
            SessionTokenAuthority::new(config("2h"), fingerprinter(), Arc::new(cache.clone()));
        let token = authority.issue("u1", None).unwrap();

        authority
            .revoke(&token, "u1", Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(cache.disconnects(), 0);
    }
}

// ============================================================================
// Use cases
// ============================================================================

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use chrono::Utc;
    use platform::cache::MemoryCache;
    use platform::crypto::HmacFingerprinter;
    use platform::password::KdfHasher;

    use super::support::*;
    use crate::application::{
        AuthenticateUseCase, AuthenticatedSession, CurrentUserUseCase, LoginUserInput,
        LoginUserUseCase, LogoutUserUseCase, RegisterUserInput, RegisterUserUseCase,
        SessionTokenAuthority,
    };
    use crate::error::AuthError;

    struct Harness {
        users: Arc<InMemoryUserRepository>,
        passwords: Arc<KdfHasher>,
        tokens: Arc<SessionTokenAuthority<HmacFingerprinter, MemoryCache>>,
        cache: MemoryCache,
    }

    impl Harness {
        fn new() -> Self {
            let cache = MemoryCache::new();
            Self {
                users: Arc::new(InMemoryUserRepository::default()),
                passwords: Arc::new(kdf(SALT)),
                tokens: Arc::new(authority("2h", &cache)),
                cache,
            }
        }

        async fn register(&self, username: &str, password: &str) -> Result<String, AuthError> {
            RegisterUserUseCase::new(self.users.clone(), self.passwords.clone())
                .execute(RegisterUserInput {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await
                .map(|out| out.user_id)
        }

        async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
            LoginUserUseCase::new(
                self.users.clone(),
                self.passwords.clone(),
                self.tokens.clone(),
            )
            .execute(LoginUserInput {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .map(|out| out.access_token)
        }

        async fn authenticate(&self, token: &str) -> Result<AuthenticatedSession, AuthError> {
            AuthenticateUseCase::new(self.tokens.clone())
                .execute(token)
                .await
        }
    }

    #[tokio::test]
    async fn test_register_login_and_current_user() {
        let h = Harness::new();
        let user_id = h.register("  Alice ", "correct horse").await.unwrap();

        let token = h.login("ALICE", "correct horse").await.unwrap();
        let session = h.authenticate(&token).await.unwrap();
        assert_eq!(session.subject, user_id);

        let user = CurrentUserUseCase::new(h.users.clone())
            .execute(&session)
            .await
            .unwrap();
        assert_eq!(user.user_name.as_str(), "alice");
        assert_eq!(user.id.as_str(), user_id);
        assert_ne!(user.password.as_str(), "correct horse");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let h = Harness::new();
        h.register("bob", "password123").await.unwrap();

        assert!(matches!(
            h.register("BOB", "another-password").await,
            Err(AuthError::UserNameTaken)
        ));
        assert!(matches!(
            h.register("b", "password123").await,
            Err(AuthError::Validation { field: "username", .. })
        ));
        assert!(matches!(
            h.register("carol", "short").await,
            Err(AuthError::Validation { field: "password", .. })
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = Harness::new();
        h.register("dave", "password123").await.unwrap();

        let wrong_password = h.login("dave", "password124").await.unwrap_err();
        let unknown_user = h.login("erin", "password123").await.unwrap_err();
        let invalid_name = h.login("!", "password123").await.unwrap_err();

        for err in [&wrong_password, &unknown_user, &invalid_name] {
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(
            wrong_password.to_app_error().code(),
            "USER_INVALID_CREDENTIALS_ERROR"
        );
    }

    #[tokio::test]
    async fn test_logout_revokes_and_is_idempotent() {
        let h = Harness::new();
        h.register("frank", "password123").await.unwrap();
        let token = h.login("frank", "password123").await.unwrap();
        let session = h.authenticate(&token).await.unwrap();

        let logout = LogoutUserUseCase::new(h.tokens.clone());
        logout.execute(&session).await.unwrap();
        assert!(matches!(
            h.authenticate(&token).await,
            Err(AuthError::TokenRevoked)
        ));

        logout.execute(&session).await.unwrap();
        assert_eq!(h.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_gate_checks_expiry_before_store() {
        let cache = FailingCache::new(Failure::Query);
        let tokens = Arc::new(SessionTokenAuthority::new(
            config("2s"),
            fingerprinter(),
            Arc::new(cache.clone()),
        ));
        let token = tokens.issue("u1", None).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
        let gate = AuthenticateUseCase::new(tokens);
        assert!(matches!(gate.execute(&token).await, Err(AuthError::TokenExpired)));
        assert!(matches!(gate.execute("forged").await, Err(AuthError::TokenInvalid)));
        assert_eq!(cache.queries(), 0);
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let h = Harness::new();
        let session = AuthenticatedSession {
            token: String::new(),
            subject: "does-not-exist".to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        };

        assert!(matches!(
            CurrentUserUseCase::new(h.users.clone())
                .execute(&session)
                .await,
            Err(AuthError::UserNotFound)
        ));
    }
}

// ============================================================================
// HTTP surface
// ============================================================================

#[cfg(test)]
mod http_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use platform::cache::MemoryCache;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::presentation::{AuthAppState, auth_router};

    fn app() -> Router {
        let cache = MemoryCache::new();
        let state = AuthAppState::new(
            InMemoryUserRepository::default(),
            kdf(SALT),
            authority("2h", &cache),
        );
        Router::new().nest("/auth", auth_router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_token(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn register_and_login(app: &Router) -> String {
        let credentials = json!({"username": "grace", "password": "password123"});

        let (status, body) = send(app, post_json("/auth/register", credentials.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");

        let (status, body) = send(app, post_json("/auth/login", credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_full_session_flow() {
        let app = app();
        let token = register_and_login(&app).await;

        let (status, body) = send(&app, with_token("GET", "/auth/me", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "grace");
        assert!(body["id"].is_string());
        assert!(body["createdAt"].is_string());
        assert!(body.get("password").is_none());

        let (status, body) = send(&app, with_token("POST", "/auth/logout", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User successfully logged out");

        let (status, body) = send(&app, with_token("GET", "/auth/me", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token has been revoked. Please login again");
        assert_eq!(body["statusCode"], 401);
    }

    #[tokio::test]
    async fn test_gate_rejections() {
        let app = app();

        let request = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No access token provided");

        let (status, body) = send(&app, with_token("GET", "/auth/me", "a.b.c")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid authentication token");
        assert_eq!(body["errorCode"], "TOKEN_INVALID_ERROR");

        let (status, _) = send(&app, with_token("POST", "/auth/logout", "a.b.c")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_conflict_and_login_failure() {
        let app = app();
        register_and_login(&app).await;

        let (status, body) = send(
            &app,
            post_json("/auth/register", json!({"username": "Grace", "password": "password456"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errorCode"], "USER_NAME_ALREADY_TAKEN_ERROR");

        let (status, body) = send(
            &app,
            post_json("/auth/login", json!({"username": "grace", "password": "nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "USER_INVALID_CREDENTIALS_ERROR");
        assert_eq!(body["message"], "Invalid username or password");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let app = app();

        let (status, body) = send(
            &app,
            post_json("/auth/register", json!({"username": "x", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "INVALID_INPUT_REQUEST_ERROR");
    }
}
