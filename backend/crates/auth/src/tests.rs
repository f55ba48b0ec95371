//! Router-level tests for the auth crate
//! Every request goes through `filter_request` exactly as in production.

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::password::{Argon2Verifier, ClearTextPassword};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::config::{AuthConfig, AuthType};
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_password::UserPassword};
    use crate::infra::file::FileAuthRepository;
    use crate::presentation::{AuthAppState, auth_router};

    /// "a@b.com:secret"
    const GOOD_BASIC: &str = "Basic YUBiLmNvbTpzZWNyZXQ=";
    /// "a@b.com:wrong"
    const WRONG_BASIC: &str = "Basic YUBiLmNvbTp3cm9uZw==";

    struct TestApp {
        _dir: tempfile::TempDir,
        router: Router,
        user: User,
    }

    impl TestApp {
        async fn new(auth_type: Option<AuthType>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
            let verifier = Arc::new(Argon2Verifier::default().with_cost(1024, 1).unwrap());

            let password =
                UserPassword::from_raw(&ClearTextPassword::new("secret"), verifier.as_ref()).unwrap();
            let user = User::new(Email::new("a@b.com").unwrap(), password);
            repo.save(&user).await.unwrap();

            let config = AuthConfig {
                auth_type,
                ..AuthConfig::default()
            };
            let router = auth_router(AuthAppState::new(repo, config, verifier));

            Self {
                _dir: dir,
                router,
                user,
            }
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
            let response = self.router.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, headers, body)
        }

        async fn get(&self, uri: &str, extra: Option<(header::HeaderName, &str)>) -> (StatusCode, Value) {
            let mut builder = Request::builder().uri(uri);
            if let Some((name, value)) = extra {
                builder = builder.header(name, value);
            }
            let (status, _, body) = self.send(builder.body(Body::empty()).unwrap()).await;
            (status, body)
        }

        async fn form(&self, method: Method, uri: &str, body: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, Value) {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap()).await
        }

        async fn login(&self) -> String {
            let (status, headers, _) = self
                .form(Method::POST, "/api/v1/auth_session/login", "email=a@b.com&password=secret", None)
                .await;
            assert_eq!(status, StatusCode::OK);

            let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
            set_cookie.split(';').next().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn test_public_routes() {
        let app = TestApp::new(Some(AuthType::Basic)).await;

        assert_eq!(
            app.get("/api/v1/status", None).await,
            (StatusCode::OK, json!({ "status": "OK" }))
        );
        assert_eq!(
            app.get("/api/v1/unauthorized", None).await,
            (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
        );
        assert_eq!(
            app.get("/api/v1/forbidden", None).await,
            (StatusCode::FORBIDDEN, json!({ "error": "Forbidden" }))
        );
    }

    #[tokio::test]
    async fn test_no_authenticator_means_no_filter() {
        let app = TestApp::new(None).await;

        let (status, body) = app.get("/api/v1/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        assert_eq!(
            app.get("/api/v1/stats", None).await,
            (StatusCode::OK, json!({ "users": 1 }))
        );
        assert_eq!(
            app.get("/api/v1/nowhere", None).await,
            (StatusCode::NOT_FOUND, json!({ "error": "Not found" }))
        );
    }

    #[tokio::test]
    async fn test_base_authenticator_rejects_everyone() {
        let app = TestApp::new(Some(AuthType::Base)).await;

        let (status, _) = app.get("/api/v1/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .get("/api/v1/users", Some((header::AUTHORIZATION, GOOD_BASIC)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_basic_auth_filter() {
        let app = TestApp::new(Some(AuthType::Basic)).await;

        let (status, body) = app.get("/api/v1/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (status, body) = app
            .get("/api/v1/users", Some((header::AUTHORIZATION, WRONG_BASIC)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Forbidden" }));

        let (status, _) = app
            .get("/api/v1/users", Some((header::AUTHORIZATION, "Basic Holberton")))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let non_ascii = Request::builder()
            .uri("/api/v1/users")
            .header(header::AUTHORIZATION, HeaderValue::from_bytes(b"Basic \xff\xfe").unwrap())
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = app.send(non_ascii).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .get("/api/v1/users/me", Some((header::AUTHORIZATION, GOOD_BASIC)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["id"], app.user.id.to_string());
        assert!(body.get("_password").is_none());
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let app = TestApp::new(None).await;
        let post = |body: &'static str| {
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let (status, _, body) = app.send(post(r#"{"password": "pwd"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "email missing" }));

        let (status, _, body) = app.send(post(r#"{"email": "c@d.com"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "password missing" }));

        let (status, _, body) = app.send(post("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Wrong format" }));

        let (status, _, body) = app.send(post(r#"{"email": "a@b.com", "password": "x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "email already registered" }));

        let (status, _, body) = app
            .send(post(r#"{"email": "c@d.com", "password": "pwd", "first_name": "Bob"}"#))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "c@d.com");
        assert_eq!(body["first_name"], "Bob");

        let (status, _, body) = app
            .send(post(r#"{"email": "0b7c3c4e-8f3a-4b8e-9a61-1f2d3e4c5b6a", "password": "pwd"}"#))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "0b7c3c4e-8f3a-4b8e-9a61-1f2d3e4c5b6a");
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let app = TestApp::new(None).await;
        let uri = format!("/api/v1/users/{}", app.user.id);

        let req = Request::builder()
            .method(Method::PUT)
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"last_name": "Dylan"}"#))
            .unwrap();
        let (status, _, body) = app.send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_name"], "Dylan");

        let delete = || {
            Request::builder()
                .method(Method::DELETE)
                .uri(&uri)
                .body(Body::empty())
                .unwrap()
        };
        let (status, _, body) = app.send(delete()).await;
        assert_eq!((status, body), (StatusCode::OK, json!({})));
        let (status, _, _) = app.send(delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get("/api/v1/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_login_errors() {
        let app = TestApp::new(Some(AuthType::Session)).await;
        let login = "/api/v1/auth_session/login";

        let (status, _, body) = app.form(Method::POST, login, "password=secret", None).await;
        assert_eq!((status, body), (StatusCode::BAD_REQUEST, json!({ "error": "email missing" })));

        let (status, _, body) = app.form(Method::POST, login, "email=a@b.com", None).await;
        assert_eq!((status, body), (StatusCode::BAD_REQUEST, json!({ "error": "password missing" })));

        let (status, _, body) = app
            .form(Method::POST, login, "email=x@y.com&password=secret", None)
            .await;
        assert_eq!(
            (status, body),
            (StatusCode::NOT_FOUND, json!({ "error": "no user found for this email" }))
        );

        let (status, _, body) = app
            .form(Method::POST, login, "email=a@b.com&password=wrong", None)
            .await;
        assert_eq!((status, body), (StatusCode::UNAUTHORIZED, json!({ "error": "wrong password" })));
    }

    #[tokio::test]
    async fn test_session_login_logout_flow() {
        for auth_type in [AuthType::Session, AuthType::SessionExp, AuthType::SessionDb] {
            let app = TestApp::new(Some(auth_type)).await;

            let (status, _) = app.get("/api/v1/users/me", None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);

            let cookie = app.login().await;
            assert!(cookie.starts_with("_my_session_id="));

            let (status, body) = app.get("/api/v1/users/me", Some((header::COOKIE, cookie.as_str()))).await;
            assert_eq!(status, StatusCode::OK, "{auth_type}");
            assert_eq!(body["email"], "a@b.com");

            let (status, _, body) = app
                .form(Method::DELETE, "/api/v1/auth_session/logout", "", Some(cookie.as_str()))
                .await;
            assert_eq!((status, body), (StatusCode::OK, json!({})), "{auth_type}");

            let (status, _) = app.get("/api/v1/users/me", Some((header::COOKIE, cookie.as_str()))).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{auth_type}");
        }
    }

    #[tokio::test]
    async fn test_login_requires_session_authenticator() {
        let app = TestApp::new(Some(AuthType::Basic)).await;
        let (status, _, _) = app
            .form(Method::POST, "/api/v1/auth_session/login", "email=a@b.com&password=secret", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let app = TestApp::new(Some(AuthType::SessionDb)).await;

        let (status, _, body) = app
            .form(Method::POST, "/api/v1/reset_password", "email=nobody@b.com", None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Forbidden" }));

        let (status, _, body) = app
            .form(Method::POST, "/api/v1/reset_password", "email=a@b.com", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["reset_token"].as_str().unwrap().to_string();

        let update = format!("email=a@b.com&reset_token={token}&new_password=t4rt1fl3tt3");
        let (status, _, body) = app.form(Method::PUT, "/api/v1/reset_password", &update, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "email": "a@b.com", "message": "Password updated" }));

        let (status, _, _) = app
            .form(Method::POST, "/api/v1/auth_session/login", "email=a@b.com&password=t4rt1fl3tt3", None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
