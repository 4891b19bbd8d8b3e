//! End-to-end tests for the HTTP API
//!
//! Each test starts the real router on an ephemeral port, backed by a fresh
//! on-disk database and a quote source that never touches the network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use quotarium::config::Config;
use quotarium::db;
use quotarium::quotes::{Locale, QuoteSource};
use quotarium::routes;
use quotarium::state::{AppState, DbPool};

const PASSWORD: &str = "Abcdef12";

struct FixedQuotes;

#[async_trait]
impl QuoteSource for FixedQuotes {
    async fn fetch(&self, locale: Locale) -> String {
        format!("Fixed quote — {}", locale)
    }
}

struct TestServer {
    base: String,
    client: Client,
    pool: DbPool,
    cookie_name: String,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("test.db")).expect("create pool");
        db::run_migrations(&pool).expect("run migrations");

        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        let cookie_name = config.auth.cookie_name.clone();

        let state = AppState {
            db: pool.clone(),
            config,
            quotes: Arc::new(FixedQuotes),
        };
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base: format!("http://{}", addr),
            client,
            pool,
            cookie_name,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn register(&self, username: &str, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Register and log in, returning a `Cookie` header value.
    async fn login_as(&self, username: &str) -> String {
        let res = self
            .register(username, &format!("{}@example.com", username))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let token = res
            .cookies()
            .find(|c| c.name() == self.cookie_name)
            .map(|c| c.value().to_string())
            .expect("session cookie");
        format!("{}={}", self.cookie_name, token)
    }

    fn count(&self, sql: &str) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }
}

#[tokio::test]
async fn health_check() {
    let server = TestServer::start().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn register_reports_every_validation_problem() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/register"))
        .json(&json!({
            "username": "al",
            "email": "nope",
            "password": "abc",
            "confirm_password": "abd",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["problems"].as_array().unwrap().len(), 4);
    assert_eq!(server.count("SELECT COUNT(*) FROM users"), 0);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let server = TestServer::start().await;

    let first = server.register("alice", "alice@example.com").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = server.register("alice", "different@example.com").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        server.count("SELECT COUNT(*) FROM users WHERE username = 'alice'"),
        1
    );
}

#[tokio::test]
async fn failed_logins_are_indistinguishable() {
    let server = TestServer::start().await;
    server.register("alice", "alice@example.com").await;

    let wrong_password = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "username": "alice", "password": "Wrongpass9" }))
        .send()
        .await
        .unwrap();
    let unknown_user = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "username": "mallory", "password": PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.text().await.unwrap(),
        unknown_user.text().await.unwrap()
    );
}

#[tokio::test]
async fn anonymous_new_quote_is_not_recorded() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/new-quote"))
        .json(&json!({ "language": "en" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["quote"], "Fixed quote — en");
    assert_eq!(body["locale"], "en");
    assert_eq!(body["message"], "Quote updated");
    assert_eq!(server.count("SELECT COUNT(*) FROM quotes"), 0);
}

#[tokio::test]
async fn new_quote_without_body_uses_default_locale() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/new-quote"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["locale"], "ru");
    assert_eq!(body["message"], "Цитата обновлена");
}

#[tokio::test]
async fn accept_language_selects_locale() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/"))
        .header("Accept-Language", "en-US,en;q=0.9,ru;q=0.5")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["quote"], "Fixed quote — en");
}

#[tokio::test]
async fn change_language_sets_cookie_and_redirects_back() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/change-language/en"))
        .header("Referer", "/history")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/history");
    let lang = res
        .cookies()
        .find(|c| c.name() == "quotarium_lang")
        .map(|c| c.value().to_string());
    assert_eq!(lang.as_deref(), Some("en"));

    // The cookie beats Accept-Language
    let res = server
        .client
        .get(server.url("/"))
        .header("Cookie", "quotarium_lang=en")
        .header("Accept-Language", "ru")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["locale"], "en");
}

#[tokio::test]
async fn unsupported_language_is_ignored() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/change-language/de"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/");
    assert!(res.cookies().next().is_none());
}

#[tokio::test]
async fn logged_in_quotes_build_history_newest_first() {
    let server = TestServer::start().await;
    let cookie = server.login_as("alice").await;

    for language in ["en", "ru", "en"] {
        let res = server
            .client
            .post(server.url("/new-quote"))
            .header("Cookie", &cookie)
            .json(&json!({ "language": language }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = server
        .client
        .get(server.url("/history"))
        .header("Cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let entries: Vec<Value> = res.json().await.unwrap();
    let texts: Vec<&str> = entries.iter().map(|e| e["text"].as_str().unwrap()).collect();
    assert_eq!(
        texts,
        vec!["Fixed quote — en", "Fixed quote — ru", "Fixed quote — en"]
    );
    assert!(entries.iter().all(|e| e["timestamp"].is_string()));
}

#[tokio::test]
async fn history_requires_login() {
    let server = TestServer::start().await;
    let res = server.client.get(server.url("/history")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vote_requires_login() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/vote"))
        .header("Accept-Language", "en")
        .json(&json!({ "quote": "Q", "vote": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Please log in first");
    assert_eq!(server.count("SELECT COUNT(*) FROM votes"), 0);
}

#[tokio::test]
async fn vote_login_check_comes_before_the_body() {
    let server = TestServer::start().await;

    let no_body = server
        .client
        .post(server.url("/vote"))
        .header("Accept-Language", "en")
        .send()
        .await
        .unwrap();
    assert_eq!(no_body.status(), StatusCode::UNAUTHORIZED);
    let body: Value = no_body.json().await.unwrap();
    assert_eq!(body["error"], "Please log in first");

    let plain_text = server
        .client
        .post(server.url("/vote"))
        .header("Content-Type", "text/plain")
        .body("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(plain_text.status(), StatusCode::UNAUTHORIZED);
    let body: Value = plain_text.json().await.unwrap();
    assert_eq!(body["error"], "Пожалуйста, войдите в систему");

    let broken_json = server
        .client
        .post(server.url("/vote"))
        .header("Content-Type", "application/json")
        .body("{\"quote\":")
        .send()
        .await
        .unwrap();
    assert_eq!(broken_json.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(server.count("SELECT COUNT(*) FROM votes"), 0);
}

#[tokio::test]
async fn vote_rejects_bad_requests() {
    let server = TestServer::start().await;
    let cookie = server.login_as("alice").await;

    for payload in [
        json!({ "quote": "Q", "vote": "love" }),
        json!({ "quote": "", "vote": "like" }),
        json!({ "vote": "like" }),
        json!({ "quote": "Q" }),
        json!({ "quote": "Q", "vote": 1 }),
        json!({ "quote": 5, "vote": "like" }),
        json!({ "quote": null, "vote": "like" }),
        json!(["Q", "like"]),
    ] {
        let res = server
            .client
            .post(server.url("/vote"))
            .header("Cookie", &cookie)
            .header("Accept-Language", "en")
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Invalid request", "{}", payload);
    }
    assert_eq!(server.count("SELECT COUNT(*) FROM votes"), 0);
}

#[tokio::test]
async fn vote_with_unparseable_body_is_a_localized_bad_request() {
    let server = TestServer::start().await;
    let cookie = server.login_as("alice").await;

    for (content_type, body) in [
        ("text/plain", "garbage"),
        ("application/json", "{\"quote\":"),
        ("application/json", ""),
    ] {
        let res = server
            .client
            .post(server.url("/vote"))
            .header("Cookie", &cookie)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{:?}", body);
        let json: Value = res.json().await.unwrap();
        assert_eq!(json["error"], "Некорректный запрос", "{:?}", body);
    }
    assert_eq!(server.count("SELECT COUNT(*) FROM votes"), 0);
}

#[tokio::test]
async fn like_and_dislike_share_one_quote_row() {
    let server = TestServer::start().await;
    let cookie = server.login_as("alice").await;

    for kind in ["like", "dislike"] {
        let res = server
            .client
            .post(server.url("/vote"))
            .header("Cookie", &cookie)
            .json(&json!({ "quote": "Q", "vote": kind }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(server.count("SELECT COUNT(*) FROM quotes WHERE text = 'Q'"), 1);
    assert_eq!(server.count("SELECT COUNT(*) FROM votes"), 2);

    let res = server
        .client
        .get(server.url("/votes"))
        .query(&[("quote", "Q")])
        .send()
        .await
        .unwrap();
    let tally: Value = res.json().await.unwrap();
    assert_eq!(tally, json!({ "likes": 1, "dislikes": 1 }));
}

#[tokio::test]
async fn tally_requires_quote() {
    let server = TestServer::start().await;
    let res = server.client.get(server.url("/votes")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_and_logout() {
    let server = TestServer::start().await;
    let cookie = server.login_as("alice").await;

    let res = server
        .client
        .get(server.url("/me"))
        .header("Cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["username"], "alice");
    assert!(me.get("password_hash").is_none());

    let res = server
        .client
        .post(server.url("/logout"))
        .header("Cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(server.count("SELECT COUNT(*) FROM sessions"), 0);

    let res = server
        .client
        .get(server.url("/me"))
        .header("Cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
