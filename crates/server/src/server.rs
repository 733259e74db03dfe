use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{accounts, items, payment_methods, reports, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves Basic credentials to an account and injects it into the request.
///
/// Every authenticated route sees the caller as an `Extension<Account>`;
/// there is no session cache, credentials are checked per request.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let account = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list))
        .route("/accounts/me", get(accounts::me))
        .route("/accounts/{id}", axum::routing::delete(accounts::delete))
        .route("/items", get(items::list).post(items::create))
        .route(
            "/items/{id}",
            axum::routing::patch(items::update).delete(items::delete),
        )
        .route("/items/{id}/reserve", post(items::reserve))
        .route("/items/{id}/rent", post(items::rent))
        .route("/items/{id}/cancel", post(items::cancel))
        .route(
            "/paymentMethods",
            get(payment_methods::list).post(payment_methods::create),
        )
        .route(
            "/paymentMethods/{id}",
            axum::routing::patch(payment_methods::update),
        )
        .route("/deposits", post(transactions::deposit_new))
        .route("/withdrawals", post(transactions::withdrawal_new))
        .route("/refunds", post(transactions::refund_request_new))
        .route("/refunds/direct", post(transactions::direct_refund))
        .route("/transactions", get(transactions::list))
        .route("/transactions/{id}/approve", post(transactions::approve))
        .route("/transactions/{id}/reject", post(transactions::reject))
        .route("/requests/pending", get(transactions::pending))
        .route("/income/unviewed", get(transactions::unviewed_income))
        .route("/income/viewed", post(transactions::mark_income_viewed))
        .route("/shift", get(reports::shift))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        // Self-registration is the only unauthenticated route.
        .route("/register", post(accounts::register))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use base64::Engine as _;
    use chrono::Utc;
    use engine::{RegisterAccountCmd, Role};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn state_with_db() -> ServerState {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        ServerState {
            engine: Arc::new(engine),
        }
    }

    fn basic(login: &str, password: &str) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{login}:{password}"));
        format!("Basic {encoded}")
    }

    fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_requests_are_refused() {
        let state = state_with_db().await;

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/accounts/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let state = state_with_db().await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/register",
                None,
                json!({"display_name": "Mario", "login": "mario", "password": "hunter2"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/accounts/me")
                    .header(header::AUTHORIZATION, basic("mario", "hunter2"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["login"], "mario");
        assert_eq!(body["balance_minor"], 0);
        assert_eq!(body["role"], "user");

        // Wrong password stays out.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/accounts/me")
                    .header(header::AUTHORIZATION, basic("mario", "nope"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn staff_routes_refuse_customers() {
        let state = state_with_db().await;
        state
            .engine
            .register_account(RegisterAccountCmd::new("Mario", "mario", "pw", Utc::now()))
            .await
            .unwrap();

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/requests/pending")
                    .header(header::AUTHORIZATION, basic("mario", "pw"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deposit_flow_over_http() {
        let state = state_with_db().await;
        state
            .engine
            .register_account(RegisterAccountCmd::new("Mario", "mario", "pw", Utc::now()))
            .await
            .unwrap();
        state
            .engine
            .register_account_with_role(
                RegisterAccountCmd::new("Boss", "boss", "pw", Utc::now()),
                Role::Admin,
            )
            .await
            .unwrap();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/deposits",
                Some(&basic("mario", "pw")),
                json!({"amount_minor": 700, "receipt_ref": "receipts/1.jpg"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let txn_id = body_json(response).await["id"].as_str().unwrap().to_string();

        // A customer cannot approve their own request.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/transactions/{txn_id}/approve"),
                Some(&basic("mario", "pw")),
                json!({"manual_amount_minor": null}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/transactions/{txn_id}/approve"),
                Some(&basic("boss", "pw")),
                json!({"manual_amount_minor": null}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "approved");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/accounts/me")
                    .header(header::AUTHORIZATION, basic("mario", "pw"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["balance_minor"], 700);
    }

    #[tokio::test]
    async fn withdrawal_beyond_balance_maps_to_422() {
        let state = state_with_db().await;
        state
            .engine
            .register_account(RegisterAccountCmd::new("Mario", "mario", "pw", Utc::now()))
            .await
            .unwrap();

        let response = router(state)
            .oneshot(json_request(
                "POST",
                "/withdrawals",
                Some(&basic("mario", "pw")),
                json!({"amount_minor": 10, "destination": "card"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
