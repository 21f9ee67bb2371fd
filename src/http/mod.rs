//! The HTTP surface (§6): a single `mod_xml_curl`-style POST endpoint that
//! dispatches on the posted `section` field, grounded on the teacher's
//! `server::create_router` (CORS + tracing layered over an axum `Router`
//! sharing an `Arc<AppState>`).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::cnam::CnamClient;
use crate::config::AppConfig;
use crate::models::CallVars;
use crate::resolver::{configuration, dialplan, directory};
use crate::store::SwitchStore;
use crate::xml::directory::emit_directory;

pub struct AppState {
    pub store: Arc<dyn SwitchStore>,
    pub cnam: CnamClient,
    pub config: AppConfig,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/", post(lookup))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

const XML_CONTENT_TYPE: &str = "application/xml";

/// Dispatches on `section` (§6): `directory`, `dialplan`, or
/// `configuration`. A missing section is a client error; anything else
/// recognized always returns `200` with a well-formed document, even when
/// the lookup itself misses (§7).
async fn lookup(State(state): State<Arc<AppState>>, Form(params): Form<HashMap<String, String>>) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let vars = CallVars::new(params);

    let section = match vars.section() {
        Some(section) => section,
        None => return (StatusCode::BAD_REQUEST, "missing section").into_response(),
    };

    let span = tracing::info_span!("lookup", %request_id, section);

    async {
        match section {
            "directory" => directory_response(&state, &vars).await,
            "dialplan" => dialplan_response(&state, &vars).await,
            "configuration" => configuration_response(&state, &vars).await,
            other => {
                tracing::warn!(section = %other, "unrecognized section");
                (StatusCode::NOT_FOUND, "unrecognized section").into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn directory_response(state: &AppState, vars: &CallVars) -> Response {
    let domain = match vars.domain() {
        Some(domain) => domain,
        None => return xml_response(emit_directory("", None)),
    };
    let user_id = match vars.directory_user_id() {
        Some(user_id) => user_id,
        None => return xml_response(emit_directory(domain, None)),
    };

    let result = if vars.action() == Some("voicemail-lookup") {
        directory::resolve_voicemail_lookup(&*state.store, domain, user_id).await
    } else {
        directory::resolve_directory(&*state.store, domain, user_id).await
    };

    match result {
        Ok(user) => xml_response(emit_directory(domain, user.as_ref())),
        Err(err) => {
            tracing::error!(error = %err, "directory resolution failed");
            xml_response(emit_directory(domain, None))
        }
    }
}

async fn dialplan_response(state: &AppState, vars: &CallVars) -> Response {
    let program = dialplan::resolve(&state.config, &*state.store, &state.cnam, vars).await;
    xml_response(crate::xml::emit_dialplan(&program))
}

async fn configuration_response(state: &AppState, vars: &CallVars) -> Response {
    match configuration::resolve_configuration(&state.config, &*state.store, vars.config_key_name()).await {
        Ok(xml) => xml_response(xml),
        Err(err) => {
            tracing::error!(error = %err, "configuration resolution failed");
            xml_response(crate::xml::configuration::emit_not_found())
        }
    }
}

fn xml_response(body: String) -> Response {
    (StatusCode::OK, [("content-type", XML_CONTENT_TYPE)], body).into_response()
}
