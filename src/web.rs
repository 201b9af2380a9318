use std::time::Duration;

use actix_files::Files;
use actix_session::config::BrowserSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ValidationError;
use crate::guard::{page_name, AccessGuard, GuardAction, HOME_PAGE};
use crate::session::SessionState;
use crate::storage::{FileStorage, StorageBackend};
use crate::store::AppointmentStore;
use crate::view::{
    confirmation_message, date_picker_settings, navbar_state, render_list, render_list_html,
    welcome_message, AppointmentListView, NavbarState,
};
use crate::workflow::{
    authenticate, create_appointment, AppointmentRequest, CredentialList, LoginRequest,
};

pub const SESSION_COOKIE: &str = "booking-session";

/// Session slot for a one-shot notice shown on the next page load.
pub const NOTICE_KEY: &str = "aviso";

/// Pause between a successful login and the navigation to the booking page.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

const LOGIN_LANDING_PAGE: &str = "turnos.html";

pub struct AppState {
    pub store: AppointmentStore<FileStorage>,
    pub credentials: CredentialList,
    pub guard: AccessGuard,
    pub date_locale: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let credentials = config.credentials();
        if credentials.is_empty() {
            warn!("no login credentials configured, nobody can log in");
        } else {
            info!(count = credentials.len(), "login credentials loaded");
        }

        Self {
            store: AppointmentStore::new(FileStorage::new(&config.data_file)),
            credentials,
            guard: AccessGuard::default(),
            date_locale: config.date_locale.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    logged_in: bool,
    username: Option<String>,
    is_admin: bool,
    navbar: NavbarState,
    notice: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    #[serde(flatten)]
    view: AppointmentListView,
    html: String,
}

fn page_template(name: &str) -> Option<&'static str> {
    match name {
        "index.html" => Some(include_str!("../templates/index.html")),
        "login.html" => Some(include_str!("../templates/login.html")),
        "turnos.html" => Some(include_str!("../templates/turnos.html")),
        "mis-turnos.html" => Some(include_str!("../templates/mis-turnos.html")),
        _ => None,
    }
}

fn error_response(err: &ValidationError) -> HttpResponse {
    let body = |message: String| serde_json::json!({"success": false, "error": message});
    match err {
        ValidationError::MissingField(_) | ValidationError::DuplicateAppointment => {
            HttpResponse::BadRequest().json(body(err.to_string()))
        }
        ValidationError::InvalidCredentials => {
            HttpResponse::Unauthorized().json(body(err.to_string()))
        }
        ValidationError::Storage(inner) => {
            error!(error = %inner, "storage failure");
            HttpResponse::InternalServerError().json(body("Storage is unavailable".to_string()))
        }
    }
}

// Page handler: guard first, then the template
async fn page(
    req: HttpRequest,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = match page_name(req.path()) {
        "" => HOME_PAGE,
        other => other,
    };
    let Some(html) = page_template(name) else {
        return Ok(HttpResponse::NotFound().body("Page not found"));
    };

    let session = SessionState::new(session);
    match state.guard.enforce(name, &session) {
        GuardAction::Allow => Ok(HttpResponse::Ok().content_type("text/html").body(html)),
        GuardAction::Redirect { target, notice } => {
            if let Err(err) = session.backend().set_item(NOTICE_KEY, notice) {
                warn!(error = %err, "could not store redirect notice");
            }
            Ok(HttpResponse::SeeOther()
                .insert_header((header::LOCATION, format!("/{}", target)))
                .finish())
        }
    }
}

// Session status endpoint; consumes the pending notice
async fn session_status(session: Session) -> Result<HttpResponse> {
    let session = SessionState::new(session);
    let notice = session.backend().get_item(NOTICE_KEY);
    if notice.is_some() {
        session.backend().remove_item(NOTICE_KEY);
    }
    let username = session.current_identity();

    Ok(HttpResponse::Ok().json(SessionResponse {
        logged_in: username.is_some(),
        is_admin: session.is_admin(),
        navbar: navbar_state(&session),
        username,
        notice,
    }))
}

async fn login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = SessionState::new(session);
    match authenticate(&state.credentials, &session, &req.username, &req.password) {
        Ok(credential) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "username": credential.username,
            "message": welcome_message(&credential.username),
            "redirect": LOGIN_LANDING_PAGE,
            "redirect_delay_ms": LOGIN_REDIRECT_DELAY.as_millis() as u64,
        }))),
        Err(err) => Ok(error_response(&err)),
    }
}

async fn logout(session: Session) -> Result<HttpResponse> {
    SessionState::new(session).logout();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "redirect": HOME_PAGE})))
}

fn login_required() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Login required"}))
}

async fn list_appointments(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = SessionState::new(session);
    if !session.is_logged_in() {
        return Ok(login_required());
    }

    let view = render_list(&state.store.load(), &session);
    let html = render_list_html(&view);
    Ok(HttpResponse::Ok().json(ListResponse { view, html }))
}

async fn add_appointment(
    req: web::Json<AppointmentRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = SessionState::new(session);
    if !session.is_logged_in() {
        return Ok(login_required());
    }

    match create_appointment(&state.store, &req.name, &req.doctor, &req.date) {
        Ok(appointment) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": confirmation_message(&appointment),
            "appointment": appointment,
        }))),
        Err(err) => Ok(error_response(&err)),
    }
}

async fn delete_appointment(
    index: web::Path<usize>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let session = SessionState::new(session);
    if !session.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(serde_json::json!({"success": false, "error": "Only the administrator can delete appointments"})));
    }

    let index = index.into_inner();
    match state.store.remove_at(index) {
        Ok(removed) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "removed": removed.is_some(),
        }))),
        Err(err) => Ok(error_response(&ValidationError::Storage(err))),
    }
}

async fn date_picker(state: web::Data<AppState>) -> Result<HttpResponse> {
    let today = chrono::Local::now().date_naive();
    Ok(HttpResponse::Ok().json(date_picker_settings(&state.date_locale, today)))
}

/// Cookie session scoped to the browser session (no expiry set on the cookie).
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(false)
        .session_lifecycle(BrowserSession::default())
        .build()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(Files::new("/static", "static"))
        .route("/api/session", web::get().to(session_status))
        .route("/api/login", web::post().to(login))
        .route("/api/logout", web::post().to(logout))
        .service(
            web::resource("/api/appointments")
                .route(web::get().to(list_appointments))
                .route(web::post().to(add_appointment)),
        )
        .route("/api/appointments/{index}", web::delete().to(delete_appointment))
        .route("/api/date-picker", web::get().to(date_picker))
        .route("/", web::get().to(page))
        .route("/{page}", web::get().to(page));
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::from_config(&config));
    let key = Key::generate();
    info!(data_file = %config.data_file.display(), "appointment storage");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
