use crate::admin::AdminController;
use crate::gateway::Connect;
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use base64::Engine as _;
use moka::sync::Cache;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub const ADMIN_SESSION_COOKIE: &str = "folio_admin_session";
const MAX_SESSIONS: u64 = 1024;

pub type SharedController = Arc<Mutex<AdminController>>;

/// Admin page sessions keyed by the id in the private session cookie.
///
/// Each session owns one controller with its own backend session; idle sessions expire.
#[derive(Clone)]
pub struct AdminSessions {
    connector: Arc<dyn Connect>,
    controllers: Cache<String, SharedController>,
    idle: Duration,
}

fn generate_session_id() -> String {
    // 192 bits => 32 chars base64url (no padding).
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl AdminSessions {
    pub fn new(connector: Arc<dyn Connect>, idle: Duration) -> Self {
        let controllers = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle)
            .build();
        Self {
            connector,
            controllers,
            idle,
        }
    }

    /// Controller behind the cookie, or a fresh one (and a new cookie) when there is none.
    pub async fn resolve(
        &self,
        jar: PrivateCookieJar,
        secure: bool,
    ) -> (PrivateCookieJar, SharedController) {
        if let Some(controller) = jar
            .get(ADMIN_SESSION_COOKIE)
            .and_then(|cookie| self.controllers.get(cookie.value()))
        {
            return (jar, controller);
        }

        let id = generate_session_id();
        let mut controller = AdminController::new(self.connector.connect());
        controller.start().await;
        let controller = Arc::new(Mutex::new(controller));
        self.controllers.insert(id.clone(), controller.clone());
        debug!("Admin session started");

        let jar = jar.add(self.build_cookie(id, secure));
        (jar, controller)
    }

    fn build_cookie(&self, value: String, secure: bool) -> Cookie<'static> {
        let max_age = i64::try_from(self.idle.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((ADMIN_SESSION_COOKIE, value))
            .path("/admin")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }
}
