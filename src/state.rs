use std::sync::Arc;

use crate::auth::AuthService;
use crate::store::TaskStore;

/// Process-wide state handed to every handler through `web::Data`.
///
/// Built once at startup; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub fn new(auth: AuthService, tasks: Arc<dyn TaskStore>) -> Self {
        Self { auth, tasks }
    }
}
