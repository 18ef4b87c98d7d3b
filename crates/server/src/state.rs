use axum::extract::FromRef;
use cms::Cms;

use crate::session::CookiePolicy;

#[derive(Clone)]
pub struct AppState {
    pub cms: Cms,
    pub cookies: CookiePolicy,
}

impl FromRef<AppState> for Cms {
    fn from_ref(state: &AppState) -> Self {
        state.cms.clone()
    }
}

impl FromRef<AppState> for CookiePolicy {
    fn from_ref(state: &AppState) -> Self {
        state.cookies
    }
}
