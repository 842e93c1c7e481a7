use crate::model::User;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Register,
    Attendance,
    Students,
    Admin,
}

pub const DEFAULT_ROUTE: Route = Route::Attendance;

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/attendance" => Some(Route::Attendance),
            "/students" => Some(Route::Students),
            "/admin" => Some(Route::Admin),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Attendance => "/attendance",
            Route::Students => "/students",
            Route::Admin => "/admin",
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Allow(Route),
    Redirect(Route),
}

/// Guard predicate for a navigation request, given the signed-in user (if any).
pub fn resolve(path: &str, session: Option<&User>) -> Resolution {
    let Some(route) = Route::parse(path) else {
        return match session {
            Some(_) => Resolution::Redirect(DEFAULT_ROUTE),
            None => Resolution::Redirect(Route::Login),
        };
    };
    if route.is_public() {
        return Resolution::Allow(route);
    }
    match session {
        None => Resolution::Redirect(Route::Login),
        Some(user) if route == Route::Admin && !user.is_admin => Resolution::Redirect(DEFAULT_ROUTE),
        Some(_) => Resolution::Allow(route),
    }
}
