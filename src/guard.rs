use tracing::debug;

use crate::session::SessionState;
use crate::storage::StorageBackend;

pub const LOGIN_PAGE: &str = "login.html";
pub const HOME_PAGE: &str = "index.html";

/// Notice shown to the user before the login redirect.
pub const LOGIN_REQUIRED_NOTICE: &str = "You must log in to access this page.";

const PROTECTED_PAGES: [&str; 2] = ["turnos.html", "mis-turnos.html"];

/// What the caller should do with a page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    Allow,
    Redirect {
        target: &'static str,
        notice: &'static str,
    },
}

/// Page-load check that sends anonymous visitors of protected pages to the login page.
///
/// This only shapes navigation; it is not a security boundary.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    protected: Vec<String>,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new(PROTECTED_PAGES)
    }
}

impl AccessGuard {
    pub fn new<I, S>(protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: protected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, page: &str) -> bool {
        self.protected.iter().any(|p| p == page)
    }

    /// Decides on `current_page_path`, matched by its last path segment.
    pub fn enforce<B: StorageBackend>(
        &self,
        current_page_path: &str,
        session: &SessionState<B>,
    ) -> GuardAction {
        let page = page_name(current_page_path);
        if self.is_protected(page) && !session.is_logged_in() {
            debug!(page, "protected page requested without a session");
            return GuardAction::Redirect {
                target: LOGIN_PAGE,
                notice: LOGIN_REQUIRED_NOTICE,
            };
        }
        GuardAction::Allow
    }
}

/// Last `/`-separated segment of a path, ignoring any query string.
pub fn page_name(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn anonymous() -> SessionState<MemoryStorage> {
        SessionState::new(MemoryStorage::new())
    }

    fn logged_in() -> SessionState<MemoryStorage> {
        let session = anonymous();
        session.login("paciente").unwrap();
        session
    }

    #[test]
    fn protected_page_without_session_redirects_to_login() {
        let guard = AccessGuard::default();
        assert_eq!(
            guard.enforce("turnos.html", &anonymous()),
            GuardAction::Redirect {
                target: LOGIN_PAGE,
                notice: LOGIN_REQUIRED_NOTICE,
            }
        );
        assert!(matches!(
            guard.enforce("/site/mis-turnos.html", &anonymous()),
            GuardAction::Redirect { .. }
        ));
    }

    #[test]
    fn protected_page_with_session_is_allowed() {
        let guard = AccessGuard::default();
        assert_eq!(guard.enforce("turnos.html", &logged_in()), GuardAction::Allow);
        assert_eq!(guard.enforce("/mis-turnos.html", &logged_in()), GuardAction::Allow);
    }

    #[test]
    fn public_pages_are_always_allowed() {
        let guard = AccessGuard::default();
        let session = anonymous();
        for path in ["/", "index.html", "/login.html", "/static/turnos.css"] {
            assert_eq!(guard.enforce(path, &session), GuardAction::Allow, "{path}");
        }
    }

    #[test]
    fn page_name_takes_last_segment() {
        assert_eq!(page_name("/a/b/turnos.html"), "turnos.html");
        assert_eq!(page_name("turnos.html?x=1"), "turnos.html");
        assert_eq!(page_name("/"), "");
    }

    #[test]
    fn custom_protected_set() {
        let guard = AccessGuard::new(["private.html"]);
        assert!(guard.is_protected("private.html"));
        assert_eq!(guard.enforce("turnos.html", &anonymous()), GuardAction::Allow);
    }
}
