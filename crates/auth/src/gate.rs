//! Access gate: path classification and the per-request allow/deny decision.
//!
//! No IO, no clock, no key material. The gate consumes the outcome of
//! [`SessionCodec::verify`](crate::SessionCodec::verify) and a static route table.

use crate::{Identity, InvalidSession, SessionPayload};

/// Classification of a request path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathClass {
    /// Requires an authenticated ADMIN or EDITOR.
    Protected,
    /// Always reachable, signed in or not.
    Public,
    /// Matches neither list; allowed.
    Unclassified,
}

/// Outcome of gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Identity),
    /// No usable session on a protected path.
    RedirectToLogin,
    /// Signed in, but the role may not enter the back office.
    Deny,
}

/// Static route classification table.
///
/// Evaluated in order: public exact paths first, then protected prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public_paths: Vec<String>,
    protected_prefixes: Vec<String>,
}

impl RouteTable {
    pub fn new<P, Q>(protected_prefixes: P, public_paths: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            protected_prefixes: protected_prefixes
                .into_iter()
                .map(|p| normalize(p.into()))
                .collect(),
            public_paths: public_paths.into_iter().map(|p| normalize(p.into())).collect(),
        }
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    pub fn classify(&self, path: &str) -> PathClass {
        let path = trim_trailing_slash(path);

        if self.public_paths.iter().any(|p| p == path) {
            return PathClass::Public;
        }
        if self
            .protected_prefixes
            .iter()
            .any(|prefix| has_segment_prefix(path, prefix))
        {
            return PathClass::Protected;
        }
        PathClass::Unclassified
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(
            ["/admin", "/api/admin"],
            [
                "/",
                "/login",
                "/signup",
                "/api/auth/login",
                "/api/auth/signup",
                "/api/auth/logout",
                "/api/auth/session",
            ],
        )
    }
}

fn normalize(path: String) -> String {
    let trimmed = trim_trailing_slash(&path);
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// `/admin` covers `/admin` and `/admin/...`, never `/administrator`.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Applies the decision table to one request.
#[derive(Debug, Clone)]
pub struct AccessGate {
    routes: RouteTable,
}

impl AccessGate {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn evaluate(
        &self,
        path: &str,
        session: &Result<SessionPayload, InvalidSession>,
    ) -> GateDecision {
        decide(self.routes.classify(path), session)
    }
}

/// The decision table, independent of paths.
pub fn decide(class: PathClass, session: &Result<SessionPayload, InvalidSession>) -> GateDecision {
    let identity = match session {
        Ok(payload) => Identity::authenticated(payload.subject_id().clone(), payload.role()),
        Err(InvalidSession) => Identity::anonymous(),
    };

    match class {
        PathClass::Public | PathClass::Unclassified => GateDecision::Allow(identity),
        PathClass::Protected => match identity.role {
            None => GateDecision::RedirectToLogin,
            Some(role) if role.is_elevated() => GateDecision::Allow(identity),
            Some(_) => GateDecision::Deny,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, Utc};

    use crate::{Role, SubjectId};

    fn payload(role: Role) -> SessionPayload {
        SessionPayload::new(SubjectId::new("s-1").unwrap(), role, Utc::now(), Duration::days(7))
            .unwrap()
    }

    #[test]
    fn classification_is_segment_aware() {
        let table = RouteTable::default();

        assert_eq!(table.classify("/admin"), PathClass::Protected);
        assert_eq!(table.classify("/admin/"), PathClass::Protected);
        assert_eq!(table.classify("/admin/coupons/42"), PathClass::Protected);
        assert_eq!(table.classify("/api/admin/stores"), PathClass::Protected);
        assert_eq!(table.classify("/administrator"), PathClass::Unclassified);
        assert_eq!(table.classify("/"), PathClass::Public);
        assert_eq!(table.classify("/login"), PathClass::Public);
        assert_eq!(table.classify("/login/"), PathClass::Public);
        assert_eq!(table.classify("/stores/amazon"), PathClass::Unclassified);
        assert_eq!(table.classify("/health"), PathClass::Unclassified);
    }

    #[test]
    fn public_exact_match_wins_over_protected_prefix() {
        let table = RouteTable::new(["/admin"], ["/admin/login"]);
        assert_eq!(table.classify("/admin/login"), PathClass::Public);
        assert_eq!(table.classify("/admin/login/extra"), PathClass::Protected);
    }

    #[test]
    fn entries_are_normalized() {
        let table = RouteTable::new(["admin/"], ["login/"]);
        assert_eq!(table.protected_prefixes(), ["/admin".to_string()]);
        assert_eq!(table.public_paths(), ["/login".to_string()]);
    }

    #[test]
    fn protected_without_session_redirects_to_login() {
        assert_eq!(
            decide(PathClass::Protected, &Err(InvalidSession)),
            GateDecision::RedirectToLogin
        );
    }

    #[test]
    fn protected_with_elevated_role_is_allowed() {
        for role in [Role::Admin, Role::Editor] {
            match decide(PathClass::Protected, &Ok(payload(role))) {
                GateDecision::Allow(identity) => {
                    assert!(identity.is_authenticated);
                    assert_eq!(identity.role, Some(role));
                    assert_eq!(identity.subject_id.unwrap().as_str(), "s-1");
                }
                other => panic!("expected allow for {role}, got {other:?}"),
            }
        }
    }

    #[test]
    fn protected_with_user_role_is_denied() {
        assert_eq!(
            decide(PathClass::Protected, &Ok(payload(Role::User))),
            GateDecision::Deny
        );
    }

    #[test]
    fn public_and_unclassified_always_allow() {
        for class in [PathClass::Public, PathClass::Unclassified] {
            assert_eq!(
                decide(class, &Err(InvalidSession)),
                GateDecision::Allow(Identity::anonymous())
            );
            for role in Role::ALL {
                assert!(matches!(decide(class, &Ok(payload(role))), GateDecision::Allow(_)));
            }
        }
    }

    #[test]
    fn gate_combines_table_and_decision() {
        let gate = AccessGate::new(RouteTable::default());
        let admin = Ok(payload(Role::Admin));

        assert!(matches!(gate.evaluate("/", &admin), GateDecision::Allow(_)));
        assert!(matches!(gate.evaluate("/admin/stores", &admin), GateDecision::Allow(_)));
        assert_eq!(
            gate.evaluate("/admin/stores", &Err(InvalidSession)),
            GateDecision::RedirectToLogin
        );
    }
}
