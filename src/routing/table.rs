//! Route table
//!
//! Exact-path routes, each bound to one endpoint and a method rule.

use hyper::Method;

/// Handler bound to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Plain-text greeting
    Hello,
    /// Encoder: fixed success envelope for any method
    Status,
    /// Decoder: validates a `{name}` body
    DecodeName,
    /// Fetches and relays one upstream fact
    ExternalFact,
    /// Fetches the preview URL and relays its leading characters
    ExternalPreview,
    /// Liveness probe
    Health,
}

/// Methods a route accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRule {
    Any,
    Only(Method),
}

impl MethodRule {
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(allowed) => allowed == method,
        }
    }

    /// Value for the `Allow` header of a 405 response
    pub fn allow_header(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Only(allowed) => allowed.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub methods: MethodRule,
    pub endpoint: Endpoint,
}

/// Outcome of resolving a request against the table
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched(Endpoint),
    MethodNotAllowed(&'a MethodRule),
    NotFound,
}

/// Route table owned by `AppState`
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// The routes this server exposes
    pub fn standard() -> Self {
        Self::new()
            .route("/hello", MethodRule::Only(Method::GET), Endpoint::Hello)
            .route("/status", MethodRule::Any, Endpoint::Status)
            .route("/ok", MethodRule::Only(Method::POST), Endpoint::DecodeName)
            .route("/external", MethodRule::Only(Method::GET), Endpoint::ExternalFact)
            .route(
                "/external/preview",
                MethodRule::Only(Method::GET),
                Endpoint::ExternalPreview,
            )
            .route("/healthz", MethodRule::Only(Method::GET), Endpoint::Health)
    }

    /// Register a route; a later registration for the same path replaces the earlier one
    #[must_use]
    pub fn route(mut self, path: &'static str, methods: MethodRule, endpoint: Endpoint) -> Self {
        self.routes.retain(|r| r.path != path);
        self.routes.push(Route {
            path,
            methods,
            endpoint,
        });
        self
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let Some(route) = self.routes.iter().find(|r| r.path == path) else {
            return Resolution::NotFound;
        };

        if route.methods.allows(method) {
            Resolution::Matched(route.endpoint)
        } else {
            Resolution::MethodNotAllowed(&route.methods)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_path() {
        let router = Router::standard();
        assert_eq!(
            router.resolve(&Method::GET, "/hello"),
            Resolution::Matched(Endpoint::Hello)
        );
        assert_eq!(router.resolve(&Method::GET, "/hello/"), Resolution::NotFound);
        assert_eq!(router.resolve(&Method::GET, "/hell"), Resolution::NotFound);
        assert_eq!(
            router.resolve(&Method::GET, "/external/preview"),
            Resolution::Matched(Endpoint::ExternalPreview)
        );
    }

    #[test]
    fn test_resolve_wrong_method() {
        let router = Router::standard();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            match router.resolve(&method, "/external") {
                Resolution::MethodNotAllowed(rule) => assert_eq!(rule.allow_header(), "GET"),
                other => panic!("{method} /external resolved to {other:?}"),
            }
        }
        assert!(matches!(
            router.resolve(&Method::GET, "/ok"),
            Resolution::MethodNotAllowed(MethodRule::Only(m)) if *m == Method::POST
        ));
    }

    #[test]
    fn test_any_method_route() {
        let router = Router::standard();
        for method in [Method::GET, Method::POST, Method::PATCH] {
            assert_eq!(
                router.resolve(&method, "/status"),
                Resolution::Matched(Endpoint::Status)
            );
        }
    }

    #[test]
    fn test_route_replaces_same_path() {
        let router = Router::new()
            .route("/x", MethodRule::Only(Method::GET), Endpoint::Hello)
            .route("/x", MethodRule::Any, Endpoint::Health);
        assert_eq!(
            router.resolve(&Method::DELETE, "/x"),
            Resolution::Matched(Endpoint::Health)
        );
    }
}
