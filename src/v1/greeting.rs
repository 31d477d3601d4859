#![forbid(unsafe_code)]

use log::info;
use poem::Request;
use poem_openapi::{param::Query, payload::Json, Object, OpenApi};

use crate::utils::greeting_utils::{self, RequestDebug};
use crate::utils::id_gen::{IdGenerator, GREETING_IDS};

// ***************************************************************************
//                                Constants
// ***************************************************************************
/// Substituted when the request carries no name.
pub const DEFAULT_NAME: &str = "World";
const GREETING_PREFIX: &str = "Hello, ";

// ***************************************************************************
//                                 Greeting
// ***************************************************************************
/// An immutable greeting. The fields are fixed at construction and only
/// readable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    id: i64,
    content: String,
}

impl Greeting {
    /// Compose a greeting from an already generated id and an optional name.
    ///
    /// An absent name becomes [`DEFAULT_NAME`]. A present name, including the
    /// empty string, is embedded verbatim.
    pub fn build(id: i64, name: Option<&str>) -> Self {
        let name = name.unwrap_or(DEFAULT_NAME);
        let mut content = String::with_capacity(GREETING_PREFIX.len() + name.len());
        content.push_str(GREETING_PREFIX);
        content.push_str(name);
        Self { id, content }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GreetingApi {
    ids: &'static IdGenerator,
}

struct ReqGreeting {
    name: Option<String>,
}

#[derive(Object, Debug)]
pub struct RespGreeting {
    id: i64,
    content: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqGreeting {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(64);
        s.push_str("  Request parameters:");
        s.push_str("\n    name: ");
        match &self.name {
            Some(n) => s.push_str(n),
            None => s.push_str("<absent>"),
        }
        s
    }
}

impl From<Greeting> for RespGreeting {
    fn from(g: Greeting) -> Self {
        Self { id: g.id, content: g.content }
    }
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GreetingApi {
    #[oai(path = "/greeting", method = "get")]
    async fn get_greeting(&self, http_req: &Request, name: Query<Option<String>>) -> Json<RespGreeting> {
        let req = ReqGreeting { name: name.0 };
        Json(RespGreeting::process(http_req, &req, self.ids))
    }
}

impl GreetingApi {
    /// Serve greetings numbered by the process-wide sequence.
    pub fn new() -> Self {
        Self::with_ids(&GREETING_IDS)
    }

    pub fn with_ids(ids: &'static IdGenerator) -> Self {
        Self { ids }
    }
}

impl Default for GreetingApi {
    fn default() -> Self {
        Self::new()
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespGreeting {
    fn process(http_req: &Request, req: &ReqGreeting, ids: &IdGenerator) -> Self {
        // Conditional logging depending on log level.
        greeting_utils::debug_request(http_req, req);

        let greeting = Greeting::build(ids.next(), req.name.as_deref());
        info!("Serving greeting {}: {:?}", greeting.id(), greeting.content());
        greeting.into()
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::test::TestClient;
    use poem::Route;
    use poem_openapi::OpenApiService;
    use serde_json::json;

    fn test_client(ids: &'static IdGenerator) -> TestClient<Route> {
        let api = OpenApiService::new(GreetingApi::with_ids(ids), "Greeting Test", "0.0.1");
        TestClient::new(Route::new().nest("/v1", api))
    }

    #[test]
    fn default_name() {
        let g = Greeting::build(7, None);
        assert_eq!(g.id(), 7);
        assert_eq!(g.content(), "Hello, World");
    }

    #[test]
    fn explicit_name() {
        let g = Greeting::build(3, Some("Alice"));
        assert_eq!(g.id(), 3);
        assert_eq!(g.content(), "Hello, Alice");
    }

    #[test]
    fn empty_name_is_not_defaulted() {
        let g = Greeting::build(1, Some(""));
        assert_eq!(g.id(), 1);
        assert_eq!(g.content(), "Hello, ");
    }

    #[test]
    fn names_are_embedded_verbatim() {
        let g = Greeting::build(2, Some("  <b>Bob</b> "));
        assert_eq!(g.content(), "Hello,   <b>Bob</b> ");
    }

    #[test]
    fn build_is_pure() {
        assert_eq!(Greeting::build(9, Some("Ann")), Greeting::build(9, Some("Ann")));
        assert_eq!(Greeting::build(9, None), Greeting::build(9, Some(DEFAULT_NAME)));
    }

    #[test]
    fn greetings_are_independent() {
        let a = Greeting::build(1, Some("Ann"));
        let copy = a.clone();
        let b = Greeting::build(copy.id() + 1, Some("Bea"));
        drop(copy);
        assert_eq!(a.id(), 1);
        assert_eq!(a.content(), "Hello, Ann");
        assert_eq!(b.id(), 2);
        assert_eq!(b.content(), "Hello, Bea");
    }

    #[test]
    fn response_keeps_id_and_content() {
        let resp: RespGreeting = Greeting::build(4, Some("Dee")).into();
        assert_eq!(resp.id, 4);
        assert_eq!(resp.content, "Hello, Dee");
    }

    #[test]
    fn request_info_marks_absent_name() {
        let req = ReqGreeting { name: None };
        assert!(req.get_request_info().ends_with("name: <absent>"));
    }

    #[tokio::test]
    async fn endpoint_defaults_to_world() {
        static IDS: IdGenerator = IdGenerator::new();
        let cli = test_client(&IDS);

        let resp = cli.get("/v1/greeting").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"id": 1, "content": "Hello, World"})).await;
    }

    #[tokio::test]
    async fn endpoint_uses_name_and_counts() {
        static IDS: IdGenerator = IdGenerator::new();
        let cli = test_client(&IDS);

        let resp = cli.get("/v1/greeting").query("name", &"Alice").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"id": 1, "content": "Hello, Alice"})).await;

        let resp = cli.get("/v1/greeting").send().await;
        resp.assert_json(json!({"id": 2, "content": "Hello, World"})).await;

        let resp = cli.get("/v1/greeting").query("name", &"Bob").send().await;
        resp.assert_json(json!({"id": 3, "content": "Hello, Bob"})).await;
    }

    #[test]
    fn spec_documents_greeting() {
        static IDS: IdGenerator = IdGenerator::new();
        let api = OpenApiService::new(GreetingApi::with_ids(&IDS), "Greeting Test", "0.0.1");
        let spec = api.spec();
        assert!(spec.contains("/greeting"));
        assert!(spec.contains("RespGreeting"));
    }
}
