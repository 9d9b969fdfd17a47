//! Shared helpers: saved wiki pages and a local mock wiki.
#![allow(dead_code)]

use httpmock::prelude::*;
use std::path::Path;

pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("Failed to read fixture")
}

/// Start a mock wiki. Paths without a mock get a 404.
pub async fn wiki_server() -> MockServer {
    // Keep local requests away from any proxy configured in the environment.
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    MockServer::start_async().await
}

/// Serve `body` with `status` for every GET of `path`.
pub async fn serve(server: &MockServer, path: &str, status: u16, body: &str) {
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(status)
                .header("content-type", "text/html; charset=utf-8")
                .body(body);
        })
        .await;
}

/// Serve each response in turn for GETs of `path`, repeating the last one.
///
/// Every response but the last sets an `attempt` cookie that selects the
/// next one, so the client must keep its cookie store enabled.
pub async fn serve_in_order(server: &MockServer, path: &str, responses: &[(u16, &str)]) {
    let last = responses.len().saturating_sub(1);
    for (step, (status, body)) in responses.iter().enumerate() {
        let current = format!("attempt={}", step);
        let next = format!("attempt={}; Path=/", step + 1);
        server
            .mock_async(|when, then| {
                let when = when.method(GET).path(path);
                if step == 0 {
                    when.header_missing("cookie");
                } else {
                    when.header("cookie", current.as_str());
                }
                let then = then.status(*status).body(*body);
                if step < last {
                    then.header("set-cookie", next.as_str());
                }
            })
            .await;
    }
}
