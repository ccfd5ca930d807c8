//! Direct HTTP ingress for webhooks.
//!
//! Builds the proxy-event shape from the raw request so the same handler runs
//! whether the receiver sits behind a gateway or is called directly. Direct
//! calls carry no authorizer verdict, so the route checks Basic credentials
//! itself.

use std::collections::BTreeMap;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::routing::post;
use serde_json::{Value, json};

use dealflow_common::queue::QueuePublisher;

use crate::handler;
use crate::middleware::auth::BasicAuth;
use crate::state::AppState;

pub fn router<Q>() -> Router<AppState<Q>>
where
    Q: QueuePublisher + Clone + Send + Sync + 'static,
{
    Router::new().route("/webhook", post(receive_webhook::<Q>))
}

/// POST /webhook — Receive a deal-update webhook (requires Basic auth).
async fn receive_webhook<Q>(
    _auth: BasicAuth,
    State(state): State<AppState<Q>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    Q: QueuePublisher + Clone + Send + Sync + 'static,
{
    let event = proxy_event(&method, &uri, &headers, &body);
    handler::handle(&event, &state.queue, &state.queue_url)
        .await
        .into_http_response()
}

/// Shape an HTTP request like an API-gateway proxy event.
///
/// Header values that are not visible ASCII are dropped. A body that is not
/// UTF-8 is passed on lossily and will fail JSON parsing downstream.
pub fn proxy_event(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Value {
    let mut single: BTreeMap<String, String> = BTreeMap::new();
    let mut multi: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        single.insert(name.as_str().to_string(), value.to_string());
        multi
            .entry(name.as_str().to_string())
            .or_default()
            .push(value.to_string());
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        Value::String(String::from_utf8_lossy(body).into_owned())
    };

    json!({
        "httpMethod": method.as_str(),
        "path": uri.path(),
        "headers": single,
        "multiValueHeaders": multi,
        "body": body,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_proxy_event_collects_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        headers.append("x-tag", HeaderValue::from_static("one"));
        headers.append("x-tag", HeaderValue::from_static("two"));

        let event = proxy_event(
            &Method::POST,
            &Uri::from_static("/webhook"),
            &headers,
            br#"{"a":1}"#,
        );

        assert_eq!(event["httpMethod"], "POST");
        assert_eq!(event["path"], "/webhook");
        assert_eq!(event["headers"]["authorization"], "Basic abc");
        assert_eq!(event["multiValueHeaders"]["x-tag"], json!(["one", "two"]));
        assert_eq!(event["body"], r#"{"a":1}"#);
    }

    #[test]
    fn test_proxy_event_empty_body_is_null() {
        let event = proxy_event(
            &Method::POST,
            &Uri::from_static("/webhook"),
            &HeaderMap::new(),
            b"",
        );
        assert!(event["body"].is_null());
    }
}
