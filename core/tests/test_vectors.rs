//! Verify URL building and response classification against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Parsed JSON is compared instead of raw strings so field ordering in the
//! vectors does not matter.

use api_core::{
    build_url, fetch_fn, ApiClient, ApiError, BoxError, HttpRequest, HttpResponse, Location,
    QueryParams,
};
use serde_json::Value;

fn params_from(case: &Value) -> QueryParams {
    case["params"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap(), pair[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let client = ApiClient::new(&Location::parse(base_url).unwrap(), ());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let path = case["path"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();
        let params = params_from(case);

        assert_eq!(build_url(path, &params), expected, "{name}: suffix");
        assert_eq!(
            client.build_get(path, &params).url,
            format!("{base_url}{expected}"),
            "{name}: full url"
        );
    }
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap().to_string();
        let expected = &case["expected"];

        let fetch = fetch_fn(move |_req: HttpRequest| {
            let body = body.clone();
            async move { Ok::<_, BoxError>(HttpResponse::new(status, body)) }
        });
        let client = ApiClient::new(&Location::new("https", "app.example.com", None), fetch);
        let none = QueryParams::new();
        let payload = serde_json::json!({"name": "x"});

        let result: Result<Option<Value>, ApiError> = match case["operation"].as_str().unwrap() {
            "get" => client.get::<Value>("/items", &none).await.map(Some),
            "post" => client.post("/items", &payload, &none).await.map(|r| r.json().ok()),
            "put" => client.put("/items/1", &payload, &none).await.map(|r| r.json().ok()),
            "patch" => client.patch("/items/1", &payload, &none).await.map(|r| r.json().ok()),
            "delete" => client.delete("/items/1", &none).await.map(|r| r.json().ok()),
            other => panic!("{name}: unknown operation {other}"),
        };

        if let Some(ok) = expected.get("ok") {
            let value = result.unwrap_or_else(|e| panic!("{name}: expected success, got {e}"));
            if !ok.is_null() {
                assert_eq!(value.as_ref(), Some(ok), "{name}: parsed body");
            }
        } else if let Some(code) = expected.get("status") {
            let err = result.unwrap_err();
            assert_eq!(err.status(), code.as_u64().map(|c| c as u16), "{name}: status");
        } else {
            let err = result.unwrap_err();
            match expected["error"].as_str().unwrap() {
                "Deserialization" => {
                    assert!(matches!(err, ApiError::Deserialization(_)), "{name}: expected Deserialization")
                }
                other => panic!("{name}: unknown expected error: {other}"),
            }
        }
    }
}
