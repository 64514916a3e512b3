//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests or validation errors,
//! simulated responses, and expected parse outcomes. Comparing parsed JSON (not
//! raw strings) avoids false negatives from field-ordering differences.

use cpv_core::{ClientConfig, CpvClient, CpvError, ErrorKind, HttpMethod, HttpRequest, HttpResponse};

const BASE_URL: &str = "http://localhost:3000";

fn client(vectors: &serde_json::Value) -> CpvClient {
    let api_key = vectors["api_key"].as_str().unwrap();
    let config = ClientConfig::resolve(Some(api_key), None, Some(BASE_URL.to_string())).unwrap();
    CpvClient::new(config)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "Unauthorized" => ErrorKind::Unauthorized,
        "NotFound" => ErrorKind::NotFound,
        "Conflict" => ErrorKind::Conflict,
        "Validation" => ErrorKind::Validation,
        "Unexpected" => ErrorKind::Unexpected,
        other => panic!("unknown error kind: {other}"),
    }
}

fn simulated_response(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match req.body.as_deref() {
        Some(body) => {
            let body: serde_json::Value = serde_json::from_str(body).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
        None => assert!(expected["body"].is_null(), "{name}: body should be None"),
    }
}

fn assert_error(name: &str, err: &CpvError, expected: &serde_json::Value) {
    assert_eq!(err.kind(), parse_kind(expected["kind"].as_str().unwrap()), "{name}: kind");
    assert_eq!(err.message(), expected["message"].as_str(), "{name}: message");
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[test]
fn submit_test_vectors() {
    let raw = include_str!("../../test-vectors/submit.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let c = client(&vectors);

    for case in vectors["build"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let xml = case["input"]["xml"].as_str().unwrap();
        let cpf = case["input"]["cpf"].as_str().unwrap();

        match c.build_submit(xml, cpf) {
            Ok(req) => assert_request(name, &req, &case["expected_request"]),
            Err(err) => assert_error(name, &err, &case["expected_error"]),
        }
    }

    for case in vectors["parse"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        match c.parse_submit(simulated_response(case)) {
            Ok(result) => {
                let actual = serde_json::to_value(&result).unwrap();
                assert_eq!(actual, case["expected_result"], "{name}: parsed result");
            }
            Err(err) => assert_error(name, &err, &case["expected_error"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

#[test]
fn cancel_test_vectors() {
    let raw = include_str!("../../test-vectors/cancel.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let c = client(&vectors);

    for case in vectors["build"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let key = case["input"]["key"].as_str().unwrap();

        match c.build_cancel(key) {
            Ok(req) => assert_request(name, &req, &case["expected_request"]),
            Err(err) => assert_error(name, &err, &case["expected_error"]),
        }
    }

    for case in vectors["parse"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        match c.parse_cancel(simulated_response(case)) {
            Ok(()) => assert!(case.get("expected_error").is_none(), "{name}: expected an error"),
            Err(err) => assert_error(name, &err, &case["expected_error"]),
        }
    }
}
