//! Read-path tests: representations, filtering, pagination and error responses.

use crate::assert_status;
use crate::common::fixtures::{seed, seeded_api};
use crate::common::{error_code, names};
use case_library::storage::InMemoryStorage;
use case_library::{ApiRequest, LibraryApi};
use serde_json::{Value, json};

#[tokio::test]
async fn test_caseversion_detail_nests_full_fields() {
    let api = seeded_api().await;
    let response = api.handle(ApiRequest::get("caseversion", 1)).await;
    assert_status!(response, 200);

    let body = &response.body;
    assert_eq!(body["id"], "1");
    assert_eq!(body["name"], "Log in");
    assert_eq!(body["resource_uri"], "/api/v1/caseversion/1/");
    assert_eq!(body["productversion"], "/api/v1/productversion/1/");

    assert_eq!(body["case"]["resource_uri"], "/api/v1/case/1/");
    assert_eq!(body["case"]["product"], "/api/v1/product/1/");
    assert_eq!(body["case"]["suites"][0]["name"], "Login");

    assert_eq!(body["steps"][0]["number"], 1);
    assert_eq!(body["steps"][0]["instruction"], "Open the login page");
    assert_eq!(body["environments"], json!([{
        "id": "1",
        "name": "Linux",
        "resource_uri": "/api/v1/environment/1/"
    }]));
    assert_eq!(body["tags"][0]["name"], "ui");
    assert_eq!(body["tags"][0]["product"], Value::Null);
}

#[tokio::test]
async fn test_list_pagination_meta() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::list("caseversion").with_param("limit", "2"))
        .await;
    assert_status!(response, 200);
    assert_eq!(
        response.body["meta"],
        json!({
            "limit": 2,
            "offset": 0,
            "total_count": 5,
            "next": "/api/v1/caseversion/?limit=2&offset=2",
            "previous": null
        })
    );
    assert_eq!(names(&response.body["objects"]), vec!["Log in", "Log out"]);

    let response = api
        .handle(
            ApiRequest::list("caseversion")
                .with_param("limit", "2")
                .with_param("offset", "4"),
        )
        .await;
    assert_eq!(names(&response.body["objects"]), vec!["Log in (draft)"]);
    assert_eq!(response.body["meta"]["next"], Value::Null);
    assert_eq!(
        response.body["meta"]["previous"],
        "/api/v1/caseversion/?limit=2&offset=2"
    );
}

#[tokio::test]
async fn test_zero_limit_respects_max_limit() {
    let api = seeded_api().await;
    let response = api
        .handle(ApiRequest::list("caseversion").with_param("limit", "0"))
        .await;
    assert_eq!(response.body["meta"]["limit"], 1000);
    assert_eq!(response.body["objects"].as_array().unwrap().len(), 5);

    let unbounded = LibraryApi::builder(InMemoryStorage::new())
        .with_max_limit(None)
        .build()
        .unwrap();
    seed(unbounded.library()).await;
    let response = unbounded
        .handle(ApiRequest::list("caseversion").with_param("limit", "0"))
        .await;
    assert_eq!(response.body["meta"]["limit"], 0);
    assert_eq!(response.body["meta"]["total_count"], 5);
    assert_eq!(response.body["objects"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_filters_across_relations() {
    let api = seeded_api().await;

    let cases = [
        ("tags__name", "smoke", vec!["Reset password"]),
        ("tags", "/api/v1/tag/1/", vec!["Log in"]),
        ("case__suites", "1", vec!["Log in", "Log out", "Log in (draft)"]),
        ("case__suites__name__istartswith", "LOG", vec!["Log in", "Log out", "Log in (draft)"]),
        ("productversion__product__name", "Thunderbird", vec!["Compose mail"]),
        ("productversion__in", "2,3", vec!["Compose mail"]),
        ("tags__isnull", "true", vec!["Log out", "Compose mail", "Log in (draft)"]),
    ];
    for (key, value, expected) in cases {
        let response = api
            .handle(ApiRequest::list("caseversion").with_param(key, value))
            .await;
        assert_status!(response, 200);
        assert_eq!(names(&response.body["objects"]), expected, "{key}={value}");
    }
}

#[tokio::test]
async fn test_disallowed_filters_are_rejected() {
    let api = seeded_api().await;
    for (resource, key) in [
        ("caseversion", "environments__name"),
        ("caseversion", "description"),
        ("suite", "description__contains"),
        ("caseversion", "case__product"),
    ] {
        let response = api
            .handle(ApiRequest::list(resource).with_param(key, "x"))
            .await;
        assert_status!(response, 400);
        assert_eq!(error_code(&response), "INVALID_FILTER", "{resource}?{key}");
    }
}

#[tokio::test]
async fn test_suite_representation_and_name_filter() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::list("suite").with_param("name__icontains", "LOG"))
        .await;
    assert_eq!(names(&response.body["objects"]), vec!["Login"]);

    let response = api.handle(ApiRequest::get("suite", 2)).await;
    assert_eq!(
        response.body,
        json!({"name": "Empty", "resource_uri": "/api/v1/suite/2/"})
    );
}

#[tokio::test]
async fn test_collaborator_resources_are_read_only() {
    let api = seeded_api().await;

    let response = api.handle(ApiRequest::get("productversion", 3)).await;
    assert_status!(response, 200);
    assert_eq!(response.body["version"], "3.0");
    assert_eq!(response.body["product"], "/api/v1/product/2/");

    let response = api
        .handle(ApiRequest::create("product", json!({"name": "SeaMonkey"})))
        .await;
    assert_status!(response, 405);
}

#[tokio::test]
async fn test_error_responses() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::list("testrun").with_request_id("req-42"))
        .await;
    assert_status!(response, 404);
    assert_eq!(error_code(&response), "UNKNOWN_RESOURCE");
    assert_eq!(response.request_id, "req-42");

    for id in ["99", "abc"] {
        let response = api.handle(ApiRequest::get("case", id)).await;
        assert_status!(response, 404);
        assert_eq!(error_code(&response), "RESOURCE_NOT_FOUND");
    }

    let response = api
        .handle(ApiRequest::list("suite").with_param("offset", "-1"))
        .await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "BAD_REQUEST");
}

#[tokio::test]
async fn test_offset_past_the_end_is_an_empty_page() {
    let api = seeded_api().await;
    for offset in [usize::MAX.to_string(), "10".to_string()] {
        let response = api
            .handle(ApiRequest::list("suite").with_param("offset", offset.clone()))
            .await;
        assert_status!(response, 200);
        assert_eq!(response.body["objects"], json!([]));
        assert_eq!(response.body["meta"]["total_count"], 2);
        assert_eq!(response.body["meta"]["next"], Value::Null);
    }

    let response = api
        .handle(
            ApiRequest::list("suite")
                .with_param("limit", usize::MAX.to_string())
                .with_param("offset", "1"),
        )
        .await;
    assert_status!(response, 200);
    assert_eq!(response.body["meta"]["limit"], 1000);
    assert_eq!(response.body["objects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generated_request_ids_are_unique() {
    let api = seeded_api().await;
    let first = api.handle(ApiRequest::list("suite")).await;
    let second = api.handle(ApiRequest::list("suite")).await;
    assert!(!first.request_id.is_empty());
    assert_ne!(first.request_id, second.request_id);
}
