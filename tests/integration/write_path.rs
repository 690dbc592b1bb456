//! Write-path tests: creation, updates, bulk updates and write protection.

use crate::assert_status;
use crate::common::error_code;
use crate::common::fixtures::{VIEWER, WRITER, seeded_api};
use case_library::model::{CaseVersion, Suite};
use case_library::{ApiRequest, HttpMethod};
use serde_json::{Value, json};

fn as_writer(request: ApiRequest) -> ApiRequest {
    request.with_credentials(WRITER.0, WRITER.1)
}

#[tokio::test]
async fn test_create_suite() {
    let api = seeded_api().await;
    let response = api
        .handle(ApiRequest::create("suite", json!({"name": "Regression"})))
        .await;
    assert_status!(response, 201);
    assert_eq!(response.location.as_deref(), Some("/api/v1/suite/3/"));
    assert_eq!(response.body["name"], "Regression");

    let stored = api.library().get::<Suite>(3).await.unwrap().unwrap();
    assert_eq!(stored.name, "Regression");
}

#[tokio::test]
async fn test_invalid_create_leaves_library_unchanged() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::create("suite", json!({"description": "no name"})))
        .await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "VALIDATION_ERROR");

    let response = api.handle(ApiRequest::new(HttpMethod::Post, "suite")).await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "BAD_REQUEST");

    let response = api.handle(ApiRequest::list("suite")).await;
    assert_eq!(response.body["meta"]["total_count"], 2);
}

#[tokio::test]
async fn test_put_detail_updates_or_creates() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::update("suite", 2, json!({"name": "Not empty"})))
        .await;
    assert_status!(response, 202);
    assert_eq!(response.body["name"], "Not empty");
    assert_eq!(response.location, None);

    let response = api
        .handle(ApiRequest::update("suite", 10, json!({"name": "Pinned"})))
        .await;
    assert_status!(response, 201);
    assert_eq!(response.location.as_deref(), Some("/api/v1/suite/10/"));

    // ids keep counting past explicitly chosen ones
    let response = api
        .handle(ApiRequest::create("suite", json!({"name": "Next"})))
        .await;
    assert_eq!(response.location.as_deref(), Some("/api/v1/suite/11/"));
}

#[tokio::test]
async fn test_caseversion_writes_need_a_key() {
    let api = seeded_api().await;
    let body = json!({
        "name": "Log in again",
        "case": "/api/v1/case/2/",
        "productversion": "/api/v1/productversion/2/",
        "tags": ["/api/v1/tag/2/"]
    });

    let response = api
        .handle(ApiRequest::create("caseversion", body.clone()))
        .await;
    assert_status!(response, 401);
    assert_eq!(error_code(&response), "UNAUTHORIZED");

    let response = api
        .handle(
            ApiRequest::create("caseversion", body.clone()).with_credentials(WRITER.0, "wrong"),
        )
        .await;
    assert_status!(response, 401);

    let response = api
        .handle(ApiRequest::create("caseversion", body.clone()).with_credentials(VIEWER.0, VIEWER.1))
        .await;
    assert_status!(response, 403);
    assert_eq!(error_code(&response), "FORBIDDEN");

    let response = api
        .handle(as_writer(ApiRequest::create("caseversion", body)))
        .await;
    assert_status!(response, 201);
    assert_eq!(response.body["id"], "6");
    assert_eq!(response.body["tags"][0]["name"], "smoke");

    let stored = api.library().get::<CaseVersion>(6).await.unwrap().unwrap();
    assert!(stored.latest);
    assert_eq!(stored.case_id, 2);
    assert_eq!(stored.productversion_id, 2);
    assert_eq!(stored.tag_ids, vec![2]);

    // reads stay anonymous
    let response = api.handle(ApiRequest::get("caseversion", 6)).await;
    assert_status!(response, 200);
}

#[tokio::test]
async fn test_broken_references_are_rejected() {
    let api = seeded_api().await;
    let response = api
        .handle(as_writer(ApiRequest::create(
            "caseversion",
            json!({"name": "Orphan", "case": 99, "productversion": 1}),
        )))
        .await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "VALIDATION_ERROR");
    assert!(
        response.body["error"]
            .as_str()
            .unwrap()
            .contains("missing case 99")
    );
}

#[tokio::test]
async fn test_bulk_update_caseversions() {
    let api = seeded_api().await;
    let body = json!({
        "objects": [
            {"resource_uri": "/api/v1/caseversion/2/", "name": "Log out everywhere"},
            {"name": "Remember me", "case": 3, "productversion": 1}
        ]
    });

    let response = api
        .handle(as_writer(ApiRequest::bulk_update("caseversion", body)))
        .await;
    assert_status!(response, 202);

    let objects = response.body["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["id"], "2");
    assert_eq!(objects[0]["name"], "Log out everywhere");
    assert_eq!(objects[1]["id"], "6");

    let updated = api.library().get::<CaseVersion>(2).await.unwrap().unwrap();
    assert_eq!(updated.name, "Log out everywhere");
    assert_eq!(updated.case_id, 2);
    assert!(updated.latest);
}

#[tokio::test]
async fn test_bulk_update_is_all_or_nothing() {
    let api = seeded_api().await;
    let body = json!({
        "objects": [
            {"id": 2, "name": "Renamed"},
            {"name": "Broken", "case": 3, "productversion": 42}
        ]
    });

    let response = api
        .handle(as_writer(ApiRequest::bulk_update("caseversion", body)))
        .await;
    assert_status!(response, 400);

    let untouched = api.library().get::<CaseVersion>(2).await.unwrap().unwrap();
    assert_eq!(untouched.name, "Log out");

    let response = api
        .handle(as_writer(ApiRequest::bulk_update(
            "caseversion",
            json!({"not_objects": []}),
        )))
        .await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "BAD_REQUEST");
}

#[tokio::test]
async fn test_steps_and_cases_can_be_added() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::create(
            "casestep",
            json!({
                "caseversion": "/api/v1/caseversion/1/",
                "number": 2,
                "instruction": "Type the password",
                "expected": "Characters are masked"
            }),
        ))
        .await;
    assert_status!(response, 201);
    assert_eq!(response.body["caseversion"], "/api/v1/caseversion/1/");

    let response = api.handle(ApiRequest::get("caseversion", 1)).await;
    let steps = response.body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1]["instruction"], "Type the password");

    let response = api
        .handle(ApiRequest::create("case", json!({"product": {"id": 2}})))
        .await;
    assert_status!(response, 201);
    assert_eq!(response.body["product"], "/api/v1/product/2/");
    assert_eq!(response.body["suites"], json!([]));
}

#[tokio::test]
async fn test_methods_outside_the_allowed_set() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::bulk_update("suite", json!({"objects": []})))
        .await;
    assert_status!(response, 405);

    let response = api
        .handle(ApiRequest::new(HttpMethod::Delete, "suite").with_id(1))
        .await;
    assert_status!(response, 405);
    assert_eq!(
        response.body["error"],
        Value::String("Method 'DELETE' not allowed on suite detail endpoint".to_string())
    );
}
