//! Case-version selection endpoint tests.
//!
//! Covers the selected/unselected split, annotation fields, request isolation of
//! the suite order lookup, and equivalence with per-record order lookups.

use crate::assert_status;
use crate::common::fixtures::{EMPTY_SUITE, LOGIN_SUITE, seeded_api, seed};
use crate::common::{error_code, names};
use case_library::model::{Case, CaseVersion, Library, Product, ProductVersion, SuiteCase};
use case_library::storage::InMemoryStorage;
use case_library::{ApiRequest, LibraryApi};
use proptest::prelude::*;
use serde_json::{Value, json};

const SELECTION: &str = "caseversions-selection";

fn selection(for_suite: Option<&str>) -> ApiRequest {
    let request = ApiRequest::list(SELECTION).with_param("productversion", "1");
    match for_suite {
        Some(suite) => request.with_param("for_suite", suite),
        None => request,
    }
}

#[tokio::test]
async fn test_suite_members_are_selected_in_order() {
    let api = seeded_api().await;
    let response = api.handle(selection(Some("1"))).await;
    assert_status!(response, 200);

    let objects = &response.body["objects"];
    assert_eq!(names(&objects["selected"]), vec!["Log out", "Log in"]);
    assert_eq!(names(&objects["unselected"]), vec!["Reset password"]);
    assert_eq!(objects["selected"][0]["order"], 1);
    assert_eq!(objects["selected"][1]["order"], 2);
    assert_eq!(objects["unselected"][0]["order"], Value::Null);

    let meta = &response.body["meta"];
    assert_eq!(meta["total_count"], 3);
    assert_eq!(meta["next"], Value::Null);
}

#[tokio::test]
async fn test_records_are_annotated() {
    let api = seeded_api().await;
    let response = api.handle(selection(Some("1"))).await;
    let selected = &response.body["objects"]["selected"];

    let log_in = &selected[1];
    assert_eq!(log_in["id"], "1");
    assert_eq!(log_in["name"], "Log in");
    assert_eq!(log_in["case_id"], "1");
    assert_eq!(log_in["product_id"], "1");
    assert_eq!(log_in["product"], json!({"id": "1"}));
    assert_eq!(log_in["created_by"], json!({"id": "1", "username": "camd"}));
    assert_eq!(log_in["case"], "/api/v1/case/1/");
    assert_eq!(log_in["productversion"], "/api/v1/productversion/1/");
    assert_eq!(log_in["resource_uri"], "/api/v1/caseversions-selection/1/");
    assert_eq!(log_in["tags"][0]["name"], "ui");

    // case 2 has no creator
    let log_out = &selected[0];
    assert_eq!(log_out["created_by"], Value::Null);
}

#[tokio::test]
async fn test_without_suite_nothing_is_selected() {
    let api = seeded_api().await;
    let response = api.handle(ApiRequest::list(SELECTION)).await;
    assert_status!(response, 200);

    let objects = &response.body["objects"];
    assert_eq!(objects["selected"], json!([]));
    // every latest version, across products, and no drafts
    assert_eq!(
        names(&objects["unselected"]),
        vec!["Log in", "Log out", "Reset password", "Compose mail"]
    );
    assert!(
        objects["unselected"]
            .as_array()
            .unwrap()
            .iter()
            .all(|item| item["order"].is_null())
    );
}

#[tokio::test]
async fn test_unusable_suite_values_select_nothing() {
    let api = seeded_api().await;
    let empty = EMPTY_SUITE.to_string();
    for suite in ["abc", "999", empty.as_str()] {
        let response = api.handle(selection(Some(suite))).await;
        assert_status!(response, 200);
        assert_eq!(response.body["objects"]["selected"], json!([]), "for_suite={suite}");
        assert_eq!(
            response.body["objects"]["unselected"].as_array().unwrap().len(),
            3
        );
    }
}

#[tokio::test]
async fn test_sequential_requests_do_not_share_orders() {
    let api = seeded_api().await;

    let first = api.handle(selection(Some("1"))).await;
    let second = api.handle(selection(Some("2"))).await;
    let third = api.handle(selection(None)).await;
    let again = api.handle(selection(Some("1"))).await;

    assert_eq!(first.body["objects"]["selected"].as_array().unwrap().len(), 2);
    assert_eq!(second.body["objects"]["selected"], json!([]));
    assert_eq!(third.body["objects"]["selected"], json!([]));
    assert_eq!(first.body, again.body);
}

#[tokio::test]
async fn test_filters_follow_productversion_relations() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::list(SELECTION).with_param("productversion__product", "2"))
        .await;
    assert_eq!(
        names(&response.body["objects"]["unselected"]),
        vec!["Compose mail"]
    );

    let response = api
        .handle(
            ApiRequest::list(SELECTION)
                .with_param("productversion__version", "10")
                .with_param("for_suite", "1"),
        )
        .await;
    assert_eq!(response.body["meta"]["total_count"], 3);

    let response = api
        .handle(
            ApiRequest::list(SELECTION)
                .with_param("productversion", "/api/v1/productversion/3/"),
        )
        .await;
    assert_eq!(response.body["meta"]["total_count"], 1);
}

#[tokio::test]
async fn test_selection_rejects_other_filters_and_methods() {
    let api = seeded_api().await;

    let response = api
        .handle(ApiRequest::list(SELECTION).with_param("name__icontains", "log"))
        .await;
    assert_status!(response, 400);
    assert_eq!(error_code(&response), "INVALID_FILTER");

    let response = api.handle(ApiRequest::get(SELECTION, 1)).await;
    assert_status!(response, 405);

    let response = api
        .handle(ApiRequest::create(SELECTION, json!({"name": "x"})))
        .await;
    assert_status!(response, 405);
    assert_eq!(error_code(&response), "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_tied_orders_keep_query_order() {
    let api = seeded_api().await;
    // put case 3 at the same position as case 2
    api.library()
        .save(&SuiteCase {
            id: 3,
            suite_id: LOGIN_SUITE,
            case_id: 3,
            order: 1,
        })
        .await
        .unwrap();

    let response = api.handle(selection(Some("1"))).await;
    assert_eq!(
        names(&response.body["objects"]["selected"]),
        vec!["Log out", "Reset password", "Log in"]
    );
    assert_eq!(response.body["objects"]["unselected"], json!([]));
}

#[tokio::test]
async fn test_fresh_order_lookups_give_identical_output() {
    let api = seeded_api().await;
    let response = api.handle(selection(Some("1"))).await;
    let library = api.library();

    let objects = &response.body["objects"];
    for bucket in ["selected", "unselected"] {
        for item in objects[bucket].as_array().unwrap() {
            let case_id: u64 = item["case_id"].as_str().unwrap().parse().unwrap();
            let fresh = library
                .find::<SuiteCase>("case_id", &case_id.to_string())
                .await
                .unwrap()
                .into_iter()
                .filter(|sc| sc.suite_id == LOGIN_SUITE)
                .map(|sc| sc.order)
                .last();
            assert_eq!(item["order"], json!(fresh), "case {case_id}");
        }
    }
}

#[tokio::test]
async fn test_limit_override_paginates_before_splitting() {
    let api = seeded_api().await;
    let response = api
        .handle(selection(Some("1")).with_param("limit", "2"))
        .await;
    assert_status!(response, 200);

    let objects = &response.body["objects"];
    assert_eq!(names(&objects["selected"]), vec!["Log out", "Log in"]);
    assert_eq!(objects["unselected"], json!([]));
    assert_eq!(
        response.body["meta"]["next"],
        "/api/v1/caseversions-selection/?productversion=1&for_suite=1&limit=2&offset=2"
    );
}

/// Largest page the membership libraries serve; generated libraries exceed it.
const PAGE_CAP: usize = 5;

/// Library with `cases` latest case versions and the given suite memberships.
async fn membership_library(
    cases: u64,
    members: &[(u64, i64)],
) -> LibraryApi<InMemoryStorage> {
    let api = LibraryApi::builder(InMemoryStorage::new())
        .with_default_limit(PAGE_CAP)
        .with_max_limit(Some(PAGE_CAP))
        .build()
        .unwrap();
    let library: &Library<InMemoryStorage> = api.library();
    library
        .save(&Product {
            id: 1,
            name: "Firefox".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    library
        .save(&ProductVersion {
            id: 1,
            product_id: 1,
            version: "10".to_string(),
            codename: String::new(),
        })
        .await
        .unwrap();
    for id in 1..=cases {
        library
            .save(&Case {
                id,
                product_id: 1,
                created_by_id: None,
            })
            .await
            .unwrap();
        library
            .save(&CaseVersion {
                id,
                case_id: id,
                productversion_id: 1,
                name: format!("case {id}"),
                description: String::new(),
                latest: true,
                environment_ids: Vec::new(),
                tag_ids: Vec::new(),
            })
            .await
            .unwrap();
    }
    for (index, &(case_id, order)) in members.iter().enumerate() {
        library
            .save(&SuiteCase {
                id: index as u64 + 1,
                suite_id: 1,
                case_id,
                order,
            })
            .await
            .unwrap();
    }
    api
}

/// Case count plus `(case_id, order)` memberships; each case is in the suite at most once.
fn membership_strategy() -> impl Strategy<Value = (u64, Vec<(u64, i64)>)> {
    (1u64..(3 * PAGE_CAP as u64)).prop_flat_map(|cases| {
        let members = prop::collection::vec(prop::option::of(-5i64..5), cases as usize).prop_map(
            |orders| {
                orders
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, order)| order.map(|order| (index as u64 + 1, order)))
                    .collect::<Vec<_>>()
            },
        );
        (Just(cases), members)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_every_latest_version_lands_in_exactly_one_bucket(
        (cases, members) in membership_strategy()
    ) {
        tokio_test::block_on(async {
            let api = membership_library(cases, &members).await;
            let response = api
                .handle(ApiRequest::list(SELECTION).with_param("for_suite", "1"))
                .await;
            assert_eq!(response.status, 200);

            let selected = response.body["objects"]["selected"].as_array().unwrap().clone();
            let unselected = response.body["objects"]["unselected"].as_array().unwrap().clone();

            let mut seen: Vec<String> = selected
                .iter()
                .chain(unselected.iter())
                .map(|item| item["id"].as_str().unwrap().to_string())
                .collect();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len() as u64, cases);
            assert_eq!(selected.len() + unselected.len(), cases as usize);

            assert_eq!(selected.len(), members.len());
            assert!(unselected.iter().all(|item| item["order"].is_null()));

            let orders: Vec<i64> = selected
                .iter()
                .map(|item| item["order"].as_i64().unwrap())
                .collect();
            assert!(orders.windows(2).all(|pair| pair[0] <= pair[1]));
        });
    }
}

#[tokio::test]
async fn test_selection_is_not_capped_by_max_limit() {
    // cases 6 and 2 are members, on either side of the page cap
    let api = membership_library(2 * PAGE_CAP as u64 + 1, &[(6, 0), (2, 1)]).await;
    let response = api
        .handle(ApiRequest::list(SELECTION).with_param("for_suite", "1"))
        .await;
    assert_status!(response, 200);

    let meta = &response.body["meta"];
    assert_eq!(meta["limit"], 0);
    assert_eq!(meta["total_count"], 11);
    assert_eq!(meta["next"], Value::Null);

    let objects = &response.body["objects"];
    assert_eq!(names(&objects["selected"]), vec!["case 6", "case 2"]);
    assert_eq!(objects["unselected"].as_array().unwrap().len(), 9);

    // an explicit limit is still capped
    let response = api
        .handle(
            ApiRequest::list(SELECTION)
                .with_param("for_suite", "1")
                .with_param("limit", "0"),
        )
        .await;
    assert_status!(response, 200);
    assert_eq!(response.body["meta"]["limit"], PAGE_CAP);
    let objects = &response.body["objects"];
    let returned = objects["selected"].as_array().unwrap().len()
        + objects["unselected"].as_array().unwrap().len();
    assert_eq!(returned, PAGE_CAP);
}

#[tokio::test]
async fn test_seed_is_reusable_on_a_bare_library() {
    let library = Library::new(InMemoryStorage::new());
    seed(&library).await;
    assert_eq!(library.suitecases_for_suite(LOGIN_SUITE).await.unwrap().len(), 2);
}
