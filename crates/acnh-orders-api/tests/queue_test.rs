//! Integration tests for the requester and moderator queue routes.

mod common;

use acnh_orders_queue::config::OrderConfig;
use axum::http::StatusCode;

#[tokio::test]
async fn test_enqueue_reports_positions_and_etas() {
    let app = common::build_test_app();

    // POST /api/v1/queue twice
    let (status, first) = common::enqueue(app.clone(), 1, "Tom").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["position"], 1);
    assert_eq!(first["eta_text"], "07m:05s");
    assert!(
        first["message"]
            .as_str()
            .unwrap()
            .ends_with("Your order will start after the current order is complete!")
    );

    let (status, second) = common::enqueue(app.clone(), 2, "Isabelle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["position"], 2);
    assert_eq!(second["eta_text"], "12m:35s");
    assert_eq!(
        second["message"],
        "Isabelle - Added you to the order queue. Your position is: **2**. Your predicted ETA is 12m:35s"
    );

    // GET /api/v1/queue/{user_id}
    let (status, json) = common::get_json(app.clone(), "/api/v1/queue/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["position"], 2);
    assert_eq!(json["state"], "waiting");

    // GET /api/v1/queue
    let (status, json) = common::get_json(app, "/api/v1/queue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "Tom\nIsabelle\n");
}

#[tokio::test]
async fn test_enqueue_shows_ids_when_configured() {
    let app = common::build_test_app_with(OrderConfig {
        show_ids: true,
        ..OrderConfig::default()
    });

    let (status, json) = common::enqueue(app, 1, "Tom").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("Tom - Added you to the order queue (ID 0). Your position is: **1**")
    );
}

#[tokio::test]
async fn test_skip_blocks_reentry_and_compacts_positions() {
    let app = common::build_test_app();
    common::enqueue(app.clone(), 1, "Tom").await;
    common::enqueue(app.clone(), 2, "Isabelle").await;
    common::enqueue(app.clone(), 3, "Nook").await;

    // POST /api/v1/queue/{user_id}/skip
    let (status, _) = common::send(app.clone(), "POST", "/api/v1/queue/1/skip", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = common::get_json(app.clone(), "/api/v1/queue/3").await;
    assert_eq!(json["position"], 2);

    let (status, json) = common::enqueue(app.clone(), 1, "Tom").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(json["error_kind"], "recently_removed");

    // A second skip has nothing active to flag.
    let (status, json) = common::send(app, "POST", "/api/v1/queue/1/skip", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "requester_not_found");
}

#[tokio::test]
async fn test_clear_empties_queue() {
    let app = common::build_test_app();
    common::enqueue(app.clone(), 1, "Tom").await;
    common::enqueue(app.clone(), 2, "Isabelle").await;

    // DELETE /api/v1/queue
    let (status, json) = common::send(app.clone(), "DELETE", "/api/v1/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["dropped"], 2);

    let (_, json) = common::get_json(app.clone(), "/api/v1/queue").await;
    assert_eq!(json["names"].as_array().unwrap().len(), 0);
    let (status, _) = common::get_json(app, "/api/v1/queue/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_eta_route_formats_hours() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/eta/11").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["eta_text"], "01h:02m:05s");
}
