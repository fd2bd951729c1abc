mod common;

use axum::http::StatusCode;
use common::{body_json, error_fields, location, TestApp};

#[tokio::test]
async fn event_types_are_created_and_listed_by_name() {
    let app = TestApp::new().await;

    for name in ["Wedding", "Conference"] {
        let response = app.post_form("/event-types", &[("event_type_name", name)]).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/event-types");
    }

    let (status, types) = app.get("/event-types").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["event_type_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Conference", "Wedding"]);
}

#[tokio::test]
async fn duplicate_event_type_is_a_conflict() {
    let app = TestApp::new().await;
    app.seed_event_type("Wedding").await;

    let response = app
        .post_form("/event-types", &[("event_type_name", "  wedding ")])
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.post_form("/event-types", &[("event_type_name", "")]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn created_event_is_listed_with_its_type() {
    let app = TestApp::new().await;
    let event_type = app.seed_event_type("Concert").await;
    let type_id = event_type.to_string();

    let response = app
        .post_form(
            "/events",
            &[
                ("event_name", " Jazz Night "),
                ("event_date", "2025-03-14T19:30"),
                ("description", ""),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/events");

    let (_, events) = app.get("/events").await;
    let event = &events.as_array().unwrap()[0];
    assert_eq!(event["event_name"], "Jazz Night");
    assert_eq!(event["event_date"], "2025-03-14T19:30:00");
    assert!(event["description"].is_null());
    assert_eq!(event["event_type_name"], "Concert");

    let (status, one) = app.get("/events/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["event_type_name"], "Concert");
}

#[tokio::test]
async fn duplicate_name_and_date_is_rejected_ignoring_case_and_padding() {
    let app = TestApp::new().await;
    let event_type = app.seed_event_type("Concert").await;
    app.seed_event("Jazz Night", "2025-03-14T19:30", event_type).await;
    let type_id = event_type.to_string();

    let response = app
        .post_form(
            "/events",
            &[
                ("event_name", "  jazz NIGHT"),
                ("event_date", "2025-03-14T19:30"),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "An event with the same name and date already exists."
    );

    // Same name on another date is fine.
    let response = app
        .post_form(
            "/events",
            &[
                ("event_name", "Jazz Night"),
                ("event_date", "2025-03-15T19:30"),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn missing_fields_and_unknown_type_are_validation_failures() {
    let app = TestApp::new().await;

    let response = app
        .post_form("/events", &[("event_name", ""), ("event_date", "tomorrow")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&body_json(response).await);
    for field in ["event_name", "event_date", "event_type_id"] {
        assert!(fields.contains(&field.to_string()), "missing {field}");
    }

    let response = app
        .post_form(
            "/events",
            &[
                ("event_name", "Jazz Night"),
                ("event_date", "2025-03-14"),
                ("event_type_id", "42"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body_json(response).await), vec!["event_type_id"]);
}

#[tokio::test]
async fn long_description_is_rejected() {
    let app = TestApp::new().await;
    let type_id = app.seed_event_type("Concert").await.to_string();
    let description = "x".repeat(201);

    let response = app
        .post_form(
            "/events",
            &[
                ("event_name", "Jazz Night"),
                ("event_date", "2025-03-14T19:30"),
                ("description", description.as_str()),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body_json(response).await), vec!["description"]);
}

#[tokio::test]
async fn edit_excludes_itself_from_the_duplicate_check() {
    let app = TestApp::new().await;
    let event_type = app.seed_event_type("Concert").await;
    let first = app.seed_event("Jazz Night", "2025-03-14T19:30", event_type).await;
    app.seed_event("Blues Night", "2025-03-15T19:30", event_type).await;
    let type_id = event_type.to_string();

    let response = app
        .post_form(
            &format!("/events/{first}/edit"),
            &[
                ("event_name", "Jazz Night"),
                ("event_date", "2025-03-14T19:30"),
                ("description", "Now with a description"),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .post_form(
            &format!("/events/{first}/edit"),
            &[
                ("event_name", "blues night"),
                ("event_date", "2025-03-15T19:30"),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let (_, event) = app.get(&format!("/events/{first}")).await;
    assert_eq!(event["event_name"], "Jazz Night");
    assert_eq!(event["description"], "Now with a description");
}

#[tokio::test]
async fn delete_is_guarded_by_future_bookings() {
    let app = TestApp::new().await;
    let event_type = app.seed_event_type("Concert").await;
    let venue = app.seed_venue("Grand Hall", true).await;
    let upcoming = app.seed_event("Future Gala", "2999-01-01T18:00", event_type).await;
    let finished = app.seed_event("Past Gala", "2000-01-01T18:00", event_type).await;
    app.seed_booking(upcoming, venue, "2999-01-01T18:00").await;
    let past_booking = app.seed_booking(finished, venue, "2000-01-01T18:00").await;

    let response = app.post_form(&format!("/events/{upcoming}/delete"), &[]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "This event cannot be deleted because there are active bookings."
    );

    let response = app.post_form(&format!("/events/{finished}/delete"), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.get(&format!("/events/{finished}")).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&format!("/bookings/{past_booking}")).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn unknown_events_are_not_found() {
    let app = TestApp::new().await;
    let type_id = app.seed_event_type("Concert").await.to_string();

    assert_eq!(app.get("/events/7").await.0, StatusCode::NOT_FOUND);

    let response = app
        .post_form(
            "/events/7/edit",
            &[
                ("event_name", "Jazz Night"),
                ("event_date", "2025-03-14T19:30"),
                ("event_type_id", type_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        app.post_form("/events/7/delete", &[]).await.status(),
        StatusCode::NOT_FOUND
    );
}
