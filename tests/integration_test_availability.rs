mod common;

use axum::http::StatusCode;
use chrono::{Duration, Weekday};
use common::{parse_body, upcoming, TestApp, BARBER_HAJ, BARBER_KARIM, CLASSIC_CUT, PREMIUM_CUT_SHAVE};

#[tokio::test]
async fn test_full_day_grid_on_weekday() {
    let app = TestApp::new().await;
    let monday = upcoming(Weekday::Mon);

    let slots = app.slots(BARBER_HAJ, CLASSIC_CUT, monday).await;

    assert_eq!(slots.len(), 24);
    assert_eq!(slots.first().map(String::as_str), Some("09:00"));
    assert_eq!(slots.last().map(String::as_str), Some("20:30"));
    assert!(!slots.contains(&"21:00".to_string()));
}

#[tokio::test]
async fn test_friday_is_half_day_and_sunday_closed() {
    let app = TestApp::new().await;

    let friday = app.slots(BARBER_HAJ, CLASSIC_CUT, upcoming(Weekday::Fri)).await;
    assert_eq!(friday.first().map(String::as_str), Some("14:00"));
    assert_eq!(friday.len(), 14);

    let sunday = app.slots(BARBER_HAJ, CLASSIC_CUT, upcoming(Weekday::Sun)).await;
    assert!(sunday.is_empty());
}

#[tokio::test]
async fn test_existing_booking_blocks_overlapping_slots_only() {
    let app = TestApp::new().await;
    let monday = upcoming(Weekday::Mon);

    // 45 minutes: 10:00 - 10:45
    let res = app.book(BARBER_HAJ, PREMIUM_CUT_SHAVE, monday, "10:00", "98123456").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let slots = app.slots(BARBER_HAJ, PREMIUM_CUT_SHAVE, monday).await;
    assert!(!slots.contains(&"09:30".to_string()));
    assert!(!slots.contains(&"10:00".to_string()));
    assert!(!slots.contains(&"10:30".to_string()));
    assert!(slots.contains(&"09:00".to_string()));
    assert!(slots.contains(&"11:00".to_string()));

    // Other barbers are unaffected.
    let other = app.slots(BARBER_KARIM, PREMIUM_CUT_SHAVE, monday).await;
    assert!(other.contains(&"10:00".to_string()));
}

#[tokio::test]
async fn test_slot_check_endpoint() {
    let app = TestApp::new().await;
    let monday = upcoming(Weekday::Mon);

    app.book(BARBER_KARIM, CLASSIC_CUT, monday, "12:00", "21234567").await;

    let uri = |time: &str| format!(
        "/api/v1/availability/check?barber_id={}&service_id={}&date={}&time={}",
        BARBER_KARIM, CLASSIC_CUT, monday, time
    );

    let taken = parse_body(app.get(&uri("12:00")).await).await;
    assert_eq!(taken["available"], false);

    let touching = parse_body(app.get(&uri("12:30")).await).await;
    assert_eq!(touching["available"], true);

    let off_grid = parse_body(app.get(&uri("12:15")).await).await;
    assert_eq!(off_grid["available"], false);
}

#[tokio::test]
async fn test_available_dates_skip_closed_and_disabled_days() {
    let app = TestApp::new().await;
    let monday = upcoming(Weekday::Mon);
    let sunday = monday + Duration::days(6);
    let wednesday = monday + Duration::days(2);

    let auth = app.login().await;
    let res = app.admin_request(&auth, "POST", "/api/v1/admin/disabled-dates", Some(serde_json::json!({
        "date": wednesday.to_string(),
        "reason": "Maintenance"
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.get(&format!(
        "/api/v1/availability/dates?barber_id={}&service_id={}&start={}&end={}",
        BARBER_HAJ, CLASSIC_CUT, monday, sunday
    )).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let dates: Vec<String> = body["dates"].as_array().unwrap()
        .iter()
        .map(|d| d.as_str().unwrap().to_string())
        .collect();

    assert_eq!(dates.len(), 5);
    assert!(dates.contains(&monday.to_string()));
    assert!(!dates.contains(&wednesday.to_string()));
    assert!(!dates.contains(&sunday.to_string()));

    let slots = app.slots(BARBER_HAJ, CLASSIC_CUT, wednesday).await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_past_date_has_no_slots() {
    let app = TestApp::new().await;
    let past = upcoming(Weekday::Mon) - Duration::days(28);

    assert!(app.slots(BARBER_HAJ, CLASSIC_CUT, past).await.is_empty());
}

#[tokio::test]
async fn test_bad_availability_queries() {
    let app = TestApp::new().await;
    let monday = upcoming(Weekday::Mon);

    let missing = app.get(&format!("/api/v1/availability/slots?barber_id={}&date={}", BARBER_HAJ, monday)).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bad_date = app.get(&format!(
        "/api/v1/availability/slots?barber_id={}&service_id={}&date=07-01-2030",
        BARBER_HAJ, CLASSIC_CUT
    )).await;
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);

    let unknown = app.get(&format!(
        "/api/v1/availability/slots?barber_id=barber-nobody&service_id={}&date={}",
        CLASSIC_CUT, monday
    )).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(unknown).await["code"], "NOT_FOUND");

    let reversed = app.get(&format!(
        "/api/v1/availability/dates?barber_id={}&service_id={}&start={}&end={}",
        BARBER_HAJ, CLASSIC_CUT, monday, monday - Duration::days(1)
    )).await;
    assert_eq!(reversed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_lists_seeded_reference_data() {
    let app = TestApp::new().await;

    let services = parse_body(app.get("/api/v1/services").await).await;
    let services = services.as_array().unwrap();
    assert_eq!(services.len(), 4);
    assert_eq!(services[0]["id"], "svc-beard-trim");
    assert!(services.iter().all(|s| s["duration_minutes"].as_i64().unwrap() > 0));

    let barbers = parse_body(app.get("/api/v1/barbers").await).await;
    let names: Vec<&str> = barbers.as_array().unwrap().iter().map(|b| b["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Haj", "Karim", "Youssef"]);

    let health = app.get("/health").await;
    assert_eq!(health.status(), StatusCode::OK);
}
