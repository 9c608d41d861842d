// libs/professional-cell/tests/professional_service_test.rs

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use professional_cell::models::*;
use professional_cell::services::{AvailabilityGrid, ProfessionalService};
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

const TOKEN: &str = "session-token";

async fn setup() -> (MockServer, ProfessionalService) {
    let server = MockServer::start().await;
    let config = TestConfig::with_api_url(server.uri()).to_app_config();
    (server, ProfessionalService::new(&config))
}

async fn mount_professional(server: &MockServer, id: i64, schedules: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/professionals/{}", id)))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::professional_response(id, schedules)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_load_availability_groups_persisted_schedule() {
    let (server, service) = setup().await;
    mount_professional(
        &server,
        4,
        json!([
            { "dayOfWeek": "TUESDAY", "startTime": "08:00:00", "endTime": "12:00:00" }
        ]),
    )
    .await;

    let grid = service.load_availability(4, TOKEN).await.unwrap();

    let tuesday = grid.day(DayOfWeek::Tuesday).ranges();
    assert_eq!(tuesday.len(), 1);
    assert_eq!(format_clock(tuesday[0].start), "08:00");
    assert_eq!(format_clock(tuesday[0].end), "12:00");
    for day in DayOfWeek::ALL.into_iter().filter(|d| *d != DayOfWeek::Tuesday) {
        assert_eq!(grid.day(day).ranges(), &[TimeRange::default()]);
    }
}

#[tokio::test]
async fn test_save_availability_puts_exported_schedules() {
    let (server, service) = setup().await;
    mount_professional(&server, 4, json!([])).await;

    let expected_schedules = json!([
        { "professionalId": 4, "dayOfWeek": "MONDAY", "startTime": "10:00:00", "endTime": "11:00:00" }
    ]);

    Mock::given(method("PUT"))
        .and(path("/professionals/4"))
        .and(body_partial_json(json!({
            "cro": "SP-12345",
            "schedules": expected_schedules
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::professional_response(
                4,
                json!([{ "dayOfWeek": "MONDAY", "startTime": "10:00:00", "endTime": "11:00:00" }]),
            ),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut grid = AvailabilityGrid::new(Some(4));
    grid.apply(EditCommand::SetRange {
        day: DayOfWeek::Monday,
        index: 0,
        field: RangeField::Start,
        value: "09:00".to_string(),
    })
    .unwrap();
    grid.add_range(DayOfWeek::Monday);
    grid.apply(EditCommand::SetRange {
        day: DayOfWeek::Monday,
        index: 1,
        field: RangeField::Start,
        value: "10:00".to_string(),
    })
    .unwrap();
    grid.apply(EditCommand::SetRange {
        day: DayOfWeek::Monday,
        index: 1,
        field: RangeField::End,
        value: "11:00".to_string(),
    })
    .unwrap();

    let saved = service
        .save_availability(4, grid.into_availability(), TOKEN)
        .await
        .unwrap();

    assert_eq!(saved.id, Some(4));
    assert_eq!(saved.schedules.len(), 1);
    assert_eq!(saved.schedules[0].day_of_week, DayOfWeek::Monday);
}

#[tokio::test]
async fn test_save_availability_refetches_on_empty_reply() {
    let (server, service) = setup().await;
    mount_professional(&server, 8, json!([])).await;

    Mock::given(method("PUT"))
        .and(path("/professionals/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let saved = service
        .save_availability(8, WeeklyAvailability::new(), TOKEN)
        .await
        .unwrap();

    assert_eq!(saved.id, Some(8));
}

#[tokio::test]
async fn test_create_professional_omits_professional_id() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/professionals"))
        .and(body_partial_json(json!({
            "name": "Dr. Ana Souza",
            "cro": "SP-12345",
            "schedules": [
                { "dayOfWeek": "FRIDAY", "startTime": "13:00:00", "endTime": "17:30:00" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(MockClinicResponses::professional_response(
                21,
                json!([{ "dayOfWeek": "FRIDAY", "startTime": "13:00:00", "endTime": "17:30:00" }]),
            )),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request: CreateProfessionalRequest = serde_json::from_value(json!({
        "name": "Dr. Ana Souza",
        "email": "ana.souza@clinic.test",
        "cro": "SP-12345",
        "availability": {
            "FRIDAY": [{ "start": "13:00", "end": "17:30" }, { "start": "18:00", "end": "" }]
        }
    }))
    .unwrap();

    let created = service.create_professional(request, TOKEN).await.unwrap();
    assert_eq!(created.id, Some(21));

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body["schedules"][0].get("professionalId").is_none());
    assert_eq!(body["schedules"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_professional_surfaces_not_found() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/professionals/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(MockClinicResponses::error_response("not found")),
        )
        .mount(&server)
        .await;

    let err = service.load_availability(99, TOKEN).await.unwrap_err();
    assert!(err.to_string().starts_with("Resource not found"));
}

#[tokio::test]
async fn test_create_professional_rejects_invalid_form_before_calling_backend() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/professionals"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let request: CreateProfessionalRequest = serde_json::from_value(json!({
        "name": "Dr. Reis",
        "email": "not-an-email"
    }))
    .unwrap();

    let err = service.create_professional(request, TOKEN).await.unwrap_err();
    assert!(err.to_string().starts_with("Validation error"));
}
