use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use marquee::api::{create_router, AppState};
use marquee::services::providers::file::{parse_catalog, parse_users};

const CATALOG: &str = "\
DieHard-1988 9 1
Speed-1994 8 2
TheNotebook-2004 1 9
Titanic-1997 2 8
";

const USERS: &str = "\
DieHard-1988 Speed-1994 TheNotebook-2004 Titanic-1997
sarah 9 NA 2 NA
tom NA NA NA NA
";

fn create_test_server() -> TestServer {
    let system = parse_catalog(CATALOG).unwrap();
    let users = parse_users(USERS, &system).unwrap();
    let state = AppState::with_data(system, users, 2);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn create_empty_server() -> TestServer {
    TestServer::new(create_router(AppState::new())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_empty_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_empty_server();
    let id = "6f1c2a4e-8d2b-4a51-9c0e-3b7f5d9a1e22";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    let echoed = response.headers().get("x-request-id").unwrap();
    assert_eq!(echoed.to_str().unwrap(), id);
}

#[tokio::test]
async fn test_catalog_text() {
    let server = create_test_server();
    let response = server.get("/catalog").await;
    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "DieHard (1988)\nSpeed (1994)\nTitanic (1997)\nTheNotebook (2004)\n"
    );
}

#[tokio::test]
async fn test_list_and_get_movies() {
    let server = create_test_server();

    let response = server.get("/movies").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 4);
    assert_eq!(movies[0]["name"], "DieHard");
    assert_eq!(movies[3]["name"], "TheNotebook");

    let response = server.get("/movies/Speed/1994").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["features"], json!([8.0, 2.0]));

    let response = server.get("/movies/Speed/1995").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_movie() {
    let server = create_empty_server();

    let response = server
        .post("/movies")
        .json(&json!({ "name": "Heat", "year": 1995, "features": [8.0, 3.0] }))
        .await;
    response.assert_status(StatusCode::CREATED);

    // Same pair again keeps the first features
    let response = server
        .post("/movies")
        .json(&json!({ "name": "Heat", "year": 1995, "features": [1.0, 1.0] }))
        .await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["features"], json!([8.0, 3.0]));

    let response = server.get("/movies").await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 1);
}

#[tokio::test]
async fn test_create_movie_validation() {
    let server = create_empty_server();

    server
        .post("/movies")
        .json(&json!({ "name": "Heat", "year": 1995, "features": [8.0, 3.0] }))
        .await
        .assert_status(StatusCode::CREATED);

    let wrong_length = server
        .post("/movies")
        .json(&json!({ "name": "Ronin", "year": 1998, "features": [7.0] }))
        .await;
    wrong_length.assert_status(StatusCode::BAD_REQUEST);

    let out_of_range = server
        .post("/movies")
        .json(&json!({ "name": "Ronin", "year": 1998, "features": [7.0, 12.0] }))
        .await;
    out_of_range.assert_status(StatusCode::BAD_REQUEST);

    let empty = server
        .post("/movies")
        .json(&json!({ "name": "Ronin", "year": 1998, "features": [] }))
        .await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = empty.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_users() {
    let server = create_test_server();

    let response = server.get("/users").await;
    response.assert_status_ok();
    let users: Vec<Value> = response.json();
    assert_eq!(users.len(), 2);

    let response = server.get("/users/sarah").await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(
        user["ratings"],
        json!([
            { "name": "DieHard", "year": 1988, "rating": 9.0 },
            { "name": "TheNotebook", "year": 2004, "rating": 2.0 }
        ])
    );

    server
        .get("/users/nobody")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_recommendations() {
    let server = create_test_server();

    let response = server.get("/users/sarah/recommendations/content").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["method"], "content");
    assert_eq!(body["movie"], json!({ "name": "Speed", "year": 1994 }));

    let response = server
        .get("/users/sarah/recommendations/cf")
        .add_query_param("k", 1)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["method"], "cf");
    assert_eq!(body["movie"], json!({ "name": "Speed", "year": 1994 }));
}

#[tokio::test]
async fn test_user_without_ratings_is_unprocessable() {
    let server = create_test_server();

    server
        .get("/users/tom/recommendations/content")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    server
        .get("/users/tom/recommendations/cf")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_user_prediction() {
    let server = create_test_server();

    let response = server
        .get("/users/sarah/predictions")
        .add_query_param("movie", "Speed")
        .add_query_param("year", 1994)
        .add_query_param("k", 1)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["score"], 9.0);
    assert_eq!(body["k"], 1);

    // Falls back to the configured default k of 2
    let response = server
        .get("/users/sarah/predictions")
        .add_query_param("movie", "Speed")
        .add_query_param("year", 1994)
        .await;
    let body: Value = response.json();
    assert_eq!(body["k"], 2);
    assert!((body["score"].as_f64().unwrap() - 7.18).abs() < 1e-9);

    server
        .get("/users/sarah/predictions")
        .add_query_param("movie", "Heat")
        .add_query_param("year", 1995)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_adhoc_prediction_end_to_end() {
    let server = create_empty_server();
    for (name, year, features) in [
        ("A", 2001, [1.0, 2.0, 3.0]),
        ("B", 2002, [4.0, 5.0, 6.0]),
        ("C", 2003, [7.0, 8.0, 9.0]),
    ] {
        server
            .post("/movies")
            .json(&json!({ "name": name, "year": year, "features": features }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .post("/predictions")
        .json(&json!({
            "ratings": [
                { "name": "A", "year": 2001, "rating": 8.0 },
                { "name": "B", "year": 2002, "rating": 4.0 }
            ],
            "movie": { "name": "C", "year": 2003 },
            "k": 2
        }))
        .await;
    response.assert_status_ok();

    let sim_ca = 50.0 / (194f64.sqrt() * 14f64.sqrt());
    let sim_cb = 122.0 / (194f64.sqrt() * 77f64.sqrt());
    let expected = (sim_ca * 8.0 + sim_cb * 4.0) / (sim_ca + sim_cb);

    let body: Value = response.json();
    assert!((body["score"].as_f64().unwrap() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_adhoc_recommendations() {
    let server = create_test_server();
    let ratings = json!([
        { "name": "DieHard", "year": 1988, "rating": 1.0 },
        { "name": "TheNotebook", "year": 2004, "rating": 10.0 }
    ]);

    let response = server
        .post("/recommendations/content")
        .json(&json!({ "ratings": ratings }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movie"]["name"], "Titanic");

    let response = server
        .post("/recommendations/cf")
        .json(&json!({ "ratings": ratings, "k": 1 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movie"]["name"], "Titanic");
}

#[tokio::test]
async fn test_adhoc_everything_rated_returns_null() {
    let server = create_test_server();
    let response = server
        .post("/recommendations/content")
        .json(&json!({
            "ratings": [
                { "name": "DieHard", "year": 1988, "rating": 9.0 },
                { "name": "Speed", "year": 1994, "rating": 8.0 },
                { "name": "TheNotebook", "year": 2004, "rating": 2.0 },
                { "name": "Titanic", "year": 1997, "rating": 3.0 }
            ]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["movie"].is_null());
}

#[tokio::test]
async fn test_adhoc_errors() {
    let server = create_test_server();

    server
        .post("/recommendations/content")
        .json(&json!({ "ratings": [] }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/recommendations/cf")
        .json(&json!({ "ratings": [{ "name": "Heat", "year": 1995, "rating": 5.0 }] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/recommendations/cf")
        .json(&json!({ "ratings": [{ "name": "Speed", "year": 1994, "rating": 11.0 }] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/predictions")
        .json(&json!({ "ratings": [], "movie": { "name": "Speed", "year": 1994 } }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
