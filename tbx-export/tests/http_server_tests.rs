//! HTTP Server & Routing Integration Tests
//!
//! Router-level tests drive `build_router` with `oneshot` against a fake
//! playlist source and fake catalog. The end-to-end test wires the real
//! HTTP clients to mockito servers.

mod helpers;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::FakeCatalog;
use http_body_util::BodyExt;
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tbx_export::models::RawPlaylist;
use tbx_export::services::{
    BoundedResolver, HttpCatalogClient, OAuthCredentials, PlaylistError, PlaylistExporter,
    PlaylistSource, RefreshTokenProvider, ResolverSettings, SpotifyPlaylistSource,
};
use tbx_export::{build_router, AppState};
use tower::ServiceExt;

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Playlists keyed by id; anything else is reported by `failure`
struct FakePlaylists {
    playlists: Vec<(&'static str, Value)>,
    failure: fn(&str) -> PlaylistError,
}

impl FakePlaylists {
    fn new() -> Self {
        Self {
            playlists: Vec::new(),
            failure: |id| PlaylistError::NotFound(id.to_string()),
        }
    }

    fn with_playlist(mut self, id: &'static str, payload: Value) -> Self {
        self.playlists.push((id, payload));
        self
    }

    fn failing_with(mut self, failure: fn(&str) -> PlaylistError) -> Self {
        self.failure = failure;
        self
    }
}

#[async_trait]
impl PlaylistSource for FakePlaylists {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<RawPlaylist, PlaylistError> {
        match self.playlists.iter().find(|(id, _)| *id == playlist_id) {
            Some((_, payload)) => serde_json::from_value(payload.clone())
                .map_err(|e| PlaylistError::ParseError(e.to_string())),
            None => Err((self.failure)(playlist_id)),
        }
    }
}

fn track(name: &str, artist: &str) -> Value {
    json!({ "track": { "name": name, "artists": [{ "name": artist }] } })
}

fn road_trip() -> Value {
    json!({
        "name": "Road Trip",
        "images": [{ "url": "https://img.example/cover.jpg" }],
        "tracks": { "items": [
            track("Shape of You", "Ed Sheeran"),
            track("Nonexistent Song XYZ123", "Nobody"),
            { "track": null },
            track("Blinding Lights (Remastered)", "The Weeknd"),
        ]}
    })
}

fn test_app(playlists: FakePlaylists, catalog: FakeCatalog) -> axum::Router {
    let resolver =
        BoundedResolver::new(Arc::new(catalog), ResolverSettings::new(4).unwrap()).unwrap();
    let exporter = PlaylistExporter::new(Arc::new(playlists), resolver);
    build_router(AppState::new(exporter), &[ALLOWED_ORIGIN.to_string()])
}

fn default_app() -> axum::Router {
    test_app(
        FakePlaylists::new()
            .with_playlist("roadtrip", road_trip())
            .with_playlist("empty", json!({ "name": "Empty", "tracks": { "items": [] } })),
        FakeCatalog::new()
            .with_hit("Shape of You Ed Sheeran", "song-1")
            .with_hit("Blinding Lights The Weeknd", "song-3"),
    )
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Root route reports liveness
#[tokio::test]
async fn test_root_route_reports_status() {
    // Given: Running server
    let app = default_app();

    // When: GET /
    let (status, body) = get(app, "/").await;

    // Then: Fixed liveness payload
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "API is Fine !" }));
}

/// Health endpoint exposes module identity and resolver limit
#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(default_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tbx-export");
    assert_eq!(body["concurrency_limit"], 4);
    assert!(body["uptime_seconds"].is_u64());
}

/// Matched songs come back in playlist order, unmatched ones are dropped
#[tokio::test]
async fn test_export_returns_resolved_songs_in_order() {
    // Given: Playlist with 3 searchable tracks, 2 of them in the catalog
    let app = default_app();

    // When: GET /api/roadtrip
    let (status, body) = get(app, "/api/roadtrip").await;

    // Then: 200 with the two matches, first track first
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["name"], "Road Trip");
    assert_eq!(data["type"], "playlist");
    assert_eq!(data["image"], "https://img.example/cover.jpg");
    assert_eq!(data["year"].as_str().unwrap().len(), "2024-01-01 00:00:00".len());

    let ids: Vec<&str> = data["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|song| song["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["song-1", "song-3"]);
}

/// Nothing matched is still a successful export
#[tokio::test]
async fn test_export_with_no_matches_is_empty_success() {
    let app = test_app(
        FakePlaylists::new().with_playlist("roadtrip", road_trip()),
        FakeCatalog::new(),
    );

    let (status, body) = get(app, "/api/roadtrip").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["songs"], json!([]));
}

#[tokio::test]
async fn test_empty_playlist_is_not_found() {
    let (status, body) = get(default_app(), "/api/empty").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Playlist not found or empty.");
}

#[tokio::test]
async fn test_unknown_playlist_is_not_found() {
    let (status, body) = get(default_app(), "/api/doesnotexist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let app = test_app(
        FakePlaylists::new()
            .failing_with(|_| PlaylistError::ApiError(401, "The access token expired".to_string())),
        FakeCatalog::new(),
    );

    let (status, body) = get(app, "/api/abc123").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_invalid_playlist_id_is_rejected() {
    let (status, body) = get(default_app(), "/api/not-a-valid-id").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cors_echoes_allowed_origin() {
    let response = default_app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        ALLOWED_ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let response = default_app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_preflight_mirrors_request() {
    let response = default_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/roadtrip")
                .header("origin", ALLOWED_ORIGIN)
                .header("access-control-request-method", "GET")
                .header("access-control-request-headers", "x-custom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "GET");
    assert_eq!(headers.get("access-control-allow-headers").unwrap(), "x-custom");
}

/// Full pipeline: token refresh, playlist fetch, catalog search and detail
#[tokio::test]
async fn test_end_to_end_against_mock_upstreams() {
    let mut accounts = Server::new_async().await;
    let mut spotify = Server::new_async().await;
    let mut catalog = Server::new_async().await;

    let token = accounts
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
        .expect(1)
        .create_async()
        .await;

    spotify
        .mock("GET", "/v1/playlists/37i9dQZF1DXcBWIGoYBM5M")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(road_trip().to_string())
        .create_async()
        .await;

    catalog
        .mock("GET", "/api/search")
        .match_query(Matcher::UrlEncoded("query".into(), "Shape of You Ed Sheeran".into()))
        .with_status(200)
        .with_body(r#"{"data": {"songs": {"results": [{"id": "abc"}]}}}"#)
        .create_async()
        .await;
    catalog
        .mock("GET", "/api/search")
        .match_query(Matcher::UrlEncoded("query".into(), "Nonexistent Song XYZ123 Nobody".into()))
        .with_status(200)
        .with_body(r#"{"data": {"songs": {"results": []}}}"#)
        .create_async()
        .await;
    catalog
        .mock("GET", "/api/search")
        .match_query(Matcher::UrlEncoded("query".into(), "Blinding Lights The Weeknd".into()))
        .with_status(500)
        .create_async()
        .await;
    let detail = catalog
        .mock("GET", "/api/songs/abc")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "abc", "name": "Shape of You"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let http_client = reqwest::Client::new();
    let timeout = Duration::from_secs(5);
    let credentials = RefreshTokenProvider::new(
        http_client.clone(),
        &accounts.url(),
        OAuthCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        },
        timeout,
    );
    let playlists =
        SpotifyPlaylistSource::new(http_client.clone(), &spotify.url(), Arc::new(credentials), timeout);
    let catalog_client =
        HttpCatalogClient::with_http_client(http_client, &catalog.url(), timeout).unwrap();
    let resolver =
        BoundedResolver::new(Arc::new(catalog_client), ResolverSettings::new(2).unwrap()).unwrap();
    let app = build_router(
        AppState::new(PlaylistExporter::new(Arc::new(playlists), resolver)),
        &[ALLOWED_ORIGIN.to_string()],
    );

    let (status, body) = get(app, "/api/37i9dQZF1DXcBWIGoYBM5M").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["songs"],
        json!([{ "id": "abc", "name": "Shape of You" }])
    );
    token.assert_async().await;
    detail.assert_async().await;
}
