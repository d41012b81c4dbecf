// ABOUTME: End-to-end tests for the community read-query routes
// ABOUTME: Leaderboard ranking, search validation, stats shaping, and profile privacy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs
#![allow(missing_docs)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use morsel_api::config::environment::{CorsConfig, HttpConfig, LogLevel, ServerConfig};
use morsel_api::providers::datastore::{
    AchievementRecord, CategoryQuantity, DatastoreError, LeaderboardKind, LeaderboardQuery,
    PlatformStats, ProfileRecord, ProfileStore, SearchPage, SupabaseConfig, WasteLogRecord,
    WasteTotals,
};
use morsel_api::providers::detection::{MockDetector, RoboflowConfig};
use morsel_api::resources::ServerResources;
use morsel_api::routes::CommunityRoutes;

const VISIBLE_ID: &str = "11111111-2222-3333-4444-555555555555";
const PRIVATE_ID: &str = "99999999-8888-7777-6666-555555555555";

fn test_config() -> ServerConfig {
    ServerConfig {
        http: HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
        },
        detection: RoboflowConfig::default(),
        datastore: SupabaseConfig::default(),
        log_level: LogLevel::Info,
    }
}

fn profile(id: &str, name: &str, points: i64, visible: bool) -> ProfileRecord {
    ProfileRecord {
        id: id.parse().unwrap(),
        name: Some(name.to_string()),
        avatar_url: None,
        bio: Some("tracking my food waste".to_string()),
        location: Some("Rotterdam".to_string()),
        total_points: points,
        level: 3,
        current_streak: 7,
        longest_streak: 21,
        created_at: Some("2025-06-01T09:00:00+00:00".to_string()),
        settings: Some(serde_json::json!({
            "privacy": {
                "profile_visible": visible,
                "show_on_leaderboard": visible,
            },
            "email_notifications": true,
        })),
    }
}

fn app_with_store(store: Arc<dyn ProfileStore>) -> Router {
    let resources = Arc::new(ServerResources::with_providers(
        test_config(),
        Arc::new(MockDetector::with_predictions(vec![], 640, 640)),
        store,
    ));
    CommunityRoutes::routes(resources)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn leaderboard_assigns_ranks_in_order() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request("/leaderboard?type=points&limit=10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["type"], "points");
    assert_eq!(json["period"], "all");
    assert_eq!(json["total"], 2);

    let board = json["leaderboard"].as_array().unwrap();
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["name"], "ada");
    assert_eq!(board[1]["rank"], 2);
    // The raw settings blob never leaks into responses.
    assert!(board[0].get("settings").is_none());
}

#[tokio::test]
async fn leaderboard_defaults_match_unknown_parameters() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request("/leaderboard?type=bogus&period=bogus"))
        .await
        .unwrap();

    let json = response_json(response).await;
    assert_eq!(json["type"], "points");
    assert_eq!(json["period"], "all");
}

#[tokio::test]
async fn search_requires_a_query() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app.oneshot(get_request("/search")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"].as_str().unwrap().contains("\"q\""));
}

#[tokio::test]
async fn search_blank_query_is_rejected() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app.oneshot(get_request("/search?q=%20%20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_pages_and_reports_totals() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request("/search?q=ada&limit=1&offset=0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "ada");
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["pagination"]["limit"], 1);
    assert_eq!(json["pagination"]["offset"], 0);
    assert_eq!(json["pagination"]["hasMore"], true);
}

#[tokio::test]
async fn stats_returns_aggregates_with_cache_hint() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cache_control.contains("s-maxage=300"));

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["platform_stats"]["total_users"], 42);
    assert_eq!(json["platform_stats"]["total_waste_tracked_kg"], 12.5);
    assert_eq!(json["top_waste_categories"][0]["category"], "Fruits");
    assert!(json["metadata"]["generated_at"].is_string());
}

#[tokio::test]
async fn profile_requires_a_uuid() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app.oneshot(get_request("/users/not-a-uuid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"].as_str().unwrap().contains("user ID"));
}

#[tokio::test]
async fn unknown_profile_gives_404() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request(
            "/users/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = response_json(response).await;
    assert_eq!(json["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn private_profile_gives_403() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request(&format!("/users/{PRIVATE_ID}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = response_json(response).await;
    assert_eq!(json["code"], "PROFILE_PRIVATE");
    assert!(json["error"].as_str().unwrap().contains("private"));
}

#[tokio::test]
async fn visible_profile_returns_sections_and_strips_settings() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let response = app
        .oneshot(get_request(&format!("/users/{VISIBLE_ID}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["profile"]["name"], "ada");
    assert_eq!(json["profile"]["show_on_leaderboard"], true);
    assert!(json["profile"].get("settings").is_none());
    assert_eq!(json["achievements"].as_array().unwrap().len(), 1);
    assert_eq!(json["recent_logs"].as_array().unwrap().len(), 1);
    assert_eq!(json["statistics"]["total_waste_logs"], 3);
}

#[tokio::test]
async fn secondary_read_failures_degrade_to_empty_sections() {
    let store = CannedStore {
        fail_secondary: true,
        ..CannedStore::default()
    };
    let app = app_with_store(Arc::new(store));
    let response = app
        .oneshot(get_request(&format!("/users/{VISIBLE_ID}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["achievements"].as_array().unwrap().is_empty());
    assert!(json["recent_logs"].as_array().unwrap().is_empty());
    assert_eq!(json["statistics"]["total_waste_logs"], 0);
}

#[tokio::test]
async fn unreachable_datastore_gives_503() {
    let store = CannedStore {
        fail_all: true,
        ..CannedStore::default()
    };
    let app = app_with_store(Arc::new(store));
    let response = app.oneshot(get_request("/leaderboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = response_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_UNREACHABLE");
}

#[tokio::test]
async fn non_get_method_gives_405() {
    let app = app_with_store(Arc::new(CannedStore::default()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/leaderboard")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

/// Canned datastore with two profiles, one private.
#[derive(Default)]
struct CannedStore {
    fail_all: bool,
    fail_secondary: bool,
}

impl CannedStore {
    fn unreachable() -> DatastoreError {
        DatastoreError::Unreachable("connection refused".to_string())
    }

    fn profiles(&self) -> Vec<ProfileRecord> {
        vec![
            profile(VISIBLE_ID, "ada", 900, true),
            profile(PRIVATE_ID, "grace", 700, false),
        ]
    }
}

#[async_trait]
impl ProfileStore for CannedStore {
    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<Vec<ProfileRecord>, DatastoreError> {
        if self.fail_all {
            return Err(Self::unreachable());
        }
        assert_eq!(query.kind, LeaderboardKind::Points);
        Ok(self.profiles())
    }

    async fn search_profiles(
        &self,
        _name_fragment: &str,
        limit: u32,
        _offset: u32,
    ) -> Result<SearchPage, DatastoreError> {
        if self.fail_all {
            return Err(Self::unreachable());
        }
        let mut results = self.profiles();
        results.truncate(limit as usize);
        Ok(SearchPage { results, total: 2 })
    }

    async fn profile(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatastoreError> {
        if self.fail_all {
            return Err(Self::unreachable());
        }
        Ok(self.profiles().into_iter().find(|p| p.id == id))
    }

    async fn achievements(
        &self,
        _user_id: Uuid,
        _limit: u32,
    ) -> Result<Vec<AchievementRecord>, DatastoreError> {
        if self.fail_all || self.fail_secondary {
            return Err(Self::unreachable());
        }
        Ok(vec![AchievementRecord {
            id: serde_json::json!(1),
            badge_name: Some("First Log".to_string()),
            badge_type: Some("milestone".to_string()),
            unlocked_at: Some("2025-06-02T12:00:00+00:00".to_string()),
        }])
    }

    async fn recent_waste_logs(
        &self,
        _user_id: Uuid,
        _limit: u32,
    ) -> Result<Vec<WasteLogRecord>, DatastoreError> {
        if self.fail_all || self.fail_secondary {
            return Err(Self::unreachable());
        }
        Ok(vec![WasteLogRecord {
            id: serde_json::json!(10),
            category: Some("Fruits".to_string()),
            quantity: 0.4,
            date: Some("2025-07-01".to_string()),
            created_at: Some("2025-07-01T18:00:00+00:00".to_string()),
        }])
    }

    async fn waste_totals(&self, _user_id: Uuid) -> Result<WasteTotals, DatastoreError> {
        if self.fail_all || self.fail_secondary {
            return Err(Self::unreachable());
        }
        Ok(WasteTotals {
            total_waste_logs: 3,
            total_waste_quantity_kg: 1.2,
        })
    }

    async fn platform_stats(&self) -> Result<PlatformStats, DatastoreError> {
        if self.fail_all {
            return Err(Self::unreachable());
        }
        Ok(PlatformStats {
            total_users: 42,
            active_users_30d: 12,
            total_waste_logs: 128,
            total_waste_tracked_kg: 12.5,
            total_achievements: 31,
            top_categories: vec![CategoryQuantity {
                category: "Fruits".to_string(),
                quantity: 6.5,
            }],
        })
    }
}
