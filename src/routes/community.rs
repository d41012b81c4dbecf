// ABOUTME: Community read-query routes backed by the managed datastore
// ABOUTME: Leaderboard, profile search, platform stats, and public profile pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Community routes.
//!
//! These endpoints are parameterized reads against the managed datastore:
//! validate parameters, issue the query through the [`ProfileStore`] seam,
//! shape the envelope. The profile page degrades gracefully — secondary reads
//! (achievements, recent logs, totals) are best-effort and empty out on
//! failure rather than failing the whole request.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};
use crate::middleware::cors::read_cors;
use crate::providers::datastore::{
    AchievementRecord, CategoryQuantity, LeaderboardKind, LeaderboardPeriod, LeaderboardQuery,
    PlatformStats, ProfileRecord, ProfileStore, WasteLogRecord, WasteTotals,
};
use crate::resources::ServerResources;

/// Maximum leaderboard page size.
const LEADERBOARD_MAX_LIMIT: u32 = 500;
/// Default leaderboard page size.
const LEADERBOARD_DEFAULT_LIMIT: u32 = 100;
/// Maximum search page size.
const SEARCH_MAX_LIMIT: u32 = 50;
/// Default search page size.
const SEARCH_DEFAULT_LIMIT: u32 = 10;
/// Achievements shown on a profile page.
const PROFILE_ACHIEVEMENTS_LIMIT: u32 = 10;
/// Recent logs shown on a profile page.
const PROFILE_RECENT_LOGS_LIMIT: u32 = 5;
/// Cache hint attached to cacheable aggregate responses, seconds.
const CACHE_DURATION_SECS: u32 = 300;

/// Community route handlers.
pub struct CommunityRoutes;

impl CommunityRoutes {
    /// Create the community read-query router.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let cors = read_cors(&resources.config.cors);

        Router::new()
            .route("/leaderboard", get(Self::handle_leaderboard))
            .route("/search", get(Self::handle_search))
            .route("/stats", get(Self::handle_stats))
            .route("/users/:id", get(Self::handle_profile))
            .layer(cors)
            .with_state(resources)
    }

    /// Ranked, opted-in profiles over the requested window.
    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<LeaderboardParams>,
    ) -> Result<Response, AppError> {
        let kind = LeaderboardKind::from_param(params.kind.as_deref().unwrap_or("points"));
        let period = LeaderboardPeriod::from_param(params.period.as_deref().unwrap_or("all"));
        let limit = params
            .limit
            .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
            .min(LEADERBOARD_MAX_LIMIT);

        let query = LeaderboardQuery {
            kind,
            period,
            limit,
        };
        let profiles = resources.profiles.leaderboard(&query).await?;

        let leaderboard: Vec<RankedProfile> = profiles
            .into_iter()
            .enumerate()
            .map(|(index, profile)| RankedProfile {
                rank: index + 1,
                profile,
            })
            .collect();

        let body = LeaderboardResponse {
            success: true,
            kind: kind.as_str(),
            period: period.as_str(),
            total: leaderboard.len(),
            leaderboard,
            metadata: ResponseMetadata::now(),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Case-insensitive profile search over visible profiles.
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<SearchParams>,
    ) -> Result<Response, AppError> {
        let query = params.q.as_deref().map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Err(
                AppError::invalid_input("Search query parameter \"q\" is required")
                    .with_details("example: /search?q=john&limit=10&offset=0"),
            );
        }

        let limit = params.limit.unwrap_or(SEARCH_DEFAULT_LIMIT).min(SEARCH_MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let page = resources.profiles.search_profiles(query, limit, offset).await?;

        let body = SearchResponse {
            success: true,
            query: query.to_string(),
            results: page.results,
            pagination: Pagination {
                total: page.total,
                limit,
                offset,
                has_more: page.total > u64::from(offset) + u64::from(limit),
            },
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Platform-wide aggregates, with a cache hint for edge caches.
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let stats = resources.profiles.platform_stats().await?;

        let body = StatsResponse {
            success: true,
            top_waste_categories: stats.top_categories.clone(),
            platform_stats: stats,
            metadata: ResponseMetadata::now(),
        };
        Ok((
            StatusCode::OK,
            [(
                header::CACHE_CONTROL,
                "s-maxage=300, stale-while-revalidate",
            )],
            Json(body),
        )
            .into_response())
    }

    /// Public profile page with best-effort secondary sections.
    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id: Uuid = id
            .parse()
            .map_err(|_| AppError::invalid_input("Invalid user ID format"))?;

        let profile = resources
            .profiles
            .profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !profile.profile_visible() {
            return Err(AppError::new(
                ErrorCode::ProfilePrivate,
                "This profile is private",
            ));
        }
        let show_on_leaderboard = profile.show_on_leaderboard();

        // Secondary sections degrade to empty rather than failing the page.
        let achievements = resources
            .profiles
            .achievements(user_id, PROFILE_ACHIEVEMENTS_LIMIT)
            .await
            .unwrap_or_else(|error| {
                warn!(%user_id, %error, "achievements read failed");
                Vec::new()
            });
        let recent_logs = resources
            .profiles
            .recent_waste_logs(user_id, PROFILE_RECENT_LOGS_LIMIT)
            .await
            .unwrap_or_else(|error| {
                warn!(%user_id, %error, "recent logs read failed");
                Vec::new()
            });
        let statistics = resources
            .profiles
            .waste_totals(user_id)
            .await
            .unwrap_or_else(|error| {
                warn!(%user_id, %error, "waste totals read failed");
                WasteTotals::default()
            });

        let body = ProfileResponse {
            success: true,
            profile: ProfileView {
                profile,
                show_on_leaderboard,
            },
            achievements,
            recent_logs,
            statistics,
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}

#[derive(Debug, Deserialize, Default)]
struct LeaderboardParams {
    #[serde(rename = "type")]
    kind: Option<String>,
    period: Option<String>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SearchParams {
    q: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Shared `generated_at` / cache-hint block.
#[derive(Debug, Serialize)]
struct ResponseMetadata {
    generated_at: String,
    cache_duration: u32,
}

impl ResponseMetadata {
    fn now() -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            cache_duration: CACHE_DURATION_SECS,
        }
    }
}

/// Profile with its 1-based leaderboard rank.
#[derive(Debug, Serialize)]
struct RankedProfile {
    rank: usize,
    #[serde(flatten)]
    profile: ProfileRecord,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    success: bool,
    #[serde(rename = "type")]
    kind: &'static str,
    period: &'static str,
    leaderboard: Vec<RankedProfile>,
    total: usize,
    metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    total: u64,
    limit: u32,
    offset: u32,
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    query: String,
    results: Vec<ProfileRecord>,
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    success: bool,
    platform_stats: PlatformStats,
    top_waste_categories: Vec<CategoryQuantity>,
    metadata: ResponseMetadata,
}

/// Public profile projection: the record plus its leaderboard opt-in, with
/// the raw settings blob already stripped by the record's serializer.
#[derive(Debug, Serialize)]
struct ProfileView {
    #[serde(flatten)]
    profile: ProfileRecord,
    show_on_leaderboard: bool,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    success: bool,
    profile: ProfileView,
    achievements: Vec<AchievementRecord>,
    recent_logs: Vec<WasteLogRecord>,
    statistics: WasteTotals,
}
