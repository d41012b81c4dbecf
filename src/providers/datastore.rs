// ABOUTME: Managed datastore read client for profiles, achievements, and waste logs
// ABOUTME: Issues parameterized PostgREST queries; no schema ownership, reads only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Datastore reads.
//!
//! The community endpoints (leaderboard, search, stats, profile lookup) are
//! parameterized read queries against a managed datastore reached over its
//! REST interface. The datastore is an external collaborator: this module
//! owns no schema and performs no writes. [`ProfileStore`] is the seam the
//! route handlers depend on; [`SupabaseStore`] is the production
//! implementation.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::providers::http_client::shared_client;

/// Columns returned for every public profile read.
const PROFILE_COLUMNS: &str =
    "id,name,avatar_url,bio,location,total_points,level,current_streak,longest_streak,created_at";

/// Classified failures of a datastore read.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// Datastore URL or key is not configured.
    #[error("datastore is not configured")]
    NotConfigured,

    /// The read exceeded the shared client timeout.
    #[error("datastore read timed out")]
    Timeout,

    /// DNS or connection failure.
    #[error("datastore unreachable: {0}")]
    Unreachable(String),

    /// Datastore answered with a non-2xx status.
    #[error("datastore returned HTTP {status}")]
    Upstream { status: u16, body: String },

    /// Datastore answered 2xx with an undecodable body.
    #[error("invalid datastore response: {0}")]
    InvalidResponse(String),
}

/// Public profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub current_streak: i64,
    #[serde(default)]
    pub longest_streak: i64,
    pub created_at: Option<String>,
    /// Raw settings blob; stripped before anything is returned to a caller.
    #[serde(default, skip_serializing)]
    pub settings: Option<Value>,
}

impl ProfileRecord {
    fn privacy_flag(&self, flag: &str) -> bool {
        self.settings
            .as_ref()
            .and_then(|settings| settings.get("privacy"))
            .and_then(|privacy| privacy.get(flag))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the profile may be shown at all.
    pub fn profile_visible(&self) -> bool {
        self.privacy_flag("profile_visible")
    }

    /// Whether the profile opted into leaderboard listings.
    pub fn show_on_leaderboard(&self) -> bool {
        self.privacy_flag("show_on_leaderboard")
    }
}

/// Achievement row for the public profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: Value,
    pub badge_name: Option<String>,
    pub badge_type: Option<String>,
    pub unlocked_at: Option<String>,
}

/// Waste log row for the public profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteLogRecord {
    pub id: Value,
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    pub date: Option<String>,
    pub created_at: Option<String>,
}

/// Aggregated per-user waste totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WasteTotals {
    pub total_waste_logs: usize,
    pub total_waste_quantity_kg: f64,
}

/// Quantity aggregated per category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryQuantity {
    pub category: String,
    pub quantity: f64,
}

/// Platform-wide aggregates for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub active_users_30d: u64,
    pub total_waste_logs: u64,
    pub total_waste_tracked_kg: f64,
    pub total_achievements: u64,
    #[serde(skip)]
    pub top_categories: Vec<CategoryQuantity>,
}

/// Leaderboard ranking dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardKind {
    Points,
    Streak,
    Level,
}

impl LeaderboardKind {
    /// Parse the `type` query parameter; unknown values rank by points.
    pub fn from_param(param: &str) -> Self {
        match param {
            "streak" => Self::Streak,
            "level" => Self::Level,
            _ => Self::Points,
        }
    }

    /// Datastore column this dimension orders by.
    pub fn order_column(self) -> &'static str {
        match self {
            Self::Points => "total_points",
            Self::Streak => "current_streak",
            Self::Level => "level",
        }
    }

    /// Wire name echoed back in the response.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Streak => "streak",
            Self::Level => "level",
        }
    }
}

/// Leaderboard time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardPeriod {
    All,
    Monthly,
    Weekly,
}

impl LeaderboardPeriod {
    /// Parse the `period` query parameter; unknown values mean all-time.
    pub fn from_param(param: &str) -> Self {
        match param {
            "monthly" => Self::Monthly,
            "weekly" => Self::Weekly,
            _ => Self::All,
        }
    }

    /// Creation cutoff for this window, if any.
    pub fn created_after(self) -> Option<String> {
        let days = match self {
            Self::All => return None,
            Self::Monthly => 30,
            Self::Weekly => 7,
        };
        Some((Utc::now() - ChronoDuration::days(days)).to_rfc3339())
    }

    /// Wire name echoed back in the response.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

/// Parameters of one leaderboard read.
#[derive(Debug, Clone)]
pub struct LeaderboardQuery {
    pub kind: LeaderboardKind,
    pub period: LeaderboardPeriod,
    pub limit: u32,
}

/// A page of search results plus the exact total match count.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<ProfileRecord>,
    pub total: u64,
}

/// Seam between route handlers and the managed datastore.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Opted-in profiles ordered by the query's ranking dimension.
    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<Vec<ProfileRecord>, DatastoreError>;

    /// Case-insensitive name search over visible profiles.
    async fn search_profiles(
        &self,
        name_fragment: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, DatastoreError>;

    /// Single profile by id, including its settings blob.
    async fn profile(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatastoreError>;

    /// Most recent achievements for a user.
    async fn achievements(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AchievementRecord>, DatastoreError>;

    /// Most recent waste logs for a user.
    async fn recent_waste_logs(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WasteLogRecord>, DatastoreError>;

    /// Aggregated waste totals for a user.
    async fn waste_totals(&self, user_id: Uuid) -> Result<WasteTotals, DatastoreError>;

    /// Platform-wide aggregates.
    async fn platform_stats(&self) -> Result<PlatformStats, DatastoreError>;
}

/// Supabase/PostgREST configuration.
#[derive(Debug, Clone, Default)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,
    /// Anonymous (public read) API key
    pub anon_key: Option<String>,
}

/// Production datastore client over the PostgREST interface.
pub struct SupabaseStore {
    config: SupabaseConfig,
}

impl SupabaseStore {
    /// Create a store with the given configuration.
    #[must_use]
    pub fn new(config: SupabaseConfig) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Result<(&str, &str), DatastoreError> {
        let url = self
            .config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(DatastoreError::NotConfigured)?;
        let key = self
            .config
            .anon_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(DatastoreError::NotConfigured)?;
        Ok((url, key))
    }

    fn auth_headers(key: &str) -> Result<HeaderMap, DatastoreError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|_| DatastoreError::NotConfigured)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| DatastoreError::NotConfigured)?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Fetch rows from one table with the given PostgREST query parameters.
    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, DatastoreError> {
        let (url, key) = self.credentials()?;

        debug!(table, ?params, "datastore read");
        let response = shared_client()
            .get(format!("{}/rest/v1/{table}", url.trim_end_matches('/')))
            .headers(Self::auth_headers(key)?)
            .query(params)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatastoreError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DatastoreError::InvalidResponse(e.to_string()))
    }

    /// Exact row count for one table under the given filters.
    ///
    /// Uses a HEAD request with `Prefer: count=exact`; the count comes back in
    /// the `content-range` header as `0-n/total`.
    async fn count_rows(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<u64, DatastoreError> {
        let (url, key) = self.credentials()?;

        let mut headers = Self::auth_headers(key)?;
        headers.insert("prefer", HeaderValue::from_static("count=exact"));

        let response = shared_client()
            .head(format!("{}/rest/v1/{table}", url.trim_end_matches('/')))
            .headers(headers)
            .query(params)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatastoreError::Upstream {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        parse_content_range_total(
            response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok()),
        )
        .ok_or_else(|| {
            DatastoreError::InvalidResponse("missing or malformed content-range header".to_string())
        })
    }
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<Vec<ProfileRecord>, DatastoreError> {
        let mut params = vec![
            ("select", PROFILE_COLUMNS.to_string()),
            (
                "settings->privacy->>show_on_leaderboard",
                "eq.true".to_string(),
            ),
            (
                "order",
                format!("{}.desc,created_at.asc", query.kind.order_column()),
            ),
            ("limit", query.limit.to_string()),
        ];
        if let Some(cutoff) = query.period.created_after() {
            params.push(("created_at", format!("gte.{cutoff}")));
        }

        self.fetch_rows("profiles", &params).await
    }

    async fn search_profiles(
        &self,
        name_fragment: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, DatastoreError> {
        let filters = [
            ("name", format!("ilike.*{name_fragment}*")),
            ("settings->privacy->>profile_visible", "eq.true".to_string()),
        ];

        let mut params = vec![("select", PROFILE_COLUMNS.to_string())];
        params.extend(filters.iter().cloned());
        params.push(("order", "total_points.desc".to_string()));
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));

        let results = self.fetch_rows("profiles", &params).await?;

        let mut count_params = vec![("select", "id".to_string())];
        count_params.extend(filters.iter().cloned());
        let total = self.count_rows("profiles", &count_params).await?;

        Ok(SearchPage { results, total })
    }

    async fn profile(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatastoreError> {
        let params = [
            ("select", format!("{PROFILE_COLUMNS},settings")),
            ("id", format!("eq.{id}")),
            ("limit", "1".to_string()),
        ];
        let mut rows: Vec<ProfileRecord> = self.fetch_rows("profiles", &params).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn achievements(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AchievementRecord>, DatastoreError> {
        let params = [
            ("select", "id,badge_name,badge_type,unlocked_at".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("order", "unlocked_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.fetch_rows("achievements", &params).await
    }

    async fn recent_waste_logs(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WasteLogRecord>, DatastoreError> {
        let params = [
            (
                "select",
                "id,category,quantity,date,created_at".to_string(),
            ),
            ("user_id", format!("eq.{user_id}")),
            ("order", "date.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.fetch_rows("waste_logs", &params).await
    }

    async fn waste_totals(&self, user_id: Uuid) -> Result<WasteTotals, DatastoreError> {
        let params = [
            ("select", "category,quantity".to_string()),
            ("user_id", format!("eq.{user_id}")),
        ];
        let rows: Vec<WasteRow> = self.fetch_rows("waste_logs", &params).await?;

        Ok(WasteTotals {
            total_waste_logs: rows.len(),
            total_waste_quantity_kg: rows.iter().map(|row| row.quantity).sum(),
        })
    }

    async fn platform_stats(&self) -> Result<PlatformStats, DatastoreError> {
        let none: [(&str, String); 0] = [];
        let total_users = self.count_rows("profiles", &none).await?;
        let total_waste_logs = self.count_rows("waste_logs", &none).await?;
        let total_achievements = self.count_rows("achievements", &none).await?;

        let cutoff = (Utc::now() - ChronoDuration::days(30)).to_rfc3339();
        let active_users_30d = self
            .count_rows("profiles", &[("updated_at", format!("gte.{cutoff}"))])
            .await?;

        let rows: Vec<WasteRow> = self
            .fetch_rows("waste_logs", &[("select", "category,quantity".to_string())])
            .await?;

        let total_waste: f64 = rows.iter().map(|row| row.quantity).sum();

        Ok(PlatformStats {
            total_users,
            active_users_30d,
            total_waste_logs,
            total_waste_tracked_kg: (total_waste * 100.0).round() / 100.0,
            total_achievements,
            top_categories: top_categories(&rows, 5),
        })
    }
}

/// Minimal waste log projection used for aggregation.
#[derive(Debug, Deserialize)]
struct WasteRow {
    category: Option<String>,
    #[serde(default)]
    quantity: f64,
}

/// Aggregate quantities per category and keep the heaviest `keep`.
fn top_categories(rows: &[WasteRow], keep: usize) -> Vec<CategoryQuantity> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        if let Some(category) = row.category.as_deref() {
            *totals.entry(category).or_insert(0.0) += row.quantity;
        }
    }

    let mut ranked: Vec<CategoryQuantity> = totals
        .into_iter()
        .map(|(category, quantity)| CategoryQuantity {
            category: category.to_string(),
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .partial_cmp(&a.quantity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(keep);
    ranked
}

/// Total element of a `content-range` header: `items 0-9/42` or `0-9/42`.
fn parse_content_range_total(header: Option<&str>) -> Option<u64> {
    let header = header?;
    let total = header.rsplit('/').next()?;
    total.trim().parse().ok()
}

fn classify_transport_error(error: reqwest::Error) -> DatastoreError {
    if error.is_timeout() {
        DatastoreError::Timeout
    } else {
        DatastoreError::Unreachable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_parsing() {
        assert_eq!(parse_content_range_total(Some("0-9/42")), Some(42));
        assert_eq!(parse_content_range_total(Some("*/0")), Some(0));
        assert_eq!(parse_content_range_total(Some("garbage")), None);
        assert_eq!(parse_content_range_total(None), None);
    }

    #[test]
    fn top_categories_ranks_and_truncates() {
        let rows = vec![
            WasteRow {
                category: Some("Fruits".to_string()),
                quantity: 1.5,
            },
            WasteRow {
                category: Some("Dairy".to_string()),
                quantity: 4.0,
            },
            WasteRow {
                category: Some("Fruits".to_string()),
                quantity: 3.0,
            },
            WasteRow {
                category: None,
                quantity: 9.0,
            },
        ];
        let ranked = top_categories(&rows, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].category, "Fruits");
        assert!((ranked[0].quantity - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn privacy_flags_default_closed() {
        let profile = ProfileRecord {
            id: Uuid::nil(),
            name: None,
            avatar_url: None,
            bio: None,
            location: None,
            total_points: 0,
            level: 0,
            current_streak: 0,
            longest_streak: 0,
            created_at: None,
            settings: None,
        };
        assert!(!profile.profile_visible());
        assert!(!profile.show_on_leaderboard());

        let open = ProfileRecord {
            settings: Some(serde_json::json!({
                "privacy": {"profile_visible": true, "show_on_leaderboard": false}
            })),
            ..profile
        };
        assert!(open.profile_visible());
        assert!(!open.show_on_leaderboard());
    }

    #[test]
    fn leaderboard_kind_parses_with_default() {
        assert_eq!(LeaderboardKind::from_param("streak"), LeaderboardKind::Streak);
        assert_eq!(LeaderboardKind::from_param("bogus"), LeaderboardKind::Points);
        assert_eq!(LeaderboardKind::Points.order_column(), "total_points");
    }

    #[test]
    fn period_cutoffs() {
        assert!(LeaderboardPeriod::All.created_after().is_none());
        assert!(LeaderboardPeriod::Weekly.created_after().is_some());
        assert_eq!(LeaderboardPeriod::from_param("monthly"), LeaderboardPeriod::Monthly);
    }
}
