//! Access-scope resolution
//!
//! Answers "can this user see this video" and "which videos can this user
//! see". The default is fail-closed: a user whose company matches no
//! customer record sees nothing. Content managers bypass customer scoping
//! for per-item checks so admin tooling can inspect any existing video.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use reels_core::models::{
    ContentSummary, CurrentUser, Customer, LibraryFilter, Permission, role_permissions,
};
use reels_core::{AppError, ReelsConfig};
use reels_db::ports::{ContentStore, CustomerStore, LibraryStore};

use crate::access::cache::PermissionCache;
use crate::analytics::AnalyticsService;

pub struct AccessResolver {
    customers: Arc<dyn CustomerStore>,
    content: Arc<dyn ContentStore>,
    library: Arc<dyn LibraryStore>,
    analytics: AnalyticsService,
    permissions: PermissionCache,
}

impl AccessResolver {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        content: Arc<dyn ContentStore>,
        library: Arc<dyn LibraryStore>,
        analytics: AnalyticsService,
        config: &ReelsConfig,
    ) -> Self {
        Self {
            customers,
            content,
            library,
            analytics,
            permissions: PermissionCache::new(Duration::from_secs(
                config.permission_cache_ttl_secs,
            )),
        }
    }

    /// The user's permission set, cached per user id with a TTL.
    pub fn permissions_for(&self, user: &CurrentUser) -> HashSet<Permission> {
        if let Some(perms) = self.permissions.get(user.id) {
            return perms;
        }
        let perms = role_permissions(user.role);
        self.permissions.insert(user.id, perms.clone());
        perms
    }

    /// Drop the cached permission set, forcing re-resolution on next use.
    pub fn invalidate_permissions(&self, user_id: Uuid) {
        self.permissions.invalidate(user_id);
    }

    /// The customer the user's company affiliation maps to. Absence of an
    /// affiliation or an unknown company is a normal outcome, not an error.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn resolve_customer_for_user(
        &self,
        user: &CurrentUser,
    ) -> Result<Option<Customer>, AppError> {
        let company = match user.company.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Ok(None),
        };
        self.customers.find_by_company(company).await
    }

    /// True iff the user may view the given video. No affiliation, no entry,
    /// a suspended customer, or an expired entry all mean no.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id, video_id = %video_id))]
    pub async fn has_access(
        &self,
        user: &CurrentUser,
        video_id: Uuid,
    ) -> Result<bool, AppError> {
        if self.permissions_for(user).contains(&Permission::ManageContent) {
            // Scoping bypass, not an existence bypass: the video must be real.
            return Ok(self.content.get(video_id).await?.is_some());
        }
        let customer = match self.resolve_customer_for_user(user).await? {
            Some(c) => c,
            None => return Ok(false),
        };
        if !customer.is_active() {
            return Ok(false);
        }
        let entry = match self.library.get(customer.id, video_id).await? {
            Some(e) => e,
            None => return Ok(false),
        };
        Ok(!entry.is_expired(Utc::now()))
    }

    /// The user's visible library under the given filter. An unaffiliated
    /// user gets an empty sequence, never an error.
    #[tracing::instrument(skip(self, user, filter), fields(user_id = %user.id))]
    pub async fn list_accessible_content(
        &self,
        user: &CurrentUser,
        filter: &LibraryFilter,
    ) -> Result<Vec<ContentSummary>, AppError> {
        let customer = match self.resolve_customer_for_user(user).await? {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        let results = self.library.query(customer.id, filter).await?;
        self.analytics.record_access(user.id, None).await;
        Ok(results)
    }
}
