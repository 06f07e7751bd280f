//! Access-scope resolver tests over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use reels_core::models::{
    AnalyticsEvent, AssignmentMetadata, CurrentUser, CustomerStatus, EventType, LibraryFilter,
    NewContent, NewCustomer, SubscriptionTier, UserRole,
};
use reels_core::{AppError, ReelsConfig};
use reels_db::ports::{ContentStore, CustomerStore, EventStore, LibraryStore};
use reels_db::MemoryStore;
use reels_services::{AccessResolver, AnalyticsService};

fn resolver(store: &Arc<MemoryStore>, config: &ReelsConfig) -> AccessResolver {
    AccessResolver::new(
        store.clone(),
        store.clone(),
        store.clone(),
        AnalyticsService::new(store.clone()),
        config,
    )
}

fn viewer(company: Option<&str>) -> CurrentUser {
    CurrentUser::new(
        Uuid::new_v4(),
        "viewer@example.com",
        company.map(|s| s.to_string()),
        UserRole::Viewer,
    )
}

async fn seed_customer(store: &MemoryStore, name: &str, status: CustomerStatus) -> Uuid {
    CustomerStore::create(
        store,
        NewCustomer {
            name: name.to_string(),
            contact_email: None,
            subscription_tier: SubscriptionTier::Standard,
            status,
            max_seats: 10,
            max_storage_gb: 50,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_video(store: &MemoryStore, title: &str) -> Uuid {
    store
        .create_draft(NewContent {
            title: title.to_string(),
            description: None,
            machine_models: vec![],
            process_type: None,
            tooling: vec![],
            skill_level: None,
            tags: vec![],
            content_type: "video/mp4".to_string(),
            file_size: 0,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_unaffiliated_user_is_denied_everything() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let video_id = seed_video(&store, "Safety").await;

    for user in [viewer(None), viewer(Some("Unknown Co"))] {
        assert!(resolver
            .resolve_customer_for_user(&user)
            .await
            .unwrap()
            .is_none());
        assert!(!resolver.has_access(&user, video_id).await.unwrap());
        assert!(resolver
            .list_accessible_content(&user, &LibraryFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn test_assigned_video_is_accessible() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let acme = seed_customer(&store, "Acme Corp", CustomerStatus::Active).await;
    let video_id = seed_video(&store, "Safety").await;
    store
        .upsert_one(AssignmentMetadata::default().entry_for(acme, video_id))
        .await
        .unwrap();

    let user = viewer(Some("acme corp"));
    assert!(resolver.has_access(&user, video_id).await.unwrap());

    let listed = resolver
        .list_accessible_content(&user, &LibraryFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].video_id, video_id);
}

#[tokio::test]
async fn test_unassigned_video_is_denied() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    seed_customer(&store, "Acme Corp", CustomerStatus::Active).await;
    let video_id = seed_video(&store, "Safety").await;

    let user = viewer(Some("Acme Corp"));
    assert!(!resolver.has_access(&user, video_id).await.unwrap());
}

#[tokio::test]
async fn test_expired_entry_is_implicit_revocation() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let acme = seed_customer(&store, "Acme Corp", CustomerStatus::Active).await;
    let video_id = seed_video(&store, "Safety").await;
    let mut entry = AssignmentMetadata::default().entry_for(acme, video_id);
    entry.expires_at = Some(Utc::now() - Duration::hours(1));
    store.upsert_one(entry).await.unwrap();

    let user = viewer(Some("Acme Corp"));
    assert!(!resolver.has_access(&user, video_id).await.unwrap());
}

#[tokio::test]
async fn test_suspended_customer_is_denied() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let acme = seed_customer(&store, "Acme Corp", CustomerStatus::Suspended).await;
    let video_id = seed_video(&store, "Safety").await;
    store
        .upsert_one(AssignmentMetadata::default().entry_for(acme, video_id))
        .await
        .unwrap();

    let user = viewer(Some("Acme Corp"));
    assert!(!resolver.has_access(&user, video_id).await.unwrap());
}

#[tokio::test]
async fn test_content_manager_bypasses_customer_scoping() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let video_id = seed_video(&store, "Safety").await;

    let manager = CurrentUser::new(
        Uuid::new_v4(),
        "manager@example.com",
        None,
        UserRole::Manager,
    );
    assert!(resolver.has_access(&manager, video_id).await.unwrap());
}

#[tokio::test]
async fn test_content_manager_bypass_requires_existing_video() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    seed_video(&store, "Safety").await;

    let manager = CurrentUser::new(
        Uuid::new_v4(),
        "manager@example.com",
        None,
        UserRole::Manager,
    );
    assert!(!resolver.has_access(&manager, Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_listing_records_access_event() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    seed_customer(&store, "Acme Corp", CustomerStatus::Active).await;

    let user = viewer(Some("Acme Corp"));
    resolver
        .list_accessible_content(&user, &LibraryFilter::default())
        .await
        .unwrap();

    let events = store.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, user.id);
    assert_eq!(events[0].event_type, EventType::Access);
}

struct FailingEvents;

#[async_trait]
impl EventStore for FailingEvents {
    async fn record(&self, _event: AnalyticsEvent) -> Result<(), AppError> {
        Err(AppError::Internal("sink unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_analytics_failures_never_fail_the_listing() {
    let store = Arc::new(MemoryStore::new());
    let resolver = AccessResolver::new(
        store.clone(),
        store.clone(),
        store.clone(),
        AnalyticsService::new(Arc::new(FailingEvents)),
        &ReelsConfig::default(),
    );
    let acme = seed_customer(&store, "Acme Corp", CustomerStatus::Active).await;
    let video_id = seed_video(&store, "Safety").await;
    store
        .upsert_one(AssignmentMetadata::default().entry_for(acme, video_id))
        .await
        .unwrap();

    let user = viewer(Some("Acme Corp"));
    let listed = resolver
        .list_accessible_content(&user, &LibraryFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_trial_customer_retains_access() {
    let store = Arc::new(MemoryStore::new());
    let resolver = resolver(&store, &ReelsConfig::default());
    let acme = seed_customer(&store, "Acme Corp", CustomerStatus::Trial).await;
    let video_id = seed_video(&store, "Safety").await;
    store
        .upsert_one(AssignmentMetadata::default().entry_for(acme, video_id))
        .await
        .unwrap();

    let user = viewer(Some("Acme Corp"));
    assert!(resolver.has_access(&user, video_id).await.unwrap());
}
