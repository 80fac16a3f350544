//! Post service behavior against in-memory repositories.

mod common;

use uuid::Uuid;

use foglio::application::posts::PostError;
use foglio::domain::validation::PostDraft;

use common::{MemoryStore, post_service, seed_user_with_session};

fn draft(title: &str, content: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        content: content.to_string(),
        ..PostDraft::default()
    }
}

#[tokio::test]
async fn create_stamps_author_and_normalizes_optional_fields() {
    let store = MemoryStore::new();
    let (user, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    let mut candidate = draft("First post", "Hello world");
    candidate.subtitle = Some(String::new());
    candidate.image_url = None;

    let ack = service
        .create_post(Some(&token), candidate)
        .await
        .expect("create succeeds");
    assert!(ack.success);
    assert_eq!(ack.message, "Post created successfully");

    let posts = service.list_posts().await.expect("list");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post.author_id, user.id);
    assert_eq!(posts[0].author.id, user.id);
    assert_eq!(posts[0].post.subtitle, None);
    assert_eq!(posts[0].post.image_url, None);
    assert_eq!(posts[0].post.created_at, posts[0].post.updated_at);
}

#[tokio::test]
async fn create_without_session_is_unauthorized_even_for_valid_payload() {
    let store = MemoryStore::new();
    let service = post_service(&store, false);

    let err = service
        .create_post(None, draft("Valid title", "Valid content"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::Unauthorized));
}

#[tokio::test]
async fn create_without_session_is_unauthorized_even_for_invalid_payload() {
    let store = MemoryStore::new();
    let service = post_service(&store, false);

    // Session resolution precedes validation, so the anonymous caller
    // never learns which fields were wrong.
    let err = service.create_post(None, draft("", "")).await.unwrap_err();
    assert!(matches!(err, PostError::Unauthorized));
}

#[tokio::test]
async fn create_with_blank_fields_reports_each_field() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    let err = service
        .create_post(Some(&token), draft("  ", ""))
        .await
        .unwrap_err();
    let PostError::Validation(validation) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let named: Vec<&str> = validation.fields.iter().map(|f| f.field).collect();
    assert_eq!(named, vec!["title", "content"]);

    assert!(service.list_posts().await.expect("list").is_empty());
}

#[tokio::test]
async fn expired_session_cannot_create() {
    use foglio::application::repos::SessionsRepo;
    use foglio::application::sessions::hash_token;
    use foglio::domain::entities::SessionRecord;
    use time::{Duration, OffsetDateTime};

    let store = MemoryStore::new();
    let (user, _) = seed_user_with_session(&store, "Ada", "ada@example.com").await;

    let stale = "stale-token";
    let now = OffsetDateTime::now_utc();
    store
        .insert_session(SessionRecord {
            token_hash: hash_token(stale),
            user_id: user.id,
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
        })
        .await
        .expect("insert stale session");

    let service = post_service(&store, false);
    let err = service
        .create_post(Some(stale), draft("T", "C"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::Unauthorized));
}

#[tokio::test]
async fn update_replaces_fields_and_strictly_advances_updated_at() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    service
        .create_post(Some(&token), draft("Before", "Old body"))
        .await
        .expect("create");
    let created = &service.list_posts().await.expect("list")[0].post;
    let id = created.id;
    let created_at = created.created_at;
    let first_updated_at = created.updated_at;

    let mut changes = draft("After", "New body");
    changes.subtitle = Some("Now with a subtitle".to_string());
    let ack = service
        .update_post(Some(&token), id, changes)
        .await
        .expect("update succeeds");
    assert_eq!(ack.message, "Post updated successfully");

    let updated = service.get_post(id).await.expect("fetch").post;
    assert_eq!(updated.title, "After");
    assert_eq!(updated.content, "New body");
    assert_eq!(updated.subtitle.as_deref(), Some("Now with a subtitle"));
    assert_eq!(updated.created_at, created_at);
    assert!(updated.updated_at > first_updated_at);
}

#[tokio::test]
async fn update_unknown_id_is_not_found_before_any_write() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    let err = service
        .update_post(Some(&token), Uuid::new_v4(), draft("T", "C"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound));
}

#[tokio::test]
async fn update_with_invalid_payload_fails_validation_first() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    // Invalid payload against an unknown id still reports validation.
    let err = service
        .update_post(Some(&token), Uuid::new_v4(), draft("", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::Validation(_)));
}

#[tokio::test]
async fn delete_removes_the_post() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    service
        .create_post(Some(&token), draft("Going away", "Soon"))
        .await
        .expect("create");
    let id = service.list_posts().await.expect("list")[0].post.id;

    let ack = service
        .delete_post(Some(&token), id)
        .await
        .expect("delete succeeds");
    assert_eq!(ack.message, "Post deleted successfully");

    let err = service.get_post(id).await.unwrap_err();
    assert!(matches!(err, PostError::NotFound));
    assert!(service.list_posts().await.expect("list").is_empty());
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    let err = service
        .delete_post(Some(&token), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound));
}

#[tokio::test]
async fn list_orders_newest_first() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    for title in ["first", "second", "third"] {
        service
            .create_post(Some(&token), draft(title, "body"))
            .await
            .expect("create");
    }

    let posts = service.list_posts().await.expect("list");
    let titles: Vec<&str> = posts.iter().map(|p| p.post.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn list_on_empty_store_is_empty() {
    let store = MemoryStore::new();
    let service = post_service(&store, false);
    assert!(service.list_posts().await.expect("list").is_empty());
}

#[tokio::test]
async fn owner_policy_rejects_non_author_mutations() {
    let store = MemoryStore::new();
    let (_, author_token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let (_, other_token) = seed_user_with_session(&store, "Brin", "brin@example.com").await;
    let service = post_service(&store, true);

    service
        .create_post(Some(&author_token), draft("Mine", "body"))
        .await
        .expect("create");
    let id = service.list_posts().await.expect("list")[0].post.id;

    let err = service
        .update_post(Some(&other_token), id, draft("Theirs", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotOwner));

    let err = service
        .delete_post(Some(&other_token), id)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotOwner));

    // The author still can.
    service
        .update_post(Some(&author_token), id, draft("Still mine", "body"))
        .await
        .expect("author update");
    service
        .delete_post(Some(&author_token), id)
        .await
        .expect("author delete");
}

#[tokio::test]
async fn owner_policy_rejects_anonymous_mutations_as_unauthorized() {
    let store = MemoryStore::new();
    let (_, token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, true);

    service
        .create_post(Some(&token), draft("Mine", "body"))
        .await
        .expect("create");
    let id = service.list_posts().await.expect("list")[0].post.id;

    let err = service.update_post(None, id, draft("T", "C")).await.unwrap_err();
    assert!(matches!(err, PostError::Unauthorized));

    let err = service.delete_post(None, id).await.unwrap_err();
    assert!(matches!(err, PostError::Unauthorized));
}

#[tokio::test]
async fn default_policy_lets_any_caller_mutate() {
    let store = MemoryStore::new();
    let (_, author_token) = seed_user_with_session(&store, "Ada", "ada@example.com").await;
    let service = post_service(&store, false);

    service
        .create_post(Some(&author_token), draft("Open", "body"))
        .await
        .expect("create");
    let id = service.list_posts().await.expect("list")[0].post.id;

    // With the flag off, update and delete do not consult the session.
    service
        .update_post(None, id, draft("Edited", "body"))
        .await
        .expect("anonymous update allowed");
    service
        .delete_post(None, id)
        .await
        .expect("anonymous delete allowed");
}
