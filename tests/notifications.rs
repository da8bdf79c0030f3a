mod common;

use common::campus;
use rust_uniadmin::models::notifications::requests::{
    CreateNotificationRequest, NotificationListQuery,
};

fn notice(user_id: i64, title: &str) -> CreateNotificationRequest {
    CreateNotificationRequest {
        user_id,
        title: title.to_string(),
        content: format!("{title} for user {user_id}"),
    }
}

fn page(unread_only: bool) -> NotificationListQuery {
    NotificationListQuery {
        page: 1,
        size: 20,
        unread_only,
    }
}

#[tokio::test]
async fn test_unread_count_and_mark_read() {
    let c = campus().await;
    let user_id = c.registrar.user_id;

    let first = c.storage.create_notification(notice(user_id, "New Document")).await.unwrap();
    c.storage.create_notification(notice(user_id, "Forwarded Document")).await.unwrap();
    c.storage
        .create_notification(notice(c.dean.user_id, "New Document"))
        .await
        .unwrap();

    assert!(!first.is_read);
    assert_eq!(c.storage.get_unread_notification_count(user_id).await.unwrap(), 2);

    // 别人的通知不受影响
    assert!(!c.storage.mark_notification_as_read(c.dean.user_id, first.id).await.unwrap());
    assert!(c.storage.mark_notification_as_read(user_id, first.id).await.unwrap());
    assert_eq!(c.storage.get_unread_notification_count(user_id).await.unwrap(), 1);

    let unread = c
        .storage
        .list_notifications_with_pagination(user_id, page(true))
        .await
        .unwrap();
    assert_eq!(unread.items.len(), 1);
    assert_eq!(unread.items[0].title, "Forwarded Document");

    let all = c
        .storage
        .list_notifications_with_pagination(user_id, page(false))
        .await
        .unwrap();
    assert_eq!(all.items.len(), 2);
    assert!(all.items.iter().all(|n| n.user_id == user_id));
}

#[tokio::test]
async fn test_mark_all_only_touches_owner() {
    let c = campus().await;
    for title in ["a", "b", "c"] {
        c.storage
            .create_notification(notice(c.registrar.user_id, title))
            .await
            .unwrap();
    }
    c.storage
        .create_notification(notice(c.dean.user_id, "d"))
        .await
        .unwrap();

    let marked = c
        .storage
        .mark_all_notifications_as_read(c.registrar.user_id)
        .await
        .unwrap();
    assert_eq!(marked, 3);
    assert_eq!(
        c.storage
            .get_unread_notification_count(c.registrar.user_id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        c.storage
            .get_unread_notification_count(c.dean.user_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_delete_notification() {
    let c = campus().await;
    let n = c
        .storage
        .create_notification(notice(c.student.user_id, "Approved Document"))
        .await
        .unwrap();

    assert!(!c.storage.delete_notification(c.registrar.user_id, n.id).await.unwrap());
    assert!(c.storage.delete_notification(c.student.user_id, n.id).await.unwrap());
    assert!(!c.storage.delete_notification(c.student.user_id, n.id).await.unwrap());

    let remaining = c
        .storage
        .list_notifications_with_pagination(c.student.user_id, page(false))
        .await
        .unwrap();
    assert!(remaining.items.is_empty());
}
