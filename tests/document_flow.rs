mod common;

use common::{campus, first_page, submit, workflow};
use rust_uniadmin::errors::UniAdminError;
use rust_uniadmin::models::documents::{
    entities::{DocumentActionKind, DocumentState},
    requests::DocumentChanges,
    transitions,
};

#[tokio::test]
async fn test_submission_is_pending_and_recorded() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    assert_eq!(doc.state, DocumentState::Pending);
    assert_eq!(doc.currently_assigned_id, Some(c.registrar.id));
    assert_eq!(doc.workflow_id, None);

    let history = c.storage.list_document_actions(doc.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, DocumentActionKind::Submit);
    assert_eq!(history[0].from_state, None);
    assert_eq!(history[0].to_state, DocumentState::Pending);
    assert_eq!(history[0].actor_id, c.student.user_id);
}

#[tokio::test]
async fn test_approve_without_workflow() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    let t = transitions::forward(&doc, c.registrar.id, None).unwrap();
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();

    assert_eq!(doc.state, DocumentState::Approved);
    assert!(doc.state.is_terminal());

    let actions: Vec<_> = c
        .storage
        .list_document_actions(doc.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert_eq!(
        actions,
        vec![DocumentActionKind::Submit, DocumentActionKind::Approve]
    );
}

#[tokio::test]
async fn test_workflow_forward_return_and_reject() {
    let c = campus().await;
    let flow = workflow(
        &c.storage,
        c.department.id,
        vec![c.registrar.id, c.dean.id],
        c.registrar.user_id,
    )
    .await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    let t = transitions::set_workflow(&doc, c.registrar.id, &flow).unwrap();
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();
    assert_eq!(doc.state, DocumentState::InReview);
    assert_eq!(doc.workflow_id, Some(flow.id));
    assert_eq!(doc.current_step, Some(0));

    let t = transitions::forward(&doc, c.registrar.id, Some(&flow)).unwrap();
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();
    assert_eq!(doc.currently_assigned_id, Some(c.dean.id));
    assert_eq!(doc.current_step, Some(1));

    // 非负责人不能操作
    assert_eq!(
        transitions::reject(&doc, c.registrar.id, Some(&flow)),
        Err(transitions::TransitionError::NotAssigned)
    );

    let t = transitions::reject(&doc, c.dean.id, Some(&flow))
        .unwrap()
        .with_comment("Missing signature");
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.dean.user_id)
        .await
        .unwrap();
    assert_eq!(doc.state, DocumentState::InReview);
    assert_eq!(doc.currently_assigned_id, Some(c.registrar.id));
    assert_eq!(doc.current_step, Some(0));
    assert_eq!(doc.reviewer_comment.as_deref(), Some("Missing signature"));

    let t = transitions::reject(&doc, c.registrar.id, Some(&flow))
        .unwrap()
        .with_comment("Not eligible");
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();
    assert_eq!(doc.state, DocumentState::Rejected);

    let history = c.storage.list_document_actions(doc.id).await.unwrap();
    let actions: Vec<_> = history.iter().map(|a| a.action).collect();
    assert_eq!(
        actions,
        vec![
            DocumentActionKind::Submit,
            DocumentActionKind::SetWorkflow,
            DocumentActionKind::Forward,
            DocumentActionKind::Return,
            DocumentActionKind::Reject,
        ]
    );
    assert_eq!(history[3].comment.as_deref(), Some("Missing signature"));
}

#[tokio::test]
async fn test_stale_transition_is_refused() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    let approve = transitions::forward(&doc, c.registrar.id, None).unwrap();
    let changes = transitions::request_changes(&doc, c.registrar.id)
        .unwrap()
        .with_comment("Add photo");

    c.storage
        .apply_document_transition(doc.id, changes, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();

    let err = c
        .storage
        .apply_document_transition(doc.id, approve, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, UniAdminError::InvalidState(_)));

    let doc = c.storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(doc.state, DocumentState::ChangesRequested);
    assert_eq!(c.storage.list_document_actions(doc.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_changes_requested_then_resubmitted() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    let t = transitions::request_changes(&doc, c.registrar.id)
        .unwrap()
        .with_comment("Attach receipt");
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();
    assert!(transitions::student_can_edit(doc.state));
    assert!(!transitions::student_can_delete(doc.state));

    let t = transitions::resubmit(&doc).unwrap();
    let changes = DocumentChanges {
        title: Some("Transcript (with receipt)".to_string()),
        ..Default::default()
    };
    let doc = c
        .storage
        .apply_document_transition(doc.id, t, changes, c.student.user_id)
        .await
        .unwrap();

    assert_eq!(doc.state, DocumentState::Pending);
    assert_eq!(doc.title, "Transcript (with receipt)");
    assert_eq!(doc.currently_assigned_id, Some(c.registrar.id));
}

#[tokio::test]
async fn test_content_update_keeps_state() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    let updated = c
        .storage
        .update_document_content(
            doc.id,
            DocumentState::Pending,
            DocumentChanges {
                description: Some("Updated".to_string()),
                ..Default::default()
            },
            c.student.user_id,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.state, DocumentState::Pending);
    assert_eq!(updated.description.as_deref(), Some("Updated"));

    let history = c.storage.list_document_actions(doc.id).await.unwrap();
    assert_eq!(history.last().unwrap().action, DocumentActionKind::Update);

    let missing = c
        .storage
        .update_document_content(
            9999,
            DocumentState::Pending,
            DocumentChanges::default(),
            c.student.user_id,
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_content_update_rejected_after_concurrent_approval() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;
    let seen_state = doc.state;

    // 学生读到 pending 后，教职工先一步通过
    let t = transitions::forward(&doc, c.registrar.id, None).unwrap();
    c.storage
        .apply_document_transition(doc.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();

    let err = c
        .storage
        .update_document_content(
            doc.id,
            seen_state,
            DocumentChanges {
                title: Some("Tampered".to_string()),
                ..Default::default()
            },
            c.student.user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UniAdminError::InvalidState(_)));

    let stored = c.storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::Approved);
    assert_eq!(stored.title, "Transcript");

    let history = c.storage.list_document_actions(doc.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().unwrap().action, DocumentActionKind::Approve);
}

#[tokio::test]
async fn test_listing_by_owner_and_assignee() {
    let c = campus().await;
    submit(&c.storage, &c.student, &c.registrar).await;
    submit(&c.storage, &c.student, &c.registrar).await;
    submit(&c.storage, &c.student, &c.dean).await;

    let mine = c
        .storage
        .list_documents_with_pagination(first_page().owned_by(c.student.id))
        .await
        .unwrap();
    assert_eq!(mine.pagination.total, 3);

    let assigned = c
        .storage
        .list_documents_with_pagination(first_page().assigned_to(c.registrar.id))
        .await
        .unwrap();
    assert_eq!(assigned.items.len(), 2);
    assert!(
        assigned
            .items
            .iter()
            .all(|d| d.currently_assigned_id == Some(c.registrar.id))
    );
}

#[tokio::test]
async fn test_staff_statistics() {
    let c = campus().await;
    let approved = submit(&c.storage, &c.student, &c.registrar).await;
    let rejected = submit(&c.storage, &c.student, &c.registrar).await;
    submit(&c.storage, &c.student, &c.registrar).await;

    let t = transitions::forward(&approved, c.registrar.id, None).unwrap();
    c.storage
        .apply_document_transition(approved.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();
    let t = transitions::reject(&rejected, c.registrar.id, None)
        .unwrap()
        .with_comment("Incomplete");
    c.storage
        .apply_document_transition(rejected.id, t, DocumentChanges::default(), c.registrar.user_id)
        .await
        .unwrap();

    let stats = c
        .storage
        .get_staff_statistics(c.registrar.id, c.registrar.user_id)
        .await
        .unwrap();
    assert_eq!(stats.assigned_total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_review, 0);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.changes_requested, 0);

    let idle = c
        .storage
        .get_staff_statistics(c.dean.id, c.dean.user_id)
        .await
        .unwrap();
    assert_eq!(idle.assigned_total, 0);
}

#[tokio::test]
async fn test_deleting_document_drops_history() {
    let c = campus().await;
    let doc = submit(&c.storage, &c.student, &c.registrar).await;

    assert!(c.storage.delete_document(doc.id).await.unwrap());
    assert!(c.storage.get_document_by_id(doc.id).await.unwrap().is_none());
    assert!(c.storage.list_document_actions(doc.id).await.unwrap().is_empty());
    assert!(!c.storage.delete_document(doc.id).await.unwrap());
}
