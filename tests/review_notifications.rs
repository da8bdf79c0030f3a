mod common;

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use common::{Campus, campus, submit, workflow};
use rust_uniadmin::mail::Mailer;
use rust_uniadmin::mail::backends::memory::MemoryMailer;
use rust_uniadmin::models::documents::entities::DocumentState;
use rust_uniadmin::models::notifications::requests::NotificationListQuery;
use rust_uniadmin::models::users::entities::UserRole;
use rust_uniadmin::routes;
use rust_uniadmin::storage::Storage;
use rust_uniadmin::utils::jwt::JwtUtils;
use serde_json::json;

const BOUNDARY: &str = "uniadmin-test-boundary";

macro_rules! init_app {
    ($storage:expr, $mailer:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($mailer.clone() as Arc<dyn Mailer>))
                .configure(routes::configure_api_routes),
        )
        .await
    };
}

fn bearer(user_id: i64, role: UserRole) -> (header::HeaderName, String) {
    let token = JwtUtils::generate_access_token(user_id, role.as_str()).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// 只含文本字段的 multipart 请求体
fn multipart(fields: &[(&str, &str)]) -> ((header::HeaderName, String), String) {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    (
        (
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ),
        body,
    )
}

fn approve_request(doc_id: i64, staff_user_id: i64) -> test::TestRequest {
    let (content_type, body) = multipart(&[("comment", "Looks good")]);
    test::TestRequest::patch()
        .uri(&format!("/api/v1/staff/documents/{doc_id}/approve"))
        .insert_header(bearer(staff_user_id, UserRole::Staff))
        .insert_header(content_type)
        .set_payload(body)
}

fn staff_json(
    doc_id: i64,
    action: &str,
    staff_user_id: i64,
    body: serde_json::Value,
) -> test::TestRequest {
    test::TestRequest::patch()
        .uri(&format!("/api/v1/staff/documents/{doc_id}/{action}"))
        .insert_header(bearer(staff_user_id, UserRole::Staff))
        .set_json(body)
}

async fn notification_titles(storage: &Arc<dyn Storage>, user_id: i64) -> Vec<String> {
    let mut titles: Vec<String> = storage
        .list_notifications_with_pagination(
            user_id,
            NotificationListQuery {
                page: 1,
                size: 50,
                unread_only: false,
            },
        )
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|n| n.title)
        .collect();
    titles.sort();
    titles
}

fn templates_sent_to(mailer: &MemoryMailer, address: &str) -> Vec<&'static str> {
    mailer.sent_to(address).into_iter().map(|m| m.template).collect()
}

fn memory_mailer() -> Arc<MemoryMailer> {
    Arc::new(MemoryMailer::default())
}

#[actix_web::test]
async fn test_final_approval_notifies_owner() {
    let Campus {
        storage,
        registrar,
        student,
        ..
    } = campus().await;
    let mailer = memory_mailer();
    let app = init_app!(storage, mailer);
    let doc = submit(&storage, &student, &registrar).await;

    let resp = test::call_service(&app, approve_request(doc.id, registrar.user_id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::Approved);
    assert_eq!(stored.reviewer_comment.as_deref(), Some("Looks good"));

    assert_eq!(templates_sent_to(&mailer, &student.email), vec!["document_approved"]);
    assert!(mailer.sent_to(&registrar.email).is_empty());
    assert_eq!(
        notification_titles(&storage, student.user_id).await,
        vec!["Approved Document"]
    );
    assert_eq!(
        notification_titles(&storage, registrar.user_id).await,
        vec!["Approved Document"]
    );
}

#[actix_web::test]
async fn test_workflow_forward_return_and_terminal_reject() {
    let Campus {
        storage,
        department,
        registrar,
        dean,
        student,
    } = campus().await;
    let mailer = memory_mailer();
    let app = init_app!(storage, mailer);
    let flow = workflow(&storage, department.id, vec![registrar.id, dean.id], registrar.user_id).await;
    let doc = submit(&storage, &student, &registrar).await;

    let resp = test::call_service(
        &app,
        staff_json(doc.id, "set-workflow", registrar.user_id, json!({ "workflow_id": flow.id }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 第一步通过后转交给下一步的负责人
    let resp = test::call_service(&app, approve_request(doc.id, registrar.user_id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::InReview);
    assert_eq!(stored.currently_assigned_id, Some(dean.id));

    assert_eq!(templates_sent_to(&mailer, &dean.email), vec!["forwarded_document"]);
    assert!(mailer.sent_to(&student.email).is_empty());
    assert_eq!(
        notification_titles(&storage, dean.user_id).await,
        vec!["Forwarded Document"]
    );

    // 第二步驳回，退回上一步并附带理由
    mailer.clear();
    let resp = test::call_service(
        &app,
        staff_json(doc.id, "reject", dean.user_id, json!({ "comment": "Missing stamp" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::InReview);
    assert_eq!(stored.currently_assigned_id, Some(registrar.id));

    let returned = mailer.sent_to(&registrar.email);
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].template, "document_rejected");
    assert!(returned[0].body.contains("Reason: Missing stamp"));
    assert!(mailer.sent_to(&student.email).is_empty());
    assert!(
        notification_titles(&storage, registrar.user_id)
            .await
            .contains(&"Rejected Document".to_string())
    );

    // 第一步驳回即终止，通知学生
    mailer.clear();
    let resp = test::call_service(
        &app,
        staff_json(doc.id, "reject", registrar.user_id, json!({ "comment": "Wrong session" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::Rejected);

    let rejected = mailer.sent_to(&student.email);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].template, "document_rejected");
    assert!(rejected[0].body.contains("Reason: Wrong session"));
    assert_eq!(
        notification_titles(&storage, student.user_id).await,
        vec!["Rejected Document"]
    );
}

#[actix_web::test]
async fn test_request_changes_then_resubmission() {
    let Campus {
        storage,
        registrar,
        student,
        ..
    } = campus().await;
    let mailer = memory_mailer();
    let app = init_app!(storage, mailer);
    let doc = submit(&storage, &student, &registrar).await;

    let resp = test::call_service(
        &app,
        staff_json(
            doc.id,
            "request-changes",
            registrar.user_id,
            json!({ "comment": "Attach the receipt" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(templates_sent_to(&mailer, &student.email), vec!["changes_requested"]);
    assert!(mailer.sent_to(&registrar.email).is_empty());
    assert_eq!(
        notification_titles(&storage, student.user_id).await,
        vec!["Changes Requested"]
    );
    assert_eq!(
        notification_titles(&storage, registrar.user_id).await,
        vec!["Changes Requested"]
    );

    mailer.clear();
    let (content_type, body) = multipart(&[("title", "Transcript (with receipt)")]);
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/students/documents/{}", doc.id))
        .insert_header(bearer(student.user_id, UserRole::Student))
        .insert_header(content_type)
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::Pending);
    assert_eq!(stored.title, "Transcript (with receipt)");

    assert_eq!(templates_sent_to(&mailer, &registrar.email), vec!["document_submitted"]);
    assert!(mailer.sent_to(&student.email).is_empty());
    assert_eq!(
        notification_titles(&storage, registrar.user_id).await,
        vec!["Changes Requested", "Resubmitted Document"]
    );
}

#[actix_web::test]
async fn test_acting_on_unassigned_document_is_forbidden() {
    let Campus {
        storage,
        registrar,
        dean,
        student,
        ..
    } = campus().await;
    let mailer = memory_mailer();
    let app = init_app!(storage, mailer);
    let doc = submit(&storage, &student, &registrar).await;

    let resp = test::call_service(&app, approve_request(doc.id, dean.user_id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // 读取他人的文档仍视为不存在
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/staff/documents/{}", doc.id))
        .insert_header(bearer(dean.user_id, UserRole::Staff))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri("/api/v1/staff/documents/9999/reject")
        .insert_header(bearer(dean.user_id, UserRole::Staff))
        .set_json(json!({ "comment": "n/a" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let stored = storage.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.state, DocumentState::Pending);
    assert!(mailer.sent().is_empty());
    assert!(notification_titles(&storage, dean.user_id).await.is_empty());
}
