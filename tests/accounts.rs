mod common;

use common::{PASSWORD_HASH, department, group, staff, storage, student};
use rust_uniadmin::models::{
    departments::requests::UpdateDepartmentRequest,
    staff::requests::{CreateStaffRequest, StaffListQuery, UpdateStaffRequest},
    students::requests::{StudentListQuery, UpdateStudentRequest},
    users::{
        entities::{UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest},
    },
};
use rust_uniadmin::runtime::lifetime::startup::seed_admin;

#[tokio::test]
async fn test_staff_creation_creates_account() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Arts").await;
    let history = department(&storage, faculty.id, "History").await;

    let lecturer = staff(&storage, history.id, "lecturer@uni.edu").await;
    assert_eq!(lecturer.department_id, history.id);
    assert_eq!(lecturer.email, "lecturer@uni.edu");
    assert_eq!(lecturer.full_name(), "Ada Obi");

    let user = storage
        .get_user_by_email("lecturer@uni.edu")
        .await
        .unwrap()
        .expect("account row");
    assert_eq!(user.id, lecturer.user_id);
    assert_eq!(user.role, UserRole::Staff);
    assert_eq!(user.status, UserStatus::Active);

    let by_user = storage
        .get_staff_by_user_id(user.id)
        .await
        .unwrap()
        .expect("staff profile");
    assert_eq!(by_user.id, lecturer.id);
}

#[tokio::test]
async fn test_duplicate_email_rolls_back_profile() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Arts").await;
    let history = department(&storage, faculty.id, "History").await;
    staff(&storage, history.id, "lecturer@uni.edu").await;

    let result = storage
        .create_staff(CreateStaffRequest {
            email: "lecturer@uni.edu".to_string(),
            password: PASSWORD_HASH.to_string(),
            first_name: "Second".to_string(),
            last_name: "Person".to_string(),
            phone: None,
            department_id: history.id,
            designation: "Tutor".to_string(),
        })
        .await;
    assert!(result.is_err());
    assert_eq!(storage.count_staff().await.unwrap(), 1);
    assert_eq!(storage.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_staff_update_and_delete() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Arts").await;
    let history = department(&storage, faculty.id, "History").await;
    let music = department(&storage, faculty.id, "Music").await;
    let lecturer = staff(&storage, history.id, "lecturer@uni.edu").await;

    let updated = storage
        .update_staff(
            lecturer.id,
            UpdateStaffRequest {
                first_name: Some("Adaeze".to_string()),
                department_id: Some(music.id),
                designation: Some("Senior Lecturer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Adaeze");
    assert_eq!(updated.department_id, music.id);
    assert_eq!(updated.designation, "Senior Lecturer");

    let listed = storage
        .list_staff_with_pagination(StaffListQuery {
            page: 1,
            size: 10,
            department_id: Some(music.id),
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);

    assert!(storage.delete_staff(lecturer.id).await.unwrap());
    assert!(storage.get_user_by_id(lecturer.user_id).await.unwrap().is_none());
    assert!(!storage.delete_staff(lecturer.id).await.unwrap());
}

#[tokio::test]
async fn test_student_lookup_and_update() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Science").await;
    let physics = department(&storage, faculty.id, "Physics").await;
    let ada = student(&storage, physics.id, "ada@uni.edu", "PHY/2022/014").await;

    let by_matric = storage
        .get_student_by_matric_number("PHY/2022/014")
        .await
        .unwrap()
        .expect("student by matric number");
    assert_eq!(by_matric.id, ada.id);
    assert_eq!(by_matric.level, 300);

    let user = storage.get_user_by_id(ada.user_id).await.unwrap().unwrap();
    assert_eq!(user.role, UserRole::Student);

    let promoted = storage
        .update_student(
            ada.id,
            UpdateStudentRequest {
                level: Some(400),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.level, 400);
    assert_eq!(promoted.matric_number, "PHY/2022/014");

    let searched = storage
        .list_students_with_pagination(StudentListQuery {
            page: 1,
            size: 10,
            department_id: None,
            search: Some("PHY/2022".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(searched.items.len(), 1);

    assert!(storage.delete_student(ada.id).await.unwrap());
    assert!(storage.get_user_by_email("ada@uni.edu").await.unwrap().is_none());
}

#[tokio::test]
async fn test_department_in_use_cannot_be_deleted() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Science").await;
    let physics = department(&storage, faculty.id, "Physics").await;
    student(&storage, physics.id, "ada@uni.edu", "PHY/2022/014").await;

    assert!(storage.delete_department(physics.id).await.is_err());
    assert!(storage.get_department_by_id(physics.id).await.unwrap().is_some());

    let renamed = storage
        .update_department(
            physics.id,
            UpdateDepartmentRequest {
                name: Some("Applied Physics".to_string()),
                group_id: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Applied Physics");
}

#[tokio::test]
async fn test_group_delete_cascades_to_empty_departments() {
    let storage = storage().await;
    let faculty = group(&storage, "Faculty of Law").await;
    let dept = department(&storage, faculty.id, "Private Law").await;

    assert!(storage.delete_group(faculty.id).await.unwrap());
    assert!(storage.get_department_by_id(dept.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_update_and_reset_token() {
    let storage = storage().await;
    let user = storage
        .create_user(CreateUserRequest {
            email: "visitor@uni.edu".to_string(),
            password: PASSWORD_HASH.to_string(),
            first_name: "Vic".to_string(),
            last_name: "Tor".to_string(),
            phone: None,
            role: UserRole::User,
            avatar_url: None,
        })
        .await
        .unwrap();

    let updated = storage
        .update_user(
            user.id,
            UpdateUserRequest {
                phone: Some("+2348000000000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("+2348000000000"));
    assert_eq!(updated.first_name, "Vic");

    let expires = chrono::Utc::now().timestamp() + 3600;
    assert!(storage.save_reset_token(user.id, "reset-token", expires).await.unwrap());
    let pending = storage.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(pending.reset_token.as_deref(), Some("reset-token"));

    assert!(storage.save_password(user.id, "new-hash").await.unwrap());
    let reset = storage.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(reset.password_hash, "new-hash");
    assert!(reset.reset_token.is_none());

    assert_eq!(storage.count_users_by_role(UserRole::User).await.unwrap(), 1);
    assert_eq!(storage.count_users_by_role(UserRole::Admin).await.unwrap(), 0);
}

#[tokio::test]
async fn test_admin_seeded_only_into_empty_database() {
    let storage = storage().await;

    let admin = seed_admin(&storage)
        .await
        .unwrap()
        .expect("admin created on empty database");
    assert_eq!(admin.email, "admin@localhost");
    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(admin.status, UserStatus::Active);

    assert!(seed_admin(&storage).await.unwrap().is_none());
    assert_eq!(storage.count_users().await.unwrap(), 1);
}
