#![allow(dead_code)]

use std::sync::Arc;

use rust_uniadmin::models::{
    departments::{entities::Department, requests::CreateDepartmentRequest},
    documents::{
        entities::Document,
        requests::{CreateDocumentRequest, DocumentListQuery},
    },
    groups::{entities::Group, requests::CreateGroupRequest},
    staff::{entities::Staff, requests::CreateStaffRequest},
    students::{entities::Student, requests::CreateStudentRequest},
    workflows::{entities::Workflow, requests::CreateWorkflowRequest},
};
use rust_uniadmin::storage::{Storage, sea_orm_storage::SeaOrmStorage};

/// 已哈希的占位密码，存储层不校验格式
pub const PASSWORD_HASH: &str = "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo";

/// 每个测试使用独立的内存数据库
pub async fn storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 30)
        .await
        .expect("in-memory database");
    Arc::new(storage)
}

pub async fn group(storage: &Arc<dyn Storage>, name: &str) -> Group {
    storage
        .create_group(CreateGroupRequest {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("create group")
}

pub async fn department(storage: &Arc<dyn Storage>, group_id: i64, name: &str) -> Department {
    storage
        .create_department(CreateDepartmentRequest {
            group_id,
            name: name.to_string(),
        })
        .await
        .expect("create department")
}

pub async fn staff(storage: &Arc<dyn Storage>, department_id: i64, email: &str) -> Staff {
    storage
        .create_staff(CreateStaffRequest {
            email: email.to_string(),
            password: PASSWORD_HASH.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            phone: None,
            department_id,
            designation: "Lecturer".to_string(),
        })
        .await
        .expect("create staff")
}

pub async fn student(
    storage: &Arc<dyn Storage>,
    department_id: i64,
    email: &str,
    matric_number: &str,
) -> Student {
    storage
        .create_student(CreateStudentRequest {
            email: email.to_string(),
            password: PASSWORD_HASH.to_string(),
            first_name: "Tunde".to_string(),
            last_name: "Bello".to_string(),
            phone: Some("+2348012345678".to_string()),
            department_id,
            matric_number: matric_number.to_string(),
            level: 300,
        })
        .await
        .expect("create student")
}

pub async fn workflow(
    storage: &Arc<dyn Storage>,
    department_id: i64,
    steps: Vec<i64>,
    created_by: i64,
) -> Workflow {
    storage
        .create_workflow(
            CreateWorkflowRequest {
                name: "Transcript request".to_string(),
                department_id,
                steps,
            },
            created_by,
        )
        .await
        .expect("create workflow")
}

pub async fn submit(storage: &Arc<dyn Storage>, owner: &Student, recipient: &Staff) -> Document {
    storage
        .create_document(
            CreateDocumentRequest {
                owner_id: owner.id,
                department_id: owner.department_id,
                title: "Transcript".to_string(),
                description: Some("Final year transcript".to_string()),
                attachment: None,
                assigned_to: recipient.id,
            },
            owner.user_id,
        )
        .await
        .expect("create document")
}

pub fn first_page() -> DocumentListQuery {
    DocumentListQuery {
        page: 1,
        size: 20,
        ..Default::default()
    }
}

/// 一个学院、一个院系、两名教职工和一名学生
pub struct Campus {
    pub storage: Arc<dyn Storage>,
    pub department: Department,
    pub registrar: Staff,
    pub dean: Staff,
    pub student: Student,
}

pub async fn campus() -> Campus {
    let storage = storage().await;
    let group = group(&storage, "Faculty of Science").await;
    let department = department(&storage, group.id, "Computer Science").await;
    let registrar = staff(&storage, department.id, "registrar@uni.edu").await;
    let dean = staff(&storage, department.id, "dean@uni.edu").await;
    let student = student(&storage, department.id, "tunde@uni.edu", "CSC/2021/001").await;

    Campus {
        storage,
        department,
        registrar,
        dean,
        student,
    }
}
