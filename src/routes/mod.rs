pub mod auth;

pub mod users;

pub mod groups;

pub mod departments;

pub mod staff;

pub mod students;

pub mod workflows;

pub mod notifications;

pub mod files;

pub use auth::configure_auth_routes;
pub use departments::configure_department_routes;
pub use files::configure_file_routes;
pub use groups::configure_group_routes;
pub use notifications::configure_notification_routes;
pub use staff::configure_staff_routes;
pub use students::configure_student_routes;
pub use users::configure_user_routes;
pub use workflows::configure_workflow_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_group_routes)
        .configure(configure_department_routes)
        .configure(configure_staff_routes)
        .configure(configure_student_routes)
        .configure(configure_workflow_routes)
        .configure(configure_notification_routes)
        .configure(configure_file_routes);
}
