pub mod log;
pub mod memory;

/// 登记内置邮件后端
pub fn register_builtin_mailers() {
    log::register();
    memory::register();
}
