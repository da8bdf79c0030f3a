use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::errors::Result;
use crate::mail::Mailer;

pub type MailerConstructor = Arc<dyn Fn() -> Result<Arc<dyn Mailer>> + Send + Sync>;

static MAILER_REGISTRY: Lazy<RwLock<HashMap<String, MailerConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_mailer_plugin<S: Into<String>>(name: S, constructor: MailerConstructor) {
    MAILER_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name.into(), constructor);
}

pub fn get_mailer_plugin(name: &str) -> Option<MailerConstructor> {
    MAILER_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

pub fn registered_mailers() -> Vec<String> {
    let mut names: Vec<String> = MAILER_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}
