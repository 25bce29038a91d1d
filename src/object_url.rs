use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::resource::Resource;

const OBJECT_URL_PREFIX: &str = "blob:gltf-dropview/";

/// Hands out short-lived URLs for in-memory resources.
#[derive(Default)]
pub struct ObjectUrlStore {
    registry: RefCell<ObjectUrlRegistry>,
}

#[derive(Default)]
struct ObjectUrlRegistry {
    live: HashMap<String, Resource>,
    next_id: u64,
    created: usize,
    revoked: usize,
}

impl ObjectUrlStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// The URL stays resolvable until the returned guard is dropped.
    pub fn create(self: &Rc<Self>, resource: &Resource) -> TemporaryUrl {
        let mut registry = self.registry.borrow_mut();
        let url = format!("{OBJECT_URL_PREFIX}{}", registry.next_id);

        registry.next_id += 1;
        registry.created += 1;
        registry.live.insert(url.clone(), resource.clone());

        log::debug!("Created {url} for {}", resource.name);

        TemporaryUrl {
            url,
            store: self.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Resource> {
        self.registry.borrow().live.get(url).cloned()
    }

    pub fn is_object_url(url: &str) -> bool {
        url.starts_with(OBJECT_URL_PREFIX)
    }

    pub fn created_count(&self) -> usize {
        self.registry.borrow().created
    }

    pub fn revoked_count(&self) -> usize {
        self.registry.borrow().revoked
    }

    pub fn live_count(&self) -> usize {
        self.registry.borrow().live.len()
    }

    fn revoke(&self, url: &str) {
        let mut registry = self.registry.borrow_mut();

        match registry.live.remove(url) {
            Some(_) => {
                registry.revoked += 1;
                log::debug!("Revoked {url}");
            }
            None => log::warn!("Attempted to revoke unknown object URL: {url}"),
        }
    }
}

/// Revokes its URL exactly once, when dropped.
pub struct TemporaryUrl {
    url: String,
    store: Rc<ObjectUrlStore>,
}

impl TemporaryUrl {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}
