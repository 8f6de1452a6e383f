use std::cell::RefCell;
use std::collections::HashMap;

/// Resolved location of a named shader resource: its `@group` / `@binding` pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// Name → location memo, filled on first lookup of each name.
///
/// Misses are cached too, so an unknown name is resolved once and then answered
/// as `None` from the map. Interior mutability keeps lookups on `&self`; the
/// `RefCell` also keeps the owning program off other threads.
#[derive(Debug, Default)]
pub(crate) struct UniformCache {
    entries: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl UniformCache {
    pub(crate) fn get_or_resolve<F>(&self, name: &str, resolve: F) -> Option<UniformLocation>
    where
        F: FnOnce(&str) -> Option<UniformLocation>,
    {
        let cached = self.entries.borrow().get(name).copied();
        if let Some(location) = cached {
            return location;
        }

        let location = resolve(name);
        self.entries.borrow_mut().insert(name.to_owned(), location);
        location
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
