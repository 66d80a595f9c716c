//! Context data: ambient key-value state visible to shortcut matching
//!
//! Each UI element may carry its own `ContextData`. The full context for an
//! element is built by walking up the element tree and merging entries, with
//! the entry nearest to the element winning on key collisions.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// A typed key into `ContextData`
pub struct DataKey<T> {
    id: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DataKey<T> {
    pub const fn new(id: &'static str) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub const fn id(&self) -> &'static str {
        self.id
    }
}

impl<T> Clone for DataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DataKey<T> {}

impl<T> fmt::Debug for DataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey({})", self.id)
    }
}

/// Ordered mapping from string keys to shared, arbitrarily typed values
///
/// Values are reference counted, so cloning a context (or merging it into
/// another) shares the values owned by the UI rather than copying them.
#[derive(Clone, Default)]
pub struct ContextData {
    entries: Vec<(String, Rc<dyn Any>)>,
}

impl ContextData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any existing value under the same key
    pub fn set<T: 'static>(&mut self, key: DataKey<T>, value: T) -> &mut Self {
        self.set_raw(key.id(), Rc::new(value));
        self
    }

    /// Builder-style variant of `set`
    pub fn with<T: 'static>(mut self, key: DataKey<T>, value: T) -> Self {
        self.set(key, value);
        self
    }

    /// Set an untyped entry, keeping the key's original position when replacing
    pub fn set_raw(&mut self, key: impl Into<String>, value: Rc<dyn Any>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get<T: 'static>(&self, key: DataKey<T>) -> Option<&T> {
        self.get_raw(key.id())?.downcast_ref::<T>()
    }

    pub fn get_raw(&self, key: &str) -> Option<&Rc<dyn Any>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add entries from an ancestor's context. Existing keys are kept, so the
    /// entries merged first (nearest to the target) win.
    pub fn merge_inherited(&mut self, ancestor: &ContextData) {
        for (key, value) in &ancestor.entries {
            if !self.contains_key(key) {
                self.entries.push((key.clone(), Rc::clone(value)));
            }
        }
    }
}

impl fmt::Debug for ContextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: DataKey<String> = DataKey::new("name");
    const COUNT: DataKey<u32> = DataKey::new("count");

    #[test]
    fn test_set_and_get_typed() {
        let ctx = ContextData::new()
            .with(NAME, "doc".to_string())
            .with(COUNT, 3);

        assert_eq!(ctx.get(NAME).map(String::as_str), Some("doc"));
        assert_eq!(ctx.get(COUNT), Some(&3));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_get_with_wrong_type_is_none() {
        let ctx = ContextData::new().with(COUNT, 3);
        let wrong: DataKey<String> = DataKey::new("count");
        assert!(ctx.get(wrong).is_none());
        assert!(ctx.contains_key("count"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut ctx = ContextData::new().with(NAME, "a".to_string()).with(COUNT, 1);
        ctx.set(NAME, "b".to_string());

        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["name", "count"]);
        assert_eq!(ctx.get(NAME).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_merge_inherited_nearest_wins() {
        let mut near = ContextData::new().with(NAME, "near".to_string());
        let far = ContextData::new()
            .with(NAME, "far".to_string())
            .with(COUNT, 7);

        near.merge_inherited(&far);

        assert_eq!(near.get(NAME).map(String::as_str), Some("near"));
        assert_eq!(near.get(COUNT), Some(&7));
        assert_eq!(near.keys().collect::<Vec<_>>(), vec!["name", "count"]);
    }

    #[test]
    fn test_remove() {
        let mut ctx = ContextData::new().with(COUNT, 1);
        assert!(ctx.remove("count"));
        assert!(!ctx.remove("count"));
        assert!(ctx.is_empty());
    }
}
