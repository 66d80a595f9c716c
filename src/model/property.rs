//! Observable value with change hooks

use std::fmt;

type ChangeHook<T> = Box<dyn FnMut(&T, &T)>;

/// A mutable field that notifies hooks after every real change
///
/// Hooks receive `(old, new)` and run exactly once per successful `set`.
/// Setting a value equal to the current one is a no-op and notifies nobody.
pub struct Property<T> {
    value: T,
    hooks: Vec<ChangeHook<T>>,
}

impl<T: PartialEq> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            hooks: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        let old = std::mem::replace(&mut self.value, value);
        for hook in &mut self.hooks {
            hook(&old, &self.value);
        }
        true
    }

    /// Register a hook invoked after each change, in registration order
    pub fn on_change(&mut self, hook: impl FnMut(&T, &T) + 'static) {
        self.hooks.push(Box::new(hook));
    }
}

impl<T: PartialEq + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.value)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_hook_runs_once_per_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut prop = Property::new(1);
        let sink = Rc::clone(&seen);
        prop.on_change(move |old, new| sink.borrow_mut().push((*old, *new)));

        assert!(prop.set(2));
        assert!(prop.set(3));

        assert_eq!(*seen.borrow(), vec![(1, 2), (2, 3)]);
        assert_eq!(*prop.get(), 3);
    }

    #[test]
    fn test_noop_set_does_not_notify() {
        let calls = Rc::new(RefCell::new(0));
        let mut prop = Property::new("a".to_string());
        let sink = Rc::clone(&calls);
        prop.on_change(move |_, _| *sink.borrow_mut() += 1);

        assert!(!prop.set("a".to_string()));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut prop: Property<Option<u8>> = Property::default();
        for tag in ["first", "second"] {
            let sink = Rc::clone(&order);
            prop.on_change(move |_, _| sink.borrow_mut().push(tag));
        }

        prop.set(Some(1));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }
}
