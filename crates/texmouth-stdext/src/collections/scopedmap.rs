//! A hash map with a concept of scope such that mutations are rolled back at
//! the end of the scope.
//!
//! The map methods are the same as the standard hash map (although only a few
//! methods are implemented).
//! ```
//! # use texmouth_stdext::collections::scopedmap::ScopedMap;
//! let mut cat_colors = ScopedMap::new();
//! cat_colors.insert("mint", "ginger");
//! assert_eq!(cat_colors.get(&"mint"), Some(&"ginger"));
//! ```
//! The scoped map additionally has `begin_scope` and `end_scope` methods with
//! the following behavior: when a scope is ended, all mutations to the map
//! since the beginning of the scope are rolled back.
//! ```
//! # use texmouth_stdext::collections::scopedmap::ScopedMap;
//! let mut cat_colors = ScopedMap::new();
//!
//! cat_colors.insert("paganini", "black");
//! cat_colors.begin_scope();
//! cat_colors.insert("paganini", "gray");
//! assert_eq!(cat_colors.get(&"paganini"), Some(&"gray"));
//! assert_eq!(cat_colors.end_scope(), true);
//! assert_eq!(cat_colors.get(&"paganini"), Some(&"black"));
//! ```
//! The `end_scope` method returns a boolean which is false if there is no
//! scope to end, and true otherwise. It is generally an error to end a scope
//! that hasn't been started, so the method is annotated with `#[must_use]`.
//!
//! There is also a "global" variant of the `insert` method. It inserts the
//! value at the global (bottom) scope, and erases the key from all other
//! scopes.
//! ```
//! # use texmouth_stdext::collections::scopedmap::ScopedMap;
//! let mut cat_colors = ScopedMap::new();
//! cat_colors.insert("paganini", "black");
//! cat_colors.begin_scope();
//! cat_colors.insert_global("paganini", "gray");
//! assert_eq!(cat_colors.end_scope(), true);
//! assert_eq!(cat_colors.get(&"paganini"), Some(&"gray"));
//! ```

use std::collections::HashMap;
use std::hash::Hash;

/// Implementation of the `ScopedMap` data structure. See the module docs for
/// more information.
///
/// The implementation is a stack of hash maps, one per open scope plus one
/// for the global scope at the bottom. Lookups walk the stack from the top;
/// scoped inserts target the top frame; global inserts target the bottom
/// frame and remove the key from every other frame so the global value is
/// visible immediately.
pub struct ScopedMap<K: Eq + Hash + Clone, V> {
    global: HashMap<K, V>,
    frames: Vec<HashMap<K, V>>,
}

impl<K: Eq + Hash + Clone, V> ScopedMap<K, V> {
    /// Returns a new empty `ScopedMap`.
    pub fn new() -> ScopedMap<K, V> {
        ScopedMap {
            global: HashMap::new(),
            frames: Vec::new(),
        }
    }

    /// Inserts the key, value pair in the current scope.
    pub fn insert<A: Into<K>, B: Into<V>>(&mut self, key: A, val: B) {
        let (key, val) = (key.into(), val.into());
        match self.frames.last_mut() {
            None => {
                self.global.insert(key, val);
            }
            Some(frame) => {
                frame.insert(key, val);
            }
        }
    }

    /// Inserts the key, value pair in the global scope.
    pub fn insert_global(&mut self, key: K, val: V) {
        for frame in &mut self.frames {
            frame.remove(&key);
        }
        self.global.insert(key, val);
    }

    /// Retrieves the value at the provided key, looking through enclosing
    /// scopes down to the global scope.
    pub fn get(&self, key: &K) -> Option<&V> {
        for frame in self.frames.iter().rev() {
            if let Some(val) = frame.get(key) {
                return Some(val);
            }
        }
        self.global.get(key)
    }

    /// Begins a new scope.
    pub fn begin_scope(&mut self) {
        // `HashMap::new()` does not allocate until an element is inserted, so
        // scopes with no mutations are cheap.
        self.frames.push(HashMap::new());
    }

    /// Attempts to end the current scope and returns true if there is a scope
    /// to end, and false otherwise.
    #[must_use]
    pub fn end_scope(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    /// Extends the `ScopedMap` with (key, value) pairs.
    pub fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, val) in iter {
            self.insert(key, val);
        }
    }

    /// Number of open scopes, not counting the global scope.
    pub fn num_scopes(&self) -> usize {
        self.frames.len()
    }
}

impl<K: Eq + Hash + Clone, V> std::iter::FromIterator<(K, V)> for ScopedMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> ScopedMap<K, V> {
        let mut map = ScopedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Eq + Hash + Clone, V> Default for ScopedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_after_nested_insert() {
        let mut map = ScopedMap::new();
        map.begin_scope();
        map.insert(3, 5);
        assert_eq!(map.end_scope(), true);
        assert_eq!(map.get(&3), None);
        map.insert(3, 4);
        assert_eq!(map.get(&3), Some(&4));
    }

    #[test]
    fn insert_global_after_no_insert() {
        let mut map = ScopedMap::new();
        map.begin_scope();
        map.insert_global(3, 5);
        assert_eq!(map.end_scope(), true);
        assert_eq!(map.get(&3), Some(&5));
    }

    #[test]
    fn insert_global_shadows_scoped_insert() {
        let mut map = ScopedMap::new();
        map.insert(3, 1);
        map.begin_scope();
        map.insert(3, 2);
        map.insert_global(3, 9);
        assert_eq!(map.get(&3), Some(&9));
        assert_eq!(map.end_scope(), true);
        assert_eq!(map.get(&3), Some(&9));
    }

    #[test]
    fn lookup_walks_enclosing_scopes() {
        let mut map = ScopedMap::new();
        map.insert(1, "global");
        map.begin_scope();
        map.insert(2, "outer");
        map.begin_scope();
        assert_eq!(map.get(&1), Some(&"global"));
        assert_eq!(map.get(&2), Some(&"outer"));
        assert_eq!(map.get(&3), None);
        assert_eq!(map.end_scope(), true);
        assert_eq!(map.end_scope(), true);
    }

    #[test]
    fn end_scope_without_scope() {
        let mut map = ScopedMap::<i32, i32>::new();
        assert_eq!(map.end_scope(), false);
    }
}
