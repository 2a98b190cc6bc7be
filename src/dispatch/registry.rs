use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::cursor::CursorError;
use crate::value::Value;

/// Callable consulted by callback filters: receives the subject (value or
/// key) and decides whether the position is accepted.
pub type Callback = Rc<dyn Fn(&Value) -> Result<bool, CursorError>>;

/// Metadata describing a registered callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackInfo {
    /// Registered name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

struct CallbackEntry {
    callback: Callback,
    description: String,
}

/// Registry of named callbacks.
///
/// Passed explicitly to whoever needs to resolve callbacks by name; there is
/// no process-wide registry.
#[derive(Default)]
pub struct CallbackRegistry {
    entries: HashMap<String, CallbackEntry>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a callback under `name`, replacing any previous entry, and
    /// return a handle to it.
    pub fn register<F>(&mut self, name: &str, description: &str, callback: F) -> Callback
    where
        F: Fn(&Value) -> Result<bool, CursorError> + 'static,
    {
        let callback: Callback = Rc::new(callback);
        self.entries.insert(
            name.to_string(),
            CallbackEntry {
                callback: Rc::clone(&callback),
                description: description.to_string(),
            },
        );
        callback
    }

    /// Retrieve a callback by name.
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.entries.get(name).map(|entry| Rc::clone(&entry.callback))
    }

    /// Retrieve a callback by name, failing as a construction error when the
    /// name is unknown.
    pub fn resolve(&self, name: &str) -> Result<Callback, CursorError> {
        self.get(name).ok_or_else(|| {
            CursorError::construction(
                "CallbackRegistry",
                format!("no callback registered as '{name}'"),
            )
        })
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a callback.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// List all registered callbacks, sorted by name.
    pub fn list(&self) -> Vec<CallbackInfo> {
        let mut infos: Vec<CallbackInfo> = self
            .entries
            .iter()
            .map(|(name, entry)| CallbackInfo {
                name: name.clone(),
                description: entry.description.clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.names())
            .finish()
    }
}
