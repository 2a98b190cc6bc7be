use std::fmt;

use tracing::debug;

use crate::cursor::{Cursor, CursorError, Lookahead, RecursiveCursor};
use crate::value::{Array, Key, Value};

/// Which part of the cached element `text()` renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringSource {
    /// Render the cached value.
    #[default]
    Current,
    /// Render the cached key.
    Key,
    /// String conversion is disabled.
    None,
}

/// Caching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachingMode {
    /// Source for `text()`.
    pub string_source: StringSource,
    /// Keep every visited element, keyed by its key.
    pub full_cache: bool,
    /// Swallow `getChildren` failures while caching children.
    pub catch_child_errors: bool,
}

impl CachingMode {
    /// Choose the string source.
    pub fn with_string_source(mut self, source: StringSource) -> Self {
        self.string_source = source;
        self
    }

    /// Enable or disable the full cache.
    pub fn with_full_cache(mut self, enabled: bool) -> Self {
        self.full_cache = enabled;
        self
    }

    /// Swallow child retrieval failures.
    pub fn with_catch_child_errors(mut self, enabled: bool) -> Self {
        self.catch_child_errors = enabled;
        self
    }
}

/// Snapshot of the element the caching cursor is positioned on.
pub(crate) struct CacheEntry {
    pub(crate) key: Value,
    pub(crate) value: Value,
    pub(crate) text: Option<String>,
    pub(crate) has_children: bool,
    pub(crate) children: Option<Box<dyn RecursiveCursor>>,
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("text", &self.text)
            .field("has_children", &self.has_children)
            .field("children", &self.children.as_ref().map(|c| c.type_name()))
            .finish()
    }
}

/// Cursor that stays one element ahead of its inner cursor.
///
/// Each step copies the inner element into the cache and then advances the
/// inner cursor, so `has_next()` is simply whether the inner cursor is still
/// valid. With `full_cache` every visited element is also kept.
#[derive(Debug)]
pub struct CachingCursor<C> {
    inner: C,
    mode: CachingMode,
    entry: Option<CacheEntry>,
    cache: Array,
    capture_children: bool,
}

impl<C: Cursor> CachingCursor<C> {
    /// Wrap `inner`.
    pub fn new(inner: C, mode: CachingMode) -> Self {
        Self {
            inner,
            mode,
            entry: None,
            cache: Array::new(),
            capture_children: false,
        }
    }

    /// Variant that also fetches and holds the children of every element.
    pub(crate) fn capturing_children(inner: C, mode: CachingMode) -> Self {
        Self {
            capture_children: true,
            ..Self::new(inner, mode)
        }
    }

    /// Configuration.
    pub fn mode(&self) -> CachingMode {
        self.mode
    }

    /// Wrapped cursor; it is positioned one element ahead.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Consume the decorator and return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// String form of the cached element per the configured source.
    pub fn text(&self) -> Result<String, CursorError> {
        if self.mode.string_source == StringSource::None {
            return Err(self.disabled("__toString", "string conversion is not enabled"));
        }
        Ok(self
            .entry
            .as_ref()
            .and_then(|entry| entry.text.clone())
            .unwrap_or_default())
    }

    /// Every element visited since the last rewind.
    pub fn get_cache(&self) -> Result<&Array, CursorError> {
        self.require_full_cache("getCache")?;
        Ok(&self.cache)
    }

    /// Cached value under `key`.
    pub fn cached(&self, key: &Key) -> Result<Option<&Value>, CursorError> {
        self.require_full_cache("offsetGet")?;
        Ok(self.cache.get(key))
    }

    /// Overwrite or add a cached value.
    pub fn set_cached(&mut self, key: Key, value: Value) -> Result<(), CursorError> {
        self.require_full_cache("offsetSet")?;
        self.cache.set(key, value);
        Ok(())
    }

    /// Drop a cached value.
    pub fn unset_cached(&mut self, key: &Key) -> Result<Option<Value>, CursorError> {
        self.require_full_cache("offsetUnset")?;
        Ok(self.cache.unset(key))
    }

    /// Number of cached elements.
    pub fn cache_len(&self) -> Result<usize, CursorError> {
        self.require_full_cache("count")?;
        Ok(self.cache.len())
    }

    pub(crate) fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub(crate) fn entry_mut(&mut self) -> Option<&mut CacheEntry> {
        self.entry.as_mut()
    }

    fn disabled(&self, operation: &str, reason: &str) -> CursorError {
        CursorError::dispatch(self.type_name(), operation, reason)
    }

    fn require_full_cache(&self, operation: &str) -> Result<(), CursorError> {
        if self.mode.full_cache {
            Ok(())
        } else {
            Err(self.disabled(operation, "full cache is not enabled"))
        }
    }

    fn fetch(&mut self) -> Result<(), CursorError> {
        if !self.inner.valid() {
            self.entry = None;
            return Ok(());
        }
        let key = self.inner.key()?;
        let value = self.inner.current()?;
        let text = match self.mode.string_source {
            StringSource::Current => Some(value.to_string()),
            StringSource::Key => Some(key.to_string()),
            StringSource::None => None,
        };

        let mut has_children = false;
        let mut children = None;
        if self.capture_children {
            if let Some(recursive) = self.inner.as_recursive_mut() {
                has_children = recursive.has_children();
                if has_children {
                    match recursive.get_children() {
                        Ok(child) => children = Some(child),
                        Err(e) if self.mode.catch_child_errors && !e.is_abstract() => {
                            debug!(error = %e, "caching cursor dropped children");
                            has_children = false;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        if self.mode.full_cache {
            if let Some(slot) = Key::from_value(&key) {
                self.cache.set(slot, value.clone());
            }
        }
        self.entry = Some(CacheEntry {
            key,
            value,
            text,
            has_children,
            children,
        });
        self.inner.next()
    }
}

impl<C: Cursor> Cursor for CachingCursor<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.inner.rewind()?;
        self.cache = Array::new();
        self.fetch()
    }

    fn valid(&self) -> bool {
        self.entry.is_some()
    }

    fn current(&self) -> Result<Value, CursorError> {
        Ok(self
            .entry
            .as_ref()
            .map(|entry| entry.value.clone())
            .unwrap_or_default())
    }

    fn key(&self) -> Result<Value, CursorError> {
        Ok(self
            .entry
            .as_ref()
            .map(|entry| entry.key.clone())
            .unwrap_or_default())
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.fetch()
    }

    fn as_lookahead(&self) -> Option<&dyn Lookahead> {
        Some(self)
    }
}

impl<C: Cursor> Lookahead for CachingCursor<C> {
    fn has_next(&self) -> bool {
        self.inner.valid()
    }
}
