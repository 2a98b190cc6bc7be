use tracing::debug;

use crate::cursor::{Cursor, CursorError};
use crate::dispatch::CursorHandle;
use crate::value::{Array, Key, Value};

/// When a [`MultipleCursor`] counts as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Need {
    /// Every attached cursor must be valid.
    #[default]
    All,
    /// At least one attached cursor must be valid.
    Any,
}

/// How the rows of a [`MultipleCursor`] are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKeys {
    /// By attachment position.
    #[default]
    Numeric,
    /// By the info key given at attachment.
    Assoc,
}

/// Join configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultipleFlags {
    /// Validity rule.
    pub need: Need,
    /// Row keying.
    pub keys: RowKeys,
}

impl MultipleFlags {
    /// Choose the validity rule.
    pub fn with_need(mut self, need: Need) -> Self {
        self.need = need;
        self
    }

    /// Choose the row keying.
    pub fn with_keys(mut self, keys: RowKeys) -> Self {
        self.keys = keys;
        self
    }
}

#[derive(Debug, Clone)]
struct Attachment {
    cursor: CursorHandle,
    info: Option<Key>,
}

/// Lock-step join of several cursors.
///
/// `current()` and `key()` return one row per step holding the value (or
/// key) of every attached cursor.
#[derive(Debug, Clone, Default)]
pub struct MultipleCursor {
    attachments: Vec<Attachment>,
    flags: MultipleFlags,
}

impl MultipleCursor {
    /// Create an empty join.
    pub fn new(flags: MultipleFlags) -> Self {
        Self {
            attachments: Vec::new(),
            flags,
        }
    }

    /// Current flags.
    pub fn flags(&self) -> MultipleFlags {
        self.flags
    }

    /// Replace the flags.
    pub fn set_flags(&mut self, flags: MultipleFlags) {
        self.flags = flags;
    }

    /// Attach a cursor, optionally under an info key.
    ///
    /// With associative row keys the info key is required. Info keys must be
    /// unique. Attaching an already attached cursor replaces its info key.
    pub fn attach_iterator(
        &mut self,
        cursor: CursorHandle,
        info: Option<Key>,
    ) -> Result<(), CursorError> {
        if self.flags.keys == RowKeys::Assoc && info.is_none() {
            return Err(CursorError::construction(
                "MultipleCursor",
                "sub-cursor is associated with NULL",
            ));
        }
        if let Some(info) = &info {
            let taken = self.attachments.iter().any(|attachment| {
                !attachment.cursor.ptr_eq(&cursor) && attachment.info.as_ref() == Some(info)
            });
            if taken {
                return Err(CursorError::construction(
                    "MultipleCursor",
                    format!("key duplication: '{info}' is already attached"),
                ));
            }
        }

        match self
            .attachments
            .iter_mut()
            .find(|attachment| attachment.cursor.ptr_eq(&cursor))
        {
            Some(existing) => existing.info = info,
            None => self.attachments.push(Attachment { cursor, info }),
        }
        debug!(attached = self.attachments.len(), "cursor attached");
        Ok(())
    }

    /// Detach a cursor. Returns whether it was attached.
    pub fn detach_iterator(&mut self, cursor: &CursorHandle) -> bool {
        let before = self.attachments.len();
        self.attachments
            .retain(|attachment| !attachment.cursor.ptr_eq(cursor));
        let detached = self.attachments.len() != before;
        if detached {
            debug!(attached = self.attachments.len(), "cursor detached");
        }
        detached
    }

    /// Whether `cursor` is attached.
    pub fn contains_iterator(&self, cursor: &CursorHandle) -> bool {
        self.attachments
            .iter()
            .any(|attachment| attachment.cursor.ptr_eq(cursor))
    }

    /// Number of attached cursors.
    pub fn count_iterators(&self) -> usize {
        self.attachments.len()
    }

    fn row(
        &self,
        operation: &str,
        read: impl Fn(&CursorHandle) -> Result<Value, CursorError>,
    ) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        let mut row = Array::new();
        for (index, attachment) in self.attachments.iter().enumerate() {
            let item = if attachment.cursor.valid() {
                read(&attachment.cursor)?
            } else {
                Value::Null
            };
            let slot = match self.flags.keys {
                RowKeys::Numeric => Key::Int(index as i64),
                RowKeys::Assoc => attachment.info.clone().ok_or_else(|| {
                    CursorError::dispatch(
                        "MultipleCursor",
                        operation,
                        "sub-cursor is associated with NULL",
                    )
                })?,
            };
            row.set(slot, item);
        }
        Ok(Value::Array(row))
    }
}

impl Cursor for MultipleCursor {
    fn rewind(&mut self) -> Result<(), CursorError> {
        for attachment in &mut self.attachments {
            attachment.cursor.rewind()?;
        }
        Ok(())
    }

    fn valid(&self) -> bool {
        if self.attachments.is_empty() {
            return false;
        }
        let mut members = self.attachments.iter().map(|a| a.cursor.valid());
        match self.flags.need {
            Need::All => members.all(|valid| valid),
            Need::Any => members.any(|valid| valid),
        }
    }

    fn current(&self) -> Result<Value, CursorError> {
        self.row("current", |cursor| cursor.current())
    }

    fn key(&self) -> Result<Value, CursorError> {
        self.row("key", |cursor| cursor.key())
    }

    fn next(&mut self) -> Result<(), CursorError> {
        for attachment in &mut self.attachments {
            attachment.cursor.next()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorExt;
    use crate::sequence::SequenceCursor;

    fn handle(items: &[&str]) -> CursorHandle {
        CursorHandle::new(SequenceCursor::new(items.iter().map(|s| Value::from(*s)).collect()))
    }

    fn row(items: &[(Key, Value)]) -> Value {
        Value::Array(items.iter().cloned().collect())
    }

    #[test]
    fn test_need_all_stops_at_shortest() {
        let mut cursor = MultipleCursor::new(MultipleFlags::default());
        cursor.attach_iterator(handle(&["a", "b", "c"]), None).expect("attach");
        cursor.attach_iterator(handle(&["x", "y"]), None).expect("attach");
        let rows = cursor.values().expect("values");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            row(&[(Key::Int(0), Value::from("b")), (Key::Int(1), Value::from("y"))])
        );
    }

    #[test]
    fn test_need_any_fills_with_null() {
        let flags = MultipleFlags::default().with_need(Need::Any);
        let mut cursor = MultipleCursor::new(flags);
        cursor.attach_iterator(handle(&["a", "b"]), None).expect("attach");
        cursor.attach_iterator(handle(&["x"]), None).expect("attach");
        let rows = cursor.values().expect("values");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            row(&[(Key::Int(0), Value::from("b")), (Key::Int(1), Value::Null)])
        );
    }

    #[test]
    fn test_assoc_keys_use_info() {
        let flags = MultipleFlags::default().with_keys(RowKeys::Assoc);
        let mut cursor = MultipleCursor::new(flags);
        cursor
            .attach_iterator(handle(&["a"]), Some(Key::from("left")))
            .expect("attach");
        cursor
            .attach_iterator(handle(&["x"]), Some(Key::from("right")))
            .expect("attach");
        cursor.rewind().expect("rewind");
        assert_eq!(
            cursor.key().expect("key"),
            row(&[(Key::from("left"), Value::Int(0)), (Key::from("right"), Value::Int(0))])
        );
    }

    #[test]
    fn test_assoc_requires_unique_info() {
        let flags = MultipleFlags::default().with_keys(RowKeys::Assoc);
        let mut cursor = MultipleCursor::new(flags);
        assert!(cursor
            .attach_iterator(handle(&["a"]), None)
            .expect_err("missing info")
            .is_construction());
        cursor
            .attach_iterator(handle(&["a"]), Some(Key::Int(1)))
            .expect("attach");
        assert!(cursor
            .attach_iterator(handle(&["b"]), Some(Key::Int(1)))
            .expect_err("duplicate info")
            .is_construction());
        assert_eq!(cursor.count_iterators(), 1);
    }

    #[test]
    fn test_reattach_updates_info() {
        let flags = MultipleFlags::default().with_keys(RowKeys::Assoc);
        let mut cursor = MultipleCursor::new(flags);
        let member = handle(&["a"]);
        cursor
            .attach_iterator(member.clone(), Some(Key::from("old")))
            .expect("attach");
        cursor
            .attach_iterator(member.clone(), Some(Key::from("new")))
            .expect("reattach");
        assert_eq!(cursor.count_iterators(), 1);
        cursor.rewind().expect("rewind");
        assert_eq!(
            cursor.current().expect("current"),
            row(&[(Key::from("new"), Value::from("a"))])
        );
    }

    #[test]
    fn test_detach_and_empty_join() {
        let member = handle(&["a"]);
        let mut cursor = MultipleCursor::new(MultipleFlags::default());
        cursor.attach_iterator(member.clone(), None).expect("attach");
        assert!(cursor.contains_iterator(&member));
        assert!(cursor.detach_iterator(&member));
        assert!(!cursor.detach_iterator(&member));

        cursor.rewind().expect("rewind");
        assert!(!cursor.valid());
        assert_eq!(cursor.current().expect("current"), Value::Null);
    }
}
