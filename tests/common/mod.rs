#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cursorwork::tree::TraversalHooks;
use cursorwork::{
    CursorError, CursorExt, CursorHandle, RecursiveCursor, RecursiveSequenceCursor,
    SequenceCursor, Value,
};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

/// Compare `actual` with the stored snapshot `name`.
///
/// Set `CURSORWORK_UPDATE_SNAPSHOTS` to rewrite the snapshot instead.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("CURSORWORK_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set CURSORWORK_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path, expected, actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

pub fn ints(items: &[i64]) -> SequenceCursor {
    SequenceCursor::new(items.iter().map(|n| Value::Int(*n)).collect())
}

pub fn int_handle(items: &[i64]) -> CursorHandle {
    CursorHandle::new(ints(items))
}

pub fn tree(json: serde_json::Value) -> RecursiveSequenceCursor {
    RecursiveSequenceCursor::from_value(Value::from(json)).expect("array or object")
}

/// Rewind and render every value as text.
pub fn texts<C: CursorExt + ?Sized>(cursor: &mut C) -> Vec<String> {
    cursor
        .values()
        .expect("values")
        .iter()
        .map(Value::to_string)
        .collect()
}

pub fn as_ints(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .map(|value| value.as_int().expect("integer value"))
        .collect()
}

/// Traversal hooks that record every event.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<String>,
    pub get_children_calls: usize,
    pub has_children_calls: usize,
}

impl TraversalHooks for Recorder {
    fn begin_iteration(&mut self) {
        self.events.push("begin".into());
    }

    fn end_iteration(&mut self) {
        self.events.push("end".into());
    }

    fn begin_children(&mut self, depth: usize) {
        self.events.push(format!("enter {depth}"));
    }

    fn end_children(&mut self, depth: usize) {
        self.events.push(format!("leave {depth}"));
    }

    fn next_element(&mut self, depth: usize) {
        self.events.push(format!("element {depth}"));
    }

    fn call_has_children(&mut self, cursor: &dyn RecursiveCursor) -> bool {
        self.has_children_calls += 1;
        cursor.has_children()
    }

    fn call_get_children(
        &mut self,
        cursor: &mut dyn RecursiveCursor,
    ) -> Result<Box<dyn RecursiveCursor>, CursorError> {
        self.get_children_calls += 1;
        cursor.get_children()
    }
}
