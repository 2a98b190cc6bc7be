use super::{TraversalMode, TraversalOptions, TreeCursor};
use crate::cursor::{Cursor, CursorError, RecursiveCursor};
use crate::decorators::CachingMode;
use crate::dispatch;
use crate::recursive::RecursiveCachingCursor;
use crate::value::Value;

/// Glyph slots of the drawn prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixPart {
    /// Leading text of every line.
    Left,
    /// Ancestor level that has more elements below.
    MidHasNext,
    /// Ancestor level that is finished.
    MidLast,
    /// Current element with siblings after it.
    EndHasNext,
    /// Last element of its level.
    EndLast,
    /// Text between the glyphs and the entry.
    Right,
}

impl PrefixPart {
    fn slot(self) -> usize {
        match self {
            PrefixPart::Left => 0,
            PrefixPart::MidHasNext => 1,
            PrefixPart::MidLast => 2,
            PrefixPart::EndHasNext => 3,
            PrefixPart::EndLast => 4,
            PrefixPart::Right => 5,
        }
    }
}

/// Which reads are left undecorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawFlags {
    /// `key()` returns the plain key.
    pub bypass_key: bool,
    /// `current()` returns the plain value.
    pub bypass_current: bool,
}

impl Default for DrawFlags {
    fn default() -> Self {
        Self {
            bypass_key: true,
            bypass_current: false,
        }
    }
}

impl DrawFlags {
    /// Leave keys undecorated.
    pub fn with_bypass_key(mut self, bypass: bool) -> Self {
        self.bypass_key = bypass;
        self
    }

    /// Leave values undecorated.
    pub fn with_bypass_current(mut self, bypass: bool) -> Self {
        self.bypass_current = bypass;
        self
    }
}

/// Tree flattener that renders each element as a line of an ASCII tree.
///
/// ```text
/// |-1
/// |-Array
/// | |-2
/// | \-3
/// \-4
/// ```
///
/// Every level is wrapped in a caching decorator so the drawing can ask each
/// open level whether more elements follow.
#[derive(Debug)]
pub struct TreeDrawing {
    tree: TreeCursor,
    prefix: [String; 6],
    postfix: String,
    flags: DrawFlags,
}

impl TreeDrawing {
    /// Draw `root` with default flags, branches before their children.
    pub fn new(root: impl RecursiveCursor + 'static) -> Self {
        Self::with_options(
            root,
            DrawFlags::default(),
            TraversalOptions::new(TraversalMode::SelfFirst),
        )
    }

    /// Draw `root` with explicit flags and traversal options.
    pub fn with_options(
        root: impl RecursiveCursor + 'static,
        flags: DrawFlags,
        options: TraversalOptions,
    ) -> Self {
        let mode = CachingMode::default().with_catch_child_errors(true);
        let cached = RecursiveCachingCursor::caching(root, mode);
        Self {
            tree: TreeCursor::with_options(cached, options),
            prefix: [
                String::new(),
                "| ".to_string(),
                "  ".to_string(),
                "|-".to_string(),
                "\\-".to_string(),
                String::new(),
            ],
            postfix: String::new(),
            flags,
        }
    }

    /// Underlying flattener.
    pub fn tree(&self) -> &TreeCursor {
        &self.tree
    }

    /// Mutable access to the underlying flattener, e.g. to set a depth limit.
    pub fn tree_mut(&mut self) -> &mut TreeCursor {
        &mut self.tree
    }

    /// Current flags.
    pub fn flags(&self) -> DrawFlags {
        self.flags
    }

    /// Replace the flags.
    pub fn set_flags(&mut self, flags: DrawFlags) {
        self.flags = flags;
    }

    /// Replace one glyph slot.
    pub fn set_prefix_part(&mut self, part: PrefixPart, value: impl Into<String>) {
        self.prefix[part.slot()] = value.into();
    }

    /// Text appended after every entry.
    pub fn set_postfix(&mut self, postfix: impl Into<String>) {
        self.postfix = postfix.into();
    }

    /// Text appended after every entry.
    pub fn get_postfix(&self) -> &str {
        &self.postfix
    }

    /// Glyphs for the current element.
    pub fn get_prefix(&self) -> Result<String, CursorError> {
        let depth = self.tree.get_depth();
        let mut prefix = self.prefix[PrefixPart::Left.slot()].clone();
        for level in 0..=depth {
            let has_next = match self.tree.get_sub_iterator(level) {
                Some(cursor) => dispatch::has_next(cursor)?,
                None => false,
            };
            let part = match (level == depth, has_next) {
                (false, true) => PrefixPart::MidHasNext,
                (false, false) => PrefixPart::MidLast,
                (true, true) => PrefixPart::EndHasNext,
                (true, false) => PrefixPart::EndLast,
            };
            prefix.push_str(&self.prefix[part.slot()]);
        }
        prefix.push_str(&self.prefix[PrefixPart::Right.slot()]);
        Ok(prefix)
    }

    /// Current element as text, without prefix or postfix.
    pub fn get_entry(&self) -> Result<String, CursorError> {
        Ok(self.tree.current()?.to_string())
    }

    fn decorate(&self, text: &str) -> Result<Value, CursorError> {
        Ok(Value::from(format!("{}{}{}", self.get_prefix()?, text, self.postfix)))
    }
}

impl Cursor for TreeDrawing {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.tree.rewind()
    }

    fn valid(&self) -> bool {
        self.tree.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        if self.flags.bypass_current || !self.valid() {
            return self.tree.current();
        }
        self.decorate(&self.get_entry()?)
    }

    fn key(&self) -> Result<Value, CursorError> {
        let key = self.tree.key()?;
        if self.flags.bypass_key || !self.valid() {
            return Ok(key);
        }
        self.decorate(&key.to_string())
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.tree.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorExt;
    use crate::sequence::RecursiveSequenceCursor;
    use serde_json::json;

    fn drawing(json: serde_json::Value) -> TreeDrawing {
        TreeDrawing::new(RecursiveSequenceCursor::from_value(Value::from(json)).expect("container"))
    }

    fn lines(cursor: &mut TreeDrawing) -> Vec<String> {
        cursor
            .values()
            .expect("values")
            .iter()
            .map(Value::to_string)
            .collect()
    }

    #[test]
    fn test_draws_nested_array() {
        let mut cursor = drawing(json!([1, [2, 3], 4]));
        assert_eq!(lines(&mut cursor), ["|-1", "|-Array", "| |-2", "| \\-3", "\\-4"]);
    }

    #[test]
    fn test_finished_ancestor_uses_blank_glyph() {
        let mut cursor = drawing(json!([1, [2, 3]]));
        assert_eq!(lines(&mut cursor), ["|-1", "\\-Array", "  |-2", "  \\-3"]);
    }

    #[test]
    fn test_custom_parts_and_postfix() {
        let mut cursor = drawing(json!(["a", "b"]));
        cursor.set_prefix_part(PrefixPart::Left, "[");
        cursor.set_prefix_part(PrefixPart::EndLast, "`-");
        cursor.set_prefix_part(PrefixPart::Right, "]");
        cursor.set_postfix(";");
        assert_eq!(cursor.get_postfix(), ";");
        assert_eq!(lines(&mut cursor), ["[|-]a;", "[`-]b;"]);
    }

    #[test]
    fn test_key_decoration_is_opt_in() {
        let mut cursor = drawing(json!(["a"]));
        cursor.rewind().expect("rewind");
        assert_eq!(cursor.key().expect("key"), Value::Int(0));
        assert_eq!(cursor.get_entry().expect("entry"), "a");

        cursor.set_flags(DrawFlags::default().with_bypass_key(false).with_bypass_current(true));
        assert_eq!(cursor.key().expect("key"), Value::from("\\-0"));
        assert_eq!(cursor.current().expect("current"), Value::from("a"));
    }
}
