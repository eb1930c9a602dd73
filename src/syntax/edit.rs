//! Byte-range edits.
//!
//! Editors report changes sequentially: every change is expressed against
//! the text produced by the previous one. Incremental reparsing needs the
//! opposite view, all edits in pre-edit coordinates at once, so that a
//! byte of the old tree can be checked against every edit and mapped
//! into the new text. [`EditSet::from_sequential`] does that conversion.

use std::cmp::Ordering;

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::error::{Error, Result};

/// Replace the bytes in `range` with `replacement`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: SmolStr,
}

impl TextEdit {
    pub fn replace(range: TextRange, replacement: impl Into<SmolStr>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<SmolStr>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }

    /// The smallest edit turning `old` into `new`, found by trimming the
    /// common prefix and suffix. `None` when the texts are equal.
    pub fn diff(old: &str, new: &str) -> Option<Self> {
        if old == new {
            return None;
        }
        let mut prefix = old
            .bytes()
            .zip(new.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
            prefix -= 1;
        }
        let max_suffix = old.len().min(new.len()) - prefix;
        let mut suffix = old
            .bytes()
            .rev()
            .zip(new.bytes().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix)
        {
            suffix -= 1;
        }

        let range = TextRange::new(
            TextSize::from(prefix as u32),
            TextSize::from((old.len() - suffix) as u32),
        );
        Some(Self::replace(range, &new[prefix..new.len() - suffix]))
    }

    /// Length of the inserted text.
    #[inline]
    pub fn insert_len(&self) -> TextSize {
        TextSize::of(self.replacement.as_str())
    }

    /// How much the edit grows (or, negative, shrinks) the text.
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.insert_len())) - i64::from(u32::from(self.range.len()))
    }

    fn check_fits(&self, text: &str) -> Result<()> {
        let start = usize::from(self.range.start());
        let end = usize::from(self.range.end());
        if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(Error::EditOutOfBounds {
                start: start as u32,
                end: end as u32,
                len: text.len() as u32,
            });
        }
        Ok(())
    }
}

/// Concurrent edits: sorted, non-overlapping, all expressed in the
/// coordinates of the pre-edit text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// An edit set with no edits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an edit set from edits that already share the pre-edit
    /// coordinates. Edits are sorted by position; overlapping ranges are
    /// rejected.
    pub fn concurrent(edits: impl IntoIterator<Item = TextEdit>) -> Result<Self> {
        let mut edits: Vec<TextEdit> = edits.into_iter().collect();
        edits.sort_by_key(|edit| (edit.range.start(), edit.range.end()));
        for pair in edits.windows(2) {
            if pair[0].range.end() > pair[1].range.start() {
                return Err(Error::OverlappingEdits {
                    start: pair[1].range.start().into(),
                    end: pair[0].range.end().into(),
                });
            }
        }
        Ok(Self { edits })
    }

    /// Convert edits that apply one after another, each against the text
    /// left by the previous edit, into one concurrent set.
    ///
    /// Edits that overlap or touch once mapped into pre-edit coordinates
    /// are merged into a single replacement. Applying the result to the
    /// original text yields the same text as applying `edits` in order.
    pub fn from_sequential(edits: impl IntoIterator<Item = TextEdit>) -> Result<Self> {
        let mut set = Self::empty();
        for edit in edits {
            set.compose(edit)?;
        }
        Ok(set)
    }

    /// Fold one more sequential edit (in post-edit coordinates of `self`)
    /// into the set.
    fn compose(&mut self, edit: TextEdit) -> Result<()> {
        let start = i64::from(u32::from(edit.range.start()));
        let end = i64::from(u32::from(edit.range.end()));

        // Shift of the current text relative to the original over edits
        // entirely before the new one, and over every edit visited so far.
        let mut before = 0i64;
        let mut running = 0i64;
        let mut first = None;
        let mut last = self.edits.len();
        for (index, existing) in self.edits.iter().enumerate() {
            let cur_start = i64::from(u32::from(existing.range.start())) + running;
            let cur_end = cur_start + i64::from(u32::from(existing.insert_len()));
            if cur_end < start {
                before += existing.delta();
                running += existing.delta();
                continue;
            }
            if cur_start > end {
                last = index;
                break;
            }
            first.get_or_insert(index);
            running += existing.delta();
        }
        let first = first.unwrap_or(last);
        let delta = before;

        let group = &self.edits[first..last];
        let merged = match (group.first(), group.last()) {
            (Some(head), Some(tail)) => {
                let head_start = i64::from(u32::from(head.range.start())) + delta;
                let group_delta: i64 = group.iter().map(TextEdit::delta).sum();
                let tail_start = i64::from(u32::from(tail.range.start())) + delta + group_delta
                    - tail.delta();
                let tail_end = tail_start + i64::from(u32::from(tail.insert_len()));

                let orig_start = (start - delta).min(i64::from(u32::from(head.range.start())));
                let orig_end =
                    (end - delta - group_delta).max(i64::from(u32::from(tail.range.end())));

                let prefix = slice(&head.replacement, 0, start - head_start)?;
                let suffix = slice(&tail.replacement, end - tail_start, tail_end - tail_start)?;
                let mut replacement = String::with_capacity(
                    prefix.len() + edit.replacement.len() + suffix.len(),
                );
                replacement.push_str(prefix);
                replacement.push_str(&edit.replacement);
                replacement.push_str(suffix);
                TextEdit::replace(range(orig_start, orig_end)?, replacement)
            }
            _ => TextEdit::replace(range(start - delta, end - delta)?, edit.replacement),
        };

        self.edits.splice(first..last, std::iter::once(merged));
        Ok(())
    }

    /// Apply the edits to the pre-edit text.
    pub fn apply(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0usize;
        for edit in &self.edits {
            edit.check_fits(text)?;
            let start = usize::from(edit.range.start());
            out.push_str(&text[cursor..start]);
            out.push_str(&edit.replacement);
            cursor = usize::from(edit.range.end());
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Check that every edit fits inside a pre-edit text of `text`.
    pub fn check_fits(&self, text: &str) -> Result<()> {
        self.edits.iter().try_for_each(|edit| edit.check_fits(text))
    }

    /// Whether any edit touches the closed interval `[range.start, range.end]`.
    ///
    /// An insertion right at either end counts: it can extend a token
    /// that ends or starts there.
    pub fn touches(&self, range: TextRange) -> bool {
        let first = self
            .edits
            .partition_point(|edit| edit.range.end() < range.start());
        self.edits[first..]
            .first()
            .is_some_and(|edit| edit.range.start() <= range.end())
    }

    /// Map a pre-edit offset into the post-edit text.
    ///
    /// Offsets strictly inside a replaced range have no image. An offset
    /// at an insertion point maps to the position before the inserted
    /// text.
    pub fn map_offset(&self, offset: TextSize) -> Option<TextSize> {
        let mut delta = 0i64;
        for edit in &self.edits {
            match offset.cmp(&edit.range.start()) {
                Ordering::Less | Ordering::Equal => break,
                Ordering::Greater if offset >= edit.range.end() => delta += edit.delta(),
                Ordering::Greater => return None,
            }
        }
        let mapped = i64::from(u32::from(offset)) + delta;
        u32::try_from(mapped).ok().map(TextSize::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

fn range(start: i64, end: i64) -> Result<TextRange> {
    let (Ok(start), Ok(end)) = (u32::try_from(start), u32::try_from(end)) else {
        return Err(Error::EditOutOfBounds {
            start: start.max(0) as u32,
            end: end.max(0) as u32,
            len: 0,
        });
    };
    if end < start {
        return Err(Error::InvertedRange { start, end });
    }
    Ok(TextRange::new(start.into(), end.into()))
}

fn slice(text: &str, start: i64, end: i64) -> Result<&str> {
    let start = start.clamp(0, text.len() as i64) as usize;
    let end = end.clamp(start as i64, text.len() as i64) as usize;
    text.get(start..end).ok_or(Error::EditOutOfBounds {
        start: start as u32,
        end: end as u32,
        len: text.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn r(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    fn apply_sequential(text: &str, edits: &[TextEdit]) -> String {
        let mut text = text.to_owned();
        for edit in edits {
            text.replace_range(
                usize::from(edit.range.start())..usize::from(edit.range.end()),
                &edit.replacement,
            );
        }
        text
    }

    #[test]
    fn test_concurrent_sorts_and_applies() {
        let set = EditSet::concurrent([
            TextEdit::replace(r(8, 9), "2"),
            TextEdit::replace(r(4, 5), "y"),
        ])
        .unwrap();
        assert_eq!(set.apply("let x = 1").unwrap(), "let y = 2");
    }

    #[test]
    fn test_concurrent_rejects_overlap() {
        let err = EditSet::concurrent([
            TextEdit::replace(r(0, 4), "a"),
            TextEdit::replace(r(2, 6), "b"),
        ])
        .unwrap_err();
        assert_eq!(err, Error::OverlappingEdits { start: 2, end: 4 });
    }

    #[test]
    fn test_apply_rejects_out_of_bounds() {
        let set = EditSet::concurrent([TextEdit::delete(r(3, 20))]).unwrap();
        assert!(matches!(set.apply("abc"), Err(Error::EditOutOfBounds { .. })));
    }

    #[rstest]
    #[case::disjoint("let x = 1", vec![
        TextEdit::replace(r(8, 9), "2"),
        TextEdit::replace(r(4, 5), "y"),
    ])]
    #[case::insert_then_delete_adjacent("abc", vec![
        TextEdit::insert(1.into(), "X"),
        TextEdit::delete(r(2, 3)),
    ])]
    #[case::edit_inside_previous_insert("abc", vec![
        TextEdit::insert(1.into(), "hello"),
        TextEdit::replace(r(3, 5), "LL"),
    ])]
    #[case::spanning_two_previous_edits("0123456789", vec![
        TextEdit::replace(r(2, 3), "aa"),
        TextEdit::replace(r(7, 8), "bb"),
        TextEdit::replace(r(3, 9), "-"),
    ])]
    #[case::later_edit_before_earlier("0123456789", vec![
        TextEdit::replace(r(6, 8), "xyz"),
        TextEdit::insert(1.into(), "++"),
    ])]
    #[case::typing_sequence("func f() {}", vec![
        TextEdit::insert(10.into(), "r"),
        TextEdit::insert(11.into(), "e"),
        TextEdit::insert(12.into(), "t"),
        TextEdit::delete(r(12, 13)),
    ])]
    fn test_from_sequential_matches_sequential_application(
        #[case] text: &str,
        #[case] edits: Vec<TextEdit>,
    ) {
        let expected = apply_sequential(text, &edits);
        let set = EditSet::from_sequential(edits).unwrap();
        assert_eq!(set.apply(text).unwrap(), expected);
        for pair in set.edits.windows(2) {
            assert!(pair[0].range.end() < pair[1].range.start(), "{set:?}");
        }
    }

    #[test]
    fn test_from_sequential_merges_typing_into_one_insert() {
        let set = EditSet::from_sequential([
            TextEdit::insert(10.into(), "r"),
            TextEdit::insert(11.into(), "e"),
        ])
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some(&TextEdit::insert(10.into(), "re")));
    }

    #[test]
    fn test_touches_is_inclusive() {
        let set = EditSet::concurrent([TextEdit::insert(9.into(), "x")]).unwrap();
        assert!(set.touches(r(8, 9)));
        assert!(set.touches(r(9, 10)));
        assert!(!set.touches(r(5, 8)));
        assert!(!set.touches(r(10, 11)));
    }

    #[test]
    fn test_map_offset() {
        let set = EditSet::concurrent([
            TextEdit::replace(r(2, 4), "abcd"),
            TextEdit::delete(r(6, 8)),
        ])
        .unwrap();
        assert_eq!(set.map_offset(1.into()), Some(1.into()));
        assert_eq!(set.map_offset(2.into()), Some(2.into()));
        assert_eq!(set.map_offset(3.into()), None);
        assert_eq!(set.map_offset(4.into()), Some(6.into()));
        assert_eq!(set.map_offset(9.into()), Some(9.into()));
    }

    #[rstest]
    #[case("let x = 1", "let x = 2", Some(TextEdit::replace(r(8, 9), "2")))]
    #[case("func f() {}", "func f() {x}", Some(TextEdit::insert(10.into(), "x")))]
    #[case("aaa", "aa", Some(TextEdit::delete(r(2, 3))))]
    #[case("é", "è", Some(TextEdit::replace(r(0, 2), "è")))]
    #[case("same", "same", None)]
    fn test_diff(#[case] old: &str, #[case] new: &str, #[case] expected: Option<TextEdit>) {
        let edit = TextEdit::diff(old, new);
        assert_eq!(edit, expected);
        if let Some(edit) = edit {
            let set = EditSet::concurrent([edit]).unwrap();
            assert_eq!(set.apply(old).unwrap(), new);
        }
    }
}
