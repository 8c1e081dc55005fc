//! Path and pattern segmentation.
//!
//! Both route patterns and request paths go through [`split_segments`], so the
//! trie is always built and searched with the same notion of a segment:
//!
//! - the input is split on `/` and empty pieces are dropped, which makes
//!   `/a//b/` and `a/b` equivalent;
//! - collection stops right after the first segment starting with `*`, since a
//!   wildcard absorbs everything that follows it.
//!
//! An input made only of slashes (or the empty string) yields no segments and
//! therefore addresses the root of the trie.

use smallvec::SmallVec;

/// Number of segments kept inline before spilling to the heap.
/// Most REST paths are well under eight segments deep.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Borrowed segments of a path or pattern, stack-allocated for short paths.
pub type SegmentVec<'a> = SmallVec<[&'a str; MAX_INLINE_SEGMENTS]>;

/// Shape of a single pattern segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind<'a> {
    /// Matches only identical text.
    Literal(&'a str),
    /// `:name` - matches exactly one path segment and binds it to `name`.
    Param(&'a str),
    /// `*name` - matches the rest of the path. A bare `*` binds nothing.
    Wildcard(Option<&'a str>),
}

impl<'a> SegmentKind<'a> {
    /// Classify a non-empty segment by its leading character.
    #[must_use]
    pub fn of(segment: &'a str) -> Self {
        if let Some(name) = segment.strip_prefix(':') {
            SegmentKind::Param(name)
        } else if let Some(name) = segment.strip_prefix('*') {
            SegmentKind::Wildcard((!name.is_empty()).then_some(name))
        } else {
            SegmentKind::Literal(segment)
        }
    }

    /// `true` for parameter and wildcard segments.
    #[inline]
    #[must_use]
    pub fn is_wild(&self) -> bool {
        !matches!(self, SegmentKind::Literal(_))
    }
}

/// Whether a segment occupies a trie node's wild slot (`:name` or `*name`).
#[inline]
#[must_use]
pub fn is_wild(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*')
}

/// Whether a segment is a wildcard (`*` or `*name`).
#[inline]
#[must_use]
pub fn is_catch_all(segment: &str) -> bool {
    segment.starts_with('*')
}

/// Split a path or pattern into its non-empty segments.
///
/// Stops after the first wildcard segment; anything behind it is ignored.
///
/// ```
/// use trierouter::router::split_segments;
///
/// assert_eq!(split_segments("/a//b/").as_slice(), ["a", "b"]);
/// assert_eq!(split_segments("/files/*path/ignored").as_slice(), ["files", "*path"]);
/// assert!(split_segments("/").is_empty());
/// ```
#[must_use]
pub fn split_segments(input: &str) -> SegmentVec<'_> {
    let mut segments = SegmentVec::new();
    for segment in input.split('/').filter(|s| !s.is_empty()) {
        segments.push(segment);
        if is_catch_all(segment) {
            break;
        }
    }
    segments
}

/// Rejoin the raw path from the `skip`-th non-empty segment onwards.
///
/// Unlike [`split_segments`] this never stops at a `*`, so a wildcard binding
/// captures the full remainder of the request path.
#[must_use]
pub fn remainder_from(path: &str, skip: usize) -> String {
    let mut rest = path.split('/').filter(|s| !s.is_empty()).skip(skip);
    let mut out = String::with_capacity(path.len());
    if let Some(first) = rest.next() {
        out.push_str(first);
        for segment in rest {
            out.push('/');
            out.push_str(segment);
        }
    }
    out
}
