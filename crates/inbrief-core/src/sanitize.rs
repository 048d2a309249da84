//! Removal of link-like formatting spans from message text.
//!
//! Spans are addressed in UTF-16 code units, so the text is re-encoded to
//! UTF-16, cut, and decoded back. Spans are applied from the highest offset
//! down: cutting a span only shifts the units after it, and those have already
//! been handled.

use std::ops::Range;

use inbrief_types::text::{FormattedText, TextEntity};
use tracing::trace;

/// Return `text` with every stripped-kind entity span removed.
///
/// Spans that do not fit inside the text (negative offset or length, start at
/// or past the end, end past the end) are skipped. Entities of other kinds
/// leave their text untouched.
pub fn sanitize(text: &FormattedText) -> String {
    let mut entities: Vec<&TextEntity> = text
        .entities
        .iter()
        .filter(|entity| entity.kind.is_stripped())
        .collect();
    entities.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut units: Vec<u16> = text.text.encode_utf16().collect();

    for entity in entities {
        match span(entity, units.len()) {
            Some(range) => {
                units.drain(range);
            }
            None => {
                trace!(
                    kind = ?entity.kind,
                    offset = entity.offset,
                    length = entity.length,
                    len = units.len(),
                    "skipping out-of-range entity"
                );
            }
        }
    }

    String::from_utf16_lossy(&units)
}

/// The code-unit range covered by `entity`, if it lies inside `len` units.
fn span(entity: &TextEntity, len: usize) -> Option<Range<usize>> {
    let offset = usize::try_from(entity.offset).ok()?;
    let length = usize::try_from(entity.length).ok()?;
    let end = offset.checked_add(length)?;
    (offset < len && end <= len).then_some(offset..end)
}
