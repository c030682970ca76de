//! Verse pagination over stored lyrics
//!
//! A verse is a block of text delimited by a blank line (`"\n\n"`). The
//! split is purely textual: no trimming, no normalisation of line endings.

use songlib_common::{Error, Result};

use crate::pagination::Window;

const VERSE_SEPARATOR: &str = "\n\n";

/// Return verses `[count*(page-1), count*page)` joined by a blank line
///
/// The last page may hold fewer than `count` verses. A page that starts
/// past the last verse is `NotFound`.
pub fn paginate(lyrics: &str, page: i64, count: i64) -> Result<String> {
    let window = Window::new(page, count)?;
    let verses: Vec<&str> = lyrics.split(VERSE_SEPARATOR).collect();

    let range = window.range(verses.len()).ok_or_else(|| {
        Error::NotFound(format!(
            "verse page {} out of range ({} verses, {} per page)",
            page,
            verses.len(),
            count
        ))
    })?;

    Ok(verses[range].join(VERSE_SEPARATOR))
}
