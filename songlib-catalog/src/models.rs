//! Input shapes for catalog operations
//!
//! Partial updates carry an explicit [`FieldChange`] per field, so "leave
//! unchanged" and "clear" are distinct states instead of both being an
//! empty string.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use songlib_common::{Error, Result};

/// Requested change for one song field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldChange<T> {
    /// Leave the stored value untouched
    #[default]
    Keep,
    /// Store this value
    Set(T),
    /// Store NULL
    Clear,
}

impl<T> FieldChange<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldChange::Keep)
    }

    /// Value being set, if any
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldChange::Set(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(v)` becomes `Set(v)`, `None` becomes `Clear`
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldChange::Set(v),
            None => FieldChange::Clear,
        }
    }

    /// Convert the carried value, keeping Keep/Clear as they are
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<FieldChange<U>> {
        Ok(match self {
            FieldChange::Keep => FieldChange::Keep,
            FieldChange::Clear => FieldChange::Clear,
            FieldChange::Set(v) => FieldChange::Set(f(v)?),
        })
    }
}

/// JSON `null` means Clear, a value means Set.
///
/// Absent fields never reach this impl; use `#[serde(default)]` so they
/// become `Keep`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldChange<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(FieldChange::from_option)
    }
}

/// Song to insert, keyed by (title, group)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSong {
    pub title: String,
    pub group: String,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl NewSong {
    pub fn new(title: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_name("title", &self.title)?;
        require_name("group", &self.group)?;
        if let Some(link) = &self.link {
            validate_link(link)?;
        }
        Ok(())
    }
}

/// Partial update of a song
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongPatch {
    pub title: FieldChange<String>,
    pub group: FieldChange<String>,
    pub lyrics: FieldChange<String>,
    pub link: FieldChange<String>,
    pub release_date: FieldChange<NaiveDate>,
}

impl SongPatch {
    /// Full replacement: every field is written, missing optionals are cleared
    pub fn replace_with(song: NewSong) -> Self {
        Self {
            title: FieldChange::Set(song.title),
            group: FieldChange::Set(song.group),
            lyrics: FieldChange::from_option(song.lyrics),
            link: FieldChange::from_option(song.link),
            release_date: FieldChange::from_option(song.release_date),
        }
    }

    /// No field and no group change requested
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.group.is_keep()
            && self.lyrics.is_keep()
            && self.link.is_keep()
            && self.release_date.is_keep()
    }

    pub fn validate(&self) -> Result<()> {
        match &self.title {
            FieldChange::Set(title) => require_name("title", title)?,
            FieldChange::Clear => {
                return Err(Error::InvalidInput("title cannot be cleared".to_string()))
            }
            FieldChange::Keep => {}
        }
        match &self.group {
            FieldChange::Set(group) => require_name("group", group)?,
            FieldChange::Clear => {
                return Err(Error::InvalidInput("group cannot be cleared".to_string()))
            }
            FieldChange::Keep => {}
        }
        if let FieldChange::Set(link) = &self.link {
            validate_link(link)?;
        }
        Ok(())
    }
}

/// Optional equality filters for song listings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub title: Option<String>,
    pub group: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<NaiveDate>,
}

fn require_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Link must be an absolute URL with a host
pub fn validate_link(link: &str) -> Result<()> {
    let url = reqwest::Url::parse(link)
        .map_err(|e| Error::InvalidInput(format!("invalid link '{}': {}", link, e)))?;
    if !url.has_host() {
        return Err(Error::InvalidInput(format!("invalid link '{}': no host", link)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        lyrics: FieldChange<String>,
    }

    #[test]
    fn test_field_change_from_json() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.lyrics, FieldChange::Keep);

        let null: Body = serde_json::from_str(r#"{"lyrics": null}"#).unwrap();
        assert_eq!(null.lyrics, FieldChange::Clear);

        let empty: Body = serde_json::from_str(r#"{"lyrics": ""}"#).unwrap();
        assert_eq!(empty.lyrics, FieldChange::Set(String::new()));
    }

    #[test]
    fn test_empty_patch() {
        assert!(SongPatch::default().is_empty());

        let patch = SongPatch {
            group: FieldChange::Set("Muse".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_replace_clears_missing_optionals() {
        let patch = SongPatch::replace_with(NewSong::new("Uprising", "Muse"));
        assert_eq!(patch.title, FieldChange::Set("Uprising".to_string()));
        assert_eq!(patch.lyrics, FieldChange::Clear);
        assert_eq!(patch.release_date, FieldChange::Clear);
    }

    #[test]
    fn test_patch_cannot_clear_title() {
        let patch = SongPatch {
            title: FieldChange::Clear,
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_new_song_validation() {
        assert!(NewSong::new("Uprising", "Muse").validate().is_ok());
        assert!(NewSong::new("  ", "Muse").validate().is_err());
        assert!(NewSong::new("Uprising", "").validate().is_err());

        let mut song = NewSong::new("Uprising", "Muse");
        song.link = Some("not a url".to_string());
        assert!(song.validate().is_err());

        song.link = Some("https://www.youtube.com/watch?v=w4B0sO-WA0E".to_string());
        assert!(song.validate().is_ok());
    }
}
