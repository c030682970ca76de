//! Dynamic SQL assembly for song listings and partial updates
//!
//! Both builders emit numbered SQLite parameters (`?1`, `?2`, ...) and keep
//! a fixed column order, so the same set of inputs always produces the same
//! SQL text.

use chrono::NaiveDate;

use crate::models::{FieldChange, FilterCriteria, SongPatch};
use crate::pagination::Window;

/// Columns selected for a song joined with its group
pub const SONG_COLUMNS: &str =
    "s.id, s.title, s.lyrics, s.link, s.release_date, g.id AS group_id, g.name AS group_name";

/// Bound parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryArg {
    Text(String),
    Date(NaiveDate),
    Int(i64),
    Null,
}

/// SQL text plus the values for its numbered parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<QueryArg>,
}

impl BuiltQuery {
    /// Append a bound argument and return its placeholder (`?n`)
    fn push_arg(&mut self, arg: QueryArg) -> String {
        self.args.push(arg);
        format!("?{}", self.args.len())
    }
}

/// Build the filtered, paginated listing query
///
/// Predicates are attempted in the order title, lyrics, link, group name,
/// release date. Unset filters are skipped, never reordered.
pub fn build_list_query(criteria: &FilterCriteria, window: &Window) -> BuiltQuery {
    let mut query = BuiltQuery {
        sql: format!(
            "SELECT {} FROM songs s \
             LEFT JOIN song_groups sg ON sg.song_id = s.id \
             LEFT JOIN groups g ON g.id = sg.group_id",
            SONG_COLUMNS
        ),
        args: Vec::new(),
    };

    let filters: [(&str, Option<QueryArg>); 5] = [
        ("s.title", criteria.title.clone().map(QueryArg::Text)),
        ("s.lyrics", criteria.lyrics.clone().map(QueryArg::Text)),
        ("s.link", criteria.link.clone().map(QueryArg::Text)),
        ("g.name", criteria.group.clone().map(QueryArg::Text)),
        ("s.release_date", criteria.release_date.map(QueryArg::Date)),
    ];

    let mut has_where = false;
    for (column, value) in filters {
        let Some(value) = value else { continue };
        let placeholder = query.push_arg(value);
        let keyword = if has_where { "AND" } else { "WHERE" };
        query
            .sql
            .push_str(&format!(" {} {} = {}", keyword, column, placeholder));
        has_where = true;
    }

    query.sql.push_str(&format!(
        " ORDER BY s.id LIMIT {} OFFSET {}",
        window.size,
        window.offset()
    ));
    query
}

/// Build `UPDATE songs SET ... WHERE id = ?n` for the song columns in `patch`
///
/// Returns `None` when no song column changes (group-only or empty patch).
pub fn build_update_query(id: i64, patch: &SongPatch) -> Option<BuiltQuery> {
    let mut query = BuiltQuery {
        sql: String::from("UPDATE songs SET "),
        args: Vec::new(),
    };
    let mut assignments = Vec::new();

    let changes = [
        ("title", text_change(&patch.title)),
        ("lyrics", text_change(&patch.lyrics)),
        ("link", text_change(&patch.link)),
        (
            "release_date",
            match &patch.release_date {
                FieldChange::Set(d) => FieldChange::Set(QueryArg::Date(*d)),
                FieldChange::Clear => FieldChange::Clear,
                FieldChange::Keep => FieldChange::Keep,
            },
        ),
    ];

    for (column, change) in changes {
        match change {
            FieldChange::Keep => {}
            FieldChange::Set(arg) => {
                let placeholder = query.push_arg(arg);
                assignments.push(format!("{} = {}", column, placeholder));
            }
            FieldChange::Clear => {
                let placeholder = query.push_arg(QueryArg::Null);
                assignments.push(format!("{} = {}", column, placeholder));
            }
        }
    }

    if assignments.is_empty() {
        return None;
    }

    let id_placeholder = query.push_arg(QueryArg::Int(id));
    query.sql.push_str(&assignments.join(", "));
    query.sql.push_str(&format!(" WHERE id = {}", id_placeholder));
    Some(query)
}

fn text_change(change: &FieldChange<String>) -> FieldChange<QueryArg> {
    match change {
        FieldChange::Set(v) => FieldChange::Set(QueryArg::Text(v.clone())),
        FieldChange::Clear => FieldChange::Clear,
        FieldChange::Keep => FieldChange::Keep,
    }
}
