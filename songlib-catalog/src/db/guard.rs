//! Natural-key duplicate guard
//!
//! (title, group name) spans the songs and groups tables through the link
//! table, so no single-table UNIQUE constraint covers it. The check runs
//! inside the caller's write transaction, before any song row is written.

use sqlx::SqliteConnection;

/// True when a song other than `exclude` is stored under (title, group)
pub async fn natural_key_taken(
    conn: &mut SqliteConnection,
    title: &str,
    group: &str,
    exclude: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM songs s
            JOIN song_groups sg ON sg.song_id = s.id
            JOIN groups g ON g.id = sg.group_id
            WHERE s.title = ?1 AND g.name = ?2 AND (?3 IS NULL OR s.id <> ?3)
        )
        "#,
    )
    .bind(title)
    .bind(group)
    .bind(exclude)
    .fetch_one(&mut *conn)
    .await?;

    if taken {
        tracing::debug!(title = %title, group = %group, exclude = ?exclude, "Natural key already taken");
    }

    Ok(taken)
}
