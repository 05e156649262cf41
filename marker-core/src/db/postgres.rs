//! The production `LibraryAdapter`: typed queries and writes against the
//! library database over `sqlx`. Every write method opens exactly one
//! `pool.begin()` and commits exactly once, mirroring
//! `ferrex-core::database::infrastructure::postgres::repositories::watch_status::PostgresWatchStatusRepository`.
//! Queries are issued with `sqlx::query_as` against hand-written SQL rather
//! than the `sqlx::query!` compile-time macro, since this adapter targets a
//! schema owned by another application (no local `DATABASE_URL` to check
//! queries against at build time) — the same runtime-checked style
//! `ferrex-core::database::repositories::query::PostgresQueryRepository`
//! falls back to for its dynamically constructed queries.

use std::collections::HashMap;

use async_trait::async_trait;
use marker_contracts::error::{PortError, Result};
use marker_contracts::library_port::{IndexUpdate, LibraryAdapter, MarkerUpdate, NewMarker, ShiftUpdate};
use marker_model::{Marker, MarkerId, MarkerType, MediaItem, MediaItemId, MediaItemType, Section, SectionId};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PostgresLibraryAdapter {
    pool: PgPool,
}

fn backend_err(context: &str, err: sqlx::Error) -> PortError {
    PortError::Backend(format!("{context}: {err}"))
}

fn marker_type_to_str(t: MarkerType) -> &'static str {
    t.as_str()
}

fn marker_type_from_str(s: &str) -> Result<MarkerType> {
    MarkerType::parse(s).ok_or_else(|| PortError::Backend(format!("unknown marker type '{s}' in library db")))
}

fn item_type_from_str(s: &str) -> Result<MediaItemType> {
    match s {
        "show" => Ok(MediaItemType::Show),
        "season" => Ok(MediaItemType::Season),
        "episode" => Ok(MediaItemType::Episode),
        "movie" => Ok(MediaItemType::Movie),
        "artist" => Ok(MediaItemType::Artist),
        "album" => Ok(MediaItemType::Album),
        "track" => Ok(MediaItemType::Track),
        other => Err(PortError::Backend(format!("unknown item type '{other}' in library db"))),
    }
}

fn item_type_to_str(t: MediaItemType) -> &'static str {
    match t {
        MediaItemType::Show => "show",
        MediaItemType::Season => "season",
        MediaItemType::Episode => "episode",
        MediaItemType::Movie => "movie",
        MediaItemType::Artist => "artist",
        MediaItemType::Album => "album",
        MediaItemType::Track => "track",
    }
}

fn row_to_marker(row: &sqlx::postgres::PgRow) -> Result<Marker> {
    Ok(Marker {
        id: MarkerId(row.try_get("id").map_err(|e| backend_err("marker id", e))?),
        parent_id: MediaItemId(row.try_get("parent_id").map_err(|e| backend_err("parent_id", e))?),
        season_id: row
            .try_get::<Option<i64>, _>("season_id")
            .map_err(|e| backend_err("season_id", e))?
            .map(MediaItemId),
        show_id: row
            .try_get::<Option<i64>, _>("show_id")
            .map_err(|e| backend_err("show_id", e))?
            .map(MediaItemId),
        section_id: marker_model::SectionId(row.try_get("section_id").map_err(|e| backend_err("section_id", e))?),
        start: row.try_get("start_ms").map_err(|e| backend_err("start_ms", e))?,
        end: row.try_get("end_ms").map_err(|e| backend_err("end_ms", e))?,
        index: row.try_get("idx").map_err(|e| backend_err("idx", e))?,
        marker_type: marker_type_from_str(row.try_get("marker_type").map_err(|e| backend_err("marker_type", e))?)?,
        is_final: row.try_get("is_final").map_err(|e| backend_err("is_final", e))?,
        created_by_user: row
            .try_get("created_by_user")
            .map_err(|e| backend_err("created_by_user", e))?,
        created_at: row.try_get("created_at").map_err(|e| backend_err("created_at", e))?,
        modified_at: row.try_get("modified_at").map_err(|e| backend_err("modified_at", e))?,
    })
}

const MARKER_COLUMNS: &str = "id, parent_id, season_id, show_id, section_id, start_ms, end_ms, idx, \
     marker_type, is_final, created_by_user, created_at, modified_at";

impl PostgresLibraryAdapter {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        info!("connecting to library database");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .connect(connection_string)
            .await
            .map_err(|e| backend_err("connect", e))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_reindex(
        tx: &mut Transaction<'_, Postgres>,
        reindex: &[IndexUpdate],
    ) -> Result<()> {
        for update in reindex {
            sqlx::query("UPDATE markers SET idx = $1 WHERE id = $2")
                .bind(update.index)
                .bind(update.id.get())
                .execute(&mut **tx)
                .await
                .map_err(|e| backend_err("reindex sibling", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryAdapter for PostgresLibraryAdapter {
    async fn list_sections(&self) -> Result<Vec<Section>> {
        let rows = sqlx::query("SELECT id, name, section_type FROM sections ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_err("list_sections", e))?;
        rows.into_iter()
            .map(|row| {
                Ok(Section {
                    id: SectionId(row.try_get("id").map_err(|e| backend_err("id", e))?),
                    name: row.try_get("name").map_err(|e| backend_err("name", e))?,
                    section_type: item_type_from_str(row.try_get("section_type").map_err(|e| backend_err("section_type", e))?)?,
                })
            })
            .collect()
    }

    async fn list_section_items(&self, section_id: SectionId) -> Result<Vec<MediaItem>> {
        let rows = sqlx::query(
            "SELECT id, item_type, parent_id, section_id, duration_ms, title FROM media_items \
             WHERE section_id = $1 AND parent_id IS NULL AND item_type IN ('show', 'movie') ORDER BY id ASC",
        )
        .bind(section_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("list_section_items", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(MediaItem {
                    id: MediaItemId(row.try_get("id").map_err(|e| backend_err("id", e))?),
                    item_type: item_type_from_str(row.try_get("item_type").map_err(|e| backend_err("item_type", e))?)?,
                    parent_id: None,
                    section_id,
                    duration: row.try_get("duration_ms").map_err(|e| backend_err("duration_ms", e))?,
                    title: row.try_get("title").map_err(|e| backend_err("title", e))?,
                })
            })
            .collect()
    }

    async fn get_item(&self, id: MediaItemId) -> Result<MediaItem> {
        let row = sqlx::query(
            "SELECT id, item_type, parent_id, section_id, duration_ms, title FROM media_items WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend_err("get_item", e))?
        .ok_or_else(|| PortError::NotFound(format!("media item {id}")))?;

        Ok(MediaItem {
            id: MediaItemId(row.try_get("id").map_err(|e| backend_err("id", e))?),
            item_type: item_type_from_str(row.try_get("item_type").map_err(|e| backend_err("item_type", e))?)?,
            parent_id: row
                .try_get::<Option<i64>, _>("parent_id")
                .map_err(|e| backend_err("parent_id", e))?
                .map(MediaItemId),
            section_id: SectionId(row.try_get("section_id").map_err(|e| backend_err("section_id", e))?),
            duration: row.try_get("duration_ms").map_err(|e| backend_err("duration_ms", e))?,
            title: row.try_get("title").map_err(|e| backend_err("title", e))?,
        })
    }

    async fn get_marker(&self, id: MarkerId) -> Result<Marker> {
        let sql = format!("SELECT {MARKER_COLUMNS} FROM markers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_err("get_marker", e))?
            .ok_or_else(|| PortError::NotFound(format!("marker {id}")))?;
        row_to_marker(&row)
    }

    async fn list_markers(&self, parent_id: MediaItemId) -> Result<Vec<Marker>> {
        let sql = format!("SELECT {MARKER_COLUMNS} FROM markers WHERE parent_id = $1 ORDER BY start_ms ASC");
        let rows = sqlx::query(&sql)
            .bind(parent_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_err("list_markers", e))?;
        rows.iter().map(row_to_marker).collect()
    }

    async fn list_markers_for_parents(
        &self,
        parent_ids: &[MediaItemId],
    ) -> Result<HashMap<MediaItemId, Vec<Marker>>> {
        let ids: Vec<i64> = parent_ids.iter().map(|id| id.get()).collect();
        let sql = format!(
            "SELECT {MARKER_COLUMNS} FROM markers WHERE parent_id = ANY($1) ORDER BY parent_id, start_ms ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_err("list_markers_for_parents", e))?;
        let mut out: HashMap<MediaItemId, Vec<Marker>> = parent_ids.iter().map(|id| (*id, Vec::new())).collect();
        for row in &rows {
            let marker = row_to_marker(row)?;
            out.entry(marker.parent_id).or_default().push(marker);
        }
        Ok(out)
    }

    async fn list_markers_for_subtree(&self, root_id: MediaItemId) -> Result<Vec<Marker>> {
        // Recursive descent: every markerable leaf reachable from `root_id`
        // through the media_items parent chain.
        let sql = format!(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT id FROM media_items WHERE id = $1 \
                 UNION ALL \
                 SELECT mi.id FROM media_items mi JOIN subtree s ON mi.parent_id = s.id \
             ) \
             SELECT {MARKER_COLUMNS} FROM markers \
             WHERE parent_id IN (SELECT id FROM subtree) \
             ORDER BY parent_id, start_ms ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(root_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend_err("list_markers_for_subtree", e))?;
        rows.iter().map(row_to_marker).collect()
    }

    async fn list_children(&self, parent_id: MediaItemId, child_type: MediaItemType) -> Result<Vec<MediaItem>> {
        let rows = sqlx::query(
            "SELECT id, item_type, parent_id, section_id, duration_ms, title FROM media_items \
             WHERE parent_id = $1 AND item_type = $2 ORDER BY id ASC",
        )
        .bind(parent_id.get())
        .bind(item_type_to_str(child_type))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("list_children", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(MediaItem {
                    id: MediaItemId(row.try_get("id").map_err(|e| backend_err("id", e))?),
                    item_type: child_type,
                    parent_id: row
                        .try_get::<Option<i64>, _>("parent_id")
                        .map_err(|e| backend_err("parent_id", e))?
                        .map(MediaItemId),
                    section_id: SectionId(row.try_get("section_id").map_err(|e| backend_err("section_id", e))?),
                    duration: row.try_get("duration_ms").map_err(|e| backend_err("duration_ms", e))?,
                    title: row.try_get("title").map_err(|e| backend_err("title", e))?,
                })
            })
            .collect()
    }

    async fn list_markerable_descendants(&self, root_id: MediaItemId) -> Result<Vec<MediaItemId>> {
        let rows = sqlx::query(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT id FROM media_items WHERE id = $1 \
                 UNION ALL \
                 SELECT mi.id FROM media_items mi JOIN subtree s ON mi.parent_id = s.id \
             ) \
             SELECT mi.id FROM media_items mi \
             WHERE mi.id IN (SELECT id FROM subtree) AND mi.item_type IN ('episode', 'movie')",
        )
        .bind(root_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("list_markerable_descendants", e))?;
        rows.into_iter()
            .map(|row| Ok(MediaItemId(row.try_get("id").map_err(|e| backend_err("id", e))?)))
            .collect()
    }

    async fn section_overview(&self, section_id: SectionId) -> Result<Vec<(MediaItemId, MarkerType, i64)>> {
        let rows = sqlx::query(
            "SELECT parent_id, marker_type, COUNT(*) AS cnt FROM markers \
             WHERE section_id = $1 GROUP BY parent_id, marker_type",
        )
        .bind(section_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("section_overview", e))?;

        rows.into_iter()
            .map(|row| {
                let item_id = MediaItemId(row.try_get("parent_id").map_err(|e| backend_err("parent_id", e))?);
                let marker_type =
                    marker_type_from_str(row.try_get("marker_type").map_err(|e| backend_err("marker_type", e))?)?;
                let count: i64 = row.try_get("cnt").map_err(|e| backend_err("cnt", e))?;
                Ok((item_id, marker_type, count))
            })
            .collect()
    }

    async fn add_marker(&self, new: NewMarker, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut tx = self.pool.begin().await.map_err(|e| backend_err("begin add_marker", e))?;

        let parent_row = sqlx::query("SELECT section_id FROM media_items WHERE id = $1")
            .bind(new.parent_id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| backend_err("add_marker parent lookup", e))?
            .ok_or_else(|| PortError::NotFound(format!("media item {}", new.parent_id)))?;
        let section_id: i64 = parent_row.try_get("section_id").map_err(|e| backend_err("section_id", e))?;

        let row = sqlx::query(
            "INSERT INTO markers (parent_id, section_id, start_ms, end_ms, idx, marker_type, is_final, created_by_user, created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now()) \
             RETURNING id, parent_id, season_id, show_id, section_id, start_ms, end_ms, idx, marker_type, is_final, created_by_user, created_at, modified_at",
        )
        .bind(new.parent_id.get())
        .bind(section_id)
        .bind(new.start)
        .bind(new.end)
        .bind(new.index)
        .bind(marker_type_to_str(new.marker_type))
        .bind(new.is_final)
        .bind(new.created_by_user)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| backend_err("insert marker", e))?;
        let inserted = row_to_marker(&row)?;

        Self::apply_reindex(&mut tx, reindex).await?;

        tx.commit().await.map_err(|e| backend_err("commit add_marker", e))?;
        debug!(marker_id = inserted.id.get(), "inserted marker");
        Ok(inserted)
    }

    async fn edit_marker(&self, update: MarkerUpdate, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut tx = self.pool.begin().await.map_err(|e| backend_err("begin edit_marker", e))?;

        let row = sqlx::query(
            "UPDATE markers SET start_ms = $1, end_ms = $2, idx = $3, marker_type = $4, is_final = $5, created_by_user = $6, modified_at = now() \
             WHERE id = $7 \
             RETURNING id, parent_id, season_id, show_id, section_id, start_ms, end_ms, idx, marker_type, is_final, created_by_user, created_at, modified_at",
        )
        .bind(update.start)
        .bind(update.end)
        .bind(update.index)
        .bind(marker_type_to_str(update.marker_type))
        .bind(update.is_final)
        .bind(update.created_by_user)
        .bind(update.id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| backend_err("update marker", e))?
        .ok_or_else(|| PortError::NotFound(format!("marker {}", update.id)))?;
        let edited = row_to_marker(&row)?;

        Self::apply_reindex(&mut tx, reindex).await?;

        tx.commit().await.map_err(|e| backend_err("commit edit_marker", e))?;
        Ok(edited)
    }

    async fn delete_marker(&self, id: MarkerId, reindex: &[IndexUpdate]) -> Result<Marker> {
        let mut tx = self.pool.begin().await.map_err(|e| backend_err("begin delete_marker", e))?;

        let sql = format!("DELETE FROM markers WHERE id = $1 RETURNING {MARKER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| backend_err("delete marker", e))?
            .ok_or_else(|| PortError::NotFound(format!("marker {id}")))?;
        let removed = row_to_marker(&row)?;

        Self::apply_reindex(&mut tx, reindex).await?;

        tx.commit().await.map_err(|e| backend_err("commit delete_marker", e))?;
        Ok(removed)
    }

    async fn apply_shift(&self, updates: &[ShiftUpdate]) -> Result<()> {
        // Group by parent so each parent's post-state is validated as a
        // single unit, but commit everything in one transaction: the Shift
        // Engine has already verified every parent's indices are
        // internally consistent before calling us.
        let mut tx = self.pool.begin().await.map_err(|e| backend_err("begin apply_shift", e))?;
        for update in updates {
            sqlx::query("UPDATE markers SET start_ms = $1, end_ms = $2, idx = $3, modified_at = now() WHERE id = $4")
                .bind(update.start)
                .bind(update.end)
                .bind(update.index)
                .bind(update.id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| backend_err("apply_shift", e))?;
        }
        tx.commit().await.map_err(|e| backend_err("commit apply_shift", e))?;
        Ok(())
    }
}
