//! SQLite persistence and JSON snapshots of scraped characters.
//!
//! Each character is one row: the full record as JSON plus a few indexed
//! columns for filtering and sorting. List membership (categories, links) is
//! queried through SQLite's JSON functions.

use crate::error::{Result, ScrapeError};
use crate::models::{Character, Class, Rarity, Type, SENTINEL};
use chrono::Utc;
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_FILE_SUFFIX: &str = "_DokkanCharacterData.json";
pub const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Name,
    Rarity,
    MaxLevel,
    Cost,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters and paging for [`CharacterStore::search`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterQuery {
    /// Substring of name or title.
    pub search: Option<String>,
    pub rarity: Option<Rarity>,
    #[serde(rename = "type")]
    pub char_type: Option<Type>,
    pub class: Option<Class>,
    pub category: Option<String>,
    pub link: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Filters {
    pub rarities: Vec<String>,
    pub types: Vec<String>,
    pub classes: Vec<String>,
    pub categories: Vec<String>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CharacterPage {
    pub characters: Vec<Character>,
    pub pagination: Pagination,
    pub filters: Filters,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total_characters: usize,
    pub characters_by_rarity: BTreeMap<String, usize>,
    pub characters_by_type: BTreeMap<String, usize>,
    pub characters_by_class: BTreeMap<String, usize>,
    pub total_categories: usize,
    pub total_links: usize,
    pub total_transformations: usize,
}

pub struct CharacterStore {
    conn: Connection,
}

impl CharacterStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Insert characters whose id is not stored yet, one transaction each.
    ///
    /// Cards whose id could not be read are skipped: the id is the key.
    pub fn persist(&mut self, characters: &[Character]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for character in characters {
            if character.id == SENTINEL {
                warn!(
                    "Skipping {} ({}): card has no id",
                    character.name, character.title
                );
                summary.skipped += 1;
                continue;
            }
            match self.insert_one(character) {
                Ok(true) => summary.imported += 1,
                Ok(false) => {
                    debug!("Character {} already stored, skipping", character.id);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Failed to store character {}: {}", character.id, e);
                    summary.errors += 1;
                }
            }
        }
        info!(
            "Import summary: {} imported, {} skipped, {} errors",
            summary.imported, summary.skipped, summary.errors
        );
        summary
    }

    fn insert_one(&mut self, character: &Character) -> Result<bool> {
        let data = serde_json::to_string(character)?;
        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM characters WHERE id = ?1)",
            [&character.id],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO characters (id, name, title, rarity, class, type, cost, max_level, data, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                character.id,
                character.name,
                character.title,
                character.rarity.as_str(),
                character.class.as_str(),
                character.char_type.as_str(),
                character.cost,
                character.max_level,
                data,
                Utc::now().timestamp(),
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Result<Option<Character>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM characters WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn search(&self, query: &CharacterQuery) -> Result<CharacterPage> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        // Page numbers come straight from the query string.
        let offset = i64::try_from((page - 1).saturating_mul(limit)).unwrap_or(i64::MAX);

        let mut where_clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            where_clauses.push("(name LIKE ? OR title LIKE ?)");
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }
        if let Some(rarity) = query.rarity {
            where_clauses.push("rarity = ?");
            params.push(Box::new(rarity.as_str()));
        }
        if let Some(char_type) = query.char_type {
            where_clauses.push("type = ?");
            params.push(Box::new(char_type.as_str()));
        }
        if let Some(class) = query.class {
            where_clauses.push("class = ?");
            params.push(Box::new(class.as_str()));
        }
        if let Some(category) = &query.category {
            where_clauses.push("EXISTS (SELECT 1 FROM json_each(data, '$.categories') WHERE value = ?)");
            params.push(Box::new(category.clone()));
        }
        if let Some(link) = &query.link {
            where_clauses.push("EXISTS (SELECT 1 FROM json_each(data, '$.links') WHERE value = ?)");
            params.push(Box::new(link.clone()));
        }

        let where_clause = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sort_expr = match query.sort_by.unwrap_or_default() {
            SortBy::Name => "name",
            SortBy::Rarity => "CASE rarity WHEN 'N' THEN 1 WHEN 'R' THEN 2 WHEN 'SR' THEN 3 WHEN 'SSR' THEN 4 WHEN 'UR' THEN 5 WHEN 'LR' THEN 6 ELSE 7 END",
            SortBy::MaxLevel => "max_level",
            SortBy::Cost => "cost",
        };
        let order = match query.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM characters{}", where_clause),
            param_refs.as_slice(),
            |row| row.get(0),
        )?;
        let total = total as usize;

        let sql = format!(
            "SELECT data FROM characters{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            where_clause, sort_expr, order
        );
        let limit_param = limit as i64;
        let mut page_refs = param_refs.clone();
        page_refs.push(&limit_param);
        page_refs.push(&offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(page_refs.as_slice(), |row| row.get::<_, String>(0))?;
        let mut characters = Vec::new();
        for row in rows {
            characters.push(serde_json::from_str(&row?)?);
        }

        let total_pages = total.div_ceil(limit);
        Ok(CharacterPage {
            characters,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1,
            },
            filters: self.filters()?,
        })
    }

    fn column_values(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn filters(&self) -> Result<Filters> {
        Ok(Filters {
            rarities: self.column_values("SELECT DISTINCT rarity FROM characters ORDER BY rarity")?,
            types: self.column_values("SELECT DISTINCT type FROM characters ORDER BY type")?,
            classes: self.column_values("SELECT DISTINCT class FROM characters ORDER BY class")?,
            categories: self.column_values(
                "SELECT DISTINCT j.value FROM characters c, json_each(c.data, '$.categories') j ORDER BY j.value",
            )?,
            links: self.column_values(
                "SELECT DISTINCT j.value FROM characters c, json_each(c.data, '$.links') j ORDER BY j.value",
            )?,
        })
    }

    fn counts_by(&self, column: &str) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {0}, COUNT(*) FROM characters GROUP BY {0}", column))?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut out = BTreeMap::new();
        for r in rows {
            let (key, count) = r?;
            out.insert(key, count as usize);
        }
        Ok(out)
    }

    fn scalar(&self, sql: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            total_characters: self.count()?,
            characters_by_rarity: self.counts_by("rarity")?,
            characters_by_type: self.counts_by("type")?,
            characters_by_class: self.counts_by("class")?,
            total_categories: self.scalar(
                "SELECT COUNT(DISTINCT j.value) FROM characters c, json_each(c.data, '$.categories') j",
            )?,
            total_links: self.scalar(
                "SELECT COUNT(DISTINCT j.value) FROM characters c, json_each(c.data, '$.links') j",
            )?,
            total_transformations: self.scalar(
                "SELECT COALESCE(SUM(json_array_length(data, '$.transformations')), 0) FROM characters",
            )?,
        })
    }
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS characters (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            rarity TEXT NOT NULL,
            class TEXT NOT NULL,
            type TEXT NOT NULL,
            cost INTEGER NOT NULL,
            max_level INTEGER NOT NULL,
            data TEXT NOT NULL,
            imported_at INTEGER NOT NULL
        );",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_char_name ON characters(name);", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_char_rarity ON characters(rarity);", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_char_type_class ON characters(type, class);", [])?;
    Ok(())
}

/// Snapshot file name for today, e.g. `20240131_DokkanCharacterData.json`.
pub fn data_file_name() -> String {
    format!("{}{}", Utc::now().format("%Y%m%d"), DATA_FILE_SUFFIX)
}

/// Write characters as a pretty-printed JSON array into `dir`.
pub fn write_json(dir: &Path, characters: &[Character]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(data_file_name());
    fs::write(&path, serde_json::to_string_pretty(characters)?)?;
    info!("Wrote {} characters to {}", characters.len(), path.display());
    Ok(path)
}

/// Read a snapshot: either a bare array or an object with a `characters` field.
pub fn read_json(path: &Path) -> Result<Vec<Character>> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let list = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map.remove("characters").ok_or_else(|| {
            ScrapeError::InvalidData(format!("{}: no characters field", path.display()))
        })?,
        _ => {
            return Err(ScrapeError::InvalidData(format!(
                "{}: expected an array of characters",
                path.display()
            )))
        }
    };
    Ok(serde_json::from_value(list)?)
}

/// Every snapshot file in `dir`, oldest first.
pub fn data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_snapshot = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(DATA_FILE_SUFFIX));
        if is_snapshot {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn latest_data_file(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(data_files(dir)?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_file_name_format() {
        let name = data_file_name();
        assert!(name.ends_with(DATA_FILE_SUFFIX));
        let stamp = name.trim_end_matches(DATA_FILE_SUFFIX);
        assert_eq!(stamp.len(), 8);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_empty_store_stats() {
        let store = CharacterStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_characters, 0);
        assert_eq!(stats.total_transformations, 0);
        assert!(stats.characters_by_rarity.is_empty());
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let q: CharacterQuery = serde_json::from_str(
            r#"{"search":"goku","type":"TEQ","sortBy":"maxLevel","sortOrder":"desc","limit":500}"#,
        )
        .unwrap();
        assert_eq!(q.char_type, Some(Type::TEQ));
        assert_eq!(q.sort_by, Some(SortBy::MaxLevel));
        assert_eq!(q.sort_order, Some(SortOrder::Desc));
        assert_eq!(q.limit, Some(500));
    }
}
