/// Character store and snapshot file tests
use dokkan_scraper::error::ScrapeError;
use dokkan_scraper::models::{Rarity, Type};
use dokkan_scraper::store::{self, CharacterQuery, CharacterStore, SortBy, SortOrder, MAX_PAGE_SIZE};
use dokkan_scraper::{extract_character_page, Character};
use std::path::Path;

fn fixture_character(name: &str) -> Character {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let html = std::fs::read_to_string(&path).expect("Failed to read fixture");
    extract_character_page(&html).expect("Fixture should yield a character")
}

/// Standard Goku (UR TEQ), EZA Vegeta (UR PHY) and transforming Goku (LR AGL).
fn sample_characters() -> Vec<Character> {
    vec![
        fixture_character("character_standard.html"),
        fixture_character("character_eza.html"),
        fixture_character("character_transform.html"),
    ]
}

fn seeded_store() -> CharacterStore {
    let mut db = CharacterStore::open_in_memory().expect("Failed to open store");
    let summary = db.persist(&sample_characters());
    assert_eq!(summary.imported, 3);
    db
}

fn names(page: &store::CharacterPage) -> Vec<&str> {
    page.characters.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_persist_skips_known_ids() {
    let mut db = seeded_store();
    let summary = db.persist(&sample_characters());

    assert_eq!(summary.imported, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.errors, 0);
    assert_eq!(db.count().unwrap(), 3);
}

#[test]
fn test_get_returns_stored_record() {
    let db = seeded_store();
    let expected = fixture_character("character_transform.html");

    let stored = db.get("1010000").unwrap().expect("Character should be stored");
    assert_eq!(stored, expected);
    assert_eq!(stored.transformations.map(|t| t.len()), Some(2));

    assert!(db.get("9999999").unwrap().is_none());
}

#[test]
fn test_search_by_text_and_enums() {
    let db = seeded_store();

    let page = db
        .search(&CharacterQuery {
            search: Some("goku".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Goku", "Super Saiyan Goku"]);

    let page = db
        .search(&CharacterQuery {
            rarity: Some(Rarity::LR),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Goku"]);

    let page = db
        .search(&CharacterQuery {
            char_type: Some(Type::PHY),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Super Saiyan Vegeta"]);
}

#[test]
fn test_search_by_list_membership() {
    let db = seeded_store();

    let page = db
        .search(&CharacterQuery {
            category: Some("Pure Saiyans".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Super Saiyan Goku"]);

    let page = db
        .search(&CharacterQuery {
            link: Some("Fierce Battle".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Goku"]);

    assert!(page.filters.links.contains(&"Kamehameha".to_string()));
    assert!(page.filters.categories.contains(&"Goku's Family".to_string()));
    assert_eq!(page.filters.rarities, vec!["LR", "UR"]);
}

#[test]
fn test_search_sorting() {
    let db = seeded_store();

    let page = db
        .search(&CharacterQuery {
            sort_by: Some(SortBy::Cost),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["Goku", "Super Saiyan Goku", "Super Saiyan Vegeta"]);

    let page = db
        .search(&CharacterQuery {
            sort_by: Some(SortBy::Rarity),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.characters[0].rarity, Rarity::LR);

    let page = db.search(&CharacterQuery::default()).unwrap();
    assert_eq!(names(&page), vec!["Goku", "Super Saiyan Goku", "Super Saiyan Vegeta"]);
}

#[test]
fn test_search_pagination() {
    let db = seeded_store();

    let page = db
        .search(&CharacterQuery {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.characters.len(), 1);
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert!(!page.pagination.has_next);
    assert!(page.pagination.has_prev);

    let page = db
        .search(&CharacterQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, MAX_PAGE_SIZE);
    assert_eq!(page.characters.len(), 3);
}

#[test]
fn test_stats() {
    let db = seeded_store();
    let stats = db.stats().unwrap();

    assert_eq!(stats.total_characters, 3);
    assert_eq!(stats.characters_by_rarity.get("UR"), Some(&2));
    assert_eq!(stats.characters_by_rarity.get("LR"), Some(&1));
    assert_eq!(stats.characters_by_class.get("Super"), Some(&2));
    assert_eq!(stats.characters_by_class.get("Extreme"), Some(&1));
    assert_eq!(stats.characters_by_type.len(), 3);
    assert_eq!(stats.total_transformations, 2);
    // Distinct values across all records, the "Error" placeholder included
    assert_eq!(stats.total_categories, 4);
    assert_eq!(stats.total_links, 5);
}

#[test]
fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let characters = sample_characters();

    let path = store::write_json(dir.path(), &characters).unwrap();
    assert!(path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(store::DATA_FILE_SUFFIX)));

    let loaded = store::read_json(&path).unwrap();
    assert_eq!(loaded, characters);
    assert_eq!(store::latest_data_file(dir.path()).unwrap(), Some(path));
}

#[test]
fn test_snapshot_object_form() {
    let dir = tempfile::tempdir().unwrap();
    let characters = vec![fixture_character("character_standard.html")];
    let wrapped = serde_json::json!({ "characters": characters, "stats": { "totalCharacters": 1 } });
    let path = dir.path().join("wrapped.json");
    std::fs::write(&path, wrapped.to_string()).unwrap();

    assert_eq!(store::read_json(&path).unwrap(), characters);
}

#[test]
fn test_snapshot_rejects_other_shapes() {
    let dir = tempfile::tempdir().unwrap();

    let scalar = dir.path().join("scalar.json");
    std::fs::write(&scalar, "\"not a list\"").unwrap();
    assert!(matches!(store::read_json(&scalar), Err(ScrapeError::InvalidData(_))));

    let object = dir.path().join("object.json");
    std::fs::write(&object, r#"{"items": []}"#).unwrap();
    assert!(matches!(store::read_json(&object), Err(ScrapeError::InvalidData(_))));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "[{").unwrap();
    assert!(matches!(store::read_json(&broken), Err(ScrapeError::Json(_))));
}

#[test]
fn test_data_files_sorted_by_date() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "20240315_DokkanCharacterData.json",
        "20240101_DokkanCharacterData.json",
        "notes.txt",
    ] {
        std::fs::write(dir.path().join(name), "[]").unwrap();
    }

    let files = store::data_files(dir.path()).unwrap();
    let file_names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(
        file_names,
        vec!["20240101_DokkanCharacterData.json", "20240315_DokkanCharacterData.json"]
    );

    let latest = store::latest_data_file(dir.path()).unwrap().unwrap();
    assert!(latest.ends_with("20240315_DokkanCharacterData.json"));
    assert!(store::read_json(&latest).unwrap().is_empty());
}

#[test]
fn test_page_far_past_the_end() {
    let db = seeded_store();

    let page = db
        .search(&CharacterQuery {
            page: Some(usize::MAX),
            limit: Some(MAX_PAGE_SIZE),
            ..Default::default()
        })
        .expect("Huge page numbers should give an empty page");
    assert!(page.characters.is_empty());
    assert_eq!(page.pagination.total, 3);
    assert!(page.pagination.has_prev);
    assert!(!page.pagination.has_next);
}

#[test]
fn test_cards_without_id_are_not_stored() {
    let mut db = CharacterStore::open_in_memory().unwrap();
    let mut first = fixture_character("character_standard.html");
    first.id = dokkan_scraper::SENTINEL.to_string();
    let mut second = fixture_character("character_eza.html");
    second.id = dokkan_scraper::SENTINEL.to_string();

    let summary = db.persist(&[first, second]);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.errors, 0);
    assert_eq!(db.count().unwrap(), 0);
}
