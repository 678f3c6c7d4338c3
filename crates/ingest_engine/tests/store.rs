use std::fs;

use ingest_core::{DocumentStore, NormalizedDocument, Settings, StoreError};
use ingest_engine::{ensure_dir, AtomicFileWriter, DirectoryStore, DEFAULT_DECK, MEDIA_DIR};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn doc(title: &str) -> NormalizedDocument {
    NormalizedDocument {
        title: title.to_string(),
        body: "<p>body</p>".to_string(),
        source_citation: "<a href=\"https://example.com\">https://example.com</a> (2024-03-01)"
            .to_string(),
        priority: Some("High".to_string()),
        tags: Vec::new(),
    }
}

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path());

    let first = writer.write("doc.md", "hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");
    let second = writer.write("doc.md", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = AtomicFileWriter::new(file_path.clone()).write("doc.md", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("doc.md").exists());
}

#[test]
fn default_deck_is_created_on_demand() {
    let temp = TempDir::new().unwrap();
    let store = DirectoryStore::new(temp.path(), &Settings::default());

    let deck = store.create_document(&doc("First")).unwrap();
    assert_eq!(deck, DEFAULT_DECK);

    let entries: Vec<_> = fs::read_dir(temp.path().join(DEFAULT_DECK))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let record = fs::read_to_string(&entries[0]).unwrap();
    assert!(record.starts_with("---\nTitle: First\nSource: <a href="));
    assert!(record.contains("Priority: High\n"));
    assert!(record.contains("<section data-field=\"Text\">\n<p>body</p>\n</section>"));
}

#[test]
fn configured_deck_must_exist() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        import_deck: Some("Reading".to_string()),
        ..Settings::default()
    };
    let store = DirectoryStore::new(temp.path(), &settings);
    assert_eq!(
        store.create_document(&doc("x")).unwrap_err(),
        StoreError::DestinationMissing("Reading".to_string())
    );

    fs::create_dir(temp.path().join("Reading")).unwrap();
    assert_eq!(store.create_document(&doc("x")).unwrap(), "Reading");
}

#[test]
fn media_is_copied_once_and_conflicts_get_a_new_name() {
    let source = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let store = DirectoryStore::new(root.path(), &Settings::default());

    let first = source.path().join("a").join("pic.png");
    let second = source.path().join("b").join("pic.png");
    fs::create_dir_all(first.parent().unwrap()).unwrap();
    fs::create_dir_all(second.parent().unwrap()).unwrap();
    fs::write(&first, b"first image").unwrap();
    fs::write(&second, b"second image").unwrap();

    assert_eq!(store.import_local_media(&first).unwrap(), "pic.png");
    assert_eq!(store.import_local_media(&first).unwrap(), "pic.png");
    let renamed = store.import_local_media(&second).unwrap();
    assert!(renamed.starts_with("pic-") && renamed.ends_with(".png"));

    let media = root.path().join(MEDIA_DIR);
    assert_eq!(fs::read(media.join("pic.png")).unwrap(), b"first image");
    assert_eq!(fs::read(media.join(&renamed)).unwrap(), b"second image");
}

#[test]
fn unreadable_media_is_an_error() {
    let root = TempDir::new().unwrap();
    let store = DirectoryStore::new(root.path(), &Settings::default());
    let err = store
        .import_local_media(&root.path().join("missing.png"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Media { .. }));
}
