use condenser_engine::{artifact_stem, ensure_output_dir, label_from_url, ArtifactStore};
use pretty_assertions::assert_eq;

#[test]
fn stem_is_deterministic_and_filesystem_safe() {
    let stem = artifact_stem("My: Talk?/Bad", "https://example.com/t");
    assert!(stem.starts_with("My_ Talk_Bad--"));

    let again = artifact_stem("My: Talk?/Bad", "https://example.com/t");
    assert_eq!(stem, again);

    // Different URLs give different stems for the same label.
    let other = artifact_stem("My: Talk?/Bad", "https://example.com/u");
    assert_ne!(stem, other);

    // Reserved Windows names are patched.
    let reserved = artifact_stem("CON", "https://example.com/t");
    assert!(reserved.starts_with("CON_--"));
}

#[test]
fn label_comes_from_the_last_path_segment() {
    assert_eq!(
        label_from_url("https://example.com/feeds/talk-042.vtt?lang=en"),
        "talk-042"
    );
    assert_eq!(label_from_url("https://example.com/a/b/"), "b");
    assert_eq!(label_from_url("https://example.com"), "transcript");
}

#[test]
fn store_writes_all_three_artifacts() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());

    let transcript = store.write_transcript("talk--abcd1234", "raw words").unwrap();
    let partials = store
        .write_partials(
            "talk--abcd1234",
            &["first part".to_string(), "second part".to_string()],
        )
        .unwrap();
    let summary = store.write_summary("talk--abcd1234", "- the gist").unwrap();

    assert_eq!(std::fs::read_to_string(&transcript).unwrap(), "raw words");
    assert_eq!(std::fs::read_to_string(&summary).unwrap(), "- the gist");

    let decoded: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&partials).unwrap()).unwrap();
    assert_eq!(
        decoded,
        vec!["first part".to_string(), "second part".to_string()]
    );

    assert!(transcript.ends_with("talk--abcd1234.txt"));
    assert!(partials.ends_with("talk--abcd1234.partials.json"));
    assert!(summary.ends_with("talk--abcd1234.md"));
}

#[test]
fn store_overwrites_existing_artifacts() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());

    store.write_summary("talk--ffff0000", "old").unwrap();
    let path = store.write_summary("talk--ffff0000", "new").unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
}

#[test]
fn ensure_output_dir_rejects_a_file_path() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp.path().join("occupied");
    std::fs::write(&file, "x").unwrap();

    assert!(ensure_output_dir(&file).is_err());
}

#[test]
fn ensure_output_dir_creates_missing_directories() {
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");

    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}
