use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kira_study_viewer::config::{ConfigLoader, SourceSpec};
use kira_study_viewer::error::KiraError;
use kira_study_viewer::locale::NumberLocale;

#[test]
fn resolve_from_explicit_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-sv.json");
    std::fs::write(
        &path,
        r#"{"base_url": "https://lake.example.org/", "locale": "ch"}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.locale, NumberLocale::Ch);
    assert_eq!(
        resolved.source,
        SourceSpec::Url("https://lake.example.org/data/study_metadata.json".to_string())
    );
}

#[test]
fn custom_resource_path_is_joined() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-sv.json");
    std::fs::write(
        &path,
        r#"{"base_url": "http://127.0.0.1:3000", "resource_path": "studies/lake.json"}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(
        resolved.source,
        SourceSpec::Url("http://127.0.0.1:3000/studies/lake.json".to_string())
    );
}

#[test]
fn file_source_in_config() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-sv.json");
    std::fs::write(&path, r#"{"source": "tests/fixtures/study_metadata.json"}"#).unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(
        resolved.source,
        SourceSpec::File(Utf8PathBuf::from("tests/fixtures/study_metadata.json"))
    );
}

#[test]
fn missing_explicit_config_is_an_error() {
    let err = ConfigLoader::resolve(Some("does-not-exist/kira-sv.json")).unwrap_err();
    assert_matches!(err, KiraError::ConfigRead(_));
}

#[test]
fn malformed_config_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-sv.json");
    std::fs::write(&path, r#"{"locale": "klingon"}"#).unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, KiraError::ConfigParse(_));
}
