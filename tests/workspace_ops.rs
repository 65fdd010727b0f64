mod common;

use std::fs;

use common::Workspace;
use tsw_bundle::label::extract_label;
use tsw_bundle::scan::{collect_file_set, list_all_files, list_description_files};
use tsw_bundle::staging::StagingDirectory;
use tsw_bundle::BundleError;

#[test]
fn lists_description_files_sorted_and_case_insensitive() {
    let ws = Workspace::new();
    ws.write("zeta.desc", "Model=Z\n");
    ws.write("Alpha.DESC", "Model=A\n");
    ws.write("notes.txt", "");
    fs::create_dir(ws.path().join("nested")).unwrap();
    fs::write(ws.path().join("nested").join("deep.desc"), "Model=D\n").unwrap();
    fs::create_dir(ws.path().join("dir.desc")).unwrap();

    let found = list_description_files(ws.path(), "desc").unwrap();
    let names: Vec<_> = found.iter().map(|d| d.base_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "zeta"]);
}

#[test]
fn list_all_files_skips_directories() {
    let ws = Workspace::new();
    ws.write("b.txt", "");
    ws.write("a.bin", "");
    fs::create_dir(ws.path().join("staging")).unwrap();

    let files = list_all_files(ws.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.bin", "b.txt"]);
}

#[test]
fn unreadable_workspace_is_an_io_error() {
    let ws = Workspace::new();
    let missing = ws.path().join("does-not-exist");
    let err = list_description_files(&missing, "desc").unwrap_err();
    assert!(matches!(err, BundleError::Io { .. }), "{err:?}");
}

#[test]
fn file_set_is_evaluated_fresh() {
    let ws = Workspace::new();
    ws.write("a.desc", "Model=A\n");
    let exclusions = ws.config().extensions.exclusions();
    let description = list_description_files(ws.path(), "desc").unwrap().remove(0);

    let before = collect_file_set(ws.path(), &description, &exclusions, &[]).unwrap();
    assert_eq!(before.file_names(), vec!["a.desc"]);

    ws.write("late.txt", "added later");
    let after = collect_file_set(ws.path(), &description, &exclusions, &[]).unwrap();
    assert_eq!(after.file_names(), vec!["a.desc", "late.txt"]);
}

#[test]
fn extract_label_reads_model_field() {
    let ws = Workspace::new();
    let path = ws.write("m.desc", "[Header]\nVersion=3\nModel=Widget-9\nModel=Ignored\n");
    assert_eq!(extract_label(&path).unwrap(), "Widget-9");
}

#[test]
fn extract_label_without_field_fails() {
    let ws = Workspace::new();
    let path = ws.write("m.desc", "Version=3\n");
    assert!(matches!(
        extract_label(&path),
        Err(BundleError::MissingLabel { .. })
    ));
}

#[test]
fn extract_label_rejects_unusable_names() {
    let ws = Workspace::new();
    let empty = ws.write("empty.desc", "Model=\n");
    let escape = ws.write("escape.desc", "Model=../outside\n");
    assert!(matches!(
        extract_label(&empty),
        Err(BundleError::InvalidLabel { .. })
    ));
    assert!(matches!(
        extract_label(&escape),
        Err(BundleError::InvalidLabel { label, .. }) if label == "../outside"
    ));
}

#[test]
fn staging_lifecycle() {
    let ws = Workspace::new();
    let src = ws.write("part.txt", "v1");
    let out = tempfile::tempdir().unwrap();

    let staging = StagingDirectory::prepare(ws.path(), "unit").unwrap();
    assert!(staging.path().is_dir());
    staging.populate(&[&src]).unwrap();

    // Second copy of the same name overwrites silently.
    fs::write(&src, "v2").unwrap();
    staging.populate(&[&src]).unwrap();
    assert_eq!(fs::read_to_string(staging.path().join("part.txt")).unwrap(), "v2");

    fs::write(staging.path().join("unit.ARCH"), "archive").unwrap();
    let published = staging.publish("unit.ARCH", out.path()).unwrap();
    assert_eq!(fs::read_to_string(published).unwrap(), "archive");

    let dir = staging.path().to_path_buf();
    staging.teardown().unwrap();
    assert!(!dir.exists());
}

#[test]
fn prepare_wipes_existing_directory() {
    let ws = Workspace::new();
    fs::create_dir(ws.path().join("unit")).unwrap();
    fs::write(ws.path().join("unit").join("old.txt"), "old").unwrap();

    let staging = StagingDirectory::prepare(ws.path(), "unit").unwrap();
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn dropped_staging_directory_removes_itself() {
    let ws = Workspace::new();
    let dir = {
        let staging = StagingDirectory::prepare(ws.path(), "unit").unwrap();
        fs::write(staging.path().join("x.txt"), "x").unwrap();
        staging.path().to_path_buf()
    };
    assert!(!dir.exists());
}

#[test]
fn publish_without_archive_fails() {
    let ws = Workspace::new();
    let staging = StagingDirectory::prepare(ws.path(), "unit").unwrap();
    let err = staging.publish("missing.ARCH", ws.path()).unwrap_err();
    assert!(matches!(err, BundleError::ArchiveNotProduced { .. }));
}

#[test]
fn populate_stops_on_missing_source() {
    let ws = Workspace::new();
    let staging = StagingDirectory::prepare(ws.path(), "unit").unwrap();
    let err = staging
        .populate(&[ws.path().join("ghost.txt")])
        .unwrap_err();
    assert!(matches!(err, BundleError::Io { .. }));
}
