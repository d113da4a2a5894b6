//! Settings loading from files layered over compiled defaults.

use std::fs;

use tempfile::TempDir;

use checktree::config::{PathSettings, Settings};
use checktree::{Item, NodeStore, TreeError};

#[test]
fn given_partial_config_file_when_loading_then_merges_over_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checktree.toml");
    fs::write(
        &path,
        r#"
[paths]
separator = "::"

[render]
checked = "(*)"
"#,
    )
    .unwrap();

    let settings = Settings::from_file(&path).expect("load settings");

    assert_eq!(settings.paths.separator, "::");
    assert_eq!(settings.paths.root_key, "root");
    assert_eq!(settings.render.checked, "(*)");
    assert_eq!(settings.render.unchecked, "[ ]");
}

#[test]
fn given_missing_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let result = Settings::from_file(&dir.path().join("nope.toml"));

    assert!(matches!(result, Err(TreeError::Config { .. })));
}

#[test]
fn given_malformed_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[paths\nseparator = ").unwrap();

    let result = Settings::load(Some(path.as_path()));

    match result {
        Err(TreeError::Config { message }) => assert!(message.contains("bad.toml")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_saved_settings_when_reloading_then_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checktree.toml");
    let mut settings = Settings::default();
    settings.paths.root_key = "top".into();
    settings.render.color = true;
    fs::write(&path, settings.to_toml().unwrap()).unwrap();

    assert_eq!(Settings::from_file(&path).unwrap(), settings);
}

#[test]
fn given_path_settings_when_building_store_then_used_for_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checktree.toml");
    fs::write(&path, "[paths]\nseparator = \".\"\nroot_key = \"top\"\n").unwrap();
    let settings = Settings::from_file(&path).unwrap();

    let mut store = NodeStore::with_paths(settings.paths.clone());
    store.index(vec![Item::named("a").child(Item::named("b"))]);

    assert!(store.find_by_path("a.b").is_some());
    assert_eq!(store.children_of_path("top").len(), 1);
    assert_ne!(store.path_settings(), &PathSettings::default());
}

#[test]
fn given_env_vars_when_loading_then_override_defaults_and_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("checktree.toml");
    fs::write(
        &path,
        "[paths]\nseparator = \"::\"\nroot_key = \"top\"\n\n[render]\ncolor = false\n",
    )
    .unwrap();
    std::env::set_var("CHECKTREE_PATHS__SEPARATOR", ".");
    std::env::set_var("CHECKTREE_RENDER__COLOR", "true");

    let without_file = Settings::load(None);
    let with_file = Settings::load(Some(path.as_path()));

    std::env::remove_var("CHECKTREE_PATHS__SEPARATOR");
    std::env::remove_var("CHECKTREE_RENDER__COLOR");

    let settings = without_file.expect("load settings");
    assert_eq!(settings.paths.separator, ".");
    assert!(settings.render.color);

    // env beats the explicit file; the file still beats the defaults
    let settings = with_file.expect("load settings");
    assert_eq!(settings.paths.separator, ".");
    assert!(settings.render.color);
    assert_eq!(settings.paths.root_key, "top");
}
