use std::path::Path;

use tapmark::engine::resources::{AssetError, AssetSource, PreloadedAssets, ResourceManager};

#[test]
fn preloaded_bytes_are_served_by_path() {
    let mut assets = PreloadedAssets::default();
    assets.insert("app/src/main/assets/audio/click.wav", vec![1, 2, 3]);

    let bytes = assets
        .read(Path::new("app/src/main/assets/audio/click.wav"))
        .unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[test]
fn failed_fetch_is_reported_on_read() {
    let mut assets = PreloadedAssets::default();
    assets.insert_failure("fonts/arial.ttf", "HTTP 404");

    let err = assets.read(Path::new("fonts/arial.ttf")).unwrap_err();
    assert!(matches!(err, AssetError::Fetch { .. }));
    assert_eq!(err.to_string(), "failed to fetch fonts/arial.ttf: HTTP 404");
}

#[test]
fn unknown_paths_are_not_found() {
    let assets = PreloadedAssets::default();
    let err = assets.read(Path::new("sprites/crate.png")).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));
}

#[test]
fn resource_manager_reads_through_the_source() {
    let mut assets = PreloadedAssets::default();
    assets.insert("a.bin", vec![7]);
    let resources = ResourceManager::new(Box::new(assets));

    assert_eq!(resources.read(Path::new("a.bin")).unwrap(), vec![7]);
    assert!(resources.read(Path::new("b.bin")).is_err());
}
