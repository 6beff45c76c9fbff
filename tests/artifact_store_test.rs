use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tridosha::{ArtifactKind, ArtifactSpec, ArtifactStore, BundleInfo};

fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn local_bundle(contents: &[u8]) -> BundleInfo {
    BundleInfo {
        name: "test-bundle".to_string(),
        artifacts: ArtifactKind::ALL
            .into_iter()
            .map(|kind| ArtifactSpec {
                kind,
                url: format!("http://localhost/unused/{}", kind.file_name()),
                sha256: hex_sha256(contents),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_artifact_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;

    let model_path = store.artifact_path("questionnaire-v1", ArtifactKind::Model);
    let names_path = store.artifact_path("questionnaire-v1", ArtifactKind::FeatureNames);

    assert!(model_path.ends_with("questionnaire-v1/model.json"));
    assert!(names_path.ends_with("questionnaire-v1/feature_names.json"));
    Ok(())
}

#[tokio::test]
async fn test_bundle_not_downloaded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;
    let bundle = local_bundle(b"{}");

    assert!(!store.is_bundle_downloaded(&bundle));
    assert!(!store.verify_bundle(&bundle)?);
    Ok(())
}

#[tokio::test]
async fn test_bundle_verification() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;
    let bundle = local_bundle(b"{}");

    // Write every artifact with the expected contents.
    for spec in &bundle.artifacts {
        let path = store.artifact_path(&bundle.name, spec.kind);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, b"{}")?;
    }
    assert!(store.is_bundle_downloaded(&bundle));
    assert!(store.verify_bundle(&bundle)?);

    // Corrupt one file and verify again.
    let model_path = store.artifact_path(&bundle.name, ArtifactKind::Model);
    std::fs::write(&model_path, b"corrupted data")?;
    assert!(!store.verify_bundle(&bundle)?);
    Ok(())
}

#[tokio::test]
async fn test_remove_bundle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;
    let bundle = local_bundle(b"{}");

    for spec in &bundle.artifacts {
        let path = store.artifact_path(&bundle.name, spec.kind);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, b"{}")?;
    }
    assert!(store.is_bundle_downloaded(&bundle));

    store.remove_bundle(&bundle)?;
    assert!(!store.is_bundle_downloaded(&bundle));

    // Removing an absent bundle is fine.
    store.remove_bundle(&bundle)?;
    Ok(())
}

#[test]
fn test_builtin_bundle_shape() {
    let bundle = BundleInfo::questionnaire_v1();
    assert_eq!(bundle.name, "questionnaire-v1");
    assert_eq!(bundle.artifacts.len(), 4);
    for spec in &bundle.artifacts {
        assert!(spec.url.ends_with(spec.kind.file_name()));
        assert_eq!(spec.sha256.len(), 64);
    }
}
