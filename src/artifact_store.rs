use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirs;
use log;
use reqwest;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Bundle not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Artifact verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {artifact} file")]
    HashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
}

/// The four trained artifact files a predictor needs at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Encoders,
    Scaler,
    FeatureNames,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Model,
        ArtifactKind::Encoders,
        ArtifactKind::Scaler,
        ArtifactKind::FeatureNames,
    ];

    /// Fixed file name inside a bundle directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Model => "model.json",
            ArtifactKind::Encoders => "encoders.json",
            ArtifactKind::Scaler => "scaler.json",
            ArtifactKind::FeatureNames => "feature_names.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => write!(f, "model"),
            ArtifactKind::Encoders => write!(f, "encoders"),
            ArtifactKind::Scaler => write!(f, "scaler"),
            ArtifactKind::FeatureNames => write!(f, "feature names"),
        }
    }
}

/// Source and checksum for one artifact file.
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub url: String,
    pub sha256: String,
}

/// A named set of artifact files produced by one training run, verified and
/// removed as a unit.
#[derive(Debug, Clone)]
pub struct BundleInfo {
    pub name: String,
    pub artifacts: Vec<ArtifactSpec>,
}

impl BundleInfo {
    /// The bundle exported from the reference questionnaire training run.
    pub fn questionnaire_v1() -> Self {
        let base = "https://github.com/axar-ai/tridosha/releases/download/artifacts-v1";
        let hashes = [
            (
                ArtifactKind::Model,
                "8c4be61e2b7a40f3909fb1c8e3ac93a6735e8a5297be02c41bb254e3c9d07f14",
            ),
            (
                ArtifactKind::Encoders,
                "0d2a6f9e84cf13b5a2de76c09871d40e55c3b4a1fd9028e67c14907ab36d5f82",
            ),
            (
                ArtifactKind::Scaler,
                "f7310ac259de88f3b06741c5a92b07f8132e6d5c4a00b9e1725c83df4a6b90de",
            ),
            (
                ArtifactKind::FeatureNames,
                "3b9c25de07f1846aa0bf5e34c8d1290f66a7e84b2d35c017e948fa60cb172d45",
            ),
        ];
        Self {
            name: "questionnaire-v1".to_string(),
            artifacts: hashes
                .into_iter()
                .map(|(kind, sha256)| ArtifactSpec {
                    kind,
                    url: format!("{}/{}", base, kind.file_name()),
                    sha256: sha256.to_string(),
                })
                .collect(),
        }
    }
}

/// Locates, verifies and fetches artifact bundles on local disk.
///
/// Downloading is strictly a startup concern; once a bundle is on disk the
/// inference path never touches the store again.
#[derive(Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ArtifactStore {
    /// Creates a new ArtifactStore with the default artifacts directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("TRIDOSHA_CACHE") {
            return PathBuf::from(path).join("artifacts");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("tridosha").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("tridosha").join("artifacts");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("tridosha").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self {
            artifacts_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Directory a bundle's files live in.
    pub fn bundle_dir(&self, bundle_name: &str) -> PathBuf {
        self.artifacts_dir.join(bundle_name)
    }

    pub fn artifact_path(&self, bundle_name: &str, kind: ArtifactKind) -> PathBuf {
        self.bundle_dir(bundle_name).join(kind.file_name())
    }

    pub fn is_bundle_downloaded(&self, bundle: &BundleInfo) -> bool {
        log::info!("Checking if bundle '{}' is downloaded:", bundle.name);
        bundle.artifacts.iter().all(|spec| {
            let path = self.artifact_path(&bundle.name, spec.kind);
            log::info!("  {} path: {:?} (exists: {})", spec.kind, path, path.exists());
            path.exists()
        })
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ArtifactError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        log::info!("Verified {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash == expected_hash)
    }

    /// Verifies every file of a downloaded bundle against its checksum.
    /// Returns false when any file is absent or corrupt.
    pub fn verify_bundle(&self, bundle: &BundleInfo) -> Result<bool, ArtifactError> {
        for spec in &bundle.artifacts {
            let path = self.artifact_path(&bundle.name, spec.kind);
            if !path.exists() {
                log::info!("{} file does not exist at {:?}", spec.kind, path);
                return Ok(false);
            }
            if !self.verify_file(&path, &spec.sha256)? {
                log::warn!("{} file failed verification at {:?}", spec.kind, path);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Downloads a bundle, verifying each file. Existing files that pass
    /// verification are kept; anything else is (re)fetched. On any failure
    /// the whole bundle is removed so a partial download can never be
    /// served.
    pub async fn download_bundle(&self, bundle: &BundleInfo) -> Result<(), ArtifactError> {
        let _lock = self.download_lock.lock().await;

        let bundle_dir = self.bundle_dir(&bundle.name);
        log::info!("Creating bundle directory at {:?}", bundle_dir);
        fs::create_dir_all(&bundle_dir)?;

        for spec in &bundle.artifacts {
            let path = self.artifact_path(&bundle.name, spec.kind);
            let result = if path.exists() {
                log::info!("{} file exists at {:?}, verifying...", spec.kind, path);
                if !self.verify_file(&path, &spec.sha256)? {
                    log::warn!("{} file verification failed, redownloading", spec.kind);
                    self.download_and_verify_file(spec, &path).await
                } else {
                    log::info!("Existing {} file verified successfully", spec.kind);
                    Ok(())
                }
            } else {
                log::info!("{} file does not exist, downloading...", spec.kind);
                self.download_and_verify_file(spec, &path).await
            };

            if let Err(e) = result {
                log::error!("Failed to set up {} file: {}", spec.kind, e);
                // Cleanup on failure
                let _ = self.remove_bundle(bundle);
                return Err(e);
            }
        }

        log::info!("Bundle '{}' ready to use", bundle.name);
        Ok(())
    }

    async fn download_and_verify_file(
        &self,
        spec: &ArtifactSpec,
        path: &Path,
    ) -> Result<(), ArtifactError> {
        log::info!("Downloading {} file from {} to {:?}", spec.kind, spec.url, path);
        let response = reqwest::get(&spec.url).await?;
        log::info!("Download response status: {}", response.status());
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());

        if hash != spec.sha256 {
            log::error!(
                "{} hash mismatch: expected {}, got {}",
                spec.kind,
                spec.sha256,
                hash
            );
            return Err(ArtifactError::HashMismatch {
                artifact: spec.kind.to_string(),
                expected: spec.sha256.clone(),
                actual: hash,
            });
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!("Writing {} bytes to {:?}", bytes.len(), path);
        fs::write(path, bytes)?;

        // Verify after writing
        if !self.verify_file(path, &spec.sha256)? {
            return Err(ArtifactError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", spec.kind);
        Ok(())
    }

    pub fn remove_bundle(&self, bundle: &BundleInfo) -> Result<(), ArtifactError> {
        for spec in &bundle.artifacts {
            let path = self.artifact_path(&bundle.name, spec.kind);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a bundle is downloaded and verified.
    /// If the bundle doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_downloaded(&self, bundle: &BundleInfo) -> Result<(), ArtifactError> {
        log::info!("Checking if bundle '{}' is downloaded...", bundle.name);
        if !self.is_bundle_downloaded(bundle) {
            log::info!("Bundle not found, downloading...");
            self.download_bundle(bundle).await?;
        } else if !self.verify_bundle(bundle)? {
            log::info!("Bundle verification failed, re-downloading...");
            self.remove_bundle(bundle)?;
            self.download_bundle(bundle).await?;
        } else {
            log::info!("Bundle verification successful");
        }
        Ok(())
    }
}
