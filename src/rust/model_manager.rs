use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::Classifier;

/// Tag written into every artifact so foreign JSON files are rejected early.
pub const ARTIFACT_FORMAT: &str = "upi-sms-classifier";
/// Bumped whenever the serialized pipeline layout changes.
pub const ARTIFACT_VERSION: u32 = 1;
/// File stem used when no explicit artifact path is given.
pub const DEFAULT_MODEL_NAME: &str = "upi_sms_model";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported artifact: expected format '{expected}' v{expected_version}, got '{format}' v{version}")]
    UnsupportedFormat {
        expected: &'static str,
        expected_version: u32,
        format: String,
        version: u32,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {path}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// On-disk layout of an artifact. The pipeline is kept as an embedded JSON
/// string so the checksum covers the exact bytes that are parsed on load.
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format: String,
    version: u32,
    checksum: String,
    payload: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Resolves where artifacts live and reads/writes them.
#[derive(Debug, Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("UPI_SMS_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("upi-sms-classifier").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir
                .join(".local")
                .join("share")
                .join("upi-sms-classifier")
                .join("models");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("upi-sms-classifier").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self { models_dir })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(format!("{}.json", name))
    }

    pub fn default_model_path(&self) -> PathBuf {
        self.get_model_path(DEFAULT_MODEL_NAME)
    }

    pub fn is_model_saved(&self, name: &str) -> bool {
        let path = self.get_model_path(name);
        log::debug!("Checking for artifact at {:?} (exists: {})", path, path.exists());
        path.exists()
    }

    /// Serializes `classifier` into a checksummed artifact at `path`.
    ///
    /// The envelope is written to a sibling temp file and renamed into place, so a
    /// failed write never leaves a truncated artifact behind.
    pub fn save(classifier: &Classifier, path: &Path) -> Result<(), ModelError> {
        let payload = serde_json::to_string(classifier)?;
        let envelope = ArtifactEnvelope {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            checksum: sha256_hex(payload.as_bytes()),
            payload,
        };
        let bytes = serde_json::to_vec(&envelope)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            log::debug!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        log::info!("Writing {} bytes to {:?}", bytes.len(), path);
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn read_envelope(path: &Path) -> Result<ArtifactEnvelope, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);
        let envelope: ArtifactEnvelope = serde_json::from_slice(&bytes)?;

        if envelope.format != ARTIFACT_FORMAT || envelope.version != ARTIFACT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                expected: ARTIFACT_FORMAT,
                expected_version: ARTIFACT_VERSION,
                format: envelope.format,
                version: envelope.version,
            });
        }

        let actual = sha256_hex(envelope.payload.as_bytes());
        if actual != envelope.checksum {
            log::error!("Artifact hash mismatch: expected {}, got {}", envelope.checksum, actual);
            return Err(ModelError::HashMismatch {
                path: path.display().to_string(),
                expected: envelope.checksum,
                actual,
            });
        }
        Ok(envelope)
    }

    /// Loads and verifies the artifact at `path`.
    pub fn load(path: &Path) -> Result<Classifier, ModelError> {
        log::info!("Loading model artifact from {:?}", path);
        let envelope = Self::read_envelope(path)?;
        let classifier: Classifier = serde_json::from_str(&envelope.payload)?;
        log::info!(
            "Model loaded: {} classes, {} features",
            classifier.labels().len(),
            classifier.vectorizer().vocabulary_size()
        );
        Ok(classifier)
    }

    /// Checks the format tag and checksum without deserializing the pipeline.
    /// A missing file is reported as `Ok(false)`.
    pub fn verify(path: &Path) -> Result<bool, ModelError> {
        match Self::read_envelope(path) {
            Ok(_) => Ok(true),
            Err(ModelError::NotFound(_)) | Err(ModelError::HashMismatch { .. }) => Ok(false),
            Err(ModelError::UnsupportedFormat { .. }) | Err(ModelError::Serialization(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn save_named(&self, classifier: &Classifier, name: &str) -> Result<PathBuf, ModelError> {
        let path = self.get_model_path(name);
        Self::save(classifier, &path)?;
        Ok(path)
    }

    pub fn load_named(&self, name: &str) -> Result<Classifier, ModelError> {
        Self::load(&self.get_model_path(name))
    }

    pub fn remove(&self, name: &str) -> Result<(), ModelError> {
        let path = self.get_model_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
