//! Dependency installation
//!
//! The build only decides *whether* to install. [`Installer`] does the work.
//! The default [`FetchInstaller`] fetches the artifact, verifies its sha256
//! against the catalog and places it in the layer directory. The previous
//! layer contents are only replaced after verification succeeds.

use crate::error::{PylayerError, PylayerResult};
use crate::refinery::MatchedDependency;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Installs a matched dependency into a layer directory
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, dependency: &MatchedDependency, layer_dir: &Path)
        -> PylayerResult<()>;
}

/// Fetches `http(s)://` and `file://` artifacts and verifies their checksum
#[derive(Debug, Clone)]
pub struct FetchInstaller {
    timeout: Duration,
    retries: u32,
}

impl FetchInstaller {
    pub fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }

    /// Fetch `uri` into `dest`, returning the sha256 hex digest
    async fn fetch(&self, uri: &str, dest: &Path) -> std::io::Result<String> {
        if let Some(path) = local_path(uri) {
            let bytes = fs::read(&path).await?;
            fs::write(dest, &bytes).await?;
            return Ok(hex::encode(Sha256::digest(&bytes)));
        }

        let mut attempt = 0;
        loop {
            let uri_owned = uri.to_string();
            let dest_owned = dest.to_path_buf();
            let timeout = self.timeout;

            let result =
                tokio::task::spawn_blocking(move || fetch_http(&uri_owned, &dest_owned, timeout))
                    .await
                    .map_err(std::io::Error::other)?;

            match result {
                Ok(digest) => return Ok(digest),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Fetching {} failed ({}), retry {}/{}",
                        uri, e, attempt, self.retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for FetchInstaller {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), 2)
    }
}

#[async_trait]
impl Installer for FetchInstaller {
    async fn install(
        &self,
        dependency: &MatchedDependency,
        layer_dir: &Path,
    ) -> PylayerResult<()> {
        let version = dependency.version.to_string();
        let parent = layer_dir.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await.map_err(|e| {
            PylayerError::install(&version, format!("creating {}: {}", parent.display(), e))
        })?;

        let file_name = artifact_name(&dependency.uri);
        let staging = staging_path(layer_dir);

        debug!("Fetching {} into {}", dependency.uri, staging.display());
        let digest = match self.fetch(&dependency.uri, &staging).await {
            Ok(digest) => digest,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                return Err(PylayerError::install(
                    &version,
                    format!("fetching {}: {}", dependency.uri, e),
                ));
            }
        };

        let expected = dependency.sha256_hex();
        if digest != expected {
            let _ = fs::remove_file(&staging).await;
            return Err(PylayerError::ChecksumMismatch {
                version,
                uri: dependency.uri.clone(),
                expected,
                actual: digest,
            });
        }

        replace_layer_contents(layer_dir, &staging, &file_name)
            .await
            .map_err(|e| PylayerError::install(&version, e))?;

        debug!("Installed {} into {}", file_name, layer_dir.display());
        Ok(())
    }
}

/// Swap the verified artifact into a fresh layer directory
async fn replace_layer_contents(
    layer_dir: &Path,
    staging: &Path,
    file_name: &str,
) -> std::io::Result<()> {
    if layer_dir.exists() {
        fs::remove_dir_all(layer_dir).await?;
    }
    fs::create_dir_all(layer_dir).await?;
    fs::rename(staging, layer_dir.join(file_name)).await
}

fn fetch_http(uri: &str, dest: &Path, timeout: Duration) -> std::io::Result<String> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let mut response = agent.get(uri).call().map_err(std::io::Error::other)?;
    let mut reader = response.body_mut().as_reader();
    let mut file = std::fs::File::create(dest)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])?;
    }
    file.flush()?;

    Ok(hex::encode(hasher.finalize()))
}

/// `file:///x` or a bare path; `None` for remote URIs
fn local_path(uri: &str) -> Option<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") {
        return None;
    }
    Some(PathBuf::from(uri))
}

/// Last path segment of the URI, without query string
fn artifact_name(uri: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .filter(|s| !s.contains(':'))
        .unwrap_or("artifact")
        .to_string()
}

fn staging_path(layer_dir: &Path) -> PathBuf {
    let name = layer_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string());
    layer_dir.with_file_name(format!(".{}.download", name))
}
