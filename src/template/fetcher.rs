use futures::StreamExt;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error_handling::types::TemplateError;

/// A downloaded template image on the local filesystem.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
}

impl TemplateFile {
    pub fn new(path: PathBuf) -> Self {
        TemplateFile { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the downloaded image. Called on the success path only; a
    /// failed run leaves the file behind.
    pub async fn remove(self) -> Result<(), TemplateError> {
        debug!("Removing template file {}", self.path.display());
        fs::remove_file(&self.path).await?;
        Ok(())
    }
}

/// Streams the template image at `url` into `dest_dir`, named after the
/// last path segment of the URL.
pub async fn fetch_template(url: &str, dest_dir: &Path) -> Result<TemplateFile, TemplateError> {
    let path = dest_dir.join(file_name_from_url(url));
    info!("Downloading template {} to {}", url, path.display());

    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        return Err(TemplateError::HttpStatus(status, url.to_string()));
    }

    let mut file = fs::File::create(&path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }
    file.sync_all().await?;

    debug!("Template stored at {}", path.display());
    Ok(TemplateFile::new(path))
}

fn file_name_from_url(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("template.tar.zst")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url(
                "http://download.proxmox.com/images/system/ubuntu-22.04-standard_22.04-1_amd64.tar.zst"
            ),
            "ubuntu-22.04-standard_22.04-1_amd64.tar.zst"
        );
        assert_eq!(file_name_from_url("http://host/"), "template.tar.zst");
    }

    #[tokio::test]
    async fn test_remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.tar.zst");
        fs::write(&path, b"not a real template").await.unwrap();

        let template = TemplateFile::new(path.clone());
        template.remove().await.unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = TemplateFile::new(dir.path().join("never-downloaded.tar.zst"));

        let err = tokio_test::block_on(template.remove()).unwrap_err();

        assert!(matches!(err, TemplateError::IoError(_)));
    }
}
