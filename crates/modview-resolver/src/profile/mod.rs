//! Profile download and decoding

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use modview_core::error::ModviewError;
use modview_core::utils::archive_file_name;
use modview_core::Manifest;
use modview_registry::RegistryClient;
use modview_transport::{decode_archive, decode_payload};

use crate::ResolverResult;

/// A decoded profile, ready to render before any enrichment
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// Identifier the profile was fetched with
    pub identifier: String,
    /// Decoded manifest
    pub manifest: Manifest,
    /// Raw zip archive carried by the export
    pub archive: Vec<u8>,
}

impl ResolvedProfile {
    /// File name used when saving the archive
    pub fn archive_file_name(&self) -> String {
        archive_file_name(&self.manifest.profile_name)
    }

    /// Write the archive as `<dir>/<profileName>.zip`
    pub async fn save_archive(&self, dir: &Utf8Path) -> ResolverResult<Utf8PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ModviewError::io(format!("Failed to create directory {}", dir), e))?;

        let path = dir.join(self.archive_file_name());
        tokio::fs::write(&path, &self.archive)
            .await
            .map_err(|e| ModviewError::io(format!("Failed to write {}", path), e))?;

        info!("Saved profile archive to {}", path);
        Ok(path)
    }
}

/// Fetches profiles by identifier
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    client: Arc<RegistryClient>,
}

impl ProfileResolver {
    pub fn new(client: Arc<RegistryClient>) -> Self {
        Self { client }
    }

    /// Download and decode the profile published under `identifier`.
    ///
    /// Surrounding whitespace is ignored; an empty identifier is rejected
    /// before any request is made.
    pub async fn fetch_profile(&self, identifier: &str) -> ResolverResult<ResolvedProfile> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ModviewError::InvalidIdentifier);
        }

        let raw = self.client.fetch_profile_payload(identifier).await?;
        debug!("Received {} byte export for {}", raw.len(), identifier);

        let archive = decode_payload(&raw)?;
        let manifest = decode_archive(&archive)?;

        info!(
            "Loaded profile '{}' with {} mods",
            manifest.profile_name,
            manifest.mods.len()
        );

        Ok(ResolvedProfile {
            identifier: identifier.to_string(),
            manifest,
            archive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modview_core::{ModEntry, ModVersion};
    use modview_registry::ClientConfig;
    use modview_transport::{encode_profile, PROFILE_HEADER};
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> ProfileResolver {
        let client = RegistryClient::with_config(ClientConfig {
            registry_url: format!("{}/", server.uri()),
            relay: String::new(),
            ..ClientConfig::default()
        })
        .unwrap();
        ProfileResolver::new(Arc::new(client))
    }

    fn sample_manifest() -> Manifest {
        let mut manifest = Manifest::new("Test", "r2modman");
        manifest
            .mods
            .push(ModEntry::new("Author-ModA", true, ModVersion::new(1, 0, 0)));
        manifest
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let server = MockServer::start().await;
        let payload = encode_profile(&sample_manifest(), PROFILE_HEADER).unwrap();

        Mock::given(method("GET"))
            .and(path("/api/experimental/legacyprofile/get/abc123/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
            .expect(1)
            .mount(&server)
            .await;

        let profile = resolver_for(&server).fetch_profile(" abc123 ").await.unwrap();

        assert_eq!(profile.identifier, "abc123");
        assert_eq!(profile.manifest, sample_manifest());
        assert_eq!(decode_archive(&profile.archive).unwrap(), sample_manifest());
        assert_eq!(profile.archive_file_name(), "Test.zip");
    }

    #[tokio::test]
    async fn test_empty_identifier_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = resolver_for(&server).fetch_profile("   ").await;
        assert!(matches!(result, Err(ModviewError::InvalidIdentifier)));
    }

    #[tokio::test]
    async fn test_malformed_export_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/experimental/legacyprofile/get/abc123/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("no newline here"))
            .mount(&server)
            .await;

        let result = resolver_for(&server).fetch_profile("abc123").await;
        assert!(matches!(result, Err(ModviewError::MalformedTransport { .. })));
    }

    #[tokio::test]
    async fn test_unknown_profile_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = resolver_for(&server).fetch_profile("missing").await;
        assert!(matches!(
            result,
            Err(ModviewError::Unreachable {
                status: Some(404),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_save_archive() {
        let temp_dir = tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().join("out")).unwrap();

        let mut manifest = sample_manifest();
        manifest.profile_name = "My/Profile".to_string();
        let profile = ResolvedProfile {
            identifier: "abc123".to_string(),
            manifest,
            archive: vec![1, 2, 3],
        };

        let saved = profile.save_archive(&dir).await.unwrap();
        assert_eq!(saved.file_name(), Some("My_Profile.zip"));
        assert_eq!(std::fs::read(&saved).unwrap(), vec![1, 2, 3]);
    }
}
