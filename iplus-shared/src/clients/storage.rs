use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client as S3Client;

/// S3-compatible object store. Rows keep the full public URL; the key is
/// recovered from the URL when an old object has to be deleted on replace.
#[derive(Clone)]
pub struct StorageClient {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl StorageClient {
    /// Build the client without touching the network.
    pub fn configure(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "iplus");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(config),
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let client = Self::configure(endpoint, access_key, secret_key, bucket, public_url);

        // Ensure bucket exists
        let _ = client.client.create_bucket().bucket(&client.bucket).send().await;

        tracing::info!(endpoint = %endpoint, bucket = %client.bucket, "object storage client initialized");

        client
    }

    /// Upload an object and return its public URL.
    pub async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| format!("upload failed: {e}"))?;

        Ok(format!("{}/{}/{}", self.public_url, self.bucket, key))
    }

    pub async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| format!("delete failed: {e}"))?;

        Ok(())
    }

    /// Best-effort delete of the object a stored URL points at. Callers do
    /// not treat a failure here as fatal; replacement uploads still proceed.
    pub async fn delete_by_url(&self, url: &str) {
        match self.key_from_url(url) {
            Some(key) => {
                if let Err(e) = self.delete(&key).await {
                    tracing::warn!(url = %url, error = %e, "failed to delete old object");
                }
            }
            None => tracing::warn!(url = %url, "stored URL does not belong to this bucket"),
        }
    }

    /// Recover the object key from a public URL produced by `upload`.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.public_url, self.bucket);
        url.strip_prefix(&prefix).map(|k| k.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StorageClient {
        StorageClient::configure(
            "http://localhost:9000",
            "k",
            "s",
            "iplus",
            "http://localhost:9000",
        )
    }

    #[test]
    fn key_roundtrips_through_url() {
        let client = test_client();
        let url = "http://localhost:9000/iplus/ican/42/photo.jpg";
        assert_eq!(client.key_from_url(url).as_deref(), Some("ican/42/photo.jpg"));
    }

    #[test]
    fn foreign_url_yields_no_key() {
        let client = test_client();
        assert_eq!(client.key_from_url("https://elsewhere.example/img.png"), None);
    }
}
