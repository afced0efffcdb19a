use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

/// Copies exported PDFs to an S3 (or MinIO) bucket under `resumes/`.
#[derive(Clone)]
pub struct PdfArchive {
    s3: S3Client,
    bucket: String,
}

impl PdfArchive {
    pub fn new(s3: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            s3,
            bucket: bucket.into(),
        }
    }

    pub fn key_for(filename: &str) -> String {
        format!("resumes/{filename}")
    }

    /// Uploads `pdf` and returns its object key.
    pub async fn upload(&self, filename: &str, pdf: Bytes) -> Result<String, AppError> {
        let key = Self::key_for(filename);
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(pdf))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Archived PDF to s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}
