use axum::extract::multipart::Field;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};

/// Upload size cap, matching the 25 MB limit the API has always enforced.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Which content types a given upload slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedMedia {
    /// Still images only (profile photos, listing images).
    ImageOnly,
    /// Images plus video (inspire media).
    ImageOrVideo,
}

/// A fully buffered multipart file field.
#[derive(Debug)]
pub struct Upload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub ext: &'static str,
}

pub fn extension_for(content_type: &str, allowed: AllowedMedia) -> Option<&'static str> {
    let image_ext = match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    };

    match allowed {
        AllowedMedia::ImageOnly => image_ext,
        AllowedMedia::ImageOrVideo => image_ext.or(match content_type {
            "video/mp4" => Some("mp4"),
            "video/quicktime" => Some("mov"),
            "video/webm" => Some("webm"),
            "video/x-msvideo" => Some("avi"),
            "video/x-matroska" => Some("mkv"),
            _ => None,
        }),
    }
}

/// Buffer one multipart file field, validating its content type and size.
pub async fn read_upload(field: Field<'_>, allowed: AllowedMedia) -> AppResult<Upload> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let ext = extension_for(&content_type, allowed).ok_or_else(|| {
        AppError::new(
            ErrorCode::UploadFailed,
            format!("unsupported content type: {content_type}"),
        )
    })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::UploadFailed, format!("failed to read file data: {e}")))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::new(ErrorCode::PayloadTooLarge, "file exceeds the 25MB limit"));
    }

    Ok(Upload {
        data: data.to_vec(),
        content_type,
        ext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{DefaultBodyLimit, Multipart};
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    async fn receive_media(mut multipart: Multipart) -> AppResult<StatusCode> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::new(ErrorCode::UploadFailed, e.to_string()))?
        {
            if field.name() == Some("media") {
                read_upload(field, AllowedMedia::ImageOrVideo).await?;
                return Ok(StatusCode::CREATED);
            }
        }
        Ok(StatusCode::UNPROCESSABLE_ENTITY)
    }

    // Same body-limit layer the server installs in main.
    fn media_router() -> Router {
        Router::new()
            .route("/media", post(receive_media))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    }

    fn png_upload(size: usize) -> (String, Vec<u8>) {
        let boundary = "X-IPLUS-TEST-BOUNDARY";
        let mut body = Vec::with_capacity(size + 512);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"media\"; \
                 filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&vec![0u8; size]);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    async fn post_media(size: usize) -> StatusCode {
        let (content_type, body) = png_upload(size);
        media_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/media")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn accepts_files_larger_than_the_framework_default() {
        // 3 MB sits above axum's built-in 2 MB body limit but under the cap.
        assert_eq!(post_media(3 * 1024 * 1024).await, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rejects_files_over_the_cap() {
        let status = post_media(MAX_UPLOAD_BYTES + 1024).await;
        assert!(status.is_client_error(), "got {status}");
    }

    #[test]
    fn image_slots_reject_video() {
        assert_eq!(extension_for("image/png", AllowedMedia::ImageOnly), Some("png"));
        assert_eq!(extension_for("video/mp4", AllowedMedia::ImageOnly), None);
        assert_eq!(extension_for("application/pdf", AllowedMedia::ImageOnly), None);
    }

    #[test]
    fn media_slots_accept_both() {
        assert_eq!(extension_for("image/jpeg", AllowedMedia::ImageOrVideo), Some("jpg"));
        assert_eq!(extension_for("video/mp4", AllowedMedia::ImageOrVideo), Some("mp4"));
        assert_eq!(extension_for("video/x-matroska", AllowedMedia::ImageOrVideo), Some("mkv"));
        assert_eq!(extension_for("text/plain", AllowedMedia::ImageOrVideo), None);
    }
}
