use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;

/// Type-erased, possibly decompressed response body.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// A response whose body has not been read yet.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the whole body, capped at the client's size limit.
    ///
    /// # Errors
    /// Returns [`HttpError::BodyTooLarge`] past the limit, or
    /// [`HttpError::Transport`] if the stream fails.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_limited(self.inner, self.max_body_size).await
    }

    /// Split into status, headers and the capped body.
    ///
    /// # Errors
    /// Same as [`bytes`](Self::bytes).
    pub async fn into_parts(self) -> Result<(StatusCode, HeaderMap, Bytes), HttpError> {
        let status = self.inner.status();
        let headers = self.inner.headers().clone();
        let body = self.bytes().await?;
        Ok((status, headers, body))
    }
}

/// Counts decompressed bytes, so compressed payloads cannot bypass the cap.
async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(body: &'static str, limit: usize) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| match never {})
            .boxed();
        HttpResponse {
            inner: Response::builder().status(201).body(body).unwrap(),
            max_body_size: limit,
        }
    }

    #[tokio::test]
    async fn reads_within_limit() {
        let (status, _, body) = response("{}", 16).into_parts().await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, Bytes::from_static(b"{}"));
    }

    #[tokio::test]
    async fn rejects_over_limit() {
        let err = response("0123456789", 4).bytes().await.unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 4, actual: 10 }));
    }
}
