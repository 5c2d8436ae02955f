//! Endpoint and credential configuration.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ErrorKind);

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("environment variable {0}: {1}")]
    EnvVar(&'static str, #[source] std::env::VarError),
    #[error(transparent)]
    File(std::io::Error),
    #[error("invalid OSS_CNAME : {0}")]
    InvalidCname(String),
    #[error("invalid json")]
    InvalidJson(#[source] serde_json::Error),
}

/// Endpoint and credentials used to presign a [`PostPolicy`](crate::PostPolicy).
#[derive(Clone, Eq, PartialEq, serde::Deserialize)]
pub struct OssConfig {
    endpoint: String,
    access_key_id: String,
    access_key_secret: String,
    #[serde(default, rename = "cname")]
    is_cname: bool,
}

impl OssConfig {
    /// `endpoint` is a URL such as `https://oss-cn-hangzhou.aliyuncs.com`.
    /// The scheme may be omitted, in which case `https` is used.
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            is_cname: false,
        }
    }

    /// Marks the endpoint as a custom domain bound to a single bucket, so the
    /// bucket name is not added to the URL path.
    pub fn with_cname(mut self, is_cname: bool) -> Self {
        self.is_cname = is_cname;
        self
    }

    /// Reads `OSS_ENDPOINT`, `OSS_ACCESS_KEY_ID`, `OSS_ACCESS_KEY_SECRET` and
    /// the optional `OSS_CNAME` (`true`, `1`, `false`, `0`).
    pub fn from_env() -> Result<Self, Error> {
        fn var(name: &'static str) -> Result<String, Error> {
            std::env::var(name).map_err(|e| Error::from(ErrorKind::EnvVar(name, e)))
        }
        let is_cname = match std::env::var("OSS_CNAME") {
            Ok(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" => false,
                "1" | "true" => true,
                _ => return Err(Error::from(ErrorKind::InvalidCname(s))),
            },
            Err(std::env::VarError::NotPresent) => false,
            Err(e) => return Err(Error::from(ErrorKind::EnvVar("OSS_CNAME", e))),
        };
        let config = Self::new(
            var("OSS_ENDPOINT")?,
            var("OSS_ACCESS_KEY_ID")?,
            var("OSS_ACCESS_KEY_SECRET")?,
        )
        .with_cname(is_cname);
        log::debug!("oss config loaded from environment: {:?}", config);
        Ok(config)
    }

    /// Loads a JSON file:
    ///
    /// ```json
    /// {
    ///   "endpoint": "https://oss-cn-hangzhou.aliyuncs.com",
    ///   "access_key_id": "...",
    ///   "access_key_secret": "...",
    ///   "cname": false
    /// }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path.as_ref()).map_err(ErrorKind::File)?;
        let config = serde_json::from_str::<'_, Self>(&s).map_err(ErrorKind::InvalidJson)?;
        log::debug!(
            "oss config loaded from {}: {:?}",
            path.as_ref().display(),
            config
        );
        Ok(config)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub(crate) fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    pub fn is_cname(&self) -> bool {
        self.is_cname
    }

    pub(crate) fn endpoint_url(&self) -> Result<url::Url, url::ParseError> {
        if self.endpoint.contains("://") {
            url::Url::parse(&self.endpoint)
        } else {
            url::Url::parse(&format!("https://{}", self.endpoint))
        }
    }
}

impl std::fmt::Debug for OssConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OssConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"***")
            .field("is_cname", &self.is_cname)
            .finish()
    }
}
