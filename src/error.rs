#[derive(Debug)]
pub struct Error {
    message: String,
}

impl Error {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// A resource could not be retrieved from disk or over the network.
#[derive(Debug)]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to retrieve {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for FetchError {}

/// An image referenced by the asset is absent or cannot be decoded.
#[derive(Debug)]
pub struct MissingTextureError {
    pub source: String,
    pub reason: String,
}

impl MissingTextureError {
    pub fn new(source: &str, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for MissingTextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to load image {}: {}", self.source, self.reason)
    }
}

impl std::error::Error for MissingTextureError {}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    NoRootAsset,
    AmbiguousRoot(Vec<String>),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NoRootAsset => write!(f, "No .gltf or .glb asset found."),
            ResolveError::AmbiguousRoot(keys) => write!(
                f,
                "Multiple .gltf or .glb assets found, drop only one: {}",
                keys.join(", ")
            ),
        }
    }
}

impl std::error::Error for ResolveError {}
