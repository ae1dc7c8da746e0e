use crate::api::models::StreetViewImage;
use crate::api::BackendApi;
use crate::errors::{SearchError, SearchResult};
use crate::images::format_capture_date;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// A fetched street view image, materialised as a local file.
///
/// The file lives exactly as long as the handle: [`release`](Self::release)
/// or drop deletes it.
#[derive(Debug)]
pub struct ImageHandle {
    id: u64,
    file: NamedTempFile,
    address: String,
    content_type: Option<String>,
    capture_date: Option<String>,
    size: usize,
}

impl ImageHandle {
    fn materialize(
        id: u64,
        address: &str,
        image: StreetViewImage,
        dir: Option<&Path>,
    ) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix("street-view-")
            .suffix(extension_for(image.content_type.as_deref()));

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&image.bytes)?;
        file.flush()?;

        let capture_date = image.capture_date.as_deref().and_then(|raw| {
            let formatted = format_capture_date(raw);
            if formatted.is_none() {
                warn!(raw, "ignoring unparseable capture date");
            }
            formatted
        });

        Ok(Self {
            id,
            file,
            address: address.to_string(),
            content_type: image.content_type,
            capture_date,
            size: image.bytes.len(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Local path a renderer can open.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Already formatted, e.g. "May, 2019".
    pub fn capture_date(&self) -> Option<&str> {
        self.capture_date.as_deref()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Frees the backing file now instead of at drop.
    pub fn release(self) {
        let id = self.id;
        if let Err(e) = self.file.close() {
            warn!(id, error = %e, "failed to remove street view image");
        } else {
            debug!(id, "street view image released");
        }
    }
}

/// Owns the single live [`ImageHandle`] of a details view.
#[derive(Debug, Default)]
pub struct ImageManager {
    current: Option<ImageHandle>,
    next_id: u64,
    dir: Option<PathBuf>,
    last_error: Option<String>,
}

impl ImageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep image files under `dir` instead of the system temp dir.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&ImageHandle> {
        self.current.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetches the image for `address` and installs it as the live handle.
    ///
    /// The previous handle is released only once new bytes are in hand, and
    /// before the new file is created. On failure nothing is installed and
    /// the previous handle stays as it was.
    pub async fn acquire<B>(&mut self, api: &B, address: &str) -> SearchResult<&ImageHandle>
    where
        B: BackendApi + ?Sized,
    {
        self.last_error = None;

        let image = match api.street_view(address).await {
            Ok(image) if image.bytes.is_empty() => Err("empty image body".to_string()),
            Ok(image) => Ok(image),
            Err(e) => Err(SearchError::from(e).to_string()),
        };

        let image = match image {
            Ok(image) => image,
            Err(msg) => {
                warn!(address, error = %msg, "street view fetch failed");
                return Err(self.failed(msg));
            }
        };

        self.release();

        self.next_id += 1;
        let handle = match ImageHandle::materialize(self.next_id, address, image, self.dir.as_deref())
        {
            Ok(handle) => handle,
            Err(e) => return Err(self.failed(e.to_string())),
        };

        info!(id = handle.id, address, bytes = handle.size, "🖼️ street view image ready");
        Ok(&*self.current.insert(handle))
    }

    /// Releases the live handle, if any. Returns whether one was released.
    pub fn release(&mut self) -> bool {
        match self.current.take() {
            Some(handle) => {
                handle.release();
                true
            }
            None => false,
        }
    }

    fn failed(&mut self, msg: String) -> SearchError {
        self.last_error = Some(msg.clone());
        SearchError::Resource(msg)
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type.map(|c| c.split(';').next().unwrap_or(c).trim()) {
        Some("image/jpeg") | Some("image/jpg") => ".jpg",
        Some("image/png") => ".png",
        Some("image/webp") => ".webp",
        _ => ".img",
    }
}
