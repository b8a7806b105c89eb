//! Reading request documents (JSON or TOML) from disk.

use std::path::Path;

use tracing::debug;

use crate::domain::NondisclosureRequest;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Read and parse a request file. The format follows the file extension;
/// anything but `.toml` is read as JSON.
pub fn load_request(fs: &dyn FileSystem, path: &Path) -> InfraResult<NondisclosureRequest> {
    debug!("load_request: path={}", path.display());
    let content = fs
        .read_to_string(path)
        .map_err(|e| InfraError::io(format!("read request {}", path.display()), e))?;

    let is_toml = path.extension().map(|ext| ext == "toml").unwrap_or(false);
    let parsed: Result<NondisclosureRequest, String> = if is_toml {
        toml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| InfraError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
