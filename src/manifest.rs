use log::debug;
use thiserror::Error;

use crate::http::{HttpError, HttpFetcher};

const MANIFEST_FILE_NAME: &str = "go.mod";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to fetch go.mod: {0}")]
    Http(#[from] HttpError),
    #[error("non 200 response: {status}")]
    Status { status: u16 },
    #[error("found {package} but line is malformed: {line:?}")]
    Malformed { package: String, line: String },
    #[error("{package} not found in go.mod")]
    NotFound { package: String },
}

/// Reads dependency declarations from `go.mod` files served by a raw-content host,
/// e.g. `https://raw.githubusercontent.com/<repository>/<ref>/go.mod`.
pub struct ManifestReader<H> {
    http: H,
    base_url: String,
}

impl<H: HttpFetcher> ManifestReader<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        ManifestReader {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn manifest_url(&self, repository: &str, reference: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            repository,
            reference,
            MANIFEST_FILE_NAME
        )
    }

    /// Version of `package` required by `repository` at `reference`.
    pub fn declared_version(
        &self,
        repository: &str,
        reference: &str,
        package: &str,
    ) -> Result<String, ManifestError> {
        let url = self.manifest_url(repository, reference);
        debug!("Fetching {}", url);

        let response = self.http.get(&url)?;
        if !response.is_ok() {
            return Err(ManifestError::Status {
                status: response.status,
            });
        }

        required_version(&response.body, package)
    }
}

/// Finds the version of `package` in the `require` directives of a `go.mod` file.
pub fn required_version(go_mod: &str, package: &str) -> Result<String, ManifestError> {
    let mut in_require_block = false;

    for line in go_mod.lines().map(str::trim) {
        if line.starts_with("require (") {
            in_require_block = true;
            continue;
        }
        if in_require_block && line == ")" {
            in_require_block = false;
            continue;
        }

        if in_require_block {
            let mut fields = line.split_whitespace();
            if fields.next() == Some(package) {
                return fields
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| ManifestError::Malformed {
                        package: package.to_string(),
                        line: line.to_string(),
                    });
            }
        } else if line.starts_with("require") {
            // require k8s.io/api v0.31.1
            let fields: Vec<&str> = line.split_whitespace().collect();
            if let Some(index) = fields.iter().position(|field| *field == package) {
                if let Some(version) = fields.get(index + 1) {
                    return Ok(version.to_string());
                }
            }
        }
    }

    Err(ManifestError::NotFound {
        package: package.to_string(),
    })
}
