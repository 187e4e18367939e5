//! The viewer's "address bar": a path, a query string and a hash fragment
//! that can be read on startup and replaced in place afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{NaipError, NaipResult};

/// Origin used to resolve relative hrefs; never shown to the user
const LOCAL_ORIGIN: &str = "http://localhost/";

/// A location split the way `window.location` exposes it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationParts {
    pub pathname: String,
    /// Query string including the leading `?`, or empty
    pub search: String,
    /// Fragment including the leading `#`, or empty
    pub hash: String,
}

impl LocationParts {
    /// Split a `path?query#hash` string. Never fails; missing parts are empty
    /// and a missing path becomes `/`.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.find('#') {
            Some(idx) => (&href[..idx], &href[idx..]),
            None => (href, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        Self {
            pathname: if pathname.is_empty() { "/".to_string() } else { pathname.to_string() },
            search: if search == "?" { String::new() } else { search.to_string() },
            hash: if hash == "#" { String::new() } else { hash.to_string() },
        }
    }

    /// Accept either an absolute URL (as copied from a browser) or a
    /// relative href, and keep only path, query and fragment.
    pub fn from_url_str(input: &str) -> NaipResult<Self> {
        let url = Url::parse(LOCAL_ORIGIN)
            .and_then(|base| base.join(input))
            .map_err(|source| NaipError::InvalidLocation {
                href: input.to_string(),
                source,
            })?;

        Ok(Self {
            pathname: url.path().to_string(),
            search: url
                .query()
                .filter(|q| !q.is_empty())
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            hash: url
                .fragment()
                .filter(|f| !f.is_empty())
                .map(|f| format!("#{f}"))
                .unwrap_or_default(),
        })
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

impl Default for LocationParts {
    fn default() -> Self {
        Self::parse("/")
    }
}

/// Read and replace access to the current location.
///
/// Replacing never navigates and never adds a history entry; it only records
/// the new href.
pub trait Location {
    fn get_location(&self) -> LocationParts;

    fn replace_location(&mut self, href: &str) -> NaipResult<()>;

    fn href(&self) -> String {
        self.get_location().href()
    }
}

/// Location held in memory for the lifetime of the session
#[derive(Clone, Debug, Default)]
pub struct MemoryLocation {
    parts: LocationParts,
}

impl MemoryLocation {
    pub fn new(href: &str) -> Self {
        Self {
            parts: LocationParts::parse(href),
        }
    }

    pub fn from_parts(parts: LocationParts) -> Self {
        Self { parts }
    }
}

impl Location for MemoryLocation {
    fn get_location(&self) -> LocationParts {
        self.parts.clone()
    }

    fn replace_location(&mut self, href: &str) -> NaipResult<()> {
        self.parts = LocationParts::parse(href);
        Ok(())
    }
}

/// Location persisted as a single href line, so the view survives restarts
#[derive(Debug)]
pub struct FileLocation {
    path: PathBuf,
    parts: LocationParts,
}

impl FileLocation {
    /// Open the state file. An explicit `seed` wins over the file contents
    /// and is written back immediately; otherwise a missing or empty file
    /// starts at `/`.
    pub fn open(path: impl AsRef<Path>, seed: Option<LocationParts>) -> NaipResult<Self> {
        let path = path.as_ref().to_path_buf();

        match seed {
            Some(parts) => {
                let href = parts.href();
                let mut location = Self { path, parts };
                location.replace_location(&href)?;
                Ok(location)
            }
            None => {
                let parts = match fs::read_to_string(&path) {
                    Ok(content) if !content.trim().is_empty() => LocationParts::parse(content.trim()),
                    Ok(_) => LocationParts::default(),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => LocationParts::default(),
                    Err(err) => return Err(err.into()),
                };
                Ok(Self { path, parts })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Location for FileLocation {
    fn get_location(&self) -> LocationParts {
        self.parts.clone()
    }

    fn replace_location(&mut self, href: &str) -> NaipResult<()> {
        self.parts = LocationParts::parse(href);
        fs::write(&self.path, format!("{}\n", self.parts.href()))?;
        Ok(())
    }
}
