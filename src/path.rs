use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("unknown scheme {scheme:?} in {path:?}")]
    UnknownScheme { scheme: String, path: String },
}

/// Archive container formats the engine can open members of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveScheme {
    Zip,
    Tar,
    Gzip,
}

impl ArchiveScheme {
    fn parse(scheme: &str) -> Option<Self> {
        match scheme {
            "zip" => Some(ArchiveScheme::Zip),
            "tar" => Some(ArchiveScheme::Tar),
            "gzip" => Some(ArchiveScheme::Gzip),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ArchiveScheme::Zip => "zip",
            ArchiveScheme::Tar => "tar",
            ArchiveScheme::Gzip => "gzip",
        }
    }

    fn vsi_prefix(&self) -> &'static str {
        match self {
            ArchiveScheme::Zip => "/vsizip",
            ArchiveScheme::Tar => "/vsitar",
            ArchiveScheme::Gzip => "/vsigzip",
        }
    }
}

/// Network transports and object stores the engine can stream from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteScheme {
    Http,
    Https,
    Ftp,
    S3,
    Gs,
    Az,
    Oss,
}

impl RemoteScheme {
    fn parse(scheme: &str) -> Option<Self> {
        match scheme {
            "http" => Some(RemoteScheme::Http),
            "https" => Some(RemoteScheme::Https),
            "ftp" => Some(RemoteScheme::Ftp),
            "s3" => Some(RemoteScheme::S3),
            "gs" => Some(RemoteScheme::Gs),
            "az" => Some(RemoteScheme::Az),
            "oss" => Some(RemoteScheme::Oss),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RemoteScheme::Http => "http",
            RemoteScheme::Https => "https",
            RemoteScheme::Ftp => "ftp",
            RemoteScheme::S3 => "s3",
            RemoteScheme::Gs => "gs",
            RemoteScheme::Az => "az",
            RemoteScheme::Oss => "oss",
        }
    }

    /// Curl transports keep the full URL, object stores drop the scheme.
    fn to_vsi(self, url: &str) -> String {
        match self {
            RemoteScheme::Http | RemoteScheme::Https | RemoteScheme::Ftp => {
                format!("/vsicurl/{url}")
            }
            RemoteScheme::S3 => format!("/vsis3/{}", strip_scheme(url)),
            RemoteScheme::Gs => format!("/vsigs/{}", strip_scheme(url)),
            RemoteScheme::Az => format!("/vsiaz/{}", strip_scheme(url)),
            RemoteScheme::Oss => format!("/vsioss/{}", strip_scheme(url)),
        }
    }
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

/// A dataset location, resolved once at the boundary instead of sniffing
/// path-like strings at every call site.
///
/// `Archive` nests another location so forms like
/// `zip+https://host/a.zip!b.tif` compose. Engine-specific connection
/// strings pass through untouched as `Local`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetPath {
    Local(PathBuf),
    Archive {
        scheme: ArchiveScheme,
        archive: Box<DatasetPath>,
        member: Option<String>,
    },
    Remote {
        scheme: RemoteScheme,
        url: String,
    },
    Memory(String),
}

impl DatasetPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if let Some(name) = path.strip_prefix("/vsimem/") {
            return Ok(DatasetPath::Memory(name.to_string()));
        }
        let Some((scheme, rest)) = path.split_once("://") else {
            return Ok(DatasetPath::Local(PathBuf::from(path)));
        };
        if let Some((archive_scheme, transport)) = scheme.split_once('+') {
            let (archive_scheme, transport) = match (
                ArchiveScheme::parse(archive_scheme),
                RemoteScheme::parse(transport),
            ) {
                (Some(archive_scheme), Some(transport)) => (archive_scheme, transport),
                _ => {
                    return Err(PathError::UnknownScheme {
                        scheme: scheme.to_string(),
                        path: path.to_string(),
                    })
                }
            };
            let (archive, member) = split_member(rest);
            return Ok(DatasetPath::Archive {
                scheme: archive_scheme,
                archive: Box::new(DatasetPath::Remote {
                    scheme: transport,
                    url: format!("{}://{archive}", transport.as_str()),
                }),
                member,
            });
        }
        if let Some(archive_scheme) = ArchiveScheme::parse(scheme) {
            let (archive, member) = split_member(rest);
            return Ok(DatasetPath::Archive {
                scheme: archive_scheme,
                archive: Box::new(DatasetPath::Local(PathBuf::from(archive))),
                member,
            });
        }
        if let Some(remote_scheme) = RemoteScheme::parse(scheme) {
            return Ok(DatasetPath::Remote {
                scheme: remote_scheme,
                url: path.to_string(),
            });
        }
        if scheme == "file" {
            return Ok(DatasetPath::Local(PathBuf::from(rest)));
        }
        Err(PathError::UnknownScheme {
            scheme: scheme.to_string(),
            path: path.to_string(),
        })
    }

    pub fn is_local(&self) -> bool {
        match self {
            DatasetPath::Local(_) | DatasetPath::Memory(_) => true,
            DatasetPath::Remote { .. } => false,
            DatasetPath::Archive { archive, .. } => archive.is_local(),
        }
    }

    /// The engine's virtual-filesystem rendering of this location.
    pub fn vsi_path(&self) -> String {
        match self {
            DatasetPath::Local(path) => path.display().to_string(),
            DatasetPath::Memory(name) => format!("/vsimem/{name}"),
            DatasetPath::Remote { scheme, url } => scheme.to_vsi(url),
            DatasetPath::Archive {
                scheme,
                archive,
                member,
            } => {
                let mut vsi = format!("{}/{}", scheme.vsi_prefix(), archive.vsi_path());
                if let Some(member) = member {
                    vsi.push('/');
                    vsi.push_str(member);
                }
                vsi
            }
        }
    }
}

fn split_member(rest: &str) -> (String, Option<String>) {
    match rest.split_once('!') {
        Some((archive, member)) => (archive.to_string(), Some(member.to_string())),
        None => (rest.to_string(), None),
    }
}

impl fmt::Display for DatasetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetPath::Local(path) => write!(f, "{}", path.display()),
            DatasetPath::Memory(name) => write!(f, "/vsimem/{name}"),
            DatasetPath::Remote { url, .. } => write!(f, "{url}"),
            DatasetPath::Archive {
                scheme,
                archive,
                member,
            } => {
                match archive.as_ref() {
                    DatasetPath::Remote { url, .. } => {
                        write!(f, "{}+{url}", scheme.as_str())?
                    }
                    other => write!(f, "{}://{other}", scheme.as_str())?,
                }
                if let Some(member) = member {
                    write!(f, "!{member}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for DatasetPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, PathError> {
        DatasetPath::parse(path)
    }
}

impl From<&Path> for DatasetPath {
    fn from(path: &Path) -> Self {
        DatasetPath::Local(path.to_path_buf())
    }
}

impl From<PathBuf> for DatasetPath {
    fn from(path: PathBuf) -> Self {
        DatasetPath::Local(path)
    }
}
