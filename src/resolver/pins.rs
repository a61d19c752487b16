//! `Package.resolved` decoding.
//!
//! Xcode records the exact state every remote package was resolved to in
//! `project.xcworkspace/xcshareddata/swiftpm/Package.resolved`. Two layouts
//! exist:
//!
//! - version 1: `{ "object": { "pins": [ { "package", "repositoryURL", "state" } ] } }`
//! - version 2 and 3: `{ "pins": [ { "identity", "kind", "location", "state" } ] }`

use serde::{Deserialize, Serialize};

use crate::core::{PinState, RepositoryUrl};

/// Resolution file format versions this crate understands.
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 1..=3;

/// All pins of a resolution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPins {
    version: u32,
    pins: Vec<Pin>,
}

/// One resolved package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    /// Lowercased package identity
    pub identity: String,
    /// Display name; only version 1 files record it
    pub name: Option<String>,
    pub location: RepositoryUrl,
    pub kind: PinKind,
    pub state: PinState,
}

/// Where a pinned package was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PinKind {
    RemoteSourceControl,
    LocalSourceControl,
    Registry,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct ResolvedV1 {
    object: ObjectV1,
}

#[derive(Deserialize)]
struct ObjectV1 {
    pins: Vec<PinV1>,
}

#[derive(Deserialize)]
struct PinV1 {
    package: String,
    #[serde(rename = "repositoryURL")]
    repository_url: String,
    state: PinState,
}

#[derive(Deserialize)]
struct ResolvedV2 {
    pins: Vec<PinV2>,
}

#[derive(Deserialize)]
struct PinV2 {
    identity: String,
    #[serde(default = "default_kind")]
    kind: PinKind,
    location: String,
    state: PinState,
}

fn default_kind() -> PinKind {
    PinKind::RemoteSourceControl
}

impl ResolvedPins {
    /// Decode the contents of a `Package.resolved` file.
    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        let header: Header = serde_json::from_slice(bytes)?;

        let pins = match header.version {
            1 => {
                let file: ResolvedV1 = serde_json::from_slice(bytes)?;
                file.object
                    .pins
                    .into_iter()
                    .map(|pin| Pin {
                        identity: pin.package.to_lowercase(),
                        name: Some(pin.package),
                        location: RepositoryUrl::new(pin.repository_url),
                        kind: PinKind::RemoteSourceControl,
                        state: pin.state,
                    })
                    .collect()
            }
            version if SUPPORTED_VERSIONS.contains(&version) => {
                let file: ResolvedV2 = serde_json::from_slice(bytes)?;
                file.pins
                    .into_iter()
                    .map(|pin| Pin {
                        identity: pin.identity,
                        name: None,
                        location: RepositoryUrl::new(pin.location),
                        kind: pin.kind,
                        state: pin.state,
                    })
                    .collect()
            }
            version => {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "unsupported Package.resolved version {}",
                    version
                )))
            }
        };

        Ok(ResolvedPins {
            version: header.version,
            pins,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Find the pin for a repository, comparing canonical locations.
    pub fn find(&self, url: &RepositoryUrl) -> Option<&Pin> {
        let key = url.canonical();
        self.pins.iter().find(|pin| pin.location.canonical() == key)
    }
}
