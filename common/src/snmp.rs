//! # SNMP Session Settings
//!
//! Version, credentials and transport knobs used to open a session against an
//! agent. Parsing is strict: anything outside the known versions or protocol
//! names is rejected instead of falling back silently.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{SnmpError, SnmpResult};

pub const DEFAULT_PORT: u16 = 161;
pub const DEFAULT_COMMUNITY: &str = "public";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRIES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
    V3,
}

impl FromStr for SnmpVersion {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2c" | "2c" | "v2" | "2" => Ok(Self::V2c),
            "v3" | "3" => Ok(Self::V3),
            _ => Err(SnmpError::UnsupportedVersion(s.to_string())),
        }
    }
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::V1 => "v1",
            Self::V2c => "v2c",
            Self::V3 => "v3",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthProtocol {
    Md5,
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl FromStr for AuthProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha" | "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(SnmpError::Credentials(format!(
                "unknown authentication protocol '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivProtocol {
    Des,
    #[default]
    Aes128,
    Aes192,
    Aes256,
}

impl FromStr for PrivProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "des" => Ok(Self::Des),
            "aes" | "aes128" => Ok(Self::Aes128),
            "aes192" => Ok(Self::Aes192),
            "aes256" => Ok(Self::Aes256),
            _ => Err(SnmpError::Credentials(format!(
                "unknown privacy protocol '{s}'"
            ))),
        }
    }
}

/// USM security level, derived from which keys were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv { auth_key: String },
    AuthPriv { auth_key: String, priv_key: String },
}

#[derive(Debug, Clone)]
pub struct UsmUser {
    pub name: String,
    pub level: SecurityLevel,
    pub auth_protocol: AuthProtocol,
    pub priv_protocol: PrivProtocol,
}

/// Fully validated credentials for one session.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// SNMPv1 / SNMPv2c shared secret.
    Community { version: SnmpVersion, community: String },
    Usm(UsmUser),
}

#[derive(Debug, Clone)]
pub struct SnmpSettings {
    pub version: SnmpVersion,
    pub community: String,
    pub user: Option<String>,
    pub auth_key: Option<String>,
    pub priv_key: Option<String>,
    pub auth_protocol: AuthProtocol,
    pub priv_protocol: PrivProtocol,
    pub port: u16,
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            version: SnmpVersion::default(),
            community: DEFAULT_COMMUNITY.to_string(),
            user: None,
            auth_key: None,
            priv_key: None,
            auth_protocol: AuthProtocol::default(),
            priv_protocol: PrivProtocol::default(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl SnmpSettings {
    /// Resolves the credentials matching `version`.
    ///
    /// For v3 the security level follows the supplied keys; a privacy key
    /// without an authentication key is rejected since USM cannot encrypt
    /// unauthenticated messages.
    pub fn credentials(&self) -> SnmpResult<Credentials> {
        match self.version {
            SnmpVersion::V1 | SnmpVersion::V2c => Ok(Credentials::Community {
                version: self.version,
                community: self.community.clone(),
            }),
            SnmpVersion::V3 => {
                let name = non_blank(&self.user)
                    .map(|name| name.trim().to_string())
                    .ok_or_else(|| SnmpError::Credentials("SNMPv3 requires a user name".into()))?;

                let level = match (non_blank(&self.auth_key), non_blank(&self.priv_key)) {
                    (None, None) => SecurityLevel::NoAuthNoPriv,
                    (Some(auth_key), None) => SecurityLevel::AuthNoPriv { auth_key },
                    (Some(auth_key), Some(priv_key)) => SecurityLevel::AuthPriv { auth_key, priv_key },
                    (None, Some(_)) => {
                        return Err(SnmpError::Credentials(
                            "a privacy key requires an authentication key".into(),
                        ));
                    }
                };

                Ok(Credentials::Usm(UsmUser {
                    name,
                    level,
                    auth_protocol: self.auth_protocol,
                    priv_protocol: self.priv_protocol,
                }))
            }
        }
    }
}

/// Blank means unset. Keys are passed on as typed, spaces included.
fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// One `(oid, value)` pair returned by a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarBind {
    pub oid: String,
    pub value: String,
}
