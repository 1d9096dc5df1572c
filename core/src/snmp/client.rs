use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use snmp2::v3::{self, Auth, Cipher, Security};
use snmp2::{AsyncSession, Oid, Pdu, Value};
use tokio::time::timeout;
use tracing::debug;

use snmpr_common::error::{SnmpError, SnmpResult};
use snmpr_common::snmp::{
    AuthProtocol, Credentials, PrivProtocol, SecurityLevel, SnmpSettings, SnmpVersion, UsmUser,
    VarBind,
};
use snmpr_protocols::snmp::{check_error_status, exception_reason, parse_oid, render_value};

use super::{AgentConnector, SnmpAgent};

const BULK_MAX_REPETITIONS: u32 = 10;
/// v1 agents answer a GETNEXT past the last object with noSuchName.
const NO_SUCH_NAME: u32 = 2;

#[derive(Clone, Copy)]
enum Request<'a> {
    Get(&'a Oid<'a>),
    GetNext(&'a Oid<'a>),
    GetBulk(&'a Oid<'a>),
}

/// One page of a walk.
#[derive(Default)]
struct WalkStep {
    rows: Vec<(Oid<'static>, String)>,
    done: bool,
}

pub struct SnmpClient {
    session: AsyncSession,
    version: SnmpVersion,
    target: String,
    timeout: Duration,
    retries: u32,
}

impl SnmpClient {
    /// Opens a session to `addr`. For v3 this includes engine discovery.
    pub async fn connect(addr: SocketAddr, settings: &SnmpSettings) -> SnmpResult<Self> {
        let target = addr.to_string();
        let transport_err = |e: &dyn std::fmt::Display| SnmpError::Transport {
            target: target.clone(),
            source: io::Error::other(e.to_string()),
        };

        let session = match settings.credentials()? {
            Credentials::Community { version: SnmpVersion::V1, community } => {
                AsyncSession::new_v1(addr, community.as_bytes(), 0)
                    .await
                    .map_err(|e| transport_err(&e))?
            }
            Credentials::Community { community, .. } => {
                AsyncSession::new_v2c(addr, community.as_bytes(), 0)
                    .await
                    .map_err(|e| transport_err(&e))?
            }
            Credentials::Usm(user) => {
                let mut session = AsyncSession::new_v3(addr, 0, usm_security(&user))
                    .await
                    .map_err(|e| transport_err(&e))?;

                match timeout(settings.timeout, session.init()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => return Err(SnmpError::Indication(e.to_string())),
                    Err(_) => {
                        return Err(SnmpError::Timeout {
                            target: target.clone(),
                            oid: "engine discovery".into(),
                        });
                    }
                }
                session
            }
        };

        debug!("Opened {} session to {target}", settings.version);

        Ok(Self {
            session,
            version: settings.version,
            target,
            timeout: settings.timeout,
            retries: settings.retries,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Sends one request, retrying on timeout, and hands the PDU to `read`.
    async fn request<T>(
        &mut self,
        oid: &str,
        request: Request<'_>,
        read: impl Fn(Pdu<'_>) -> SnmpResult<T>,
    ) -> SnmpResult<T> {
        let attempts = self.retries.saturating_add(1);

        for attempt in 1..=attempts {
            let sent = match request {
                Request::Get(name) => timeout(self.timeout, self.session.get(name)).await,
                Request::GetNext(name) => timeout(self.timeout, self.session.getnext(name)).await,
                Request::GetBulk(name) => {
                    timeout(
                        self.timeout,
                        self.session.getbulk(&[name], 0, BULK_MAX_REPETITIONS),
                    )
                    .await
                }
            };

            match sent {
                Ok(Ok(pdu)) => return read(pdu),
                Ok(Err(snmp2::Error::AuthUpdated)) => {
                    debug!("{}: engine time resynchronised, resending", self.target);
                }
                // connected socket: an ICMP port-unreachable surfaces here
                Ok(Err(e @ (snmp2::Error::Send | snmp2::Error::Receive))) => {
                    return Err(SnmpError::Transport {
                        target: self.target.clone(),
                        source: io::Error::other(e.to_string()),
                    });
                }
                Ok(Err(e)) => return Err(SnmpError::Indication(e.to_string())),
                Err(_) => debug!(
                    "{}: attempt {attempt}/{attempts} for {oid} timed out",
                    self.target
                ),
            }
        }

        Err(SnmpError::Timeout { target: self.target.clone(), oid: oid.to_string() })
    }

    pub async fn get(&mut self, oid: &str) -> SnmpResult<String> {
        let name = parse_oid(oid)?;
        self.request(oid, Request::Get(&name), |pdu| read_value(pdu, oid)).await
    }

    pub async fn walk(&mut self, oid: &str) -> SnmpResult<Vec<VarBind>> {
        let root = parse_oid(oid)?;
        let mut cursor = root.clone();
        let mut last = arcs(oid);
        let mut rows: Vec<VarBind> = Vec::new();

        loop {
            let is_v1 = self.version == SnmpVersion::V1;
            let request = if is_v1 { Request::GetNext(&cursor) } else { Request::GetBulk(&cursor) };
            let step = self
                .request(oid, request, |pdu| read_walk_step(pdu, &root, oid, is_v1))
                .await?;

            for (name, value) in step.rows {
                let key = name.to_string();
                let current = arcs(&key);
                if current <= last {
                    debug!("{}: walk of {oid} stopped at non-advancing OID {key}", self.target);
                    return Ok(rows);
                }
                rows.push(VarBind { oid: key, value });
                last = current;
                cursor = name;
            }

            if step.done {
                return Ok(rows);
            }
        }
    }
}

#[async_trait]
impl SnmpAgent for SnmpClient {
    async fn get(&mut self, oid: &str) -> SnmpResult<String> {
        SnmpClient::get(self, oid).await
    }

    async fn walk(&mut self, oid: &str) -> SnmpResult<Vec<VarBind>> {
        SnmpClient::walk(self, oid).await
    }
}

/// Opens [`SnmpClient`]s on the configured port with the configured credentials.
pub struct SessionConnector {
    settings: SnmpSettings,
}

impl SessionConnector {
    /// Fails early when the credentials cannot form a session.
    pub fn new(settings: SnmpSettings) -> SnmpResult<Self> {
        settings.credentials()?;
        Ok(Self { settings })
    }
}

#[async_trait]
impl AgentConnector for SessionConnector {
    async fn connect(&self, ip: IpAddr) -> SnmpResult<Box<dyn SnmpAgent>> {
        let addr = SocketAddr::new(ip, self.settings.port);
        let client = SnmpClient::connect(addr, &self.settings).await?;
        Ok(Box::new(client))
    }
}

fn read_value(mut pdu: Pdu<'_>, oid: &str) -> SnmpResult<String> {
    check_error_status(pdu.error_status, pdu.error_index, &[oid])?;

    let (_, value) = pdu
        .varbinds
        .next()
        .ok_or_else(|| SnmpError::EmptyResponse(oid.to_string()))?;

    if let Some(reason) = exception_reason(&value) {
        return Err(SnmpError::NoValue { oid: oid.to_string(), reason });
    }
    Ok(render_value(&value))
}

fn read_walk_step(pdu: Pdu<'_>, root: &Oid<'_>, oid: &str, is_v1: bool) -> SnmpResult<WalkStep> {
    if is_v1 && pdu.error_status == NO_SUCH_NAME {
        return Ok(WalkStep { rows: Vec::new(), done: true });
    }
    check_error_status(pdu.error_status, pdu.error_index, &[oid])?;

    let mut step = WalkStep::default();
    for (name, value) in pdu.varbinds {
        if matches!(value, Value::EndOfMibView) || !name.starts_with(root) {
            step.done = true;
            break;
        }
        step.rows.push((name.to_owned(), render_value(&value)));
    }

    if step.rows.is_empty() {
        step.done = true;
    }
    Ok(step)
}

/// Numeric arcs of a dotted OID; `Vec` ordering is OID ordering.
fn arcs(oid: &str) -> Vec<u64> {
    oid.split('.').filter_map(|arc| arc.parse().ok()).collect()
}

fn usm_security(user: &UsmUser) -> Security {
    let (auth_key, auth) = match &user.level {
        SecurityLevel::NoAuthNoPriv => ("", Auth::NoAuthNoPriv),
        SecurityLevel::AuthNoPriv { auth_key } => (auth_key.as_str(), Auth::AuthNoPriv),
        SecurityLevel::AuthPriv { auth_key, priv_key } => (
            auth_key.as_str(),
            Auth::AuthPriv {
                cipher: cipher(user.priv_protocol),
                privacy_password: priv_key.as_bytes().to_vec(),
            },
        ),
    };

    Security::new(user.name.as_bytes(), auth_key.as_bytes())
        .with_auth_protocol(auth_protocol(user.auth_protocol))
        .with_auth(auth)
}

fn auth_protocol(protocol: AuthProtocol) -> v3::AuthProtocol {
    match protocol {
        AuthProtocol::Md5 => v3::AuthProtocol::Md5,
        AuthProtocol::Sha1 => v3::AuthProtocol::Sha1,
        AuthProtocol::Sha224 => v3::AuthProtocol::Sha224,
        AuthProtocol::Sha256 => v3::AuthProtocol::Sha256,
        AuthProtocol::Sha384 => v3::AuthProtocol::Sha384,
        AuthProtocol::Sha512 => v3::AuthProtocol::Sha512,
    }
}

fn cipher(protocol: PrivProtocol) -> Cipher {
    match protocol {
        PrivProtocol::Des => Cipher::Des,
        PrivProtocol::Aes128 => Cipher::Aes128,
        PrivProtocol::Aes192 => Cipher::Aes192,
        PrivProtocol::Aes256 => Cipher::Aes256,
    }
}
