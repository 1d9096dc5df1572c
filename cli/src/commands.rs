pub mod get;
pub mod scan;
pub mod show;
pub mod sweep;
pub mod walk;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use snmpr_common::config::{Config, DEFAULT_CONCURRENCY, DEFAULT_DATABASE_DIR};
use snmpr_common::network::target::Target;
use snmpr_common::oid::{self, SYS_DESCR};
use snmpr_common::snmp::{AuthProtocol, PrivProtocol, SnmpSettings, SnmpVersion};
use snmpr_core::snmp::Operation;

#[derive(Parser)]
#[command(name = "snmpr", version)]
#[command(about = "Sweep a network and collect SNMP data from every host that answers.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat for even less (-qq)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ping sweep a network and list the hosts that answer
    #[command(alias = "p")]
    Sweep {
        target: Target,
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Sweep, poll every live host over SNMP and store one record per host
    #[command(alias = "s")]
    Scan {
        target: Target,
        /// Only ask for sysDescr
        #[arg(long)]
        quick: bool,
        #[command(flatten)]
        sweep: SweepArgs,
        #[command(flatten)]
        store: StoreArgs,
        /// Hosts polled at the same time (1 polls one after the other)
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
        #[command(flatten)]
        snmp: SnmpArgs,
    },
    /// Read a single OID from a host
    #[command(alias = "g")]
    Get {
        host: String,
        /// Numeric OID or catalogue name (sysName, ifNumber, ...)
        #[arg(default_value = SYS_DESCR.oid)]
        oid: String,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        snmp: SnmpArgs,
    },
    /// Read every OID below a subtree
    #[command(alias = "w")]
    Walk {
        host: String,
        oid: String,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        snmp: SnmpArgs,
    },
    /// Run an operation given by name (get or walk)
    Query {
        operation: Operation,
        host: String,
        oid: String,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        snmp: SnmpArgs,
    },
    /// Print the stored record of a host
    Show {
        host: IpAddr,
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Clone, Debug)]
pub struct SweepArgs {
    /// How long to wait for echo replies after the last request, in ms
    #[arg(long = "ping-timeout", value_name = "MS", default_value_t = 2000)]
    pub ping_timeout_ms: u64,
}

#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Directory holding one <ip>.json record per host
    #[arg(long, env = "SNMPR_DATABASE", default_value = DEFAULT_DATABASE_DIR)]
    pub database: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct SnmpArgs {
    /// v1, v2c or v3
    #[arg(long = "snmp-version", env = "SNMP_VERSION", default_value = "v2c")]
    pub snmp_version: SnmpVersion,

    #[arg(short, long, env = "SNMP_COMMUNITY", default_value = "public", hide_env_values = true)]
    pub community: String,

    /// SNMPv3 user name
    #[arg(short, long, env = "SNMP_USER")]
    pub user: Option<String>,

    /// SNMPv3 authentication key; enables authNoPriv
    #[arg(long, env = "SNMP_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// SNMPv3 privacy key; with an auth key enables authPriv
    #[arg(long, env = "SNMP_PRIV_KEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// md5, sha1, sha224, sha256, sha384 or sha512
    #[arg(long, env = "SNMP_AUTH_PROTOCOL", default_value = "sha1")]
    pub auth_protocol: AuthProtocol,

    /// des, aes128, aes192 or aes256
    #[arg(long, env = "SNMP_PRIV_PROTOCOL", default_value = "aes128")]
    pub priv_protocol: PrivProtocol,

    #[arg(short, long, env = "SNMP_PORT", default_value_t = 161)]
    pub port: u16,

    /// Per-request timeout, in ms
    #[arg(long = "timeout", value_name = "MS", default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Resends after a timeout
    #[arg(long, default_value_t = 1)]
    pub retries: u32,
}

impl SnmpArgs {
    pub fn settings(&self) -> SnmpSettings {
        SnmpSettings {
            version: self.snmp_version,
            community: self.community.clone(),
            user: self.user.clone(),
            auth_key: self.auth_key.clone(),
            priv_key: self.priv_key.clone(),
            auth_protocol: self.auth_protocol,
            priv_protocol: self.priv_protocol,
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut cfg = Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            ..Config::default()
        };

        match &self.command {
            Commands::Sweep { sweep, .. } => {
                cfg.ping_timeout = Duration::from_millis(sweep.ping_timeout_ms);
            }
            Commands::Scan { sweep, store, concurrency, .. } => {
                cfg.ping_timeout = Duration::from_millis(sweep.ping_timeout_ms);
                cfg.database_dir = store.database.clone();
                cfg.concurrency = *concurrency;
            }
            Commands::Show { store, .. } => cfg.database_dir = store.database.clone(),
            Commands::Get { .. } | Commands::Walk { .. } | Commands::Query { .. } => {}
        }
        cfg
    }
}

/// Resolves `host` (address or name) to the agent's socket address.
pub async fn resolve_agent(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolving '{host}'"))?
        .next()
        .with_context(|| format!("'{host}' has no address"))
}

/// Catalogue names stand in for their numeric OID.
pub fn resolve_oid(arg: &str) -> &str {
    oid::by_name(arg).map_or(arg, |entry| entry.oid)
}
