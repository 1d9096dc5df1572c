use snmpr_common::config::Config;
use snmpr_common::snmp::SnmpSettings;
use snmpr_core::snmp::Operation;

use crate::commands::get;

pub async fn walk(host: &str, oid: &str, json: bool, settings: SnmpSettings, cfg: &Config) -> anyhow::Result<()> {
    get::run(host, Operation::Walk, oid, json, settings, cfg).await
}
