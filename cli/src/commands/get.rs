use snmpr_common::config::Config;
use snmpr_common::snmp::SnmpSettings;
use snmpr_core::snmp::{Operation, SnmpClient, SnmpResponse, execute};

use crate::commands::{resolve_agent, resolve_oid};
use crate::terminal::{colors, print};
use colored::*;

/// Runs one operation against `host` and prints the answer.
pub async fn run(
    host: &str,
    operation: Operation,
    oid: &str,
    json: bool,
    settings: SnmpSettings,
    cfg: &Config,
) -> anyhow::Result<()> {
    let oid = resolve_oid(oid);
    let addr = resolve_agent(host, settings.port).await?;

    let mut client = SnmpClient::connect(addr, &settings).await?;
    let response = execute(&mut client, operation, oid).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&json_body(&response))?);
        return Ok(());
    }

    print::header(&format!("{operation} {}", client.target()), cfg.quiet);
    match response {
        SnmpResponse::Value(value) => print::aligned_line(oid, value),
        SnmpResponse::Rows(rows) if rows.is_empty() => {
            snmpr_common::warn!("Nothing below {oid}");
        }
        SnmpResponse::Rows(rows) => {
            for row in rows {
                print::print(&format!("{} = {}", row.oid.color(colors::OID), row.value));
            }
        }
    }
    Ok(())
}

pub async fn get(host: &str, oid: &str, json: bool, settings: SnmpSettings, cfg: &Config) -> anyhow::Result<()> {
    run(host, Operation::Get, oid, json, settings, cfg).await
}

fn json_body(response: &SnmpResponse) -> serde_json::Value {
    serde_json::json!({ "status": response })
}
