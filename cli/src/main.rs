mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, get, scan, show, sweep, walk};
use snmpr_common::error;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init_logging();
    print::banner(cfg.no_banner, cfg.quiet);

    let result = match commands.command {
        Commands::Sweep { target, .. } => {
            print::header("getting ready for the sweep", cfg.quiet);
            sweep::sweep(target, &cfg).await
        }
        Commands::Scan { target, quick, snmp, .. } => {
            print::header("starting SNMP scan", cfg.quiet);
            scan::scan(target, quick, snmp.settings(), &cfg).await
        }
        Commands::Get { host, oid, json, snmp } => {
            get::get(&host, &oid, json, snmp.settings(), &cfg).await
        }
        Commands::Walk { host, oid, json, snmp } => {
            walk::walk(&host, &oid, json, snmp.settings(), &cfg).await
        }
        Commands::Query { operation, host, oid, json, snmp } => {
            get::run(&host, operation, &oid, json, snmp.settings(), &cfg).await
        }
        Commands::Show { host, .. } => show::show(host, &cfg),
    };

    match result {
        Ok(()) => {
            print::end_of_program(cfg.quiet);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
