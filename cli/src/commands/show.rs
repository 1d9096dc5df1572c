use std::net::IpAddr;

use snmpr_common::config::Config;
use snmpr_core::store::{JsonFileStore, RecordStore};

use crate::terminal::{format, print};

pub fn show(ip: IpAddr, cfg: &Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&cfg.database_dir);

    let Some(record) = store.load(ip)? else {
        anyhow::bail!("no record of {ip} in {}", store.dir().display());
    };

    print::header(&format!("record of {ip}"), cfg.quiet);
    print::aligned_line("File", store.path_for(ip).display().to_string());
    print::aligned_line("Values", record.len().to_string());
    print::as_tree_one_level(format::record_to_details(&record));
    Ok(())
}
