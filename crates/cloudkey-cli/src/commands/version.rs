use anyhow::Result;
use serde::Serialize;

use crate::cli::{VersionArgs, VersionFormat};
use crate::output::json::print_json;
use crate::output::yaml::print_yaml;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Serialize, PartialEq, Eq)]
struct BuildInfo {
    version: &'static str,
    commit: &'static str,
    date: &'static str,
}

/// Build information baked in at compile time
fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("CLOUDKEY_BUILD_COMMIT").unwrap_or(UNKNOWN),
        date: option_env!("CLOUDKEY_BUILD_DATE").unwrap_or(UNKNOWN),
    }
}

pub fn run(args: VersionArgs) -> Result<()> {
    let info = build_info();

    if args.short {
        println!("{}", info.version);
        return Ok(());
    }

    match args.output {
        VersionFormat::Json => print_json(&info),
        VersionFormat::Yaml => print_yaml(&info),
    }
}
