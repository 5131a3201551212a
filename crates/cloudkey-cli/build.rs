use clap::CommandFactory;
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

mod cli {
    include!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/cli.rs"));
}

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?;
    Some(commit.trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CLOUDKEY_BUILD_COMMIT");
    println!("cargo:rerun-if-env-changed=CLOUDKEY_BUILD_DATE");

    if std::env::var("CLOUDKEY_BUILD_COMMIT").is_err()
        && let Some(commit) = git_commit()
    {
        println!("cargo:rustc-env=CLOUDKEY_BUILD_COMMIT={commit}");
    }

    let out_dir = PathBuf::from("man");
    fs::create_dir_all(&out_dir).unwrap();

    let cmd = cli::Cli::command();

    let mut buffer = Vec::new();
    Man::new(cmd.clone()).render(&mut buffer).unwrap();
    fs::write(out_dir.join("cloudkey.1"), buffer).unwrap();

    for subcommand in cmd.get_subcommands() {
        let name = subcommand.get_name();
        let mut buffer = Vec::new();
        Man::new(subcommand.clone()).render(&mut buffer).unwrap();
        fs::write(out_dir.join(format!("cloudkey-{}.1", name)), buffer).unwrap();
    }
}
