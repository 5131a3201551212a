use anyhow::Result;
use serde::Serialize;

pub fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_yaml::to_string(value)?;
    print!("{output}");
    Ok(())
}
