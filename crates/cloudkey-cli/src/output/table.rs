use anyhow::Result;
use cloudkey_core::Profile;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Color, Table};

use super::{VISIBLE_KEY_CHARS, obfuscate};

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

/// Profile listing; the current profile is highlighted.
pub fn profiles_table<'a>(profiles: impl IntoIterator<Item = &'a Profile>, wide: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);

    let mut header = vec!["CLOUD", "NAME", "ACCESS KEY ID", "SOURCE"];
    if wide {
        header.extend(["ACCOUNT", "ARN"]);
    }
    table.set_header(header);

    for profile in profiles {
        let mut row = vec![
            profile.cloud.clone(),
            profile.name.clone(),
            obfuscate(&profile.cred.access_key_id, VISIBLE_KEY_CHARS),
            profile.source.to_string(),
        ];
        if wide {
            let identity = profile.identity.as_ref();
            row.push(identity.map(|i| i.account.clone()).unwrap_or_default());
            row.push(identity.map(|i| i.arn.clone()).unwrap_or_default());
        }

        table.add_row(row.into_iter().map(|value| {
            let cell = Cell::new(value);
            if profile.is_current {
                cell.fg(Color::Yellow)
            } else {
                cell
            }
        }));
    }

    table
}
