use cloudkey_core::{CloudkeyError, RemoteErrorCode};
use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(err) = err.downcast_ref::<CloudkeyError>() {
        print_suggestion(err);
    }

    std::process::exit(1);
}

fn suggestion(err: &CloudkeyError) -> Option<Vec<String>> {
    let lines = match err {
        CloudkeyError::CredentialNotFound => vec![
            "Configure a credential with:".to_string(),
            format!("{} aws configure", "$".dimmed()),
        ],
        CloudkeyError::ProfileNotFound(_) => vec![
            "List available profiles with:".to_string(),
            format!("{} cloudkey list", "$".dimmed()),
        ],
        CloudkeyError::UnknownSource(_) => {
            vec!["Valid sources are \"env\" and \"file\".".to_string()]
        }
        CloudkeyError::TooManyKeys { user, .. } => vec![
            "Delete the access key you no longer use, then rotate again:".to_string(),
            format!(
                "{} aws iam list-access-keys --user-name {}",
                "$".dimmed(),
                user
            ),
            format!(
                "{} aws iam delete-access-key --user-name {} --access-key-id <id>",
                "$".dimmed(),
                user
            ),
        ],
        CloudkeyError::UnsupportedIdentityType { .. } => vec![
            "Temporary and role credentials are rotated by whatever issued them.".to_string(),
            "Select a profile that holds an IAM user's access key.".to_string(),
        ],
        CloudkeyError::Remote(remote) => match remote.code {
            RemoteErrorCode::AccessDenied => vec![
                "The IAM user needs iam:ListAccessKeys, iam:CreateAccessKey,".to_string(),
                "iam:UpdateAccessKey and iam:DeleteAccessKey on itself.".to_string(),
            ],
            RemoteErrorCode::InvalidClientTokenId => {
                vec!["The access key is unknown to AWS or has been deactivated.".to_string()]
            }
            _ => return None,
        },
        _ => return None,
    };
    Some(lines)
}

fn print_suggestion(err: &CloudkeyError) {
    if let Some(lines) = suggestion(err) {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        for line in lines {
            eprintln!("  {line}");
        }
    }
}
