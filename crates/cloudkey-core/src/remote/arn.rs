//! ARN parsing: `arn:<partition>:<service>:<region>:<account>:<resource>`

use crate::error::{CloudkeyError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" || parts[5].is_empty() {
            return Err(CloudkeyError::InvalidArn(value.to_string()));
        }

        Ok(Self {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }

    /// First `/` segment of the resource ("user", "assumed-role", ...)
    pub fn resource_type(&self) -> &str {
        self.resource.split('/').next().unwrap_or_default()
    }

    /// Last `/` segment of the resource
    pub fn resource_name(&self) -> &str {
        self.resource.rsplit('/').next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_arn() {
        let arn = Arn::parse("arn:aws:iam::123456789012:user/alice").unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "iam");
        assert_eq!(arn.region, "");
        assert_eq!(arn.account, "123456789012");
        assert_eq!(arn.resource_type(), "user");
        assert_eq!(arn.resource_name(), "alice");
    }

    #[test]
    fn test_parse_user_with_path() {
        let arn = Arn::parse("arn:aws:iam::123456789012:user/division/alice").unwrap();
        assert_eq!(arn.resource_type(), "user");
        assert_eq!(arn.resource_name(), "alice");
    }

    #[test]
    fn test_parse_assumed_role() {
        let arn =
            Arn::parse("arn:aws:sts::123456789012:assumed-role/deploy-role/session").unwrap();
        assert_eq!(arn.service, "sts");
        assert_eq!(arn.resource_type(), "assumed-role");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Arn::parse("not-an-arn").unwrap_err(),
            CloudkeyError::InvalidArn(_)
        ));
        assert!(Arn::parse("arn:aws:iam::123456789012").is_err());
        assert!(Arn::parse("arn:aws:iam::123456789012:").is_err());
    }
}
