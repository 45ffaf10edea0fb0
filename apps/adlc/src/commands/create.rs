//! Create command - pre-stage a computer object

use adlc_core::directory::Directory;
use adlc_core::identifier::InstanceId;
use adlc_core::session::Reconciler;
use clap::Args;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::{Outcome, Report};

/// Arguments for the create command
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// DN of the new computer, e.g. CN=web-9abcdef0,OU=Computers,DC=corp,DC=example,DC=com
    pub dn: String,

    /// Record this instance id on the object so it can be found after a rename
    #[arg(long)]
    pub instance_id: Option<String>,

    /// Extra attribute as name=value; repeat for more values
    #[arg(long = "attr", value_name = "NAME=VALUE")]
    pub attributes: Vec<String>,
}

/// Execute the create command
pub async fn execute<D: Directory>(
    reconciler: &Reconciler<D>,
    config: &AppConfig,
    args: CreateArgs,
) -> CliResult<Report> {
    let mut attributes = parse_attributes(&args.attributes)?;

    if let Some(raw) = &args.instance_id {
        let id = InstanceId::parse(raw).map_err(adlc_core::error::LifecycleError::from)?;
        push_value(
            &mut attributes,
            &config.lifecycle.instance_id_attribute,
            id.to_string(),
        );
    }

    let created = reconciler.create(&args.dn, &attributes).await?;
    Ok(Report::new(
        "create",
        args.dn,
        Outcome::Changed {
            action: "Created",
            dn: created.dn.to_string(),
        },
    ))
}

/// Group `name=value` pairs by attribute name, keeping first-seen order.
pub fn parse_attributes(pairs: &[String]) -> CliResult<Vec<(String, Vec<String>)>> {
    let mut attributes = Vec::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .map(|(name, value)| (name.trim(), value))
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| {
                CliError::Validation(format!("attribute '{pair}' is not in NAME=VALUE form"))
            })?;
        push_value(&mut attributes, name, value.to_string());
    }
    Ok(attributes)
}

fn push_value(attributes: &mut Vec<(String, Vec<String>)>, name: &str, value: String) {
    match attributes
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some((_, values)) => values.push(value),
        None => attributes.push((name.to_string(), vec![value])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_groups_values() {
        let pairs = vec![
            "dNSHostName=web-9abcdef0.corp.example.com".to_string(),
            "servicePrincipalName=HOST/web-9abcdef0".to_string(),
            "servicePrincipalName=HOST/web-9abcdef0.corp.example.com".to_string(),
        ];
        let attributes = parse_attributes(&pairs).unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].0, "dNSHostName");
        assert_eq!(attributes[1].1.len(), 2);
    }

    #[test]
    fn test_parse_attributes_keeps_equals_in_value() {
        let attributes = parse_attributes(&["info=a=b".to_string()]).unwrap();
        assert_eq!(attributes[0].1, vec!["a=b".to_string()]);
    }

    #[test]
    fn test_parse_attributes_rejects_malformed() {
        for bad in ["novalue", "=value"] {
            let err = parse_attributes(&[bad.to_string()]).unwrap_err();
            assert_eq!(err.exit_code(), 4, "{bad}");
        }
    }
}
