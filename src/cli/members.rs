//! Grant and revoke commands.
//!
//! Members are sorted and deduplicated before they are applied, so the
//! result and the echoed list do not depend on flag order.

use crate::cli::output;
use crate::core::context::Context;
use crate::core::reference::parse_locator;
use crate::core::store::{GrantRequest, LocalStore, Member, RevokeRequest};
use crate::error::{InputError, Result};

/// Add recipients to a secret.
pub fn grant(store: &LocalStore, ctx: &Context, secret: &str, members: &[String]) -> Result<()> {
    let reference = parse_locator(secret)?;
    let members = parse_members(members)?;
    if let Some(member) = members.iter().find(|m| m.key.is_none()) {
        return Err(InputError::InvalidMember {
            member: member.label.clone(),
            reason: "expected <label>=<age public key>".to_string(),
        }
        .into());
    }

    store.grant(
        ctx,
        &GrantRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            members: members.clone(),
        },
    )?;

    output::success(&format!("granted access to {}", reference));
    for member in &members {
        output::kv("+", member);
    }
    Ok(())
}

/// Remove recipients from a secret.
pub fn revoke(store: &LocalStore, ctx: &Context, secret: &str, members: &[String]) -> Result<()> {
    let reference = parse_locator(secret)?;
    let members = parse_members(members)?;

    store.revoke(
        ctx,
        &RevokeRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            members: members.clone(),
        },
    )?;

    output::success(&format!("revoked access to {}", reference));
    for member in &members {
        output::kv("-", &member.label);
    }
    Ok(())
}

fn parse_members(raw: &[String]) -> std::result::Result<Vec<Member>, InputError> {
    let mut members = raw
        .iter()
        .map(|m| Member::parse(m))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    members.sort();
    members.dedup();
    Ok(members)
}
