// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

use crate::{Error, Result};

use nix::unistd::{Gid, Group, Uid, User};

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

fn lookup_user(user: &str) -> Result<(Uid, Option<Gid>)> {
    let entry = if let Ok(id) = user.parse::<u32>() {
        let uid = Uid::from_raw(id);
        match User::from_uid(uid) {
            Ok(Some(u)) => Some(u),
            // Numeric ids do not need a passwd entry.
            Ok(None) => return Ok((uid, None)),
            Err(e) => return Err(Error::Config(format!("Failed to look up user {}: {}", user, e))),
        }
    } else {
        User::from_name(user)
            .map_err(|e| Error::Config(format!("Failed to look up user {}: {}", user, e)))?
    };

    entry
        .map(|u| (u.uid, Some(u.gid)))
        .ok_or_else(|| Error::Config(format!("Unknown user \"{}\".", user)))
}

fn lookup_group(group: &str) -> Result<Gid> {
    if let Ok(id) = group.parse::<u32>() {
        return Ok(Gid::from_raw(id));
    }

    Group::from_name(group)
        .map_err(|e| Error::Config(format!("Failed to look up group {}: {}", group, e)))?
        .map(|g| g.gid)
        .ok_or_else(|| Error::Config(format!("Unknown group \"{}\".", group)))
}

// ----------------------------------------------------------------------
// - Credentials:
// ----------------------------------------------------------------------

/// User and group a `Command` runs as
///
/// `None` keeps the id of the current process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The user id
    pub uid: Option<Uid>,
    /// The group id
    pub gid: Option<Gid>,
}

impl Credentials {
    /// Resolve `user` and `group` names (or numeric ids)
    ///
    /// Without an explicit `group` the primary group of `user` is used.
    ///
    /// # Errors
    /// `Error::Config` if the user or group does not exist
    #[tracing::instrument(level = "trace")]
    pub fn resolve(user: Option<&str>, group: Option<&str>) -> Result<Self> {
        let (uid, primary_gid) = match user {
            Some(u) => {
                let (uid, gid) = lookup_user(u)?;
                (Some(uid), gid)
            }
            None => (None, None),
        };
        let gid = match group {
            Some(g) => Some(lookup_group(g)?),
            None => primary_gid,
        };

        tracing::debug!("Resolved credentials: uid {:?}, gid {:?}.", uid, gid);
        Ok(Self { uid, gid })
    }

    /// `true` if neither user nor group get changed
    #[must_use]
    pub const fn is_inherited(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

impl std::fmt::Display for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_inherited() {
            return write!(f, "inherited credentials");
        }
        write!(
            f,
            "uid {}, gid {}",
            self.uid.map_or_else(|| "-".to_string(), |u| u.to_string()),
            self.gid.map_or_else(|| "-".to_string(), |g| g.to_string()),
        )
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn credentials_inherited() {
        let creds = Credentials::resolve(None, None).unwrap();
        assert!(creds.is_inherited());
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn credentials_numeric_ids() {
        let uid = Uid::current();
        let creds = Credentials::resolve(Some(&uid.to_string()), Some("12345")).unwrap();
        assert_eq!(creds.uid, Some(uid));
        assert_eq!(creds.gid, Some(Gid::from_raw(12345)));
    }

    #[test]
    fn credentials_by_name() {
        let root = Credentials::resolve(Some("root"), Some("root")).unwrap();
        assert_eq!(root.uid, Some(Uid::from_raw(0)));
        assert_eq!(root.gid, Some(Gid::from_raw(0)));

        let primary = Credentials::resolve(Some("root"), None).unwrap();
        assert_eq!(primary.gid, Some(Gid::from_raw(0)));
    }

    #[test]
    fn credentials_unknown() {
        assert!(Credentials::resolve(Some("_non_existent_user"), None).is_err());
        assert!(Credentials::resolve(None, Some("_non_existent_group")).is_err());
    }

    #[test]
    fn run_as_current_user() {
        let creds = Credentials::resolve(
            Some(&Uid::current().to_string()),
            Some(&Gid::current().to_string()),
        )
        .unwrap();
        let outcome = crate::CommandBuilder::new(Path::new("/bin/true"))
            .credentials(creds)
            .build()
            .status()
            .unwrap();
        assert!(outcome.success());
    }
}
