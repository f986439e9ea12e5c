use std::collections::HashSet;

/// How a route combines its required capability codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityMode {
    All,
    Any,
}

/// Capability requirement declared per route as a const.
#[derive(Clone, Copy, Debug)]
pub struct RequiredCapabilities {
    pub mode: CapabilityMode,
    pub codes: &'static [&'static str],
}

impl RequiredCapabilities {
    pub const fn all(codes: &'static [&'static str]) -> Self {
        Self {
            mode: CapabilityMode::All,
            codes,
        }
    }

    pub const fn any(codes: &'static [&'static str]) -> Self {
        Self {
            mode: CapabilityMode::Any,
            codes,
        }
    }
}

/// Effective permission set of a principal. A role with is_superuser set
/// resolves to `All`; call sites never inspect the flag themselves.
#[derive(Clone, Debug)]
pub enum PermissionGrant {
    All,
    Codes(HashSet<String>),
}

impl PermissionGrant {
    /// Pure allow/deny decision. An empty requirement means no restriction.
    pub fn allows(&self, required: &RequiredCapabilities) -> bool {
        if required.codes.is_empty() {
            return true;
        }
        match self {
            PermissionGrant::All => true,
            PermissionGrant::Codes(granted) => match required.mode {
                CapabilityMode::All => required.codes.iter().all(|code| granted.contains(*code)),
                CapabilityMode::Any => required.codes.iter().any(|code| granted.contains(*code)),
            },
        }
    }
}

#[cfg(test)]
mod test_allows {
    use super::*;

    fn codes(list: &[&str]) -> PermissionGrant {
        PermissionGrant::Codes(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_requirement_always_allows() {
        let required = RequiredCapabilities::all(&[]);
        assert!(PermissionGrant::All.allows(&required));
        assert!(codes(&[]).allows(&required));
        assert!(codes(&["leaves.view"]).allows(&required));
    }

    #[test]
    fn test_superuser_grant_bypasses_capability_check() {
        let required = RequiredCapabilities::all(&["leaves.view", "leaves.update"]);
        assert!(PermissionGrant::All.allows(&required));
    }

    #[test]
    fn test_all_mode_requires_every_code() {
        let required = RequiredCapabilities::all(&["leaves.view", "leaves.update"]);
        assert!(!codes(&["leaves.view"]).allows(&required));
        assert!(codes(&["leaves.view", "leaves.update"]).allows(&required));
        assert!(codes(&["leaves.view", "leaves.update", "leaves.delete"]).allows(&required));
    }

    #[test]
    fn test_any_mode_requires_one_code() {
        let required = RequiredCapabilities::any(&["leaves.view", "leaves.update"]);
        assert!(codes(&["leaves.view"]).allows(&required));
        assert!(codes(&["leaves.update"]).allows(&required));
        assert!(!codes(&["roles.view"]).allows(&required));
        assert!(!codes(&[]).allows(&required));
    }

    #[test]
    fn test_no_roles_denies_everything_gated() {
        let granted = codes(&[]);
        assert!(!granted.allows(&RequiredCapabilities::all(&["users.view"])));
        assert!(!granted.allows(&RequiredCapabilities::any(&["users.view", "users.update"])));
    }
}
