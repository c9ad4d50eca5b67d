use super::text_enum;

text_enum! {
    pub enum ClanRole("clan role") {
        Member => "member",
        Leader => "leader",
        Owner => "owner",
    }
}

impl ClanRole {
    /// Owners and leaders may remove regular members.
    #[must_use]
    pub const fn can_kick(self) -> bool {
        matches!(self, Self::Owner | Self::Leader)
    }
}

/// Tags are 2-6 ASCII alphanumerics, stored upper-case.
#[must_use]
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if (2..=6).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(tag.to_ascii_uppercase())
    } else {
        None
    }
}

#[must_use]
pub fn is_valid_clan_name(name: &str) -> bool {
    (3..=50).contains(&name.trim().chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("gg"), Some("GG".to_string()));
        assert_eq!(normalize_tag(" abc12 "), Some("ABC12".to_string()));
        assert_eq!(normalize_tag("a"), None);
        assert_eq!(normalize_tag("toolong"), None);
        assert_eq!(normalize_tag("a-b"), None);
    }

    #[test]
    fn test_kick_rights() {
        assert!(ClanRole::Owner.can_kick());
        assert!(ClanRole::Leader.can_kick());
        assert!(!ClanRole::Member.can_kick());
    }
}
