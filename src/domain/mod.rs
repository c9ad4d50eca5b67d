//! Domain types shared by the repositories, services and HTTP handlers.
//!
//! Every enumeration stored as text in the database is modelled here as a
//! closed Rust enum so invalid values are rejected at the edge instead of
//! leaking into rows.

pub mod badge;
pub mod clan;
pub mod cms;
pub mod forum;
pub mod notification;
pub mod pagination;
pub mod tournament;
pub mod user;

pub use badge::BadgeRarity;
pub use clan::ClanRole;
pub use cms::{CmsContentType, Section, SectionKind};
pub use forum::ForumCategory;
pub use notification::NotificationType;
pub use pagination::{PageParams, Paginated, Pagination};
pub use tournament::{TournamentFormat, TournamentStatus};
pub use user::{Role, UserStatus};

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a text-backed enum with `as_str`, `Display`, `FromStr` and serde
/// impls that all agree on the same spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::domain::ParseEnumError {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        for status in TournamentStatus::ALL {
            assert_eq!(status.to_string().parse::<TournamentStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "overlord".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "role");
        assert_eq!(err.to_string(), "Invalid role: overlord");
    }

    #[test]
    fn test_serde_uses_stored_spelling() {
        let json = serde_json::to_string(&TournamentFormat::SingleElimination).unwrap();
        assert_eq!(json, "\"single_elimination\"");
        let parsed: CmsContentType = serde_json::from_str("\"HOME_PAGE\"").unwrap();
        assert_eq!(parsed, CmsContentType::HomePage);
    }
}
