use super::text_enum;

text_enum! {
    /// Account role. Variants are declared in privilege order so `Ord`
    /// comparisons express "at least".
    pub enum Role("role") {
        User => "user",
        Moderator => "moderator",
        Admin => "admin",
    }
}

text_enum! {
    pub enum UserStatus("status") {
        Active => "active",
        Banned => "banned",
        Suspended => "suspended",
    }
}

impl Role {
    #[must_use]
    pub fn at_least(self, required: Self) -> bool {
        self >= required
    }
}

pub const XP_PER_LEVEL: i32 = 1000;

/// Level is derived from experience, never stored independently.
#[must_use]
pub const fn level_for_xp(xp: i32) -> i32 {
    1 + xp / XP_PER_LEVEL
}

/// Win rate as a percentage rounded to one decimal place.
#[must_use]
pub fn win_rate(wins: i32, losses: i32) -> f64 {
    // Summed as f64 so totals past i32::MAX cannot overflow.
    let played = f64::from(wins) + f64::from(losses);
    if played <= 0.0 {
        return 0.0;
    }
    let rate = f64::from(wins) * 100.0 / played;
    (rate * 10.0).round() / 10.0
}

/// Usernames are 3-32 characters of ASCII letters, digits, `_` or `-`.
#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
