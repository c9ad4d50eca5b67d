use super::text_enum;

text_enum! {
    pub enum NotificationType("notification type") {
        System => "system",
        Message => "message",
        Badge => "badge",
        Tournament => "tournament",
        Clan => "clan",
        Forum => "forum",
    }
}
