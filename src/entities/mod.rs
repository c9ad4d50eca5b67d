pub mod prelude;

pub mod badges;
pub mod clan_members;
pub mod clans;
pub mod cms_content;
pub mod forum_comments;
pub mod forum_likes;
pub mod forum_posts;
pub mod messages;
pub mod notifications;
pub mod tournament_participants;
pub mod tournaments;
pub mod user_badges;
pub mod users;
