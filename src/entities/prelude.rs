pub use super::badges::Entity as Badges;
pub use super::clan_members::Entity as ClanMembers;
pub use super::clans::Entity as Clans;
pub use super::cms_content::Entity as CmsContent;
pub use super::forum_comments::Entity as ForumComments;
pub use super::forum_likes::Entity as ForumLikes;
pub use super::forum_posts::Entity as ForumPosts;
pub use super::messages::Entity as Messages;
pub use super::notifications::Entity as Notifications;
pub use super::tournament_participants::Entity as TournamentParticipants;
pub use super::tournaments::Entity as Tournaments;
pub use super::user_badges::Entity as UserBadges;
pub use super::users::Entity as Users;
