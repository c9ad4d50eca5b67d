use serde::Serialize;

use crate::db::User;
use crate::db::repositories::clan::MemberRow;
use crate::db::repositories::tournament::ParticipantRow;
use crate::domain::ClanRole;
use crate::domain::forum::decode_tags;
use crate::domain::user::win_rate;
use crate::entities::{
    badges, clans, forum_comments, forum_posts, messages, notifications, tournaments, user_badges,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    /// Only shown to the account itself and to admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub status: String,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub xp: i32,
    pub level: i32,
    pub win_rate: f64,
    pub created_at: String,
}

impl UserDto {
    #[must_use]
    pub fn new(user: User, show_email: bool) -> Self {
        Self {
            id: user.id,
            email: show_email.then_some(user.email),
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            role: user.role.to_string(),
            status: user.status.to_string(),
            points: user.points,
            wins: user.wins,
            losses: user.losses,
            xp: user.xp,
            level: user.level,
            win_rate: win_rate(user.wins, user.losses),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentUserDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub must_change_password: bool,
}

impl From<User> for CurrentUserDto {
    fn from(user: User) -> Self {
        let must_change_password = user.must_change_password;
        Self {
            user: UserDto::new(user, true),
            must_change_password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserClanDto {
    pub id: i32,
    pub name: String,
    pub tag: String,
    pub role: ClanRole,
}

#[derive(Debug, Serialize)]
pub struct UserProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub clan: Option<UserClanDto>,
    pub badges: Vec<UserBadgeDto>,
}

#[derive(Debug, Serialize)]
pub struct ClanDto {
    pub id: i32,
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: i32,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
    pub member_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl ClanDto {
    #[must_use]
    pub fn new(clan: clans::Model, member_count: i64) -> Self {
        Self {
            id: clan.id,
            win_rate: win_rate(clan.wins, clan.losses),
            name: clan.name,
            tag: clan.tag,
            description: clan.description,
            logo_url: clan.logo_url,
            owner_id: clan.owner_id,
            points: clan.points,
            wins: clan.wins,
            losses: clan.losses,
            member_count,
            created_at: clan.created_at,
            updated_at: clan.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClanMemberDto {
    pub user_id: i32,
    pub username: String,
    pub role: ClanRole,
    pub joined_at: String,
}

impl From<MemberRow> for ClanMemberDto {
    fn from(row: MemberRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            role: row.role,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClanDetailDto {
    #[serde(flatten)]
    pub clan: ClanDto,
    pub members: Vec<ClanMemberDto>,
}

#[derive(Debug, Serialize)]
pub struct TournamentDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub game: String,
    pub format: String,
    pub max_participants: i32,
    pub participant_count: i64,
    pub prize_pool: Option<String>,
    pub status: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub organizer_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TournamentDto {
    #[must_use]
    pub fn new(tournament: tournaments::Model, participant_count: i64) -> Self {
        Self {
            id: tournament.id,
            title: tournament.title,
            description: tournament.description,
            game: tournament.game,
            format: tournament.format,
            max_participants: tournament.max_participants,
            participant_count,
            prize_pool: tournament.prize_pool,
            status: tournament.status,
            start_date: tournament.start_date,
            end_date: tournament.end_date,
            registration_deadline: tournament.registration_deadline,
            organizer_id: tournament.organizer_id,
            created_at: tournament.created_at,
            updated_at: tournament.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantDto {
    pub user_id: i32,
    pub username: String,
    pub joined_at: String,
}

impl From<ParticipantRow> for ParticipantDto {
    fn from(row: ParticipantRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TournamentDetailDto {
    #[serde(flatten)]
    pub tournament: TournamentDto,
    pub participants: Vec<ParticipantDto>,
    pub is_registered: bool,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub registered: bool,
    pub participant_count: u64,
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author_id: i32,
    pub author_username: Option<String>,
    pub views: i32,
    pub is_pinned: bool,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PostDto {
    #[must_use]
    pub fn new(
        post: forum_posts::Model,
        author_username: Option<String>,
        like_count: i64,
        comment_count: i64,
    ) -> Self {
        Self {
            id: post.id,
            tags: decode_tags(&post.tags),
            title: post.title,
            content: post.content,
            category: post.category,
            author_id: post.author_id,
            author_username,
            views: post.views,
            is_pinned: post.is_pinned,
            like_count,
            comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CommentDto {
    #[must_use]
    pub fn new(comment: forum_comments::Model, author_username: Option<String>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailDto {
    #[serde(flatten)]
    pub post: PostDto,
    pub comments: Vec<CommentDto>,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub is_pinned: bool,
}

#[derive(Debug, Serialize)]
pub struct BadgeDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub rarity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_count: Option<i64>,
    pub created_at: String,
}

impl From<badges::Model> for BadgeDto {
    fn from(badge: badges::Model) -> Self {
        Self {
            id: badge.id,
            name: badge.name,
            description: badge.description,
            icon_url: badge.icon_url,
            rarity: badge.rarity,
            award_count: None,
            created_at: badge.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserBadgeDto {
    pub badge: BadgeDto,
    pub awarded_by: Option<i32>,
    pub awarded_at: String,
}

impl From<(user_badges::Model, badges::Model)> for UserBadgeDto {
    fn from((award, badge): (user_badges::Model, badges::Model)) -> Self {
        Self {
            badge: badge.into(),
            awarded_by: award.awarded_by,
            awarded_at: award.awarded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: i32,
    pub sender_id: i32,
    pub recipient_id: i32,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<messages::Model> for MessageDto {
    fn from(message: messages::Model) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationDto {
    pub id: i32,
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notifications::Model> for NotificationDto {
    fn from(notification: notifications::Model) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            kind: notification.notification_type,
            title: notification.title,
            message: notification.message,
            link: notification.link,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankedUserDto {
    pub rank: u64,
    pub id: i32,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub xp: i32,
    pub level: i32,
    pub win_rate: f64,
}

impl RankedUserDto {
    #[must_use]
    pub fn new(rank: u64, user: User) -> Self {
        Self {
            rank,
            id: user.id,
            win_rate: win_rate(user.wins, user.losses),
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            points: user.points,
            wins: user.wins,
            losses: user.losses,
            xp: user.xp,
            level: user.level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankedClanDto {
    pub rank: u64,
    pub id: i32,
    pub name: String,
    pub tag: String,
    pub logo_url: Option<String>,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
}

impl RankedClanDto {
    #[must_use]
    pub fn new(rank: u64, clan: clans::Model) -> Self {
        Self {
            rank,
            id: clan.id,
            win_rate: win_rate(clan.wins, clan.losses),
            name: clan.name,
            tag: clan.tag,
            logo_url: clan.logo_url,
            points: clan.points,
            wins: clan.wins,
            losses: clan.losses,
        }
    }
}
