//! Social/engagement tasks that award points once per account.

use crate::domain::points::{DISCORD_JOIN_POINTS, TWITTER_FOLLOW_POINTS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    TwitterFollow,
    YoutubeSubscribe,
    DevFollow,
    DiscordJoin,
    TelegramCommunity,
    TelegramChannel,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::TwitterFollow,
        Task::YoutubeSubscribe,
        Task::DevFollow,
        Task::DiscordJoin,
        Task::TelegramCommunity,
        Task::TelegramChannel,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Task::TwitterFollow => "twitter_follow",
            Task::YoutubeSubscribe => "youtube_subscribe",
            Task::DevFollow => "dev_follow",
            Task::DiscordJoin => "discord_join",
            Task::TelegramCommunity => "telegram_community",
            Task::TelegramChannel => "telegram_channel",
        }
    }

    /// Ledger note on the completing account; its presence marks the task done.
    pub fn note(self) -> &'static str {
        match self {
            Task::TwitterFollow => "Follow $HODI on Twitter",
            Task::YoutubeSubscribe => "Subscribe to our youtube channel",
            Task::DevFollow => "Follow Kev the Dev on X",
            Task::DiscordJoin => "Joined Discord Cat Cartel",
            Task::TelegramCommunity => "Joined Telegram Community",
            Task::TelegramChannel => "Joined Telegram Channel",
        }
    }

    pub fn points(self) -> i64 {
        match self {
            Task::TwitterFollow | Task::YoutubeSubscribe | Task::DevFollow => {
                TWITTER_FOLLOW_POINTS
            }
            Task::DiscordJoin | Task::TelegramCommunity | Task::TelegramChannel => {
                DISCORD_JOIN_POINTS
            }
        }
    }

    /// Ledger note on the referrer's share.
    pub fn referral_note(self) -> &'static str {
        match self {
            Task::TwitterFollow | Task::DevFollow => "Referral Twitter Follow",
            Task::YoutubeSubscribe => "Referral Youtube Subscribe",
            Task::DiscordJoin => "Referral Discord Join",
            Task::TelegramCommunity | Task::TelegramChannel => "Referral Telegram Join",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Task::ALL
            .into_iter()
            .find(|t| t.slug() == wanted)
            .ok_or_else(|| format!("unknown task `{}`", s))
    }
}
