//! Row types for the waitlist tables.
//!
//! These are plain data carriers; every rule about how they change lives in
//! `crate::domain::points`, `crate::domain::tasks` and the service layer.

pub mod account;
pub mod invitation;
pub mod ledger;
pub mod user;

pub use account::{Account, AccountPatch, BlacklistEntry, LeaderboardEntry, NewAccount, Position};
pub use invitation::{generate_invitation_code, InvitationCode, INVITATION_CODE_LEN};
pub use ledger::{NewPointEntry, PointEntry};
pub use user::User;
