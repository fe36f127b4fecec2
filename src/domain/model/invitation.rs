use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const INVITATION_CODE_LEN: usize = 8;

const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A single-use row of `invitation_codes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvitationCode {
    pub code: String,
    pub generated_by: String,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

/// Random lowercase base-36 code.
pub fn generate_invitation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITATION_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_base36() {
        for _ in 0..64 {
            let code = generate_invitation_code();
            assert_eq!(code.len(), INVITATION_CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
