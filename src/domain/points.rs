//! Point awards: sign-up amounts, referral shares and holdings tiers.

/// Default sign-up award.
pub const SIGN_UP_POINTS: i64 = 100;
/// Credited to the referrer for every redemption of their code.
pub const REFERRAL_POINTS: i64 = 500;
/// Wallet connection award when the holdings tier is worth nothing.
pub const WALLET_CONNECT_POINTS: i64 = 200;
pub const TWITTER_FOLLOW_POINTS: i64 = 100;
pub const DISCORD_JOIN_POINTS: i64 = 100;
/// Referrers receive `amount / REFERRAL_SHARE_DIVISOR` of their invitees' awards.
pub const REFERRAL_SHARE_DIVISOR: i64 = 10;

const PARTNER_POINTS: i64 = 20_000;

/// Partner codes that carry a boosted sign-up award. Matching is case-sensitive.
pub const PROMO_SIGN_UP_POINTS: &[(&str, i64)] = &[
    ("ares10", PARTNER_POINTS),
    ("e38502", PARTNER_POINTS),
    ("heroes", PARTNER_POINTS),
    ("lambss", PARTNER_POINTS),
    ("lgtdao", PARTNER_POINTS),
    ("gana10", PARTNER_POINTS),
    ("reikoo", PARTNER_POINTS),
    ("mic100", PARTNER_POINTS),
    ("NFTNFT", PARTNER_POINTS),
    ("ronnie", PARTNER_POINTS),
    ("881711", PARTNER_POINTS),
    ("mira10", PARTNER_POINTS),
    ("zaimir", PARTNER_POINTS),
    ("blever", PARTNER_POINTS),
    ("loshmi", PARTNER_POINTS),
    ("kodama", 5_000),
    ("SULTAN", 5_000),
    ("HCANFT", 1_000),
];

/// A holdings bracket: balances from `min` up to the next tier's `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub min: f64,
    pub points: i64,
}

/// Ordered by `min`, strictly increasing in both columns.
pub const HOLDING_TIERS: &[Tier] = &[
    Tier { min: 0.0, points: 0 },
    Tier { min: 25_000.0, points: 750 },
    Tier { min: 75_000.0, points: 2_000 },
    Tier { min: 250_000.0, points: 5_000 },
    Tier { min: 500_000.0, points: 10_000 },
    Tier { min: 1_250_000.0, points: 20_000 },
    Tier { min: 2_500_000.0, points: 50_000 },
];

pub fn sign_up_points(code: &str) -> i64 {
    PROMO_SIGN_UP_POINTS
        .iter()
        .find(|(promo, _)| *promo == code)
        .map(|(_, points)| *points)
        .unwrap_or(SIGN_UP_POINTS)
}

pub fn referral_share(amount: i64) -> i64 {
    amount.max(0) / REFERRAL_SHARE_DIVISOR
}

fn tier_index(balance: f64) -> usize {
    if !balance.is_finite() {
        // +inf belongs to the top tier, NaN and -inf to the bottom one
        return if balance == f64::INFINITY {
            HOLDING_TIERS.len() - 1
        } else {
            0
        };
    }
    HOLDING_TIERS
        .iter()
        .rposition(|t| balance >= t.min)
        .unwrap_or(0)
}

pub fn tier_for_balance(balance: f64) -> &'static Tier {
    &HOLDING_TIERS[tier_index(balance)]
}

/// Points earned by moving from `previous` to `current`.
///
/// Only upward tier crossings pay out; each crossed tier contributes the
/// difference to the tier below it.
pub fn incremental_points(previous: f64, current: f64) -> i64 {
    if current.is_nan() || current <= previous {
        return 0;
    }
    let from = tier_index(previous);
    let to = tier_index(current);
    if to <= from {
        return 0;
    }
    (from + 1..=to)
        .map(|i| HOLDING_TIERS[i].points - HOLDING_TIERS[i - 1].points)
        .sum()
}

/// Award for connecting a wallet holding `balance` tokens.
pub fn wallet_connect_points(balance: f64) -> i64 {
    let tier = tier_for_balance(balance);
    if tier.points > 0 {
        tier.points
    } else {
        WALLET_CONNECT_POINTS
    }
}

/// Human-readable balance with thousands separators (`1,250,000.5`).
pub fn format_balance(balance: f64) -> String {
    let rounded = (balance * 1000.0).round() / 1000.0;
    let text = format!("{}", rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
