//! Trending scoring and ranking.
//!
//! The score is `(engagement per hour) * velocity bonus * recency decay`.
//! Vote engagement counts the stronger of the net margin and half the
//! total vote volume, so a 1000/1000 post ranks like a 1000/0 post.
//! Comments weigh ten votes each. Posts younger than six hours get a
//! bonus in `[1.5, 2.0]` that grows with engagement rate.

use std::cmp::Ordering;

use crate::domain::Post;

/// Lookback window for the trending feed.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: i64 = 86_400_000;

/// Age floor applied when normalizing engagement, so a seconds-old post
/// does not divide by nearly zero.
const MIN_AGE_HOURS: f64 = 0.75;

/// Inclusive lower bound on `created_at` for a window ending at `now_ms`.
pub fn window_start(now_ms: i64, window_days: i64) -> i64 {
    now_ms - window_days * MS_PER_DAY
}

/// Trending score for one post at time `now_ms`.
pub fn trending_score(post: &Post, now_ms: i64) -> f64 {
    let upvotes = post.upvotes as f64;
    let downvotes = post.downvotes as f64;

    let vote_score = (upvotes - downvotes).abs().max((upvotes + downvotes) * 0.5);
    let total_engagement = vote_score + post.comments_count as f64 * 10.0;

    let hours_old = (now_ms - post.created_at) as f64 / MS_PER_HOUR;
    let per_hour = total_engagement / hours_old.max(MIN_AGE_HOURS);

    let velocity_bonus = if hours_old < 6.0 {
        1.5 + (per_hour / 100.0).min(0.5)
    } else {
        1.0
    };

    let recency_factor = (-hours_old / 12.0).exp();

    per_hour * velocity_bonus * recency_factor
}

/// Orders posts by descending trending score. Equal scores fall back to
/// descending id so the order is reproducible.
pub fn rank_trending(posts: Vec<Post>, now_ms: i64) -> Vec<Post> {
    let mut scored: Vec<(f64, Post)> = posts
        .into_iter()
        .map(|post| (trending_score(&post, now_ms), post))
        .collect();

    scored.sort_by(|a, b| match b.0.total_cmp(&a.0) {
        Ordering::Equal => b.1.id.cmp(&a.1.id),
        other => other,
    });

    scored.into_iter().map(|(_, post)| post).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    fn post(id: i64, created_at: i64, upvotes: i64, downvotes: i64, comments: i64) -> Post {
        Post {
            id,
            user_id: 1,
            school_id: 1,
            content: "hello".to_string(),
            media_url: None,
            created_at,
            upvotes,
            downvotes,
            comments_count: comments,
        }
    }

    #[test]
    fn score_matches_worked_example() {
        // 500 up, 100 down, 5 comments, 2 hours old:
        // vote_score 400, engagement 450, per_hour 225, bonus capped at
        // 2.0, recency exp(-1/6). Expected 225 * 2 * 0.8464817 = 380.9168.
        let now = 100 * HOUR_MS;
        let p = post(1, now - 2 * HOUR_MS, 500, 100, 5);

        let score = trending_score(&p, now);
        assert!((score - 380.9168).abs() < 1e-3, "score was {score}");
    }

    #[test]
    fn brand_new_post_uses_age_floor() {
        // Zero hours old: normalized over 0.75h, bonus saturates at 2.0,
        // no decay yet. 60 votes -> 60 / 0.75 * 2.0 = 160 exactly.
        let now = 50 * HOUR_MS;
        let p = post(1, now, 60, 0, 0);

        assert_eq!(trending_score(&p, now), 160.0);
    }

    #[test]
    fn controversial_scores_like_polarized() {
        let now = 24 * HOUR_MS;
        let polarized = post(1, now - 3 * HOUR_MS, 1_000, 0, 0);
        let controversial = post(2, now - 3 * HOUR_MS, 1_000, 1_000, 0);

        assert_eq!(
            trending_score(&polarized, now),
            trending_score(&controversial, now)
        );
    }

    #[test]
    fn newer_post_outranks_equal_engagement() {
        let now = 48 * HOUR_MS;
        let newer = post(1, now - HOUR_MS, 40, 5, 3);
        let older = post(2, now - 10 * HOUR_MS, 40, 5, 3);

        assert!(trending_score(&newer, now) > trending_score(&older, now));
    }

    #[test]
    fn velocity_bonus_ends_at_six_hours() {
        let now = 100 * HOUR_MS;
        let just_under = post(1, now - 6 * HOUR_MS + 1, 60, 0, 0);
        let at_six = post(2, now - 6 * HOUR_MS, 60, 0, 0);

        // Decay over one millisecond is negligible; the 1.6x bonus is not.
        let ratio = trending_score(&just_under, now) / trending_score(&at_six, now);
        assert!((ratio - 1.6).abs() < 1e-3, "ratio was {ratio}");
    }

    #[test]
    fn ranking_sorts_by_score_then_id() {
        let now = 12 * HOUR_MS;
        let quiet = post(1, now - 2 * HOUR_MS, 1, 0, 0);
        let busy = post(2, now - 2 * HOUR_MS, 300, 10, 8);
        let twin_a = post(3, now - 4 * HOUR_MS, 50, 0, 0);
        let twin_b = post(4, now - 4 * HOUR_MS, 50, 0, 0);

        let ranked = rank_trending(vec![quiet, twin_a, busy, twin_b], now);
        let ids: Vec<i64> = ranked.iter().map(|p| p.id).collect();

        // Twins tie exactly, so the higher id wins.
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn window_start_covers_seven_days() {
        let now = 1_700_000_000_000;
        assert_eq!(
            window_start(now, TRENDING_WINDOW_DAYS),
            now - 7 * 24 * HOUR_MS
        );
    }
}
