use chrono::NaiveDateTime;

use twilog_core::LikedPostFact;

use crate::flatten::FlatRecord;
use crate::types::Identity;

use super::dedup::finalize;
use super::post::to_post_fact;

/// Liked-post rows for a likes batch crawled for `liker`, oldest first.
///
/// The embedded post keeps the liked post's own author; `liked_by_*` is
/// the identity whose likes were crawled.
#[must_use]
pub fn project_liked_posts(
    records: &[FlatRecord],
    liker: &Identity,
    registered_at: NaiveDateTime,
) -> Vec<LikedPostFact> {
    let facts: Vec<LikedPostFact> = records
        .iter()
        .map(|r| LikedPostFact {
            post: to_post_fact(r, registered_at),
            liked_by_user_id: liker.user_id.clone(),
            liked_by_user_name: liker.name.clone(),
            liked_by_screen_name: liker.screen_name.clone(),
        })
        .collect();
    finalize(facts, |f| f.post.post_id)
}
