//! Projectors from flattened records to typed facts.
//!
//! Each projector reads the same flattened batch independently and returns
//! its facts deduplicated and in persisted (oldest-first) order.

pub mod dedup;
pub mod external_link;
pub mod liked;
pub mod media;
pub mod metric;
pub mod post;

pub use dedup::{chronological, dedup_by_key};
pub use external_link::{classify_link, project_external_links};
pub use liked::project_liked_posts;
pub use media::{decode_media, project_media, MediaItem};
pub use metric::project_metric;
pub use post::{project_posts, to_post_fact};
