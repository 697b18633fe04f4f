//! Announcement feeds over news articles and speeches.
//!
//! # Responsibility
//! - Build the featured, "today" and "last 7 days" feeds of the
//!   announcements page.
//! - Merge per-type result sets into one newest-first sequence.
//!
//! # Invariants
//! - Feeds never contain featured documents.
//! - Merged feeds are ordered by `published_at DESC`, ties by id ascending.
//! - "today" is `(now - today_window, ∞)`; "recent" is
//!   `[now - recent_window, now - today_window)`.

use crate::config::FeedConfig;
use crate::model::edition::{Announcement, NewsArticle, PublishableDocument};
use crate::repo::document_repo::{DocumentQuery, DocumentRepository};
use crate::repo::RepoResult;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

/// Window sizes and limits used to cut the feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindows {
    pub featured_limit: u32,
    pub today_window: Duration,
    pub recent_window: Duration,
}

impl Default for FeedWindows {
    fn default() -> Self {
        Self {
            featured_limit: 3,
            today_window: Duration::hours(24),
            recent_window: Duration::days(7),
        }
    }
}

impl From<&FeedConfig> for FeedWindows {
    fn from(value: &FeedConfig) -> Self {
        Self {
            featured_limit: value.featured_limit,
            today_window: Duration::try_hours(value.today_window_hours)
                .unwrap_or(Duration::MAX),
            recent_window: Duration::try_days(value.recent_window_days)
                .unwrap_or(Duration::MAX),
        }
    }
}

/// Read model for the announcements index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementsIndex {
    pub featured_news_articles: Vec<NewsArticle>,
    pub announced_in_last_7_days: Vec<Announcement>,
    pub announced_today: Vec<Announcement>,
}

/// Aggregates published news articles and speeches into feeds.
pub struct AnnouncementService<R: DocumentRepository> {
    repo: R,
    windows: FeedWindows,
}

impl<R: DocumentRepository> AnnouncementService<R> {
    /// Creates a service with the default feed windows.
    pub fn new(repo: R) -> Self {
        Self::with_windows(repo, FeedWindows::default())
    }

    pub fn with_windows(repo: R, windows: FeedWindows) -> Self {
        Self { repo, windows }
    }

    /// Most recent featured news articles, capped at `featured_limit`.
    pub fn featured_news_articles(&self) -> RepoResult<Vec<NewsArticle>> {
        let query = DocumentQuery::default()
            .featured(true)
            .limit(self.windows.featured_limit);
        self.repo.published_news_articles(&query)
    }

    /// Non-featured documents published after `now - today_window`.
    pub fn announced_today(&self, now: DateTime<Utc>) -> RepoResult<Vec<Announcement>> {
        let query = DocumentQuery::default()
            .featured(false)
            .published_after(window_start(now, self.windows.today_window));
        self.announced(&query, "today")
    }

    /// Non-featured documents published in
    /// `[now - recent_window, now - today_window)`.
    pub fn announced_in_last_7_days(&self, now: DateTime<Utc>) -> RepoResult<Vec<Announcement>> {
        let query = DocumentQuery::default()
            .featured(false)
            .published_since(window_start(now, self.windows.recent_window))
            .published_before(window_start(now, self.windows.today_window));
        self.announced(&query, "recent")
    }

    /// Builds every feed of the index page against one `now`.
    pub fn index(&self, now: DateTime<Utc>) -> RepoResult<AnnouncementsIndex> {
        Ok(AnnouncementsIndex {
            featured_news_articles: self.featured_news_articles()?,
            announced_in_last_7_days: self.announced_in_last_7_days(now)?,
            announced_today: self.announced_today(now)?,
        })
    }

    fn announced(&self, query: &DocumentQuery, feed: &str) -> RepoResult<Vec<Announcement>> {
        let news: Vec<Announcement> = self
            .repo
            .published_news_articles(query)?
            .into_iter()
            .map(Announcement::from)
            .collect();
        let speeches: Vec<Announcement> = self
            .repo
            .published_speeches(query)?
            .into_iter()
            .map(Announcement::from)
            .collect();

        debug!(
            "event=feed_build module=service feed={feed} news_count={} speech_count={}",
            news.len(),
            speeches.len()
        );
        Ok(merge_by_published_at([news, speeches]))
    }
}

/// `now - window`, saturating at the earliest representable instant.
fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Concatenates result sets and orders them newest first.
///
/// Documents without `published_at` sort last; equal timestamps are ordered
/// by id ascending so output does not depend on input order.
pub fn merge_by_published_at<D, I>(result_sets: I) -> Vec<D>
where
    D: PublishableDocument,
    I: IntoIterator<Item = Vec<D>>,
{
    let mut merged: Vec<D> = result_sets.into_iter().flatten().collect();
    merged.sort_by(|left, right| {
        right
            .published_at()
            .cmp(&left.published_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::{merge_by_published_at, window_start, FeedWindows};
    use crate::config::FeedConfig;
    use crate::model::edition::{Announcement, Edition, NewsArticle, PublishableDocument, Speech};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 3, 1, hour, 0, 0).unwrap()
    }

    fn edition(id: &str, published_at: DateTime<Utc>) -> Edition {
        let mut edition = Edition::new("title", "title");
        edition.id = Uuid::parse_str(id).unwrap();
        edition.publish(published_at);
        edition
    }

    #[test]
    fn merge_interleaves_types_newest_first() {
        let news = vec![
            Announcement::from(NewsArticle::new(edition("00000000-0000-4000-8000-000000000001", at(9)))),
            Announcement::from(NewsArticle::new(edition("00000000-0000-4000-8000-000000000002", at(7)))),
        ];
        let speeches = vec![Announcement::from(Speech::new(edition(
            "00000000-0000-4000-8000-000000000003",
            at(8),
        )))];

        let merged = merge_by_published_at([news, speeches]);
        let hours: Vec<_> = merged.iter().map(|doc| doc.published_at().unwrap()).collect();
        assert_eq!(hours, vec![at(9), at(8), at(7)]);
    }

    #[test]
    fn oversized_windows_saturate_instead_of_overflowing() {
        let config = FeedConfig {
            featured_limit: 3,
            today_window_hours: 24,
            recent_window_days: i64::MAX,
        };
        let windows = FeedWindows::from(&config);
        assert_eq!(windows.recent_window, Duration::MAX);
        assert_eq!(window_start(at(9), windows.recent_window), DateTime::<Utc>::MIN_UTC);
        assert_eq!(window_start(at(9), windows.today_window), at(9) - Duration::hours(24));
    }

    #[test]
    fn merge_breaks_ties_by_id() {
        let later_id = "00000000-0000-4000-8000-0000000000ff";
        let earlier_id = "00000000-0000-4000-8000-000000000010";
        let merged = merge_by_published_at([
            vec![Speech::new(edition(later_id, at(10)))],
            vec![Speech::new(edition(earlier_id, at(10)))],
        ]);
        assert_eq!(merged[0].id().to_string(), earlier_id);
        assert_eq!(merged[1].id().to_string(), later_id);
    }
}
