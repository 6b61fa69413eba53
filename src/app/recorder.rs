use anyhow::Result;
use tracing::debug;

use super::drama::{BookSummary, Episode};
use super::history::{HistoryEntry, HistoryStore};

/// Writes one history entry per distinct (drama, episode) transition.
#[derive(Debug, Default)]
pub(crate) struct HistoryRecorder {
    last: Option<(String, usize)>,
}

impl HistoryRecorder {
    pub(crate) fn observe(
        &mut self,
        store: &HistoryStore,
        book: Option<&BookSummary>,
        episode: Option<&Episode>,
        index: usize,
        now_ms: i64,
    ) -> Result<bool> {
        let (Some(book), Some(episode)) = (book, episode) else {
            return Ok(false);
        };
        if self
            .last
            .as_ref()
            .is_some_and(|(id, ep)| *id == book.book_id && *ep == index)
        {
            return Ok(false);
        }

        store.save(HistoryEntry {
            drama_id: book.book_id.clone(),
            slug: book.book_id.clone(),
            title: book.book_name.clone(),
            poster: episode.chapter_img.clone(),
            episode: index,
            updated_at: now_ms,
        })?;
        debug!(drama = %book.book_id, episode = index, "recorded history");
        self.last = Some((book.book_id.clone(), index));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKv;

    fn book(id: &str) -> BookSummary {
        BookSummary {
            book_id: id.to_string(),
            book_name: format!("Book {id}"),
        }
    }

    fn episode(index: usize) -> Episode {
        Episode {
            chapter_id: format!("c{index}"),
            chapter_index: index,
            chapter_img: format!("poster-{index}.jpg"),
            cdn_list: Vec::new(),
        }
    }

    #[test]
    fn fires_once_per_distinct_pair() {
        let store = HistoryStore::new(Box::new(MemoryKv::default()));
        let mut recorder = HistoryRecorder::default();
        let b = book("1");
        let e0 = episode(0);
        let e1 = episode(1);

        assert!(recorder.observe(&store, Some(&b), Some(&e0), 0, 10).expect("observe"));
        assert!(!recorder.observe(&store, Some(&b), Some(&e0), 0, 11).expect("re-render"));
        assert!(!recorder.observe(&store, Some(&b), Some(&e0), 0, 12).expect("re-render"));
        assert!(recorder.observe(&store, Some(&b), Some(&e1), 1, 13).expect("next ep"));

        let list = store.get();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].episode, 1);
        assert_eq!(list[0].updated_at, 13);
        assert_eq!(list[0].poster, "poster-1.jpg");
        assert_eq!(list[0].slug, "1");
        assert_eq!(list[0].title, "Book 1");
    }

    #[test]
    fn switching_books_records_again() {
        let store = HistoryStore::new(Box::new(MemoryKv::default()));
        let mut recorder = HistoryRecorder::default();
        let e0 = episode(0);

        assert!(recorder.observe(&store, Some(&book("1")), Some(&e0), 0, 1).expect("a"));
        assert!(recorder.observe(&store, Some(&book("2")), Some(&e0), 0, 2).expect("b"));
        assert_eq!(store.get().len(), 2);
    }

    #[test]
    fn missing_book_or_episode_does_not_write() {
        let store = HistoryStore::new(Box::new(MemoryKv::default()));
        let mut recorder = HistoryRecorder::default();

        assert!(!recorder.observe(&store, None, Some(&episode(0)), 0, 1).expect("no book"));
        assert!(!recorder.observe(&store, Some(&book("1")), None, 7, 1).expect("no episode"));
        assert!(store.get().is_empty());
    }
}
