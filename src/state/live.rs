use crate::dto::ws::LiveStateSnapshot;

/// The shared "now playing" record every connected client follows.
///
/// Exactly one instance lives in the application state. It resets to its
/// defaults on process start; clients re-sync from the first broadcast, so no
/// durability is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    song_id: Option<i64>,
    page: u32,
    setlist_id: Option<i64>,
}

impl Default for LiveSession {
    fn default() -> Self {
        Self {
            song_id: None,
            page: 1,
            setlist_id: None,
        }
    }
}

impl LiveSession {
    /// Create the record in its unset state: no song, page 1, no setlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the active song. Selecting a song resets to page 1 unless a
    /// non-zero page is supplied along with it.
    pub fn set_song(&mut self, song_id: i64, page: Option<u32>) {
        self.song_id = Some(song_id);
        self.page = page.filter(|page| *page > 0).unwrap_or(1);
    }

    /// Turn to a page of the current song. The page is not validated against
    /// the song's real page count; viewers clamp locally.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    /// Select the active setlist without touching the active song.
    pub fn set_setlist(&mut self, setlist_id: Option<i64>) {
        self.setlist_id = setlist_id;
    }

    /// Detached copy of the current state, safe to hand to other tasks; later
    /// mutations never show through it.
    pub fn snapshot(&self) -> LiveStateSnapshot {
        LiveStateSnapshot {
            song_id: self.song_id,
            page: self.page,
            setlist_id: self.setlist_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_on_page_one() {
        let session = LiveSession::new();
        assert_eq!(
            session.snapshot(),
            LiveStateSnapshot {
                song_id: None,
                page: 1,
                setlist_id: None,
            }
        );
    }

    #[test]
    fn selecting_a_song_resets_to_page_one() {
        let mut session = LiveSession::new();
        session.set_page(12);
        session.set_song(7, None);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.song_id, Some(7));
        assert_eq!(snapshot.page, 1);
    }

    #[test]
    fn selecting_a_song_with_explicit_page_keeps_it() {
        let mut session = LiveSession::new();
        session.set_song(7, Some(4));
        assert_eq!(session.snapshot().page, 4);
    }

    #[test]
    fn page_zero_counts_as_unset_when_selecting_a_song() {
        let mut session = LiveSession::new();
        session.set_song(7, Some(0));
        assert_eq!(session.snapshot().page, 1);
    }

    #[test]
    fn page_turn_leaves_song_untouched() {
        let mut session = LiveSession::new();
        session.set_song(7, None);
        session.set_page(3);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.song_id, Some(7));
        assert_eq!(snapshot.page, 3);
    }

    #[test]
    fn setlist_selection_is_orthogonal_to_the_song() {
        let mut session = LiveSession::new();
        session.set_song(7, Some(2));
        session.set_setlist(Some(42));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.song_id, Some(7));
        assert_eq!(snapshot.page, 2);
        assert_eq!(snapshot.setlist_id, Some(42));

        session.set_setlist(None);
        assert_eq!(session.snapshot().setlist_id, None);
    }

    #[test]
    fn snapshots_do_not_alias_the_live_record() {
        let mut session = LiveSession::new();
        session.set_song(7, None);
        let before = session.snapshot();

        session.set_song(8, Some(5));
        assert_eq!(before.song_id, Some(7));
        assert_eq!(before.page, 1);
    }
}
