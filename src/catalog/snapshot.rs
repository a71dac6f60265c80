use super::types::{GenreCount, GenreId, Movie, MovieEntry};

/// One entry of the filtered projection.
#[derive(Debug, Clone, Copy)]
pub struct VisibleEntry<'a> {
    pub entry: &'a MovieEntry,
    /// A genre filter is active and this entry matches it.
    pub is_highlighted: bool,
}

/// Read-only view of the catalog, borrowed from the state that produced it.
///
/// The filter is applied here at read time; the stored sequence is never
/// narrowed.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot<'a> {
    pub visible: Vec<VisibleEntry<'a>>,
    pub genre_counts: &'a [GenreCount],
    pub selected_genre: Option<GenreId>,
    pub is_loading: bool,
    pub has_more: bool,
    pub next_page: u32,
    /// Length of the stored sequence, ignoring the filter.
    pub total_entries: usize,
    pub selected_poster: Option<&'a Movie>,
}

impl CatalogSnapshot<'_> {
    /// Whether `position` (an index into `visible`) is within `distance`
    /// entries of the end of the projection.
    ///
    /// An empty projection counts as near the end, so an empty filtered view
    /// keeps pulling pages until one matches or the feed runs out.
    pub fn is_near_end(&self, position: usize, distance: usize) -> bool {
        position.saturating_add(distance) >= self.visible.len()
    }

    /// Display name of the active genre filter, if the genre is known.
    pub fn selected_genre_name(&self) -> Option<&str> {
        let selected = self.selected_genre?;
        self.genre_counts
            .iter()
            .find(|c| c.genre.id == selected)
            .map(|c| &*c.genre.name)
    }
}
