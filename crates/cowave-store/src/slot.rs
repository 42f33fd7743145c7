use cowave_types::{DataError, PageCursor};

/// Per-parent pagination state: which ids belong to this parent, where the
/// next page starts, and what the in-flight request situation is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    /// Ordered, duplicate-free. Reflects server order right after a load;
    /// created entities are prepended regardless of nominal order.
    pub ids: Vec<String>,
    pub cursor: Option<PageCursor>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<DataError>,
    /// Highest request token seen for this slot.
    pub latest_token: u64,
}

impl Slot {
    pub(crate) fn begin(&mut self, token: u64) {
        self.loading = true;
        self.error = None;
        self.latest_token = self.latest_token.max(token);
    }

    /// Whether a completion with this token is still current.
    pub(crate) fn accepts(&self, token: u64) -> bool {
        token >= self.latest_token
    }

    pub(crate) fn finish(
        &mut self,
        new_ids: Vec<String>,
        cursor: Option<PageCursor>,
        has_more: bool,
        replace: bool,
    ) {
        if replace {
            self.ids.clear();
        }
        for id in new_ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.cursor = cursor;
        self.has_more = has_more;
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: DataError) {
        self.loading = false;
        self.error = Some(error);
    }

    /// New entities go first; an already-present id moves to the front
    /// instead of duplicating.
    pub(crate) fn prepend(&mut self, id: &str) {
        self.ids.retain(|existing| existing != id);
        self.ids.insert(0, id.to_string());
    }
}
