//! Local projection of streamed collections into render-ready state.
//!
//! Everything here is pure: no store, no clock, no UI. The runtime feeds it
//! full snapshots and reads the derived state back.

use std::collections::{HashMap, HashSet};

use crate::contract::model::{
    ChecklistFilter, ChecklistItem, ChecklistItemState, DeletionRequest, HistoryRecord,
    ItemStatus, Progress, User,
};
use crate::domain::collation;

/// Rebuild checklist state from a new set of catalog names.
///
/// Status is carried over from `previous` for names that survive; new names
/// start with no status. Empty names are dropped, duplicates collapse to one
/// entry, and the result is in Turkish collation order.
pub fn reconcile<I, S>(previous: &[ChecklistItemState], names: I) -> Vec<ChecklistItemState>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let carried: HashMap<&str, Option<ItemStatus>> = previous
        .iter()
        .map(|s| (s.name.as_str(), s.status))
        .collect();

    let mut seen = HashSet::new();
    let mut next: Vec<ChecklistItemState> = names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            if name.is_empty() || !seen.insert(name.to_string()) {
                return None;
            }
            Some(ChecklistItemState {
                name: name.to_string(),
                status: carried.get(name).copied().flatten(),
            })
        })
        .collect();

    next.sort_by(|a, b| collation::compare(&a.name, &b.name));
    next
}

/// Clear every status, keeping names and order.
pub fn reset_all(states: &[ChecklistItemState]) -> Vec<ChecklistItemState> {
    states
        .iter()
        .map(|s| ChecklistItemState::pending(s.name.clone()))
        .collect()
}

/// Set `status` on the named entry; setting the current status again clears it.
/// Returns false when no entry has that name.
pub fn toggle(states: &mut [ChecklistItemState], name: &str, status: ItemStatus) -> bool {
    match states.iter_mut().find(|s| s.name == name) {
        Some(entry) => {
            entry.status = if entry.status == Some(status) {
                None
            } else {
                Some(status)
            };
            true
        }
        None => false,
    }
}

pub fn mark_all_done(states: &mut [ChecklistItemState]) {
    for s in states.iter_mut() {
        s.status = Some(ItemStatus::Done);
    }
}

/// Done count, total and rounded percentage (0 for an empty checklist).
pub fn progress(states: &[ChecklistItemState]) -> Progress {
    let total = states.len();
    let done = states.iter().filter(|s| s.is_done()).count();
    let percent = if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u8
    };
    Progress {
        done,
        total,
        percent,
    }
}

/// Entries visible under a filter and search query.
pub fn visible(
    states: &[ChecklistItemState],
    filter: ChecklistFilter,
    search: &str,
) -> Vec<ChecklistItemState> {
    let search = search.trim();
    states
        .iter()
        .filter(|s| match filter {
            ChecklistFilter::All => true,
            ChecklistFilter::Incomplete => !s.is_done(),
            ChecklistFilter::Done => s.is_done(),
        })
        .filter(|s| search.is_empty() || collation::contains_folded(&s.name, search))
        .cloned()
        .collect()
}

/// Derived local state for all streamed collections.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub users: Vec<User>,
    pub catalog: Vec<ChecklistItem>,
    pub checklist: Vec<ChecklistItemState>,
    pub history: Vec<HistoryRecord>,
    pub requests: Vec<DeletionRequest>,
    users_loaded: bool,
}

impl Projection {
    pub fn apply_users(&mut self, users: Vec<User>) {
        self.users = users;
        self.users_loaded = true;
    }

    /// Replace the catalog and reconcile checklist state against it.
    pub fn apply_items(&mut self, mut items: Vec<ChecklistItem>) {
        items.sort_by(|a, b| collation::compare(&a.name, &b.name));
        self.checklist = reconcile(&self.checklist, items.iter().map(|i| i.name.as_str()));
        self.catalog = items;
    }

    pub fn apply_history(&mut self, history: Vec<HistoryRecord>) {
        self.history = history;
    }

    pub fn apply_requests(&mut self, requests: Vec<DeletionRequest>) {
        self.requests = requests;
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    pub fn reset_checklist(&mut self) {
        self.checklist = reset_all(&self.checklist);
    }

    /// True once a non-empty roster snapshot has arrived.
    pub fn roster_ready(&self) -> bool {
        self.users_loaded && !self.users.is_empty()
    }

    pub fn user(&self, id: &crate::contract::model::DocId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    pub fn item(&self, id: &crate::contract::model::DocId) -> Option<&ChecklistItem> {
        self.catalog.iter().find(|i| &i.id == id)
    }

    pub fn progress(&self) -> Progress {
        progress(&self.checklist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, status: Option<ItemStatus>) -> ChecklistItemState {
        ChecklistItemState {
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn reconcile_carries_status_by_name() {
        let prev = vec![
            state("Toz Alma", Some(ItemStatus::Done)),
            state("Çöp Kovası", Some(ItemStatus::NotDone)),
        ];
        let next = reconcile(&prev, ["Çöp Kovası", "Toz Alma", "Aydınlatma"]);

        assert_eq!(
            next,
            vec![
                state("Aydınlatma", None),
                state("Çöp Kovası", Some(ItemStatus::NotDone)),
                state("Toz Alma", Some(ItemStatus::Done)),
            ]
        );
    }

    #[test]
    fn reconcile_drops_empty_and_duplicate_names() {
        let next = reconcile(&[], ["Toz Alma", "", "Toz Alma"]);
        assert_eq!(next, vec![state("Toz Alma", None)]);
    }

    #[test]
    fn reconcile_is_case_sensitive() {
        let prev = vec![state("toz alma", Some(ItemStatus::Done))];
        let next = reconcile(&prev, ["Toz Alma"]);
        assert_eq!(next, vec![state("Toz Alma", None)]);
    }

    #[test]
    fn toggle_same_status_clears() {
        let mut states = vec![state("Toz Alma", None)];
        assert!(toggle(&mut states, "Toz Alma", ItemStatus::Done));
        assert_eq!(states[0].status, Some(ItemStatus::Done));
        assert!(toggle(&mut states, "Toz Alma", ItemStatus::Done));
        assert_eq!(states[0].status, None);
        assert!(toggle(&mut states, "Toz Alma", ItemStatus::NotDone));
        assert_eq!(states[0].status, Some(ItemStatus::NotDone));
        assert!(!toggle(&mut states, "Yok", ItemStatus::Done));
    }

    #[test]
    fn progress_rounds_and_handles_empty() {
        assert_eq!(progress(&[]).percent, 0);

        let states = vec![
            state("a", Some(ItemStatus::Done)),
            state("b", None),
            state("c", Some(ItemStatus::NotDone)),
        ];
        let p = progress(&states);
        assert_eq!((p.done, p.total, p.percent), (1, 3, 33));

        let states = vec![state("a", Some(ItemStatus::Done)), state("b", Some(ItemStatus::Done)), state("c", None)];
        assert_eq!(progress(&states).percent, 67);
    }

    #[test]
    fn visible_applies_filter_and_search() {
        let states = vec![
            state("Banyo Temizliği", Some(ItemStatus::Done)),
            state("Tuvalet Temizliği", None),
            state("Toz Alma", Some(ItemStatus::NotDone)),
        ];

        let done = visible(&states, ChecklistFilter::Done, "");
        assert_eq!(done.len(), 1);

        let incomplete = visible(&states, ChecklistFilter::Incomplete, "temiz");
        assert_eq!(incomplete, vec![state("Tuvalet Temizliği", None)]);

        assert_eq!(visible(&states, ChecklistFilter::All, "  ").len(), 3);
    }

    #[test]
    fn mark_all_then_reset() {
        let mut states = vec![state("a", None), state("b", Some(ItemStatus::NotDone))];
        mark_all_done(&mut states);
        assert_eq!(progress(&states).percent, 100);
        let reset = reset_all(&states);
        assert!(reset.iter().all(|s| s.status.is_none()));
        assert_eq!(reset.len(), 2);
    }

    #[test]
    fn roster_ready_requires_non_empty_snapshot() {
        let mut p = Projection::default();
        assert!(!p.roster_ready());
        p.apply_users(Vec::new());
        assert!(!p.roster_ready());
    }
}
