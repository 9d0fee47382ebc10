//! Record table state: the rendered page of workspace records, browsing
//! settings, paging, and the checkbox model with its collection rules.
//!
//! Records can form groups (a content element and its file references).
//! A group head carries the group key in `collection_current`; every member
//! carries the same key in `collection`. Checkbox changes propagate through
//! a group:
//!
//! - toggling a head sets every member to the head's new state;
//! - toggling a member sets every member and the head to the member's new
//!   state ("last toggle wins", not an aggregate of the members).
//!
//! Each propagated change is flagged as manually changed and is itself
//! handled like a toggle, so nested groups cascade. Only rows whose state
//! actually differs are touched, which bounds the cascade.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::record::{WorkspaceInfos, WorkspaceRecord};
use crate::selection::MarkedSelection;
use crate::settings::{PageAction, Paging, Settings};
use crate::types::RecordKey;

/// One checkbox whose state changed as a result of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxChange {
    pub key: RecordKey,
    pub checked: bool,
    /// `true` for rows changed by group propagation rather than directly.
    pub propagated: bool,
}

#[derive(Debug, Clone)]
pub struct RecordTable {
    settings: Settings,
    paging: Paging,
    rows: Vec<WorkspaceRecord>,
    index: HashMap<RecordKey, usize>,
    checked: HashSet<RecordKey>,
    manually_changed: HashSet<RecordKey>,
    selection: MarkedSelection,
    actions_visible: bool,
    mass_action_enabled: bool,
    show_empty_placeholder: bool,
}

impl RecordTable {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            paging: Paging::default(),
            rows: Vec::new(),
            index: HashMap::new(),
            checked: HashSet::new(),
            manually_changed: HashSet::new(),
            selection: MarkedSelection::new(),
            actions_visible: false,
            mass_action_enabled: false,
            show_empty_placeholder: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access for filter/sort changes. The window start is
    /// re-derived in [`fetch_settings`](Self::fetch_settings).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Settings to send with the next `getWorkspaceInfos` call, with
    /// `start == limit * (current_page - 1)` enforced.
    pub fn fetch_settings(&mut self) -> Result<Settings, CoreError> {
        self.settings.align_start(&self.paging);
        self.settings.check()?;
        Ok(self.settings.clone())
    }

    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    pub fn is_paginator_visible(&self) -> bool {
        self.paging.is_paginator_visible()
    }

    /// Apply a paginator action. Returns `true` when a re-fetch is needed.
    pub fn paginate(&mut self, action: PageAction) -> Result<bool, CoreError> {
        let reload = self.paging.apply(action)?;
        if reload {
            self.settings.align_start(&self.paging);
        }
        Ok(reload)
    }

    /// Replace the rendered rows with a fresh listing.
    ///
    /// The selection is reset because marked rows may no longer be part of
    /// the view, and acting on them would touch unrelated records.
    pub fn render(&mut self, infos: WorkspaceInfos) {
        let has_records = !infos.data.is_empty();

        self.index = infos
            .data
            .iter()
            .enumerate()
            .map(|(i, record)| (record.key(), i))
            .collect();
        self.rows = infos.data;
        self.checked.clear();
        self.manually_changed.clear();
        self.selection.clear();

        self.paging.recompute(infos.total, self.settings.limit);
        self.show_empty_placeholder = infos.total == 0;

        if has_records {
            self.actions_visible = true;
            self.mass_action_enabled = true;
        }
    }

    pub fn rows(&self) -> &[WorkspaceRecord] {
        &self.rows
    }

    pub fn record(&self, key: &RecordKey) -> Option<&WorkspaceRecord> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub fn is_checked(&self, key: &RecordKey) -> bool {
        self.checked.contains(key)
    }

    pub fn is_manually_changed(&self, key: &RecordKey) -> bool {
        self.manually_changed.contains(key)
    }

    pub fn selection(&self) -> &MarkedSelection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        for key in self.selection.keys().to_vec() {
            self.checked.remove(&key);
        }
        self.selection.clear();
        self.mass_action_enabled = true;
    }

    /// `true` when the listing is empty and the placeholder replaces the table.
    pub fn show_empty_placeholder(&self) -> bool {
        self.show_empty_placeholder
    }

    /// Whether the action bar is shown at all.
    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    /// Selection actions need at least one marked record.
    pub fn selection_actions_enabled(&self) -> bool {
        !self.selection.is_empty()
    }

    /// The whole-workspace action is only offered while nothing is marked.
    pub fn mass_action_enabled(&self) -> bool {
        self.mass_action_enabled
    }

    /// Set the checkbox of `key` and propagate through its collection.
    ///
    /// Returns every checkbox that changed, the toggled one first, in the
    /// order the changes were applied.
    pub fn toggle(
        &mut self,
        key: &RecordKey,
        checked: bool,
    ) -> Result<Vec<CheckboxChange>, CoreError> {
        if !self.index.contains_key(key) {
            return Err(CoreError::NotFound(key.clone()));
        }

        let mut changes = Vec::new();
        if self.apply_state(key, checked) {
            changes.push(CheckboxChange {
                key: key.clone(),
                checked,
                propagated: false,
            });
        }
        self.handle_state_changed(key, checked, &mut changes);

        self.mass_action_enabled = self.selection.is_empty();
        Ok(changes)
    }

    // ---- private helpers ----

    /// Record the new state of one row. Returns whether it differed.
    fn apply_state(&mut self, key: &RecordKey, checked: bool) -> bool {
        if checked {
            self.checked.insert(key.clone())
        } else {
            self.checked.remove(key)
        }
    }

    /// React to one checkbox having changed: update the selection, then
    /// push the state into the row's collection.
    fn handle_state_changed(
        &mut self,
        key: &RecordKey,
        checked: bool,
        changes: &mut Vec<CheckboxChange>,
    ) {
        self.selection.set(key.clone(), checked);

        let Some(row) = self.record(key) else {
            return;
        };

        let targets: Vec<RecordKey> = if let Some(head_of) = row.collection_current.clone() {
            self.members_of(&head_of)
        } else if let Some(member_of) = row.collection.clone() {
            let mut targets = self.members_of(&member_of);
            targets.extend(self.head_of(&member_of));
            targets
        } else {
            Vec::new()
        };

        for target in targets {
            if self.is_checked(&target) == checked {
                continue;
            }
            self.apply_state(&target, checked);
            self.manually_changed.insert(target.clone());
            changes.push(CheckboxChange {
                key: target.clone(),
                checked,
                propagated: true,
            });
            self.handle_state_changed(&target, checked, changes);
        }
    }

    fn members_of(&self, collection: &str) -> Vec<RecordKey> {
        self.rows
            .iter()
            .filter(|r| r.collection.as_deref() == Some(collection))
            .map(WorkspaceRecord::key)
            .collect()
    }

    fn head_of(&self, collection: &str) -> Option<RecordKey> {
        self.rows
            .iter()
            .find(|r| r.collection_current.as_deref() == Some(collection))
            .map(WorkspaceRecord::key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn plain(uid: i64) -> WorkspaceRecord {
        WorkspaceRecord::new("pages", uid, uid + 1000)
    }

    fn head(uid: i64, group: &str) -> WorkspaceRecord {
        let mut r = WorkspaceRecord::new("tt_content", uid, uid + 1000);
        r.collection_current = Some(group.to_string());
        r
    }

    fn member(uid: i64, group: &str) -> WorkspaceRecord {
        let mut r = WorkspaceRecord::new("sys_file_reference", uid, uid + 1000);
        r.collection = Some(group.to_string());
        r
    }

    fn table_with(rows: Vec<WorkspaceRecord>) -> RecordTable {
        let mut table = RecordTable::new(Settings::new(1));
        let total = rows.len() as u64;
        table.render(WorkspaceInfos { data: rows, total });
        table
    }

    fn group_table() -> (RecordTable, RecordKey, [RecordKey; 3]) {
        let parent = head(1, "X");
        let children = [member(2, "X"), member(3, "X"), member(4, "X")];
        let keys = [children[0].key(), children[1].key(), children[2].key()];
        let parent_key = parent.key();

        let mut rows = vec![parent, plain(9)];
        rows.extend(children);
        (table_with(rows), parent_key, keys)
    }

    #[test]
    fn checking_a_child_checks_siblings_and_parent() {
        let (mut table, parent, children) = group_table();

        let changes = table.toggle(&children[0], true).unwrap();

        for child in &children {
            assert!(table.is_checked(child));
        }
        assert!(table.is_checked(&parent));
        assert!(table.is_manually_changed(&parent));
        assert!(table.is_manually_changed(&children[1]));
        assert!(!table.is_manually_changed(&children[0]));
        assert_eq!(changes.len(), 4);
        assert!(!changes[0].propagated);
    }

    #[test]
    fn unchecking_the_parent_unchecks_all_children() {
        let (mut table, parent, children) = group_table();
        table.toggle(&children[0], true).unwrap();

        table.toggle(&parent, false).unwrap();

        assert!(!table.is_checked(&parent));
        for child in &children {
            assert!(!table.is_checked(child));
        }
        assert!(table.selection().is_empty());
    }

    #[test]
    fn unchecking_one_child_forces_parent_unchecked() {
        let (mut table, parent, children) = group_table();
        table.toggle(&parent, true).unwrap();
        assert!(children.iter().all(|c| table.is_checked(c)));

        table.toggle(&children[2], false).unwrap();

        // Last toggle wins: the whole group follows the child.
        assert!(!table.is_checked(&parent));
        assert!(children.iter().all(|c| !table.is_checked(c)));
    }

    #[test]
    fn ungrouped_rows_do_not_propagate() {
        let (mut table, parent, children) = group_table();
        let loner = plain(9).key();

        let changes = table.toggle(&loner, true).unwrap();

        assert_eq!(changes.len(), 1);
        assert!(!table.is_checked(&parent));
        assert!(children.iter().all(|c| !table.is_checked(c)));
    }

    #[test]
    fn selection_mirrors_checked_rows_without_duplicates() {
        let (mut table, parent, children) = group_table();
        let loner = plain(9).key();

        table.toggle(&children[1], true).unwrap();
        table.toggle(&loner, true).unwrap();
        table.toggle(&children[1], true).unwrap();

        let selected: HashSet<&RecordKey> = table.selection().keys().iter().collect();
        assert_eq!(selected.len(), table.selection().len());
        let expected: HashSet<&RecordKey> =
            [&parent, &children[0], &children[1], &children[2], &loner].into();
        assert_eq!(selected, expected);

        // Toggled row first, then propagation order.
        assert_eq!(table.selection().keys()[0], children[1]);
    }

    #[test]
    fn nested_groups_cascade() {
        let mut middle = member(2, "outer");
        middle.collection_current = Some("inner".to_string());
        let rows = vec![head(1, "outer"), middle.clone(), member(3, "inner")];
        let mut table = table_with(rows);

        table.toggle(&head(1, "outer").key(), true).unwrap();

        assert!(table.is_checked(&middle.key()));
        assert!(table.is_checked(&member(3, "inner").key()));
    }

    #[test]
    fn action_availability_follows_selection() {
        let (mut table, _, children) = group_table();
        assert!(table.actions_visible());
        assert!(table.mass_action_enabled());
        assert!(!table.selection_actions_enabled());

        table.toggle(&children[0], true).unwrap();
        assert!(!table.mass_action_enabled());
        assert!(table.selection_actions_enabled());

        table.toggle(&children[0], false).unwrap();
        assert!(table.mass_action_enabled());
        assert!(!table.selection_actions_enabled());
    }

    #[test]
    fn render_resets_marks_and_toggles_placeholder() {
        let (mut table, _, children) = group_table();
        table.toggle(&children[0], true).unwrap();

        table.render(WorkspaceInfos::default());

        assert!(table.selection().is_empty());
        assert!(!table.is_checked(&children[0]));
        assert!(table.show_empty_placeholder());
        assert!(!table.is_paginator_visible());

        table.render(WorkspaceInfos {
            data: vec![plain(1)],
            total: 61,
        });
        assert!(!table.show_empty_placeholder());
        assert_eq!(table.paging().total_pages, 3);
        assert!(table.is_paginator_visible());
    }

    #[test]
    fn toggling_an_unknown_row_fails() {
        let (mut table, _, _) = group_table();
        assert_matches!(
            table.toggle(&RecordKey::new("pages", 77, 1), true),
            Err(CoreError::NotFound(_))
        );
    }

    #[test]
    fn fetch_settings_aligns_start_with_page() {
        let mut table = table_with(vec![plain(1)]);
        table.render(WorkspaceInfos {
            data: vec![plain(1)],
            total: 100,
        });

        assert!(table.paginate(PageAction::Page(3)).unwrap());
        let settings = table.fetch_settings().unwrap();
        assert_eq!(settings.start, 60);

        assert!(table.paginate(PageAction::Next).unwrap());
        assert!(!table.paginate(PageAction::Next).unwrap());
        let settings = table.fetch_settings().unwrap();
        assert_eq!(table.paging().current_page, 4);
        assert_eq!(settings.start, 90);
    }
}
