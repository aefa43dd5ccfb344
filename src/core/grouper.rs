/*
 * View organization for the entry list. Groups partition entries by extension
 * for display and bulk selection; they hold indices into the canonical
 * collection and never reorder it, so merge order stays catalog order.
 */
use super::models::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    pub extension: String,
    /* Indices into the canonical entry collection, in catalog order. */
    pub entry_indices: Vec<usize>,
    pub all_selected: bool,
}

pub fn group_key(entry: &FileEntry) -> &str {
    &entry.extension
}

/*
 * Partitions `entries` by extension. Groups are listed in the order their
 * extension first appears in the catalog.
 */
pub fn group_entries(entries: &[FileEntry]) -> Vec<EntryGroup> {
    let mut groups: Vec<EntryGroup> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let key = group_key(entry);
        match groups.iter_mut().find(|g| g.extension == key) {
            Some(group) => {
                group.entry_indices.push(index);
                group.all_selected &= entry.is_selected;
            }
            None => groups.push(EntryGroup {
                extension: key.to_string(),
                entry_indices: vec![index],
                all_selected: entry.is_selected,
            }),
        }
    }
    groups
}

/*
 * Bulk toggle for one extension group: a fully selected group becomes fully
 * deselected, anything else (including a mixed group) becomes fully selected.
 * Returns the state applied, or `None` if no entry has that extension.
 */
pub fn toggle_group(entries: &mut [FileEntry], extension: &str) -> Option<bool> {
    let mut members = entries
        .iter()
        .filter(|e| group_key(e) == extension)
        .peekable();
    members.peek()?;
    let all_selected = members.all(|e| e.is_selected);
    let target_state = !all_selected;

    for entry in entries.iter_mut().filter(|e| e.extension == extension) {
        entry.is_selected = target_state;
    }
    log::debug!("Grouper: Group '{extension}' set to selected={target_state}.");
    Some(target_state)
}
