use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::scene::{ContainerSnapshot, ItemSnapshot};

/// All visible items sharing one logical group key, possibly gathered from
/// several physical containers. Rebuilt from scratch every pass.
#[derive(Debug, Clone)]
pub struct DayGroup {
    pub key: String,
    /// Coarse category label (weekday name) of the group, for color
    /// selection only. Never part of group identity.
    pub category_key: Option<String>,
    /// Deduplicated, sorted by `occurs_at` ascending (absent timestamps
    /// last), ties broken by `rect.y` then `rect.x`.
    pub members: Vec<ItemSnapshot>,
}

/// Scan containers and assemble day groups.
///
/// Containers sharing a key are merged; hidden items are skipped so the
/// output always agrees with whatever filtering the host applied. Containers
/// with no extractable key and groups left without members are dropped
/// silently.
pub fn detect_groups(containers: &[ContainerSnapshot]) -> Vec<DayGroup> {
    // BTreeMap keeps the cross-group order deterministic, which makes
    // repeated passes over an unchanged scene byte-identical.
    let mut groups: BTreeMap<String, DayGroup> = BTreeMap::new();

    for container in containers {
        let visible: Vec<&ItemSnapshot> =
            container.items.iter().filter(|item| item.visible).collect();

        let key = container
            .group_key
            .clone()
            .or_else(|| visible.first().and_then(|item| item.group_key.clone()));
        let Some(key) = key else {
            continue;
        };

        let group = groups.entry(key.clone()).or_insert_with(|| DayGroup {
            key,
            category_key: None,
            members: Vec::new(),
        });

        for item in visible {
            if group.category_key.is_none() {
                group.category_key = item.category_key.clone();
            }
            group.members.push(item.clone());
        }
    }

    let mut out: Vec<DayGroup> = Vec::with_capacity(groups.len());
    for (_, mut group) in groups {
        dedup_members(&mut group.members);
        if group.members.is_empty() {
            continue;
        }
        group.members.sort_by(compare_members);
        out.push(group);
    }
    out
}

/// Merged containers can contribute the same item twice; keep the first
/// occurrence of each identity.
fn dedup_members(members: &mut Vec<ItemSnapshot>) {
    let mut seen: HashSet<String> = HashSet::with_capacity(members.len());
    members.retain(|item| seen.insert(item.id.clone()));
}

fn compare_members(a: &ItemSnapshot, b: &ItemSnapshot) -> Ordering {
    match (&a.occurs_at, &b.occurs_at) {
        (Some(ta), Some(tb)) => ta.cmp(tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.rect.y.total_cmp(&b.rect.y))
    .then_with(|| a.rect.x.total_cmp(&b.rect.x))
}
