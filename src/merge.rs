//! Merge policy: coalesce artifacts that collide on output identity
//! instead of letting the writer overwrite them.

use std::collections::HashMap;

use crate::artifact::{dedup_preserving_order, Artifact};

/// Separator line placed between merged members.
pub const MERGE_SEPARATOR: &str = "\n// ---- merged ----\n";

/// One merge candidate: an artifact, the index of the result it came from,
/// and the writer-resolved name it will be persisted under. Grouping uses
/// the resolved name, not the raw suggestion, so `notes` and `notes.py`
/// collide the same way they would on disk.
#[derive(Debug, Clone)]
pub struct MergeCandidate {
    pub source_index: usize,
    pub resolved_name: String,
    pub artifact: Artifact,
}

/// One post-merge artifact and the index of the extraction result its
/// written path is attributed to (the first contributing file).
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    pub artifact: Artifact,
    pub source_index: usize,
}

/// Fold a non-empty group of colliding artifacts into one.
///
/// Contents are concatenated verbatim in the given order with
/// [`MERGE_SEPARATOR`] between members; `references`, `tags`, and
/// `qualifiers` are unioned preserving first-seen order. Identity fields
/// come from the first member. A single-element group passes through
/// unchanged, which makes the fold idempotent. Inputs are never mutated.
pub fn merge_group(group: &[Artifact]) -> Option<Artifact> {
    let first = group.first()?;
    if group.len() == 1 {
        return Some(first.clone());
    }

    let content = group
        .iter()
        .map(|a| a.content.as_str())
        .collect::<Vec<_>>()
        .join(MERGE_SEPARATOR);

    let union = |field: fn(&Artifact) -> &Vec<String>| {
        dedup_preserving_order(group.iter().flat_map(|a| field(a).iter().cloned()).collect())
    };

    Some(Artifact {
        content,
        kind: first.kind.clone(),
        namespace: first.namespace.clone(),
        suggested_name: first.suggested_name.clone(),
        format: first.format.clone(),
        references: union(|a| &a.references),
        tags: union(|a| &a.tags),
        qualifiers: union(|a| &a.qualifiers),
    })
}

/// Group candidates from a whole batch by `(resolved_name, format)` and
/// merge each group.
///
/// Output order is the order in which each group was first encountered;
/// each merged artifact is attributed to its first contributor and pinned
/// to the resolved name it was grouped on, so the write lands exactly
/// where the collision would have happened.
pub fn merge_batch(candidates: &[MergeCandidate]) -> Vec<MergedArtifact> {
    let mut group_index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<(usize, String, Vec<Artifact>)> = Vec::new();

    for candidate in candidates {
        let key = (
            candidate.resolved_name.clone(),
            candidate.artifact.format.clone(),
        );
        match group_index.get(&key) {
            Some(&i) => groups[i].2.push(candidate.artifact.clone()),
            None => {
                group_index.insert(key, groups.len());
                groups.push((
                    candidate.source_index,
                    candidate.resolved_name.clone(),
                    vec![candidate.artifact.clone()],
                ));
            }
        }
    }

    groups
        .iter()
        .filter_map(|(source_index, resolved_name, group)| {
            merge_group(group).map(|mut artifact| {
                artifact.suggested_name = resolved_name.clone();
                MergedArtifact {
                    artifact,
                    source_index: *source_index,
                }
            })
        })
        .collect()
}
