use std::convert::Infallible;

use jarsync_types::{StateTree, SubtreeDescriptor};

use crate::draft::TreeDraft;

/// Invoke `reducer` once per descriptor with the subtree of `state_a` and, if
/// given, of `state_b` at the descriptor's path (`None` where a path is
/// missing). Every `Some` returned by the reducer is written at that path into
/// a copy of `state_a`.
///
/// Returns `state_a` itself when the reducer never produced a change.
pub fn walk<F>(
    subtrees: &[SubtreeDescriptor],
    mut reducer: F,
    state_a: &StateTree,
    state_b: Option<&StateTree>,
) -> StateTree
where
    F: FnMut(&SubtreeDescriptor, Option<&StateTree>, Option<&StateTree>) -> Option<StateTree>,
{
    let result = try_walk(
        subtrees,
        |subtree, a, b| Ok::<_, Infallible>(reducer(subtree, a, b)),
        state_a,
        state_b,
    );
    match result {
        Ok(tree) => tree,
        Err(never) => match never {},
    }
}

/// Fallible form of [`walk`]; stops at the first reducer error.
pub fn try_walk<F, E>(
    subtrees: &[SubtreeDescriptor],
    mut reducer: F,
    state_a: &StateTree,
    state_b: Option<&StateTree>,
) -> Result<StateTree, E>
where
    F: FnMut(
        &SubtreeDescriptor,
        Option<&StateTree>,
        Option<&StateTree>,
    ) -> Result<Option<StateTree>, E>,
{
    let mut draft = TreeDraft::new(state_a);

    for subtree in subtrees {
        let subtree_a = state_a.get_path(&subtree.path);
        let subtree_b = state_b.and_then(|state| state.get_path(&subtree.path));

        if let Some(value) = reducer(subtree, subtree_a, subtree_b)? {
            draft.set(&subtree.path, value);
        }
    }

    Ok(draft.finish())
}
