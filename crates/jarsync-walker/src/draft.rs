use jarsync_types::{Node, StatePath, StateTree};

/// Copy-on-write builder over an immutable [`StateTree`].
///
/// Reads see all writes made so far. [`TreeDraft::finish`] hands back the
/// original handle when nothing was written.
#[derive(Clone, Debug)]
pub struct TreeDraft {
    base: StateTree,
    current: StateTree,
    dirty: bool,
}

impl TreeDraft {
    pub fn new(base: &StateTree) -> Self {
        Self {
            base: base.clone(),
            current: base.clone(),
            dirty: false,
        }
    }

    /// Read the drafted value at `path`.
    pub fn get(&self, path: &StatePath) -> Option<&StateTree> {
        self.current.get_path(path)
    }

    /// Write `value` at `path`, creating intermediate objects as needed.
    ///
    /// Writing a value deep-equal to the one already present is a no-op.
    /// Returns `true` if the draft changed.
    pub fn set(&mut self, path: &StatePath, value: StateTree) -> bool {
        if self.current.get_path(path) == Some(&value) {
            return false;
        }
        self.current = with_child(Some(&self.current), path.segments(), value);
        self.dirty = true;
        true
    }

    /// Returns `true` once any write has changed the draft.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The resulting tree; the base handle itself if the draft is clean.
    pub fn finish(self) -> StateTree {
        if self.dirty {
            self.current
        } else {
            self.base
        }
    }
}

/// Rebuild `node` with `value` placed at `segments`, sharing untouched branches.
fn with_child(node: Option<&StateTree>, segments: &[String], value: StateTree) -> StateTree {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };
    let child = with_child(node.and_then(|n| n.child(head)), rest, value);

    match node.map(StateTree::node) {
        Some(Node::Object(map)) => {
            let mut map = map.clone();
            map.insert(head.clone(), child);
            StateTree::new(Node::Object(map))
        }
        Some(Node::Array(items)) => match head.parse::<usize>() {
            Ok(index) => {
                let mut items = items.clone();
                if index >= items.len() {
                    items.resize(index + 1, StateTree::null());
                }
                items[index] = child;
                StateTree::new(Node::Array(items))
            }
            Err(_) => StateTree::object([(head.clone(), child)]),
        },
        // Missing or scalar intermediates are replaced by a fresh object.
        _ => StateTree::object([(head.clone(), child)]),
    }
}
