use std::fmt;

use jarsync_types::StateTree;

use crate::action::Action;

/// The application store the middleware sits in front of.
///
/// [`Store::apply`] is the next handler in the chain: the middleware calls it
/// exactly once per dispatched action, possibly with a rewritten payload.
pub trait Store {
    /// Current state snapshot.
    fn state(&self) -> StateTree;

    /// Apply `action` to the store.
    fn apply(&mut self, action: &Action);
}

/// Merge `payload` into `state`.
///
/// Objects are merged key by key, recursively; any other payload value
/// replaces what was there. A payload that is not an object is ignored.
/// Untouched branches keep their identity, and `state` itself is returned when
/// nothing changes.
pub fn merge_state(state: &StateTree, payload: &StateTree) -> StateTree {
    if payload.as_object().is_none() {
        return state.clone();
    }
    merge_node(state, payload)
}

fn merge_node(state: &StateTree, payload: &StateTree) -> StateTree {
    let (Some(current), Some(incoming)) = (state.as_object(), payload.as_object()) else {
        return if state == payload {
            state.clone()
        } else {
            payload.clone()
        };
    };

    let mut merged = current.clone();
    let mut changed = false;
    for (key, value) in incoming {
        let next = match current.get(key) {
            Some(existing) => {
                let next = merge_node(existing, value);
                if StateTree::ptr_eq(existing, &next) {
                    continue;
                }
                next
            }
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
        changed = true;
    }

    if changed {
        StateTree::object(merged)
    } else {
        state.clone()
    }
}

type ReducerFn = dyn FnMut(&StateTree, &Action) -> StateTree + Send;

/// A [`Store`] driven by a reducer function.
///
/// Hydration actions are merged with [`merge_state`]; every other action
/// goes to the reducer.
pub struct ReducerStore {
    state: StateTree,
    reducer: Box<ReducerFn>,
}

impl ReducerStore {
    pub fn new<F>(initial: StateTree, reducer: F) -> Self
    where
        F: FnMut(&StateTree, &Action) -> StateTree + Send + 'static,
    {
        Self {
            state: initial,
            reducer: Box::new(reducer),
        }
    }
}

impl Store for ReducerStore {
    fn state(&self) -> StateTree {
        self.state.clone()
    }

    fn apply(&mut self, action: &Action) {
        self.state = match action {
            Action::Hydrate { payload } | Action::ImportCookieState { payload } => {
                merge_state(&self.state, payload)
            }
            _ => (self.reducer)(&self.state, action),
        };
    }
}

impl fmt::Debug for ReducerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerStore")
            .field("state", &self.state)
            .finish()
    }
}
