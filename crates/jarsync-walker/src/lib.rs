//! State tree walker for jarsync.
//!
//! Given a list of [`SubtreeDescriptor`](jarsync_types::SubtreeDescriptor)s and
//! one or two state snapshots, the walker extracts each subtree from each
//! snapshot and hands them to a caller-supplied reducer. Values returned by the
//! reducer are written into a copy of the first snapshot.
//!
//! # Guarantees
//!
//! 1. Input snapshots are never mutated.
//! 2. When no write happens, the returned tree is the first snapshot itself
//!    ([`StateTree::ptr_eq`](jarsync_types::StateTree::ptr_eq) holds).
//! 3. Writes allocate fresh nodes only along the written path; every other
//!    branch is shared with the input.
//! 4. Descriptors are processed in order. Overlapping paths (one a prefix of
//!    another) are not reconciled: the later write wins where they overlap.

pub mod draft;
pub mod walk;

pub use draft::TreeDraft;
pub use walk::{try_walk, walk};
