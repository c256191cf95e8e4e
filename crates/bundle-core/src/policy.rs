//! Per-phase rules for changes made by an external generator.
//!
//! Every change is classified by where it happens relative to the protected
//! root (`resources.jobs` by default) and looked up in the phase's rule
//! table. Changes without a matching rule are rejected. No phase has rules
//! for `Outside` or `Ancestor`, so a generator can only add resources to a
//! root that already exists in the bundle.
//!
//! | scope      | meaning                                   |
//! |------------|-------------------------------------------|
//! | `Outside`  | not under the protected root              |
//! | `Ancestor` | the protected root itself or a parent     |
//! | `Resource` | a direct child of the root, one resource  |
//! | `Property` | anything deeper inside a resource         |

use crate::phase::Phase;
use bundle_config::{ChangeKind, OverrideError, OverrideVisitor};
use bundle_dyn::{Path, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Outside,
    Ancestor,
    Resource,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Reject,
}

type Rule = (Scope, ChangeKind, Verdict);

/// Load may only add new resources.
const LOAD_RULES: &[Rule] = &[
    (Scope::Resource, ChangeKind::Insert, Verdict::Accept),
];

/// Init may add and modify resources but never remove one.
const INIT_RULES: &[Rule] = &[
    (Scope::Resource, ChangeKind::Insert, Verdict::Accept),
    (Scope::Resource, ChangeKind::Update, Verdict::Accept),
    (Scope::Property, ChangeKind::Insert, Verdict::Accept),
    (Scope::Property, ChangeKind::Update, Verdict::Accept),
    (Scope::Property, ChangeKind::Delete, Verdict::Accept),
];

fn rules(phase: Phase) -> &'static [Rule] {
    match phase {
        Phase::Load => LOAD_RULES,
        Phase::Init => INIT_RULES,
    }
}

/// Path of the region generators are allowed to touch, `resources.jobs`.
pub fn default_protected_root() -> Path {
    Path::from_keys(["resources", "jobs"])
}

/// [`OverrideVisitor`] enforcing the rules of one [`Phase`].
#[derive(Debug, Clone)]
pub struct PhasePolicy {
    phase: Phase,
    root: Path,
}

impl PhasePolicy {
    pub fn new(phase: Phase) -> Self {
        Self::with_root(phase, default_protected_root())
    }

    pub fn with_root(phase: Phase, root: Path) -> Self {
        Self { phase, root }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope(&self, path: &Path) -> Scope {
        if self.root.has_prefix(path) {
            Scope::Ancestor
        } else if !path.has_prefix(&self.root) {
            Scope::Outside
        } else if path.len() == self.root.len() + 1 {
            Scope::Resource
        } else {
            Scope::Property
        }
    }

    fn verdict(&self, path: &Path, kind: ChangeKind) -> Verdict {
        let scope = self.scope(path);
        rules(self.phase)
            .iter()
            .find(|(s, k, _)| *s == scope && *k == kind)
            .map_or(Verdict::Reject, |(_, _, verdict)| *verdict)
    }
}

impl OverrideVisitor for PhasePolicy {
    fn visit_insert(&self, path: &Path, value: Value) -> Result<Value, OverrideError> {
        match self.verdict(path, ChangeKind::Insert) {
            Verdict::Accept => {
                tracing::debug!(phase = %self.phase, "Insert value at '{}'", path);
                Ok(value)
            }
            Verdict::Reject => Err(OverrideError::unexpected(path.clone(), ChangeKind::Insert)),
        }
    }

    fn visit_update(&self, path: &Path, _left: Value, right: Value) -> Result<Value, OverrideError> {
        match self.verdict(path, ChangeKind::Update) {
            Verdict::Accept => {
                tracing::debug!(phase = %self.phase, "Update value at '{}'", path);
                Ok(right)
            }
            Verdict::Reject => Err(OverrideError::unexpected(path.clone(), ChangeKind::Update)),
        }
    }

    fn visit_delete(&self, path: &Path, _value: &Value) -> Result<(), OverrideError> {
        match self.verdict(path, ChangeKind::Delete) {
            Verdict::Accept => {
                tracing::debug!(phase = %self.phase, "Delete value at '{}'", path);
                Ok(())
            }
            Verdict::Reject => Err(OverrideError::unexpected(path.clone(), ChangeKind::Delete)),
        }
    }
}
