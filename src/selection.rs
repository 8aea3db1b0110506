//! Annotator selection with dependency constraints.
//!
//! Each annotator may require other annotators. Selecting an annotator
//! selects and locks everything it requires, transitively. Deselecting one
//! unlocks its prerequisites and then re-locks whatever is still required
//! by the remaining selection.
//!
//! ```text
//!   tokenize <── ssplit <── pos <── parse
//!                  ^
//!                  └──────── ner
//!
//!   toggle(parse)  → pos, ssplit, tokenize selected + locked
//!   toggle(ner)    → ssplit, tokenize already locked, nothing changes
//!   toggle(parse)  → pos released; ssplit, tokenize stay locked (ner)
//! ```
//!
//! # Forced selections
//!
//! An item selected only because a dependent locked it is *forced*. When the
//! last dependent goes away the forced item is deselected as well. Items the
//! user picked (directly, or through [`SelectionGroup::select_all`]) stay
//! selected when they are unlocked.
//!
//! # Failure
//!
//! Walks deeper than [`SelectionConfig::max_depth`] stop with
//! [`Error::RecursionLimitExceeded`]; true cycles stop with
//! [`Error::DependencyCycle`]. In both cases whatever was already selected
//! and locked stays that way.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::{SelectionConfig, UnresolvedPolicy};
use crate::error::{Error, Result};

/// Split a comma-separated requirement declaration.
///
/// Whitespace around identifiers and empty entries are dropped.
///
/// ```
/// use annoview::selection::parse_requires;
///
/// assert_eq!(parse_requires("tokenize, ssplit,,pos "), vec!["tokenize", "ssplit", "pos"]);
/// assert!(parse_requires("").is_empty());
/// ```
#[must_use]
pub fn parse_requires(decl: &str) -> Vec<String> {
    decl.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A selectable annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    id: String,
    requires: Vec<String>,
    selected: bool,
    locked: bool,
    forced: bool,
}

impl Item {
    /// Create an unselected item.
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            requires: requires.into_iter().map(Into::into).collect(),
            selected: false,
            locked: false,
            forced: false,
        }
    }

    /// Create an item from a comma-separated requirement declaration.
    #[must_use]
    pub fn with_requires_csv(id: impl Into<String>, decl: &str) -> Self {
        Self::new(id, parse_requires(decl))
    }

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared prerequisites, in declaration order.
    #[must_use]
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// Whether the item is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether a selected dependent holds this item.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the item is selected only on behalf of a dependent.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.forced
    }
}

enum Step {
    Enter { idx: usize, depth: usize },
    Exit,
}

/// A group of items with their selection state.
#[derive(Debug, Clone)]
pub struct SelectionGroup {
    items: Vec<Item>,
    index: HashMap<String, usize>,
    config: SelectionConfig,
}

impl SelectionGroup {
    /// Build a group. Identifiers must be unique.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if item.id.is_empty() {
                return Err(Error::parse(format!("annotator #{} has an empty id", idx)));
            }
            if index.insert(item.id.clone(), idx).is_some() {
                return Err(Error::parse(format!("duplicate annotator id '{}'", item.id)));
            }
        }
        Ok(Self {
            items,
            index,
            config: SelectionConfig::default(),
        })
    }

    /// Replace the engine settings.
    #[must_use]
    pub fn with_config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    /// All items in declaration order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&idx| &self.items[idx])
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the group has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of selected items.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|i| i.selected).count()
    }

    /// Number of locked items.
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.items.iter().filter(|i| i.locked).count()
    }

    /// Select every item, then propagate from each.
    ///
    /// A failing item does not stop the others; the first error is returned
    /// once every item has been processed.
    pub fn select_all(&mut self) -> Result<()> {
        for item in &mut self.items {
            item.selected = true;
            item.forced = false;
        }
        let mut first_err = None;
        for idx in 0..self.items.len() {
            if let Err(e) = self.propagate_from(idx, 1) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Unlock and deselect everything.
    pub fn select_none(&mut self) {
        for item in &mut self.items {
            item.locked = false;
        }
        for item in &mut self.items {
            item.selected = false;
            item.forced = false;
        }
    }

    /// Flip the selection of an item and return its new state.
    ///
    /// Locked items cannot be toggled. Deselecting unlocks the item's
    /// prerequisites, re-locks those still needed by the remaining
    /// selection and drops forced items nobody needs anymore.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let idx = self.position(id)?;
        if self.items[idx].locked {
            return Err(Error::LockedItem(id.to_string()));
        }

        if !self.items[idx].selected {
            let item = &mut self.items[idx];
            item.selected = true;
            item.forced = false;
            self.propagate_from(idx, 1)?;
            return Ok(true);
        }

        let item = &mut self.items[idx];
        item.selected = false;
        item.forced = false;

        for p in self.prerequisite_closure(idx) {
            self.items[p].locked = false;
        }
        let result = self.reconcile();
        self.drop_released();
        result.map(|()| false)
    }

    /// Select and lock the prerequisites of `id`, transitively.
    ///
    /// `depth` is the depth of `id` itself; user-facing callers pass 1.
    /// Running it again over an already propagated selection changes nothing.
    pub fn propagate_select(&mut self, id: &str, depth: usize) -> Result<()> {
        let idx = self.position(id)?;
        self.propagate_from(idx, depth)
    }

    /// Unlock every item, turning forced selections into plain ones.
    ///
    /// This is the state a form submission reads: every control enabled,
    /// checked state unchanged.
    pub fn release_locks(&mut self) {
        for item in &mut self.items {
            item.locked = false;
            item.forced = false;
        }
    }

    /// Identifiers of the selected items, in declaration order.
    #[must_use]
    pub fn submission(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.selected)
            .map(|i| i.id.as_str())
            .collect()
    }

    /// Selected items that directly require `id`.
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.selected && i.requires.iter().any(|r| r == id))
            .map(|i| i.id.as_str())
            .collect()
    }

    /// Report unresolved references and cycles without touching the state.
    #[must_use]
    pub fn validate(&self) -> Vec<Error> {
        let mut issues = Vec::new();
        for item in &self.items {
            for reference in &item.requires {
                if !self.index.contains_key(reference) {
                    issues.push(Error::UnknownDependencyReference {
                        item: item.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        issues.extend(self.find_cycles());
        issues
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::unknown_item(id))
    }

    fn force(&mut self, idx: usize) {
        let item = &mut self.items[idx];
        if !item.selected {
            item.selected = true;
            item.forced = true;
        }
        item.locked = true;
    }

    fn resolve(&self, from: usize, reference: &str) -> Result<Option<usize>> {
        if let Some(&idx) = self.index.get(reference) {
            return Ok(Some(idx));
        }
        let item = &self.items[from].id;
        match self.config.unresolved {
            UnresolvedPolicy::Ignore => Ok(None),
            UnresolvedPolicy::Warn => {
                log::warn!("'{}' requires unknown annotator '{}', skipping", item, reference);
                Ok(None)
            }
            UnresolvedPolicy::Fail => Err(Error::UnknownDependencyReference {
                item: item.clone(),
                reference: reference.to_string(),
            }),
        }
    }

    /// Iterative depth-first walk over requirements.
    ///
    /// Items without requirements end the walk before the depth check, so a
    /// leaf one level past the ceiling is still fine.
    fn propagate_from(&mut self, start: usize, depth: usize) -> Result<()> {
        let mut stack = vec![Step::Enter { idx: start, depth }];
        let mut path: Vec<usize> = Vec::new();
        let mut expanded: HashSet<usize> = HashSet::new();

        while let Some(step) = stack.pop() {
            let (idx, depth) = match step {
                Step::Exit => {
                    path.pop();
                    continue;
                }
                Step::Enter { idx, depth } => (idx, depth),
            };

            if let Some(pos) = path.iter().position(|&p| p == idx) {
                let mut cycle: Vec<String> =
                    path[pos..].iter().map(|&p| self.items[p].id.clone()).collect();
                cycle.push(self.items[idx].id.clone());
                log::warn!("dependency cycle: {}", cycle.join(" -> "));
                return Err(Error::DependencyCycle { path: cycle });
            }
            if self.items[idx].requires.is_empty() || expanded.contains(&idx) {
                continue;
            }
            if depth > self.config.max_depth {
                log::warn!(
                    "recursion limit reached at '{}' (depth {} > {})",
                    self.items[idx].id,
                    depth,
                    self.config.max_depth
                );
                return Err(Error::RecursionLimitExceeded {
                    item: self.items[idx].id.clone(),
                    depth,
                    limit: self.config.max_depth,
                });
            }

            expanded.insert(idx);
            path.push(idx);
            stack.push(Step::Exit);

            let requires = self.items[idx].requires.clone();
            let mut children = Vec::with_capacity(requires.len());
            for reference in &requires {
                if let Some(child) = self.resolve(idx, reference)? {
                    self.force(child);
                    children.push(child);
                }
            }
            // Reversed so requirements are walked in declaration order.
            for child in children.into_iter().rev() {
                stack.push(Step::Enter {
                    idx: child,
                    depth: depth + 1,
                });
            }
        }
        Ok(())
    }

    /// Every item reachable through requirements, excluding `start`.
    fn prerequisite_closure(&self, start: usize) -> Vec<usize> {
        let mut seen = HashSet::from([start]);
        let mut order = Vec::new();
        let mut queue = vec![start];
        while let Some(idx) = queue.pop() {
            for reference in &self.items[idx].requires {
                if let Some(&child) = self.index.get(reference) {
                    if seen.insert(child) {
                        order.push(child);
                        queue.push(child);
                    }
                }
            }
        }
        order
    }

    /// Re-run propagation from every item the user selected.
    fn reconcile(&mut self) -> Result<()> {
        let mut first_err = None;
        for idx in 0..self.items.len() {
            let item = &self.items[idx];
            if item.selected && !item.forced {
                if let Err(e) = self.propagate_from(idx, 1) {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn drop_released(&mut self) {
        for item in &mut self.items {
            if item.forced && !item.locked {
                log::debug!("releasing '{}'", item.id);
                item.selected = false;
                item.forced = false;
            }
        }
    }

    /// One cycle per back edge found by a depth-first search.
    fn find_cycles(&self) -> Vec<Error> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.items.len()];
        let mut cycles = Vec::new();

        for root in 0..self.items.len() {
            if marks[root] != Mark::New {
                continue;
            }
            // (node, next requirement to look at)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::Open;

            while let Some(&(node, next)) = stack.last() {
                let requires = &self.items[node].requires;
                if next >= requires.len() {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                }
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let reference = &requires[next];
                let Some(&child) = self.index.get(reference) else {
                    continue;
                };
                match marks[child] {
                    Mark::New => {
                        marks[child] = Mark::Open;
                        stack.push((child, 0));
                    }
                    Mark::Open => {
                        let pos = stack.iter().position(|&(n, _)| n == child).unwrap_or(0);
                        let mut path: Vec<String> = stack[pos..]
                            .iter()
                            .map(|&(n, _)| self.items[n].id.clone())
                            .collect();
                        path.push(self.items[child].id.clone());
                        cycles.push(Error::DependencyCycle { path });
                    }
                    Mark::Done => {}
                }
            }
        }
        cycles
    }
}
