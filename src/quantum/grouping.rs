use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{QuantumError, QuantumResult};
use crate::quantum::register::JointHistogram;

pub type GroupId = u64;

/// Set of objects that are currently treated as one entangled system.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<K> {
    pub id: GroupId,
    pub objects: Vec<K>,
    /// Last observed joint histogram, outcome tuples follow `objects` order.
    pub states: JointHistogram,
}

impl<K> Group<K> {
    fn new(id: GroupId) -> Self {
        Self {
            id,
            objects: Vec::new(),
            states: JointHistogram::new(),
        }
    }
}

/// Partition of quantum objects into entanglement groups.
///
/// The system owns every group. Objects find their group through `find`.
#[derive(Debug, Clone)]
pub struct GroupingSystem<K> {
    groups: Vec<Group<K>>,
    membership: HashMap<K, GroupId>,
    next_id: GroupId,
    count: usize,
}

impl<K> GroupingSystem<K>
where
    K: Clone + Eq + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            membership: HashMap::new(),
            next_id: 0,
            count: 0,
        }
    }

    /// Groups in creation order.
    pub fn groups(&self) -> &[Group<K>] {
        &self.groups
    }

    pub fn find(&self, obj: &K) -> Option<GroupId> {
        self.membership.get(obj).copied()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group<K>> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_of(&self, obj: &K) -> Option<&Group<K>> {
        self.find(obj).and_then(|id| self.group(id))
    }

    /// Регистрирует объект в новой группе или в существующей `group`
    pub fn add(&mut self, obj: K, group: Option<GroupId>) -> QuantumResult<GroupId> {
        if self.membership.contains_key(&obj) {
            return Err(QuantumError::DuplicateObject(obj.to_string()));
        }

        let id = match group {
            Some(id) => {
                let existing = self.group_mut(id)?;
                existing.objects.push(obj.clone());
                id
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                let mut created = Group::new(id);
                created.objects.push(obj.clone());
                self.groups.push(created);
                id
            }
        };

        self.membership.insert(obj, id);
        Ok(id)
    }

    /// Moves every object of `b` into `a` and drops `b`.
    /// Returns false (and does nothing) when the groups are equal or either is gone.
    pub fn merge(&mut self, a: GroupId, b: GroupId) -> bool {
        if a == b || self.group(a).is_none() {
            return false;
        }
        let Some(pos) = self.groups.iter().position(|g| g.id == b) else {
            return false;
        };

        let absorbed = self.groups.remove(pos);
        for obj in &absorbed.objects {
            self.membership.insert(obj.clone(), a);
        }
        if let Some(target) = self.groups.iter_mut().find(|g| g.id == a) {
            debug!("grouping: group {} absorbs {} ({} objects)", a, b, absorbed.objects.len());
            target.objects.extend(absorbed.objects);
        }
        true
    }

    /// Сливает группу `obj` с группой `reference`, возвращает оставшуюся группу
    pub fn join(&mut self, obj: &K, reference: &K) -> QuantumResult<GroupId> {
        let a = self
            .find(obj)
            .ok_or_else(|| QuantumError::UnknownObject(obj.to_string()))?;
        let b = self
            .find(reference)
            .ok_or_else(|| QuantumError::UnknownObject(reference.to_string()))?;
        self.merge(a, b);
        Ok(a)
    }

    pub fn set_states(&mut self, id: GroupId, states: JointHistogram) -> QuantumResult<()> {
        self.group_mut(id)?.states = states;
        Ok(())
    }

    /// Periodic correlation refresh.
    ///
    /// For every group whose cached histogram holds more than one outcome, picks
    /// outcome number `cursor % len` and returns the display alpha of each member,
    /// `(value + 1) * 127`. The cursor advances once per call.
    pub fn correlation_tick(&mut self) -> Vec<(K, u8)> {
        let mut alphas = Vec::new();
        for group in &self.groups {
            if group.states.len() > 1 {
                if let Some(outcome) = group.states.keys().nth(self.count % group.states.len()) {
                    for (obj, value) in group.objects.iter().zip(outcome) {
                        alphas.push((obj.clone(), ((value + 1) * 127) as u8));
                    }
                }
            }
        }
        self.count += 1;
        alphas
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.membership.clear();
        self.count = 0;
    }

    fn group_mut(&mut self, id: GroupId) -> QuantumResult<&mut Group<K>> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(QuantumError::UnknownGroup(id))
    }
}

impl<K> Default for GroupingSystem<K>
where
    K: Clone + Eq + Hash + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
