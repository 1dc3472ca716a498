//! Identity interning: volatile keys to dense surrogate ids.

use crate::error::{SurrogateExhausted, TableError};
use framedelta_common::{EquipmentId, ParticipantId, StableKey, Surrogate};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Append-only mapping from a key to a dense surrogate id.
///
/// The n-th distinct key resolved receives id n (starting at 1). Entries are
/// never removed, so an id is never handed out twice.
#[derive(Debug, Clone)]
pub struct SurrogateTable<K, Id> {
    ids: HashMap<K, Id>,
    /// Keys in assignment order; `keys[i]` has surrogate `i + 1`.
    keys: Vec<K>,
    _id: PhantomData<Id>,
}

impl<K, Id> Default for SurrogateTable<K, Id> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            keys: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<K, Id> SurrogateTable<K, Id>
where
    K: Eq + Hash + Clone,
    Id: Surrogate,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the surrogate for `key`, allocating the next one on first sight.
    ///
    /// The boolean is `true` when the id was freshly allocated by this call.
    pub fn resolve<Q>(&mut self, key: &Q) -> Result<(Id, bool), SurrogateExhausted>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(id) = self.ids.get(key) {
            return Ok((*id, false));
        }
        let raw = u32::try_from(self.keys.len() + 1)
            .ok()
            .filter(|&raw| raw <= Id::MAX)
            .ok_or(SurrogateExhausted {
                namespace: Id::NAMESPACE,
            })?;
        let id = Id::from_raw(raw);
        let owned = key.to_owned();
        self.ids.insert(owned.clone(), id);
        self.keys.push(owned);
        Ok((id, true))
    }

    /// Look up an existing surrogate without allocating.
    pub fn get<Q>(&self, key: &Q) -> Option<Id>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.get(key).copied()
    }

    /// Reverse lookup: the key a surrogate was assigned to.
    pub fn key(&self, id: Id) -> Option<&K> {
        let index = (id.raw() as usize).checked_sub(1)?;
        self.keys.get(index)
    }

    pub fn contains_id(&self, id: Id) -> bool {
        id.raw() >= 1 && (id.raw() as usize) <= self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(id, key)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &K)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, k)| (Id::from_raw(i as u32 + 1), k))
    }

    /// Rebuild from `(id, key)` pairs, which must be dense and ordered from 1.
    fn from_pairs(pairs: impl IntoIterator<Item = (Id, K)>) -> Result<Self, TableError>
    where
        K: fmt::Debug,
    {
        let mut table = Self::new();
        for (position, (id, key)) in pairs.into_iter().enumerate() {
            if id.raw() as usize != position + 1 {
                return Err(TableError::NotDense {
                    namespace: Id::NAMESPACE,
                    position,
                    found: id.raw(),
                });
            }
            if table.ids.insert(key.clone(), id).is_some() {
                return Err(TableError::DuplicateKey {
                    namespace: Id::NAMESPACE,
                    key: format!("{key:?}"),
                });
            }
            table.keys.push(key);
        }
        Ok(table)
    }
}

/// One entry of the player table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub stable_key: StableKey,
    pub id: ParticipantId,
    pub name: String,
}

/// Participant identities seen during a run, with their first display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<PlayerRecord>", try_from = "Vec<PlayerRecord>")]
pub struct PlayerTable {
    table: SurrogateTable<StableKey, ParticipantId>,
    /// Display names indexed like `table.keys`.
    names: Vec<String>,
}

impl PlayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a participant. The name is stored only when the key is new.
    pub fn resolve(
        &mut self,
        key: StableKey,
        name: &str,
    ) -> Result<(ParticipantId, bool), SurrogateExhausted> {
        let (id, fresh) = self.table.resolve(&key)?;
        if fresh {
            self.names.push(name.to_owned());
        }
        Ok((id, fresh))
    }

    pub fn get(&self, key: StableKey) -> Option<ParticipantId> {
        self.table.get(&key)
    }

    pub fn record(&self, id: ParticipantId) -> Option<PlayerRecord> {
        let stable_key = *self.table.key(id)?;
        let name = self.names.get(id.0 as usize - 1)?.clone();
        Some(PlayerRecord {
            stable_key,
            id,
            name,
        })
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.table.contains_id(id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Records in surrogate order.
    pub fn records(&self) -> impl Iterator<Item = PlayerRecord> + '_ {
        self.table
            .iter()
            .zip(&self.names)
            .map(|((id, key), name)| PlayerRecord {
                stable_key: *key,
                id,
                name: name.clone(),
            })
    }

    pub fn from_records(records: Vec<PlayerRecord>) -> Result<Self, TableError> {
        let mut names = Vec::with_capacity(records.len());
        let pairs: Vec<_> = records
            .into_iter()
            .map(|r| {
                names.push(r.name);
                (r.id, r.stable_key)
            })
            .collect();
        let table = SurrogateTable::from_pairs(pairs)?;
        Ok(Self { table, names })
    }
}

impl From<PlayerTable> for Vec<PlayerRecord> {
    fn from(table: PlayerTable) -> Self {
        table.records().collect()
    }
}

impl TryFrom<Vec<PlayerRecord>> for PlayerTable {
    type Error = TableError;

    fn try_from(records: Vec<PlayerRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

/// One entry of the equipment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: EquipmentId,
    pub name: String,
}

/// Equipment kinds seen during a run, keyed by item name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<EquipmentRecord>", try_from = "Vec<EquipmentRecord>")]
pub struct EquipmentTable {
    table: SurrogateTable<String, EquipmentId>,
}

impl EquipmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, name: &str) -> Result<(EquipmentId, bool), SurrogateExhausted> {
        self.table.resolve(name)
    }

    pub fn get(&self, name: &str) -> Option<EquipmentId> {
        self.table.get(name)
    }

    pub fn name(&self, id: EquipmentId) -> Option<&str> {
        self.table.key(id).map(String::as_str)
    }

    pub fn contains(&self, id: EquipmentId) -> bool {
        self.table.contains_id(id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = EquipmentRecord> + '_ {
        self.table.iter().map(|(id, name)| EquipmentRecord {
            id,
            name: name.clone(),
        })
    }

    pub fn from_records(records: Vec<EquipmentRecord>) -> Result<Self, TableError> {
        let table = SurrogateTable::from_pairs(records.into_iter().map(|r| (r.id, r.name)))?;
        Ok(Self { table })
    }
}

impl From<EquipmentTable> for Vec<EquipmentRecord> {
    fn from(table: EquipmentTable) -> Self {
        table.records().collect()
    }
}

impl TryFrom<Vec<EquipmentRecord>> for EquipmentTable {
    type Error = TableError;

    fn try_from(records: Vec<EquipmentRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl PartialEq for PlayerTable {
    fn eq(&self, other: &Self) -> bool {
        self.table.keys == other.table.keys && self.names == other.names
    }
}

impl PartialEq for EquipmentTable {
    fn eq(&self, other: &Self) -> bool {
        self.table.keys == other.table.keys
    }
}

/// Per-run interning state for both namespaces.
///
/// Owned by a single [`Timeline`](crate::Timeline); never shared between runs.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    players: PlayerTable,
    equipment: EquipmentTable,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve_participant(
        &mut self,
        key: StableKey,
        name: &str,
    ) -> Result<(ParticipantId, bool), SurrogateExhausted> {
        self.players.resolve(key, name)
    }

    pub fn resolve_equipment(
        &mut self,
        name: &str,
    ) -> Result<(EquipmentId, bool), SurrogateExhausted> {
        self.equipment.resolve(name)
    }

    pub fn players(&self) -> &PlayerTable {
        &self.players
    }

    pub fn equipment(&self) -> &EquipmentTable {
        &self.equipment
    }

    pub fn into_tables(self) -> (PlayerTable, EquipmentTable) {
        (self.players, self.equipment)
    }
}
