// This file is part of resourced.

// resourced is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// resourced is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with resourced.  If not, see <http://www.gnu.org/licenses/>.

//! The Handler (§4.4–§4.6): orchestrates root creation, the update
//! algorithm, and the lookup walk against the `ChunkStore`/`BlockOracle`/
//! `Validator` trait boundaries.

use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, trace, warn};

use crate::chunkstore::{Chunk, ChunkStore};
use crate::codec::{self, DecodedUpdate};
use crate::error::{Error, Result};
use crate::index::ResourceIndex;
use crate::keyderiver::KeyDeriver;
use crate::name;
use crate::oracle::BlockOracle;
use crate::resource::Resource;
use crate::validator::Validator;
use crate::Key;

/// Tunables for a [`Handler`] (§5, §10.3).
#[derive(Debug, Clone, Copy)]
pub struct HandlerConfig {
    /// How long `update` waits for the store's `put` acknowledgement before
    /// returning success anyway (§4.5 step 6). Default 4000 ms.
    pub store_timeout: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig {
            store_timeout: Duration::from_millis(4000),
        }
    }
}

/// Identifies the resource a lookup targets: either by its name (the common
/// case) or directly by a precomputed namehash (for callers that resolved a
/// hash through some other channel and never learned the underlying name —
/// the "by-namehash" operations of §6).
#[derive(Clone)]
enum ResourceRef<'a> {
    Name(&'a str),
    Hash(Key),
}

impl<'a> ResourceRef<'a> {
    fn index_key(&self) -> String {
        match self {
            ResourceRef::Name(n) => (*n).to_string(),
            ResourceRef::Hash(h) => format!("{h:#x}"),
        }
    }
}

/// Orchestrates `NewResource`/`Update`/`Lookup*` against a `ChunkStore`, a
/// `BlockOracle`, and an optional `Validator`.
pub struct Handler<S, O> {
    store: Arc<S>,
    oracle: Arc<O>,
    validator: Option<Arc<dyn Validator>>,
    index: ResourceIndex,
    keys: KeyDeriver,
    config: HandlerConfig,
}

impl<S, O> Handler<S, O>
where
    S: ChunkStore + 'static,
    O: BlockOracle + 'static,
{
    /// Builds a handler over the given store, oracle, optional validator and
    /// config.
    pub fn new(
        store: S,
        oracle: O,
        validator: Option<Arc<dyn Validator>>,
        config: HandlerConfig,
    ) -> Self {
        Handler {
            store: Arc::new(store),
            oracle: Arc::new(oracle),
            validator,
            index: ResourceIndex::new(),
            keys: KeyDeriver::new(),
            config,
        }
    }

    /// True iff a `Validator` is actually configured. (The corrected, non-
    /// inverted polarity — see Open Question (b) in DESIGN.md.)
    pub fn is_validated(&self) -> bool {
        self.validator.is_some()
    }

    /// Releases the underlying chunk store. Operations issued afterwards are
    /// undefined.
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }

    // ---- NewResource -------------------------------------------------

    /// §4.4: registers a brand-new resource and writes its 16-byte root
    /// chunk.
    pub fn new_resource(&self, name: &str, frequency: u64) -> Result<Key> {
        if frequency == 0 {
            return Err(Error::InvalidArgument("frequency must be >= 1".into()));
        }
        name::check_safe(name)?;

        let name_hash = self.keys.name_hash(name, self.validator_ref());
        if let Some(v) = &self.validator {
            let sig = v.sign(name_hash)?;
            let addr = v.recover(name_hash, &sig)?;
            if !v.check_access(name, addr) {
                return Err(Error::AuthorizationFailed);
            }
        }

        let current_block = self.oracle.current_block()?;
        let payload = codec::encode_root(current_block, frequency);
        self.store.put(Chunk::new(name_hash, payload.to_vec()))?;

        let resource = Resource::new_registered(name.to_string(), name_hash, current_block, frequency);
        self.index.set(resource);
        debug!(target: "resource", "registered {name:?} at block {current_block}, frequency {frequency}");
        Ok(name_hash)
    }

    // ---- Update --------------------------------------------------------

    /// §4.5: publishes a new update for an existing, synced resource.
    pub fn update(&self, name: &str, data: &[u8]) -> Result<Key> {
        let resource = self
            .index
            .get(name)
            .ok_or_else(|| Error::NotSynced(name.to_string()))?;
        if !resource.is_synced() {
            return Err(Error::NotSynced(name.to_string()));
        }

        let sig_len = if self.validator.is_some() { 65 } else { 0 };
        let overhead = sig_len + name.len() + 12;
        if overhead >= codec::MAX_CHUNK_SIZE {
            return Err(Error::InvalidArgument("name too long".into()));
        }
        let size_limit = codec::MAX_CHUNK_SIZE - overhead;
        if data.len() > size_limit {
            return Err(Error::InvalidArgument(format!(
                "data length {} exceeds per-chunk limit {size_limit}",
                data.len()
            )));
        }

        let current_block = self.oracle.current_block()?;
        let next_period = Self::compute_next_period(resource.start_block, current_block, resource.frequency)?;
        let version = if resource.last_period == next_period {
            resource.version + 1
        } else {
            1
        };
        let key = self.keys.resource_hash(next_period, version, resource.name_hash);

        let signature = match &self.validator {
            Some(v) => {
                let digest = self.keys.key_data_hash(key, data);
                let sig = v.sign(digest)?;
                let addr = v.recover(digest, &sig)?;
                if !v.check_access(name, addr) {
                    return Err(Error::AuthorizationFailed);
                }
                Some(sig)
            }
            None => None,
        };

        let payload = codec::encode_update(next_period, version, name.as_bytes(), data, signature)?;

        match self.wait_for_put(Chunk::new(key, payload)) {
            Ok(()) => {}
            Err(Error::Timeout) => {
                // §4.5 step 6: a timeout is not a failure. The chunk has
                // been handed to the store; it may still land asynchronously.
                warn!(
                    target: "resource",
                    "put for {name:?} at {key:#x} did not acknowledge within {:?}; returning the key anyway",
                    self.config.store_timeout
                );
            }
            Err(e) => return Err(e),
        }

        let mut updated = resource;
        updated.last_period = next_period;
        updated.version = version;
        updated.data = data.to_vec();
        updated.last_key = Some(key);
        updated.mark_synced();
        self.index.set(updated);

        Ok(key)
    }

    /// Runs `store.put` off-thread so a slow/asynchronous store can't hold
    /// `update` past `store_timeout`. Mirrors the teacher's own background-
    /// thread-plus-`recv_timeout` handshake in `crates/net/fetch/src/client.rs`.
    fn wait_for_put(&self, chunk: Chunk) -> Result<()> {
        let store = Arc::clone(&self.store);
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(store.put(chunk));
        });
        match rx.recv_timeout(self.config.store_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Upstream(
                "store thread terminated before acknowledging put".into(),
            )),
        }
    }

    // ---- Lookup ----------------------------------------------------------

    /// `LookupVersion(name, period, version, refresh)`.
    pub fn lookup_version(&self, name: &str, period: u32, version: u32, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_walk(ResourceRef::Name(name), period, version, refresh)
    }

    /// `LookupVersionByNameHash` — as `lookup_version`, but the caller
    /// supplies the namehash directly instead of a name.
    pub fn lookup_version_by_hash(&self, name_hash: Key, period: u32, version: u32, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_walk(ResourceRef::Hash(name_hash), period, version, refresh)
    }

    /// `LookupHistorical(name, period, refresh)` — latest version within
    /// `period`.
    pub fn lookup_historical(&self, name: &str, period: u32, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_walk(ResourceRef::Name(name), period, 0, refresh)
    }

    /// `LookupHistoricalByNameHash`.
    pub fn lookup_historical_by_hash(&self, name_hash: Key, period: u32, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_walk(ResourceRef::Hash(name_hash), period, 0, refresh)
    }

    /// `LookupLatest(name, refresh)`.
    pub fn lookup_latest(&self, name: &str, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_latest_ref(ResourceRef::Name(name), refresh)
    }

    /// `LookupLatestByNameHash`.
    pub fn lookup_latest_by_hash(&self, name_hash: Key, refresh: bool) -> Result<Vec<u8>> {
        self.lookup_latest_ref(ResourceRef::Hash(name_hash), refresh)
    }

    fn lookup_latest_ref(&self, rref: ResourceRef, refresh: bool) -> Result<Vec<u8>> {
        let resource = self.load_resource(&rref, refresh)?;
        let current_block = self.oracle.current_block()?;
        let next_period = Self::compute_next_period(resource.start_block, current_block, resource.frequency)?;
        // The resource was just (re)loaded above; no need to refresh again.
        self.lookup_walk(rref, next_period, 0, false)
    }

    /// §4.6: the shared lookup walk.
    fn lookup_walk(&self, rref: ResourceRef, period: u32, version: u32, refresh: bool) -> Result<Vec<u8>> {
        if period == 0 {
            return Err(Error::InvalidArgument("period must be >= 1".into()));
        }
        let resource = self.load_resource(&rref, refresh)?;
        let validated = self.validator.is_some();
        let specific = version > 0;
        let base_version = if specific { version } else { 1 };

        let mut p = period;
        loop {
            if p == 0 {
                return Err(Error::NotFound(format!(
                    "no updates found for {:?} at or below period {period}",
                    rref.index_key()
                )));
            }
            let key = self.keys.resource_hash(p, base_version, resource.name_hash);
            match self.store.get(key) {
                Ok(chunk) => {
                    if specific {
                        return self.update_resource_index(&rref, chunk, validated);
                    }
                    // Walk versions upward within this period until one misses.
                    let mut newest = chunk;
                    let mut v = base_version + 1;
                    loop {
                        let next_key = self.keys.resource_hash(p, v, resource.name_hash);
                        match self.store.get(next_key) {
                            Ok(next_chunk) => {
                                newest = next_chunk;
                                v += 1;
                            }
                            Err(_) => break,
                        }
                    }
                    return self.update_resource_index(&rref, newest, validated);
                }
                Err(_) => {
                    trace!(target: "resource", "miss at period {p}, version {base_version}");
                    p -= 1;
                }
            }
        }
    }

    fn load_resource(&self, rref: &ResourceRef, refresh: bool) -> Result<Resource> {
        let index_key = rref.index_key();
        let cached = self.index.get(&index_key);
        if let Some(cached) = &cached {
            if !refresh {
                // §9 Open Question (c): no redundant re-read when the cache
                // is already fresh enough for the caller.
                return Ok(cached.clone());
            }
        }

        let name_hash = match rref {
            ResourceRef::Name(n) => self.keys.name_hash(n, self.validator_ref()),
            ResourceRef::Hash(h) => *h,
        };
        let chunk = self.store.get(name_hash).map_err(|_| {
            Error::NotFound(format!("no root chunk for {index_key:?}"))
        })?;
        let (start_block, frequency) = codec::decode_root(&chunk.data)?;
        if frequency == 0 {
            return Err(Error::MalformedChunk("root chunk has zero frequency".into()));
        }

        let resource = match cached {
            Some(mut r) => {
                r.start_block = start_block;
                r.frequency = frequency;
                r
            }
            None => {
                let name = match rref {
                    ResourceRef::Name(n) => (*n).to_string(),
                    ResourceRef::Hash(_) => index_key.clone(),
                };
                Resource {
                    name,
                    name_hash,
                    start_block,
                    frequency,
                    last_period: 0,
                    version: 0,
                    last_key: None,
                    data: Vec::new(),
                    updated: None,
                }
            }
        };
        self.index.set(resource.clone());
        Ok(resource)
    }

    fn update_resource_index(&self, rref: &ResourceRef, chunk: Chunk, validated: bool) -> Result<Vec<u8>> {
        let decoded: DecodedUpdate = codec::decode_update(&chunk.data, validated)?;
        self.verify_decoded_name(rref, &decoded.name)?;

        if let Some(v) = &self.validator {
            let digest = self.keys.key_data_hash(chunk.key, &decoded.data);
            let signature = decoded
                .signature
                .ok_or_else(|| Error::CryptoError("validated chunk is missing its signature".into()))?;
            // Only signature validity is checked here; authorization was
            // already enforced when the update was published (§4.6 note).
            v.recover(digest, &signature)?;
        }

        let index_key = rref.index_key();
        let mut resource = self
            .index
            .get(&index_key)
            .ok_or_else(|| Error::NotFound(format!("no cached root for {index_key:?}")))?;
        resource.last_key = Some(chunk.key);
        resource.last_period = decoded.period;
        resource.version = decoded.version;
        resource.data = decoded.data.clone();
        resource.mark_synced();
        self.index.set(resource);

        Ok(decoded.data)
    }

    fn verify_decoded_name(&self, rref: &ResourceRef, decoded_name: &[u8]) -> Result<()> {
        match rref {
            ResourceRef::Name(n) => {
                if n.as_bytes() != decoded_name {
                    return Err(Error::InvalidArgument(
                        "decoded chunk name does not match the cached resource name".into(),
                    ));
                }
            }
            ResourceRef::Hash(h) => {
                let decoded_str = std::str::from_utf8(decoded_name)
                    .map_err(|_| Error::InvalidArgument("decoded chunk name is not valid UTF-8".into()))?;
                let recomputed = self.keys.name_hash(decoded_str, self.validator_ref());
                if recomputed != *h {
                    return Err(Error::InvalidArgument(
                        "decoded chunk name does not hash back to the requested namehash".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    // ---- Accessors ---------------------------------------------------

    /// `GetContent(name)`.
    pub fn get_content(&self, name: &str) -> Result<Vec<u8>> {
        self.synced_entry(name).map(|r| r.data)
    }

    /// `GetLastPeriod(name)`.
    pub fn get_last_period(&self, name: &str) -> Result<u32> {
        self.synced_entry(name).map(|r| r.last_period)
    }

    /// `GetVersion(name)`.
    pub fn get_version(&self, name: &str) -> Result<u32> {
        self.synced_entry(name).map(|r| r.version)
    }

    /// `BlockToPeriod(name, block)`.
    pub fn block_to_period(&self, name: &str, block: u64) -> Result<u32> {
        let r = self
            .index
            .get(name)
            .ok_or_else(|| Error::NotSynced(name.to_string()))?;
        Self::compute_next_period(r.start_block, block, r.frequency)
    }

    /// `PeriodToBlock(name, period)`: the first block height of `period`.
    pub fn period_to_block(&self, name: &str, period: u32) -> Result<u64> {
        if period == 0 {
            return Err(Error::InvalidArgument("period must be >= 1".into()));
        }
        let r = self
            .index
            .get(name)
            .ok_or_else(|| Error::NotSynced(name.to_string()))?;
        Ok(r.start_block + (u64::from(period) - 1) * r.frequency)
    }

    /// `GetBlock()`: the oracle's current block height.
    pub fn get_block(&self) -> Result<u64> {
        self.oracle.current_block()
    }

    fn synced_entry(&self, name: &str) -> Result<Resource> {
        self.index
            .get(name)
            .filter(Resource::is_synced)
            .ok_or_else(|| Error::NotSynced(name.to_string()))
    }

    fn compute_next_period(start_block: u64, current_block: u64, frequency: u64) -> Result<u32> {
        if frequency == 0 {
            return Err(Error::MalformedChunk("frequency is zero".into()));
        }
        let elapsed = current_block.saturating_sub(start_block);
        let period = elapsed / frequency + 1;
        u32::try_from(period).map_err(|_| Error::InvalidArgument("period overflowed u32".into()))
    }

    fn validator_ref(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }
}
