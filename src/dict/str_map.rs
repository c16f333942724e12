//! StrMap - string-keyed hash map with SIMD-probed buckets
//!
//! Open addressing over buckets of sixteen slots. Each bucket carries a
//! sixteen-byte metadata strip probed with one vector compare per lookup
//! step: a tag of `0` marks an empty slot, `1` a tombstone, and any other
//! value is the low byte of the slot's key hash. Hash low bytes of 0 and 1
//! are remapped to 2 so the empty and tombstone tags can share the strip
//! with real fingerprints - that remap is load-bearing, not cosmetic.
//!
//! Probing is bucket-linear from `(hash & (slots - 1)) / 16`, wrapping at
//! the end. Tombstones keep a probe going; an empty slot anywhere in a
//! bucket terminates it. Insertions reuse the first empty or tombstone
//! slot seen along the way.
//!
//! # Examples
//!
//! ```rust
//! use bytekit::{FlexStr, StrMap};
//!
//! let mut map = StrMap::new();
//! map.set(FlexStr::new("key").unwrap(), 42).unwrap();
//! assert_eq!(map.get("key"), Some(&42));
//! ```

use crate::error::{BytekitError, Result};
use crate::simd::match_byte16;
use crate::string::{hash_bytes, FlexStr};
use std::fmt;
use std::ops::ControlFlow;

/// Slots per bucket, sized for one 16-lane vector compare.
const BUCKET_SLOTS: usize = 16;

/// Metadata tag for a never-used slot.
const META_EMPTY: u8 = 0;
/// Metadata tag for a deleted slot.
const META_TOMBSTONE: u8 = 1;

/// Hash function over key bytes.
pub type HashFn = fn(&[u8]) -> u64;

struct Bucket<V> {
    meta: [u8; BUCKET_SLOTS],
    pairs: [Option<(FlexStr<'static>, V)>; BUCKET_SLOTS],
}

impl<V> Bucket<V> {
    fn empty() -> Self {
        Self {
            meta: [META_EMPTY; BUCKET_SLOTS],
            pairs: std::array::from_fn(|_| None),
        }
    }

    #[inline]
    fn has_empty(&self) -> bool {
        match_byte16(&self.meta, META_EMPTY) != 0
    }
}

/// Hash map from owned string keys to values of type `V`.
///
/// See the [module docs](self) for the probe scheme.
pub struct StrMap<V> {
    buckets: Vec<Bucket<V>>,
    count: usize,
    hash: HashFn,
}

#[inline]
fn fingerprint(hash: u64) -> u8 {
    let fp = hash as u8;
    if fp <= META_TOMBSTONE {
        2
    } else {
        fp
    }
}

impl<V> StrMap<V> {
    /// Create an empty map with the bundled hash function.
    pub fn new() -> Self {
        Self::with_hasher(hash_bytes)
    }

    /// Create an empty map that hashes keys with `hash`.
    pub fn with_hasher(hash: HashFn) -> Self {
        Self {
            buckets: Vec::new(),
            count: 0,
            hash,
        }
    }

    /// Create a map with room for `capacity` pairs before the first grow.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut map = Self::new();
        map.reserve(capacity)?;
        Ok(map)
    }

    /// Number of live key-value pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the map holds no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total slots currently allocated; a power of two, or zero before
    /// the first insertion.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BUCKET_SLOTS
    }

    #[inline]
    fn slots(&self) -> usize {
        self.buckets.len() * BUCKET_SLOTS
    }

    #[inline]
    fn start_bucket(&self, hash: u64) -> usize {
        (hash as usize & (self.slots() - 1)) / BUCKET_SLOTS
    }

    /// Locate a live key. Returns `(bucket, slot)`.
    fn find(&self, key: &[u8], hash: u64) -> Option<(usize, usize)> {
        if self.buckets.is_empty() {
            return None;
        }

        let fp = fingerprint(hash);
        let bucket_count = self.buckets.len();
        let mut b = self.start_bucket(hash);

        for _ in 0..bucket_count {
            let bucket = &self.buckets[b];
            let mut mask = match_byte16(&bucket.meta, fp);

            while mask != 0 {
                let slot = mask.trailing_zeros() as usize;
                mask &= mask - 1;

                if let Some((k, _)) = &bucket.pairs[slot] {
                    if crate::string::search::bytes_equal(k.as_bytes(), key) {
                        return Some((b, slot));
                    }
                }
            }

            if bucket.has_empty() {
                return None;
            }
            b = (b + 1) % bucket_count;
        }

        None
    }

    /// First reusable slot along the probe path: an empty slot stops the
    /// probe, the first tombstone seen wins otherwise.
    fn find_free(&self, hash: u64) -> (usize, usize) {
        debug_assert!(!self.buckets.is_empty());

        let bucket_count = self.buckets.len();
        let mut b = self.start_bucket(hash);
        let mut reuse: Option<(usize, usize)> = None;

        for _ in 0..bucket_count {
            let bucket = &self.buckets[b];

            let tombs = match_byte16(&bucket.meta, META_TOMBSTONE);
            if reuse.is_none() && tombs != 0 {
                reuse = Some((b, tombs.trailing_zeros() as usize));
            }

            let empties = match_byte16(&bucket.meta, META_EMPTY);
            if empties != 0 {
                return reuse.unwrap_or((b, empties.trailing_zeros() as usize));
            }

            b = (b + 1) % bucket_count;
        }

        // Load factor keeps live count below capacity, so a full wrap
        // means every remaining slot is a tombstone.
        reuse.expect("probe found neither empty slot nor tombstone")
    }

    /// Ensure `additional` more pairs fit under the load-factor bound.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.count + additional;
        if self.slots() > 0 && needed * 10 <= self.slots() * 7 {
            return Ok(());
        }

        let mut new_slots = (self.slots() * 2).max(BUCKET_SLOTS);
        while needed * 10 > new_slots * 7 {
            new_slots *= 2;
        }
        self.grow_to(new_slots)
    }

    fn grow_to(&mut self, new_slots: usize) -> Result<()> {
        debug_assert!(new_slots.is_power_of_two() && new_slots >= BUCKET_SLOTS);
        log::trace!(
            "str_map grow: {} -> {} slots ({} live)",
            self.slots(),
            new_slots,
            self.count
        );

        let bucket_count = new_slots / BUCKET_SLOTS;
        let mut fresh: Vec<Bucket<V>> = Vec::new();
        fresh.try_reserve_exact(bucket_count)
            .map_err(|_| BytekitError::out_of_memory(bucket_count * std::mem::size_of::<Bucket<V>>()))?;
        fresh.resize_with(bucket_count, Bucket::empty);

        if self.count == 0 {
            // Nothing to carry over; swap in place.
            self.buckets = fresh;
            return Ok(());
        }

        let old = std::mem::replace(&mut self.buckets, fresh);
        self.count = 0;
        for mut bucket in old {
            for slot in 0..BUCKET_SLOTS {
                if bucket.meta[slot] > META_TOMBSTONE {
                    if let Some((key, value)) = bucket.pairs[slot].take() {
                        // Keys are unique by construction; skip the search.
                        self.insert_unchecked(key, value);
                    }
                }
            }
        }
        Ok(())
    }

    fn insert_unchecked(&mut self, key: FlexStr<'static>, value: V) {
        let hash = (self.hash)(key.as_bytes());
        let (b, slot) = self.find_free(hash);
        self.buckets[b].meta[slot] = fingerprint(hash);
        self.buckets[b].pairs[slot] = Some((key, value));
        self.count += 1;
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        let key = key.as_ref();
        let hash = (self.hash)(key);
        self.find(key, hash)
            .and_then(|(b, s)| self.buckets[b].pairs[s].as_ref())
            .map(|(_, v)| v)
    }

    /// Get a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut V> {
        let key = key.as_ref();
        let hash = (self.hash)(key);
        self.find(key, hash)
            .and_then(|(b, s)| self.buckets[b].pairs[s].as_mut())
            .map(|(_, v)| v)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        self.find(key, (self.hash)(key)).is_some()
    }

    /// Insert or overwrite, returning the previous value if any.
    pub fn set(&mut self, key: FlexStr<'static>, value: V) -> Result<Option<V>> {
        let hash = (self.hash)(key.as_bytes());
        if let Some((b, s)) = self.find(key.as_bytes(), hash) {
            let pair = self.buckets[b].pairs[s].as_mut().expect("live slot");
            return Ok(Some(std::mem::replace(&mut pair.1, value)));
        }

        self.reserve(1)?;
        self.insert_unchecked(key, value);
        Ok(None)
    }

    /// Insert a new pair; fails with `AlreadyExists` when the key is
    /// present.
    pub fn insert(&mut self, key: FlexStr<'static>, value: V) -> Result<()> {
        let hash = (self.hash)(key.as_bytes());
        if self.find(key.as_bytes(), hash).is_some() {
            return Err(BytekitError::already_exists(key.to_string()));
        }

        self.reserve(1)?;
        self.insert_unchecked(key, value);
        Ok(())
    }

    /// Insert without checking for the key's presence.
    ///
    /// This is the rehash fast path; inserting a key that is already
    /// live leaves the map with two entries for it.
    pub fn force_insert(&mut self, key: FlexStr<'static>, value: V) -> Result<()> {
        self.reserve(1)?;
        self.insert_unchecked(key, value);
        Ok(())
    }

    /// Remove a pair, returning its value; fails with `NotFound` when
    /// the key is absent. The slot is marked with a tombstone so probe
    /// chains stay intact.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Result<V> {
        let key = key.as_ref();
        let hash = (self.hash)(key);
        let (b, s) = self
            .find(key, hash)
            .ok_or_else(|| BytekitError::not_found(String::from_utf8_lossy(key)))?;

        self.buckets[b].meta[s] = META_TOMBSTONE;
        let (_, value) = self.buckets[b].pairs[s].take().expect("live slot");
        self.count -= 1;
        Ok(value)
    }

    /// Drop every pair, keeping the allocated buckets.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.meta = [META_EMPTY; BUCKET_SLOTS];
            for pair in &mut bucket.pairs {
                *pair = None;
            }
        }
        self.count = 0;
    }

    /// Visit every live pair in bucket-major, slot-minor order.
    ///
    /// A `Break` from the callback stops the walk and surfaces as
    /// `Interrupted`.
    pub fn each(
        &self,
        mut f: impl FnMut(&FlexStr<'static>, &V) -> ControlFlow<()>,
    ) -> Result<()> {
        for bucket in &self.buckets {
            for slot in 0..BUCKET_SLOTS {
                if bucket.meta[slot] > META_TOMBSTONE {
                    if let Some((k, v)) = &bucket.pairs[slot] {
                        if f(k, v).is_break() {
                            return Err(BytekitError::Interrupted);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Visit every live pair, deleting those for which `f` returns
    /// `false`. Returns how many pairs were removed.
    pub fn filter(&mut self, mut f: impl FnMut(&FlexStr<'static>, &V) -> bool) -> usize {
        let mut removed = 0;
        for bucket in &mut self.buckets {
            for slot in 0..BUCKET_SLOTS {
                if bucket.meta[slot] > META_TOMBSTONE {
                    let keep = bucket.pairs[slot]
                        .as_ref()
                        .map(|(k, v)| f(k, v))
                        .unwrap_or(true);
                    if !keep {
                        bucket.meta[slot] = META_TOMBSTONE;
                        bucket.pairs[slot] = None;
                        removed += 1;
                    }
                }
            }
        }
        self.count -= removed;
        removed
    }

    /// Iterator over live pairs in bucket-major, slot-minor order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: &self.buckets,
            bucket: 0,
            slot: 0,
        }
    }

    /// Iterator over keys.
    pub fn keys<'m>(&'m self) -> impl Iterator<Item = &'m FlexStr<'static>> + 'm {
        self.iter().map(|(k, _)| k)
    }

    /// Iterator over values.
    pub fn values<'m>(&'m self) -> impl Iterator<Item = &'m V> + 'm {
        self.iter().map(|(_, v)| v)
    }
}

impl<V> Default for StrMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for StrMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over live pairs of a [`StrMap`].
pub struct Iter<'a, V> {
    buckets: &'a [Bucket<V>],
    bucket: usize,
    slot: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a FlexStr<'static>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.bucket < self.buckets.len() {
            let bucket = &self.buckets[self.bucket];
            while self.slot < BUCKET_SLOTS {
                let slot = self.slot;
                self.slot += 1;
                if bucket.meta[slot] > META_TOMBSTONE {
                    if let Some((k, v)) = &bucket.pairs[slot] {
                        return Some((k, v));
                    }
                }
            }
            self.bucket += 1;
            self.slot = 0;
        }
        None
    }
}
