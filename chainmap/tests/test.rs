#![allow(missing_docs)] // test only
use std::{
    borrow::Borrow,
    fmt::Debug,
    hash::{BuildHasherDefault, Hash, Hasher},
};

use chainmap::{
    hash::{entry_hash, slot_index},
    ChainMap, CAPACITY,
};
use rand::prelude::*;
use zwohash::ZwoHasher;

type RefMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<ZwoHasher>>;

struct CheckedMap<K, V> {
    dut: ChainMap<K, V>,
    ref_map: RefMap<K, V>,
}

impl<K: Hash + Eq + Clone + Debug, V: Eq + Clone + Debug> CheckedMap<K, V> {
    fn new() -> Self {
        CheckedMap {
            dut: ChainMap::new(),
            ref_map: RefMap::default(),
        }
    }
    fn len(&self) -> usize {
        self.ref_map.len()
    }
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ref_result = self.ref_map.insert(key.clone(), value.clone());
        let dut_result = self.dut.insert(key, value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn put(&mut self, key: K, value: V) {
        self.ref_map.insert(key.clone(), value.clone());
        self.dut.put(key.clone(), value);
        assert_eq!(self.ref_map.get(&key), self.dut.get(&key));
    }
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let ref_result = self.ref_map.get(key);
        let dut_result = self.dut.get(key);
        assert_eq!(ref_result, dut_result);
        assert_eq!(ref_result.is_some(), self.dut.contains_key(key));
        ref_result
    }
    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let ref_result = self.ref_map.remove(key);
        let dut_result = self.dut.remove(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn update(&mut self, key: &K, f: impl Fn(&mut V)) -> bool {
        let ref_result = self.ref_map.get_mut(key).map(&f).is_some();
        let dut_result = self.dut.get_mut(key).map(&f).is_some();
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_map.len(), self.dut.len());
        assert_eq!(self.ref_map.is_empty(), self.dut.is_empty());
        for (key, value) in self.ref_map.iter() {
            assert_eq!(self.dut.get(key), Some(value));
        }
        let chained: usize = (0..CAPACITY).map(|slot| self.dut.slot_len(slot)).sum();
        assert_eq!(chained, self.ref_map.len());
    }
    /// NB: `random_likelihood` is **not** a probability. `random_likelihood == 2.0` would be 2:1 odds random:present, i.e. 2/3 probability.
    fn present_or_random_key<R: Rng>(
        &self,
        random_likelihood: f64,
        rng: &mut R,
        mut rand_k: impl FnMut(&mut R) -> K,
    ) -> K {
        if self.len() == 0 || rng.gen_range(0.0..1.0 + random_likelihood) >= 1.0 {
            rand_k(rng)
        } else {
            self.ref_map.keys().choose(rng).unwrap().clone()
        }
    }
}

macro_rules! weighted_choose {
    ($rng:expr, $($name:ident: $weight:expr => $body:expr),+) => {
        {
            enum Branches { $( $name,  )* }
            let weights = [$((Branches::$name, $weight)),+];
            match weights.choose_weighted($rng, |x| x.1).unwrap().0 {
                $(Branches::$name => $body),*
            }
        }
    }
}

fn test_suite<K, V, R>(mut rand_k: impl FnMut(&mut R) -> K, mut rand_v: impl FnMut(&mut R) -> V)
where
    K: Hash + Eq + Clone + Debug,
    V: Eq + Clone + Debug,
    R: Rng + SeedableRng,
{
    let mut map: CheckedMap<K, V> = CheckedMap::new();
    let mut rng = R::seed_from_u64(16);
    let mut max_size = 0;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Insert: 2.0 => {
                let k = map.present_or_random_key(3.0, &mut rng, &mut rand_k);
                let v = rand_v(&mut rng);
                map.insert(k, v);
            },
            Put: 1.0 => {
                let k = map.present_or_random_key(1.0, &mut rng, &mut rand_k);
                let v = rand_v(&mut rng);
                map.put(k, v);
            },
            Get: 1.0 => {
                let k = map.present_or_random_key(1.0, &mut rng, &mut rand_k);
                map.get(&k);
            },
            Remove: 1.0 => {
                let k = map.present_or_random_key(1.0, &mut rng, &mut rand_k);
                map.remove(&k);
            },
            RemoveTwice: 0.2 => {
                let k = map.present_or_random_key(0.2, &mut rng, &mut rand_k);
                map.remove(&k);
                assert_eq!(map.remove(&k), None);
            },
            Update: 0.3 => {
                let k = map.present_or_random_key(0.5, &mut rng, &mut rand_k);
                let v = rand_v(&mut rng);
                map.update(&k, |stored| *stored = v.clone());
            },
            Check: 0.1 => {
                map.check();
            }
        };
        max_size = std::cmp::max(max_size, map.len());
    }
    map.check();
    println!("max size {max_size}");
}

#[test]
fn test_suite_u32_u64() {
    test_suite::<u32, u64, rand_pcg::Pcg64>(|rng| rng.gen_range(0..2000), |rng| rng.gen());
}

#[test]
fn test_suite_i32_extremes() {
    test_suite::<i32, i32, rand_pcg::Pcg64>(
        |rng| {
            *[i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX]
                .choose(rng)
                .unwrap()
                ^ rng.gen_range(0..64)
        },
        |rng| rng.gen(),
    );
}

#[test]
fn test_suite_string_string() {
    test_suite::<String, String, rand_pcg::Pcg64>(
        |rng| {
            let len = rng.gen_range(1..6);
            String::from_iter((0..len).map(|_| rng.gen_range('a'..'f')))
        },
        |rng| {
            let len = rng.gen_range(0..12);
            String::from_iter((0..len).map(|_| rng.gen_range('!'..'~')))
        },
    );
}

/// A key whose hash ignores its contents, so all instances share a slot and a hash.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Colliding(u32);

impl Hash for Colliding {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

#[test]
fn test_suite_colliding() {
    test_suite::<Colliding, u8, rand_pcg::Pcg64>(
        |rng| Colliding(rng.gen_range(0..300)),
        |rng| rng.gen(),
    );
}

#[test]
fn colliding_keys_are_independent() {
    let mut map = ChainMap::new();
    for i in 0..10 {
        map.put(Colliding(i), i * 10);
    }
    let slot = slot_index(entry_hash(&Colliding(0)));
    assert_eq!(map.slot_len(slot), 10);
    for other in (0..CAPACITY).filter(|&other| other != slot) {
        assert_eq!(map.slot_len(other), 0);
    }

    assert_eq!(map.remove(&Colliding(4)), Some(40));
    map.put(Colliding(7), 77);
    for i in (0..10).filter(|&i| i != 4) {
        let expected = if i == 7 { 77 } else { i * 10 };
        assert_eq!(map.get(&Colliding(i)), Some(&expected));
    }
    assert_eq!(map.get(&Colliding(4)), None);
    assert_eq!(map.slot_len(slot), 9);
    map.check();
}

#[test]
fn keys_sharing_a_slot_with_different_hashes() {
    let first = 0u64;
    let home = slot_index(entry_hash(&first));
    let second = (1u64..)
        .find(|key| {
            slot_index(entry_hash(key)) == home && entry_hash(key) != entry_hash(&first)
        })
        .unwrap();

    let mut map = ChainMap::new();
    map.put(first, "first");
    map.put(second, "second");
    assert_eq!(map.slot_len(home), 2);
    assert_eq!(map.remove(&first), Some("first"));
    assert_eq!(map.get(&second), Some(&"second"));
    assert_eq!(map.get(&first), None);
    map.put(first, "again");
    assert_eq!(map.get(&first), Some(&"again"));
    assert_eq!(map.get(&second), Some(&"second"));
    map.check();
}

#[test]
fn overwrite_keeps_a_single_entry() {
    let mut map = ChainMap::new();
    map.put(5, "a");
    assert_eq!(map.get(&5), Some(&"a"));
    map.put(5, "b");
    assert_eq!(map.get(&5), Some(&"b"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.slot_len(slot_index(entry_hash(&5))), 1);
    assert_eq!(map.remove(&5), Some("b"));
    assert_eq!(map.get(&5), None);
    assert_eq!(map.remove(&5), None);
    assert!(map.is_empty());
    map.check();
}

#[test]
fn remove_missing_leaves_entries_intact() {
    let mut map = ChainMap::new();
    for i in 0..100u32 {
        map.put(i, i + 1);
    }
    for i in 100..200u32 {
        assert_eq!(map.remove(&i), None);
    }
    assert_eq!(map.len(), 100);
    for i in 0..100u32 {
        assert_eq!(map.get(&i), Some(&(i + 1)));
    }
    map.check();
}

#[test]
fn hundred_thousand_entries() {
    let count: u32 = 100_000;
    let mut map = ChainMap::new();
    for i in 0..count {
        map.put(i, format!("value {i}"));
    }
    assert_eq!(map.len(), count as usize);
    for i in 0..count {
        assert_eq!(map.get(&i).map(String::as_str), Some(format!("value {i}").as_str()));
    }
    map.check();
    for i in 0..count {
        assert_eq!(map.remove(&i), Some(format!("value {i}")));
    }
    for i in 0..count {
        assert_eq!(map.get(&i), None);
    }
    assert!(map.is_empty());
    map.check();
}

#[test]
fn borrowed_lookups() {
    let mut map: ChainMap<String, usize> = ChainMap::new();
    map.put("adam".into(), 10);
    map.put("eve".into(), 23);
    assert_eq!(map.get("adam"), Some(&10));
    assert!(map.contains_key("eve"));
    *map.get_mut("eve").unwrap() += 1;
    assert_eq!(map.remove_entry("eve"), Some(("eve".to_string(), 24)));
    assert!(!map.contains_key("eve"));
}

#[test]
fn absent_keys_compare_safely() {
    let mut map: ChainMap<Option<&str>, u32> = ChainMap::new();
    map.put(None, 1);
    map.put(Some("a"), 2);
    for i in 0..40 {
        map.put(Some(["b", "c", "d", "e"][i % 4]), i as u32);
    }
    assert_eq!(map.get(&None), Some(&1));
    assert_eq!(map.get(&Some("a")), Some(&2));
    map.put(None, 3);
    assert_eq!(map.remove(&None), Some(3));
    assert_eq!(map.get(&None), None);
    assert_eq!(map.get(&Some("a")), Some(&2));
    assert_eq!(map.len(), 5);
    map.check();
}

#[test]
fn debug_dump_renders_chains() {
    let mut map = ChainMap::new();
    let empty = map.debug_dump();
    assert_eq!(empty.len(), CAPACITY);
    assert!(empty.iter().all(String::is_empty));

    map.put(Colliding(1), "one");
    map.put(Colliding(2), "two");
    map.put(Colliding(1), "uno");
    let slot = slot_index(entry_hash(&Colliding(0)));
    let dump = map.debug_dump();
    assert_eq!(dump.len(), CAPACITY);
    for (index, rendered) in dump.iter().enumerate() {
        if index == slot {
            assert_eq!(rendered, "{#1: uno}{#2: two}");
        } else {
            assert_eq!(rendered, "");
        }
    }
    let text = map.dump().to_string();
    assert_eq!(text.lines().count(), CAPACITY);
    assert_eq!(text.lines().nth(slot), Some("{#1: uno}{#2: two}"));
}

impl std::fmt::Display for Colliding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[test]
fn debug_format_lists_slots() {
    let mut map = ChainMap::new();
    map.put(Colliding(3), 'x');
    let formatted = format!("{map:?}");
    assert!(formatted.contains("Colliding(3): 'x'"));
    assert_eq!(formatted.matches("[]").count(), CAPACITY - 1);
}

#[test]
fn clones_are_independent() {
    let mut map = ChainMap::new();
    for i in 0..50u16 {
        map.put(i, i);
    }
    let copy = map.clone();
    for i in 0..25u16 {
        map.remove(&i);
    }
    assert_eq!(copy.len(), 50);
    assert_eq!(map.len(), 25);
    assert_eq!(copy.get(&3), Some(&3));
    assert_eq!(map.get(&3), None);
    copy.check();
    map.check();
}
