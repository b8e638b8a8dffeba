#![allow(missing_docs)]

use chainmap::{ChainMap, CAPACITY};
use clap::Parser;
use color_eyre::eyre::{bail, ensure};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Exercises a fixed-capacity chained hash map.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of keys inserted, looked up and removed in bulk
    #[clap(short = 'n', long, default_value = "100000")]
    count: u32,
    /// Seed of the random workload
    #[clap(short = 's', long, default_value = "0")]
    seed: u64,
    /// Number of operations of the random workload
    #[clap(short = 'o', long, default_value = "10000")]
    ops: usize,
    /// Print the chains of every slot after the random workload
    #[clap(long)]
    dump: bool,
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    chainmap_logger::setup();

    overwrite_scenario()?;
    bulk_scenario(args.count)?;
    let map = random_workload(args.seed, args.ops)?;

    if args.dump {
        print!("{}", map.dump());
    }

    Ok(())
}

fn slot_lengths<K, V>(map: &ChainMap<K, V>) -> Vec<usize> {
    (0..CAPACITY).map(|slot| map.slot_len(slot)).collect()
}

fn overwrite_scenario() -> color_eyre::Result<()> {
    let mut map = ChainMap::new();
    map.put(5, "a");
    ensure!(map.get(&5) == Some(&"a"), "lookup after insert");
    map.put(5, "b");
    ensure!(map.get(&5) == Some(&"b"), "lookup after overwrite");
    ensure!(map.len() == 1, "overwrite allocated a second entry");
    ensure!(map.remove(&5) == Some("b"), "removal returned a stale value");
    ensure!(map.get(&5).is_none(), "lookup after removal");
    ensure!(map.remove(&5).is_none(), "second removal found an entry");
    log::info!("overwrite scenario passed");
    Ok(())
}

fn bulk_scenario(count: u32) -> color_eyre::Result<()> {
    let mut map = ChainMap::new();
    for i in 0..count {
        map.put(i, format!("value {i}"));
    }
    log::info!("inserted {} entries, chain lengths {:?}", map.len(), slot_lengths(&map));

    for i in 0..count {
        let expected = format!("value {i}");
        match map.get(&i) {
            Some(found) if *found == expected => (),
            found => bail!("key {i}: expected {expected:?}, found {found:?}"),
        }
    }
    map.check();

    for i in 0..count {
        ensure!(map.remove(&i).is_some(), "key {i} missing on removal");
    }
    for i in 0..count {
        ensure!(map.get(&i).is_none(), "key {i} still present after removal");
    }
    ensure!(map.is_empty(), "{} entries left after removal", map.len());
    log::info!("bulk scenario with {count} keys passed");
    Ok(())
}

/// Runs random operations on a small key space, comparing against a plain vector indexed by key.
fn random_workload(seed: u64, ops: usize) -> color_eyre::Result<ChainMap<u16, u64>> {
    const KEYS: u16 = 512;

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut map: ChainMap<u16, u64> = ChainMap::new();
    let mut model: Vec<Option<u64>> = vec![None; KEYS as usize];

    for step in 0..ops {
        let key = rng.gen_range(0..KEYS);
        let expected = model[key as usize];
        match rng.gen_range(0..3) {
            0 => {
                let value = rng.gen();
                let old_value = map.insert(key, value);
                ensure!(old_value == expected, "step {step}: insert {key} returned {old_value:?}");
                model[key as usize] = Some(value);
            }
            1 => {
                let found = map.get(&key).copied();
                ensure!(found == expected, "step {step}: get {key} returned {found:?}");
            }
            _ => {
                let removed = map.remove(&key);
                ensure!(removed == expected, "step {step}: remove {key} returned {removed:?}");
                model[key as usize] = None;
            }
        }
    }
    map.check();

    let live = model.iter().filter(|value| value.is_some()).count();
    ensure!(map.len() == live, "map has {} entries, expected {live}", map.len());
    log::info!(
        "random workload of {ops} operations passed, {live} entries left, chain lengths {:?}",
        slot_lengths(&map)
    );
    Ok(map)
}
