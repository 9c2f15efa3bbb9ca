//! Z tile cache behavior against the arbiter.

use gs_memory::{MemoryArbiter, Port};
use gs_twin_core::Surface;
use gs_zbuf::{set_index, ZTileCache};

fn setup() -> (MemoryArbiter, Surface, ZTileCache) {
    let mem = MemoryArbiter::with_words(1 << 17);
    let surface = Surface::new(0x2_0000, 7, 7).unwrap();
    (mem, surface, ZTileCache::new())
}

#[test]
fn miss_fills_from_memory() {
    let (mut mem, surface, mut cache) = setup();
    mem.write_word(surface.word_address(5, 6), 0x1234);
    assert_eq!(cache.read(&mut mem, &surface, 5, 6).unwrap(), 0x1234);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(mem.stats(Port::ZBuffer).transactions, 1);
    assert_eq!(mem.stats(Port::ZBuffer).words, 16);
}

#[test]
fn one_miss_per_tile() {
    let (mut mem, surface, mut cache) = setup();
    for y in 8..12 {
        for x in 4..8 {
            cache.read(&mut mem, &surface, x, y).unwrap();
        }
    }
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 15);
}

#[test]
fn writes_stay_cached_until_flush() {
    let (mut mem, surface, mut cache) = setup();
    cache.write(&mut mem, &surface, 9, 9, 0xBEEF).unwrap();
    let addr = surface.word_address(9, 9);
    assert_eq!(mem.read_word(addr), 0);
    assert!(cache.is_dirty(surface.tile_address(9, 9)));
    assert_eq!(cache.read(&mut mem, &surface, 9, 9).unwrap(), 0xBEEF);

    cache.flush(&mut mem).unwrap();
    assert_eq!(mem.read_word(addr), 0xBEEF);
    assert!(!cache.is_dirty(surface.tile_address(9, 9)));
    assert_eq!(cache.stats().write_backs, 1);

    // Flushing again has nothing to do.
    cache.flush(&mut mem).unwrap();
    assert_eq!(cache.stats().write_backs, 1);
}

#[test]
fn conflict_evicts_least_recently_used_with_write_back() {
    let (mut mem, surface, mut cache) = setup();
    // Tiles 16 pixels apart in X share a set.
    let xs = [0u32, 16, 32, 48, 64];
    assert!(xs.iter().all(|&x| set_index(x, 0) == set_index(0, 0)));

    cache.write(&mut mem, &surface, xs[0], 0, 0x1111).unwrap();
    for &x in &xs[1..4] {
        cache.read(&mut mem, &surface, x, 0).unwrap();
    }
    // Fifth tile evicts the first, which is dirty.
    cache.read(&mut mem, &surface, xs[4], 0).unwrap();
    assert_eq!(cache.stats().write_backs, 1);
    assert_eq!(mem.read_word(surface.word_address(0, 0)), 0x1111);

    // Recently used tiles are still resident.
    let misses = cache.stats().misses;
    cache.read(&mut mem, &surface, xs[3], 0).unwrap();
    assert_eq!(cache.stats().misses, misses);
}

#[test]
fn tile_order_scan_hit_rate() {
    let (mut mem, surface, mut cache) = setup();
    for ty in 0..8 {
        for tx in 0..8 {
            for i in 0..16 {
                let (x, y) = (tx * 4 + i % 4, ty * 4 + i / 4);
                let z = cache.read(&mut mem, &surface, x, y).unwrap();
                cache.write(&mut mem, &surface, x, y, z.wrapping_add(1)).unwrap();
            }
        }
    }
    assert_eq!(cache.stats().misses, 64);
    assert!(cache.stats().hit_rate() > 0.95);
    cache.flush_and_invalidate(&mut mem).unwrap();
    assert_eq!(mem.read_word(surface.word_address(31, 31)), 1);
}
