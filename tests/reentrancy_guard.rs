mod common;

use backshift::{Budget, DebugReentrancy, HashMap, HashSet};

#[test]
fn enter_and_exit_is_ok() {
    let r = DebugReentrancy::new();
    {
        let _g = r.enter();
    }
    r.check();
}

#[test]
fn clone_starts_without_writer() {
    let r = DebugReentrancy::new();
    let _g = r.enter();
    let copy = r.clone();
    copy.check();
    let _g2 = copy.enter();
}

// A refused growth must release the writer, or every later call would panic.
#[test]
fn failed_mutation_releases_the_table() {
    common::init_logger();
    let starved = Budget::new(0);
    let mut set: HashSet<u32> = HashSet::new(2);
    assert!(set.add_in(1, &starved).is_err());
    assert!(set.add(1).unwrap());
    assert!(set.contains(&1));

    let mut map: HashMap<u32, &str> = HashMap::new(2);
    assert!(map.put_in(7, "seven", &starved).is_err());
    assert!(map.resize_in(64, &starved).is_err());
    assert_eq!(map.put(7, "seven").unwrap(), None);
    assert_eq!(map.get(&7), Some(&"seven"));
}

#[cfg(debug_assertions)]
#[test]
fn reentrancy_panics_in_debug() {
    let r = DebugReentrancy::new();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _g1 = r.enter();
        let _g2 = r.enter();
    }));
    assert!(res.is_err(), "expected reentrancy to panic in debug builds");
}

#[cfg(not(debug_assertions))]
#[test]
fn reentrancy_noop_in_release() {
    let r = DebugReentrancy::new();
    let _g1 = r.enter();
    let _g2 = r.enter();
    let (_g1, _g2) = (_g1, _g2);
}
