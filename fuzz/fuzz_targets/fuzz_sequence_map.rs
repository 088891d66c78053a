//! Fuzz testing for sequence map operations.
//!
//! This fuzz target drives a `ByteSequenceMap` and a model `HashMap`
//! through the same operation stream and requires identical observable
//! behavior, down to returned values and reported sizes.

#![no_main]

use arbitrary::Arbitrary;
use hashbrown::HashMap;
use libfuzzer_sys::fuzz_target;

use flatstore::ByteSequenceMap;

const MISSING: i64 = i64::MIN;
const MAX_KEY_LENGTH: usize = 12;

#[derive(Debug, Arbitrary)]
enum MapOperation {
    Put { key: Vec<u8>, value: i64 },
    Get { key: Vec<u8> },
    Remove { key: Vec<u8> },
    Clear,
}

fuzz_target!(|operations: Vec<MapOperation>| {
    let Ok(mut map) = ByteSequenceMap::new(MAX_KEY_LENGTH, 8, MISSING) else {
        return;
    };
    let mut model: HashMap<Vec<u8>, i64> = HashMap::new();

    for operation in operations {
        match operation {
            MapOperation::Put { key, value } => {
                if key.is_empty() || key.len() > MAX_KEY_LENGTH {
                    assert!(map.put(key.as_slice(), value).is_err());
                    continue;
                }
                // The sentinel is reserved: storing it would make a
                // previous-value result ambiguous in the model too.
                if value == MISSING {
                    continue;
                }
                let previous = map
                    .put(key.as_slice(), value)
                    .expect("in-range key must insert");
                let expected = model.insert(key, value).unwrap_or(MISSING);
                assert_eq!(previous, expected);
            }
            MapOperation::Get { key } => {
                let expected = model.get(key.as_slice()).copied().unwrap_or(MISSING);
                assert_eq!(map.get(key.as_slice()), expected);
            }
            MapOperation::Remove { key } => {
                let expected = model.remove(key.as_slice()).unwrap_or(MISSING);
                assert_eq!(map.remove(key.as_slice()), expected);
            }
            MapOperation::Clear => {
                map.clear();
                model.clear();
            }
        }
        assert_eq!(map.len(), model.len());
        assert_eq!(map.is_empty(), model.is_empty());
    }
});
