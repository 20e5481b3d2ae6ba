#![cfg(feature = "persistent")]
//! Integration tests for `build` and the `ordered_map!` macro.

use std::io;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use seqmap::ordered_map;
use seqmap::persistent::{OddArgumentCount, OrderedMap, build};
use tracing_subscriber::fmt::MakeWriter;

/// Captures formatted log output so tests can inspect it.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        let buffer = self.0.lock().map(|bytes| bytes.clone()).unwrap_or_default();
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.extend_from_slice(bytes);
        }
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// =============================================================================
// build
// =============================================================================

#[rstest]
fn test_build_pairs_in_order() {
    let map = build(["k1", "v1", "k2", "v2", "k3", "v3"]).unwrap();

    assert_eq!(
        map.iter().collect::<Vec<_>>(),
        vec![(&"k1", &"v1"), (&"k2", &"v2"), (&"k3", &"v3")]
    );
}

#[rstest]
fn test_build_empty_input() {
    let map: OrderedMap<String, String> = build(Vec::new()).unwrap();

    assert!(map.is_empty());
    assert_eq!(map.next_sequence(), 0);
}

#[rstest]
#[case(vec!["lonely"], "lonely")]
#[case(vec!["a", "1", "b", "2", "c"], "c")]
fn test_build_rejects_odd_input(#[case] arguments: Vec<&'static str>, #[case] trailing: &str) {
    let error = build(arguments).unwrap_err();

    assert_eq!(error, OddArgumentCount { trailing });
    assert!(error.to_string().contains(trailing));
}

#[rstest]
fn test_build_matches_chained_assoc() {
    let built = build((0..20).map(|number| number % 7)).unwrap();
    let chained = (0..10).fold(OrderedMap::new(), |map, pair| {
        map.assoc((pair * 2) % 7, (pair * 2 + 1) % 7)
    });

    assert_eq!(built, chained);
    assert_eq!(built.keys().collect::<Vec<_>>(), chained.keys().collect::<Vec<_>>());
}

#[rstest]
fn test_build_logs_odd_input() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let _ = build([1, 2, 3]);
    });

    let output = logs.contents();
    assert!(output.contains("odd number of arguments"), "{output}");
    assert!(output.contains("trailing=3"), "{output}");
}

// =============================================================================
// ordered_map!
// =============================================================================

#[rstest]
fn test_macro_heterogeneous_types() {
    let map = ordered_map! {
        "threads".to_string() => 4usize,
        "workers".to_string() => 2usize,
    };

    assert_eq!(map.nth(0), Ok((&"threads".to_string(), &4)));
    assert_eq!(map.nth(1), Ok((&"workers".to_string(), &2)));
}

#[rstest]
fn test_macro_empty() {
    let map: OrderedMap<u8, u8> = ordered_map! {};

    assert!(map.is_empty());
}

#[rstest]
fn test_macro_repeated_key_keeps_first_slot() {
    let map = ordered_map! { 'a' => 1, 'b' => 2, 'a' => 3 };

    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&'a', &3), (&'b', &2)]);
}
