// tests/prefixed_output.rs

use std::io::Write;

use proptest::prelude::*;
use wyp::output::PrefixedWriter;

fn render(chunks: &[&[u8]]) -> Vec<u8> {
    let mut w = PrefixedWriter::new(Vec::new(), "p", None);
    for chunk in chunks {
        w.write_all(chunk).unwrap();
    }
    w.into_inner()
}

fn line_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just(b'\n'), Just(b'\r'), Just(b'x'), Just(b' '), any::<u8>()],
        0..64,
    )
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_output(
        data in line_bytes(),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let whole = render(&[data.as_slice()]);

        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
        points.sort_unstable();
        let mut chunks = Vec::new();
        let mut start = 0;
        for point in points {
            chunks.push(&data[start..point]);
            start = point;
        }
        chunks.push(&data[start..]);

        prop_assert_eq!(render(&chunks), whole);
    }

    #[test]
    fn one_prefix_per_line_start(data in line_bytes()) {
        let out = render(&[data.as_slice()]);
        let breaks = data
            .iter()
            .enumerate()
            .filter(|(i, b)| (**b == b'\n' || **b == b'\r') && *i + 1 < data.len())
            .count();
        let expected_prefixes = if data.is_empty() { 0 } else { breaks + 1 };

        prop_assert_eq!(out.len(), data.len() + expected_prefixes * "[p] ".len());
    }
}
