use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_replays_in_order_and_records_verdicts() {
    let mut source = MemorySource::new([vec![1, 2], vec![3]]);

    let first = source.receive().unwrap().unwrap();
    assert_eq!(first.id, 0);
    assert_eq!(first.data, [1, 2]);
    assert!(!first.is_truncated());
    source.verdict(first, Verdict::Accept);

    let second = source.receive().unwrap().unwrap();
    assert_eq!(second.id, 1);
    source.verdict(second, Verdict::Drop);

    assert_eq!(source.receive().unwrap(), None);
    assert_eq!(source.verdicts(), [(0, Verdict::Accept), (1, Verdict::Drop)]);
    assert_eq!(
        source.stats(),
        CaptureStats {
            received: 2,
            truncated: 0,
            accepted: 1,
            dropped: 1,
        }
    );
}
