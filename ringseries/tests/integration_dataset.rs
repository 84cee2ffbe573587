//! Integration tests for dataset views.
//!
//! Covers the window algebra laws, views rooted in a live ring buffer, and
//! the numeric transforms an indicator pipeline builds on top of them.

use std::sync::Arc;

use ringseries::{
    ArgumentError, Dataset, DoubleDataset, DoubleRingBuffer, IntRingBuffer, Order, OrderError,
    RingSeriesError, Sequence, Snapshot, Store,
};

fn live_ring(capacity: usize, count: i32) -> Arc<IntRingBuffer> {
    let ring = Arc::new(IntRingBuffer::new(capacity).unwrap());
    ring.add_all(1..=count);
    ring
}

fn collect_stream<T: Clone + Send + Sync + 'static>(dataset: &Dataset<T>) -> Vec<T> {
    dataset.stream().unwrap().collect::<Result<_, _>>().unwrap()
}

#[test]
fn test_drop_take_law() {
    let sources = [
        Dataset::of((0..9).collect::<Vec<i32>>()),
        live_ring(9, 14).dataset(),
    ];
    for data in &sources {
        for a in 0..12 {
            for b in 1..12 {
                let composed = data.drop(a).take(b).unwrap();
                let direct = data.drop_take(a, b).unwrap();
                assert_eq!(composed.length(), direct.length());
                assert_eq!(composed, direct);
                assert_eq!(collect_stream(&composed), collect_stream(&direct));
            }
        }
    }
}

#[test]
fn test_subsequences_law() {
    let data = live_ring(10, 25).dataset();
    for len in 1..=12 {
        let windows = data.subsequences(len).unwrap();
        assert_eq!(windows.length(), (data.length() + 1).saturating_sub(len));
        for i in 0..windows.length() {
            assert_eq!(windows.get(i).unwrap(), data.drop_take(i, len).unwrap());
        }
    }
}

#[test]
fn test_views_are_live() {
    let ring = Arc::new(DoubleRingBuffer::new(5).unwrap());
    let closes = ring.dataset();
    let previous = closes.reference(-1).unwrap();
    let change = closes.differences();

    ring.add_all([100.0, 101.0]);
    assert_eq!(previous.get(0).unwrap(), 100.0);
    assert_eq!(change.to_vec().unwrap(), vec![1.0]);

    ring.add(99.5);
    assert_eq!(previous.get(0).unwrap(), 101.0);
    assert_eq!(change.to_vec().unwrap(), vec![-1.5, 1.0]);
}

#[test]
fn test_reference_rejects_future() {
    let data = live_ring(4, 4).dataset();
    assert!(matches!(
        data.reference(2),
        Err(RingSeriesError::Argument(ArgumentError::Positive { value: 2, .. }))
    ));
}

#[test]
fn test_exact_windows_snapshot() {
    let ring = live_ring(6, 6);
    let newest = ring.dataset().take_exact(3).unwrap();
    let middle = ring.dataset().drop_take_exact(2, 2).unwrap();
    ring.add_all([50, 51, 52]);

    assert_eq!(newest.to_vec().unwrap(), vec![6, 5, 4]);
    assert_eq!(middle.to_vec().unwrap(), vec![4, 3]);
    assert_eq!(newest.order(), Order::DescendingIndex);
    assert!(ring.dataset().take_exact(7).is_err());
}

#[test]
fn test_map_across_types() {
    let ring = live_ring(4, 4);
    let labels = ring.dataset().map_to_object(|v| format!("bar-{v}"));
    let widened = ring.dataset().map_to_long(|v| i64::from(v) << 40);
    let halves = ring.dataset().map_to_double(|v| f64::from(v) / 2.0);

    assert_eq!(labels.get(0).unwrap(), "bar-4");
    assert_eq!(widened.get(3).unwrap(), 1 << 40);
    assert_eq!(halves.to_vec().unwrap(), vec![2.0, 1.5, 1.0, 0.5]);
    assert_eq!(collect_stream(&halves), vec![0.5, 1.0, 1.5, 2.0]);
}

#[test]
fn test_crossings_over_moving_series() {
    let ring = Arc::new(DoubleRingBuffer::new(4).unwrap());
    let breakout = ring.dataset().crosses_over(10.0);
    let breakdown = ring.dataset().crosses_under(10.0);

    ring.add_all([9.0, 10.0, 10.5]);
    assert_eq!(breakout.to_vec().unwrap(), vec![true, false]);
    assert_eq!(breakdown.to_vec().unwrap(), vec![false, false]);

    ring.add(9.5);
    assert!(!breakout.get(0).unwrap());
    assert!(breakdown.get(0).unwrap());
}

#[test]
fn test_fdi_over_ring_windows() {
    let ring = Arc::new(DoubleRingBuffer::new(32).unwrap());
    ring.add_all((0..32).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }));
    let data = ring.dataset();

    let choppy = data.fdi(30, 0).unwrap();
    let flat = DoubleDataset::of(vec![3.0; 30]).fdi(30, 0).unwrap();
    assert!(choppy > 1.5);
    assert!((flat - 1.5).abs() < f64::EPSILON);

    // Sliding windows expose the same computation per position.
    let windows = data.subsequences(30).unwrap();
    assert_eq!(windows.length(), 3);
    let last = windows.get(2).unwrap();
    assert!((last.fdi(30, 0).unwrap() - data.fdi(30, 2).unwrap()).abs() < 1e-12);
}

#[test]
fn test_custom_store() {
    struct Countdown(usize);

    impl Sequence for Countdown {
        fn length(&self) -> usize {
            self.0
        }

        fn order(&self) -> Order {
            Order::DescendingIndex
        }
    }

    impl Store<usize> for Countdown {
        fn get(&self, index: usize) -> ringseries::Result<usize> {
            Ok(self.0 - index)
        }
    }

    let data = Dataset::<usize>::from_store(Arc::new(Countdown(5)));
    assert_eq!(data.to_vec().unwrap(), vec![5, 4, 3, 2, 1]);
    assert_eq!(collect_stream(&data.drop(3)), vec![1, 2]);
    assert!(data.drop(2).get(5).is_err());
}

#[test]
fn test_unspecified_order_windows() {
    let snapshot = Snapshot::new(vec!['a', 'b', 'c'], Order::Unspecified);
    let data = Dataset::<char>::from_store(Arc::new(snapshot));
    let tail = data.drop_take(1, 2).unwrap();

    assert_eq!(tail.to_vec().unwrap(), vec!['b', 'c']);
    assert!(matches!(
        tail.stream().err(),
        Some(RingSeriesError::Order(OrderError::Unsupported { operation: "drop_take", .. }))
    ));
}
