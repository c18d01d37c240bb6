//! Property-based tests for fccu-atomic.

use fccu_atomic::{ActivityBitmap, PriorityQueueSet, SpscRing};

proptest::proptest! {
    #[test]
    fn test_ring_matches_fifo_model(ops in proptest::collection::vec(proptest::bool::ANY, 0..200)) {
        let ring: SpscRing<u32, 16> = SpscRing::new();
        let mut model = std::collections::VecDeque::new();
        let mut next = 0u32;

        for push in ops {
            if push {
                if ring.push(next).is_ok() {
                    model.push_back(next);
                }
                next += 1;
            } else {
                assert_eq!(ring.pop(), model.pop_front());
            }
            assert_eq!(ring.len(), model.len());
        }

        while let Some(expected) = model.pop_front() {
            assert_eq!(ring.pop(), Some(expected));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_queue_set_pop_is_priority_sorted(
        items in proptest::collection::vec((0u8..4, 0u32..1000), 0..60),
    ) {
        let qs: PriorityQueueSet<u32, 4, 32> = PriorityQueueSet::new();
        let mut admitted = 0usize;
        for (level, value) in items {
            if qs.push(level, value).is_ok() {
                admitted += 1;
            }
        }

        let mut last_level = 0u8;
        let mut popped = 0usize;
        while let Some((_, level)) = qs.pop() {
            assert!(level >= last_level, "pop must never go back up in priority");
            last_level = level;
            popped += 1;
        }
        assert_eq!(popped, admitted);
    }

    #[test]
    fn test_admission_never_exceeds_limit(count in 0usize..100) {
        type Qs = PriorityQueueSet<u32, 4, 16>;
        let qs = Qs::new();
        for i in 0..count {
            #[allow(clippy::cast_possible_truncation)]
            let _ = qs.push_with_admission(3, i as u32);
        }
        assert!(qs.len(3) <= Qs::LOW_ADMIT_LIMIT);
    }

    #[test]
    fn test_bitmap_matches_set_model(
        ops in proptest::collection::vec((proptest::bool::ANY, 0u16..256), 0..200),
    ) {
        let bitmap = ActivityBitmap::new();
        let mut model = std::collections::HashSet::new();

        for (set, index) in ops {
            if set {
                bitmap.set(index);
                model.insert(index);
            } else {
                bitmap.clear(index);
                model.remove(&index);
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let expected = model.len() as u32;
        assert_eq!(bitmap.count_ones(), expected);
        for index in 0..256u16 {
            assert_eq!(bitmap.test(index), model.contains(&index));
        }
    }
}
