//! Property tests for the atomic seat commit.
//!
//! For arbitrary racing batches over a small seat map, the committed batches
//! must be pairwise disjoint and the final booked set must equal their union.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use marquee_core::{
    CommitResult, InventoryStore, MemoryInventoryStore, Money, MovieId, SeatLabel, Show, ShowId,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const SEAT_COUNT: u8 = 8;

fn seat_label(index: u8) -> SeatLabel {
    SeatLabel::new(format!("S{}", index % SEAT_COUNT))
}

fn batch_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    vec(vec(0u8..SEAT_COUNT, 1..4), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn racing_commits_never_lose_updates(raw_batches in batch_strategy()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let store = Arc::new(MemoryInventoryStore::new());
            let show = Show::new(
                ShowId::new(),
                MovieId::new(),
                "Grand Odeon 3",
                "Springfield",
                Utc::now(),
                Money::from_cents(20_000),
                (0..SEAT_COUNT).map(seat_label).collect(),
            );
            let show_id = show.id;
            store.insert_show(show).await.unwrap();

            let mut handles = Vec::new();
            for raw in raw_batches {
                // Dedupe within a batch; the store contract assumes the
                // coordinator has already rejected duplicates.
                let mut seen = HashSet::new();
                let batch: Vec<SeatLabel> = raw
                    .into_iter()
                    .map(seat_label)
                    .filter(|label| seen.insert(label.clone()))
                    .collect();
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let result = store.try_commit_seats(show_id, &batch).await.unwrap();
                    (batch, result)
                }));
            }

            let mut committed: Vec<SeatLabel> = Vec::new();
            for handle in handles {
                let (batch, result) = handle.await.unwrap();
                if result == CommitResult::Committed {
                    committed.extend(batch);
                }
            }

            // Pairwise disjointness of winners.
            let unique: HashSet<&SeatLabel> = committed.iter().collect();
            assert_eq!(unique.len(), committed.len());

            // Final state is exactly the winners' union.
            let seats = store.load_seats(show_id).await.unwrap();
            let booked: HashSet<SeatLabel> = seats
                .iter()
                .filter(|seat| seat.booked)
                .map(|seat| seat.label.clone())
                .collect();
            assert_eq!(booked, committed.into_iter().collect::<HashSet<_>>());
        });
    }
}
