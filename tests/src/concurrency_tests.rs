//! The digit pair is never observed half-written

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use panel_core::hal::mock::MockDisplay;
use panel_core::{encode, Digits, DisplayState, MuxRefresher};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reader_sees_whole_values() {
    let state = Arc::new(DisplayState::new());
    state.store(Digits::from_int(12));
    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let state = Arc::clone(&state);
        let stop = Arc::clone(&stop);
        tokio::task::spawn_blocking(move || {
            let mut reads = 0u32;
            while !stop.load(Ordering::Relaxed) {
                let value = state.snapshot().to_int();
                assert!(value == 12 || value == 87, "torn read: {}", value);
                reads += 1;
            }
            reads
        })
    };

    for i in 0..20_000 {
        let value = if i % 2 == 0 { 87 } else { 12 };
        state.store(Digits::from_int(value));
        if i % 1_000 == 0 {
            tokio::task::yield_now().await;
        }
    }
    stop.store(true, Ordering::Relaxed);

    let reads = reader.await.unwrap();
    assert!(reads > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_updates_are_not_lost() {
    let state = Arc::new(DisplayState::new());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::task::spawn_blocking(move || {
                for _ in 0..250 {
                    state.update(Digits::increment);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.await.unwrap();
    }

    // 1000 increments wrap back to 00
    assert_eq!(state.snapshot(), Digits::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refresher_alongside_writer() {
    let state = Arc::new(DisplayState::new());
    state.store(Digits::from_int(12));

    let refresher = {
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            let mut screen = MockDisplay::new();
            let mut refresher = MuxRefresher::new(1);
            let mut drawn = Vec::new();
            for _ in 0..10_000 {
                refresher.tick(&state, &mut screen).unwrap();
                if let Some(frame) = screen.frames().last() {
                    drawn.push(*frame);
                }
            }
            (screen.toggles(), drawn)
        })
    };

    // Units are 2 or 7 and tens are 1 or 8 for both stored values
    for i in 0..2_000 {
        let value = if i % 2 == 0 { 87 } else { 12 };
        state.store(Digits::from_int(value));
        tokio::task::yield_now().await;
    }

    let (toggles, drawn) = refresher.await.unwrap();
    assert_eq!(toggles, 10_000);
    assert_eq!(drawn.len(), 10_000);
    for (select_high, pattern) in drawn {
        let allowed = if select_high {
            [encode(b'2'), encode(b'7')]
        } else {
            [encode(b'1'), encode(b'8')]
        };
        assert!(allowed.contains(&pattern), "unexpected frame {:?}", pattern);
    }
}
