mod common;

use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{Trace, wait_for};
use serq::{EventKind, QueueConfig, QueueStatus, SerialQueue, SubmitError, TaskError};
use tokio::time::sleep;

#[tokio::test]
async fn runs_tasks_serially_in_submission_order() {
    let queue = SerialQueue::new(QueueConfig::default());
    let trace = Trace::new();

    let t = trace.clone();
    let _ = queue.submit(move |_ctx| async move {
        sleep(Duration::from_millis(30)).await;
        t.push("0");
        Ok::<_, Infallible>(())
    });
    let t = trace.clone();
    let _ = queue.submit(move |_ctx| async move {
        t.push("1");
        Ok::<_, Infallible>(())
    });
    let t = trace.clone();
    let _ = queue.submit(move |_ctx| async move {
        sleep(Duration::from_millis(10)).await;
        t.push("2");
        Ok::<_, Infallible>(())
    });

    let t = trace.clone();
    let last = queue
        .submit(move |_ctx| async move { Ok::<_, Infallible>(t.snapshot()) })
        .unwrap();

    assert_eq!(last.await.unwrap(), vec!["0", "1", "2"]);
}

#[tokio::test]
async fn handles_resolve_with_each_tasks_own_value() {
    let queue = SerialQueue::new(QueueConfig::default());

    let a = queue
        .submit(|_ctx| async { Ok::<_, Infallible>("task 0 ret") })
        .unwrap();
    assert_eq!(a.await, Ok("task 0 ret"));

    let b = queue
        .submit(|_ctx| async {
            sleep(Duration::from_millis(5)).await;
            Ok::<_, Infallible>("task 1 ret")
        })
        .unwrap();
    assert_eq!(b.await, Ok("task 1 ret"));

    let c = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }).unwrap();
    assert_eq!(c.await, Ok(()));

    let d = queue
        .submit(|_ctx| async { Ok::<Option<u8>, Infallible>(None) })
        .unwrap();
    assert_eq!(d.await, Ok(None));
}

#[tokio::test]
async fn submit_after_close_fails_immediately() {
    let queue = SerialQueue::new(QueueConfig::default());
    queue.close();

    let res = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) });
    assert_eq!(res.err(), Some(SubmitError::Closed));
    assert_eq!(queue.pending(), 0);
    assert_eq!(queue.status(), QueueStatus::Closed);
}

#[tokio::test]
async fn failure_rejects_only_its_own_handle() {
    let queue = SerialQueue::new(QueueConfig::default());

    let bad = queue
        .submit(|_ctx| async {
            Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "an error"))
        })
        .unwrap();
    let good = queue
        .submit(|_ctx| async { Ok::<_, io::Error>(7) })
        .unwrap();

    let err = bad.await.unwrap_err();
    assert_eq!(err.to_string(), "an error");
    let inner = err.into_failure().expect("action's own error");
    assert_eq!(inner.kind(), io::ErrorKind::NotFound);
    assert_eq!(good.await.unwrap(), 7);
}

#[tokio::test]
async fn panicking_task_does_not_stop_the_queue() {
    let queue = SerialQueue::new(QueueConfig::default());

    let boom = queue
        .submit(|_ctx| async {
            if true {
                panic!("task blew up");
            }
            Ok::<(), Infallible>(())
        })
        .unwrap();
    let after = queue
        .submit(|_ctx| async { Ok::<_, Infallible>("still running") })
        .unwrap();

    assert_eq!(
        boom.await,
        Err(TaskError::Panicked {
            info: "task blew up".into()
        })
    );
    assert_eq!(after.await, Ok("still running"));
}

#[tokio::test]
async fn close_is_idempotent_and_queued_tasks_still_drain() {
    let queue = SerialQueue::new(QueueConfig::default());
    let mut rx = queue.subscribe();

    let handles: Vec<_> = (0..3)
        .map(|i| {
            queue
                .submit(move |_ctx| async move {
                    sleep(Duration::from_millis(5)).await;
                    Ok::<_, Infallible>(i)
                })
                .unwrap()
        })
        .collect();

    queue.close();
    queue.close();
    assert!(queue.is_closed());

    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.await, Ok(i));
    }

    let events = wait_for(&mut rx, EventKind::QueueIdle).await;
    let closes = events
        .iter()
        .filter(|e| e.kind == EventKind::QueueClosed)
        .count();
    assert_eq!(closes, 1);
    assert_eq!(queue.status(), QueueStatus::Closed);
    assert_eq!(queue.current_slot(), 3);
}

#[tokio::test]
async fn status_goes_busy_then_back_to_idle() {
    let queue = SerialQueue::new(QueueConfig::default());
    let mut rx = queue.subscribe();
    assert_eq!(queue.status(), QueueStatus::Idle);

    let h = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }).unwrap();
    assert_eq!(queue.status(), QueueStatus::Busy);
    assert_eq!(queue.pending(), 1);

    h.await.unwrap();
    wait_for(&mut rx, EventKind::QueueIdle).await;
    assert_eq!(queue.status(), QueueStatus::Idle);
    assert_eq!(queue.current_slot(), 1);
    assert_eq!(queue.active_slot(), None);
}

#[tokio::test]
async fn slot_ids_count_started_tasks_not_submissions() {
    let queue = SerialQueue::new(QueueConfig::default());
    for _ in 0..4 {
        let _ = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) });
    }
    assert_eq!(queue.current_slot(), 0);

    let last = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }).unwrap();
    last.await.unwrap();
    assert_eq!(queue.current_slot(), 5);
}

#[tokio::test]
async fn dropping_the_queue_keeps_pending_work() {
    let queue = SerialQueue::new(QueueConfig::default());
    let a = queue
        .submit(|_ctx| async {
            sleep(Duration::from_millis(5)).await;
            Ok::<_, Infallible>('a')
        })
        .unwrap();
    let b = queue.submit(|_ctx| async { Ok::<_, Infallible>('b') }).unwrap();
    drop(queue);

    assert_eq!(a.await, Ok('a'));
    assert_eq!(b.await, Ok('b'));
}

#[tokio::test]
async fn tasks_can_submit_follow_up_work() {
    let queue = SerialQueue::new(QueueConfig::default());
    let trace = Trace::new();

    let q = queue.clone();
    let t = trace.clone();
    let outer = queue
        .submit(move |_ctx| async move {
            t.push("outer");
            let t2 = t.clone();
            let inner = q.submit(move |_ctx| async move {
                t2.push("inner");
                Ok::<_, Infallible>(())
            })?;
            Ok::<_, SubmitError>(inner)
        })
        .unwrap();

    let t = trace.clone();
    let sibling = queue
        .submit(move |_ctx| async move {
            t.push("sibling");
            Ok::<_, Infallible>(())
        })
        .unwrap();

    let inner = outer.await.unwrap();
    sibling.await.unwrap();
    inner.await.unwrap();
    assert_eq!(trace.snapshot(), vec!["outer", "sibling", "inner"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn order_holds_on_multi_thread_runtime() {
    let queue = SerialQueue::new(QueueConfig::default());
    let running = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for i in 0..20_usize {
        let running = Arc::clone(&running);
        let order = Arc::clone(&order);
        handles.push(
            queue
                .submit(move |_ctx| async move {
                    assert_eq!(running.fetch_add(1, Ordering::SeqCst), 0);
                    tokio::task::yield_now().await;
                    sleep(Duration::from_millis(1)).await;
                    order.lock().unwrap().push(i);
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(i)
                })
                .unwrap(),
        );
    }

    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.await, Ok(i));
    }
    assert_eq!(*order.lock().unwrap(), (0..20).collect::<Vec<_>>());
}

#[test]
fn handles_are_abandoned_when_the_runtime_goes_away() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let (stuck, queued) = rt.block_on(async {
        let queue = SerialQueue::with_timeout(Duration::from_secs(3600));
        let stuck = queue
            .submit(|_ctx| async {
                std::future::pending::<()>().await;
                Ok::<_, Infallible>(())
            })
            .unwrap();
        let queued = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }).unwrap();
        tokio::task::yield_now().await;
        (stuck, queued)
    });
    drop(rt);

    assert_eq!(futures::executor::block_on(stuck), Err(TaskError::Abandoned));
    assert_eq!(futures::executor::block_on(queued), Err(TaskError::Abandoned));
}
