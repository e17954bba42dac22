//! # Example: basic_queue
//!
//! Serial execution with return values and errors, printed through the
//! built-in [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! submit(fetch) ──► [queued] ──► [starting] slot=1 ──► [settled]
//! submit(parse) ──► [queued] ──► [starting] slot=2 ──► [failed]
//! submit(store) ──► [queued] ──► [starting] slot=3 ──► [settled] ──► [idle]
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_queue --features logging
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use serq::{LogWriter, QueueConfig, SerialQueue, SubmitOptions, Subscribe};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let queue = SerialQueue::builder(QueueConfig::default())
        .with_subscribers(subs)
        .build();

    let fetch = queue.submit_with(
        |_ctx| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, Infallible>("payload")
        },
        SubmitOptions::new().with_name("fetch"),
    )?;

    let parse = queue.submit_with(
        |_ctx| async { "12 bytes".parse::<u32>() },
        SubmitOptions::new().with_name("parse"),
    )?;

    let store = queue.submit_with(
        |_ctx| async { Ok::<_, Infallible>(()) },
        SubmitOptions::new().with_name("store"),
    )?;

    println!("fetch -> {:?}", fetch.await);
    println!("parse -> {:?}", parse.await);
    println!("store -> {:?}", store.await);

    queue.close();
    if let Err(e) = queue.submit(|_ctx| async { Ok::<_, Infallible>(()) }) {
        println!("after close: {e}");
    }

    // Let the subscriber worker flush.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
