//! # Example: timeouts
//!
//! Three tasks of 300ms each on a queue with a 200ms timeout. Each one times
//! out, the next one starts, and the abandoned ones finish in the background.
//!
//! Expected output order: `a1, b1, a2, c1, b2, c2`.
//!
//! ## Run
//! ```bash
//! cargo run --example timeouts
//! ```

use std::convert::Infallible;
use std::time::Duration;

use serq::{QueueConfig, SerialQueue, SubmitOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let queue = SerialQueue::new(QueueConfig::from_millis(200));

    let mut handles = Vec::new();
    for name in ["a", "b", "c"] {
        let handle = queue.submit_with(
            move |_ctx| async move {
                println!("{name}1");
                tokio::time::sleep(Duration::from_millis(300)).await;
                println!("{name}2");
                Ok::<_, Infallible>(name)
            },
            SubmitOptions::new()
                .with_name(name)
                .on_timeout(move || println!("[timeout] {name}")),
        )?;
        handles.push(handle);
    }

    for h in handles {
        println!("settled: {}", h.await?);
    }
    Ok(())
}
