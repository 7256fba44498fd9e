//! Backoff sleeps, optionally tied to a call's `CallControl`.

use std::time::Duration;

use crate::control::{CallControl, Wake};

pub(super) fn pause_blocking(wait: Duration, control: Option<&CallControl>) -> Wake {
    match control {
        Some(control) => control.sleep_blocking(wait),
        None => {
            std::thread::sleep(wait);
            Wake::Elapsed
        }
    }
}

pub(super) async fn pause(wait: Duration, control: Option<&CallControl>) -> Wake {
    match control {
        Some(control) => control.sleep(wait).await,
        None => {
            tokio::time::sleep(wait).await;
            Wake::Elapsed
        }
    }
}
