//! Engine event channel.
//!
//! Engines deliver events from their own worker threads. The session registers
//! one [`ChannelListener`] with its engine; the listener only enqueues. A
//! single pump task drains the queue in order and hands every event to the
//! session's dispatch point, so events are never reordered, coalesced or
//! handled while an engine call is still on the stack.
//!
//! Every queued event carries the source generation that was current when the
//! engine emitted it. The session bumps the generation whenever it stops the
//! engine for a reset or rebind, so events still queued for a previous source
//! can be recognized and dropped at dispatch.

use bridge_traits::{EngineEvent, EngineListener};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// An engine event tagged with the source generation it was emitted under.
#[derive(Debug)]
pub(crate) struct StampedEvent {
    pub(crate) generation: u64,
    pub(crate) event: EngineEvent,
}

/// Source generation shared between a session and its listener.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceGeneration(Arc<AtomicU64>);

impl SourceGeneration {
    pub(crate) fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate every event emitted so far. Call while the engine is being
    /// stopped for the previous source.
    pub(crate) fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

pub(crate) struct ChannelListener {
    tx: UnboundedSender<StampedEvent>,
    generation: SourceGeneration,
}

impl EngineListener for ChannelListener {
    fn on_engine_event(&self, event: EngineEvent) {
        let stamped = StampedEvent {
            generation: self.generation.current(),
            event,
        };
        if let Err(rejected) = self.tx.send(stamped) {
            debug!(event = ?rejected.0.event, "Engine event after session teardown dropped");
        }
    }
}

pub(crate) fn channel(
    generation: SourceGeneration,
) -> (ChannelListener, UnboundedReceiver<StampedEvent>) {
    let (tx, rx) = unbounded_channel();
    (ChannelListener { tx, generation }, rx)
}

/// Drain `rx` into `dispatch` until the channel closes or `dispatch` reports
/// that the session is gone.
pub(crate) fn pump<F>(
    mut rx: UnboundedReceiver<StampedEvent>,
    mut dispatch: F,
) -> impl Future<Output = ()>
where
    F: FnMut(StampedEvent) -> bool + Send + 'static,
{
    async move {
        while let Some(stamped) = rx.recv().await {
            trace!(generation = stamped.generation, event = ?stamped.event, "Engine event dequeued");
            if !dispatch(stamped) {
                break;
            }
        }
        trace!("Engine event pump finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::EngineState;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn events_are_dispatched_in_order() {
        let (listener, rx) = channel(SourceGeneration::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        listener.on_engine_event(EngineEvent::StateChanged {
            play_when_ready: false,
            state: EngineState::Buffering,
        });
        listener.on_engine_event(EngineEvent::VideoSizeChanged {
            width: 1280,
            height: 720,
        });
        listener.on_engine_event(EngineEvent::StateChanged {
            play_when_ready: false,
            state: EngineState::Ready,
        });
        drop(listener);

        let sink = seen.clone();
        pump(rx, move |event| {
            sink.lock().unwrap().push(event.event);
            true
        })
        .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(
            seen[0],
            EngineEvent::StateChanged {
                state: EngineState::Buffering,
                ..
            }
        ));
        assert!(matches!(seen[1], EngineEvent::VideoSizeChanged { width: 1280, .. }));
        assert!(matches!(
            seen[2],
            EngineEvent::StateChanged {
                state: EngineState::Ready,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn pump_stops_when_dispatch_declines() {
        let (listener, rx) = channel(SourceGeneration::default());
        for _ in 0..3 {
            listener.on_engine_event(EngineEvent::VideoSizeChanged {
                width: 1,
                height: 1,
            });
        }
        drop(listener);

        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        pump(rx, move |_| {
            *counter.lock().unwrap() += 1;
            false
        })
        .await;

        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (listener, rx) = channel(SourceGeneration::default());
        drop(rx);
        listener.on_engine_event(EngineEvent::VideoSizeChanged {
            width: 1,
            height: 1,
        });
    }

    #[tokio::test]
    async fn events_carry_the_generation_they_were_emitted_under() {
        let generation = SourceGeneration::default();
        let (listener, rx) = channel(generation.clone());

        listener.on_engine_event(EngineEvent::StateChanged {
            play_when_ready: false,
            state: EngineState::Ready,
        });
        let next = generation.advance();
        listener.on_engine_event(EngineEvent::StateChanged {
            play_when_ready: false,
            state: EngineState::Buffering,
        });
        drop(listener);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        pump(rx, move |stamped| {
            sink.lock().unwrap().push(stamped.generation);
            true
        })
        .await;

        assert_eq!(next, 1);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
        assert!(!generation.is_current(0));
        assert!(generation.is_current(1));
    }
}
