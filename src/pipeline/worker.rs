use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::{
    detector::HandDetector,
    error::ConfigError,
    tracker::{HandTracker, TrackerConfig},
    types::{Frame, TrackedFrame},
};

/// Steps `tracker` over incoming frames until the frame channel closes,
/// always skipping ahead to the newest frame that is waiting.
pub fn run_worker_loop<D: HandDetector>(
    mut tracker: HandTracker<D>,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<TrackedFrame>,
) {
    while let Some(frame) = recv_latest_frame(&frame_rx) {
        match tracker.step_with_mask(&frame) {
            Ok((output, mask)) => {
                let tracked = TrackedFrame {
                    frame,
                    output,
                    mask,
                };
                if let Err(TrySendError::Disconnected(_)) = result_tx.try_send(tracked) {
                    log::info!("result receiver disconnected, stopping tracker");
                    break;
                }
            }
            Err(err) => {
                log::warn!("skipping malformed frame: {err}");
            }
        }
    }
}

pub fn recv_latest_frame(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}

pub fn start_tracker(
    config: TrackerConfig,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<TrackedFrame>,
) -> Result<thread::JoinHandle<()>, ConfigError> {
    let tracker = HandTracker::new(config)?;
    log::info!(
        "starting hand tracker: center ({:.0}, {:.0}), warning {:.0}px, danger {:.0}px",
        config.boundary.center.x,
        config.boundary.center.y,
        config.boundary.warning_radius,
        config.boundary.danger_radius
    );

    Ok(thread::spawn(move || run_worker_loop(tracker, frame_rx, result_tx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackingState;
    use crossbeam_channel::{bounded, unbounded};

    fn black(width: u32, height: u32) -> Frame {
        Frame::from_rgb(width, height, vec![0; (width * height * 3) as usize]).unwrap()
    }

    #[test]
    fn latest_frame_wins() {
        let (tx, rx) = unbounded();
        tx.send(black(1, 1)).unwrap();
        tx.send(black(2, 2)).unwrap();
        tx.send(black(3, 3)).unwrap();
        let frame = recv_latest_frame(&rx).unwrap();
        assert_eq!(frame.dimensions(), (3, 3));
        drop(tx);
        assert!(recv_latest_frame(&rx).is_none());
    }

    #[test]
    fn worker_tracks_until_input_closes() {
        let (frame_tx, frame_rx) = bounded(1);
        let (result_tx, result_rx) = bounded(4);
        let handle = start_tracker(TrackerConfig::default(), frame_rx, result_tx).unwrap();

        frame_tx.send(black(64, 48)).unwrap();
        let tracked = result_rx.recv().unwrap();
        assert_eq!(tracked.output.state, TrackingState::NoHand);
        assert_eq!(tracked.frame.dimensions(), (64, 48));

        drop(frame_tx);
        handle.join().unwrap();
    }

    #[test]
    fn malformed_frames_are_skipped() {
        let (frame_tx, frame_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();
        let handle = start_tracker(TrackerConfig::default(), frame_rx, result_tx).unwrap();

        frame_tx.send(black(8, 8)).unwrap();
        assert_eq!(result_rx.recv().unwrap().output.frame_index, 0);
        // Resolution change is rejected, the session carries on.
        frame_tx.send(black(4, 4)).unwrap();
        frame_tx.send(black(8, 8)).unwrap();
        drop(frame_tx);
        handle.join().unwrap();

        let remaining: Vec<_> = result_rx.try_iter().collect();
        assert!(remaining.iter().all(|t| t.frame.dimensions() == (8, 8)));
    }
}
