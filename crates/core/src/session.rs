//! A single recording: owns its listener handles, change detector and
//! segment buffer, so independent sessions never share state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use replay_lens_protocol::{IncrementalSnapshotRecord, Segment};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::RecorderConfig;
use crate::detector::ChangeDetector;
use crate::emitter::Emitter;
use crate::error::RecorderError;
use crate::host::{EventHandler, EventSource, GeometryHost, HostEventKind, Subscription};
use crate::segment::SegmentBuffer;

struct SessionState<H> {
    host: H,
    detector: ChangeDetector,
    emitter: Emitter,
    buffer: SegmentBuffer,
}

impl<H: GeometryHost> SessionState<H> {
    fn handle(&mut self, kind: HostEventKind) {
        if let Some(data) = self.detector.on_event(kind, &self.host) {
            self.emitter.emit(data, &mut self.buffer);
        }
    }
}

pub struct RecorderSession<H: GeometryHost> {
    state: Rc<RefCell<SessionState<H>>>,
    subscriptions: Vec<Subscription>,
    recording: bool,
}

impl<H: GeometryHost + 'static> RecorderSession<H> {
    /// Attach listeners and take the baseline measurements.
    ///
    /// Fails if the window resize/scroll listeners cannot be attached. A
    /// missing visual viewport only disables that record kind.
    pub fn start<E: EventSource + ?Sized>(
        config: &RecorderConfig,
        host: H,
        events: &E,
        clock: Box<dyn Clock>,
    ) -> Result<Self, RecorderError> {
        let correction = config.correction_table().compute_correction(&host);
        let supported = host.supports_visual_viewport();
        if config.record_visual_viewport && !supported {
            debug!("visual viewport unsupported on this host");
        }

        let state = Rc::new(RefCell::new(SessionState {
            host,
            detector: ChangeDetector::new(correction, config.record_visual_viewport && supported),
            emitter: Emitter::new(clock),
            buffer: SegmentBuffer::new(),
        }));

        let mut subscriptions = Vec::new();
        for kind in HostEventKind::WINDOW {
            subscriptions.push(events.subscribe(kind, handler(&state))?);
        }
        if config.record_visual_viewport && supported {
            match subscribe_all(events, &HostEventKind::VISUAL_VIEWPORT, &state) {
                Ok(subs) => subscriptions.extend(subs),
                Err(err) => {
                    warn!(%err, "visual viewport listeners unavailable, not recording them");
                    let mut s = state.borrow_mut();
                    s.detector = ChangeDetector::new(correction, false);
                }
            }
        }

        {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            for data in s.detector.prime(&s.host, config.emit_initial_snapshot) {
                s.emitter.emit(data, &mut s.buffer);
            }
        }

        info!(
            correction,
            visual_viewport = state.borrow().detector.visual_enabled(),
            listeners = subscriptions.len(),
            "recording started"
        );
        Ok(Self {
            state,
            subscriptions,
            recording: true,
        })
    }
}

impl<H: GeometryHost> RecorderSession<H> {
    /// Detach every listener. Buffered records stay until flushed.
    pub fn stop(&mut self) {
        if !self.recording {
            return;
        }
        for sub in self.subscriptions.drain(..) {
            sub.detach();
        }
        self.recording = false;
        info!(buffered = self.state.borrow().buffer.len(), "recording stopped");
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drain buffered records for the transport.
    pub fn flush(&self) -> Segment {
        self.state.borrow_mut().buffer.flush()
    }

    /// Copy of the records buffered since the last flush.
    pub fn records(&self) -> Vec<IncrementalSnapshotRecord> {
        self.state.borrow().buffer.records().to_vec()
    }

    pub fn correction(&self) -> u32 {
        self.state.borrow().detector.correction()
    }

    pub fn visual_viewport_active(&self) -> bool {
        self.recording && self.state.borrow().detector.visual_enabled()
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl<H: GeometryHost> Drop for RecorderSession<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<H: GeometryHost> std::fmt::Debug for RecorderSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderSession")
            .field("recording", &self.recording)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

fn handler<H: GeometryHost + 'static>(state: &Rc<RefCell<SessionState<H>>>) -> EventHandler {
    let weak: Weak<RefCell<SessionState<H>>> = Rc::downgrade(state);
    Rc::new(move |kind: HostEventKind| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        match state.try_borrow_mut() {
            Ok(mut s) => s.handle(kind),
            Err(_) => warn!(%kind, "re-entrant event dropped"),
        };
    })
}

fn subscribe_all<H: GeometryHost + 'static, E: EventSource + ?Sized>(
    events: &E,
    kinds: &[HostEventKind],
    state: &Rc<RefCell<SessionState<H>>>,
) -> Result<Vec<Subscription>, RecorderError> {
    kinds
        .iter()
        .map(|&kind| events.subscribe(kind, handler(state)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::{HostSetup, ScriptedHost};
    use replay_lens_protocol::{IncrementalSource, RecordData, ScrollData, ViewportResizeData};

    fn start(
        host: &Rc<ScriptedHost>,
        config: &RecorderConfig,
    ) -> RecorderSession<Rc<ScriptedHost>> {
        RecorderSession::start(
            config,
            Rc::clone(host),
            host.as_ref(),
            Box::new(ManualClock::new(0.0)),
        )
        .unwrap()
    }

    #[test]
    fn start_attaches_window_listeners_only_by_default() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let session = start(&host, &RecorderConfig::default());
        assert_eq!(session.listener_count(), 2);
        assert_eq!(host.listener_count(HostEventKind::WindowResize), 1);
        assert_eq!(host.listener_count(HostEventKind::VisualViewportResize), 0);
        assert!(session.records().is_empty());
    }

    #[test]
    fn stop_detaches_everything() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let mut session = start(&host, &RecorderConfig::default().with_visual_viewport(true));
        assert_eq!(host.total_listeners(), 4);
        session.stop();
        session.stop();
        assert_eq!(host.total_listeners(), 0);
        assert!(!session.is_recording());

        host.scroll_to(0.0, 100.0);
        assert!(session.records().is_empty());
    }

    #[test]
    fn dropping_session_detaches() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        {
            let _session = start(&host, &RecorderConfig::default());
            assert_eq!(host.total_listeners(), 2);
        }
        assert_eq!(host.total_listeners(), 0);
    }

    #[test]
    fn window_attach_failure_is_fatal() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        host.fail_subscriptions_for(HostEventKind::WindowScroll);
        let err = RecorderSession::start(
            &RecorderConfig::default(),
            Rc::clone(&host),
            host.as_ref(),
            Box::new(ManualClock::new(0.0)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RecorderError::ListenerAttach {
                event: HostEventKind::WindowScroll,
                ..
            }
        ));
        // The resize listener attached before the failure is released.
        assert_eq!(host.total_listeners(), 0);
    }

    #[test]
    fn visual_attach_failure_degrades() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        host.fail_subscriptions_for(HostEventKind::VisualViewportScroll);
        let session = start(&host, &RecorderConfig::default().with_visual_viewport(true));
        assert!(!session.visual_viewport_active());
        assert_eq!(host.total_listeners(), 2);
    }

    #[test]
    fn initial_snapshot_is_opt_in() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let session = start(&host, &RecorderConfig::default().with_initial_snapshot(true));
        let records = session.records();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].data,
            RecordData::ViewportResize(ViewportResizeData::new(390, 844))
        );
        assert_eq!(records[1].data, RecordData::Scroll(ScrollData::new(0, 0)));
    }

    #[test]
    fn resize_and_scroll_are_evaluated_independently() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let session = start(&host, &RecorderConfig::default());
        host.resize(390.0, 700.0);
        host.scroll_to(0.0, 120.0);
        host.resize(390.0, 700.0);
        let sources: Vec<_> = session.records().iter().map(|r| r.source()).collect();
        assert_eq!(
            sources,
            vec![IncrementalSource::ViewportResize, IncrementalSource::Scroll]
        );
    }

    #[test]
    fn event_in_flight_at_stop_still_lands() {
        type Slot = Rc<RefCell<Option<RecorderSession<Rc<ScriptedHost>>>>>;
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let slot: Slot = Rc::new(RefCell::new(None));

        // Attached before the session, so it runs first and stops the
        // session while the same scroll event is being dispatched.
        let s = Rc::clone(&slot);
        let _stopper = host
            .subscribe(
                HostEventKind::WindowScroll,
                Rc::new(move |_: HostEventKind| {
                    if let Some(session) = s.borrow_mut().as_mut() {
                        session.stop();
                    }
                }),
            )
            .unwrap();
        *slot.borrow_mut() = Some(start(&host, &RecorderConfig::default()));

        host.scroll_to(0.0, 50.0);
        let guard = slot.borrow();
        let session = guard.as_ref().unwrap();
        assert!(!session.is_recording());
        assert_eq!(
            session.records().last().map(|r| r.data),
            Some(RecordData::Scroll(ScrollData::new(0, 50)))
        );
    }

    #[test]
    fn event_during_borrowed_state_is_dropped_then_caught_up() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let session = start(&host, &RecorderConfig::default());
        {
            let _busy = session.state.borrow_mut();
            host.scroll_to(0.0, 50.0);
        }
        assert!(session.records().is_empty());

        host.scroll_to(0.0, 80.0);
        let data: Vec<_> = session.records().iter().map(|r| r.data).collect();
        assert_eq!(data, vec![RecordData::Scroll(ScrollData::new(0, 80))]);
    }

    #[test]
    fn sessions_on_one_host_are_independent() {
        let host = Rc::new(ScriptedHost::new(HostSetup::mobile(390, 844)));
        let first = start(&host, &RecorderConfig::default());
        host.scroll_to(0.0, 10.0);
        let second = start(&host, &RecorderConfig::default());
        host.scroll_to(0.0, 20.0);

        assert_eq!(first.records().len(), 2);
        assert_eq!(second.records().len(), 1);
        assert_eq!(first.flush().len(), 2);
        assert_eq!(second.records().len(), 1);
    }
}
