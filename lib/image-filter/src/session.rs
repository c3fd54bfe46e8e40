//! Interactive filter session: the loaded photo plus the current filter and
//! intensity, re-rendered on a background worker whenever one of them changes.
//!
//! Only the newest request matters. The worker skips queued requests that were
//! superseded before it reached them and drops results that went stale while
//! rendering. A failed render keeps the previously displayed frame.

use crate::{
    RenderableImage,
    adapter::FilterAdapter,
    descriptor::FilterDescriptor,
    engine::RenderEngine,
    parameter::Intensity,
};
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Rendered {
        generation: u64,
        filter: FilterDescriptor,
        intensity: Intensity,
    },
    Failed {
        generation: u64,
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct DisplayedFrame {
    pub generation: u64,
    pub filter: FilterDescriptor,
    pub intensity: Intensity,
    pub image: Arc<RenderableImage>,
}

#[derive(Debug, Clone)]
struct RenderRequest {
    generation: u64,
    filter: FilterDescriptor,
    intensity: Intensity,
    source: Arc<RenderableImage>,
}

#[derive(Debug, Default)]
struct SharedState {
    displayed: Option<DisplayedFrame>,
    last_error: Option<String>,
}

pub struct FilterSession {
    filter: FilterDescriptor,
    intensity: Intensity,
    source: Arc<RenderableImage>,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<SharedState>>,
    sender: Option<Sender<RenderRequest>>,
    event_receiver: Receiver<SessionEvent>,
    handle: Option<JoinHandle<()>>,
}

impl FilterSession {
    /// Start a session and queue the first render.
    pub fn new<E>(
        adapter: FilterAdapter<E>,
        source: RenderableImage,
        filter: FilterDescriptor,
        intensity: impl Into<Intensity>,
    ) -> Self
    where
        E: RenderEngine + 'static,
    {
        let (sender, receiver) = unbounded();
        let (event_sender, event_receiver) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let state = Arc::new(Mutex::new(SharedState::default()));

        let handle = Self::render_worker(
            adapter,
            receiver,
            event_sender,
            generation.clone(),
            state.clone(),
        );

        let mut session = Self {
            filter,
            intensity: intensity.into(),
            source: Arc::new(source),
            generation,
            state,
            sender: Some(sender),
            event_receiver,
            handle: Some(handle),
        };

        session.submit();
        session
    }

    pub fn filter(&self) -> FilterDescriptor {
        self.filter
    }

    /// Label shown above the photo.
    pub fn filter_name(&self) -> &'static str {
        self.filter.name()
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn set_filter(&mut self, filter: FilterDescriptor) -> u64 {
        self.filter = filter;
        self.submit()
    }

    pub fn set_intensity(&mut self, intensity: impl Into<Intensity>) -> u64 {
        self.intensity = intensity.into();
        self.submit()
    }

    /// Replace the photo being edited, keeping filter and intensity.
    pub fn set_source(&mut self, source: RenderableImage) -> u64 {
        self.source = Arc::new(source);
        self.submit()
    }

    pub fn displayed(&self) -> Option<DisplayedFrame> {
        self.lock_state().displayed.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Render outcomes in completion order. `wait_settled` reads from the
    /// same receiver, so events it consumes are not seen here and vice versa.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.event_receiver
    }

    /// Block until the frame for the newest request is displayed or has
    /// failed, or `timeout` elapses for a single event. Returns the settling
    /// event.
    pub fn wait_settled(&self, timeout: Duration) -> Option<SessionEvent> {
        loop {
            let event = self.event_receiver.recv_timeout(timeout).ok()?;
            let generation = match &event {
                SessionEvent::Rendered { generation, .. } => *generation,
                SessionEvent::Failed { generation, .. } => *generation,
            };

            if generation >= self.generation() {
                return Some(event);
            }
        }
    }

    fn submit(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let request = RenderRequest {
            generation,
            filter: self.filter,
            intensity: self.intensity,
            source: self.source.clone(),
        };

        if let Some(ref sender) = self.sender
            && let Err(e) = sender.send(request)
        {
            log::warn!("render worker is gone, request[{generation}] dropped: {e}");
        }

        generation
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn render_worker<E>(
        adapter: FilterAdapter<E>,
        receiver: Receiver<RenderRequest>,
        event_sender: Sender<SessionEvent>,
        generation: Arc<AtomicU64>,
        state: Arc<Mutex<SharedState>>,
    ) -> JoinHandle<()>
    where
        E: RenderEngine + 'static,
    {
        thread::spawn(move || {
            while let Ok(mut request) = receiver.recv() {
                while let Ok(newer) = receiver.try_recv() {
                    request = newer;
                }

                if request.generation < generation.load(Ordering::SeqCst) {
                    log::debug!("skip superseded request[{}]", request.generation);
                    continue;
                }

                let result = adapter.apply(request.filter, request.intensity, &request.source);

                if request.generation < generation.load(Ordering::SeqCst) {
                    log::debug!("discard stale result[{}]", request.generation);
                    continue;
                }

                let event = {
                    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());

                    match result {
                        Ok(image) => {
                            state.displayed = Some(DisplayedFrame {
                                generation: request.generation,
                                filter: request.filter,
                                intensity: request.intensity,
                                image: Arc::new(image),
                            });
                            state.last_error = None;

                            SessionEvent::Rendered {
                                generation: request.generation,
                                filter: request.filter,
                                intensity: request.intensity,
                            }
                        }
                        Err(e) => {
                            log::warn!(
                                "render request[{}] {} failed: {e}",
                                request.generation,
                                request.filter
                            );
                            state.last_error = Some(e.to_string());

                            SessionEvent::Failed {
                                generation: request.generation,
                                error: e.to_string(),
                            }
                        }
                    }
                };

                _ = event_sender.send(event);
            }

            log::info!("filter session render worker exit");
        })
    }
}

impl Drop for FilterSession {
    fn drop(&mut self) {
        self.sender.take();

        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("filter session render worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ImageFilterError, ImageFilterResult, engine::CpuEngine, parameter::FilterParameters,
    };
    use image::{Rgba, RgbaImage};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn photo() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 15) as u8, (y * 15) as u8, 90, 255]))
    }

    struct BrokenEngine;

    impl RenderEngine for BrokenEngine {
        fn render(
            &self,
            filter: FilterDescriptor,
            _params: &FilterParameters,
            image: &RgbaImage,
        ) -> ImageFilterResult<RgbaImage> {
            match filter {
                FilterDescriptor::Edges => Err(ImageFilterError::RenderFailure(
                    "unsupported colour space".to_string(),
                )),
                _ => Ok(image.clone()),
            }
        }
    }

    #[test]
    fn test_first_render() {
        let session = FilterSession::new(
            FilterAdapter::new(),
            photo(),
            FilterDescriptor::SepiaTone,
            0.5,
        );

        let event = session.wait_settled(TIMEOUT).unwrap();
        assert!(matches!(event, SessionEvent::Rendered { generation: 1, .. }));

        let frame = session.displayed().unwrap();
        let expected = crate::apply(FilterDescriptor::SepiaTone, 0.5, &photo()).unwrap();
        assert_eq!(*frame.image, expected);
        assert_eq!(session.filter_name(), "Sepia Tone");
    }

    #[test]
    fn test_latest_request_wins() {
        let mut session = FilterSession::new(
            FilterAdapter::with_engine(CpuEngine::new()),
            photo(),
            FilterDescriptor::Vignette,
            0.0,
        );

        for step in 1..=20 {
            session.set_intensity(step as f32 / 20.0);
        }
        let last = session.set_filter(FilterDescriptor::Pixellate);

        let event = session.wait_settled(TIMEOUT).unwrap();
        assert!(matches!(event, SessionEvent::Rendered { generation, .. } if generation == last));

        let frame = session.displayed().unwrap();
        assert_eq!(frame.generation, last);
        assert_eq!(frame.filter, FilterDescriptor::Pixellate);
        assert_eq!(frame.intensity, Intensity::MAX);
    }

    #[test]
    fn test_failure_keeps_previous_frame() {
        let mut session = FilterSession::new(
            FilterAdapter::with_engine(BrokenEngine),
            photo(),
            FilterDescriptor::Bloom,
            0.5,
        );
        session.wait_settled(TIMEOUT).unwrap();
        let before = session.displayed().unwrap();

        session.set_filter(FilterDescriptor::Edges);
        let event = session.wait_settled(TIMEOUT).unwrap();

        assert!(matches!(event, SessionEvent::Failed { generation: 2, .. }));
        assert!(session.last_error().unwrap().contains("colour space"));

        let after = session.displayed().unwrap();
        assert_eq!(after.generation, before.generation);
        assert_eq!(after.filter, FilterDescriptor::Bloom);
    }

    #[test]
    fn test_set_source_rerenders() {
        let mut session = FilterSession::new(
            FilterAdapter::new(),
            photo(),
            FilterDescriptor::Crystallize,
            0.1,
        );
        session.wait_settled(TIMEOUT).unwrap();

        let generation = session.set_source(RgbaImage::from_pixel(5, 7, Rgba([1, 2, 3, 255])));
        session.wait_settled(TIMEOUT).unwrap();

        let frame = session.displayed().unwrap();
        assert_eq!(frame.generation, generation);
        assert_eq!(frame.image.dimensions(), (5, 7));
    }
}
