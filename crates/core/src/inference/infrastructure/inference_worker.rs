use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use crate::inference::domain::execution_engine::ExecutionEngine;
use crate::inference::domain::face_detector::FaceDetector;
use crate::inference::domain::inference_result::InferenceResult;
use crate::inference::domain::inference_session::InferenceSession;
use crate::shared::constants::WORKER_QUEUE_CAPACITY;
use crate::shared::detector_error::DetectorError;

type Reply = Result<InferenceResult, DetectorError>;

struct Request {
    image: Vec<u8>,
    reply: Sender<Reply>,
}

impl Request {
    fn new(image: &[u8]) -> (Self, Receiver<Reply>) {
        let (reply, rx) = crossbeam_channel::bounded(1);
        let request = Self {
            image: image.to_vec(),
            reply,
        };
        (request, rx)
    }
}

/// Runs an [`InferenceSession`] on a dedicated thread.
///
/// Requests go through a bounded queue and are evaluated one at a time.
/// Callers may wait with a deadline: on timeout the evaluation keeps running
/// on the worker and its late result is dropped.
pub struct InferenceWorker {
    requests: Option<Sender<Request>>,
    handle: Option<JoinHandle<Result<(), DetectorError>>>,
    timeout: Option<Duration>,
}

impl InferenceWorker {
    /// Moves `session` onto a new worker thread.
    ///
    /// Fails with `SessionInit` if the thread cannot be started; the session
    /// is released in that case.
    pub fn spawn<E>(session: InferenceSession<E>) -> Result<Self, DetectorError>
    where
        E: ExecutionEngine + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<Request>(WORKER_QUEUE_CAPACITY);
        let handle = std::thread::Builder::new()
            .name("inference-worker".into())
            .spawn(move || serve(session, rx))
            .map_err(|e| DetectorError::SessionInit(Box::new(e)))?;
        Ok(Self {
            requests: Some(tx),
            handle: Some(handle),
            timeout: None,
        })
    }

    /// Deadline applied by the [`FaceDetector`] impl.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Like [`FaceDetector::find_faces`], but gives up after `timeout`.
    ///
    /// The deadline covers waiting for a queue slot as well as the reply.
    pub fn find_faces_timeout(&self, image: &[u8], timeout: Duration) -> Reply {
        let deadline = Instant::now() + timeout;
        let requests = self.requests.as_ref().ok_or(DetectorError::SessionClosed)?;
        let (request, reply) = Request::new(image);
        match requests.send_deadline(request, deadline) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(DetectorError::Timeout(timeout)),
            Err(SendTimeoutError::Disconnected(_)) => return Err(DetectorError::SessionClosed),
        }
        match reply.recv_deadline(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DetectorError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(DetectorError::SessionClosed),
        }
    }

    /// Stops the worker thread and closes the session it owns.
    ///
    /// Queued requests are still answered before the session closes.
    pub fn shutdown(mut self) -> Result<(), DetectorError> {
        self.stop()
    }

    fn submit(&self, image: &[u8]) -> Result<Receiver<Reply>, DetectorError> {
        let requests = self.requests.as_ref().ok_or(DetectorError::SessionClosed)?;
        let (request, reply) = Request::new(image);
        requests
            .send(request)
            .map_err(|_| DetectorError::SessionClosed)?;
        Ok(reply)
    }

    fn stop(&mut self) -> Result<(), DetectorError> {
        drop(self.requests.take());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(DetectorError::SessionClose(
                    "inference worker panicked".into(),
                ))
            }),
            None => Ok(()),
        }
    }
}

impl FaceDetector for InferenceWorker {
    fn find_faces(&self, image: &[u8]) -> Reply {
        if let Some(timeout) = self.timeout {
            return self.find_faces_timeout(image, timeout);
        }
        let reply = self.submit(image)?;
        reply.recv().unwrap_or(Err(DetectorError::SessionClosed))
    }
}

impl Drop for InferenceWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Inference worker shut down with error: {e}");
        }
    }
}

fn serve<E: ExecutionEngine>(
    session: InferenceSession<E>,
    requests: Receiver<Request>,
) -> Result<(), DetectorError> {
    for request in requests {
        let result = session.run(&request.image);
        if request.reply.send(result).is_err() {
            log::debug!("Dropping inference result for a caller that stopped waiting");
        }
    }
    session.close()
}
