use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::channel::mpsc;
use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use super::blob_sink::BlobSink;
use crate::{
    api::{FetchedResponse, ResponseBody, Transport},
    domain::{Progress, SavedFile, TransferError, TransferOutcome, TransferPhase, TransferRequest},
    utils::resolve_filename,
};

/// Receives progress and phase changes of one transfer, in order.
pub trait TransferObserver: Send {
    fn on_progress(&mut self, progress: Progress);
    fn on_phase_change(&mut self, phase: TransferPhase);
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Progress(Progress),
    Phase(TransferPhase),
    Settled(TransferOutcome),
}

impl TransferObserver for mpsc::UnboundedSender<TransferEvent> {
    fn on_progress(&mut self, progress: Progress) {
        let _ = self.unbounded_send(TransferEvent::Progress(progress));
    }

    fn on_phase_change(&mut self, phase: TransferPhase) {
        let _ = self.unbounded_send(TransferEvent::Phase(phase));
    }
}

/// Requests early termination of a transfer. Repeated calls, or calls after
/// the transfer settled, do nothing.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub struct Transfer {
    pub completion: BoxFuture<'static, TransferOutcome>,
    pub cancel: CancelHandle,
}

#[derive(Clone)]
pub struct StreamingDownloader {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn BlobSink>,
}

impl StreamingDownloader {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn BlobSink>) -> Self {
        Self { transport, sink }
    }

    /// Prepares a transfer. Nothing happens until `completion` is polled.
    pub fn begin<O>(&self, request: TransferRequest, observer: O) -> Transfer
    where
        O: TransferObserver + 'static,
    {
        let cancel = CancelHandle::default();
        let run = run(
            self.transport.clone(),
            self.sink.clone(),
            request,
            observer,
            cancel.token.clone(),
        );

        let completion = AssertUnwindSafe(run)
            .catch_unwind()
            .map(|result| {
                result.unwrap_or_else(|_| {
                    warn!("transfer panicked");
                    Err(TransferError::Unexpected(
                        "The download stopped unexpectedly".to_string(),
                    ))
                })
            })
            .boxed();

        Transfer { completion, cancel }
    }

    /// Runs a transfer as one ordered event stream that ends with
    /// [`TransferEvent::Settled`].
    pub fn watch(&self, request: TransferRequest) -> (CancelHandle, BoxStream<'static, TransferEvent>) {
        let (sender, receiver) = mpsc::unbounded();
        let Transfer { completion, cancel } = self.begin(request, sender.clone());

        // Settled goes through the same channel so it lands after every
        // callback the transfer made.
        let settled = completion
            .map(move |outcome| {
                let _ = sender.unbounded_send(TransferEvent::Settled(outcome));
            })
            .into_stream()
            .filter_map(|()| future::ready(None::<TransferEvent>));

        (cancel, stream::select(receiver, settled).boxed())
    }
}

async fn run<O>(
    transport: Arc<dyn Transport>,
    sink: Arc<dyn BlobSink>,
    request: TransferRequest,
    mut observer: O,
    token: CancellationToken,
) -> TransferOutcome
where
    O: TransferObserver,
{
    info!(url = %request.url, "transfer started");
    observer.on_phase_change(TransferPhase::Transferring);

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(TransferError::Aborted),
        result = transfer(&*transport, &*sink, &request, &mut observer, &token) => result,
    };

    match &result {
        Ok(saved) => {
            info!(url = %request.url, path = %saved.path.display(), bytes = saved.size, "transfer done");
            observer.on_phase_change(TransferPhase::Done);
        }
        Err(TransferError::Aborted) => {
            info!(url = %request.url, "transfer cancelled");
            observer.on_phase_change(TransferPhase::Aborted);
        }
        Err(e) => {
            warn!(url = %request.url, error = %e, "transfer failed");
            observer.on_phase_change(TransferPhase::Failed);
        }
    }

    result
}

async fn transfer<O>(
    transport: &dyn Transport,
    sink: &dyn BlobSink,
    request: &TransferRequest,
    observer: &mut O,
    token: &CancellationToken,
) -> TransferOutcome
where
    O: TransferObserver,
{
    if request.url.trim().is_empty() {
        return Err(TransferError::Unexpected("No URL to download".to_string()));
    }

    let FetchedResponse {
        content_length,
        content_disposition,
        body,
    } = transport.fetch(&request.url).await?;

    let blob = match body {
        ResponseBody::Streaming(mut stream) => {
            let mut chunks = Vec::new();
            let mut loaded = 0u64;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                loaded += chunk.len() as u64;
                chunks.push(chunk);

                if token.is_cancelled() {
                    return Err(TransferError::Aborted);
                }
                trace!(loaded, total = ?content_length, "chunk received");
                observer.on_progress(Progress::new(loaded, content_length));
            }

            assemble(chunks, loaded)
        }
        ResponseBody::Buffered(body) => {
            let blob = body.await?;
            if token.is_cancelled() {
                return Err(TransferError::Aborted);
            }
            // The received size is the total here, whatever the header said.
            observer.on_progress(Progress::complete(blob.len() as u64));
            blob
        }
    };

    if token.is_cancelled() {
        return Err(TransferError::Aborted);
    }
    observer.on_phase_change(TransferPhase::Saving);

    let filename = resolve_filename(
        request.filename.as_deref(),
        content_disposition.as_deref(),
        &request.url,
    );
    let size = blob.len() as u64;
    let path = sink.save(&filename, blob).await?;

    Ok(SavedFile {
        filename,
        path,
        size,
    })
}

fn assemble(chunks: Vec<Bytes>, size: u64) -> Bytes {
    let mut blob = BytesMut::with_capacity(size as usize);
    for chunk in chunks {
        blob.extend_from_slice(&chunk);
    }
    blob.freeze()
}
