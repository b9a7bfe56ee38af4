// Path: crates/tx/src/submission/mod.rs

//! Drives one composed call from signing to a terminal status.
//!
//! Every submission runs on its own task and reports through a
//! [`Submission`] stream. The stream yields intermediate statuses (`Created`,
//! `Broadcast`, and `InBlock` when finalization is awaited) followed by exactly
//! one terminal status.

use crate::compose::compose;
use crate::preflight::{check_affordability, estimate_fee};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use waypoint_api::events::CompletionSink;
use waypoint_api::node::NodeApi;
use waypoint_api::signer::Signer;
use waypoint_telemetry::time::InclusionTimer;
use waypoint_telemetry::{error_metrics, submission_metrics};
use waypoint_types::app::{
    Address, BlockHash, Call, DispatchError, EventRecord, SignedExtrinsic, SignerPayload,
    SubmissionStatus, TxProgress, TxStatus,
};
use waypoint_types::config::{TransactionOptions, TxMode};
use waypoint_types::error::{ErrorCode, NodeError, TransactionError};

const STATUS_BUFFER: usize = 16;

fn mode_label(mode: TxMode) -> &'static str {
    match mode {
        TxMode::Submit => "submit",
        TxMode::SendOnly => "send_only",
        TxMode::SignOnly => "sign_only",
        TxMode::PaymentInfo => "payment_info",
    }
}

/// The first dispatch failure reported for an included extrinsic, if any.
///
/// A failure the node already extracted takes precedence over the event scan.
fn dispatch_failure(progress: &TxProgress, own_events: &[EventRecord]) -> Option<DispatchError> {
    progress
        .dispatch_error
        .clone()
        .or_else(|| own_events.iter().find_map(|r| r.event.failure().cloned()))
}

/// What a submission task starts from.
enum Job {
    /// A bare call, composed with the options and signed by the task.
    Compose(Call),
    /// An extrinsic signed beforehand, broadcast as is.
    Raw(SignedExtrinsic),
}

/// Spawns and tracks submissions for one signing address on one node.
#[derive(Clone, Debug)]
pub struct Submitter {
    api: Arc<dyn NodeApi>,
    signer: Option<Arc<dyn Signer>>,
    signer_address: Address,
    sink: Arc<dyn CompletionSink>,
    completion_key: String,
    print_extrinsics: bool,
    debug: bool,
}

impl Submitter {
    /// Creates a submitter publishing in-block events into `sink`, keyed by
    /// the node's own endpoint until [`Submitter::completion_key`] says otherwise.
    pub fn new(
        api: Arc<dyn NodeApi>,
        signer: Arc<dyn Signer>,
        signer_address: Address,
        sink: Arc<dyn CompletionSink>,
    ) -> Self {
        let completion_key = api.endpoint().to_string();
        Self {
            api,
            signer: Some(signer),
            signer_address,
            sink,
            completion_key,
            print_extrinsics: false,
            debug: false,
        }
    }

    /// A submitter holding no keys, for relaying extrinsics signed elsewhere
    /// with [`Submitter::send_raw`]. Anything that needs a signature fails
    /// with `NoSigner`.
    pub fn relay(api: Arc<dyn NodeApi>, signer_address: Address, sink: Arc<dyn CompletionSink>) -> Self {
        let completion_key = api.endpoint().to_string();
        Self {
            api,
            signer: None,
            signer_address,
            sink,
            completion_key,
            print_extrinsics: false,
            debug: false,
        }
    }

    /// The key in-block events are published under. It must be the key the
    /// consumers subscribe with, whatever form of the URL the node reports.
    pub fn completion_key(mut self, key: impl Into<String>) -> Self {
        self.completion_key = key.into();
        self
    }

    /// Logs every composed call at info level.
    pub fn print_extrinsics(mut self, enabled: bool) -> Self {
        self.print_extrinsics = enabled;
        self
    }

    /// Logs detected dispatch failures together with the full event list.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// The address that signs every submission.
    pub fn signer_address(&self) -> &Address {
        &self.signer_address
    }

    /// Composes `call` with `options` and submits it on a new task.
    ///
    /// `SendOnly` is not accepted here: it fails with `SignedExtrinsicRequired`.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, call: Call, options: TransactionOptions) -> Submission {
        self.spawn(Job::Compose(call), options)
    }

    /// Broadcasts an extrinsic signed earlier (typically the output of a
    /// `SignOnly` submission) and watches it in send-only mode: no preflight,
    /// no signing, no failure scan. Of `options`, only `wait_for_finalization`
    /// is read.
    pub fn send_raw(&self, extrinsic: SignedExtrinsic, mut options: TransactionOptions) -> Submission {
        options.mode = TxMode::SendOnly;
        self.spawn(Job::Raw(extrinsic), options)
    }

    fn spawn(&self, job: Job, options: TransactionOptions) -> Submission {
        let (tx, rx) = mpsc::channel(STATUS_BUFFER);
        let task = SubmissionTask {
            submitter: self.clone(),
            tx,
        };
        let handle = tokio::spawn(task.run(job, options));
        Submission {
            rx,
            handle: Some(handle),
        }
    }
}

/// The caller's view of one in-flight submission.
///
/// Dropping it (or calling [`Submission::cancel`]) stops delivery. A broadcast
/// extrinsic is not retracted.
#[derive(Debug)]
pub struct Submission {
    rx: mpsc::Receiver<SubmissionStatus>,
    handle: Option<JoinHandle<()>>,
}

impl Submission {
    /// A submission that failed before any work was spawned.
    pub fn failed(error: TransactionError) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // The receiver is alive and the buffer empty, so this cannot fail.
        let _ = tx.try_send(SubmissionStatus::Failed(error));
        Self { rx, handle: None }
    }

    /// Stops tracking. Statuses already buffered are discarded.
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.rx.close();
    }

    /// Drives the submission to its terminal status.
    ///
    /// `Failed` becomes an `Err`. A stream that ends without any status means
    /// the task was torn down.
    pub async fn finished(mut self) -> Result<SubmissionStatus, TransactionError> {
        let mut last = None;
        while let Some(status) = self.next().await {
            last = Some(status);
        }
        match last {
            Some(SubmissionStatus::Failed(e)) => Err(e),
            Some(status) => Ok(status),
            None => Err(NodeError::SubscriptionClosed.into()),
        }
    }
}

impl Stream for Submission {
    type Item = SubmissionStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        // Let the task notice the closed channel on its next emission.
        self.rx.close();
    }
}

/// Set when the receiving side went away; the task stops quietly.
struct Abandoned;

struct SubmissionTask {
    submitter: Submitter,
    tx: mpsc::Sender<SubmissionStatus>,
}

impl SubmissionTask {
    async fn emit(&self, status: SubmissionStatus) -> Result<(), Abandoned> {
        debug!(target: "submission", status = status.label(), "emit");
        self.tx.send(status).await.map_err(|_| Abandoned)
    }

    async fn run(self, job: Job, options: TransactionOptions) {
        let mode = mode_label(options.mode);
        submission_metrics().inc_submissions_started(mode);

        let outcome = match job {
            Job::Compose(call) => self.drive(call, &options).await,
            Job::Raw(extrinsic) => self.send(extrinsic, &options).await,
        };
        let terminal = match outcome {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                warn!(target: "submission", mode, error = %e, "submission failed");
                error_metrics().inc_error("transaction", e.code());
                SubmissionStatus::Failed(e)
            }
            Err(Abandoned) => {
                debug!(target: "submission", mode, "receiver dropped, stopped watching");
                return;
            }
        };
        submission_metrics().inc_submissions_finished(terminal.label());
        let _ = self.emit(terminal).await;
    }

    /// The outer result reports abandonment, the inner one the submission outcome.
    async fn drive(
        &self,
        call: Call,
        options: &TransactionOptions,
    ) -> Result<Result<SubmissionStatus, TransactionError>, Abandoned> {
        let s = &self.submitter;
        let composed = compose(call, options, &s.signer_address);
        if s.print_extrinsics {
            info!(target: "submission", "composed call:\n{}", composed.describe());
        }

        match options.mode {
            TxMode::SendOnly => return Ok(Err(TransactionError::SignedExtrinsicRequired)),
            TxMode::PaymentInfo => {
                return Ok(estimate_fee(s.api.as_ref(), &composed, &s.signer_address)
                    .await
                    .map(SubmissionStatus::Estimated));
            }
            TxMode::SignOnly => {
                if let Err(e) = check_affordability(s.api.as_ref(), &composed, &s.signer_address).await {
                    return Ok(Err(e));
                }
                return Ok(self.sign(composed, options).await.map(SubmissionStatus::Signed));
            }
            TxMode::Submit => {
                if let Err(e) = check_affordability(s.api.as_ref(), &composed, &s.signer_address).await {
                    return Ok(Err(e));
                }
            }
        }

        self.emit(SubmissionStatus::Created {
            call_hash: composed.hash(),
        })
        .await?;

        let extrinsic = match self.sign(composed, options).await {
            Ok(x) => x,
            Err(e) => return Ok(Err(e)),
        };
        self.watch(extrinsic, options).await
    }

    /// The send-only path: the extrinsic already carries its signature.
    async fn send(
        &self,
        extrinsic: SignedExtrinsic,
        options: &TransactionOptions,
    ) -> Result<Result<SubmissionStatus, TransactionError>, Abandoned> {
        let s = &self.submitter;
        if s.print_extrinsics {
            info!(target: "submission", "sending signed call:\n{}", extrinsic.call.describe());
        }
        self.emit(SubmissionStatus::Created {
            call_hash: extrinsic.call.hash(),
        })
        .await?;
        self.watch(extrinsic, options).await
    }

    async fn sign(
        &self,
        call: Call,
        options: &TransactionOptions,
    ) -> Result<SignedExtrinsic, TransactionError> {
        let s = &self.submitter;
        let signer = match &s.signer {
            Some(signer) if signer.can_sign(&s.signer_address) => signer,
            _ => return Err(TransactionError::NoSigner),
        };
        let nonce = s.api.account_nonce(&s.signer_address).await?;
        let payload = SignerPayload {
            call,
            era: options.era,
            nonce,
        };
        let signature = signer.sign(&s.signer_address, &payload).await?;
        Ok(SignedExtrinsic {
            signer: s.signer_address,
            call: payload.call,
            era: payload.era,
            nonce,
            signature,
        })
    }

    async fn watch(
        &self,
        extrinsic: SignedExtrinsic,
        options: &TransactionOptions,
    ) -> Result<Result<SubmissionStatus, TransactionError>, Abandoned> {
        let s = &self.submitter;
        let tx_hash = extrinsic.hash();
        let mut progress = match s.api.submit_and_watch(extrinsic).await {
            Ok(p) => p,
            Err(e) => return Ok(Err(TransactionError::BroadcastRejected(e.to_string()))),
        };
        self.emit(SubmissionStatus::Broadcast { tx_hash }).await?;
        info!(target: "submission", tx_hash = %hex::encode(tx_hash), "broadcast");

        let mut timer = Some(InclusionTimer::new(submission_metrics()));
        let mut included = false;

        while let Some(item) = progress.next().await {
            let update = match item {
                Ok(u) => u,
                Err(e) => return Ok(Err(e.into())),
            };
            match update.status {
                status if status.is_rejection() => {
                    return Ok(Err(TransactionError::BroadcastRejected(format!(
                        "{:?}",
                        status
                    ))));
                }
                TxStatus::InBlock(block_hash) => {
                    if included {
                        continue;
                    }
                    included = true;
                    if let Some(t) = timer.take() {
                        t.observe();
                    }
                    let events = match self.on_included(&update, block_hash, options.mode) {
                        Ok(events) => events,
                        Err(e) => return Ok(Err(e)),
                    };
                    let status = SubmissionStatus::InBlock { block_hash, events };
                    if !options.wait_for_finalization {
                        return Ok(Ok(status));
                    }
                    self.emit(status).await?;
                }
                TxStatus::Finalized(block_hash) => {
                    // The node may skip straight to finality.
                    if !included {
                        if let Err(e) = self.on_included(&update, block_hash, options.mode) {
                            return Ok(Err(e));
                        }
                    }
                    return Ok(Ok(SubmissionStatus::Finalized { block_hash }));
                }
                TxStatus::FinalityTimeout(block_hash) => {
                    return Ok(Err(NodeError::Rpc(format!(
                        "finality timeout for block 0x{}",
                        hex::encode(block_hash)
                    ))
                    .into()));
                }
                other => {
                    debug!(target: "submission", status = ?other, "pool status");
                }
            }
        }

        Ok(Err(NodeError::SubscriptionClosed.into()))
    }

    /// Scans the events of an included extrinsic and publishes them on success.
    fn on_included(
        &self,
        update: &TxProgress,
        block_hash: BlockHash,
        mode: TxMode,
    ) -> Result<Vec<EventRecord>, TransactionError> {
        let s = &self.submitter;
        let events = update.own_events();

        if mode != TxMode::SendOnly {
            if let Some(failure) = dispatch_failure(update, &events) {
                if s.debug {
                    error!(
                        target: "submission",
                        block = %hex::encode(block_hash),
                        error = %failure,
                        events = ?events,
                        "extrinsic included but dispatch failed"
                    );
                } else {
                    warn!(target: "submission", error = %failure, "dispatch failed");
                }
                return Err(TransactionError::DispatchFailed(failure));
            }
        }

        info!(
            target: "submission",
            block = %hex::encode(block_hash),
            events = events.len(),
            "included"
        );
        s.sink.publish(&s.completion_key, events.clone());
        Ok(events)
    }
}
