// src/captcha.rs

//! Captcha hand-off between the harvest loop and the human operator.
//!
//! The loop cannot solve captchas; it parks each challenge on a channel and
//! blocks until the operator replies. This is a genuine wait (oneshot reply,
//! no polling) and the cancellation token can always unblock it, so a closed
//! session never leaves the loop hanging.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};

/// One pending challenge, handed to the operator side.
#[derive(Debug)]
pub struct CaptchaRequest {
    /// Enrollment number the challenge belongs to
    pub key: String,
    /// Challenge image bytes as extracted from the page
    pub image: Vec<u8>,
    reply: Option<oneshot::Sender<String>>,
}

impl CaptchaRequest {
    /// Submit the operator's answer.
    ///
    /// Blank input is rejected with [`AppError::EmptyAnswer`] and leaves the
    /// request open so the caller can re-prompt.
    pub fn answer(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::EmptyAnswer);
        }
        if let Some(reply) = self.reply.take() {
            // The engine gave up waiting only if the run was cancelled;
            // nothing useful to do with the answer then.
            let _ = reply.send(value.to_string());
        }
        Ok(())
    }

    /// Whether an answer has already been forwarded.
    pub fn is_answered(&self) -> bool {
        self.reply.is_none()
    }
}

/// Engine side of the hand-off.
#[derive(Debug, Clone)]
pub struct CaptchaGate {
    requests: mpsc::Sender<CaptchaRequest>,
    cancel: CancellationToken,
}

/// Operator side of the hand-off.
#[derive(Debug)]
pub struct CaptchaOperator {
    requests: mpsc::Receiver<CaptchaRequest>,
}

/// Create a connected gate/operator pair sharing a cancellation token.
pub fn channel(cancel: CancellationToken) -> (CaptchaGate, CaptchaOperator) {
    // One record is in flight at a time
    let (tx, rx) = mpsc::channel(1);
    (
        CaptchaGate {
            requests: tx,
            cancel,
        },
        CaptchaOperator { requests: rx },
    )
}

impl CaptchaGate {
    /// Park the challenge with the operator and wait for the answer.
    ///
    /// There is deliberately no timeout here; a stalled operator stalls the
    /// run. Only cancellation aborts the wait.
    pub async fn solve(&self, key: &str, image: Vec<u8>) -> Result<String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = CaptchaRequest {
            key: key.to_string(),
            image,
            reply: Some(reply_tx),
        };

        tokio::select! {
            sent = self.requests.send(request) => {
                sent.map_err(|_| AppError::Cancelled)?;
            }
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
        }

        tokio::select! {
            answer = reply_rx => answer.map_err(|_| AppError::Cancelled),
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
        }
    }
}

impl CaptchaOperator {
    /// Receive the next pending challenge. `None` once the engine side has
    /// shut down.
    pub async fn next_request(&mut self) -> Option<CaptchaRequest> {
        self.requests.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answer_round_trips_to_the_waiting_engine() {
        let cancel = CancellationToken::new();
        let (gate, mut operator) = channel(cancel);

        let engine = tokio::spawn(async move { gate.solve("123456789001", vec![1, 2]).await });

        let mut request = operator.next_request().await.unwrap();
        assert_eq!(request.key, "123456789001");
        assert_eq!(request.image, vec![1, 2]);
        request.answer("AB12CD").unwrap();

        assert_eq!(engine.await.unwrap().unwrap(), "AB12CD");
    }

    #[tokio::test]
    async fn blank_answer_is_rejected_and_request_stays_open() {
        let cancel = CancellationToken::new();
        let (gate, mut operator) = channel(cancel);

        let engine = tokio::spawn(async move { gate.solve("123456789001", Vec::new()).await });

        let mut request = operator.next_request().await.unwrap();
        assert!(matches!(request.answer("   "), Err(AppError::EmptyAnswer)));
        assert!(!request.is_answered());

        request.answer("XY99").unwrap();
        assert!(request.is_answered());
        assert_eq!(engine.await.unwrap().unwrap(), "XY99");
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let cancel = CancellationToken::new();
        let (gate, mut operator) = channel(cancel);

        let engine = tokio::spawn(async move { gate.solve("123456789001", Vec::new()).await });

        let mut request = operator.next_request().await.unwrap();
        request.answer("  AB12  ").unwrap();
        assert_eq!(engine.await.unwrap().unwrap(), "AB12");
    }

    #[tokio::test]
    async fn cancellation_unblocks_the_waiting_engine() {
        let cancel = CancellationToken::new();
        let (gate, mut operator) = channel(cancel.clone());

        let engine = tokio::spawn(async move { gate.solve("123456789001", Vec::new()).await });

        // Take the request but never answer it; the quit signal must win.
        let _request = operator.next_request().await.unwrap();
        cancel.cancel();

        assert!(matches!(engine.await.unwrap(), Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_the_request_unanswered_cancels_the_wait() {
        let cancel = CancellationToken::new();
        let (gate, mut operator) = channel(cancel);

        let engine = tokio::spawn(async move { gate.solve("123456789001", Vec::new()).await });

        let request = operator.next_request().await.unwrap();
        drop(request);

        assert!(matches!(engine.await.unwrap(), Err(AppError::Cancelled)));
    }
}
