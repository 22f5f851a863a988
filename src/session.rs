//! 最新結果スロット
//!
//! 抽出リクエストごとに世代番号を発行し、最新世代の結果だけを保持する。
//! 後から始まったリクエストがある場合、古いリクエストの結果は破棄する。

use receipt_ai_common::StructuredReceipt;
use std::sync::{Mutex, MutexGuard};

/// リクエストの世代番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct SlotState {
    issued: u64,
    transcript: Option<String>,
    latest: Option<(u64, StructuredReceipt)>,
}

#[derive(Debug, Default)]
pub struct ReceiptSession {
    state: Mutex<SlotState>,
}

impl ReceiptSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 新しいリクエストを開始（それ以前のチケットは古くなる）
    pub fn begin(&self, transcript: &str) -> Ticket {
        let mut state = self.lock();
        state.issued += 1;
        state.transcript = Some(transcript.to_string());
        Ticket(state.issued)
    }

    /// 結果を反映。古いチケットなら破棄して false
    pub fn complete(&self, ticket: Ticket, result: StructuredReceipt) -> bool {
        let mut state = self.lock();
        if ticket.0 != state.issued {
            return false;
        }
        state.latest = Some((ticket.0, result));
        true
    }

    /// 最新のチケットか
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().issued == ticket.0
    }

    /// 最後に受け付けたOCRテキスト（再解析用）
    pub fn transcript(&self) -> Option<String> {
        self.lock().transcript.clone()
    }

    /// 最新の結果
    pub fn latest(&self) -> Option<StructuredReceipt> {
        self.lock().latest.as_ref().map(|(_, r)| r.clone())
    }

    /// 最新の結果とその世代番号
    pub fn latest_with_generation(&self) -> Option<(u64, StructuredReceipt)> {
        self.lock().latest.clone()
    }
}
