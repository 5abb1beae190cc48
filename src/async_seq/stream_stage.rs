//! StagedStream - 把同步 Stage 接到异步 Stream 上
//!
//! @yutiansut @quantaxis

use crate::pipeline::stage::Stage;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// 由 Stage 驱动的异步流
///
/// 只在被 poll 时向上游 poll 一次；Stage 本身同步执行，不持有未完成的拉取。
#[derive(Debug)]
pub struct StagedStream<S, St> {
    upstream: S,
    stage: St,
    done: bool,
}

impl<S, St> StagedStream<S, St> {
    pub fn new(upstream: S, stage: St) -> Self {
        Self {
            upstream,
            stage,
            done: false,
        }
    }

    pub fn stage(&self) -> &St {
        &self.stage
    }
}

// Stage 从不被 pin，只需要上游 Unpin
impl<S: Unpin, St> Unpin for StagedStream<S, St> {}

impl<S, St> Stream for StagedStream<S, St>
where
    S: Stream + Unpin,
    St: Stage<In = S::Item>,
{
    type Item = St::Out;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Out>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        loop {
            match futures::ready!(this.upstream.poll_next_unpin(cx)) {
                Some(input) => {
                    if let Some(out) = this.stage.feed(input) {
                        return Poll::Ready(Some(out));
                    }
                }
                None => {
                    this.done = true;
                    return Poll::Ready(this.stage.flush());
                }
            }
        }
    }
}
