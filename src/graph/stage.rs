mod sink;
mod source;
mod through;

use std::fmt;

use async_trait::async_trait;

pub use self::sink::*;
pub use self::source::*;
pub use self::through::*;
use crate::{NumflowResult, SharedString};

/// Behavior driving graph stage lifecycle.
///
/// A node `check`s its port attachments before the graph starts, `run`s until its input is
/// depleted (or, for sources, its sequence ends), then `close`s its ports so completion flows
/// downstream.
#[async_trait]
pub trait Stage: fmt::Debug + Send + Sync {
    fn name(&self) -> SharedString;
    async fn check(&self) -> NumflowResult<()>;
    async fn run(&mut self) -> NumflowResult<()>;
    async fn close(self: Box<Self>) -> NumflowResult<()>;
}
