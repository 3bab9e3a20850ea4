use std::fmt::Debug;

pub trait AppData: Debug + Send + Sync + 'static {}

/// AppData is automatically implemented for types able to flow through graph stages and sequence
/// subscriptions.
impl<T: Debug + Send + Sync + 'static> AppData for T {}
