use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};
use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::error::PortError;
use crate::{AppData, SharedString};

pub static STAGE_INGRESS_COUNTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "numflow_stage_ingress_counts",
            "Number of items entering a stage via an Inlet",
        ),
        &["stage", "port"],
    )
    .expect("failed creating numflow_stage_ingress_counts metric")
});

pub static STAGE_EGRESS_COUNTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "numflow_stage_egress_counts",
            "Number of items exiting a stage via an Outlet",
        ),
        &["stage", "port"],
    )
    .expect("failed creating numflow_stage_egress_counts metric")
});

#[inline]
fn track_ingress(stage: &str, port_name: &str) {
    STAGE_INGRESS_COUNTS.with_label_values(&[stage, port_name]).inc()
}

#[inline]
fn track_egress(stage: &str, port_name: &str) {
    STAGE_EGRESS_COUNTS.with_label_values(&[stage, port_name]).inc()
}

pub const PORT_DATA: &str = "data";

/// Connected ports hold at most one item in flight, so a producer cannot run ahead of its
/// consumer by more than a single sample.
const PORT_CAPACITY: usize = 1;

#[async_trait]
pub trait Port {
    fn stage(&self) -> &str;
    fn name(&self) -> &str;
    fn full_name(&self) -> String {
        format!("{}::{}", self.stage(), self.name())
    }

    /// Closes this half of the port channel without dropping it.
    /// Closing an outlet signals completion downstream; closing an inlet stops further sends
    /// while still letting buffered items drain.
    async fn close(&mut self);
}

#[async_trait]
pub trait Connect<T> {
    async fn connect(self);
}

#[async_trait]
impl<T: AppData> Connect<T> for (Outlet<T>, Inlet<T>) {
    async fn connect(self) {
        let outlet = self.0;
        let inlet = self.1;
        connect_out_to_in(outlet, inlet).await
    }
}

#[async_trait]
impl<T: AppData> Connect<T> for (&Outlet<T>, &Inlet<T>) {
    async fn connect(self) {
        let outlet = self.0.clone();
        let inlet = self.1.clone();
        connect_out_to_in(outlet, inlet).await
    }
}

pub async fn connect_out_to_in<T: AppData>(mut lhs: Outlet<T>, mut rhs: Inlet<T>) {
    let (tx, rx) = mpsc::channel(PORT_CAPACITY);
    lhs.attach(&rhs.full_name(), tx).await;
    rhs.attach(&lhs.full_name(), rx).await;
}

type InletConnection<T> = Arc<Mutex<Option<(mpsc::Receiver<T>, String)>>>;

pub struct Inlet<T> {
    stage: SharedString,
    name: SharedString,
    connection: InletConnection<T>,
}

impl<T> Inlet<T> {
    pub fn new(stage: impl Into<SharedString>, port_name: impl Into<SharedString>) -> Self {
        Self {
            stage: stage.into(),
            name: port_name.into(),
            connection: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl<T: Send> Port for Inlet<T> {
    fn stage(&self) -> &str {
        self.stage.as_ref()
    }

    fn name(&self) -> &str {
        self.name.as_ref()
    }

    async fn close(&mut self) {
        let mut rx = self.connection.lock().await;
        match rx.as_mut() {
            Some(r) => {
                tracing::trace!(stage=%self.stage, inlet=%self.name, "closing Inlet");
                r.0.close()
            },
            None => {
                tracing::trace!(stage=%self.stage, inlet=%self.name, "Inlet close ignored - not attached");
            },
        }
    }
}

impl<T> Clone for Inlet<T> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage.clone(),
            name: self.name.clone(),
            connection: self.connection.clone(),
        }
    }
}

impl<T: AppData> Inlet<T> {
    pub async fn attach(&mut self, sender_name: &str, rx: mpsc::Receiver<T>) {
        let mut port = self.connection.lock().await;
        *port = Some((rx, sender_name.to_string()));
    }

    pub async fn is_attached(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    pub async fn check_attachment(&self) -> Result<(), PortError> {
        match self.connection.lock().await.as_ref() {
            Some((_, sender)) => {
                tracing::trace!("inlet connected: {} -> {}", sender, self.full_name());
                Ok(())
            },
            None => Err(PortError::Detached(format!(
                "{}[{}]",
                self.full_name(),
                std::any::type_name::<Self>()
            ))),
        }
    }

    /// Receives the next item for this port.
    ///
    /// `None` is returned once the upstream outlet has closed and all buffered items have been
    /// received, or if the inlet was never attached.
    ///
    /// # Examples
    ///
    /// ```
    /// use numflow::graph::{Inlet, PORT_DATA};
    /// use tokio::sync::mpsc;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let (tx, rx) = mpsc::channel(1);
    ///     let mut port = Inlet::new("port", PORT_DATA);
    ///     port.attach("test_channel", rx).await;
    ///
    ///     tokio::spawn(async move {
    ///         tx.send(7_u8).await.unwrap();
    ///     });
    ///
    ///     assert_eq!(Some(7), port.recv().await);
    ///     assert_eq!(None, port.recv().await);
    /// }
    /// ```
    pub async fn recv(&mut self) -> Option<T> {
        let mut rx = self.connection.lock().await;
        let item = rx.as_mut()?.0.recv().await;
        tracing::trace!(stage=%self.stage, inlet=%self.name, ?item, "Inlet received {} item.", if item.is_some() { "an" } else { "no" });

        match item {
            Some(item) => {
                track_ingress(self.stage.as_ref(), self.name.as_ref());
                Some(item)
            },
            None => {
                tracing::debug!(stage=%self.stage, inlet=%self.name, "Inlet depleted - closing receiver");
                if let Some((mut receiver, _)) = rx.take() {
                    receiver.close();
                }
                None
            },
        }
    }
}

impl<T> fmt::Debug for Inlet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inlet")
            .field(&format!("{}::{}", self.stage, self.name))
            .finish()
    }
}

type OutletConnection<T> = Arc<Mutex<Option<(mpsc::Sender<T>, String)>>>;

pub struct Outlet<T> {
    stage: SharedString,
    name: SharedString,
    connection: OutletConnection<T>,
}

impl<T> Outlet<T> {
    pub fn new(stage: impl Into<SharedString>, port_name: impl Into<SharedString>) -> Self {
        Self {
            stage: stage.into(),
            name: port_name.into(),
            connection: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl<T: Send> Port for Outlet<T> {
    fn stage(&self) -> &str {
        self.stage.as_ref()
    }

    fn name(&self) -> &str {
        self.name.as_ref()
    }

    async fn close(&mut self) {
        tracing::trace!(stage=%self.stage, outlet=%self.name, "closing Outlet");
        self.connection.lock().await.take();
    }
}

impl<T> Clone for Outlet<T> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage.clone(),
            name: self.name.clone(),
            connection: self.connection.clone(),
        }
    }
}

impl<T: AppData> Outlet<T> {
    pub async fn attach(&mut self, receiver_name: &str, tx: mpsc::Sender<T>) {
        let mut port = self.connection.lock().await;
        *port = Some((tx, receiver_name.to_string()));
    }

    pub async fn is_attached(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    pub async fn check_attachment(&self) -> Result<(), PortError> {
        match self.connection.lock().await.as_ref() {
            Some((_, receiver)) => {
                tracing::trace!("outlet connected: {} -> {}", self.full_name(), receiver);
                Ok(())
            },
            None => Err(PortError::Detached(format!(
                "{}[{}]",
                self.full_name(),
                std::any::type_name::<Self>()
            ))),
        }
    }

    /// Sends an item downstream, waiting until the connected inlet has room for it.
    ///
    /// # Errors
    ///
    /// Fails with [`PortError::Detached`] if the outlet is not (or no longer) attached, and with
    /// [`PortError::Channel`] if the downstream inlet has hung up.
    pub async fn send(&self, value: T) -> Result<(), PortError> {
        let tx = match self.connection.lock().await.as_ref() {
            Some((tx, _)) => tx.clone(),
            None => {
                return Err(PortError::Detached(format!(
                    "{}[{}]",
                    self.full_name(),
                    std::any::type_name::<Self>()
                )))
            },
        };

        tx.send(value).await?;
        track_egress(self.stage.as_ref(), self.name.as_ref());
        Ok(())
    }
}

impl<T> fmt::Debug for Outlet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Outlet")
            .field(&format!("{}::{}", self.stage, self.name))
            .finish()
    }
}
