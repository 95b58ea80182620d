//! Sensor node tasks
//!
//! Three cooperating pieces share one injected [`NodeContext`]:
//!
//! ```text
//! Status write ──► CommandHandler ──► run gate / start signal / ack signal
//!                                              │
//!   DualImu ──► SamplingTask ──try_send──► packet queue (10) ──► TransportTask ──► Notifier
//! ```
//!
//! The sampler only ever uses non-blocking enqueue. A full queue drops the
//! newest packet, which the host sees as a sequence gap.
//!
//! # Wiring on the target
//!
//! ```ignore
//! static CONTEXT: NodeContext<CriticalSectionRawMutex> = NodeContext::new(NodeConfig::new());
//!
//! #[embassy_executor::task]
//! async fn sampling(sensors: DualMpu6050<I2c<'static, I2C0, Async>>) {
//!     let ticker = EmbassyTicker::every_ms(CONTEXT.config().tick_period_ms);
//!     SamplingTask::new(&CONTEXT, sensors, ticker, EmbassyClock).run().await;
//! }
//! ```

pub mod command;
pub mod context;
pub mod sampling;
pub mod transport;

pub use command::CommandHandler;
pub use context::{NodeContext, NodeStats, StatsSnapshot};
pub use sampling::{SamplingTask, SessionSummary};
pub use transport::{TransportEvent, TransportTask};

#[cfg(test)]
mod pipeline_tests;
