//! # Readout Configuration
//!
//! Configuration for the `readout` tools, composed from the component
//! configurations of the library crates:
//!
//! ```toml
//! [analyzer]
//! output_interval = 10000
//! output_prefix = "link0"
//!
//! [subscriber]
//! address = "tcp://127.0.0.1:5556"
//! high_water_mark = 1
//!
//! [publisher]
//! bind_address = "tcp://0.0.0.0:5556"
//! high_water_mark = 1000
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every key can be overridden from the environment, for example
//! `READOUT_SUBSCRIBER__ADDRESS=tcp://daq07:5556`.

pub mod monitor_config;

pub use monitor_config::{LoggingConfig, MonitorConfig, ENV_PREFIX};
