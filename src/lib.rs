//! Rust’s turnkey payment-gateway broker—route label-coded payment operations across
//! interchangeable provider integrations behind per-provider token buckets, deadline-guarded
//! execution, and mask-aware logging.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod broker;
pub mod config;
pub mod error;
pub mod guard;
pub mod limit;
pub mod log;
pub mod mask;
pub mod obs;
pub mod payment;
pub mod provider;
pub mod registry;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use rust_decimal;
pub use serde_json;
pub use url;
