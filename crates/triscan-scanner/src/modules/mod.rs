//! 스캔 루프 모듈.

mod scan;

pub use scan::{run_cycle, within_trading_hours};
