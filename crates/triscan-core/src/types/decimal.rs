//! 정밀한 가격 계산을 위한 타입 별칭.

use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Quantity = Decimal;
