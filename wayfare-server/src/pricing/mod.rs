//! Pricing Module
//!
//! 预订报价与优惠券评估。纯计算在 [`calculator`] 和 [`evaluator`]，
//! 带仓库查询的编排在 [`quote`]。

pub mod calculator;
pub mod evaluator;
pub mod quote;

pub use calculator::*;
pub use evaluator::evaluate_coupon;
pub use quote::*;
