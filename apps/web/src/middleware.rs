//! # ミドルウェア
//!
//! 全ルートに適用されるセッションミドルウェアを集約する。

pub mod session;

pub use session::{CurrentUser, SessionContext, SessionLayerState, attach_session};
